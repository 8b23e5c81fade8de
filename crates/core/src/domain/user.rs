use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Closed role set. Anything outside it is rejected at parse time so that
/// authorization can only ever see one of these four values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Biller,
    Collector,
}

pub const ALL_ROLES: [Role; 4] = [Role::Admin, Role::Manager, Role::Biller, Role::Collector];

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Biller => "biller",
            Self::Collector => "collector",
        }
    }

    /// The dashboard a subject with this role lands on after sign-in.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Self::Admin => "/dashboard/admin",
            Self::Manager => "/dashboard/manager",
            Self::Biller => "/dashboard/biller",
            Self::Collector => "/dashboard/collector",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "biller" => Ok(Self::Biller),
            "collector" => Ok(Self::Collector),
            other => Err(DomainError::UnknownRole { role: other.to_owned() }),
        }
    }
}
