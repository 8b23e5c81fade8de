//! Role authorization: a single table-driven allow-list mapping each role to
//! the dashboard path prefixes it may reach.
//!
//! The policy is data, not code. Adding a role or route means editing the
//! table (or the `[authz]` config section), never this module. Unknown roles
//! and unmatched paths both deny; there is no default-allow path anywhere.

pub mod nav;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::user::Role;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccessDenial {
    UnknownRole { role: String },
    PathNotAllowed { role: Role, path: String },
}

impl AccessDenial {
    fn reason(&self) -> String {
        match self {
            Self::UnknownRole { role } => format!("unknown role `{role}`"),
            Self::PathNotAllowed { role, path } => {
                format!("role `{role}` is not allowed to access `{path}`")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: String,
    pub denial: Option<AccessDenial>,
}

impl AccessDecision {
    fn allow(reason: impl Into<String>) -> Self {
        Self { allowed: true, reason: reason.into(), denial: None }
    }

    fn deny(denial: AccessDenial) -> Self {
        Self { allowed: false, reason: denial.reason(), denial: Some(denial) }
    }
}

/// Per-role allowed path prefixes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteAccessPolicy {
    rules: HashMap<Role, Vec<String>>,
}

impl Default for RouteAccessPolicy {
    /// The canonical table. Note the asymmetry is intentional and carried
    /// over verbatim: biller and collector are siblings that do not list
    /// each other, and admin lists only its own dashboard.
    fn default() -> Self {
        Self::new([
            (Role::Admin, vec!["/dashboard/admin"]),
            (Role::Manager, vec!["/dashboard/manager", "/dashboard/admin"]),
            (Role::Biller, vec!["/dashboard/biller", "/dashboard/manager", "/dashboard/admin"]),
            (
                Role::Collector,
                vec!["/dashboard/collector", "/dashboard/manager", "/dashboard/admin"],
            ),
        ])
    }
}

impl RouteAccessPolicy {
    pub fn new<P, I>(rules: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = (Role, Vec<P>)>,
    {
        let rules = rules
            .into_iter()
            .map(|(role, prefixes)| (role, prefixes.into_iter().map(Into::into).collect()))
            .collect();
        Self { rules }
    }

    pub fn allowed_prefixes(&self, role: Role) -> &[String] {
        self.rules.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Admission decision for a raw role label and a requested path. The
    /// label is parsed fail-closed; a role missing from the table (possible
    /// with a config-supplied policy) denies as well.
    pub fn decision(&self, role_label: &str, path: &str) -> AccessDecision {
        let Ok(role) = role_label.parse::<Role>() else {
            let decision =
                AccessDecision::deny(AccessDenial::UnknownRole { role: role_label.to_owned() });
            tracing::info!(
                event_name = "authz.denied",
                role = role_label,
                path,
                reason = %decision.reason,
                "authorization denied"
            );
            return decision;
        };

        if self.allows(role, path) {
            return AccessDecision::allow(format!("role `{role}` may access `{path}`"));
        }

        let decision =
            AccessDecision::deny(AccessDenial::PathNotAllowed { role, path: path.to_owned() });
        tracing::info!(
            event_name = "authz.denied",
            role = %role,
            path,
            reason = %decision.reason,
            "authorization denied"
        );
        decision
    }

    pub fn allows(&self, role: Role, path: &str) -> bool {
        self.allowed_prefixes(role).iter().any(|prefix| prefix_matches(prefix, path))
    }
}

/// Segment-aware prefix match: `/dashboard/admin` covers itself and
/// `/dashboard/admin/aging`, but not `/dashboard/administrator`.
fn prefix_matches(prefix: &str, path: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
