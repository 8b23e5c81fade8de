//! Invoice snapshot sources. The engine only ever sees a materialized
//! point-in-time `InvoiceSnapshot`; where it comes from is pluggable behind
//! `InvoiceSource`. The bundled implementation reads a JSON file; a real
//! deployment would put its storage client behind the same trait.

use std::path::PathBuf;

use ariva_core::errors::ApplicationError;
use ariva_core::snapshot::InvoiceSnapshot;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait InvoiceSource: Send + Sync {
    async fn snapshot(&self) -> Result<InvoiceSnapshot, ApplicationError>;
}

pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl InvoiceSource for JsonFileSource {
    async fn snapshot(&self) -> Result<InvoiceSnapshot, ApplicationError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|error| {
            ApplicationError::Snapshot(format!(
                "could not read snapshot file `{}`: {error}",
                self.path.display()
            ))
        })?;

        let parsed: Value = serde_json::from_str(&raw).map_err(|error| {
            ApplicationError::Snapshot(format!(
                "could not parse snapshot file `{}`: {error}",
                self.path.display()
            ))
        })?;

        // Accept either a bare array or an `{ "invoices": [...] }` wrapper.
        let records = match &parsed {
            Value::Array(records) => records.as_slice(),
            Value::Object(object) => object
                .get("invoices")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .ok_or_else(|| {
                    ApplicationError::Snapshot(
                        "snapshot object is missing an `invoices` array".to_string(),
                    )
                })?,
            _ => {
                return Err(ApplicationError::Snapshot(
                    "snapshot root must be an array or an object".to_string(),
                ))
            }
        };

        Ok(InvoiceSnapshot::from_json_records(records))
    }
}

/// Fixed snapshot, used by tests and demos.
pub struct StaticSource {
    snapshot: InvoiceSnapshot,
}

impl StaticSource {
    pub fn new(snapshot: InvoiceSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl InvoiceSource for StaticSource {
    async fn snapshot(&self) -> Result<InvoiceSnapshot, ApplicationError> {
        Ok(self.snapshot.clone())
    }
}
