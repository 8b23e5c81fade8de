use ariva_core::config::{AppConfig, LoadOptions};
use serde_json::json;

use super::report::{load_snapshot, pretty};
use super::CommandResult;

/// Preflight: config must validate, the snapshot file must be readable, and
/// data-quality skips are surfaced (they degrade the check without failing
/// it, matching the engine's skip-and-count policy).
pub fn run(json_output: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            let payload = json!({
                "command": "doctor",
                "status": "error",
                "error_class": "config_validation",
                "detail": error.to_string(),
            });
            let output = if json_output {
                pretty(&payload)
            } else {
                format!("doctor: config validation failed: {error}")
            };
            return CommandResult { exit_code: 2, output };
        }
    };

    let (snapshot_check, exit_code) = match load_snapshot(&config.snapshot.path) {
        Ok(snapshot) => {
            let skipped = snapshot.quality.skipped_count();
            let status = if skipped == 0 { "ok" } else { "degraded" };
            (
                json!({
                    "status": status,
                    "accepted": snapshot.quality.accepted,
                    "skipped": skipped,
                }),
                0,
            )
        }
        Err(message) => (json!({ "status": "error", "detail": message }), 3),
    };

    let status = if exit_code == 0 { "ok" } else { "error" };
    let payload = json!({
        "command": "doctor",
        "status": status,
        "checks": {
            "config": { "status": "ok" },
            "snapshot": snapshot_check,
        },
        "snapshot_path": config.snapshot.path.display().to_string(),
    });

    let output = if json_output {
        pretty(&payload)
    } else {
        let snapshot = &payload["checks"]["snapshot"];
        let snapshot_line = match snapshot["status"].as_str() {
            Some("ok") => "snapshot: readable".to_string(),
            Some("degraded") => {
                format!("snapshot: readable with {} skipped record(s)", snapshot["skipped"])
            }
            _ => format!("snapshot: {}", snapshot["detail"].as_str().unwrap_or("unreadable")),
        };
        format!("doctor: config ok\ndoctor: {snapshot_line}")
    };

    CommandResult { exit_code, output }
}
