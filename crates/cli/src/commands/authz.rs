use ariva_core::config::{AppConfig, LoadOptions};
use serde_json::json;

use super::report::{error_payload, pretty};
use super::CommandResult;

/// Evaluate the effective route policy for one role/path pair. Exit code 0
/// on allow, 3 on deny, so shell scripts can branch on the decision.
pub fn run(role: &str, path: &str) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult {
                exit_code: 2,
                output: error_payload("authz", "config_validation", &error.to_string()),
            }
        }
    };

    let decision = config.route_policy().decision(role, path);
    let exit_code = if decision.allowed { 0 } else { 3 };

    let payload = json!({
        "command": "authz",
        "status": "ok",
        "role": role,
        "path": path,
        "decision": decision,
    });

    CommandResult { exit_code, output: pretty(&payload) }
}
