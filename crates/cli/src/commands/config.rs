use std::env;

use ariva_core::config::{AppConfig, LoadOptions};

/// Render effective configuration values, flagging fields currently pinned
/// by an `ARIVA_*` environment override.
pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        "ARIVA_SERVER_BIND_ADDRESS",
    ));
    lines.push(render_line("server.port", &config.server.port.to_string(), "ARIVA_SERVER_PORT"));
    lines.push(render_line(
        "server.graceful_shutdown_secs",
        &config.server.graceful_shutdown_secs.to_string(),
        "ARIVA_SERVER_GRACEFUL_SHUTDOWN_SECS",
    ));
    lines.push(render_line(
        "snapshot.path",
        &config.snapshot.path.display().to_string(),
        "ARIVA_SNAPSHOT_PATH",
    ));
    lines.push(render_line(
        "reports.top_overdue_limit",
        &config.reports.top_overdue_limit.to_string(),
        "ARIVA_REPORTS_TOP_OVERDUE_LIMIT",
    ));
    lines.push(render_line(
        "reports.trend_weeks",
        &config.reports.trend_weeks.to_string(),
        "ARIVA_REPORTS_TREND_WEEKS",
    ));
    lines.push(render_line(
        "reports.trend_months",
        &config.reports.trend_months.to_string(),
        "ARIVA_REPORTS_TREND_MONTHS",
    ));
    lines.push(render_line(
        "session.ttl_secs",
        &config.session.ttl_secs.to_string(),
        "ARIVA_SESSION_TTL_SECS",
    ));
    lines.push(render_line("logging.level", &config.logging.level, "ARIVA_LOGGING_LEVEL"));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format).to_lowercase(),
        "ARIVA_LOGGING_FORMAT",
    ));

    let policy_source =
        if config.authz.rules.is_some() { "config file" } else { "built-in table" };
    lines.push(format!("  authz.rules = <{policy_source}>"));

    lines.join("\n")
}

fn render_line(key: &str, value: &str, env_var: &str) -> String {
    let source = if env::var(env_var).is_ok() { format!("env:{env_var}") } else { "file/default".to_string() };
    format!("  {key} = {value} ({source})")
}
