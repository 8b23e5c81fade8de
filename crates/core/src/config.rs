use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::authz::RouteAccessPolicy;
use crate::domain::user::Role;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub snapshot: SnapshotConfig,
    pub reports: ReportsConfig,
    pub session: SessionConfig,
    pub authz: AuthzConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SnapshotConfig {
    /// JSON file the bundled invoice source reads. Real storage backends
    /// plug in behind the server's `InvoiceSource` trait instead.
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ReportsConfig {
    pub top_overdue_limit: usize,
    pub trend_weeks: u32,
    pub trend_months: u32,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub ttl_secs: u64,
}

/// Route policy as data: when `rules` is present it replaces the default
/// allow-list table wholesale.
#[derive(Clone, Debug, Default)]
pub struct AuthzConfig {
    pub rules: Option<HashMap<Role, Vec<String>>>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub snapshot_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            snapshot: SnapshotConfig { path: PathBuf::from("invoices.json") },
            reports: ReportsConfig { top_overdue_limit: 5, trend_weeks: 8, trend_months: 6 },
            session: SessionConfig { ttl_secs: 900 },
            authz: AuthzConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    snapshot: Option<SnapshotPatch>,
    reports: Option<ReportsPatch>,
    session: Option<SessionPatch>,
    authz: Option<AuthzPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReportsPatch {
    top_overdue_limit: Option<usize>,
    trend_weeks: Option<u32>,
    trend_months: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionPatch {
    ttl_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AuthzPatch {
    rules: Option<HashMap<Role, Vec<String>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("ariva.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// The effective route policy: configured rules if present, otherwise
    /// the built-in table.
    pub fn route_policy(&self) -> RouteAccessPolicy {
        match &self.authz.rules {
            Some(rules) => RouteAccessPolicy::new(
                rules.iter().map(|(role, prefixes)| (*role, prefixes.clone())),
            ),
            None => RouteAccessPolicy::default(),
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(snapshot) = patch.snapshot {
            if let Some(path) = snapshot.path {
                self.snapshot.path = path;
            }
        }

        if let Some(reports) = patch.reports {
            if let Some(top_overdue_limit) = reports.top_overdue_limit {
                self.reports.top_overdue_limit = top_overdue_limit;
            }
            if let Some(trend_weeks) = reports.trend_weeks {
                self.reports.trend_weeks = trend_weeks;
            }
            if let Some(trend_months) = reports.trend_months {
                self.reports.trend_months = trend_months;
            }
        }

        if let Some(session) = patch.session {
            if let Some(ttl_secs) = session.ttl_secs {
                self.session.ttl_secs = ttl_secs;
            }
        }

        if let Some(authz) = patch.authz {
            if let Some(rules) = authz.rules {
                self.authz.rules = Some(rules);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("ARIVA_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("ARIVA_SERVER_PORT") {
            self.server.port = parse_u16("ARIVA_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("ARIVA_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("ARIVA_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("ARIVA_SNAPSHOT_PATH") {
            self.snapshot.path = PathBuf::from(value);
        }

        if let Some(value) = read_env("ARIVA_REPORTS_TOP_OVERDUE_LIMIT") {
            self.reports.top_overdue_limit =
                parse_u64("ARIVA_REPORTS_TOP_OVERDUE_LIMIT", &value)? as usize;
        }
        if let Some(value) = read_env("ARIVA_REPORTS_TREND_WEEKS") {
            self.reports.trend_weeks = parse_u32("ARIVA_REPORTS_TREND_WEEKS", &value)?;
        }
        if let Some(value) = read_env("ARIVA_REPORTS_TREND_MONTHS") {
            self.reports.trend_months = parse_u32("ARIVA_REPORTS_TREND_MONTHS", &value)?;
        }

        if let Some(value) = read_env("ARIVA_SESSION_TTL_SECS") {
            self.session.ttl_secs = parse_u64("ARIVA_SESSION_TTL_SECS", &value)?;
        }

        let log_level = read_env("ARIVA_LOGGING_LEVEL").or_else(|| read_env("ARIVA_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("ARIVA_LOGGING_FORMAT").or_else(|| read_env("ARIVA_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(snapshot_path) = overrides.snapshot_path {
            self.snapshot.path = snapshot_path;
        }
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_reports(&self.reports)?;
        validate_session(&self.session)?;
        validate_authz(&self.authz)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("ariva.toml"), PathBuf::from("config/ariva.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }
    if server.graceful_shutdown_secs == 0 || server.graceful_shutdown_secs > 300 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be in range 1..=300".to_string(),
        ));
    }
    Ok(())
}

fn validate_reports(reports: &ReportsConfig) -> Result<(), ConfigError> {
    if reports.top_overdue_limit == 0 {
        return Err(ConfigError::Validation(
            "reports.top_overdue_limit must be greater than zero".to_string(),
        ));
    }
    if reports.trend_weeks == 0 || reports.trend_weeks > 52 {
        return Err(ConfigError::Validation(
            "reports.trend_weeks must be in range 1..=52".to_string(),
        ));
    }
    if reports.trend_months == 0 || reports.trend_months > 24 {
        return Err(ConfigError::Validation(
            "reports.trend_months must be in range 1..=24".to_string(),
        ));
    }
    Ok(())
}

fn validate_session(session: &SessionConfig) -> Result<(), ConfigError> {
    if session.ttl_secs == 0 || session.ttl_secs > 86_400 {
        return Err(ConfigError::Validation(
            "session.ttl_secs must be in range 1..=86400".to_string(),
        ));
    }
    Ok(())
}

fn validate_authz(authz: &AuthzConfig) -> Result<(), ConfigError> {
    let Some(rules) = &authz.rules else { return Ok(()) };

    if rules.is_empty() {
        return Err(ConfigError::Validation(
            "authz.rules must list at least one role when present".to_string(),
        ));
    }
    for (role, prefixes) in rules {
        if prefixes.is_empty() {
            return Err(ConfigError::Validation(format!(
                "authz.rules.{role} must list at least one path prefix"
            )));
        }
        for prefix in prefixes {
            if !prefix.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "authz.rules.{role} prefix `{prefix}` must start with `/`"
                )));
            }
        }
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    let known = ["trace", "debug", "info", "warn", "error"];
    if !known.contains(&level.as_str()) {
        return Err(ConfigError::Validation(format!(
            "logging.level `{}` is not one of trace|debug|info|warn|error",
            logging.level
        )));
    }
    Ok(())
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::domain::user::Role;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp config file");
        file.write_all(contents.as_bytes()).expect("write temp config");
        file
    }

    #[test]
    fn defaults_validate() {
        AppConfig::default().validate().expect("default config must be valid");
    }

    #[test]
    fn file_patch_overrides_defaults() {
        let file = write_config(
            r#"
[server]
port = 9090

[reports]
top_overdue_limit = 10

[logging]
level = "debug"
format = "json"
"#,
        );

        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect("config loads");

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.reports.top_overdue_limit, 10);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        // Untouched sections keep their defaults.
        assert_eq!(config.session.ttl_secs, 900);
    }

    #[test]
    fn interpolates_env_vars_in_the_config_file() {
        std::env::set_var("ARIVA_TEST_SNAPSHOT_DIR", "/var/lib/ariva");
        let file = write_config("[snapshot]\npath = \"${ARIVA_TEST_SNAPSHOT_DIR}/invoices.json\"\n");

        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect("config loads");
        std::env::remove_var("ARIVA_TEST_SNAPSHOT_DIR");

        assert_eq!(config.snapshot.path, std::path::PathBuf::from("/var/lib/ariva/invoices.json"));
    }

    #[test]
    fn unterminated_interpolation_fails() {
        let file = write_config("[snapshot]\npath = \"${ARIVA_TEST_UNTERMINATED\"\n");

        let error = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect_err("unterminated interpolation must fail");

        assert!(matches!(error, ConfigError::UnterminatedInterpolation));
    }

    #[test]
    fn missing_required_file_fails() {
        let error = AppConfig::load(LoadOptions {
            config_path: Some("does-not-exist.toml".into()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect_err("missing file must fail when required");

        assert!(matches!(error, ConfigError::MissingConfigFile(_)));
    }

    #[test]
    fn programmatic_overrides_win_over_file() {
        let file = write_config("[server]\nport = 9090\n");

        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides { port: Some(7070), ..ConfigOverrides::default() },
        })
        .expect("config loads");

        assert_eq!(config.server.port, 7070);
    }

    #[test]
    fn authz_rules_replace_default_policy() {
        let file = write_config(
            r#"
[authz.rules]
admin = ["/dashboard/admin", "/dashboard/manager"]
manager = ["/dashboard/manager"]
"#,
        );

        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect("config loads");

        let policy = config.route_policy();
        assert!(policy.allows(Role::Admin, "/dashboard/manager"));
        // Roles absent from the configured table fail closed.
        assert!(!policy.allows(Role::Biller, "/dashboard/biller"));
    }

    #[test]
    fn invalid_authz_prefix_is_rejected() {
        let file = write_config("[authz.rules]\nadmin = [\"dashboard/admin\"]\n");

        let error = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect_err("relative prefix must be rejected");

        assert!(matches!(error, ConfigError::Validation(_)));
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let file = write_config("[server]\nbind_adress = \"0.0.0.0\"\n");

        let error = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect_err("typoed key must be rejected");

        assert!(matches!(error, ConfigError::ParseFile { .. }));
    }

    #[test]
    fn zero_trend_weeks_fails_validation() {
        let file = write_config("[reports]\ntrend_weeks = 0\n");

        let error = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect_err("zero trend weeks must fail");

        assert!(matches!(error, ConfigError::Validation(_)));
    }
}
