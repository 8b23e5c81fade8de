use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use ariva_core::config::AppConfig;
use ariva_core::session::SessionCache;

use crate::api::AppState;
use crate::store::JsonFileSource;

pub struct App {
    pub config: AppConfig,
    pub state: AppState,
}

/// Assemble runtime state from an already-loaded config. The session cache
/// and policy are built once here and injected; nothing hangs off module
/// globals.
pub fn bootstrap_with_config(config: AppConfig) -> Result<App> {
    let state = AppState {
        policy: Arc::new(config.route_policy()),
        sessions: Arc::new(SessionCache::new(Duration::from_secs(config.session.ttl_secs))),
        source: Arc::new(JsonFileSource::new(config.snapshot.path.clone())),
        reports: config.reports.clone(),
    };

    Ok(App { config, state })
}
