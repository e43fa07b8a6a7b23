use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::routing::RouteClassifier;

/// Shared application state, injected into handlers and middleware via `State`
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<AppConfig>,
    pub classifier: RouteClassifier,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: AppConfig) -> Self {
        let classifier = RouteClassifier::from_site(&config.site);
        Self {
            store,
            config: Arc::new(config),
            classifier,
        }
    }
}
