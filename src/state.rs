use std::sync::Arc;

use crate::{config::AppConfig, gateway::Gateway, places::PlacesClient};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub gateway: Arc<dyn Gateway>,
    pub places: Option<PlacesClient>,
}

impl AppState {
    pub fn new(config: AppConfig, gateway: Arc<dyn Gateway>, places: Option<PlacesClient>) -> Self {
        Self {
            config,
            gateway,
            places,
        }
    }
}
