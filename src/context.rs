use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{TicketingService, TranslationService};

/// Everything the webhook workflow needs for one invocation: the
/// configuration plus the ticketing and translation collaborators
/// behind their service traits.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub ticketing: Arc<dyn TicketingService>,
    pub translator: Arc<dyn TranslationService>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        ticketing: Arc<dyn TicketingService>,
        translator: Arc<dyn TranslationService>,
    ) -> Self {
        Self {
            config,
            ticketing,
            translator,
        }
    }
}
