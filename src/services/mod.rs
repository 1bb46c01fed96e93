pub mod secrets;
pub mod ticketing;
pub mod translation;

pub use secrets::SecretStore;
pub use ticketing::TicketingService;
pub use translation::{AUTO_SOURCE_LANGUAGE, Translation, TranslationService};
