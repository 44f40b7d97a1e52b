pub mod loader;
pub mod models;
pub mod sources;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader};
pub use models::{
    AuthConfig, Config, ConfigMetadata, ConfigWarning, ConfigWarnings,
    ContributorsConfig, CorsConfig, DatabaseConfig, MailConfig, ServerConfig,
};
