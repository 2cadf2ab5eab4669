pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, load_settings, ConfigError, DEFAULT_SETTINGS_FILE};
pub use schema::{Settings, ValidationError, ValidationIssue};
