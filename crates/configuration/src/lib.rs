use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{DashboardSettings, OrdersApiSettings, ServerSettings, Settings};

/// Loads the application configuration from `config.toml` plus environment
/// overrides.
///
/// Environment variables prefixed with `APP__` override file values, e.g.
/// `APP__ORDERS_API__URL` overrides `orders_api.url`. Secrets such as
/// `DATABASE_URL` are deliberately not part of this file; they come from the
/// environment via dotenvy.
pub fn load_settings() -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config.toml"))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;

    Ok(settings)
}
