use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub orders_api: OrdersApiSettings,
    pub dashboard: DashboardSettings,
}

/// Where the HTTP API listens.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// The remote orders endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OrdersApiSettings {
    /// Full URL of the orders listing endpoint.
    pub url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Dashboard report caching.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSettings {
    /// How long a computed report stays fresh, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_cache_ttl_secs() -> u64 {
    600
}
