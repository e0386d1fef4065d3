//! CLI configuration

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the specd server
    pub server_url: String,
}
