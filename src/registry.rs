use sparse_index::{IndexError, SparseIndexClient};
use tracing::debug;

use crate::config::RegistryConfig;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build a sparse index client with its own HTTP connection pool.
pub fn index_client(config: &RegistryConfig) -> Result<SparseIndexClient, IndexError> {
    // reqwest is built without a bundled crypto provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
    let client = SparseIndexClient::new(http, config.index_options()?);
    debug!("index client for {}", client.index_url());
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_client_uses_configured_url() {
        let config = RegistryConfig {
            index_url: "https://mirror.example.com/index".to_string(),
            ..Default::default()
        };
        let client = index_client(&config).unwrap();
        assert_eq!(client.index_url().as_str(), "https://mirror.example.com/index/");
    }
}
