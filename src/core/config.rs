//! Client configuration and credentials

use serde::{Deserialize, Serialize};

/// Default service endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com/";

/// Authentication scheme attached to every outbound request.
///
/// Exactly one scheme is active per client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Credential {
    /// Subscription key plus resource region, sent as
    /// `Ocp-Apim-Subscription-Key` / `Ocp-Apim-Subscription-Region` headers
    SubscriptionKey {
        /// The resource's API key
        key: String,
        /// The resource's region, e.g. "westus"
        region: String,
    },
    /// OAuth bearer token, sent as an `Authorization` header
    BearerToken(String),
}

/// Service API version, applied as an `api-version` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiVersion {
    /// Version 3.0, the current release
    V3_0,
}

impl ApiVersion {
    /// The wire form of this version
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V3_0 => "3.0",
        }
    }

    /// The most recent service version
    pub fn latest() -> Self {
        ApiVersion::V3_0
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::latest()
    }
}

/// Configuration for the translator client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Service endpoint (protocol and hostname)
    pub endpoint: String,
    /// API version sent with every request
    pub api_version: ApiVersion,
    /// Authentication scheme
    pub credential: Credential,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl TranslatorConfig {
    /// Create a configuration for the default endpoint
    pub fn new(credential: Credential) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_version: ApiVersion::default(),
            credential,
            timeout_ms: 30000,
        }
    }

    /// Point the client at a different endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Pin a specific API version
    pub fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = version;
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Load key-based configuration from environment variables
    ///
    /// Requires `TRANSLATOR_API_KEY` and `TRANSLATOR_REGION`; honors
    /// `TRANSLATOR_ENDPOINT` and `REQUEST_TIMEOUT_MS` when set.
    pub fn from_env() -> anyhow::Result<Self> {
        let key = std::env::var("TRANSLATOR_API_KEY")
            .map_err(|_| anyhow::anyhow!("TRANSLATOR_API_KEY environment variable is required"))?;

        let region = std::env::var("TRANSLATOR_REGION")
            .map_err(|_| anyhow::anyhow!("TRANSLATOR_REGION environment variable is required"))?;

        let endpoint =
            std::env::var("TRANSLATOR_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        let timeout_ms = std::env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse::<u64>()?;

        Ok(Self {
            endpoint,
            api_version: ApiVersion::default(),
            credential: Credential::SubscriptionKey { key, region },
            timeout_ms,
        })
    }

    /// Validate configuration; called by the client constructor so that
    /// missing credentials fail fast, not at first request
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.endpoint.is_empty() {
            return Err(anyhow::anyhow!("endpoint is required"));
        }

        url::Url::parse(&self.endpoint)
            .map_err(|e| anyhow::anyhow!("endpoint is not a valid URL: {}", e))?;

        match &self.credential {
            Credential::SubscriptionKey { key, region } => {
                if key.is_empty() {
                    return Err(anyhow::anyhow!("subscription key is required"));
                }
                if region.is_empty() {
                    return Err(anyhow::anyhow!("subscription region is required"));
                }
            }
            Credential::BearerToken(token) => {
                if token.is_empty() {
                    return Err(anyhow::anyhow!("bearer token is required"));
                }
            }
        }

        if self.timeout_ms == 0 {
            return Err(anyhow::anyhow!("timeout_ms must be greater than 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_config() -> TranslatorConfig {
        TranslatorConfig::new(Credential::SubscriptionKey {
            key: "test-key".to_string(),
            region: "westus".to_string(),
        })
    }

    #[test]
    fn default_config_is_valid() {
        assert!(key_config().validate().is_ok());
    }

    #[test]
    fn empty_key_is_rejected() {
        let config = TranslatorConfig::new(Credential::SubscriptionKey {
            key: String::new(),
            region: "westus".to_string(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_region_is_rejected() {
        let config = TranslatorConfig::new(Credential::SubscriptionKey {
            key: "test-key".to_string(),
            region: String::new(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_bearer_token_is_rejected() {
        let config = TranslatorConfig::new(Credential::BearerToken(String::new()));
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_endpoint_is_rejected() {
        let config = key_config().with_endpoint("not a url");
        assert!(config.validate().is_err());
    }

    #[test]
    fn latest_version_is_default() {
        assert_eq!(ApiVersion::default(), ApiVersion::V3_0);
        assert_eq!(ApiVersion::default().as_str(), "3.0");
    }
}
