use anyhow::{Result, anyhow};
use std::env;

pub const DEFAULT_TABLE_NAME: &str = "items";

/// Settings the provisioner passes to the SDK. Anything left as `None`
/// is resolved by the SDK's ambient chain (env, profile, instance metadata).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub table_name: String,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub profile_name: Option<String>,
    pub max_attempts: Option<u32>,
    /// (access key id, secret access key)
    pub static_credentials: Option<(String, String)>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            region: None,
            endpoint_url: None,
            profile_name: None,
            max_attempts: None,
            static_credentials: None,
        }
    }
}

impl StoreConfig {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Read the configuration from the process environment.
    ///
    /// `ITEMS_TABLE_NAME`, `DYNAMODB_REGION`, `DYNAMODB_ENDPOINT_URL`,
    /// `DYNAMODB_PROFILE` and `DYNAMODB_MAX_ATTEMPTS` are consulted; empty
    /// values count as unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let max_attempts = match var("DYNAMODB_MAX_ATTEMPTS") {
            Some(raw) => {
                let parsed = raw.trim().parse::<u32>().map_err(|e| {
                    anyhow!("Invalid DYNAMODB_MAX_ATTEMPTS '{}': {}", raw, e)
                })?;
                if parsed == 0 {
                    return Err(anyhow!("DYNAMODB_MAX_ATTEMPTS must be at least 1"));
                }
                Some(parsed)
            }
            None => None,
        };

        Ok(Self {
            table_name: var("ITEMS_TABLE_NAME").unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
            region: var("DYNAMODB_REGION"),
            endpoint_url: var("DYNAMODB_ENDPOINT_URL"),
            profile_name: var("DYNAMODB_PROFILE"),
            max_attempts,
            static_credentials: None,
        })
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn with_profile_name(mut self, profile_name: impl Into<String>) -> Self {
        self.profile_name = Some(profile_name.into());
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Replace the ambient credential chain, e.g. for DynamoDB Local.
    pub fn with_static_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.static_credentials = Some((access_key_id.into(), secret_access_key.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = StoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.table_name, "items");
    }

    #[test]
    fn test_reads_all_variables() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("ITEMS_TABLE_NAME", "orders"),
            ("DYNAMODB_REGION", "eu-west-1"),
            ("DYNAMODB_ENDPOINT_URL", "http://localhost:8000"),
            ("DYNAMODB_PROFILE", "dev"),
            ("DYNAMODB_MAX_ATTEMPTS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.table_name, "orders");
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.profile_name.as_deref(), Some("dev"));
        assert_eq!(config.max_attempts, Some(5));
        assert!(config.static_credentials.is_none());
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("ITEMS_TABLE_NAME", ""),
            ("DYNAMODB_REGION", "  "),
        ]))
        .unwrap();
        assert_eq!(config.table_name, DEFAULT_TABLE_NAME);
        assert!(config.region.is_none());
    }

    #[test]
    fn test_rejects_bad_max_attempts() {
        let err = StoreConfig::from_lookup(lookup_from(&[("DYNAMODB_MAX_ATTEMPTS", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("DYNAMODB_MAX_ATTEMPTS"));

        assert!(StoreConfig::from_lookup(lookup_from(&[("DYNAMODB_MAX_ATTEMPTS", "0")])).is_err());
    }
}
