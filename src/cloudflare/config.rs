use std::time::Duration;

use url::Url;

use super::error::CfError;

pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PER_PAGE: u32 = 100;

#[derive(Clone, Debug)]
pub struct CloudflareConfig {
    pub api_token: Option<String>,
    pub account_id: Option<String>,
    pub zone_id: Option<String>,
    pub domain: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub per_page: u32,
}

impl Default for CloudflareConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            account_id: None,
            zone_id: None,
            domain: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl CloudflareConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut cfg = Self {
            api_token: get("CF_API_TOKEN"),
            account_id: get("CF_ACCOUNT_ID"),
            zone_id: get("CF_ZONE_ID"),
            domain: get("DOMAIN"),
            ..Self::default()
        };
        if let Some(base) = get("CF_BASE_URL") {
            cfg.base_url = base;
        }
        if let Some(timeout) = get("CF_TIMEOUT_SECS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                cfg.timeout = Duration::from_secs(parsed);
            }
        }
        if let Some(per_page) = get("CF_PER_PAGE") {
            if let Ok(parsed) = per_page.parse::<u32>() {
                if parsed > 0 {
                    cfg.per_page = parsed;
                }
            }
        }
        cfg
    }

    /// Every required variable must be present before the console talks upstream.
    pub fn validate(&self) -> Result<(), CfError> {
        let missing: Vec<&'static str> = [
            ("CF_API_TOKEN", &self.api_token),
            ("CF_ACCOUNT_ID", &self.account_id),
            ("CF_ZONE_ID", &self.zone_id),
            ("DOMAIN", &self.domain),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(CfError::MissingConfig(missing));
        }
        if Url::parse(&self.base_url).is_err() {
            return Err(CfError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(())
    }

    pub fn account_id(&self) -> &str {
        self.account_id.as_deref().unwrap_or_default()
    }

    pub fn zone_id(&self) -> &str {
        self.zone_id.as_deref().unwrap_or_default()
    }

    pub fn domain(&self) -> &str {
        self.domain.as_deref().unwrap_or_default()
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_values_are_absent_or_garbage() {
        let cfg = CloudflareConfig::from_lookup(lookup_from(&[
            ("CF_TIMEOUT_SECS", "soon"),
            ("CF_PER_PAGE", "0"),
        ]));
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(cfg.per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn reads_all_variables() {
        let cfg = CloudflareConfig::from_lookup(lookup_from(&[
            ("CF_API_TOKEN", "tok"),
            ("CF_ACCOUNT_ID", "acc"),
            ("CF_ZONE_ID", "zone"),
            ("DOMAIN", "example.com"),
            ("CF_BASE_URL", "http://127.0.0.1:8080/v4"),
            ("CF_TIMEOUT_SECS", "5"),
            ("CF_PER_PAGE", "25"),
        ]));
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.zone_id(), "zone");
        assert_eq!(cfg.domain(), "example.com");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.per_page, 25);
    }

    #[test]
    fn validate_names_every_missing_variable() {
        let cfg = CloudflareConfig::from_lookup(lookup_from(&[
            ("CF_API_TOKEN", "tok"),
            ("CF_ZONE_ID", "  "),
        ]));
        match cfg.validate() {
            Err(CfError::MissingConfig(names)) => {
                assert_eq!(names, vec!["CF_ACCOUNT_ID", "CF_ZONE_ID", "DOMAIN"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_unparseable_base_url() {
        let cfg = CloudflareConfig::from_lookup(lookup_from(&[
            ("CF_API_TOKEN", "tok"),
            ("CF_ACCOUNT_ID", "acc"),
            ("CF_ZONE_ID", "zone"),
            ("DOMAIN", "example.com"),
            ("CF_BASE_URL", "not a url"),
        ]));
        assert!(matches!(cfg.validate(), Err(CfError::InvalidBaseUrl(_))));
    }
}
