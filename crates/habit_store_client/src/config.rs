use crate::StoreError;
use secrecy::SecretString;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: SecretString,
    pub user_id: String,
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function, so tests never mutate the global environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, StoreError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let api_key = get("HABIT_STORE_API_KEY")
            .ok_or_else(|| StoreError::Config("HABIT_STORE_API_KEY missing".into()))?;
        let user_id = get("HABIT_STORE_USER_ID")
            .ok_or_else(|| StoreError::Config("HABIT_STORE_USER_ID missing".into()))?;
        let base_url =
            get("HABIT_STORE_BASE_URL").unwrap_or_else(|| "http://localhost:54321".into());
        Ok(Self {
            api_key: SecretString::new(api_key.into()),
            user_id,
            base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_missing_api_key() {
        let get = |k: &str| match k {
            "HABIT_STORE_API_KEY" => None,
            "HABIT_STORE_USER_ID" => Some("u-42".into()),
            _ => None,
        };
        assert!(Config::from_env_with(get).is_err());
    }

    #[test]
    fn from_env_defaults_base_url() {
        let get = |k: &str| match k {
            "HABIT_STORE_API_KEY" => Some("sekrit".into()),
            "HABIT_STORE_USER_ID" => Some("u-42".into()),
            _ => None,
        };
        let cfg = Config::from_env_with(get).expect("cfg");
        assert_eq!(cfg.user_id, "u-42");
        assert_eq!(cfg.base_url, "http://localhost:54321");
    }

    #[test]
    fn from_env_reads_base_url_override() {
        let get = |k: &str| match k {
            "HABIT_STORE_API_KEY" => Some("sekrit".into()),
            "HABIT_STORE_USER_ID" => Some("u-42".into()),
            "HABIT_STORE_BASE_URL" => Some("http://localhost:9999".into()),
            _ => None,
        };
        let cfg = Config::from_env_with(get).expect("cfg");
        assert_eq!(cfg.base_url, "http://localhost:9999");
    }
}
