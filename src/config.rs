// ============================================================================
// Configuration de l'application
// ============================================================================
// Lit la configuration depuis l'environnement (et un éventuel fichier .env)
//
// Variables :
// - COINWATCH_API_BASE_URL     : URL de base de l'API (défaut CoinGecko v3)
// - COINWATCH_API_KEY          : clé envoyée dans x-cg-demo-api-key
// - COINWATCH_CURRENCY         : devise d'affichage (défaut "usd")
// - COINWATCH_VALID_EMAIL      : email accepté au login (obligatoire)
// - COINWATCH_VALID_PASSWORD   : mot de passe accepté au login (obligatoire)
// - COINWATCH_SEARCH_DEBOUNCE_MS : délai de debounce de la recherche
// - COINWATCH_LOG_DIR          : répertoire des logs
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_CURRENCY: &str = "usd";
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Identifiants statiques acceptés par l'écran de login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Configuration complète, construite une seule fois au démarrage
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_key: String,
    /// Code devise en minuscules, tel qu'attendu par vs_currency
    pub currency: String,
    pub credentials: Credentials,
    pub search_debounce: Duration,
    pub per_page: u32,
    pub log_dir: PathBuf,
}

impl Config {
    /// Charge .env (si présent) puis lit les variables d'environnement
    pub fn from_env() -> Result<Self, ConfigError> {
        // Pas de .env : ce n'est pas une erreur
        if let Ok(path) = dotenvy::dotenv() {
            debug!(?path, "Loaded .env file");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Construit la configuration à partir d'une fonction de lookup
    ///
    /// CONCEPT RUST : Closure générique
    /// - F: Fn(&str) -> Option<String>
    /// - En prod : std::env::var ; en test : une HashMap
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_base_url = non_empty("COINWATCH_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_key = lookup("COINWATCH_API_KEY").unwrap_or_default();
        let currency = non_empty("COINWATCH_CURRENCY")
            .map(|c| c.trim().to_lowercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let email = non_empty("COINWATCH_VALID_EMAIL")
            .ok_or(ConfigError::Missing("COINWATCH_VALID_EMAIL"))?;
        let password = non_empty("COINWATCH_VALID_PASSWORD")
            .ok_or(ConfigError::Missing("COINWATCH_VALID_PASSWORD"))?;

        let search_debounce = match non_empty("COINWATCH_SEARCH_DEBOUNCE_MS") {
            Some(raw) => {
                let ms = raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                    name: "COINWATCH_SEARCH_DEBOUNCE_MS",
                    value: raw.clone(),
                })?;
                Duration::from_millis(ms)
            }
            None => Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
        };

        let log_dir = non_empty("COINWATCH_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_log_dir);

        Ok(Self {
            api_base_url,
            api_key,
            currency,
            credentials: Credentials { email, password },
            search_debounce,
            per_page: DEFAULT_PER_PAGE,
            log_dir,
        })
    }
}

/// Répertoire de logs par défaut
/// - Linux : ~/.local/share/coinwatch/logs
/// - Sinon : ./logs
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("coinwatch").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
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
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("COINWATCH_VALID_EMAIL", "user@example.com"),
            ("COINWATCH_VALID_PASSWORD", "hunter2"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.currency, "usd");
        assert_eq!(config.api_key, "");
        assert_eq!(config.search_debounce, Duration::from_millis(500));
        assert_eq!(config.credentials.email, "user@example.com");
    }

    #[test]
    fn test_missing_credentials() {
        let err = Config::from_lookup(lookup_from(&[("COINWATCH_VALID_EMAIL", "a@b.c")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing("COINWATCH_VALID_PASSWORD"));
    }

    #[test]
    fn test_currency_lowercased_and_debounce_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("COINWATCH_VALID_EMAIL", "a@b.c"),
            ("COINWATCH_VALID_PASSWORD", "pw"),
            ("COINWATCH_CURRENCY", "EUR"),
            ("COINWATCH_SEARCH_DEBOUNCE_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.currency, "eur");
        assert_eq!(config.search_debounce, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_debounce() {
        let err = Config::from_lookup(lookup_from(&[
            ("COINWATCH_VALID_EMAIL", "a@b.c"),
            ("COINWATCH_VALID_PASSWORD", "pw"),
            ("COINWATCH_SEARCH_DEBOUNCE_MS", "soon"),
        ]))
        .unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { name: "COINWATCH_SEARCH_DEBOUNCE_MS", .. }));
    }
}
