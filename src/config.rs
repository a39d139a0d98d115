// ============================================================================
// Configuration
// ============================================================================
// Valeurs par défaut surchargeables par variables d'environnement :
// - STOCKVIEW_BASE_URL : URL de base du service de données de marché
// - STOCKVIEW_SYMBOL   : symbole affiché
// ============================================================================

use tracing::debug;

/// URL de base du service mock utilisé par défaut
pub const DEFAULT_BASE_URL: &str = "https://mock.apidog.com/m1/892843-874692-default";

/// Symbole affiché par défaut
pub const DEFAULT_SYMBOL: &str = "AAPL";

const BASE_URL_VAR: &str = "STOCKVIEW_BASE_URL";
const SYMBOL_VAR: &str = "STOCKVIEW_SYMBOL";

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub symbol: String,
}

impl Config {
    /// Lit la configuration depuis l'environnement du processus
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construit la configuration à partir d'une fonction de lecture
    ///
    /// Les valeurs vides ou composées d'espaces sont ignorées.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let config = Self {
            base_url: read(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            symbol: read(SYMBOL_VAR)
                .map(|symbol| symbol.to_uppercase())
                .unwrap_or_else(|| DEFAULT_SYMBOL.to_string()),
        };
        debug!(?config, "Configuration loaded");
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
