// ============================================================================
// Erreurs de chargement
// ============================================================================
// CONCEPT RUST : thiserror
// - #[derive(Error)] génère l'implémentation de std::error::Error
// - #[error("...")] fournit le message Display, affiché tel quel à l'écran
//
// Les erreurs portent des String (et pas reqwest::Error) pour rester Clone
// et comparables dans les tests.
// ============================================================================

use thiserror::Error;

/// Échecs possibles d'un chargement d'historique
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Symbole vide : aucune requête n'est émise
    #[error("symbol must not be empty")]
    EmptySymbol,

    /// Requête rejetée (DNS, connexion, corps illisible, ...)
    #[error("network request failed: {0}")]
    Network(String),

    /// Réponse HTTP hors 2xx
    #[error("market data service returned HTTP {0}")]
    Status(u16),

    /// Corps de réponse qui n'est pas du JSON valide, ou barres mal formées
    #[error("invalid market data payload: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        LoadError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Parse(err.to_string())
    }
}
