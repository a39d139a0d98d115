// ============================================================================
// API Client : historique de prix
// ============================================================================
// Récupère les barres historiques d'un symbole depuis
// GET {base_url}/marketdata/history/{symbol}
//
// CONCEPTS RUST :
// 1. async/await : la requête suspend sans bloquer le thread UI
// 2. #[serde(untagged)] : la réponse a deux formes valides, on les
//    distingue explicitement avant toute autre utilisation
// 3. Trait HistorySource : point d'injection pour le loader et les tests
// ============================================================================

use std::future::Future;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::error::LoadError;
use crate::models::{PriceBar, HISTORY_LIMIT};

// ============================================================================
// Forme de la réponse JSON
// ============================================================================
// Le backend renvoie soit un tableau nu, soit { "data": [...] }.
// Toute autre forme (ex: {}) est une réponse vide, pas une erreur.
//
// CONCEPT RUST : #[serde(untagged)]
// - Serde essaie chaque variant dans l'ordre
// - Other(Value) accepte n'importe quel JSON valide, donc ne peut pas échouer
// ============================================================================

/// Réponse brute de l'endpoint d'historique
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum HistoryPayload {
    /// Tableau nu : [ {...}, {...} ]
    Bars(Vec<Value>),

    /// Objet enveloppe : { "data": [ {...} ] }
    Wrapped { data: Vec<Value> },

    /// Toute autre forme JSON
    Other(Value),
}

impl HistoryPayload {
    /// Normalise vers une séquence de barres, tronquée à HISTORY_LIMIT
    ///
    /// L'ordre du backend est conservé (pas de tri). Seules les barres
    /// conservées sont décodées.
    pub fn into_bars(self) -> Result<Vec<PriceBar>, LoadError> {
        let records = match self {
            HistoryPayload::Bars(records) => records,
            HistoryPayload::Wrapped { data } => data,
            HistoryPayload::Other(value) => {
                warn!(shape = %shape_of(&value), "Unexpected history payload shape, treating as empty");
                Vec::new()
            }
        };

        let total = records.len();
        let bars = records
            .into_iter()
            .take(HISTORY_LIMIT)
            .map(serde_json::from_value::<PriceBar>)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(received = total, kept = bars.len(), "Normalized history payload");
        Ok(bars)
    }
}

/// Nom court du type JSON, pour les logs
fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse un corps de réponse en barres de prix
pub fn parse_history(body: &str) -> Result<Vec<PriceBar>, LoadError> {
    let payload: HistoryPayload = serde_json::from_str(body)?;
    payload.into_bars()
}

// ============================================================================
// Trait : HistorySource
// ============================================================================
// CONCEPT RUST : impl Future dans un trait
// - La future doit être Send pour être lancée avec tokio::spawn
// - Le loader ne dépend que de ce trait, jamais de reqwest directement
// ============================================================================

/// Source d'historique de prix pour un symbole
pub trait HistorySource: Send + Sync + 'static {
    /// Récupère l'historique (déjà tronqué) d'un symbole
    fn fetch_history(
        &self,
        symbol: &str,
    ) -> impl Future<Output = Result<Vec<PriceBar>, LoadError>> + Send;
}

// ============================================================================
// Client HTTP
// ============================================================================

/// Client de l'endpoint d'historique
#[derive(Debug, Clone)]
pub struct HistoryClient {
    base_url: String,
    http: reqwest::Client,
}

impl HistoryClient {
    /// Crée un client pour l'URL de base donnée (sans slash final requis)
    pub fn new(base_url: impl Into<String>) -> Result<Self, LoadError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("stockview/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// URL de l'historique d'un symbole
    pub fn history_url(&self, symbol: &str) -> String {
        format!("{}/marketdata/history/{}", self.base_url, symbol)
    }

    /// Exécute la requête et parse la réponse
    ///
    /// Une réponse hors 2xx est une erreur : un corps d'erreur JSON ne doit
    /// pas passer pour un historique vide.
    #[instrument(skip(self))]
    pub async fn fetch(&self, symbol: &str) -> Result<Vec<PriceBar>, LoadError> {
        let url = self.history_url(symbol);
        debug!(url = %url, "Sending history request");

        let response = self.http.get(&url).send().await.map_err(|e| {
            error!(error = %e, "History request failed");
            LoadError::from(e)
        })?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            error!(status = %status, "Market data service returned error status");
            return Err(LoadError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let bars = parse_history(&body).map_err(|e| {
            error!(error = %e, "Failed to parse history payload");
            e
        })?;

        info!(bars = bars.len(), "Successfully fetched price history");
        Ok(bars)
    }
}

impl HistorySource for HistoryClient {
    fn fetch_history(
        &self,
        symbol: &str,
    ) -> impl Future<Output = Result<Vec<PriceBar>, LoadError>> + Send {
        self.fetch(symbol)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
