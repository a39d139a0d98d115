// ============================================================================
// Module : api
// ============================================================================
// Clients pour récupérer les données de marché depuis le service distant
// ============================================================================

pub mod history;  // Endpoint d'historique de prix

// Re-export des éléments principaux
pub use history::{parse_history, HistoryClient, HistoryPayload, HistorySource};
