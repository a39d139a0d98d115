// ============================================================================
// StockView - Library
// ============================================================================
// Graphique ligne d'un symbole boursier avec pan/zoom et séries togglables
// ============================================================================

pub mod api;     // Client de l'endpoint d'historique
pub mod app;     // État de l'écran
pub mod config;  // Configuration (URL, symbole)
pub mod error;   // Erreurs de chargement
pub mod loader;  // Data Loader avec garde de génération
pub mod models;  // Structures de données
pub mod ui;      // Interface utilisateur
pub mod zoom;    // Zoom/Pan Controller
