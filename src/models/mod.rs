// ============================================================================
// Module : models
// ============================================================================
// Structures de données partagées par le loader, le contrôleur et l'UI
// ============================================================================

pub mod price_bar; // Barres de prix, séries et visibilité
pub mod domain;    // Domaine de zoom et gestes pan/zoom

// Re-export des structures principales pour simplifier les imports
pub use price_bar::{price_bounds, PriceBar, SeriesKey, SeriesVisibility, HISTORY_LIMIT};
pub use domain::{AxisRange, PanDirection, ZoomDomain};
