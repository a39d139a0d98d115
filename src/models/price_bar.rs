// ============================================================================
// Structure : PriceBar (Open, Close, Low, High)
// ============================================================================
// Représente un échantillon historique renvoyé par l'endpoint d'historique
//
// CONCEPTS RUST :
// 1. String pour le timestamp : on garde la valeur brute du backend
// 2. f64 pour les prix
// 3. Enum SeriesKey : les quatre séries affichables, exhaustivité garantie
// ============================================================================

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Nombre maximum de barres conservées après un chargement
pub const HISTORY_LIMIT: usize = 20;

/// Une barre de prix historique
///
/// Les champs JSON supplémentaires sont ignorés par serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Timestamp brut tel que renvoyé par le backend
    pub timestamp: String,

    /// Prix d'ouverture (Open)
    pub open: f64,

    /// Prix de clôture (Close)
    pub close: f64,

    /// Prix le plus bas (Low)
    pub low: f64,

    /// Prix le plus haut (High)
    pub high: f64,
}

impl PriceBar {
    /// Constructeur : crée une nouvelle barre
    pub fn new(timestamp: impl Into<String>, open: f64, close: f64, low: f64, high: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            open,
            close,
            low,
            high,
        }
    }

    /// Retourne la valeur de la série demandée
    ///
    /// CONCEPT RUST : match exhaustif
    /// - Ajouter une série sans la gérer ici ne compile pas
    pub fn value(&self, key: SeriesKey) -> f64 {
        match key {
            SeriesKey::Open => self.open,
            SeriesKey::Close => self.close,
            SeriesKey::Low => self.low,
            SeriesKey::High => self.high,
        }
    }

    /// Parse le timestamp pour les labels de l'axe X
    ///
    /// Accepte RFC 3339 ("2024-01-15T00:00:00Z") puis une date seule
    /// ("2024-01-15"). None si le format est inconnu : le label retombe
    /// alors sur le timestamp brut.
    pub fn datetime(&self) -> Option<DateTime<FixedOffset>> {
        if let Ok(dt) = DateTime::<FixedOffset>::parse_from_rfc3339(&self.timestamp) {
            return Some(dt);
        }

        let date = NaiveDate::parse_from_str(&self.timestamp, "%Y-%m-%d").ok()?;
        let naive = date.and_hms_opt(0, 0, 0)?;
        Some(naive.and_utc().fixed_offset())
    }
}

// ============================================================================
// Enum : SeriesKey
// ============================================================================

/// Les quatre séries de prix affichables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKey {
    Open,
    Close,
    Low,
    High,
}

impl SeriesKey {
    /// Toutes les séries, dans l'ordre d'affichage
    pub fn all() -> [SeriesKey; 4] {
        [SeriesKey::Open, SeriesKey::Close, SeriesKey::Low, SeriesKey::High]
    }

    /// Label pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            SeriesKey::Open => "Open",
            SeriesKey::Close => "Close",
            SeriesKey::Low => "Low",
            SeriesKey::High => "High",
        }
    }

    /// Position dans `all()`, utilisée comme index de stockage
    fn index(&self) -> usize {
        match self {
            SeriesKey::Open => 0,
            SeriesKey::Close => 1,
            SeriesKey::Low => 2,
            SeriesKey::High => 3,
        }
    }
}

// ============================================================================
// Structure : SeriesVisibility
// ============================================================================
// CONCEPT RUST : tableau de taille fixe indexé par enum
// - Les quatre clés existent toujours, on ne peut que les basculer
// - Pas de HashMap : impossible d'ajouter ou de retirer une clé
// ============================================================================

/// Visibilité de chaque série sur le graphique
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesVisibility {
    flags: [bool; 4],
}

impl SeriesVisibility {
    /// Crée une visibilité avec toutes les séries dans le même état
    pub fn uniform(visible: bool) -> Self {
        Self { flags: [visible; 4] }
    }

    /// Vérifie si une série est visible
    pub fn is_visible(&self, key: SeriesKey) -> bool {
        self.flags[key.index()]
    }

    /// Bascule une série et retourne son nouvel état
    pub fn toggle(&mut self, key: SeriesKey) -> bool {
        let flag = &mut self.flags[key.index()];
        *flag = !*flag;
        *flag
    }

    /// Séries actuellement visibles, dans l'ordre d'affichage
    pub fn visible_keys(&self) -> impl Iterator<Item = SeriesKey> + '_ {
        SeriesKey::all().into_iter().filter(move |key| self.is_visible(*key))
    }
}

impl Default for SeriesVisibility {
    /// Open et Close visibles, Low et High masqués
    fn default() -> Self {
        Self {
            flags: [true, true, false, false],
        }
    }
}

/// Bornes (min low, max high) des séries visibles sur une tranche de barres
///
/// Retourne None si la tranche est vide ou si aucune série n'est visible.
pub fn price_bounds(bars: &[PriceBar], visibility: &SeriesVisibility) -> Option<(f64, f64)> {
    bars.iter()
        .flat_map(move |bar| visibility.visible_keys().map(move |key| bar.value(key)))
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((f64::min(min, value), f64::max(max, value))),
        })
}

// ============================================================================
// Tests unitaires
// ============================================================================
