// ============================================================================
// Structure : App
// ============================================================================
// État de l'écran graphique
//
// CONCEPTS RUST :
// 1. State Management : tout l'état de l'écran dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour chaque transition
// 3. Générique sur HistorySource : l'écran ne connaît pas reqwest
//
// PATTERN : "Application State"
// - L'UI lit depuis App
// - Les événements clavier passent par les méthodes de App
// ============================================================================

use tracing::{debug, info};

use crate::api::HistorySource;
use crate::error::LoadError;
use crate::loader::{DataLoader, LoadState};
use crate::models::domain::{self, PanDirection};
use crate::models::{PriceBar, SeriesKey, SeriesVisibility, ZoomDomain};
use crate::zoom::ZoomController;

/// État principal de l'écran
pub struct App<S: HistorySource> {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Séries affichées (Open, Close, Low, High)
    pub visibility: SeriesVisibility,

    /// Domaine visible et flag d'axe X dense
    pub zoom: ZoomController,

    /// Chargement de l'historique du symbole
    loader: DataLoader<S>,
}

impl<S: HistorySource> App<S> {
    /// Crée l'écran autour d'un loader, sans lancer de fetch
    pub fn new(loader: DataLoader<S>) -> Self {
        Self {
            running: true,
            visibility: SeriesVisibility::default(),
            zoom: ZoomController::new(),
            loader,
        }
    }

    /// Monte l'écran sur un symbole (ou en change)
    ///
    /// Retourne Ok(true) si un nouveau fetch a été lancé.
    pub fn show_symbol(&mut self, symbol: &str) -> Result<bool, LoadError> {
        self.loader.set_symbol(symbol)
    }

    /// Titre de l'écran : "<SYMBOL> Market Data"
    pub fn title(&self) -> String {
        format!("{} Market Data", self.loader.symbol().unwrap_or("-"))
    }

    pub fn load_state(&self) -> &LoadState {
        self.loader.state()
    }

    /// Barres chargées (vide si Loading ou Failed)
    pub fn bars(&self) -> &[PriceBar] {
        self.loader.state().bars()
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Tick : applique les résultats de fetch arrivés depuis le dernier tour
    pub fn tick(&mut self) -> bool {
        self.loader.try_settle()
    }

    /// Attend le prochain résultat de fetch
    pub async fn settle(&mut self) -> bool {
        self.loader.settle().await
    }

    /// Démonte l'écran : les fetchs en vol sont ignorés
    pub fn shutdown(&mut self) {
        self.loader.teardown();
    }

    // ========================================================================
    // Séries
    // ========================================================================

    /// Bascule l'affichage d'une série
    pub fn toggle_series(&mut self, key: SeriesKey) {
        let visible = self.visibility.toggle(key);
        debug!(series = key.label(), visible, "Toggled series");
    }

    // ========================================================================
    // Zoom / Pan
    // ========================================================================

    /// Callback du rendu : nouveau domaine issu d'un geste
    pub fn on_domain_change(&mut self, domain: Option<ZoomDomain>) {
        let total = self.bars().len();
        self.zoom.apply_domain_change(domain, total);
    }

    /// Bouton "Reset Zoom"
    pub fn reset_zoom(&mut self) {
        info!("User reset zoom");
        self.zoom.reset();
    }

    /// Décale la fenêtre visible
    pub fn pan(&mut self, direction: PanDirection) {
        let next = domain::pan(self.zoom.domain(), self.bars().len(), direction);
        self.emit_gesture(next);
    }

    /// Resserre la fenêtre visible
    pub fn zoom_in(&mut self) {
        let next = domain::zoom_in(self.zoom.domain(), self.bars().len());
        self.emit_gesture(next);
    }

    /// Élargit la fenêtre visible
    pub fn zoom_out(&mut self) {
        let next = domain::zoom_out(self.zoom.domain(), self.bars().len());
        self.emit_gesture(next);
    }

    /// Les gestes sans données ne produisent rien
    fn emit_gesture(&mut self, next: Option<ZoomDomain>) {
        if let Some(domain) = next {
            self.on_domain_change(Some(domain));
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
