// ============================================================================
// Data Loader : cycle de vie du chargement de l'historique
// ============================================================================
// Produit l'état de chargement le plus récent pour un symbole et relance un
// fetch à chaque changement de symbole.
//
// CONCEPTS RUST :
// 1. tokio::spawn via Handle : le fetch tourne en tâche de fond
// 2. mpsc::unbounded_channel : la tâche renvoie son résultat au thread UI
// 3. Compteur de génération : chaque fetch reçoit un numéro, seuls les
//    résultats de la génération courante modifient l'état
//
// L'annulation est coopérative : la requête HTTP peut se terminer, son
// résultat est simplement ignoré.
// ============================================================================

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::HistorySource;
use crate::error::LoadError;
use crate::models::PriceBar;

// ============================================================================
// Enum : LoadState
// ============================================================================

/// État du chargement pour le symbole courant
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// Requête en cours
    Loading,

    /// Barres reçues (au plus HISTORY_LIMIT)
    Loaded(Vec<PriceBar>),

    /// Échec, avec un message lisible
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    /// Barres chargées, vide tant que l'état n'est pas Loaded
    pub fn bars(&self) -> &[PriceBar] {
        match self {
            LoadState::Loaded(bars) => bars,
            _ => &[],
        }
    }

    /// Message d'erreur si l'état est Failed
    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Résultat d'un fetch, étiqueté par sa génération
#[derive(Debug)]
struct FetchOutcome {
    generation: u64,
    symbol: String,
    result: Result<Vec<PriceBar>, LoadError>,
}

// ============================================================================
// Structure : DataLoader
// ============================================================================

/// Chargeur d'historique avec garde contre les résultats périmés
///
/// Toutes les méthodes sont appelées depuis le thread UI. Seul le fetch
/// lui-même s'exécute sur le runtime tokio.
pub struct DataLoader<S: HistorySource> {
    source: Arc<S>,
    runtime: Handle,
    symbol: Option<String>,
    generation: u64,
    state: LoadState,
    outcome_tx: mpsc::UnboundedSender<FetchOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    torn_down: bool,
}

impl<S: HistorySource> DataLoader<S> {
    /// Crée un loader. Aucun fetch n'est lancé avant `set_symbol`.
    pub fn new(source: Arc<S>, runtime: Handle) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            source,
            runtime,
            symbol: None,
            generation: 0,
            state: LoadState::Loading,
            outcome_tx,
            outcome_rx,
            torn_down: false,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// Numéro du fetch courant (0 avant le premier)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Change le symbole et lance un fetch si la valeur a changé
    ///
    /// Retourne Ok(true) si un fetch a été lancé, Ok(false) si le symbole
    /// est identique au courant ou si le loader a été démonté.
    pub fn set_symbol(&mut self, symbol: &str) -> Result<bool, LoadError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            warn!("Rejected empty symbol");
            return Err(LoadError::EmptySymbol);
        }

        if self.torn_down {
            debug!(ticker = %symbol, "Loader torn down, ignoring symbol change");
            return Ok(false);
        }

        if self.symbol.as_deref() == Some(symbol) {
            debug!(ticker = %symbol, "Symbol unchanged, no refetch");
            return Ok(false);
        }

        self.generation += 1;
        self.symbol = Some(symbol.to_string());
        self.state = LoadState::Loading;
        info!(ticker = %symbol, generation = self.generation, "Starting history fetch");

        self.spawn_fetch(symbol.to_string(), self.generation);
        Ok(true)
    }

    /// Lance le fetch en tâche de fond
    fn spawn_fetch(&self, symbol: String, generation: u64) {
        let source = Arc::clone(&self.source);
        let outcome_tx = self.outcome_tx.clone();

        self.runtime.spawn(async move {
            let result = source.fetch_history(&symbol).await;
            let outcome = FetchOutcome {
                generation,
                symbol,
                result,
            };

            // Échec d'envoi : le loader a été démonté entre-temps
            if let Err(unsent) = outcome_tx.send(outcome) {
                debug!(ticker = %unsent.0.symbol, generation, "Loader gone, dropping fetch result");
            }
        });
    }

    /// Applique un résultat s'il appartient à la génération courante
    fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if self.torn_down || outcome.generation != self.generation {
            debug!(
                ticker = %outcome.symbol,
                generation = outcome.generation,
                current = self.generation,
                "Discarding stale fetch result"
            );
            return false;
        }

        self.state = match outcome.result {
            Ok(bars) => {
                info!(ticker = %outcome.symbol, bars = bars.len(), "History loaded");
                LoadState::Loaded(bars)
            }
            Err(err) => {
                warn!(ticker = %outcome.symbol, error = %err, "History load failed");
                LoadState::Failed(err.to_string())
            }
        };
        true
    }

    /// Applique les résultats déjà arrivés sans bloquer
    ///
    /// Appelé à chaque tick de la boucle UI. Retourne true si l'état a changé.
    pub fn try_settle(&mut self) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            changed |= self.apply(outcome);
        }
        changed
    }

    /// Attend le prochain résultat et l'applique
    ///
    /// Retourne true si l'état a changé, false pour un résultat périmé ou un
    /// loader démonté. Attend indéfiniment si aucun fetch n'est en cours.
    pub async fn settle(&mut self) -> bool {
        match self.outcome_rx.recv().await {
            Some(outcome) => self.apply(outcome),
            None => false,
        }
    }

    /// Démonte le loader : plus aucun résultat ne sera appliqué
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        info!(generation = self.generation, "Tearing down data loader");
        self.torn_down = true;
        self.generation += 1;
        self.outcome_rx.close();
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use tokio::sync::oneshot;

    type FetchResult = Result<Vec<PriceBar>, LoadError>;

    /// Source dont chaque réponse est libérée à la main par le test
    #[derive(Default)]
    struct GatedSource {
        gates: Mutex<HashMap<String, oneshot::Receiver<FetchResult>>>,
        calls: AtomicUsize,
    }

    impl GatedSource {
        fn gate(&self, symbol: &str) -> oneshot::Sender<FetchResult> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(symbol.to_string(), rx);
            tx
        }
    }

    impl HistorySource for GatedSource {
        fn fetch_history(&self, symbol: &str) -> impl Future<Output = FetchResult> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gates.lock().unwrap().remove(symbol);
            let symbol = symbol.to_string();
            async move {
                match gate {
                    Some(rx) => rx
                        .await
                        .unwrap_or_else(|_| Err(LoadError::Network("gate dropped".into()))),
                    None => Err(LoadError::Network(format!("no gate for {}", symbol))),
                }
            }
        }
    }

    fn bars(count: usize) -> Vec<PriceBar> {
        (0..count)
            .map(|i| PriceBar::new(format!("t{}", i), i as f64, i as f64, i as f64, i as f64))
            .collect()
    }

    fn loader(source: &Arc<GatedSource>) -> DataLoader<GatedSource> {
        DataLoader::new(Arc::clone(source), Handle::current())
    }

    #[tokio::test]
    async fn test_loading_then_loaded() {
        let source = Arc::new(GatedSource::default());
        let gate = source.gate("AAPL");
        let mut loader = loader(&source);

        assert!(loader.set_symbol("AAPL").unwrap());
        assert!(loader.state().is_loading());
        assert_eq!(loader.symbol(), Some("AAPL"));

        gate.send(Ok(bars(5))).unwrap();
        assert!(loader.settle().await);
        assert_eq!(loader.state(), &LoadState::Loaded(bars(5)));
        assert_eq!(loader.state().bars().len(), 5);
    }

    #[tokio::test]
    async fn test_loading_then_failed() {
        let source = Arc::new(GatedSource::default());
        let gate = source.gate("AAPL");
        let mut loader = loader(&source);

        loader.set_symbol("AAPL").unwrap();
        gate.send(Err(LoadError::Network("connection reset".into()))).unwrap();

        assert!(loader.settle().await);
        let message = loader.state().error().unwrap();
        assert!(message.contains("connection reset"));
        assert!(loader.state().bars().is_empty());
    }

    #[tokio::test]
    async fn test_same_symbol_does_not_refetch() {
        let source = Arc::new(GatedSource::default());
        let gate = source.gate("AAPL");
        let mut loader = loader(&source);

        assert!(loader.set_symbol("AAPL").unwrap());
        assert!(!loader.set_symbol("AAPL").unwrap());
        assert_eq!(loader.generation(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        gate.send(Ok(bars(2))).unwrap();
        loader.settle().await;
        assert_eq!(loader.state().bars().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_symbol_rejected() {
        let source = Arc::new(GatedSource::default());
        let mut loader = loader(&source);

        assert_eq!(loader.set_symbol("  "), Err(LoadError::EmptySymbol));
        assert_eq!(loader.generation(), 0);
        assert_eq!(loader.symbol(), None);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stale_response_after_symbol_change_is_discarded() {
        let source = Arc::new(GatedSource::default());
        let aapl = source.gate("AAPL");
        let msft = source.gate("MSFT");
        let mut loader = loader(&source);

        loader.set_symbol("AAPL").unwrap();
        loader.set_symbol("MSFT").unwrap();
        assert!(loader.state().is_loading());

        msft.send(Ok(bars(3))).unwrap();
        assert!(loader.settle().await);
        assert_eq!(loader.state(), &LoadState::Loaded(bars(3)));

        // La réponse AAPL arrive après coup : aucun effet
        aapl.send(Ok(bars(9))).unwrap();
        assert!(!loader.settle().await);
        assert_eq!(loader.state(), &LoadState::Loaded(bars(3)));
    }

    #[tokio::test]
    async fn test_stale_response_while_new_fetch_pending() {
        let source = Arc::new(GatedSource::default());
        let aapl = source.gate("AAPL");
        let msft = source.gate("MSFT");
        let mut loader = loader(&source);

        loader.set_symbol("AAPL").unwrap();
        loader.set_symbol("MSFT").unwrap();

        // AAPL se termine en premier : l'état reste Loading pour MSFT
        aapl.send(Err(LoadError::Status(500))).unwrap();
        assert!(!loader.settle().await);
        assert!(loader.state().is_loading());

        msft.send(Ok(bars(1))).unwrap();
        assert!(loader.settle().await);
        assert_eq!(loader.state().bars().len(), 1);
    }

    #[tokio::test]
    async fn test_switching_back_refetches() {
        let source = Arc::new(GatedSource::default());
        let first = source.gate("AAPL");
        let mut loader = loader(&source);

        loader.set_symbol("AAPL").unwrap();
        first.send(Ok(bars(1))).unwrap();
        loader.settle().await;

        let msft = source.gate("MSFT");
        loader.set_symbol("MSFT").unwrap();
        msft.send(Ok(bars(2))).unwrap();
        loader.settle().await;

        let second = source.gate("AAPL");
        assert!(loader.set_symbol("AAPL").unwrap());
        assert!(loader.state().is_loading());
        second.send(Ok(bars(4))).unwrap();
        loader.settle().await;

        assert_eq!(loader.state().bars().len(), 4);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(loader.generation(), 3);
    }

    #[tokio::test]
    async fn test_try_settle_is_non_blocking() {
        let source = Arc::new(GatedSource::default());
        let gate = source.gate("AAPL");
        let mut loader = loader(&source);

        loader.set_symbol("AAPL").unwrap();
        assert!(!loader.try_settle());
        assert!(loader.state().is_loading());

        gate.send(Ok(bars(2))).unwrap();
        for _ in 0..100 {
            if loader.try_settle() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(loader.state().bars().len(), 2);
    }

    #[tokio::test]
    async fn test_teardown_discards_pending_result() {
        let source = Arc::new(GatedSource::default());
        let gate = source.gate("AAPL");
        let mut loader = loader(&source);

        loader.set_symbol("AAPL").unwrap();
        loader.teardown();

        gate.send(Ok(bars(5))).unwrap();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert!(!loader.try_settle());
        assert!(!loader.settle().await);
        assert!(loader.state().is_loading());

        // Plus de fetch après démontage
        assert!(!loader.set_symbol("MSFT").unwrap());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_loader_ignores_late_result() {
        let source = Arc::new(GatedSource::default());
        let gate = source.gate("AAPL");
        let mut loader = loader(&source);

        loader.set_symbol("AAPL").unwrap();
        drop(loader);

        // La tâche termine sans paniquer malgré le receiver fermé
        gate.send(Ok(bars(1))).unwrap();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }
}
