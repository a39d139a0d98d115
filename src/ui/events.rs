// ============================================================================
// Gestion des événements
// ============================================================================
// Lit le clavier et traduit les touches en actions de l'écran
//
// CONCEPTS RUST :
// 1. Enums avec variants : événements bruts et actions
// 2. Pattern matching sur KeyCode
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

use crate::models::{PanDirection, SeriesKey};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier : l'occasion d'appliquer les résultats de fetch
    Tick,
}

/// Actions déclenchées par le clavier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleSeries(SeriesKey),
    Pan(PanDirection),
    ZoomIn,
    ZoomOut,
    ResetZoom,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// Crée un gestionnaire qui émet un Tick toutes les `tick_rate`
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus tick_rate
    /// - Pas d'événement : Event::Tick
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS on reçoit Press ET Release : on ne garde que Press
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

/// Traduit un événement en action
///
/// - q / Échap : quitter
/// - 1..4 ou o/c/l/h : basculer Open/Close/Low/High
/// - ← / → : pan
/// - + / - : zoom
/// - r : reset du zoom
pub fn action_for(event: &Event) -> Option<Action> {
    let Event::Key(key) = event else {
        return None;
    };

    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('1') | KeyCode::Char('o') => Action::ToggleSeries(SeriesKey::Open),
        KeyCode::Char('2') | KeyCode::Char('c') => Action::ToggleSeries(SeriesKey::Close),
        KeyCode::Char('3') | KeyCode::Char('l') => Action::ToggleSeries(SeriesKey::Low),
        KeyCode::Char('4') | KeyCode::Char('h') => Action::ToggleSeries(SeriesKey::High),
        KeyCode::Left => Action::Pan(PanDirection::Left),
        KeyCode::Right => Action::Pan(PanDirection::Right),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => Action::ZoomIn,
        KeyCode::Char('-') | KeyCode::Down => Action::ZoomOut,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::ResetZoom,
        _ => return None,
    };
    Some(action)
}

/// Raccourci affiché à côté de chaque série dans le panneau "Display"
pub fn series_shortcut(key: SeriesKey) -> char {
    match key {
        SeriesKey::Open => '1',
        SeriesKey::Close => '2',
        SeriesKey::Low => '3',
        SeriesKey::High => '4',
    }
}

// ============================================================================
// Tests
// ============================================================================
