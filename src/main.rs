// ============================================================================
// StockView - écran graphique
// ============================================================================
// Programme TUI qui affiche l'historique d'un symbole en graphique ligne
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : render → input → tick
// 3. Runtime tokio en arrière-plan : les fetchs tournent sur ses workers,
//    l'état reste possédé par le thread UI
// ============================================================================

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use stockview::api::HistoryClient;
use stockview::app::App;
use stockview::config::Config;
use stockview::loader::DataLoader;
use stockview::ui::{action_for, render, Action, Event, EventHandler};

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne.
// ============================================================================

/// Initialise le logging vers ./logs/stockview.log
///
/// # Utilisation
/// ```bash
/// tail -f logs/stockview.log
/// RUST_LOG=stockview=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::PathBuf::from("./logs");
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "stockview.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockview=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    let config = Config::from_env();
    info!(symbol = %config.symbol, base_url = %config.base_url, "StockView starting up");

    // Le runtime vit jusqu'à la fin de main : ses workers exécutent les fetchs
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let client = HistoryClient::new(config.base_url.clone())
        .context("Échec de la création du client HTTP")?;
    let loader = DataLoader::new(Arc::new(client), runtime.handle().clone());

    let mut app = App::new(loader);
    app.show_symbol(&config.symbol)
        .with_context(|| format!("Symbole invalide : {:?}", config.symbol))?;

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::default();
    let result = run(&mut terminal, &mut app, &events);

    // Les fetchs encore en vol seront ignorés
    app.shutdown();

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event Loop Principal
// ============================================================================

/// Boucle principale : applique les fetchs, dessine, traite une touche
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<HistoryClient>,
    events: &EventHandler,
) -> Result<()> {
    while app.is_running() {
        // 0. Résultats de fetch arrivés depuis le dernier tour
        if app.tick() {
            debug!("Load state changed");
        }

        // 1. Render
        terminal.draw(|frame| render(frame, app))?;

        // 2. Input
        match events.next() {
            Ok(event) => handle_event(app, &event),
            Err(e) => error!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

/// Applique l'action associée à un événement
fn handle_event(app: &mut App<HistoryClient>, event: &Event) {
    let Some(action) = action_for(event) else {
        return;
    };
    debug!(?action, "Handling action");

    match action {
        Action::Quit => {
            info!("User requested quit");
            app.quit();
        }
        Action::ToggleSeries(key) => app.toggle_series(key),
        Action::Pan(direction) => app.pan(direction),
        Action::ZoomIn => app.zoom_in(),
        Action::ZoomOut => app.zoom_out(),
        Action::ResetZoom => app.reset_zoom(),
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Échec de l'activation du raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Échec de la création du terminal")
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
