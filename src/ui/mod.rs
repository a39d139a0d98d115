// ============================================================================
// Module : ui
// ============================================================================
// Écran unique : titre, graphique, bouton de reset, panneau "Display"
//
// CONCEPTS RATATUI :
// 1. Layout : découpage vertical de l'écran
// 2. Paragraph : titre, aide et cases à cocher
// ============================================================================

pub mod chart;  // Rendu du graphique ligne
pub mod events; // Clavier et actions

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::api::HistorySource;
use crate::app::App;
use crate::models::SeriesKey;

use self::chart::{render_chart, series_color, ChartView};
use self::events::series_shortcut;

// Re-exports pour simplifier les imports
pub use events::{action_for, Action, Event, EventHandler};

/// Dessine l'écran complet
pub fn render<S: HistorySource>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Titre
            Constraint::Min(10),    // Graphique
            Constraint::Length(1),  // Reset Zoom + aide
            Constraint::Length(6),  // Display
        ])
        .split(frame.size())
        .to_vec();

    render_header(frame, &app.title(), chunks[0]);

    let view = ChartView {
        state: app.load_state(),
        visibility: &app.visibility,
        domain: app.zoom.domain(),
        dense_x_axis: app.zoom.dense_x_axis(),
    };
    render_chart(frame, &view, chunks[1]);

    render_controls(frame, chunks[2]);
    render_display_panel(frame, app, chunks[3]);
}

/// Titre centré
fn render_header(frame: &mut Frame, title: &str, area: Rect) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        title.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::BOTTOM))
    .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Ligne d'aide, alignée à droite comme le bouton "Reset Zoom"
fn render_controls(frame: &mut Frame, area: Rect) {
    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let line = Line::from(vec![
        Span::styled("←/→", key_style),
        Span::raw(" pan  "),
        Span::styled("+/-", key_style),
        Span::raw(" zoom  "),
        Span::styled("[r]", key_style),
        Span::raw(" Reset Zoom  "),
        Span::styled("[q]", key_style),
        Span::raw(" quit "),
    ]);

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Right), area);
}

/// Cases à cocher des séries, dans la couleur de chaque série
fn render_display_panel<S: HistorySource>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let lines: Vec<Line> = SeriesKey::all()
        .into_iter()
        .map(|key| {
            let color = series_color(key);
            let checkbox = if app.visibility.is_visible(key) { "[■]" } else { "[ ]" };
            Line::from(vec![
                Span::styled(checkbox, Style::default().fg(color)),
                Span::raw(format!(" {} ", series_shortcut(key))),
                Span::raw(key.label()),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Display ")
        .title_style(Style::default().add_modifier(Modifier::BOLD));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::future::Future;
    use std::sync::Arc;

    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use tokio::runtime::Handle;

    use crate::error::LoadError;
    use crate::loader::DataLoader;
    use crate::models::PriceBar;

    struct FixedSource(Result<Vec<PriceBar>, LoadError>);

    impl HistorySource for FixedSource {
        fn fetch_history(
            &self,
            _symbol: &str,
        ) -> impl Future<Output = Result<Vec<PriceBar>, LoadError>> + Send {
            let result = self.0.clone();
            async move { result }
        }
    }

    fn buffer_text(buffer: &Buffer) -> String {
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    async fn draw(result: Result<Vec<PriceBar>, LoadError>, settle: bool) -> String {
        let mut app = App::new(DataLoader::new(Arc::new(FixedSource(result)), Handle::current()));
        app.show_symbol("AAPL").unwrap();
        if settle {
            app.settle().await;
        }

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[tokio::test]
    async fn test_render_loading() {
        let text = draw(Ok(Vec::new()), false).await;
        assert!(text.contains("AAPL Market Data"));
        assert!(text.contains("Loading..."));
        assert!(text.contains("Display"));
    }

    #[tokio::test]
    async fn test_render_error_message() {
        let text = draw(Err(LoadError::Status(500)), true).await;
        assert!(text.contains("market data service returned HTTP 500"));
    }

    #[tokio::test]
    async fn test_render_loaded_chart() {
        let bars = (0..5)
            .map(|i| PriceBar::new(format!("2024-03-{:02}", i + 1), 10.0, 11.0, 9.0, 12.0))
            .collect();
        let text = draw(Ok(bars), true).await;
        assert!(text.contains("03-01"));
        assert!(!text.contains("Loading..."));
    }
}
