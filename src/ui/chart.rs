// ============================================================================
// Chart - Rendu du graphique ligne
// ============================================================================
// Consomme { barres, visibilité, domaine, axe X dense } et dessine une ligne
// par série visible.
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : une série par clé visible
// 3. Axis : bornes issues du domaine de zoom
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::loader::LoadState;
use crate::models::domain::visible_x;
use crate::models::{price_bounds, AxisRange, PriceBar, SeriesKey, SeriesVisibility, ZoomDomain};

/// Couleur d'une série
pub fn series_color(key: SeriesKey) -> Color {
    match key {
        SeriesKey::Open => Color::Rgb(0x19, 0x76, 0xD2),
        SeriesKey::Close => Color::Rgb(0xE9, 0x1E, 0x63),
        SeriesKey::Low => Color::Rgb(0x00, 0xBF, 0xAE),
        SeriesKey::High => Color::Rgb(0xFF, 0xA0, 0x00),
    }
}

/// Tout ce dont le rendu a besoin, sans dépendre de App
pub struct ChartView<'a> {
    pub state: &'a LoadState,
    pub visibility: &'a SeriesVisibility,
    pub domain: Option<&'a ZoomDomain>,
    pub dense_x_axis: bool,
}

/// Dessine la zone graphique selon l'état de chargement
pub fn render_chart(frame: &mut Frame, view: &ChartView, area: Rect) {
    match view.state {
        LoadState::Loading => render_message(frame, area, "Loading...", Color::Gray),
        LoadState::Failed(message) => render_message(frame, area, message, Color::Red),
        LoadState::Loaded(bars) if bars.is_empty() => {
            render_message(frame, area, "No data", Color::Gray)
        }
        LoadState::Loaded(bars) => render_chart_graph(frame, view, bars, area),
    }
}

// ============================================================================
// Bornes et labels
// ============================================================================

/// Bornes de l'axe X : plage visible, élargie d'une demi-barre si nulle
pub fn x_bounds(range: AxisRange) -> [f64; 2] {
    if range.is_degenerate() {
        [range.low - 0.5, range.low + 0.5]
    } else {
        [range.low, range.high]
    }
}

/// Bornes de l'axe Y
///
/// Une plage Y explicite (non nulle) dans le domaine l'emporte. Sinon min/max
/// des séries visibles sur les barres visibles, avec 5% de marge.
pub fn y_bounds(
    bars: &[PriceBar],
    visibility: &SeriesVisibility,
    domain: Option<&ZoomDomain>,
    x_range: AxisRange,
) -> [f64; 2] {
    if let Some(y) = domain.and_then(|d| d.y).filter(|y| !y.is_degenerate()) {
        return [y.low, y.high];
    }

    let visible = visible_slice(bars, x_range);
    let Some((min, max)) = price_bounds(visible, visibility) else {
        return [0.0, 1.0];
    };

    let margin = ((max - min) * 0.05).max(0.5);
    [min - margin, max + margin]
}

/// Barres dont l'index tombe dans la plage X
fn visible_slice(bars: &[PriceBar], x_range: AxisRange) -> &[PriceBar] {
    if bars.is_empty() {
        return bars;
    }
    let last = bars.len() - 1;
    let start = (x_range.low.max(0.0).ceil() as usize).min(last);
    let end = (x_range.high.max(0.0).floor() as usize).clamp(start, last);
    &bars[start..=end]
}

/// Label d'une barre : date MM-DD si parsable, sinon timestamp brut
pub fn bar_label(bar: &PriceBar) -> String {
    bar.datetime()
        .map(|dt| dt.format("%m-%d").to_string())
        .unwrap_or_else(|| bar.timestamp.clone())
}

/// Labels de l'axe X
///
/// - dense : une étiquette par barre visible
/// - sinon : début, milieu et fin de la plage visible
pub fn x_labels(bars: &[PriceBar], x_range: AxisRange, dense: bool) -> Vec<String> {
    if bars.is_empty() {
        return Vec::new();
    }

    let visible = visible_slice(bars, x_range);
    if dense {
        return visible.iter().map(bar_label).collect();
    }

    let first = visible.first().map(bar_label).unwrap_or_default();
    let last = visible.last().map(bar_label).unwrap_or_default();
    if visible.len() <= 2 {
        return vec![first, last];
    }
    let middle = bar_label(&visible[visible.len() / 2]);
    vec![first, middle, last]
}

/// Labels de l'axe Y : "$" + valeur
fn y_labels(bounds: [f64; 2]) -> Vec<String> {
    let [low, high] = bounds;
    [low, (low + high) / 2.0, high]
        .iter()
        .map(|value| format!("${:.2}", value))
        .collect()
}

// ============================================================================
// Graphique principal
// ============================================================================

fn render_chart_graph(frame: &mut Frame, view: &ChartView, bars: &[PriceBar], area: Rect) {
    let x_range = visible_x(view.domain, bars.len());
    let x = x_bounds(x_range);
    let y = y_bounds(bars, view.visibility, view.domain, x_range);

    // Points (index, valeur) par série visible
    // Les Dataset empruntent ces Vec : ils doivent vivre jusqu'au rendu
    let series: Vec<(SeriesKey, Vec<(f64, f64)>)> = view
        .visibility
        .visible_keys()
        .map(|key| {
            let points = bars
                .iter()
                .enumerate()
                .map(|(i, bar)| (i as f64, bar.value(key)))
                .collect();
            (key, points)
        })
        .collect();

    let datasets: Vec<Dataset> = series
        .iter()
        .map(|(key, points)| {
            Dataset::default()
                .name(key.label())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(series_color(*key)))
                .data(points)
        })
        .collect();

    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds(x)
        .labels(
            x_labels(bars, x_range, view.dense_x_axis)
                .into_iter()
                .map(Span::raw)
                .collect(),
        );

    let y_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds(y)
        .labels(y_labels(y).into_iter().map(Span::raw).collect());

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White)),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Message centré à la place du graphique (chargement, erreur, vide)
fn render_message(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(color))),
    ];

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(count: usize) -> Vec<PriceBar> {
        (0..count)
            .map(|i| {
                let base = 100.0 + i as f64;
                PriceBar::new(format!("2024-02-{:02}", i + 1), base, base + 1.0, base - 2.0, base + 3.0)
            })
            .collect()
    }

    #[test]
    fn test_x_bounds() {
        assert_eq!(x_bounds(AxisRange::new(2.0, 7.0)), [2.0, 7.0]);
        assert_eq!(x_bounds(AxisRange::new(0.0, 0.0)), [-0.5, 0.5]);
    }

    #[test]
    fn test_y_bounds_from_visible_bars() {
        let bars = bars(10);
        let visibility = SeriesVisibility::default();

        // Open/Close sur les barres 2..=4 : min 102, max 105
        let [low, high] = y_bounds(&bars, &visibility, None, AxisRange::new(2.0, 4.0));
        assert!(low < 102.0 && low > 101.0);
        assert!(high > 105.0 && high < 106.0);
    }

    #[test]
    fn test_y_bounds_explicit_domain_wins() {
        let bars = bars(10);
        let domain = ZoomDomain {
            x: Some(AxisRange::new(0.0, 9.0)),
            y: Some(AxisRange::new(50.0, 60.0)),
        };
        let bounds = y_bounds(&bars, &SeriesVisibility::default(), Some(&domain), AxisRange::new(0.0, 9.0));
        assert_eq!(bounds, [50.0, 60.0]);

        // Le marqueur de reset (plages nulles) ne fige pas l'axe Y
        let reset = ZoomDomain::full_extent();
        let bounds = y_bounds(&bars, &SeriesVisibility::default(), Some(&reset), AxisRange::new(0.0, 9.0));
        assert_ne!(bounds, [0.0, 0.0]);
    }

    #[test]
    fn test_y_bounds_without_visible_series() {
        let bounds = y_bounds(&bars(3), &SeriesVisibility::uniform(false), None, AxisRange::new(0.0, 2.0));
        assert_eq!(bounds, [0.0, 1.0]);
    }

    #[test]
    fn test_sparse_labels() {
        let labels = x_labels(&bars(20), AxisRange::new(0.0, 19.0), false);
        assert_eq!(labels, vec!["02-01", "02-11", "02-20"]);
    }

    #[test]
    fn test_dense_labels_cover_visible_bars() {
        let labels = x_labels(&bars(20), AxisRange::new(3.0, 6.0), true);
        assert_eq!(labels, vec!["02-04", "02-05", "02-06", "02-07"]);
    }

    #[test]
    fn test_label_falls_back_to_raw_timestamp() {
        let bar = PriceBar::new("Q1", 1.0, 1.0, 1.0, 1.0);
        assert_eq!(bar_label(&bar), "Q1");
    }

    #[test]
    fn test_visible_slice_is_clamped() {
        let bars = bars(5);
        assert_eq!(visible_slice(&bars, AxisRange::new(-3.0, 40.0)).len(), 5);
        assert_eq!(visible_slice(&bars, AxisRange::new(1.5, 3.2)).len(), 2);
        assert_eq!(visible_slice(&bars, AxisRange::new(0.0, 0.0)).len(), 1);
    }
}
