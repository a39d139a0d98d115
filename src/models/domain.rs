// ============================================================================
// Structures : AxisRange et ZoomDomain
// ============================================================================
// Fenêtre visible du graphique dans l'espace de coordonnées
// - x : index des barres (0 = plus ancienne)
// - y : prix
//
// CONCEPT : Trois états distincts pour le domaine
// - Option<ZoomDomain>::None  : jamais défini, afficher tout
// - ZoomDomain { x: None, .. } : domaine sans plage X (geste vide)
// - ZoomDomain::full_extent()  : marqueur de largeur nulle posé par reset,
//                                interprété comme "tout afficher" au rendu
// ============================================================================

/// Plage numérique sur un axe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub low: f64,
    pub high: f64,
}

impl AxisRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Largeur de la plage (high - low)
    pub fn span(&self) -> f64 {
        self.high - self.low
    }

    /// Vrai pour une plage de largeur nulle (ou inversée)
    pub fn is_degenerate(&self) -> bool {
        self.span() <= 0.0
    }

    /// Plage X complète pour `total` barres : [0, total - 1]
    pub fn full_x(total: usize) -> Self {
        Self::new(0.0, total.saturating_sub(1) as f64)
    }
}

/// Domaine visible du graphique
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomDomain {
    /// Plage X (None : geste sans plage X)
    pub x: Option<AxisRange>,

    /// Plage Y (None : dérivée des données au rendu)
    pub y: Option<AxisRange>,
}

impl ZoomDomain {
    /// Domaine limité à une plage X, Y laissé au rendu
    pub fn from_x(low: f64, high: f64) -> Self {
        Self {
            x: Some(AxisRange::new(low, high)),
            y: None,
        }
    }

    /// Marqueur "étendue complète" posé par reset : deux plages nulles
    pub fn full_extent() -> Self {
        Self {
            x: Some(AxisRange::new(0.0, 0.0)),
            y: Some(AxisRange::new(0.0, 0.0)),
        }
    }

    /// Vrai si le domaine est le marqueur posé par reset
    pub fn is_full_extent(&self) -> bool {
        *self == Self::full_extent()
    }
}

// ============================================================================
// Gestes clavier : pan et zoom sur l'axe X
// ============================================================================
// Les gestes produisent toujours des plages ordonnées (low <= high) et
// bornées à [0, total - 1]. Le contrôleur les stocke telles quelles.
// ============================================================================

/// Direction d'un pan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Left,
    Right,
}

/// Plage X effectivement visible pour un domaine donné
///
/// Un domaine absent, sans plage X, ou de largeur nulle affiche tout.
pub fn visible_x(domain: Option<&ZoomDomain>, total: usize) -> AxisRange {
    match domain.and_then(|d| d.x) {
        Some(range) if !range.is_degenerate() => range,
        _ => AxisRange::full_x(total),
    }
}

/// Décale la fenêtre visible d'un quart de sa largeur (au moins une barre)
///
/// Retourne None si aucune donnée n'est chargée.
pub fn pan(domain: Option<&ZoomDomain>, total: usize, direction: PanDirection) -> Option<ZoomDomain> {
    if total == 0 {
        return None;
    }

    let full = AxisRange::full_x(total);
    let current = visible_x(domain, total);
    let span = current.span();
    let step = (span / 4.0).max(1.0);

    let low = match direction {
        PanDirection::Left => current.low - step,
        PanDirection::Right => current.low + step,
    };

    Some(place(low, span, full))
}

/// Divise par deux la largeur visible autour du centre (minimum une barre)
pub fn zoom_in(domain: Option<&ZoomDomain>, total: usize) -> Option<ZoomDomain> {
    if total == 0 {
        return None;
    }

    let full = AxisRange::full_x(total);
    let current = visible_x(domain, total);
    let span = current.span();
    if span <= 1.0 {
        return Some(ZoomDomain::from_x(current.low, current.high));
    }

    let new_span = (span / 2.0).max(1.0);
    let center = (current.low + current.high) / 2.0;
    Some(place(center - new_span / 2.0, new_span, full))
}

/// Double la largeur visible autour du centre (bornée à la plage complète)
pub fn zoom_out(domain: Option<&ZoomDomain>, total: usize) -> Option<ZoomDomain> {
    if total == 0 {
        return None;
    }

    let full = AxisRange::full_x(total);
    let current = visible_x(domain, total);
    let new_span = (current.span() * 2.0).min(full.span());
    let center = (current.low + current.high) / 2.0;
    Some(place(center - new_span / 2.0, new_span, full))
}

/// Place une fenêtre de largeur `span` à partir de `low`, bornée à `full`
fn place(low: f64, span: f64, full: AxisRange) -> ZoomDomain {
    let max_low = (full.high - span).max(full.low);
    let low = low.clamp(full.low, max_low);
    ZoomDomain::from_x(low, low + span)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_extent_marker() {
        let marker = ZoomDomain::full_extent();
        assert!(marker.is_full_extent());
        assert!(marker.x.unwrap().is_degenerate());
        assert!(!ZoomDomain::from_x(0.0, 5.0).is_full_extent());
    }

    #[test]
    fn test_visible_x_falls_back_to_full_range() {
        assert_eq!(visible_x(None, 20), AxisRange::new(0.0, 19.0));
        assert_eq!(visible_x(Some(&ZoomDomain::full_extent()), 20), AxisRange::new(0.0, 19.0));

        let empty_x = ZoomDomain { x: None, y: None };
        assert_eq!(visible_x(Some(&empty_x), 20), AxisRange::new(0.0, 19.0));

        let zoomed = ZoomDomain::from_x(3.0, 8.0);
        assert_eq!(visible_x(Some(&zoomed), 20), AxisRange::new(3.0, 8.0));
    }

    #[test]
    fn test_zoom_in_halves_span_around_center() {
        let domain = zoom_in(None, 21).unwrap();
        assert_eq!(domain.x, Some(AxisRange::new(5.0, 15.0)));
        assert_eq!(domain.y, None);

        // Largeur minimale : une barre
        let tight = ZoomDomain::from_x(4.0, 5.0);
        assert_eq!(zoom_in(Some(&tight), 21).unwrap().x, Some(AxisRange::new(4.0, 5.0)));
    }

    #[test]
    fn test_zoom_out_is_bounded_by_full_range() {
        let domain = ZoomDomain::from_x(0.0, 10.0);
        let out = zoom_out(Some(&domain), 21).unwrap();
        assert_eq!(out.x, Some(AxisRange::new(0.0, 20.0)));

        let again = zoom_out(Some(&out), 21).unwrap();
        assert_eq!(again.x, Some(AxisRange::new(0.0, 20.0)));
    }

    #[test]
    fn test_pan_keeps_span_and_clamps() {
        let domain = ZoomDomain::from_x(0.0, 8.0);

        let right = pan(Some(&domain), 20, PanDirection::Right).unwrap();
        assert_eq!(right.x, Some(AxisRange::new(2.0, 10.0)));

        let left = pan(Some(&domain), 20, PanDirection::Left).unwrap();
        assert_eq!(left.x, Some(AxisRange::new(0.0, 8.0)));

        let end = ZoomDomain::from_x(10.0, 19.0);
        let clamped = pan(Some(&end), 20, PanDirection::Right).unwrap();
        assert_eq!(clamped.x, Some(AxisRange::new(10.0, 19.0)));
    }

    #[test]
    fn test_gestures_without_data() {
        assert!(pan(None, 0, PanDirection::Left).is_none());
        assert!(zoom_in(None, 0).is_none());
        assert!(zoom_out(None, 0).is_none());
    }

    #[test]
    fn test_gestures_produce_ordered_ranges() {
        let mut domain = None;
        for _ in 0..6 {
            domain = zoom_in(domain.as_ref(), 20);
            let range = domain.unwrap().x.unwrap();
            assert!(range.low <= range.high);
            assert!(range.low >= 0.0 && range.high <= 19.0);
        }
        for direction in [PanDirection::Right, PanDirection::Right, PanDirection::Left] {
            domain = pan(domain.as_ref(), 20, direction);
            let range = domain.unwrap().x.unwrap();
            assert!(range.low <= range.high);
            assert!(range.low >= 0.0 && range.high <= 19.0);
        }
    }
}
