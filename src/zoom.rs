// ============================================================================
// Zoom/Pan Controller
// ============================================================================
// Possède le domaine visible du graphique et le flag "axe X dense".
//
// Deux déclencheurs seulement :
// - apply_domain_change : chaque geste pan/zoom, domaine remplacé en bloc
// - reset : retour à l'étendue complète, flag dense remis à false
//
// CONCEPT : Reducer
// - Transitions pures sur un état possédé, pas d'état global
// - Pas d'historique : seul le domaine courant est conservé
// ============================================================================

use tracing::debug;

use crate::models::ZoomDomain;

/// État du zoom pour l'écran
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoomController {
    domain: Option<ZoomDomain>,
    dense_x_axis: bool,
}

impl ZoomController {
    /// Domaine non défini, axe X clairsemé
    pub fn new() -> Self {
        Self::default()
    }

    /// Domaine courant (None : jamais défini, tout afficher)
    pub fn domain(&self) -> Option<&ZoomDomain> {
        self.domain.as_ref()
    }

    /// Vrai si le rendu doit étiqueter chaque barre visible
    pub fn dense_x_axis(&self) -> bool {
        self.dense_x_axis
    }

    /// Stocke un nouveau domaine issu d'un geste
    ///
    /// Le flag dense n'est recalculé que si le domaine existe, a une plage X
    /// et que des barres sont chargées. Sinon il garde sa valeur.
    pub fn apply_domain_change(&mut self, domain: Option<ZoomDomain>, total_bars: usize) {
        self.domain = domain;

        let Some(x) = domain.and_then(|d| d.x) else {
            debug!("Domain without x-range, dense flag unchanged");
            return;
        };
        if total_bars == 0 {
            debug!("No bars loaded, dense flag unchanged");
            return;
        }

        let span = x.span();
        let threshold = (total_bars - 1) as f64;
        self.dense_x_axis = span < threshold;
        debug!(span, total_bars, dense = self.dense_x_axis, "Applied domain change");
    }

    /// Revient à l'étendue complète
    pub fn reset(&mut self) {
        self.domain = Some(ZoomDomain::full_extent());
        self.dense_x_axis = false;
        debug!("Zoom reset to full extent");
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
