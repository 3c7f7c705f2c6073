use compute::ticks;
use explorer::ColorScaleState;
use serde::Serialize;

use crate::config::LegendConfig;
use crate::scale::interpolate_ylgnbu;

/// Data for the color legend: title, axis ticks and a sampled ramp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    /// `None` when no country has data.
    pub domain: Option<[f64; 2]>,
    pub ticks: Vec<f64>,
    /// CSS colors for evenly spaced positions along the ramp.
    pub ramp: Vec<String>,
}

pub fn legend(state: &ColorScaleState, config: &LegendConfig) -> Legend {
    let domain = state.bounds().map(|(lo, hi)| [lo, hi]);
    let ticks = match domain {
        Some([lo, hi]) => ticks(lo, hi, config.ticks),
        None => Vec::new(),
    };
    Legend {
        title: config.title.clone(),
        domain,
        ticks,
        ramp: ramp(config.ramp_samples),
    }
}

fn ramp(samples: usize) -> Vec<String> {
    let last = samples.saturating_sub(1).max(1) as f64;
    (0..samples)
        .map(|i| interpolate_ylgnbu(i as f64 / last).css())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::legend;
    use crate::config::LegendConfig;
    use dataset::CountryId;
    use explorer::{ColorDomain, ColorScaleState};
    use pretty_assertions::assert_eq;

    fn state(min: f64, max: f64) -> ColorScaleState {
        ColorScaleState::Domain(ColorDomain {
            min,
            max,
            min_country: CountryId::new(0),
            max_country: CountryId::new(1),
        })
    }

    #[test]
    fn ticks_span_the_domain() {
        let l = legend(&state(1000.0, 4000.0), &LegendConfig::default());
        assert_eq!(l.title, "Average monthly income (EUR)");
        assert_eq!(l.domain, Some([1000.0, 4000.0]));
        assert_eq!(l.ticks.first(), Some(&1000.0));
        assert_eq!(l.ticks.last(), Some(&4000.0));
        assert_eq!(l.ticks.len(), 16);
        assert_eq!(l.ticks[1], 1200.0);
    }

    #[test]
    fn ramp_runs_light_to_dark() {
        let l = legend(&state(0.0, 1.0), &LegendConfig::default());
        assert_eq!(l.ramp.len(), 256);
        assert_eq!(l.ramp[0], "rgb(255, 255, 217)");
        assert_eq!(l.ramp[255], "rgb(8, 29, 88)");
    }

    #[test]
    fn empty_domain_has_no_ticks() {
        let l = legend(&ColorScaleState::Empty, &LegendConfig::default());
        assert_eq!(l.domain, None);
        assert!(l.ticks.is_empty());
        assert_eq!(l.ramp.len(), 256);
    }
}
