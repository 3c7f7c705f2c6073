use compute::{Bin, Histogram, max_bin_count};
use explorer::{Explorer, SelectionSet};
use serde::Serialize;

use crate::config::PresentationConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySeries {
    pub country: String,
    pub salaries: Vec<f64>,
}

/// Salary lists of the compared countries, in ascending country order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Distribution {
    pub series: Vec<CountrySeries>,
}

impl Distribution {
    pub fn countries(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.country.as_str()).collect()
    }
}

/// Filtered salaries restricted to members of `selection`.
pub fn distribution_for(explorer: &Explorer, selection: &SelectionSet) -> Distribution {
    let dataset = explorer.dataset();
    let series = selection
        .iter()
        .filter_map(|id| {
            let country = dataset.country_name(id)?;
            Some(CountrySeries {
                country: country.to_string(),
                salaries: explorer.per_country().salaries(id).to_vec(),
            })
        })
        .collect();
    Distribution { series }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolinSeries {
    pub country: String,
    pub bins: Vec<Bin>,
}

/// Binned distribution for the violin view.
///
/// `max_bin_count` is the widest bin over all series; the renderer scales
/// violin width so that bin spans the full band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolinPlot {
    pub domain: [f64; 2],
    pub series: Vec<ViolinSeries>,
    pub max_bin_count: usize,
}

pub fn violin_plot(distribution: &Distribution, config: &PresentationConfig) -> ViolinPlot {
    let [lo, hi] = config.histogram_domain;
    let histogram = Histogram::with_tick_thresholds((lo, hi), config.histogram_ticks);
    let series: Vec<ViolinSeries> = distribution
        .series
        .iter()
        .map(|s| ViolinSeries {
            country: s.country.clone(),
            bins: histogram.bin(&s.salaries),
        })
        .collect();
    let max_bin_count = max_bin_count(series.iter().map(|s| s.bins.as_slice()));
    ViolinPlot {
        domain: config.histogram_domain,
        series,
        max_bin_count,
    }
}
