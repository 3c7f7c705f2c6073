use compute::Statistics;
use dataset::{CountryId, Dataset};
use tracing::debug;

use crate::filter::FilterState;

/// Salaries matching the active filter, per country, in dataset row order.
///
/// Every country of the dataset has an entry (possibly empty).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerCountrySalaries {
    salaries: Vec<Vec<f64>>,
    means: Vec<Option<f64>>,
}

impl PerCountrySalaries {
    pub fn salaries(&self, country: CountryId) -> &[f64] {
        self.salaries
            .get(country.index() as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_data(&self, country: CountryId) -> bool {
        !self.salaries(country).is_empty()
    }

    /// `None` for countries without matching rows.
    pub fn mean(&self, country: CountryId) -> Option<f64> {
        self.means.get(country.index() as usize).copied().flatten()
    }

    pub fn countries_with_data(&self) -> usize {
        self.means.iter().filter(|m| m.is_some()).count()
    }

    /// Non-empty countries with their mean, in ascending id order.
    pub fn means(&self) -> impl Iterator<Item = (CountryId, f64)> + '_ {
        self.means
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.map(|m| (CountryId::new(i as u32), m)))
    }
}

/// Bounds of per-country average salary.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorDomain {
    pub min: f64,
    pub max: f64,
    pub min_country: CountryId,
    pub max_country: CountryId,
}

/// Domain of the sequential color scale.
///
/// `Empty` when no country has data under the filter; callers must check
/// before building a scale.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ColorScaleState {
    Empty,
    Domain(ColorDomain),
}

impl ColorScaleState {
    pub fn domain(&self) -> Option<&ColorDomain> {
        match self {
            ColorScaleState::Empty => None,
            ColorScaleState::Domain(d) => Some(d),
        }
    }

    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.domain().map(|d| (d.min, d.max))
    }
}

/// Full recomputation of the derived views from the dataset and filter.
///
/// One pass over rows; rows with a non-finite salary are skipped.
pub fn recompute(dataset: &Dataset, filter: &FilterState) -> (PerCountrySalaries, ColorScaleState) {
    let mut salaries: Vec<Vec<f64>> = vec![Vec::new(); dataset.country_count()];
    for (country, row) in dataset.rows_with_country() {
        if row.has_valid_salary() && filter.matches(row) {
            salaries[country.index() as usize].push(row.salary);
        }
    }
    let means: Vec<Option<f64>> = salaries.iter().map(|s| Statistics::mean(s)).collect();
    let per_country = PerCountrySalaries { salaries, means };

    let scale = match Statistics::extremes_by(per_country.means()) {
        Some(e) => ColorScaleState::Domain(ColorDomain {
            min: e.min,
            max: e.max,
            min_country: e.min_key,
            max_country: e.max_key,
        }),
        None => ColorScaleState::Empty,
    };

    debug!(
        age = %filter.age,
        profession = %filter.profession,
        countries_with_data = per_country.countries_with_data(),
        domain = ?scale.bounds(),
        "recomputed per-country salaries"
    );
    (per_country, scale)
}
