use serde::Serialize;

use crate::analysis::ticks::ticks;

/// One histogram bin covering `[x0, x1)`; the last bin also holds `x1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub x0: f64,
    pub x1: f64,
    pub count: usize,
}

/// Fixed-domain histogram with thresholds taken from nice ticks.
///
/// Thresholds at or below the domain start, or above the domain end, are
/// discarded, so a domain `[0, 20000]` with 20 ticks yields bins
/// `[0,1000), [1000,2000), ... [19000,20000), [20000,20000]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    domain: (f64, f64),
    thresholds: Vec<f64>,
}

impl Histogram {
    pub fn with_tick_thresholds(domain: (f64, f64), tick_count: usize) -> Self {
        let (lo, hi) = domain;
        let thresholds = ticks(lo, hi, tick_count)
            .into_iter()
            .filter(|&t| t > lo && t <= hi)
            .collect();
        Self { domain, thresholds }
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn bin_count(&self) -> usize {
        self.thresholds.len() + 1
    }

    /// Counts `values` into bins. Values outside the domain (and NaN) are dropped.
    pub fn bin(&self, values: &[f64]) -> Vec<Bin> {
        let (lo, hi) = self.domain;
        let m = self.thresholds.len();
        let mut bins: Vec<Bin> = (0..=m)
            .map(|i| Bin {
                x0: if i > 0 { self.thresholds[i - 1] } else { lo },
                x1: if i < m { self.thresholds[i] } else { hi },
                count: 0,
            })
            .collect();

        for &v in values {
            if !(lo <= v && v <= hi) {
                continue;
            }
            // Right bisection: a value equal to a threshold starts the next bin.
            let idx = self.thresholds.partition_point(|&t| t <= v);
            bins[idx].count += 1;
        }
        bins
    }
}

pub fn max_bin_count<'a>(series: impl IntoIterator<Item = &'a [Bin]>) -> usize {
    series
        .into_iter()
        .flat_map(|bins| bins.iter().map(|b| b.count))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{Histogram, max_bin_count};
    use proptest::prelude::*;

    fn salary_histogram() -> Histogram {
        Histogram::with_tick_thresholds((0.0, 20_000.0), 20)
    }

    #[test]
    fn salary_domain_has_twenty_one_bins() {
        let h = salary_histogram();
        assert_eq!(h.thresholds().len(), 20);
        assert_eq!(h.bin_count(), 21);
        let bins = h.bin(&[]);
        assert_eq!((bins[0].x0, bins[0].x1), (0.0, 1000.0));
        assert_eq!((bins[20].x0, bins[20].x1), (20_000.0, 20_000.0));
    }

    #[test]
    fn boundaries_and_out_of_domain_values() {
        let bins = salary_histogram().bin(&[0.0, 999.9, 1000.0, 20_000.0, -1.0, 20_001.0, f64::NAN]);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[1].count, 1);
        assert_eq!(bins[20].count, 1);
        let total: usize = bins.iter().map(|b| b.count).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn max_bin_count_spans_all_series() {
        let h = salary_histogram();
        let a = h.bin(&[100.0, 200.0]);
        let b = h.bin(&[5500.0, 5600.0, 5700.0]);
        assert_eq!(max_bin_count([a.as_slice(), b.as_slice()]), 3);
        assert_eq!(max_bin_count(Vec::<&[super::Bin]>::new()), 0);
    }

    proptest! {
        #[test]
        fn in_domain_values_are_counted_once(values in proptest::collection::vec(0.0f64..=20_000.0, 0..64)) {
            let bins = salary_histogram().bin(&values);
            let total: usize = bins.iter().map(|b| b.count).sum();
            prop_assert_eq!(total, values.len());
        }
    }
}
