pub struct Statistics;

/// Smallest and largest keyed value seen by `Statistics::extremes_by`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Extremes<K> {
    pub min: f64,
    pub min_key: K,
    pub max: f64,
    pub max_key: K,
}

impl Statistics {
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        for &v in values {
            sum += v;
        }
        Some(sum / values.len() as f64)
    }

    /// Single scan for the min and max value and the keys they came from.
    ///
    /// Comparison is strict, so on ties the first key in iteration order wins.
    /// NaN values never replace a current extreme.
    pub fn extremes_by<K: Copy>(items: impl IntoIterator<Item = (K, f64)>) -> Option<Extremes<K>> {
        let mut it = items.into_iter().filter(|(_, v)| !v.is_nan());
        let (k0, v0) = it.next()?;
        let mut out = Extremes {
            min: v0,
            min_key: k0,
            max: v0,
            max_key: k0,
        };
        for (k, v) in it {
            if v < out.min {
                out.min = v;
                out.min_key = k;
            }
            if v > out.max {
                out.max = v;
                out.max_key = k;
            }
        }
        Some(out)
    }
}
