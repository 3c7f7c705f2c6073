//! "Nice" linear tick values: steps of 1, 2 or 5 times a power of ten.

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Signed step for roughly `count` ticks over `[start, stop]`.
///
/// Positive results are the step itself; negative results `-k` mean a step of
/// `1 / k`, which keeps sub-unit steps exact.
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -10f64.powf(-power) / factor
    }
}

/// Evenly spaced round values inside `[start, stop]` (either order).
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if !start.is_finite() || !stop.is_finite() || count == 0 {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };

    let inc = tick_increment(lo, hi, count);
    if inc == 0.0 || !inc.is_finite() {
        return Vec::new();
    }

    let mut out: Vec<f64> = if inc > 0.0 {
        let first = (lo / inc).ceil() as i64;
        let last = (hi / inc).floor() as i64;
        (first..=last).map(|i| i as f64 * inc).collect()
    } else {
        let inv = -inc;
        let first = (lo * inv).ceil() as i64;
        let last = (hi * inv).floor() as i64;
        (first..=last).map(|i| i as f64 / inv).collect()
    };
    if reverse {
        out.reverse();
    }
    out
}
