use explorer::{ColorDomain, ColorScaleState};

use crate::symbology::Rgb;

/// Yellow-green-blue sequential scheme, light to dark.
pub const YLGNBU: [u32; 9] = [
    0xffffd9, 0xedf8b1, 0xc7e9b4, 0x7fcdbb, 0x41b6c4, 0x1d91c0, 0x225ea8, 0x253494, 0x081d58,
];

/// Samples the YlGnBu ramp at `t` (clamped to `[0, 1]`) with a uniform cubic
/// B-spline through the scheme colors, one spline per RGB channel.
pub fn interpolate_ylgnbu(t: f64) -> Rgb {
    let stops = YLGNBU.map(Rgb::from_hex);
    let r: Vec<f64> = stops.iter().map(|c| c.r as f64).collect();
    let g: Vec<f64> = stops.iter().map(|c| c.g as f64).collect();
    let b: Vec<f64> = stops.iter().map(|c| c.b as f64).collect();
    Rgb::from_channels(basis_spline(&r, t), basis_spline(&g, t), basis_spline(&b, t))
}

fn basis(t1: f64, v0: f64, v1: f64, v2: f64, v3: f64) -> f64 {
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

/// Endpoints are reflected so the curve passes exactly through the first and
/// last value.
fn basis_spline(values: &[f64], t: f64) -> f64 {
    let n = values.len() - 1;
    let (t, i) = if t.is_nan() || t <= 0.0 {
        (0.0, 0)
    } else if t >= 1.0 {
        (1.0, n - 1)
    } else {
        (t, (t * n as f64).floor() as usize)
    };
    let v1 = values[i];
    let v2 = values[i + 1];
    let v0 = if i > 0 { values[i - 1] } else { 2.0 * v1 - v2 };
    let v3 = if i < n - 1 { values[i + 2] } else { 2.0 * v2 - v1 };
    basis((t - i as f64 / n as f64) * n as f64, v0, v1, v2, v3)
}

/// Maps average salary onto the YlGnBu ramp over `[min, max]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SequentialScale {
    min: f64,
    max: f64,
}

impl SequentialScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn from_domain(domain: &ColorDomain) -> Self {
        Self::new(domain.min, domain.max)
    }

    /// `None` for the empty domain.
    pub fn from_state(state: &ColorScaleState) -> Option<Self> {
        state.domain().map(Self::from_domain)
    }

    /// Position of `value` in the domain; a single-point domain maps to 0.5.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.min == self.max {
            return 0.5;
        }
        (value - self.min) / (self.max - self.min)
    }

    pub fn color(&self, value: f64) -> Rgb {
        interpolate_ylgnbu(self.normalize(value))
    }
}
