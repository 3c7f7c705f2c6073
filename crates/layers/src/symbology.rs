use serde::Serialize;

use crate::config::PresentationConfig;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `0xRRGGBB`.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Rounds and clamps float channels in `[0, 255]`.
    pub fn from_channels(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
        }
    }

    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

fn channel(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// How a country is painted on the map.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorSpec {
    NoData,
    Selected,
    Sequential(Rgb),
}

impl ColorSpec {
    pub fn css(&self, config: &PresentationConfig) -> String {
        match self {
            ColorSpec::NoData => config.no_data_color.clone(),
            ColorSpec::Selected => config.selected_color.clone(),
            ColorSpec::Sequential(rgb) => rgb.css(),
        }
    }
}
