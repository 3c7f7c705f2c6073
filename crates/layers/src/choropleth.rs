use explorer::Explorer;

use crate::scale::SequentialScale;
use crate::symbology::ColorSpec;

/// Read-only map view over an `Explorer`: one color per country name.
///
/// Built per render pass; the scale is rebuilt from the current color domain.
#[derive(Debug, Copy, Clone)]
pub struct Choropleth<'a> {
    explorer: &'a Explorer,
    scale: Option<SequentialScale>,
}

impl<'a> Choropleth<'a> {
    pub fn new(explorer: &'a Explorer) -> Self {
        Self {
            explorer,
            scale: SequentialScale::from_state(explorer.color_scale()),
        }
    }

    pub fn scale(&self) -> Option<&SequentialScale> {
        self.scale.as_ref()
    }

    /// Boundary names without rows (or without matches under the filter) get
    /// `NoData`; so does everything when the color domain is empty.
    pub fn color_for(&self, country: &str) -> ColorSpec {
        let Some(mean) = self.explorer.mean_for(country) else {
            return ColorSpec::NoData;
        };
        if self.explorer.is_selected(country) {
            return ColorSpec::Selected;
        }
        match &self.scale {
            Some(scale) => ColorSpec::Sequential(scale.color(mean)),
            None => ColorSpec::NoData,
        }
    }

    /// Colors for every dataset country, in ascending name order.
    pub fn colors(&self) -> Vec<(&'a str, ColorSpec)> {
        self.explorer
            .dataset()
            .countries()
            .iter()
            .map(|name| (name.as_str(), self.color_for(name)))
            .collect()
    }
}
