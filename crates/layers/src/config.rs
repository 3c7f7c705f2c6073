use serde::{Deserialize, Serialize};

/// Presentation parameters shared by the map, violin and legend views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    /// CSS color for countries without data under the filter.
    pub no_data_color: String,
    /// CSS color for countries in the comparison set.
    pub selected_color: String,
    /// Fixed value axis of the violin plot.
    pub histogram_domain: [f64; 2],
    /// Approximate number of histogram thresholds.
    pub histogram_ticks: usize,
    pub legend: LegendConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendConfig {
    pub title: String,
    pub ticks: usize,
    pub ramp_samples: usize,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            no_data_color: "grey".to_string(),
            selected_color: "red".to_string(),
            histogram_domain: [0.0, 20_000.0],
            histogram_ticks: 20,
            legend: LegendConfig::default(),
        }
    }
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            title: "Average monthly income (EUR)".to_string(),
            ticks: 10,
            ramp_samples: 256,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "config json error: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl PresentationConfig {
    /// Parses a (possibly partial) JSON config; missing keys keep defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(ConfigError::Json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let [lo, hi] = self.histogram_domain;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(ConfigError::Invalid(format!(
                "histogram_domain must be finite and increasing, got [{lo}, {hi}]"
            )));
        }
        if self.histogram_ticks == 0 {
            return Err(ConfigError::Invalid("histogram_ticks must be > 0".to_string()));
        }
        if self.legend.ramp_samples < 2 {
            return Err(ConfigError::Invalid(
                "legend.ramp_samples must be >= 2".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, PresentationConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let c = PresentationConfig::from_json_str(r#"{"selected_color": "orange", "legend": {"ticks": 5}}"#)
            .unwrap();
        assert_eq!(c.selected_color, "orange");
        assert_eq!(c.no_data_color, "grey");
        assert_eq!(c.legend.ticks, 5);
        assert_eq!(c.legend.ramp_samples, 256);
        assert_eq!(c.histogram_domain, [0.0, 20_000.0]);
    }

    #[test]
    fn rejects_bad_domain() {
        let err = PresentationConfig::from_json_str(r#"{"histogram_domain": [10, 10]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(matches!(
            PresentationConfig::from_json_str("[]").unwrap_err(),
            ConfigError::Json(_)
        ));
    }
}
