use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::model::Severity;

/// Settings file looked up in the working directory.
pub const CONFIG_FILE: &str = "justice_gap_viewer.json";

// ---------------------------------------------------------------------------
// Viewer configuration
// ---------------------------------------------------------------------------

/// Viewer settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Artifact opened at startup.
    pub artifact_path: PathBuf,
    /// Initial value of the adjusted-lift slider.
    pub default_min_adjusted_lift: f64,
    pub lift_step: f64,
    /// Policy threshold quoted in the legend and drawn on the chart.
    pub anomaly_threshold: f64,
    /// Which `gap_severity` label counts towards "High Severity Gaps".
    pub high_severity_label: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from("justice_gap_analyzer.parquet"),
            default_min_adjusted_lift: 1.3,
            lift_step: 0.1,
            anomaly_threshold: 1.5,
            high_severity_label: "High".to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn high_severity(&self) -> Severity {
        Severity::parse(&self.high_severity_label)
    }

    /// Read settings from `path`. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: ViewerConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        if config.lift_step.is_nan() || config.lift_step <= 0.0 {
            anyhow::bail!("lift_step must be positive, got {}", config.lift_step);
        }
        Ok(config)
    }

    /// Load [`CONFIG_FILE`], falling back to defaults on any problem.
    pub fn load() -> Self {
        match Self::from_file(Path::new(CONFIG_FILE)) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring {CONFIG_FILE}: {e:#}");
                Self::default()
            }
        }
    }
}
