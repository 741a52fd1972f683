use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Severity;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Generates `n` visually distinct colours using evenly spaced hues within
/// `[start_hue, start_hue + span)`.
pub fn generate_palette(n: usize, start_hue: f32, span: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| hsl_to_color32(start_hue + (i as f32 / n as f32) * span, 0.75, 0.55))
        .collect()
}

// ---------------------------------------------------------------------------
// Severity colours
// ---------------------------------------------------------------------------

/// Maps severity labels to colours: green / amber / red for the known
/// levels, blue-to-purple hues for anything else.
#[derive(Debug, Clone)]
pub struct SeverityColors {
    mapping: BTreeMap<Severity, Color32>,
    default_color: Color32,
}

impl SeverityColors {
    pub fn new(severities: &BTreeSet<Severity>) -> Self {
        let others: Vec<&Severity> = severities
            .iter()
            .filter(|s| matches!(s, Severity::Other(_)))
            .collect();
        let palette = generate_palette(others.len(), 190.0, 120.0);

        let mut mapping = BTreeMap::new();
        mapping.insert(Severity::Low, hsl_to_color32(120.0, 0.55, 0.45));
        mapping.insert(Severity::Medium, hsl_to_color32(40.0, 0.85, 0.55));
        mapping.insert(Severity::High, hsl_to_color32(0.0, 0.75, 0.55));
        for (severity, color) in others.into_iter().zip(palette) {
            mapping.insert(severity.clone(), color);
        }

        SeverityColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given severity.
    pub fn color_for(&self, severity: &Severity) -> Color32 {
        self.mapping
            .get(severity)
            .copied()
            .unwrap_or(self.default_color)
    }
}
