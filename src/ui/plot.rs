use std::collections::BTreeMap;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, HLine, Legend, LineStyle, Plot};

use crate::color::SeverityColors;
use crate::data::model::Severity;
use crate::view::ViewModel;

// ---------------------------------------------------------------------------
// Adjusted lift chart (central panel)
// ---------------------------------------------------------------------------

/// One bar per visible rule, grouped by severity, with the anomaly threshold
/// drawn as a reference line.
pub fn lift_chart(
    ui: &mut Ui,
    view: &ViewModel<'_>,
    colors: Option<&SeverityColors>,
    anomaly_threshold: f64,
) {
    let mut groups: BTreeMap<&Severity, Vec<Bar>> = BTreeMap::new();
    for (i, rule) in view.rows.iter().enumerate() {
        let bar = Bar::new(i as f64, rule.adjusted_lift)
            .width(0.8)
            .name(format!("{} → {}", rule.antecedents, rule.consequents));
        groups.entry(&rule.gap_severity).or_default().push(bar);
    }

    Plot::new("lift_chart")
        .height(220.0)
        .legend(Legend::default())
        .x_axis_label("Rule")
        .y_axis_label("Adjusted Lift")
        .allow_drag(true)
        .allow_zoom(true)
        .allow_scroll(false)
        .include_y(0.0)
        .include_y(anomaly_threshold)
        .show(ui, |plot_ui| {
            for (severity, bars) in groups {
                let color = colors
                    .map(|cm| cm.color_for(severity))
                    .unwrap_or(Color32::LIGHT_BLUE);
                let chart = BarChart::new(bars).name(severity.to_string()).color(color);
                plot_ui.bar_chart(chart);
            }

            plot_ui.hline(
                HLine::new(anomaly_threshold)
                    .name("Systemic anomaly threshold")
                    .color(Color32::from_rgb(230, 120, 60))
                    .style(LineStyle::dashed_loose()),
            );
        });
}
