use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::SeverityColors;
use crate::data::model::RuleColumn;
use crate::view::{anomaly_note, Summary, ViewModel, LEGEND};

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(26.0).strong());
    });
}

/// Render the three summary metrics side by side.
pub fn summary_metrics(ui: &mut Ui, summary: &Summary) {
    ui.heading("Summary Statistics");
    ui.columns(3, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Total Rules", summary.total_rules.to_string());
        metric(&mut cols[1], "High Severity Gaps", summary.high_severity.to_string());
        metric(&mut cols[2], "Max Adjusted Lift", summary.max_adjusted_lift_text());
    });
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// Render the filtered rules, one column per artifact column.
pub fn rule_table(ui: &mut Ui, view: &ViewModel<'_>, colors: Option<&SeverityColors>) {
    ui.heading("Justice Gap Rules");

    if view.is_empty() {
        ui.label(RichText::new("No rules match the current filters.").italics());
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::initial(220.0).at_least(80.0).clip(true))
        .column(Column::initial(180.0).at_least(80.0).clip(true))
        .columns(Column::auto().at_least(70.0), RuleColumn::ALL.len() - 2)
        .max_scroll_height(420.0)
        .header(22.0, |mut header| {
            for name in view.columns() {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(20.0, view.rows.len(), |mut row| {
                let rule = view.rows[row.index()];
                for column in RuleColumn::ALL {
                    row.col(|ui: &mut Ui| {
                        let mut text = RichText::new(rule.cell(column));
                        if column == RuleColumn::GapSeverity {
                            if let Some(cm) = colors {
                                text = text.color(cm.color_for(&rule.gap_severity));
                            }
                        }
                        ui.label(text);
                    });
                }
            });
        });
}

// ---------------------------------------------------------------------------
// Interpretation legend
// ---------------------------------------------------------------------------

/// Render the static "How to Interpret" block.
pub fn legend(ui: &mut Ui, anomaly_threshold: f64) {
    ui.heading("How to Interpret");
    for (term, meaning) in LEGEND {
        ui.horizontal_wrapped(|ui: &mut Ui| {
            ui.label("•");
            ui.label(RichText::new(format!("{term}:")).strong());
            ui.label(meaning);
        });
    }
    ui.add_space(4.0);
    ui.label(RichText::new(anomaly_note(anomaly_threshold)).color(Color32::from_rgb(230, 120, 60)));
}
