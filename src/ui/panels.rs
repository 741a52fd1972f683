use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Rules");
    ui.separator();

    // Own the Arc so the filters can be mutated while the table is read.
    let (Some(table), Some(filters)) = (state.table(), state.filters.as_mut()) else {
        ui.label("No rule table loaded.");
        return;
    };
    let step = state.config.lift_step;
    let colors = state.severity_colors.as_ref();
    let mut reset = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Justice gap category ----
            let header = format!(
                "Justice Gap Category  ({}/{})",
                filters.categories.len(),
                table.categories().len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("gap_category")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            filters.select_all_categories(&table);
                        }
                        if ui.small_button("None").clicked() {
                            filters.select_no_categories();
                        }
                    });
                    for category in table.categories() {
                        let mut checked = filters.categories.contains(category);
                        if ui.checkbox(&mut checked, category.as_str()).changed() {
                            filters.toggle_category(category);
                        }
                    }
                });

            // ---- Gap severity ----
            let header = format!(
                "Gap Severity  ({}/{})",
                filters.severities.len(),
                table.severities().len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("gap_severity")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            filters.select_all_severities(&table);
                        }
                        if ui.small_button("None").clicked() {
                            filters.select_no_severities();
                        }
                    });
                    for severity in table.severities() {
                        let mut text = RichText::new(severity.to_string());
                        if let Some(cm) = colors {
                            text = text.color(cm.color_for(severity));
                        }
                        let mut checked = filters.severities.contains(severity);
                        if ui.checkbox(&mut checked, text).changed() {
                            filters.toggle_severity(severity);
                        }
                    }
                });

            ui.separator();

            // ---- Minimum adjusted lift ----
            ui.strong("Minimum Adjusted Lift");
            let range = filters.lift_range;
            let mut threshold = filters.min_adjusted_lift;
            let slider = egui::Slider::new(&mut threshold, range.min..=range.max)
                .step_by(step)
                .fixed_decimals(2);
            if ui.add_enabled(!range.is_degenerate(), slider).changed() {
                filters.set_min_adjusted_lift(threshold);
            }
            if range.is_degenerate() {
                ui.label(
                    RichText::new("Not enough distinct values to filter by lift.")
                        .small()
                        .weak(),
                );
            }

            ui.add_space(8.0);
            if ui.button("Reset filters").clicked() {
                reset = true;
            }
        });

    if reset {
        state.reset_filters();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, visible: Option<usize>) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(table), Some(visible)) = (state.table(), visible) {
            ui.label(format!("{} rules loaded, {visible} visible", table.len()));
        }

        if let Some(session) = &state.session {
            ui.separator();
            ui.label(RichText::new(session.path().display().to_string()).weak());
        }

        if state.load_error.is_some() {
            ui.separator();
            ui.label(RichText::new("Load failed").color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open justice gap rules")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open(path);
    }
}
