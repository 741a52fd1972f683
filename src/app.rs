use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::ViewerConfig;
use crate::data::filter::filtered_indices;
use crate::state::AppState;
use crate::ui::{panels, plot, table};
use crate::view;

const HEADING: &str = "Systemic Justice Gap Identification Dashboard";
const INTRO: &str = "This dashboard presents interpretable justice-gap patterns discovered \
                     using FP-Growth Association Rule Mining with Lift-Based Filtering.";

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct JusticeGapApp {
    pub state: AppState,
}

impl JusticeGapApp {
    /// Build the app and open the configured artifact.
    pub fn new(config: ViewerConfig) -> Self {
        let artifact = config.artifact_path.clone();
        let mut state = AppState::new(config);
        state.open(artifact);
        Self { state }
    }

    fn visible_rules(&self) -> Option<usize> {
        let (table, filters) = (self.state.table()?, self.state.filters.as_ref()?);
        Some(filtered_indices(&table, filters).len())
    }

    fn central_panel(&self, ui: &mut Ui) {
        ui.heading(RichText::new(HEADING).size(24.0));
        ui.label(INTRO);
        ui.separator();

        if let Some(err) = &self.state.load_error {
            ui.add_space(12.0);
            ui.label(RichText::new("Could not load the rule table").strong().color(Color32::RED));
            ui.label(RichText::new(err).color(Color32::RED));
            ui.label("Fix the artifact and use File → Reload, or open another file.");
            return;
        }

        let (Some(rules), Some(filters)) = (self.state.table(), &self.state.filters) else {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a rule table to begin  (File → Open…)");
            });
            return;
        };

        let high = self.state.config.high_severity();
        let view = view::render(&rules, filters, &high);
        let colors = self.state.severity_colors.as_ref();
        let threshold = self.state.config.anomaly_threshold;

        table::summary_metrics(ui, &view.summary);
        ui.separator();
        table::rule_table(ui, &view, colors);
        ui.separator();
        egui::CollapsingHeader::new(RichText::new("Adjusted Lift by Rule").strong())
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                plot::lift_chart(ui, &view, colors, threshold);
            });
        ui.separator();
        table::legend(ui, threshold);
    }
}

impl eframe::App for JusticeGapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visible = self.visible_rules();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, visible);
        });

        // ---- Left side panel: filters ----
        let before = self.state.filters.clone();
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });
        if self.state.filters != before {
            // Top bar counts were drawn from the previous selection.
            ctx.request_repaint();
        }

        // ---- Central panel: metrics, table, chart, legend ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| self.central_panel(ui));
        });
    }
}
