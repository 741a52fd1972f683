use std::path::PathBuf;
use std::sync::Arc;

use crate::color::SeverityColors;
use crate::config::ViewerConfig;
use crate::data::filter::FilterState;
use crate::data::model::RuleTable;
use crate::session::Session;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    /// Current viewing session (None until an artifact has been opened).
    /// Sole owner of the loaded table.
    pub session: Option<Session>,

    /// Category / severity / threshold selections.
    pub filters: Option<FilterState>,

    /// Colours for the severity labels of the loaded table.
    pub severity_colors: Option<SeverityColors>,

    /// Load error of the current session; halts rule rendering while set.
    pub load_error: Option<String>,
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            session: None,
            filters: None,
            severity_colors: None,
            load_error: None,
        }
    }

    /// Start a new session over `path` and load it.
    pub fn open(&mut self, path: PathBuf) {
        let session = Session::new(path);
        let loaded = session.table();
        match loaded {
            Ok(table) => self.set_table(&table),
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", session.path().display());
                self.filters = None;
                self.severity_colors = None;
                self.load_error = Some(error_chain(&e));
            }
        }
        self.session = Some(session);
    }

    /// Table of the current session, served from the session cache.
    ///
    /// None before the first open and after a failed load; a failed session
    /// is not asked again until the user reloads.
    pub fn table(&self) -> Option<Arc<RuleTable>> {
        if self.load_error.is_some() {
            return None;
        }
        self.session.as_ref()?.table().ok()
    }

    /// Re-open the artifact of the current session (or the configured one).
    pub fn reload(&mut self) {
        let path = self
            .session
            .as_ref()
            .map(|s| s.path().to_path_buf())
            .unwrap_or_else(|| self.config.artifact_path.clone());
        self.open(path);
    }

    /// Ingest a newly loaded table and initialise filters and colours.
    fn set_table(&mut self, table: &RuleTable) {
        if table.is_empty() {
            log::warn!("Rule table is empty; nothing to filter");
        }
        let filters = FilterState::for_table(table, self.config.default_min_adjusted_lift);
        if filters.lift_range.is_degenerate() {
            log::warn!(
                "Degenerate adjusted_lift range [{}, {}]; threshold fixed at {}",
                filters.lift_range.min,
                filters.lift_range.max,
                filters.min_adjusted_lift
            );
        }
        self.severity_colors = Some(SeverityColors::new(table.severities()));
        self.filters = Some(filters);
        self.load_error = None;
    }

    /// Restore the default selections for the loaded table.
    pub fn reset_filters(&mut self) {
        if let Some(table) = self.table() {
            log::debug!("Resetting filters");
            self.filters = Some(FilterState::for_table(
                &table,
                self.config.default_min_adjusted_lift,
            ));
        }
    }
}

/// `Display` of an error and all of its sources, joined with ": ".
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
