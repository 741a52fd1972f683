use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::loader::{load_file, LoadError};
use crate::data::model::RuleTable;

// ---------------------------------------------------------------------------
// Session – one viewing session over one artifact
// ---------------------------------------------------------------------------

/// Owns the artifact path and the table loaded from it.
///
/// The table is parsed on the first call to [`Session::table`] and every later
/// call hands out the same `Arc`. A failed load is returned to the caller and
/// nothing is cached; the session never retries on its own.
#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    table: OnceCell<Arc<RuleTable>>,
}

impl Session {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The loaded table, reading the artifact if this is the first request.
    pub fn table(&self) -> Result<Arc<RuleTable>, LoadError> {
        if let Some(table) = self.table.get() {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load_file(&self.path)?);
        log::info!(
            "Loaded {} rules from {} ({} categories, {} severities)",
            table.len(),
            self.path.display(),
            table.categories().len(),
            table.severities().len()
        );
        Ok(Arc::clone(self.table.get_or_init(|| table)))
    }
}
