use crate::data::filter::{filtered_indices, FilterState};
use crate::data::model::{Rule, RuleColumn, RuleTable, Severity};

/// Shown for "Max Adjusted Lift" when no rule passes the filters.
pub const NOT_AVAILABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// View model: everything the central panel draws, computed without egui
// ---------------------------------------------------------------------------

/// Summary metrics over the filtered rules.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_rules: usize,
    pub high_severity: usize,
    /// Rounded to two decimals; `None` when nothing is visible.
    pub max_adjusted_lift: Option<f64>,
}

impl Summary {
    fn of(rules: &[&Rule], high: &Severity) -> Self {
        let max_adjusted_lift = rules
            .iter()
            .map(|r| r.adjusted_lift)
            .filter(|v| v.is_finite())
            .reduce(f64::max)
            .map(round2);
        Summary {
            total_rules: rules.len(),
            high_severity: rules.iter().filter(|r| r.gap_severity.same_label(high)).count(),
            max_adjusted_lift,
        }
    }

    pub fn max_adjusted_lift_text(&self) -> String {
        match self.max_adjusted_lift {
            Some(v) => format!("{v:.2}"),
            None => NOT_AVAILABLE.to_string(),
        }
    }
}

/// The filtered rules, borrowed from the loaded table.
#[derive(Debug, Clone)]
pub struct ViewModel<'a> {
    pub summary: Summary,
    pub rows: Vec<&'a Rule>,
}

impl ViewModel<'_> {
    /// Column headers of the rule table, in display order.
    pub fn columns(&self) -> [&'static str; 8] {
        RuleColumn::ALL.map(RuleColumn::name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Project `table` through `filters` and summarise the result.
///
/// Pure: called on every frame, never touches the table or the filters.
pub fn render<'a>(table: &'a RuleTable, filters: &FilterState, high: &Severity) -> ViewModel<'a> {
    let rows: Vec<&Rule> = filtered_indices(table, filters)
        .into_iter()
        .map(|i| &table.rules()[i])
        .collect();
    ViewModel {
        summary: Summary::of(&rows, high),
        rows,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Interpretation legend
// ---------------------------------------------------------------------------

/// Term / meaning pairs shown under "How to Interpret".
pub const LEGEND: [(&str, &str); 4] = [
    ("Antecedents", "Institutional or procedural conditions"),
    ("Consequents", "Justice gap indicators (delay or unfavorable outcome)"),
    ("Lift", "Deviation from independence"),
    ("Adjusted Lift", "Excess risk compared to case-type baseline"),
];

/// Closing sentence of the legend for the configured policy threshold.
pub fn anomaly_note(threshold: f64) -> String {
    format!(
        "Adjusted Lift > {threshold} indicates a potential systemic anomaly requiring policy attention."
    )
}
