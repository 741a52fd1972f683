use std::collections::BTreeSet;

use super::model::{LiftRange, Rule, RuleTable, Severity};

// ---------------------------------------------------------------------------
// Filter parameters: selected categories, severities and lift threshold
// ---------------------------------------------------------------------------

/// The three user-controlled filter parameters.
///
/// An empty category or severity selection means "nothing selected" and hides
/// every rule; it never falls back to "show all".
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub categories: BTreeSet<String>,
    pub severities: BTreeSet<Severity>,
    /// Inclusive lower bound on `adjusted_lift`.
    pub min_adjusted_lift: f64,
    /// Slider bounds, fixed at load time.
    pub lift_range: LiftRange,
}

impl FilterState {
    /// Initialise with every category and severity selected and the
    /// threshold at `default_threshold` clamped into the observed range.
    pub fn for_table(table: &RuleTable, default_threshold: f64) -> Self {
        let lift_range = table.lift_range();
        FilterState {
            categories: table.categories().clone(),
            severities: table.severities().clone(),
            min_adjusted_lift: lift_range.clamp(default_threshold),
            lift_range,
        }
    }

    /// Whether a single rule passes all three predicates.
    pub fn matches(&self, rule: &Rule) -> bool {
        self.categories.contains(&rule.gap_category)
            && self.severities.contains(&rule.gap_severity)
            && rule.adjusted_lift >= self.min_adjusted_lift
    }

    /// Move the threshold, keeping it inside the slider bounds.
    pub fn set_min_adjusted_lift(&mut self, value: f64) {
        self.min_adjusted_lift = self.lift_range.clamp(value);
    }

    pub fn toggle_category(&mut self, category: &str) {
        if !self.categories.remove(category) {
            self.categories.insert(category.to_string());
        }
    }

    pub fn toggle_severity(&mut self, severity: &Severity) {
        if !self.severities.remove(severity) {
            self.severities.insert(severity.clone());
        }
    }

    pub fn select_all_categories(&mut self, table: &RuleTable) {
        self.categories = table.categories().clone();
    }

    pub fn select_no_categories(&mut self) {
        self.categories.clear();
    }

    pub fn select_all_severities(&mut self, table: &RuleTable) {
        self.severities = table.severities().clone();
    }

    pub fn select_no_severities(&mut self) {
        self.severities.clear();
    }
}

/// Return indices of rules that pass the current filters, in table order.
pub fn filtered_indices(table: &RuleTable, filters: &FilterState) -> Vec<usize> {
    table
        .rules()
        .iter()
        .enumerate()
        .filter(|(_, rule)| filters.matches(rule))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::tests::rule;

    fn sample_table() -> RuleTable {
        RuleTable::from_rules(vec![
            rule("Delay", "Low", 1.0),
            rule("Delay", "High", 1.3),
            rule("Outcome", "Medium", 1.6),
            rule("Outcome", "High", 2.0),
        ])
    }

    #[test]
    fn defaults_select_everything_with_threshold_1_3() {
        let table = sample_table();
        let filters = FilterState::for_table(&table, 1.3);
        assert_eq!(filters.categories.len(), 2);
        assert_eq!(filters.severities.len(), 3);
        assert_eq!(filters.min_adjusted_lift, 1.3);
        assert_eq!(filters.lift_range, LiftRange { min: 1.0, max: 2.0 });
    }

    #[test]
    fn default_threshold_is_inclusive() {
        let table = sample_table();
        let filters = FilterState::for_table(&table, 1.3);
        let lifts: Vec<f64> = filtered_indices(&table, &filters)
            .into_iter()
            .map(|i| table.rules()[i].adjusted_lift)
            .collect();
        assert_eq!(lifts, vec![1.3, 1.6, 2.0]);
    }

    #[test]
    fn empty_category_selection_yields_nothing() {
        let table = sample_table();
        let mut filters = FilterState::for_table(&table, 0.0);
        filters.select_no_categories();
        assert!(filtered_indices(&table, &filters).is_empty());

        filters.select_all_categories(&table);
        filters.select_no_severities();
        assert!(filtered_indices(&table, &filters).is_empty());
    }

    #[test]
    fn predicates_are_conjunctive() {
        let table = sample_table();
        let mut filters = FilterState::for_table(&table, 1.3);
        filters.toggle_category("Outcome");
        filters.toggle_severity(&Severity::High);
        // Only Delay rules remain, and the High one is deselected.
        assert!(filtered_indices(&table, &filters).is_empty());

        filters.toggle_severity(&Severity::High);
        assert_eq!(filtered_indices(&table, &filters), vec![1]);
    }

    #[test]
    fn threshold_is_clamped_into_range() {
        let table = sample_table();
        let mut filters = FilterState::for_table(&table, 1.3);
        filters.set_min_adjusted_lift(10.0);
        assert_eq!(filters.min_adjusted_lift, 2.0);
        filters.set_min_adjusted_lift(-1.0);
        assert_eq!(filters.min_adjusted_lift, 1.0);

        let high_default = FilterState::for_table(&table, 5.0);
        assert_eq!(high_default.min_adjusted_lift, 2.0);
    }

    #[test]
    fn empty_table_gets_fixed_zero_range() {
        let table = RuleTable::from_rules(Vec::new());
        let mut filters = FilterState::for_table(&table, 1.3);
        assert_eq!(filters.lift_range, LiftRange::EMPTY);
        assert_eq!(filters.min_adjusted_lift, 0.0);
        filters.set_min_adjusted_lift(3.0);
        assert_eq!(filters.min_adjusted_lift, 0.0);
        assert!(filtered_indices(&table, &filters).is_empty());
    }

    #[test]
    fn single_lift_value_keeps_every_rule_visible() {
        let table = RuleTable::from_rules(vec![
            rule("Delay", "Low", 1.1),
            rule("Outcome", "High", 1.1),
        ]);
        let filters = FilterState::for_table(&table, 1.3);
        assert_eq!(filters.min_adjusted_lift, 1.1);
        assert_eq!(filtered_indices(&table, &filters), vec![0, 1]);
    }

    fn arb_rule() -> impl Strategy<Value = Rule> {
        (
            prop_oneof![Just("Delay"), Just("Outcome"), Just("Access")],
            prop_oneof![Just("Low"), Just("Medium"), Just("High")],
            0.0f64..4.0,
        )
            .prop_map(|(category, severity, lift)| rule(category, severity, lift))
    }

    fn arb_filters(table: &RuleTable) -> impl Strategy<Value = FilterState> {
        let categories: Vec<String> = table.categories().iter().cloned().collect();
        let severities: Vec<Severity> = table.severities().iter().cloned().collect();
        let base = FilterState::for_table(table, 1.3);
        (
            proptest::sample::subsequence(categories.clone(), 0..=categories.len()),
            proptest::sample::subsequence(severities.clone(), 0..=severities.len()),
            -1.0f64..5.0,
        )
            .prop_map(move |(cats, sevs, threshold)| {
                let mut filters = base.clone();
                filters.categories = cats.into_iter().collect();
                filters.severities = sevs.into_iter().collect();
                filters.set_min_adjusted_lift(threshold);
                filters
            })
    }

    fn table_and_filters() -> impl Strategy<Value = (RuleTable, FilterState)> {
        proptest::collection::vec(arb_rule(), 0..40)
            .prop_map(RuleTable::from_rules)
            .prop_flat_map(|table| {
                let filters = arb_filters(&table);
                (Just(table), filters)
            })
    }

    proptest! {
        #[test]
        fn filtered_rows_are_a_subset_satisfying_every_predicate(
            (table, filters) in table_and_filters()
        ) {
            let indices = filtered_indices(&table, &filters);
            prop_assert!(indices.len() <= table.len());
            prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));
            for &i in &indices {
                let r = &table.rules()[i];
                prop_assert!(filters.categories.contains(&r.gap_category));
                prop_assert!(filters.severities.contains(&r.gap_severity));
                prop_assert!(r.adjusted_lift >= filters.min_adjusted_lift);
            }
            let kept = table.rules().iter().filter(|r| filters.matches(r)).count();
            prop_assert_eq!(kept, indices.len());
        }

        #[test]
        fn filtering_is_idempotent((table, filters) in table_and_filters()) {
            prop_assert_eq!(
                filtered_indices(&table, &filters),
                filtered_indices(&table, &filters)
            );
        }

        #[test]
        fn threshold_stays_within_slider_bounds(
            (_table, filters) in table_and_filters()
        ) {
            prop_assert!(filters.min_adjusted_lift >= filters.lift_range.min);
            prop_assert!(filters.min_adjusted_lift <= filters.lift_range.max);
        }
    }
}
