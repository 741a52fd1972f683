use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Severity – ordered gap severity label
// ---------------------------------------------------------------------------

/// Gap severity as produced by the upstream rule miner.
///
/// The three known labels are matched case-insensitively; anything else is
/// kept verbatim and sorts after `High`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
    Other(String),
}

impl Severity {
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            _ => Severity::Other(trimmed.to_string()),
        }
    }

    /// Label equality ignoring ASCII case, so a configured "critical" still
    /// matches an upstream "Critical".
    pub fn same_label(&self, other: &Severity) -> bool {
        match (self, other) {
            (Severity::Other(a), Severity::Other(b)) => a.eq_ignore_ascii_case(b),
            _ => self == other,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
            Severity::Other(label) => write!(f, "{label}"),
        }
    }
}

// ---------------------------------------------------------------------------
// LabelSet – antecedents / consequents
// ---------------------------------------------------------------------------

/// An itemset of condition or outcome labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct LabelSet(BTreeSet<String>);

impl LabelSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LabelSet(
            labels
                .into_iter()
                .map(Into::into)
                .filter(|l: &String| !l.is_empty())
                .collect(),
        )
    }

    /// Parse a label set stored as text.
    ///
    /// Accepts the renderings pandas leaves behind when itemsets end up in a
    /// string column: `frozenset({'a', 'b'})`, `{'a'}`, `['a', 'b']`, `set()`,
    /// as well as plain `a;b` or `a, b`. Quoted labels are kept whole, commas
    /// included.
    pub fn parse(text: &str) -> Self {
        let mut s = text.trim();
        for prefix in ["frozenset(", "set("] {
            if let Some(inner) = s.strip_prefix(prefix).and_then(|rest| rest.strip_suffix(')')) {
                s = inner.trim();
                break;
            }
        }
        for (open, close) in [('{', '}'), ('[', ']'), ('(', ')')] {
            if let Some(inner) = s.strip_prefix(open).and_then(|r| r.strip_suffix(close)) {
                s = inner.trim();
                break;
            }
        }
        if s.starts_with(&['\'', '"'][..]) {
            return LabelSet::new(quoted_labels(s));
        }
        LabelSet::new(s.split(&[';', ','][..]).map(|tok| tok.trim().to_string()))
    }
}

/// Collect the contents of every `'...'` / `"..."` span; text between spans
/// (separators, whitespace) is dropped. A backslash escapes the next char.
fn quoted_labels(s: &str) -> Vec<String> {
    let mut labels = Vec::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\'' && c != '"' {
            continue;
        }
        let mut label = String::new();
        while let Some(inner) = chars.next() {
            match inner {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        label.push(escaped);
                    }
                }
                q if q == c => break,
                other => label.push(other),
            }
        }
        labels.push(label);
    }
    labels
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, label) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{label}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RuleColumn – the fixed column set of the artifact
// ---------------------------------------------------------------------------

/// Columns every artifact must expose, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleColumn {
    Antecedents,
    Consequents,
    GapCategory,
    GapSeverity,
    Support,
    Confidence,
    Lift,
    AdjustedLift,
}

impl RuleColumn {
    pub const ALL: [RuleColumn; 8] = [
        RuleColumn::Antecedents,
        RuleColumn::Consequents,
        RuleColumn::GapCategory,
        RuleColumn::GapSeverity,
        RuleColumn::Support,
        RuleColumn::Confidence,
        RuleColumn::Lift,
        RuleColumn::AdjustedLift,
    ];

    /// Column name as written by the upstream producer.
    pub fn name(self) -> &'static str {
        match self {
            RuleColumn::Antecedents => "antecedents",
            RuleColumn::Consequents => "consequents",
            RuleColumn::GapCategory => "gap_category",
            RuleColumn::GapSeverity => "gap_severity",
            RuleColumn::Support => "support",
            RuleColumn::Confidence => "confidence",
            RuleColumn::Lift => "lift",
            RuleColumn::AdjustedLift => "adjusted_lift",
        }
    }
}

// ---------------------------------------------------------------------------
// Rule – one row of the artifact
// ---------------------------------------------------------------------------

/// A single association rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub antecedents: LabelSet,
    pub consequents: LabelSet,
    pub gap_category: String,
    pub gap_severity: Severity,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub adjusted_lift: f64,
}

impl Rule {
    /// Text shown in the rule table for `column`.
    pub fn cell(&self, column: RuleColumn) -> String {
        match column {
            RuleColumn::Antecedents => self.antecedents.to_string(),
            RuleColumn::Consequents => self.consequents.to_string(),
            RuleColumn::GapCategory => self.gap_category.clone(),
            RuleColumn::GapSeverity => self.gap_severity.to_string(),
            RuleColumn::Support => format!("{:.4}", self.support),
            RuleColumn::Confidence => format!("{:.4}", self.confidence),
            RuleColumn::Lift => format!("{:.4}", self.lift),
            RuleColumn::AdjustedLift => format!("{:.4}", self.adjusted_lift),
        }
    }

    /// Check the numeric invariants of a mined rule.
    ///
    /// Returns the offending column and a reason.
    pub fn validate(&self) -> Result<(), (RuleColumn, String)> {
        let checks = [
            (RuleColumn::Support, self.support, Some(1.0)),
            (RuleColumn::Confidence, self.confidence, Some(1.0)),
            (RuleColumn::Lift, self.lift, None),
            (RuleColumn::AdjustedLift, self.adjusted_lift, None),
        ];
        for (column, value, upper) in checks {
            if !value.is_finite() {
                return Err((column, format!("{value} is not a finite number")));
            }
            if value < 0.0 {
                return Err((column, format!("{value} is negative")));
            }
            if let Some(upper) = upper {
                if value > upper {
                    return Err((column, format!("{value} exceeds {upper}")));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LiftRange – bounds for the threshold slider
// ---------------------------------------------------------------------------

/// Observed `[min, max]` of `adjusted_lift`, always with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiftRange {
    pub min: f64,
    pub max: f64,
}

impl LiftRange {
    /// Range used when no adjusted lift has been observed.
    pub const EMPTY: LiftRange = LiftRange { min: 0.0, max: 0.0 };

    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min > max {
            LiftRange::EMPTY
        } else {
            LiftRange { min, max }
        }
    }

    /// No room to slide: empty table or a single distinct value.
    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if self.is_degenerate() || value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// RuleTable – the complete loaded artifact
// ---------------------------------------------------------------------------

/// The full rule table with indices computed once at load time.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
    categories: BTreeSet<String>,
    severities: BTreeSet<Severity>,
    lift_range: LiftRange,
}

impl RuleTable {
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        let categories = rules.iter().map(|r| r.gap_category.clone()).collect();
        let severities = rules.iter().map(|r| r.gap_severity.clone()).collect();
        let lift_range = LiftRange::from_values(rules.iter().map(|r| r.adjusted_lift));
        RuleTable {
            rules,
            categories,
            severities,
            lift_range,
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Distinct `gap_category` values, sorted.
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Distinct `gap_severity` values, in severity order.
    pub fn severities(&self) -> &BTreeSet<Severity> {
        &self.severities
    }

    pub fn lift_range(&self) -> LiftRange {
        self.lift_range
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
