/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + validate file → RuleTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ RuleTable  │  Vec<Rule>, distinct categories/severities, lift range
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  category ∧ severity ∧ adjusted_lift ≥ threshold → indices
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
