use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use arrow::array::{Array, ArrayRef, Float64Array, ListArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use super::model::{LabelSet, Rule, RuleColumn, RuleTable, Severity};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why an artifact could not be turned into a [`RuleTable`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported artifact extension: .{0}")]
    UnsupportedFormat(String),

    #[error("artifact is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}, column '{column}': {reason}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        reason: String,
    },

    #[error("failed to read artifact {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl LoadError {
    fn unreadable(path: &Path, source: impl Into<anyhow::Error>) -> Self {
        LoadError::Unreadable {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    fn invalid(row: usize, column: RuleColumn, reason: impl Into<String>) -> Self {
        LoadError::InvalidValue {
            row,
            column: column.name(),
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a rule table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – what `df.to_parquet()` writes for the mined rules (recommended)
/// * `.json`    – `[{ "antecedents": [...], "consequents": [...], ... }, ...]`
/// * `.csv`     – header row; itemsets as `a;b` or `frozenset({'a', 'b'})`
pub fn load_file(path: &Path) -> Result<RuleTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rules = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    for (row, rule) in rules.iter().enumerate() {
        rule.validate()
            .map_err(|(column, reason)| LoadError::invalid(row, column, reason))?;
    }

    Ok(RuleTable::from_rules(rules))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "antecedents": ["court=district", "representation=none"],
///     "consequents": ["outcome=delayed"],
///     "gap_category": "Procedural Delay",
///     "gap_severity": "High",
///     "support": 0.04, "confidence": 0.71, "lift": 2.1, "adjusted_lift": 1.8
///   },
///   ...
/// ]
/// ```
///
/// Columns are checked per record, so `[]` loads as an empty table: a
/// records array with no rows carries no schema to check against.
fn load_json(path: &Path) -> Result<Vec<Rule>, LoadError> {
    let text = std::fs::read_to_string(path)
        .context("reading JSON file")
        .map_err(|e| LoadError::unreadable(path, e))?;
    let root: JsonValue = serde_json::from_str(&text)
        .context("parsing JSON")
        .map_err(|e| LoadError::unreadable(path, e))?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::unreadable(path, anyhow!("expected top-level JSON array")))?;

    records
        .iter()
        .enumerate()
        .map(|(row, rec)| {
            let obj = rec.as_object().ok_or_else(|| {
                LoadError::unreadable(path, anyhow!("row {row} is not a JSON object"))
            })?;
            json_rule(obj, row)
        })
        .collect()
}

fn json_rule(obj: &Map<String, JsonValue>, row: usize) -> Result<Rule, LoadError> {
    let field = |column: RuleColumn| {
        match obj.get(column.name()) {
            None => Err(LoadError::MissingColumn(column.name())),
            Some(JsonValue::Null) => Err(LoadError::invalid(row, column, "null value")),
            Some(v) => Ok(v),
        }
    };
    let labels = |column: RuleColumn| -> Result<LabelSet, LoadError> {
        match field(column)? {
            JsonValue::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| LoadError::invalid(row, column, "itemset entry is not a string"))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(LabelSet::new),
            JsonValue::String(s) => Ok(LabelSet::parse(s)),
            other => Err(LoadError::invalid(row, column, format!("expected itemset, got {other}"))),
        }
    };
    let text = |column: RuleColumn| -> Result<String, LoadError> {
        match field(column)? {
            JsonValue::String(s) => Ok(s.clone()),
            other => Err(LoadError::invalid(row, column, format!("expected string, got {other}"))),
        }
    };
    let number = |column: RuleColumn| -> Result<f64, LoadError> {
        field(column)?
            .as_f64()
            .ok_or_else(|| LoadError::invalid(row, column, "not a number"))
    };

    Ok(Rule {
        antecedents: labels(RuleColumn::Antecedents)?,
        consequents: labels(RuleColumn::Consequents)?,
        gap_category: text(RuleColumn::GapCategory)?,
        gap_severity: Severity::parse(&text(RuleColumn::GapSeverity)?),
        support: number(RuleColumn::Support)?,
        confidence: number(RuleColumn::Confidence)?,
        lift: number(RuleColumn::Lift)?,
        adjusted_lift: number(RuleColumn::AdjustedLift)?,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout:  header row with column names, any column order.
/// Itemset columns hold `a;b` or the Python `frozenset({'a', 'b'})` rendering.
/// Extra columns are ignored.
fn load_csv(path: &Path) -> Result<Vec<Rule>, LoadError> {
    let mut reader = csv::Reader::from_path(path)
        .context("opening CSV")
        .map_err(|e| LoadError::unreadable(path, e))?;
    let headers = reader
        .headers()
        .context("reading CSV headers")
        .map_err(|e| LoadError::unreadable(path, e))?
        .clone();

    let mut positions = [0usize; 8];
    for (slot, column) in positions.iter_mut().zip(RuleColumn::ALL) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == column.name())
            .ok_or(LoadError::MissingColumn(column.name()))?;
    }

    let mut rules = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result
            .with_context(|| format!("CSV row {row}"))
            .map_err(|e| LoadError::unreadable(path, e))?;

        let cell = |column: RuleColumn| csv_cell(&record, &positions, column);
        let text = |column: RuleColumn| -> Result<String, LoadError> {
            match cell(column) {
                "" => Err(LoadError::invalid(row, column, "empty value")),
                s => Ok(s.to_string()),
            }
        };
        let number = |column: RuleColumn| -> Result<f64, LoadError> {
            let raw = cell(column);
            raw.parse::<f64>()
                .map_err(|_| LoadError::invalid(row, column, format!("'{raw}' is not a number")))
        };

        rules.push(Rule {
            antecedents: LabelSet::parse(cell(RuleColumn::Antecedents)),
            consequents: LabelSet::parse(cell(RuleColumn::Consequents)),
            gap_category: text(RuleColumn::GapCategory)?,
            gap_severity: Severity::parse(&text(RuleColumn::GapSeverity)?),
            support: number(RuleColumn::Support)?,
            confidence: number(RuleColumn::Confidence)?,
            lift: number(RuleColumn::Lift)?,
            adjusted_lift: number(RuleColumn::AdjustedLift)?,
        });
    }

    Ok(rules)
}

fn csv_cell<'r>(
    record: &'r csv::StringRecord,
    positions: &[usize; 8],
    column: RuleColumn,
) -> &'r str {
    record.get(positions[column as usize]).unwrap_or("").trim()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing mined rules.
///
/// Expected schema:
/// - `antecedents`, `consequents`: List<Utf8> / LargeList<Utf8>, or a string
///   column holding the Python rendering of the itemset
/// - `gap_category`, `gap_severity`: Utf8, LargeUtf8 or dictionary-encoded
///   (pandas categoricals)
/// - `support`, `confidence`, `lift`, `adjusted_lift`: any integer or float type
///
/// Any other columns are ignored.
fn load_parquet(path: &Path) -> Result<Vec<Rule>, LoadError> {
    let file = std::fs::File::open(path)
        .context("opening parquet file")
        .map_err(|e| LoadError::unreadable(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")
        .map_err(|e| LoadError::unreadable(path, e))?;

    let schema = builder.schema().clone();
    for column in RuleColumn::ALL {
        if schema.index_of(column.name()).is_err() {
            return Err(LoadError::MissingColumn(column.name()));
        }
    }

    let reader = builder
        .build()
        .context("building parquet reader")
        .map_err(|e| LoadError::unreadable(path, e))?;

    let mut rules = Vec::new();

    for batch_result in reader {
        let batch = batch_result
            .context("reading parquet record batch")
            .map_err(|e| LoadError::unreadable(path, e))?;
        let offset = rules.len();
        let column = |c: RuleColumn| {
            batch
                .column_by_name(c.name())
                .ok_or(LoadError::MissingColumn(c.name()))
        };
        let decode = |c: RuleColumn, e: anyhow::Error| LoadError::unreadable(path, e.context(c.name()));

        let antecedents = LabelColumn::decode(column(RuleColumn::Antecedents)?)
            .map_err(|e| decode(RuleColumn::Antecedents, e))?;
        let consequents = LabelColumn::decode(column(RuleColumn::Consequents)?)
            .map_err(|e| decode(RuleColumn::Consequents, e))?;
        let category = string_column(column(RuleColumn::GapCategory)?)
            .map_err(|e| decode(RuleColumn::GapCategory, e))?;
        let severity = string_column(column(RuleColumn::GapSeverity)?)
            .map_err(|e| decode(RuleColumn::GapSeverity, e))?;
        let support = float_column(column(RuleColumn::Support)?)
            .map_err(|e| decode(RuleColumn::Support, e))?;
        let confidence = float_column(column(RuleColumn::Confidence)?)
            .map_err(|e| decode(RuleColumn::Confidence, e))?;
        let lift =
            float_column(column(RuleColumn::Lift)?).map_err(|e| decode(RuleColumn::Lift, e))?;
        let adjusted_lift = float_column(column(RuleColumn::AdjustedLift)?)
            .map_err(|e| decode(RuleColumn::AdjustedLift, e))?;

        for i in 0..batch.num_rows() {
            let row = offset + i;
            let text = |arr: &StringArray, c: RuleColumn| -> Result<String, LoadError> {
                if arr.is_null(i) {
                    return Err(LoadError::invalid(row, c, "null value"));
                }
                Ok(arr.value(i).to_string())
            };
            let number = |arr: &Float64Array, c: RuleColumn| -> Result<f64, LoadError> {
                if arr.is_null(i) {
                    return Err(LoadError::invalid(row, c, "null value"));
                }
                Ok(arr.value(i))
            };

            rules.push(Rule {
                antecedents: antecedents.labels(i, row, RuleColumn::Antecedents)?,
                consequents: consequents.labels(i, row, RuleColumn::Consequents)?,
                gap_category: text(&category, RuleColumn::GapCategory)?,
                gap_severity: Severity::parse(&text(&severity, RuleColumn::GapSeverity)?),
                support: number(&support, RuleColumn::Support)?,
                confidence: number(&confidence, RuleColumn::Confidence)?,
                lift: number(&lift, RuleColumn::Lift)?,
                adjusted_lift: number(&adjusted_lift, RuleColumn::AdjustedLift)?,
            });
        }
    }

    Ok(rules)
}

// -- Parquet / Arrow helpers --

/// An itemset column normalised to either `List<Utf8>` or `Utf8`.
enum LabelColumn {
    List(ListArray),
    Text(StringArray),
}

impl LabelColumn {
    fn decode(col: &ArrayRef) -> anyhow::Result<Self> {
        match col.data_type() {
            DataType::List(_) | DataType::LargeList(_) => {
                let target = DataType::List(Arc::new(Field::new("item", DataType::Utf8, true)));
                let casted = cast(col, &target).context("casting itemset list to List<Utf8>")?;
                let list = casted
                    .as_any()
                    .downcast_ref::<ListArray>()
                    .context("expected ListArray")?
                    .clone();
                Ok(LabelColumn::List(list))
            }
            _ => Ok(LabelColumn::Text(string_column(col)?)),
        }
    }

    fn labels(&self, i: usize, row: usize, column: RuleColumn) -> Result<LabelSet, LoadError> {
        match self {
            LabelColumn::List(list) => {
                if list.is_null(i) {
                    return Err(LoadError::invalid(row, column, "null itemset"));
                }
                let values = list.value(i);
                let strings = values
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| LoadError::invalid(row, column, "itemset entries are not strings"))?;
                Ok(LabelSet::new(strings.iter().flatten()))
            }
            LabelColumn::Text(strings) => {
                if strings.is_null(i) {
                    return Err(LoadError::invalid(row, column, "null itemset"));
                }
                Ok(LabelSet::parse(strings.value(i)))
            }
        }
    }
}

/// Cast any string-like column (Utf8, LargeUtf8, Dictionary) to `StringArray`.
fn string_column(col: &ArrayRef) -> anyhow::Result<StringArray> {
    let casted = cast(col, &DataType::Utf8)
        .with_context(|| format!("casting {:?} to Utf8", col.data_type()))?;
    Ok(casted
        .as_any()
        .downcast_ref::<StringArray>()
        .context("expected StringArray")?
        .clone())
}

/// Cast any numeric column to `Float64Array`.
fn float_column(col: &ArrayRef) -> anyhow::Result<Float64Array> {
    if !col.data_type().is_numeric() {
        anyhow::bail!("expected a numeric column, got {:?}", col.data_type());
    }
    let casted = cast(col, &DataType::Float64)
        .with_context(|| format!("casting {:?} to Float64", col.data_type()))?;
    Ok(casted
        .as_any()
        .downcast_ref::<Float64Array>()
        .context("expected Float64Array")?
        .clone())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{Float32Array, Int64Array, ListBuilder, StringBuilder};
    use arrow::datatypes::Schema;
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    use super::*;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    const JSON_RULES: &str = r#"[
        {"antecedents": ["court=district", "representation=none"],
         "consequents": ["outcome=delayed"],
         "gap_category": "Procedural Delay", "gap_severity": "High",
         "support": 0.04, "confidence": 0.71, "lift": 2.1, "adjusted_lift": 1.8},
        {"antecedents": "frozenset({'region=rural'})",
         "consequents": "frozenset({'outcome=unfavorable'})",
         "gap_category": "Outcome Disparity", "gap_severity": "low",
         "support": 0.1, "confidence": 0.4, "lift": 1, "adjusted_lift": 0.9,
         "extra": "ignored"}
    ]"#;

    #[test]
    fn loads_json_records() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "rules.json", JSON_RULES);
        let table = load_file(&path).unwrap();

        assert_eq!(table.len(), 2);
        let first = &table.rules()[0];
        assert_eq!(first.antecedents, LabelSet::new(["court=district", "representation=none"]));
        assert_eq!(first.gap_severity, Severity::High);
        assert_eq!(first.adjusted_lift, 1.8);

        let second = &table.rules()[1];
        assert_eq!(second.antecedents, LabelSet::new(["region=rural"]));
        assert_eq!(second.gap_severity, Severity::Low);
        assert_eq!(second.lift, 1.0);
    }

    #[test]
    fn json_missing_column_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "rules.json",
            r#"[{"antecedents": [], "consequents": [], "gap_category": "A",
                 "gap_severity": "Low", "support": 0.1, "confidence": 0.2, "lift": 1.0}]"#,
        );
        match load_file(&path) {
            Err(LoadError::MissingColumn(name)) => assert_eq!(name, "adjusted_lift"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_json_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "rules.json", "{ not json");
        assert!(matches!(load_file(&path), Err(LoadError::Unreadable { .. })));
    }

    #[test]
    fn empty_json_array_loads_empty_table() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "rules.json", "[]");
        let table = load_file(&path).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.parquet");
        assert!(matches!(load_file(&path), Err(LoadError::NotFound(_))));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "rules.pkl", "binary");
        match load_file(&path) {
            Err(LoadError::UnsupportedFormat(ext)) => assert_eq!(ext, "pkl"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn loads_csv_with_any_column_order() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "rules.csv",
            "adjusted_lift,gap_category,gap_severity,antecedents,consequents,support,confidence,lift\n\
             1.6,Access,Medium,\"frozenset({'fee_waiver=denied', 'region=rural'})\",outcome=dismissed,0.02,0.5,1.9\n\
             2.2,Access,High,court=appeals;representation=none,outcome=delayed,0.03,0.8,2.5\n",
        );
        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rules()[0].antecedents,
            LabelSet::new(["fee_waiver=denied", "region=rural"])
        );
        assert_eq!(table.rules()[1].gap_severity, Severity::High);
        assert_eq!(table.lift_range().max, 2.2);
    }

    #[test]
    fn csv_missing_header_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "rules.csv",
            "antecedents,consequents,gap_category,support,confidence,lift,adjusted_lift\n",
        );
        match load_file(&path) {
            Err(LoadError::MissingColumn(name)) => assert_eq!(name, "gap_severity"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn csv_bad_number_names_row_and_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "rules.csv",
            "antecedents,consequents,gap_category,gap_severity,support,confidence,lift,adjusted_lift\n\
             a,b,Delay,Low,0.1,0.2,1.0,1.1\n\
             a,b,Delay,Low,0.1,0.2,1.0,high\n",
        );
        match load_file(&path) {
            Err(LoadError::InvalidValue { row, column, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "adjusted_lift");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_support_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "rules.csv",
            "antecedents,consequents,gap_category,gap_severity,support,confidence,lift,adjusted_lift\n\
             a,b,Delay,Low,1.4,0.2,1.0,1.1\n",
        );
        match load_file(&path) {
            Err(LoadError::InvalidValue { column, .. }) => assert_eq!(column, "support"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    fn list_column(rows: &[&[&str]]) -> ListArray {
        let mut builder = ListBuilder::new(StringBuilder::new());
        for row in rows {
            for label in *row {
                builder.values().append_value(label);
            }
            builder.append(true);
        }
        builder.finish()
    }

    #[test]
    fn loads_parquet_with_mixed_column_types() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.parquet");

        let antecedents = list_column(&[&["court=district", "representation=none"], &["region=rural"]]);
        let list_type = antecedents.data_type().clone();
        let schema = Arc::new(Schema::new(vec![
            Field::new("antecedents", list_type, false),
            Field::new("consequents", DataType::Utf8, false),
            Field::new("gap_category", DataType::Utf8, false),
            Field::new("gap_severity", DataType::Utf8, false),
            Field::new("support", DataType::Float32, false),
            Field::new("confidence", DataType::Float64, false),
            Field::new("lift", DataType::Int64, false),
            Field::new("adjusted_lift", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(antecedents),
                Arc::new(StringArray::from(vec![
                    "frozenset({'outcome=delayed'})",
                    "outcome=unfavorable",
                ])),
                Arc::new(StringArray::from(vec!["Procedural Delay", "Outcome Disparity"])),
                Arc::new(StringArray::from(vec!["High", "Medium"])),
                Arc::new(Float32Array::from(vec![0.25, 0.5])),
                Arc::new(Float64Array::from(vec![0.7, 0.4])),
                Arc::new(Int64Array::from(vec![2, 1])),
                Arc::new(Float64Array::from(vec![1.75, 1.2])),
            ],
        )
        .unwrap();

        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        let first = &table.rules()[0];
        assert_eq!(
            first.antecedents,
            LabelSet::new(["court=district", "representation=none"])
        );
        assert_eq!(first.consequents, LabelSet::new(["outcome=delayed"]));
        assert_eq!(first.support, 0.25);
        assert_eq!(first.lift, 2.0);
        assert_eq!(table.rules()[1].gap_severity, Severity::Medium);
    }

    #[test]
    fn parquet_missing_column_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.parquet");
        let schema = Arc::new(Schema::new(vec![Field::new(
            "antecedents",
            DataType::Utf8,
            false,
        )]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(StringArray::from(vec!["a"]))],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        match load_file(&path) {
            Err(LoadError::MissingColumn(name)) => assert_eq!(name, "consequents"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }
}
