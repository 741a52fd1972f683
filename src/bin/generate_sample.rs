use std::sync::Arc;

use arrow::array::{Array, Float64Array, ListBuilder, StringArray, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const CONDITIONS: [&str; 10] = [
    "court=district",
    "court=appeals",
    "representation=none",
    "representation=legal_aid",
    "region=rural",
    "region=urban",
    "case_type=civil",
    "case_type=family",
    "fee_waiver=denied",
    "interpreter=unavailable",
];

const OUTCOMES: [(&str, &str); 4] = [
    ("outcome=delayed", "Procedural Delay"),
    ("hearing=postponed", "Procedural Delay"),
    ("outcome=unfavorable", "Outcome Disparity"),
    ("outcome=dismissed", "Access Barrier"),
];

fn severity_for(adjusted_lift: f64) -> &'static str {
    if adjusted_lift > 1.5 {
        "High"
    } else if adjusted_lift > 1.2 {
        "Medium"
    } else {
        "Low"
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let n_rules = 60;

    let mut antecedents = ListBuilder::new(StringBuilder::new());
    let mut consequents = ListBuilder::new(StringBuilder::new());
    let mut categories: Vec<&str> = Vec::with_capacity(n_rules);
    let mut severities: Vec<&str> = Vec::with_capacity(n_rules);
    let mut support = Vec::with_capacity(n_rules);
    let mut confidence = Vec::with_capacity(n_rules);
    let mut lift = Vec::with_capacity(n_rules);
    let mut adjusted_lift = Vec::with_capacity(n_rules);

    for _ in 0..n_rules {
        let first = rng.pick(&CONDITIONS);
        let mut second = rng.pick(&CONDITIONS);
        while second == first {
            second = rng.pick(&CONDITIONS);
        }
        antecedents.values().append_value(first);
        if rng.next_f64() < 0.6 {
            antecedents.values().append_value(second);
        }
        antecedents.append(true);

        let (outcome, category) = OUTCOMES[(rng.next_u64() % OUTCOMES.len() as u64) as usize];
        consequents.values().append_value(outcome);
        consequents.append(true);

        let rule_lift = rng.uniform(1.0, 2.8);
        let baseline = rng.uniform(1.0, 1.4);
        let rule_adjusted = rule_lift / baseline;

        categories.push(category);
        severities.push(severity_for(rule_adjusted));
        support.push(rng.uniform(0.01, 0.15));
        confidence.push(rng.uniform(0.3, 0.9));
        lift.push(rule_lift);
        adjusted_lift.push(rule_adjusted);
    }

    let antecedents = antecedents.finish();
    let consequents = consequents.finish();
    let list_type = antecedents.data_type().clone();

    let schema = Arc::new(Schema::new(vec![
        Field::new("antecedents", list_type.clone(), false),
        Field::new("consequents", list_type, false),
        Field::new("gap_category", DataType::Utf8, false),
        Field::new("gap_severity", DataType::Utf8, false),
        Field::new("support", DataType::Float64, false),
        Field::new("confidence", DataType::Float64, false),
        Field::new("lift", DataType::Float64, false),
        Field::new("adjusted_lift", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(antecedents),
            Arc::new(consequents),
            Arc::new(StringArray::from(categories)),
            Arc::new(StringArray::from(severities)),
            Arc::new(Float64Array::from(support)),
            Arc::new(Float64Array::from(confidence)),
            Arc::new(Float64Array::from(lift)),
            Arc::new(Float64Array::from(adjusted_lift)),
        ],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let output_path = "justice_gap_analyzer.parquet";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote {n_rules} rules to {output_path}");
}
