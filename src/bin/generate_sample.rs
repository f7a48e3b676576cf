use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const STATES: [(&str, &[&str]); 3] = [
    ("Tamilnadu", &["Chennai", "Coimbatore", "Madurai"]),
    ("Kerala", &["Kollam", "Thrissur"]),
    ("Karnataka", &["Belagavi", "Mysuru"]),
];

const INDUSTRIES: [(&str, &str, f64); 5] = [
    ("Agriculture", "A", 9.0),
    ("Manufacture of textiles", "C", 4.0),
    ("Construction", "F", 3.0),
    ("Retail trade", "G", 2.5),
    ("Education", "P", 1.2),
];

const CLASSES: [(&str, f64); 2] = [("Main Workers", 1.0), ("Marginal Workers", 0.25)];

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

    /// Uniform in `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// Header names as they appear in raw census exports (spaces, not underscores).
fn headers() -> Vec<String> {
    let mut h: Vec<String> = ["State", "District", "Industry Category", "NIC Section"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for (class, _) in CLASSES {
        for area in ["Total", "Rural", "Urban"] {
            for gender in ["Persons", "Males", "Females"] {
                h.push(format!("{class}-{area}-{gender}"));
            }
        }
    }
    h
}

/// One census row's worker counts, laid out in `headers()` order.
fn worker_counts(rng: &mut SimpleRng, weight: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(18);
    for (_, class_weight) in CLASSES {
        let base = 1000.0 * weight * class_weight;
        let rural_m = (base * rng.range(0.8, 1.6)).round();
        let rural_f = (base * rng.range(0.3, 0.9)).round();
        let urban_m = (base * rng.range(0.2, 1.1)).round();
        let urban_f = (base * rng.range(0.1, 0.6)).round();

        let (total_m, total_f) = (rural_m + urban_m, rural_f + urban_f);
        out.extend([total_m + total_f, total_m, total_f]);
        out.extend([rural_m + rural_f, rural_m, rural_f]);
        out.extend([urban_m + urban_f, urban_m, urban_f]);
    }
    out
}

struct SampleRow {
    state: &'static str,
    district: Option<&'static str>,
    industry: &'static str,
    section: &'static str,
    /// `None` marks a blank cell.
    counts: Vec<Option<f64>>,
}

fn generate(rng: &mut SimpleRng) -> Vec<SampleRow> {
    let mut rows = Vec::new();
    let mut cell = 0usize;
    for (state, districts) in STATES {
        // A state-level total row (no district) precedes the districts.
        let geographies = std::iter::once(None).chain(districts.iter().copied().map(Some));
        for district in geographies {
            let scale = if district.is_none() { districts.len() as f64 } else { 1.0 };
            for (industry, section, weight) in INDUSTRIES {
                let counts = worker_counts(rng, weight * scale)
                    .into_iter()
                    .map(|v| {
                        cell += 1;
                        (cell % 97 != 0).then_some(v)
                    })
                    .collect();
                rows.push(SampleRow {
                    state,
                    district,
                    industry,
                    section,
                    counts,
                });
            }
        }
    }
    rows
}

fn write_csv(path: &str, header: &[String], rows: &[SampleRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    wtr.write_record(header)?;
    for row in rows {
        let mut record = vec![
            row.state.to_string(),
            row.district.unwrap_or_default().to_string(),
            row.industry.to_string(),
            row.section.to_string(),
        ];
        record.extend(
            row.counts
                .iter()
                .map(|c| c.map(|v| format!("{v:.0}")).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_parquet(path: &str, header: &[String], rows: &[SampleRow]) -> Result<()> {
    let mut fields = Vec::with_capacity(header.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(header.len());

    let text_columns: [(&String, Vec<Option<&str>>); 4] = [
        (&header[0], rows.iter().map(|r| Some(r.state)).collect()),
        (&header[1], rows.iter().map(|r| r.district).collect()),
        (&header[2], rows.iter().map(|r| Some(r.industry)).collect()),
        (&header[3], rows.iter().map(|r| Some(r.section)).collect()),
    ];
    for (name, values) in text_columns {
        fields.push(Field::new(name.as_str(), DataType::Utf8, true));
        columns.push(Arc::new(StringArray::from(values)));
    }

    for (i, name) in header.iter().enumerate().skip(4) {
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.counts[i - 4]).collect();
        fields.push(Field::new(name.as_str(), DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(values)));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let header = headers();
    let rows = generate(&mut rng);

    write_csv("sample_workforce.csv", &header, &rows)?;
    write_parquet("sample_workforce.parquet", &header, &rows)?;

    println!(
        "Wrote {} census rows ({} worker columns each) to sample_workforce.csv and sample_workforce.parquet",
        rows.len(),
        header.len() - 4
    );
    Ok(())
}
