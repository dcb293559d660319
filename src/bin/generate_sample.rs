use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use circle_damage::data::export::to_csv_bytes;
use circle_damage::data::loader::DATA_FILE_STEM;
use circle_damage::data::model::{
    Dataset, Report, DAMAGES_FOUND, IMAGE_URL, KNOWN_COLUMNS, ROOM_NO, SEVERITY_SCORE, TOWER,
};

/// Damage types with a rough relative frequency from the March 2025 survey.
const DAMAGE_TYPES: [(&str, u32); 9] = [
    ("Cracked wall", 580),
    ("Loose/broken tiles", 330),
    ("Cracked ceiling", 220),
    ("Doors/windows", 160),
    ("Pipes", 60),
    ("Damaged furniture", 50),
    ("Water leak", 45),
    ("Electrical system", 30),
    ("System failure", 15),
];

const TOWERS: [&str; 2] = ["Tower 1", "Tower 2"];

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

/// Pick a damage type weighted by its survey frequency.
fn weighted_damage(rng: &mut SimpleRng) -> &'static str {
    let total: u32 = DAMAGE_TYPES.iter().map(|(_, w)| w).sum();
    let mut roll = rng.below(u64::from(total)) as u32;
    for (label, weight) in DAMAGE_TYPES {
        if roll < weight {
            return label;
        }
        roll -= weight;
    }
    DAMAGE_TYPES[0].0
}

fn generate_reports(rng: &mut SimpleRng, count: usize) -> Vec<Report> {
    (0..count)
        .map(|i| {
            let n_damages = 1 + rng.below(3) as usize;
            let mut damages: Vec<&str> = Vec::with_capacity(n_damages);
            for _ in 0..n_damages {
                let d = weighted_damage(rng);
                if !damages.contains(&d) {
                    damages.push(d);
                }
            }

            let room = format!("1674/{}", 10 + rng.below(490));
            let tower = TOWERS[i % TOWERS.len()];
            // Scores in 0.5 steps; roughly one report in ten was never scored.
            let severity = (rng.next_f64() > 0.1).then(|| (rng.below(31) as f64) * 0.5);
            let image = (rng.next_f64() > 0.5)
                .then(|| format!("https://picsum.photos/seed/{}/640/480", i + 1));

            Report::new(
                Some(room),
                Some(tower.to_string()),
                Some(damages.join(", ")),
                severity,
                image,
            )
        })
        .collect()
}

fn text_column(dataset: &Dataset, field: impl Fn(&Report) -> Option<&str>) -> StringArray {
    StringArray::from(dataset.reports.iter().map(field).collect::<Vec<_>>())
}

fn write_parquet(dataset: &Dataset, path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(ROOM_NO, DataType::Utf8, true),
        Field::new(TOWER, DataType::Utf8, true),
        Field::new(DAMAGES_FOUND, DataType::Utf8, true),
        Field::new(SEVERITY_SCORE, DataType::Float64, true),
        Field::new(IMAGE_URL, DataType::Utf8, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text_column(dataset, |r| r.room_no.as_deref())),
            Arc::new(text_column(dataset, |r| r.tower.as_deref())),
            Arc::new(text_column(dataset, |r| r.damages_found.as_deref())),
            Arc::new(Float64Array::from(
                dataset.reports.iter().map(|r| r.severity_score).collect::<Vec<_>>(),
            )),
            Arc::new(text_column(dataset, |r| r.image_url.as_deref())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(28_03_2568);
    let reports = generate_reports(&mut rng, 120);
    let dataset = Dataset::new(reports, KNOWN_COLUMNS.map(String::from).to_vec());

    let parquet_path = out_dir.join(format!("{DATA_FILE_STEM}.parquet"));
    write_parquet(&dataset, &parquet_path)?;

    let csv_path = out_dir.join(format!("{DATA_FILE_STEM}.csv"));
    std::fs::write(&csv_path, to_csv_bytes(&dataset)?)
        .with_context(|| format!("writing {}", csv_path.display()))?;

    println!(
        "Wrote {} reports to {} and {}",
        dataset.len(),
        parquet_path.display(),
        csv_path.display()
    );
    Ok(())
}
