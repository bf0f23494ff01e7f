use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

/// Write a synthetic `LOGS/` directory whose run restarted twice.
#[derive(Parser)]
struct Args {
    /// Output directory.
    #[arg(default_value = "LOGS")]
    dir: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

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

    /// Uniform noise in `[-amplitude, amplitude)`.
    fn jitter(&mut self, amplitude: f64) -> f64 {
        amplitude * (2.0 * self.next_f64() - 1.0)
    }
}

/// Model ranges written by each attempt: the run reaches 180, restarts from
/// 120, reaches 260, restarts from 240 and finishes at 300.
const SEGMENTS: [(u64, u64); 3] = [(1, 180), (120, 260), (240, 300)];
const PROFILE_INTERVAL: u64 = 50;

struct Model {
    number: u64,
    age: f64,
    mass: f64,
    log_l: f64,
    log_teff: f64,
}

fn evolve(number: u64, attempt: usize, rng: &mut SimpleRng) -> Model {
    let n = number as f64;
    // Each retry takes slightly smaller steps, so redone rows differ.
    let dt_scale = 1.0 - 0.05 * attempt as f64;
    Model {
        number,
        age: 1.0e3 * dt_scale * (1.02f64.powf(n) - 1.0) / 0.02,
        mass: 1.0 - 1.0e-5 * n,
        log_l: 0.1 * (n / 100.0).ln_1p() + rng.jitter(1.0e-4),
        log_teff: 3.76 - 0.02 * (n / 100.0) + rng.jitter(1.0e-4),
    }
}

fn preamble(out: &mut String, header: &[(&str, String)], columns: &[&str]) {
    let numbers = |n: usize| {
        (1..=n)
            .map(|i| format!("{i:>28}"))
            .collect::<String>()
    };
    let _ = writeln!(out, "{}", numbers(header.len()));
    let _ = writeln!(
        out,
        "{}",
        header.iter().map(|(k, _)| format!("{k:>28}")).collect::<String>()
    );
    let _ = writeln!(
        out,
        "{}",
        header.iter().map(|(_, v)| format!("{v:>28}")).collect::<String>()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", numbers(columns.len()));
    let _ = writeln!(
        out,
        "{}",
        columns.iter().map(|c| format!("{c:>28}")).collect::<String>()
    );
}

fn write_profile(dir: &Path, id: u64, model: &Model) -> Result<()> {
    let mut text = String::new();
    preamble(
        &mut text,
        &[
            ("model_number", model.number.to_string()),
            ("star_age", format!("{:.16E}", model.age)),
            ("version_number", "\"sample\"".to_string()),
        ],
        &["zone", "logT", "logRho"],
    );
    for zone in 1..=20u32 {
        let depth = f64::from(zone) / 20.0;
        let _ = writeln!(
            text,
            "{zone:>28}{:>28.16E}{:>28.16E}",
            3.7 + 3.5 * depth,
            -9.0 + 11.0 * depth
        );
    }
    let path = dir.join(format!("profile{id}.data"));
    fs::write(&path, text).with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    fs::create_dir_all(&args.dir)
        .with_context(|| format!("creating {}", args.dir.display()))?;

    let mut history = String::new();
    preamble(
        &mut history,
        &[
            ("version_number", "\"sample\"".to_string()),
            ("initial_mass", "1.0".to_string()),
            ("initial_z", "2.0000000000000000E-02".to_string()),
            ("burn_min1", "50".to_string()),
        ],
        &["model_number", "star_age", "star_mass", "log_L", "log_Teff"],
    );

    let mut index_rows = Vec::new();
    let mut rows = 0;
    for (attempt, &(first, last)) in SEGMENTS.iter().enumerate() {
        for number in first..=last {
            let model = evolve(number, attempt, &mut rng);
            let _ = writeln!(
                history,
                "{:>28}{:>28.16E}{:>28.16E}{:>28.16E}{:>28.16E}",
                model.number, model.age, model.mass, model.log_l, model.log_teff
            );
            rows += 1;

            if number % PROFILE_INTERVAL == 0 {
                let id = index_rows.len() as u64 + 1;
                write_profile(&args.dir, id, &model)?;
                index_rows.push((number, id));
            }
        }
    }

    let history_path = args.dir.join("history.data");
    fs::write(&history_path, history)
        .with_context(|| format!("writing {}", history_path.display()))?;

    let mut index = format!(
        "{:>8} models.    lines hold model number, priority, and log file number.\n",
        index_rows.len()
    );
    for (number, id) in &index_rows {
        let _ = writeln!(index, "{number:>10}{:>10}{id:>10}", 1);
    }
    let index_path = args.dir.join("profiles.index");
    fs::write(&index_path, index).with_context(|| format!("writing {}", index_path.display()))?;

    println!(
        "Wrote {rows} history rows and {} profiles to {}",
        index_rows.len(),
        args.dir.display()
    );
    Ok(())
}
