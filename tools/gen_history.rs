//! History Fixture Generator
//!
//! Writes synthetic profile, history and candidate CSVs for screening
//! session testing.

use anyhow::{Context, Result};
use cardwatch::directory::obfuscate;
use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Profile row matching the screening binary's expected format
#[derive(Debug, Serialize)]
struct ProfileRow {
    name: String,
    card_number: u64,
    security_code: u16,
    expiry: String,
    password: String,
    city: String,
    state: String,
    country: String,
}

/// Transaction row matching the screening binary's expected format
#[derive(Debug, Clone, Serialize)]
struct TransactionRow {
    transaction_id: String,
    date: String,
    time: String,
    city: String,
    state: String,
    country: String,
    amount: f64,
    status: String,
}

const HOME_CITIES: &[(&str, &str)] = &[
    ("Pune", "Maharashtra"),
    ("Mumbai", "Maharashtra"),
    ("Nashik", "Maharashtra"),
];

const FOREIGN_CITIES: &[(&str, &str, &str)] = &[
    ("Oslo", "Oslo", "Norway"),
    ("Dubai", "Dubai", "United Arab Emirates"),
    ("Singapore", "Singapore", "Singapore"),
];

/// Transaction row generator walking a calendar forward
struct HistoryGenerator {
    rng: rand::rngs::ThreadRng,
    counter: u64,
    date: NaiveDate,
}

impl HistoryGenerator {
    fn new(start: NaiveDate) -> Self {
        Self {
            rng: rand::thread_rng(),
            counter: 0,
            date: start,
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{}_{:06}", prefix, self.counter)
    }

    fn advance(&mut self, max_days: i64) {
        let days = self.rng.gen_range(0..=max_days);
        self.date = self.date + Duration::days(days);
    }

    /// Generate an ordinary daytime purchase near home
    fn generate_legitimate(&mut self, prefix: &str) -> TransactionRow {
        self.advance(2);
        let (city, state) = HOME_CITIES[self.rng.gen_range(0..HOME_CITIES.len())];
        TransactionRow {
            transaction_id: self.next_id(prefix),
            date: self.date.format("%Y-%m-%d").to_string(),
            time: format!(
                "{:02}:{:02}:{:02}",
                self.rng.gen_range(9..19),
                self.rng.gen_range(0..60),
                self.rng.gen_range(0..60)
            ),
            city: city.to_string(),
            state: state.to_string(),
            country: "India".to_string(),
            amount: round_paise(self.rng.gen_range(40.0..160.0)),
            status: if self.rng.gen_bool(0.95) {
                "success".to_string()
            } else {
                "failure".to_string()
            },
        }
    }

    /// Generate a night-time, high-amount purchase abroad
    fn generate_suspicious(&mut self, prefix: &str) -> TransactionRow {
        self.advance(2);
        let (city, state, country) =
            FOREIGN_CITIES[self.rng.gen_range(0..FOREIGN_CITIES.len())];
        TransactionRow {
            transaction_id: self.next_id(prefix),
            date: self.date.format("%Y-%m-%d").to_string(),
            time: format!(
                "{:02}:{:02}:{:02}",
                self.rng.gen_range(0..6), // Night time
                self.rng.gen_range(0..60),
                self.rng.gen_range(0..60)
            ),
            city: city.to_string(),
            state: state.to_string(),
            country: country.to_string(),
            amount: round_paise(self.rng.gen_range(1000.0..5000.0)), // High amount
            status: if self.rng.gen_bool(0.5) {
                "success".to_string()
            } else {
                "failure".to_string()
            },
        }
    }

    /// Three consecutive failed payments on the walk forward
    fn generate_failure_run(&mut self, prefix: &str) -> Vec<TransactionRow> {
        (0..3)
            .map(|_| {
                let mut row = self.generate_legitimate(prefix);
                row.status = "failure".to_string();
                row
            })
            .collect()
    }

    /// Four same-date payments minutes apart
    fn generate_burst(&mut self, prefix: &str) -> Vec<TransactionRow> {
        self.advance(2);
        let date = self.date.format("%Y-%m-%d").to_string();
        (0..4)
            .map(|i| {
                let (city, state) = HOME_CITIES[self.rng.gen_range(0..HOME_CITIES.len())];
                TransactionRow {
                    transaction_id: self.next_id(prefix),
                    date: date.clone(),
                    time: format!("14:{:02}:00", i * 2),
                    city: city.to_string(),
                    state: state.to_string(),
                    country: "India".to_string(),
                    amount: round_paise(self.rng.gen_range(40.0..160.0)),
                    status: "success".to_string(),
                }
            })
            .collect()
    }
}

fn round_paise(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn write_profiles(dir: &Path) -> Result<()> {
    let path = dir.join("profiles.csv");
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let password = obfuscate("changeit");
    let rows = [
        ProfileRow {
            name: "Asha Rao".to_string(),
            card_number: 4716391509124420,
            security_code: 417,
            expiry: "09/27".to_string(),
            password: password.clone(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            country: "India".to_string(),
        },
        ProfileRow {
            name: "Vikram Shah".to_string(),
            card_number: 5285996312160033,
            security_code: 212,
            expiry: "03/26".to_string(),
            password: password.clone(),
            city: "Mumbai".to_string(),
            state: "Maharashtra".to_string(),
            country: "India".to_string(),
        },
        ProfileRow {
            name: "Meera Iyer".to_string(),
            card_number: 4024007155968010,
            security_code: 903,
            expiry: "11/25".to_string(),
            password,
            city: "Chennai".to_string(),
            state: "Tamil Nadu".to_string(),
            country: "India".to_string(),
        },
    ];
    let count = rows.len();
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), profiles = count, "Profiles written");
    Ok(())
}

fn write_rows(path: &Path, rows: &[TransactionRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gen_history=info".parse()?),
        )
        .init();

    info!("Starting History Fixture Generator");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let count: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(40);
    let fraud_rate: f64 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.1)
        .clamp(0.0, 1.0);
    let out_dir = args.get(3).map(|s| s.as_str()).unwrap_or("data");

    info!(count, fraud_rate, out_dir = %out_dir, "Configuration loaded");

    let dir = Path::new(out_dir);
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {out_dir}"))?;

    write_profiles(dir)?;

    let start = NaiveDate::from_ymd_opt(2024, 1, 5).context("valid start date")?;
    let mut generator = HistoryGenerator::new(start);
    let mut rng = rand::thread_rng();

    let mut rows = Vec::new();
    let mut suspicious_count = 0u64;
    for _ in 0..count {
        if rng.gen_bool(fraud_rate) {
            suspicious_count += 1;
            rows.push(generator.generate_suspicious("tx"));
        } else {
            rows.push(generator.generate_legitimate("tx"));
        }
    }
    // One failure run and one burst so the sequence rules have something
    // to catch
    rows.extend(generator.generate_failure_run("tx"));
    rows.extend(generator.generate_burst("tx"));

    let history_path = dir.join("history.csv");
    write_rows(&history_path, &rows)?;
    info!(
        path = %history_path.display(),
        records = rows.len(),
        suspicious = suspicious_count,
        "History written"
    );

    let mut candidates = Vec::new();
    for _ in 0..6 {
        if rng.gen_bool(0.5) {
            candidates.push(generator.generate_suspicious("cand"));
        } else {
            candidates.push(generator.generate_legitimate("cand"));
        }
    }
    let candidates_path = dir.join("candidates.csv");
    write_rows(&candidates_path, &candidates)?;
    info!(
        path = %candidates_path.display(),
        candidates = candidates.len(),
        "Candidates written"
    );

    Ok(())
}
