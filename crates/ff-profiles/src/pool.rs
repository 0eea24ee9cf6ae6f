//! Bulk profile pool: anonymized half-hourly samples per class and day.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use ff_core::{CustomerClass, INTERVALS_PER_DAY};
use tracing::info;

use crate::calendar::DAYS_PER_YEAR;
use crate::error::{ProfileError, ProfileResult};

pub const RESIDENTIAL_POOL_FILE: &str = "Res_load_data_30min_res.csv";
pub const COMMERCIAL_POOL_FILE: &str = "Com_load_data_30min_res.csv";

/// 48 half-hourly demand values for one customer-day.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Profile(Vec<f64>);

impl Profile {
    pub fn new(values: Vec<f64>) -> ProfileResult<Self> {
        if values.len() != INTERVALS_PER_DAY {
            return Err(ProfileError::Malformed {
                file: "<profile>".to_string(),
                line: 0,
                reason: format!("expected {INTERVALS_PER_DAY} values, got {}", values.len()),
            });
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn peak(&self) -> f64 {
        self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub id: u32,
    pub profile: Profile,
}

pub fn pool_file(class: CustomerClass) -> &'static str {
    match class {
        CustomerClass::Residential => RESIDENTIAL_POOL_FILE,
        CustomerClass::Commercial => COMMERCIAL_POOL_FILE,
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfilePool {
    samples: HashMap<(CustomerClass, u16), Vec<Sample>>,
}

impl ProfilePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load both class files from the data root.
    pub fn from_dir(root: &Path) -> ProfileResult<Self> {
        let mut pool = Self::new();
        for class in [CustomerClass::Residential, CustomerClass::Commercial] {
            let path = root.join(pool_file(class));
            if !path.is_file() {
                return Err(ProfileError::MissingPool { path });
            }
            let file = std::fs::File::open(&path)?;
            pool.read_class(class, file, pool_file(class))?;
        }
        info!(
            residential = pool.sample_count(CustomerClass::Residential),
            commercial = pool.sample_count(CustomerClass::Commercial),
            "Loaded profile pool"
        );
        Ok(pool)
    }

    /// Read `sample, day, v0..v47` rows for one class. The first row is a header.
    pub fn read_class<R: Read>(
        &mut self,
        class: CustomerClass,
        reader: R,
        file: &str,
    ) -> ProfileResult<()> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());
            let malformed = |reason: String| ProfileError::Malformed {
                file: file.to_string(),
                line,
                reason,
            };
            if record.len() != INTERVALS_PER_DAY + 2 {
                return Err(malformed(format!(
                    "expected {} fields, got {}",
                    INTERVALS_PER_DAY + 2,
                    record.len()
                )));
            }
            let sample: u32 = record[0]
                .parse()
                .map_err(|_| malformed(format!("bad sample id '{}'", &record[0])))?;
            let day: u16 = record[1]
                .parse()
                .ok()
                .filter(|d| (1..=DAYS_PER_YEAR).contains(d))
                .ok_or_else(|| malformed(format!("bad day '{}'", &record[1])))?;
            let values = record
                .iter()
                .skip(2)
                .map(|v| {
                    v.parse::<f64>()
                        .ok()
                        .filter(|x| x.is_finite())
                        .ok_or_else(|| malformed(format!("bad demand value '{v}'")))
                })
                .collect::<ProfileResult<Vec<_>>>()?;
            self.insert(class, day, sample, Profile(values));
        }
        Ok(())
    }

    pub fn insert(&mut self, class: CustomerClass, day: u16, id: u32, profile: Profile) {
        self.samples
            .entry((class, day))
            .or_default()
            .push(Sample { id, profile });
    }

    /// Samples for a class/day, in file order.
    pub fn samples(&self, class: CustomerClass, day: u16) -> ProfileResult<&[Sample]> {
        match self.samples.get(&(class, day)) {
            Some(samples) if !samples.is_empty() => Ok(samples),
            _ => Err(ProfileError::NotFound { class, day }),
        }
    }

    pub fn sample_count(&self, class: CustomerClass) -> usize {
        self.samples
            .iter()
            .filter(|((c, _), _)| *c == class)
            .map(|(_, s)| s.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
