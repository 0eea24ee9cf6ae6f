//! Binding one day's profiles to the loads of a network.

use ff_core::CustomerClass;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::calendar::{DAYS_PER_YEAR, DayOfYear};
use crate::error::{ProfileError, ProfileResult};
use crate::pool::{Profile, ProfilePool, Sample};

/// What the assigner needs to know about a load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadDemand {
    pub name: String,
    pub class: CustomerClass,
    pub tx_cap: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignSettings {
    pub seed: u64,
    /// Draw attempts per commercial load before giving up.
    pub max_redraws: usize,
}

impl Default for AssignSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            max_redraws: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignedProfile {
    pub load: String,
    pub class: CustomerClass,
    pub sample: u32,
    pub profile: Profile,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayAssignment {
    pub day: DayOfYear,
    pub profiles: Vec<AssignedProfile>,
}

impl DayAssignment {
    pub fn get(&self, load: &str) -> Option<&AssignedProfile> {
        self.profiles.iter().find(|p| p.load.eq_ignore_ascii_case(load))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// `0` draws one uniform day in 1..=365; anything else must already be a valid day.
pub fn resolve_day<R: Rng + ?Sized>(selected_day: u16, rng: &mut R) -> ProfileResult<DayOfYear> {
    if selected_day == 0 {
        DayOfYear::new(rng.gen_range(1..=DAYS_PER_YEAR))
    } else {
        DayOfYear::new(selected_day)
    }
}

fn sample_rng(seed: u64, day: DayOfYear) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_mul(1000).wrapping_add(u64::from(day.get())))
}

pub fn assign_day<R: Rng + ?Sized>(
    pool: &ProfilePool,
    loads: &[LoadDemand],
    selected_day: u16,
    settings: &AssignSettings,
    rng: &mut R,
) -> ProfileResult<DayAssignment> {
    let day = resolve_day(selected_day, rng)?;
    let mut draws = sample_rng(settings.seed, day);

    let mut profiles = Vec::with_capacity(loads.len());
    for load in loads {
        let samples = pool.samples(load.class, day.get())?;
        let sample = draw_sample(load, samples, day, settings, &mut draws)?;
        profiles.push(AssignedProfile {
            load: load.name.clone(),
            class: load.class,
            sample: sample.id,
            profile: sample.profile.clone(),
        });
    }

    info!(day = day.get(), date = %day.date_label(), loads = profiles.len(), "Assigned profiles");
    Ok(DayAssignment { day, profiles })
}

fn draw_sample<'a>(
    load: &LoadDemand,
    samples: &'a [Sample],
    day: DayOfYear,
    settings: &AssignSettings,
    rng: &mut StdRng,
) -> ProfileResult<&'a Sample> {
    let limit = match (load.class, load.tx_cap) {
        (CustomerClass::Commercial, Some(cap)) => cap / 2.0,
        _ => return Ok(&samples[rng.gen_range(0..samples.len())]),
    };

    let attempts = settings.max_redraws.max(1);
    for attempt in 1..=attempts {
        let sample = &samples[rng.gen_range(0..samples.len())];
        if sample.profile.peak() < limit {
            if attempt > 1 {
                debug!(load = %load.name, attempt, "Commercial profile redrawn");
            }
            return Ok(sample);
        }
    }
    Err(ProfileError::NoFeasibleSample {
        load: load.name.clone(),
        class: load.class,
        day: day.get(),
        limit_kw: limit,
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_day_is_validated() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(resolve_day(42, &mut rng).unwrap().get(), 42);
        assert!(matches!(
            resolve_day(400, &mut rng),
            Err(ProfileError::InvalidDay { day: 400 })
        ));
    }

    #[test]
    fn random_day_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2000 {
            let day = resolve_day(0, &mut rng).unwrap().get();
            assert!((1..=365).contains(&day));
        }
    }
}
