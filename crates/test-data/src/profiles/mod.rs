//! Positional load profiles.
//!
//! Profiles describe the physical demands of a full match for each playing
//! position. Generators scale them down for training sessions and split them
//! across match periods.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use pitchload::models::PlayerPosition;

/// Match-day physical demands for one playing position.
///
/// Distances are for a full 90 minutes. Speed-band distances are expressed
/// as fractions of the total distance.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionProfile {
    /// Mean total distance over a full match in meters.
    pub match_distance_m: f64,
    /// Fraction of distance covered above 16 km/h.
    pub hs16_fraction: f64,
    /// Fraction of distance covered above 18 km/h.
    pub hs18_fraction: f64,
    /// Fraction of distance covered above 20 km/h.
    pub hs20_fraction: f64,
    /// Fraction of distance covered above 24 km/h.
    pub sprint_fraction: f64,
    /// Typical top speed in km/h.
    pub max_speed_kmh: f64,
    /// Mean number of sprints per match.
    pub sprints_per_match: f64,
    /// Mean accelerations and decelerations per match.
    pub acc_decc_per_match: f64,
    /// Training volume relative to a match (0.0 - 1.0).
    pub training_scale: f64,
    /// Day-to-day variation as a coefficient of variation.
    pub variance: f64,
}

impl PositionProfile {
    pub fn goalkeeper() -> Self {
        Self {
            match_distance_m: 5_500.0,
            hs16_fraction: 0.02,
            hs18_fraction: 0.012,
            hs20_fraction: 0.006,
            sprint_fraction: 0.001,
            max_speed_kmh: 24.0,
            sprints_per_match: 2.0,
            acc_decc_per_match: 40.0,
            training_scale: 0.6,
            variance: 0.08,
        }
    }

    pub fn defender() -> Self {
        Self {
            match_distance_m: 9_800.0,
            hs16_fraction: 0.10,
            hs18_fraction: 0.065,
            hs20_fraction: 0.04,
            sprint_fraction: 0.018,
            max_speed_kmh: 30.5,
            sprints_per_match: 18.0,
            acc_decc_per_match: 95.0,
            training_scale: 0.55,
            variance: 0.1,
        }
    }

    pub fn midfielder() -> Self {
        Self {
            match_distance_m: 11_200.0,
            hs16_fraction: 0.13,
            hs18_fraction: 0.085,
            hs20_fraction: 0.05,
            sprint_fraction: 0.02,
            max_speed_kmh: 30.0,
            sprints_per_match: 22.0,
            acc_decc_per_match: 120.0,
            training_scale: 0.6,
            variance: 0.1,
        }
    }

    pub fn forward() -> Self {
        Self {
            match_distance_m: 10_200.0,
            hs16_fraction: 0.14,
            hs18_fraction: 0.095,
            hs20_fraction: 0.06,
            sprint_fraction: 0.03,
            max_speed_kmh: 32.0,
            sprints_per_match: 28.0,
            acc_decc_per_match: 110.0,
            training_scale: 0.5,
            variance: 0.12,
        }
    }

    /// Profile for a position; players without one get the midfield profile.
    pub fn for_position(position: Option<PlayerPosition>) -> Self {
        match position {
            Some(PlayerPosition::Goalkeeper) => Self::goalkeeper(),
            Some(PlayerPosition::Defender) => Self::defender(),
            Some(PlayerPosition::Forward) => Self::forward(),
            Some(PlayerPosition::Midfielder) | None => Self::midfielder(),
        }
    }
}

/// Samples an intensity factor from a normal distribution around 1.0.
///
/// A zero or invalid variance yields exactly 1.0.
pub fn sample_intensity(profile: &PositionProfile, rng: &mut impl Rng) -> f64 {
    match Normal::new(1.0, profile.variance) {
        Ok(normal) if profile.variance > 0.0 => normal.sample(rng).clamp(0.6, 1.4),
        _ => 1.0,
    }
}
