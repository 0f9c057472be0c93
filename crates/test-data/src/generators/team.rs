//! Team and roster generation.

use fake::{Fake, faker::name::en::Name};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use time::{Date, Duration};
use uuid::Uuid;

use pitchload::models::{CreatePlayerRequest, CreateTeamRequest, PlayerPosition};

const TEAM_PREFIXES: &[&str] = &[
    "Riverside", "Northgate", "Harbor", "Eastfield", "Kingsway", "Oakmont", "Westbury",
    "Millbrook", "Lakeside", "Ashford",
];

const TEAM_SUFFIXES: &[&str] = &["FC", "United", "Athletic", "Rovers", "City", "Academy"];

const SQUADS: &[&str] = &["First Team", "U21", "U19", "Women's First Team", "Reserves"];

/// Roster shape for an 18-player squad: 2 keepers, 6 defenders, 6 midfielders, 4 forwards.
const POSITION_WEIGHTS: [(PlayerPosition, f64); 4] = [
    (PlayerPosition::Goalkeeper, 2.0 / 18.0),
    (PlayerPosition::Defender, 6.0 / 18.0),
    (PlayerPosition::Midfielder, 6.0 / 18.0),
    (PlayerPosition::Forward, 4.0 / 18.0),
];

/// Generates team names.
#[derive(Debug, Default)]
pub struct TeamGenerator;

impl TeamGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, rng: &mut impl Rng) -> CreateTeamRequest {
        let prefix = TEAM_PREFIXES[rng.gen_range(0..TEAM_PREFIXES.len())];
        let suffix = TEAM_SUFFIXES[rng.gen_range(0..TEAM_SUFFIXES.len())];
        let squad = SQUADS[rng.gen_range(0..SQUADS.len())];

        CreateTeamRequest {
            name: format!("{prefix} {suffix} {squad}"),
            description: Some(format!("{squad} squad load monitoring")),
        }
    }
}

/// Generates player profiles for a team roster.
#[derive(Debug)]
pub struct PlayerGenerator {
    /// Reference date used to derive birth dates.
    reference_date: Date,
}

impl PlayerGenerator {
    pub fn new(reference_date: Date) -> Self {
        Self { reference_date }
    }

    /// Generates `count` players with distinct jersey numbers.
    ///
    /// Positions follow a typical squad shape; the first two players are always keepers
    /// when the roster has room for them.
    pub fn generate_roster(
        &self,
        team_id: Uuid,
        count: usize,
        rng: &mut impl Rng,
    ) -> Vec<CreatePlayerRequest> {
        (0..count)
            .map(|i| {
                let position = if i < 2 && count > 2 {
                    PlayerPosition::Goalkeeper
                } else {
                    weighted_position(rng)
                };
                self.generate(team_id, position, i as i32 + 1, rng)
            })
            .collect()
    }

    fn generate(
        &self,
        team_id: Uuid,
        position: PlayerPosition,
        jersey_number: i32,
        rng: &mut impl Rng,
    ) -> CreatePlayerRequest {
        let name: String = Name().fake_with_rng(rng);
        let age_days = rng.gen_range(17 * 365..34 * 365);
        let birth_date = self.reference_date.checked_sub(Duration::days(age_days));

        let (height_mean, weight_mean) = match position {
            PlayerPosition::Goalkeeper => (189.0, 84.0),
            PlayerPosition::Defender => (184.0, 78.0),
            PlayerPosition::Midfielder => (176.0, 71.0),
            PlayerPosition::Forward => (179.0, 74.0),
        };

        let preferred_foot = if rng.gen_bool(0.75) { "right" } else { "left" };

        CreatePlayerRequest {
            team_id,
            name,
            position: Some(position),
            jersey_number: Some(jersey_number),
            birth_date,
            height_cm: Some(round1(sample_normal(height_mean, 5.0, rng).clamp(160.0, 205.0))),
            weight_kg: Some(round1(sample_normal(weight_mean, 5.0, rng).clamp(55.0, 100.0))),
            preferred_foot: Some(preferred_foot.to_string()),
            notes: None,
        }
    }
}

fn weighted_position(rng: &mut impl Rng) -> PlayerPosition {
    let roll: f64 = rng.r#gen();
    let mut cumulative = 0.0;
    for (position, weight) in POSITION_WEIGHTS {
        cumulative += weight;
        if roll < cumulative {
            return position;
        }
    }
    PlayerPosition::Midfielder
}

pub(crate) fn sample_normal(mean: f64, std_dev: f64, rng: &mut impl Rng) -> f64 {
    Normal::new(mean, std_dev)
        .map(|n| n.sample(rng))
        .unwrap_or(mean)
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use time::macros::date;
    use validator::Validate;

    #[test]
    fn test_team_names_are_valid() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let team = TeamGenerator::new().generate(&mut rng);
            assert!(team.validate().is_ok(), "{}", team.name);
        }
    }

    #[test]
    fn test_roster_shape() {
        let mut rng = rand::thread_rng();
        let team_id = Uuid::new_v4();
        let roster =
            PlayerGenerator::new(date!(2024 - 08 - 01)).generate_roster(team_id, 18, &mut rng);

        assert_eq!(roster.len(), 18);
        assert!(roster.iter().all(|p| p.team_id == team_id));
        assert!(roster.iter().all(|p| p.validate().is_ok()));
        assert_eq!(roster[0].position, Some(PlayerPosition::Goalkeeper));
        assert_eq!(roster[1].position, Some(PlayerPosition::Goalkeeper));

        let numbers: HashSet<_> = roster.iter().filter_map(|p| p.jersey_number).collect();
        assert_eq!(numbers.len(), 18);
    }
}
