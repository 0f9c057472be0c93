//! Fluent builder APIs for test scenarios.
//!
//! The [`ScenarioBuilder`] constructs a coach with teams, rosters and a season
//! of training sessions and matches.

mod scenario;

pub use scenario::{
    PlannedPlayer, PlannedTeam, ScenarioBuilder, ScenarioData, ScenarioMetrics, ScenarioResult,
};
