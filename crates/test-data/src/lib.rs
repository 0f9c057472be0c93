//! Test data generation for pitchload.
//!
//! This crate generates coaches, teams, rosters and a season of training sessions
//! and matches with position-dependent load metrics. It supports manual
//! verification of the load analysis endpoints and integration testing.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_data::prelude::*;
//!
//! let result = ScenarioBuilder::new()
//!     .with_teams(2)
//!     .with_players_per_team(18)
//!     .with_season(date!(2024 - 08 - 01), 90)
//!     .with_seed(7)
//!     .build(&pool)
//!     .await?;
//! ```

pub mod builders;
pub mod config;
pub mod db;
pub mod generators;
pub mod profiles;

// Re-export core types from the pitchload crate
pub use pitchload::models::{ActivityKind, LoadMetrics, PeriodType, PlayerPosition};

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::builders::{ScenarioBuilder, ScenarioResult};
    pub use crate::config::SeedConfig;
    pub use crate::db::Seeder;
    pub use crate::generators::{ActivityGenerator, PlayerGenerator, TeamGenerator, UserGenerator};
    pub use crate::profiles::{PositionProfile, sample_intensity};
    pub use crate::{ActivityKind, LoadMetrics, PeriodType, PlayerPosition};
}
