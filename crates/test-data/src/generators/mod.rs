//! Entity generators for test data.
//!
//! - [`UserGenerator`]: Generate coach accounts
//! - [`TeamGenerator`]: Generate team names
//! - [`PlayerGenerator`]: Generate rosters with positions and body measurements
//! - [`ActivityGenerator`]: Generate a season of training sessions and matches

pub mod activity;
pub mod team;
pub mod user;

pub use activity::{ActivityGenConfig, ActivityGenerator, GeneratedActivity};
pub use team::{PlayerGenerator, TeamGenerator};
pub use user::{DEFAULT_PASSWORD, GeneratedUser, UserGenerator};
