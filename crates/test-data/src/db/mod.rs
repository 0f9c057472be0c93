//! Database integration for seeding test data.
//!
//! The [`Seeder`] inserts generated data through the same [`pitchload::database::Database`]
//! methods the API uses, so seeded rows are indistinguishable from real ones.

mod seeder;

pub use seeder::{SeedError, Seeder};
