//! Coach account generation.

use fake::{Fake, faker::name::en::Name};
use rand::Rng;

use pitchload::models::User;

/// Password given to every generated account so seeded logins are predictable.
pub const DEFAULT_PASSWORD: &str = "pitchload-demo";

/// Generated coach account ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedUser {
    pub user: User,
    pub password_hash: String,
}

/// Generates coach accounts.
#[derive(Debug, Default)]
pub struct UserGenerator;

impl UserGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generates a single coach with a hashed [`DEFAULT_PASSWORD`].
    pub fn generate(&self, rng: &mut impl Rng) -> anyhow::Result<GeneratedUser> {
        let name: String = Name().fake_with_rng(rng);
        let email = generate_email(&name, rng);

        // Same hashing scheme the login endpoint verifies against
        let password_hash = pitchload::auth::hash_password(DEFAULT_PASSWORD)
            .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;

        Ok(GeneratedUser {
            user: User::new(email, name),
            password_hash,
        })
    }
}

fn generate_email(name: &str, rng: &mut impl Rng) -> String {
    let normalized: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".");

    let suffix: u32 = rng.gen_range(1..9999);
    let domains = ["clubmail.com", "academy.org", "fc-staff.net"];
    let domain = domains[rng.gen_range(0..domains.len())];

    format!("{normalized}{suffix}@{domain}")
}
