use argon2::Config;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::db::user::{NewUser, DEFAULT_ROLE};

pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A registration request. The password is in plaintext and never stored directly.
#[derive(Clone, Deserialize, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl TryFrom<Registration> for NewUser {
    type Error = Error;

    /// Validate a registration and hash its password.
    fn try_from(registration: Registration) -> Result<Self> {
        let name = registration.name.trim().to_string();
        let name_length = name.chars().count();
        if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&name_length) {
            return Err(Error::BadRequest(format!(
                "Name must be between {MIN_NAME_LENGTH} and {MAX_NAME_LENGTH} characters"
            )));
        }
        let email = normalize_email(&registration.email)
            .ok_or_else(|| Error::BadRequest("Invalid email address".to_string()))?;
        if registration.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Error::BadRequest(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        // 16 bytes is recommended for password hashing:
        //  https://en.wikipedia.org/wiki/Argon2
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash =
            argon2::hash_encoded(registration.password.as_bytes(), &salt, &Config::default())?;

        Ok(Self {
            name,
            email,
            password_hash,
            created_at: Utc::now(),
            role: DEFAULT_ROLE.to_string(),
        })
    }
}

/// Login credentials.
#[derive(Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    /// The email to look the user up by, if it is even well-formed.
    pub fn normalized_email(&self) -> Option<String> {
        normalize_email(&self.email)
    }
}

/// The public face of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub name: String,
    pub email: String,
}

/// A successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token to send in the `Authorization` header.
    pub token: String,
    pub user: UserSummary,
}

/// Trim an email address and lowercase its domain, rejecting anything that
/// is clearly not one: it needs exactly one `@`, a non-empty local part, and
/// a dotted domain with no empty labels. The local part keeps its case.
fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim();
    let (local, domain) = email.split_once('@')?;
    let valid = !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
        && !email.chars().any(char::is_whitespace);
    valid.then(|| format!("{local}@{}", domain.to_lowercase()))
}
