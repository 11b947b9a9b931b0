use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::model::{api::id::ApiId, db::user::User, mongodb::Id};

/// An authentication token representing a specific user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(rename = "user_id")]
    id: ApiId,
}

impl AuthToken {
    /// Create a new [`AuthToken`] for the given user.
    pub fn new(user: &User) -> Self {
        Self {
            id: user.id.into(),
        }
    }

    /// The ID of the user this token authenticates.
    pub fn id(&self) -> Id {
        *self.id
    }

    /// Sign this token into a JWT that expires after the configured lifetime.
    pub fn encode(self, config: &Config) -> Result<String> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };
        let jwt = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )?;
        Ok(jwt)
    }

    /// Verify a JWT and extract the token from it. Fails if the signature is
    /// wrong or the token has expired.
    pub fn decode(jwt: &str, config: &Config) -> Result<Self> {
        let token = jsonwebtoken::decode(
            jwt,
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims>| claims.claims.token)?;
        Ok(token)
    }
}

/// JWT claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    token: AuthToken,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use jsonwebtoken::errors::ErrorKind;

    use super::*;
    use crate::error::Error;
    use crate::model::db::user::NewUser;

    fn example_user() -> User {
        User {
            id: Id::new(),
            user: NewUser::example(),
        }
    }

    #[test]
    fn encode_then_decode() {
        let config = Config::example();
        let user = example_user();
        let jwt = AuthToken::new(&user).encode(&config).unwrap();
        let token = AuthToken::decode(&jwt, &config).unwrap();
        assert_eq!(user.id, token.id());
    }

    #[test]
    fn rejects_foreign_signature() {
        let config = Config::example();
        let jwt = jsonwebtoken::encode(
            &Header::default(),
            &Claims {
                token: AuthToken::new(&example_user()),
                expire_at: Utc::now() + Duration::hours(1),
            },
            &EncodingKey::from_secret(b"some other secret"),
        )
        .unwrap();
        match AuthToken::decode(&jwt, &config) {
            Err(Error::Jwt(err)) => assert!(matches!(err.kind(), ErrorKind::InvalidSignature)),
            _ => panic!("token with a foreign signature was accepted"),
        }
    }

    #[test]
    fn rejects_expired_token() {
        let config = Config::example();
        let jwt = jsonwebtoken::encode(
            &Header::default(),
            &Claims {
                token: AuthToken::new(&example_user()),
                expire_at: Utc::now() - Duration::hours(1),
            },
            &EncodingKey::from_secret(config.jwt_secret()),
        )
        .unwrap();
        match AuthToken::decode(&jwt, &config) {
            Err(Error::Jwt(err)) => assert!(matches!(err.kind(), ErrorKind::ExpiredSignature)),
            _ => panic!("expired token was accepted"),
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(AuthToken::decode("not.a.jwt", &Config::example()).is_err());
    }
}
