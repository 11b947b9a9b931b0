//! Request guards that resolve who is making a request.
//!
//! Each guard wraps a handler: it runs before the handler body, inspects the
//! `Authorization` header, and either hands the handler an explicit identity
//! value or rejects the request outright.

use std::convert::Infallible;

use mongodb::Database;
use rocket::request::{FromRequest, Outcome, Request};

use crate::config::Config;
use crate::error::Error;
use crate::model::{db::user::User, mongodb::Coll};

use super::token::AuthToken;

pub const BEARER_PREFIX: &str = "Bearer ";

/// The raw bearer token from the `Authorization` header, if present.
fn bearer_token<'r>(req: &'r Request<'_>) -> Option<&'r str> {
    req.headers()
        .get_one("Authorization")?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Decode the bearer token without touching the database.
fn verified_token(req: &Request<'_>) -> Option<AuthToken> {
    let config = req.rocket().state::<Config>()?;
    AuthToken::decode(bearer_token(req)?, config).ok()
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthToken {
    type Error = Error;

    /// Require a valid bearer token belonging to a user that still exists.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(config) = req.rocket().state::<Config>() else {
            return Error::Unauthorized("Authentication is not configured".to_string())
                .fail_guard(req);
        };
        let Some(jwt) = bearer_token(req) else {
            return Error::Unauthorized("Missing token".to_string()).fail_guard(req);
        };
        let token = match AuthToken::decode(jwt, config) {
            Ok(token) => token,
            Err(_) => {
                return Error::Unauthorized("Invalid or expired token".to_string())
                    .fail_guard(req)
            }
        };

        // Check the user actually exists.
        let Some(db) = req.rocket().state::<Database>() else {
            return Error::Unauthorized("Authentication is not configured".to_string())
                .fail_guard(req);
        };
        match Coll::<User>::from_db(db)
            .find_one(token.id().as_doc(), None)
            .await
        {
            Ok(Some(_)) => Outcome::Success(token),
            Ok(None) => Error::Unauthorized("Unknown user".to_string()).fail_guard(req),
            Err(e) => Error::from(e).fail_guard(req),
        }
    }
}

/// Whoever is making the request: a verified user, or nobody in particular.
///
/// Never fails. A missing, invalid or expired token all resolve to anonymous.
#[derive(Debug, Clone, Copy)]
pub struct Requester(pub Option<AuthToken>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Requester {
    type Error = Infallible;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(Self(verified_token(req)))
    }
}

/// Proof that the request is not authenticated.
///
/// Rejects the request if it carries a valid token; invalid or expired tokens
/// are let through so that their owners can log in again.
#[derive(Debug, Clone, Copy)]
pub struct Anonymous;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Anonymous {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match verified_token(req) {
            Some(_) => Error::Forbidden(
                "You are already logged in. Please logout to access this resource.".to_string(),
            )
            .fail_guard(req),
            None => Outcome::Success(Anonymous),
        }
    }
}
