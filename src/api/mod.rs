use rocket::{
    serde::json::{self, Json},
    Route,
};

use crate::error::{Error, Result};
use crate::model::mongodb::Id;

mod auth;
mod public;
mod survey;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(survey::routes());
    routes.extend(public::routes());
    routes
}

/// Parse a document ID taken from a request path.
fn parse_id(id: &str) -> Result<Id> {
    id.parse()
        .map_err(|_| Error::InvalidIdentifier(id.to_string()))
}

/// Unwrap a JSON request body, reporting malformed payloads as bad requests.
fn payload<T>(body: std::result::Result<Json<T>, json::Error<'_>>) -> Result<T> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(err) => Err(Error::BadRequest(format!("Invalid data: {err}"))),
    }
}
