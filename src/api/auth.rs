use log::info;
use mongodb::bson::doc;
use rocket::{
    http::Status,
    serde::json::{self, Json},
    Route, State,
};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::{Anonymous, AuthToken},
            message::Message,
            user::{LoginRequest, LoginResponse, Registration, UserSummary},
        },
        db::user::{NewUser, User},
        mongodb::{is_duplicate_key_error, Coll},
    },
    Config,
};

use super::payload;

pub fn routes() -> Vec<Route> {
    routes![register, login]
}

#[post("/auth/register", data = "<registration>", format = "json")]
pub async fn register(
    _anonymous: Anonymous,
    registration: std::result::Result<Json<Registration>, json::Error<'_>>,
    new_users: Coll<NewUser>,
) -> Result<(Status, Json<Message>)> {
    let user: NewUser = payload(registration)?.try_into()?;

    match new_users.insert_one(&user, None).await {
        Ok(_) => {}
        Err(err) if is_duplicate_key_error(&err) => {
            return Err(Error::Conflict("Email already registered".to_string()));
        }
        Err(err) => return Err(err.into()),
    }
    info!("Registered user {}", user.email);

    Ok((
        Status::Created,
        Json(Message::new("Account created successfully")),
    ))
}

#[post("/auth/login", data = "<credentials>", format = "json")]
pub async fn login(
    _anonymous: Anonymous,
    credentials: std::result::Result<Json<LoginRequest>, json::Error<'_>>,
    users: Coll<User>,
    config: &State<Config>,
) -> Result<Json<LoginResponse>> {
    let credentials = payload(credentials)?;
    let invalid = || Error::Unauthorized("Invalid email or password".to_string());

    let email = credentials.normalized_email().ok_or_else(invalid)?;
    let user = users
        .find_one(doc! { "email": &email }, None)
        .await?
        .filter(|user| user.verify_password(&credentials.password))
        .ok_or_else(invalid)?;

    let token = AuthToken::new(&user).encode(config)?;
    Ok(Json(LoginResponse {
        token,
        user: UserSummary {
            name: user.user.name,
            email: user.user.email,
        },
    }))
}
