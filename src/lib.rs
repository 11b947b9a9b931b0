#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use config::{ConfigFairing, DatabaseFairing};
use logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

pub use config::Config;

/// Every route is served under this prefix.
pub const API_BASE: &str = "/api";

/// Assemble the server: routes, JSON error catchers, and the fairings that
/// load the configuration and connect to the database.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount(API_BASE, api::routes())
        .register("/", error::catchers())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
}

/// A client for the test database server named by `db_uri`.
#[cfg(test)]
pub(crate) async fn db_client() -> mongodb::Client {
    let db_uri = rocket::Config::figment()
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set");
    mongodb::Client::with_uri_str(db_uri)
        .await
        .expect("could not connect to the test database")
}

/// A fresh database name, so concurrently running tests never collide.
#[cfg(test)]
pub(crate) fn database() -> String {
    format!("test_{}", model::mongodb::Id::new())
}

/// The full server, but using the given database instead of the configured one.
#[cfg(test)]
pub(crate) async fn rocket_for_db(client: &mongodb::Client, db_name: &str) -> Rocket<Build> {
    let db = client.database(db_name);
    model::mongodb::ensure_indexes_exist(&db)
        .await
        .expect("could not create indexes");
    rocket::build()
        .mount(API_BASE, api::routes())
        .register("/", error::catchers())
        .attach(ConfigFairing)
        .manage(db)
}
