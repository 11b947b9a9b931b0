//! Types shared by the API and the database.

pub mod answer;
pub mod question;
