mod guard;
mod token;

pub use guard::{Anonymous, Requester, BEARER_PREFIX};
pub use token::AuthToken;
