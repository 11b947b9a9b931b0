use std::collections::HashMap;
use std::ops::Deref;

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{common::answer::Answer, mongodb::Id};

/// Core response data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseCore {
    /// The survey being answered.
    pub survey_id: Id,
    /// Answers keyed by stringified question ID. Questions may be left out.
    pub answers: HashMap<String, Answer>,
    /// Submission time.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub submitted_at: DateTime<Utc>,
    /// Network address the response came from, if known.
    #[serde(rename = "ip_address")]
    pub source_address: Option<String>,
}

impl ResponseCore {
    /// The answer given to the question with this ID, if any.
    pub fn answer(&self, question_id: &str) -> Option<&Answer> {
        self.answers
            .get(question_id)
            .filter(|answer| !answer.is_absent())
    }
}

/// A response without an ID.
pub type NewResponse = ResponseCore;

/// A response from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub response: ResponseCore,
}

impl Deref for Response {
    type Target = ResponseCore;

    fn deref(&self) -> &Self::Target {
        &self.response
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Response {
        /// A response to `survey_id` with the given `(question ID, answer)` pairs.
        pub fn example<'a>(
            survey_id: Id,
            answers: impl IntoIterator<Item = (&'a str, Answer)>,
        ) -> Self {
            Self {
                id: Id::new(),
                response: ResponseCore {
                    survey_id,
                    answers: answers
                        .into_iter()
                        .map(|(question_id, answer)| (question_id.to_string(), answer))
                        .collect(),
                    submitted_at: Utc::now(),
                    source_address: Some("127.0.0.1".to_string()),
                },
            }
        }
    }
}
