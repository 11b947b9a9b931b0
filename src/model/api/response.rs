use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{common::answer::Answer, db::response::NewResponse, mongodb::Id};

/// A respondent's answers, keyed by stringified question ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSubmission {
    #[serde(default)]
    pub answers: HashMap<String, Answer>,
}

impl ResponseSubmission {
    /// Turn this submission into a response to `survey_id`, dropping absent answers.
    ///
    /// Fails if nothing usable is left.
    pub fn into_response(self, survey_id: Id, source_address: Option<String>) -> Result<NewResponse> {
        let answers: HashMap<_, _> = self
            .answers
            .into_iter()
            .filter(|(_, answer)| !answer.is_absent())
            .collect();
        if answers.is_empty() {
            return Err(Error::BadRequest("No answers provided".to_string()));
        }
        Ok(NewResponse {
            survey_id,
            answers,
            submitted_at: Utc::now(),
            source_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::{serde_json, serde_json::json};

    use super::*;

    fn submission(value: serde_json::Value) -> ResponseSubmission {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn keeps_usable_answers() {
        let survey_id = Id::new();
        let response = submission(json!({
            "answers": {"1": "Yes", "langs": ["Rust", 3], "3": 4, "4": null},
        }))
        .into_response(survey_id, Some("10.0.0.1".to_string()))
        .unwrap();

        assert_eq!(survey_id, response.survey_id);
        assert_eq!(3, response.answers.len());
        assert_eq!(
            Some(&Answer::Choices(vec!["Rust".to_string()])),
            response.answer("langs")
        );
        assert_eq!(Some(4), response.answer("3").and_then(Answer::as_integer));
        assert_eq!(None, response.answer("4"));
        assert_eq!(Some("10.0.0.1"), response.source_address.as_deref());
    }

    #[test]
    fn rejects_empty_submissions() {
        for value in [json!({}), json!({"answers": {}}), json!({"answers": {"1": null}})] {
            assert!(matches!(
                submission(value).into_response(Id::new(), None),
                Err(Error::BadRequest(_))
            ));
        }
    }
}
