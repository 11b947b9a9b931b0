use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{common::question::Question, db::survey::NewSurvey, mongodb::Id};

pub const MIN_TITLE_LENGTH: usize = 5;
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MIN_QUESTION_LENGTH: usize = 5;

/// A survey specification, as submitted by its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveySpec {
    /// Survey title.
    pub title: String,
    /// Optional longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Survey questions, in order.
    pub questions: Vec<Question>,
}

impl SurveySpec {
    /// Validate this spec and turn it into a fresh, active survey owned by `owner`.
    pub fn into_survey(self, owner: Id) -> Result<NewSurvey> {
        self.validate()?;
        Ok(NewSurvey {
            title: self.title,
            description: self.description,
            questions: self.questions,
            created_by: owner,
            created_at: Utc::now(),
            is_active: true,
            response_count: 0,
        })
    }

    fn validate(&self) -> Result<()> {
        let title_length = self.title.chars().count();
        if !(MIN_TITLE_LENGTH..=MAX_TITLE_LENGTH).contains(&title_length) {
            return Err(Error::BadRequest(format!(
                "Title must be between {MIN_TITLE_LENGTH} and {MAX_TITLE_LENGTH} characters"
            )));
        }

        let mut seen = HashSet::new();
        for (i, question) in self.questions.iter().enumerate() {
            if question.text.chars().count() < MIN_QUESTION_LENGTH {
                return Err(Error::BadRequest(format!(
                    "Question {} must be at least {MIN_QUESTION_LENGTH} characters",
                    i + 1
                )));
            }
            // Answers are keyed by the stringified ID, so `1` and `"1"` collide.
            if !seen.insert(question.id.to_string()) {
                return Err(Error::BadRequest(format!(
                    "Duplicate question ID '{}'",
                    question.id
                )));
            }
        }
        Ok(())
    }
}
