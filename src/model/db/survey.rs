use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{common::question::Question, mongodb::Id};

/// Core survey data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyCore {
    /// Survey title.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Questions, in the order they are asked and reported.
    pub questions: Vec<Question>,
    /// The owning user.
    pub created_by: Id,
    /// Creation time.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    /// Whether the survey still accepts responses.
    pub is_active: bool,
    /// Number of responses submitted so far. This is incremented on every
    /// submission rather than recounted, so it is not authoritative.
    pub response_count: u32,
}

impl SurveyCore {
    /// Is the given user the owner of this survey?
    pub fn is_owned_by(&self, user_id: Id) -> bool {
        self.created_by == user_id
    }
}

/// A survey without an ID.
pub type NewSurvey = SurveyCore;

/// A survey from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub survey: SurveyCore,
}

impl Deref for Survey {
    type Target = SurveyCore;

    fn deref(&self) -> &Self::Target {
        &self.survey
    }
}

impl DerefMut for Survey {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.survey
    }
}
