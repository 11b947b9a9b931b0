use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{api::id::ApiId, common::question::Question, db::survey::Survey};

/// A full survey description, as seen by its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyDescription {
    #[serde(rename = "_id")]
    pub id: ApiId,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<Question>,
    pub created_by: ApiId,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub response_count: u32,
}

impl From<Survey> for SurveyDescription {
    fn from(survey: Survey) -> Self {
        Self {
            id: survey.id.into(),
            title: survey.survey.title,
            description: survey.survey.description,
            questions: survey.survey.questions,
            created_by: survey.survey.created_by.into(),
            created_at: survey.survey.created_at,
            is_active: survey.survey.is_active,
            response_count: survey.survey.response_count,
        }
    }
}

/// The respondent-facing view of a survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicSurvey {
    #[serde(rename = "_id")]
    pub id: ApiId,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<Question>,
    pub created_by: ApiId,
}

impl From<Survey> for PublicSurvey {
    fn from(survey: Survey) -> Self {
        Self {
            id: survey.id.into(),
            title: survey.survey.title,
            description: survey.survey.description,
            questions: survey.survey.questions,
            created_by: survey.survey.created_by.into(),
        }
    }
}

/// Acknowledgement of a newly created survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedSurvey {
    pub message: String,
    pub id: ApiId,
}

/// The open/closed state of a survey after it was toggled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyStatus {
    pub message: String,
    pub is_active: bool,
}
