use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A question's ID, as supplied by the survey author.
///
/// Authors may use either strings or integers; responses always key their
/// answers by the stringified form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Number(i64),
    Text(String),
}

impl Display for QuestionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// The kind of a question, which decides how its answers are aggregated.
///
/// Any string is accepted on creation; strings we don't recognise are kept
/// verbatim in [`QuestionType::Unrecognized`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionType {
    /// Single choice among the declared options.
    Radio,
    /// Single choice among the declared options, rendered as a dropdown.
    Select,
    /// Any number of the declared options.
    Checkbox,
    /// An integer score.
    Rating,
    /// Free-form text.
    Text,
    Unrecognized(String),
}

impl QuestionType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Radio => "radio",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Rating => "rating",
            Self::Text => "text",
            Self::Unrecognized(other) => other,
        }
    }
}

impl From<String> for QuestionType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "radio" => Self::Radio,
            "select" => Self::Select,
            "checkbox" => Self::Checkbox,
            "rating" => Self::Rating,
            "text" => Self::Text,
            _ => Self::Unrecognized(s),
        }
    }
}

impl From<QuestionType> for String {
    fn from(kind: QuestionType) -> Self {
        match kind {
            QuestionType::Unrecognized(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for QuestionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single survey question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Author-supplied ID, unique within the survey.
    pub id: QuestionId,
    /// The question as shown to respondents.
    pub text: String,
    /// How the question is answered.
    #[serde(rename = "type")]
    pub kind: QuestionType,
    /// Declared options, in display order.
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl Question {
    /// The declared options, or nothing if the question has none.
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or_default()
    }
}
