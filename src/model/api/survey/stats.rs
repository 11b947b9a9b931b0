//! Per-question statistics and the policies that compute them.

use std::collections::BTreeMap;

use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};

use crate::model::common::{
    answer::Answer,
    question::{Question, QuestionType},
};

/// Label of the bucket that collects single-choice answers matching no declared option.
pub const OTHER_LABEL: &str = "Other";

/// How many of the latest free-text answers a report shows.
pub const RECENT_ANSWER_COUNT: usize = 5;

/// Aggregated statistics for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionStat {
    /// The stringified question ID.
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    /// Number of non-absent answers, including ones that turned out to be unusable.
    pub total_answers: u64,
    pub data: QuestionData,
}

impl QuestionStat {
    /// Compute the statistics of `question` from its non-absent answers, in submission order.
    pub fn compute(question: &Question, answers: &[&Answer]) -> Self {
        let data = match question.kind {
            QuestionType::Radio | QuestionType::Select => {
                QuestionData::Choices(OptionCounts::single_choice(question.options(), answers))
            }
            QuestionType::Checkbox => {
                QuestionData::Choices(OptionCounts::multiple_choice(question.options(), answers))
            }
            QuestionType::Rating => QuestionData::Rating(RatingSummary::new(answers)),
            QuestionType::Text => QuestionData::Text {
                recent_answers: recent(answers),
            },
            QuestionType::Unrecognized(_) => QuestionData::Empty(EmptyData {}),
        };
        Self {
            id: question.id.to_string(),
            text: question.text.clone(),
            kind: question.kind.clone(),
            total_answers: answers.len() as u64,
            data,
        }
    }
}

/// The type-specific part of a [`QuestionStat`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QuestionData {
    /// Option label to count, for single and multiple choice questions.
    Choices(OptionCounts),
    Rating(RatingSummary),
    Text { recent_answers: Vec<Answer> },
    /// Questions of a type we don't know how to aggregate.
    Empty(EmptyData),
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyData {}

/// Counts per option label, in declared order, with any extra buckets last.
///
/// Serializes as a JSON object whose keys keep this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionCounts(Vec<(String, u64)>);

impl OptionCounts {
    /// A zero count for every declared option. Repeated options keep their first position.
    fn zeroed(options: &[String]) -> Self {
        let mut counts = Self::default();
        for option in options {
            if counts.position(option).is_none() {
                counts.0.push((option.clone(), 0));
            }
        }
        counts
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.0.iter().position(|(l, _)| l == label)
    }

    /// Increment a declared option, returning false if `label` isn't one.
    fn increment(&mut self, label: &str) -> bool {
        match self.position(label) {
            Some(i) => {
                self.0[i].1 += 1;
                true
            }
            None => false,
        }
    }

    /// Every answer lands somewhere: exact matches on their option, the rest on [`OTHER_LABEL`].
    fn single_choice(options: &[String], answers: &[&Answer]) -> Self {
        let mut counts = Self::zeroed(options);
        for answer in answers {
            let matched = match answer {
                Answer::Scalar(value) => counts.increment(value),
                _ => false,
            };
            if !matched && !counts.increment(OTHER_LABEL) {
                counts.0.push((OTHER_LABEL.to_string(), 1));
            }
        }
        counts
    }

    /// Each list answer counts once per declared option it mentions. Anything else is ignored.
    fn multiple_choice(options: &[String], answers: &[&Answer]) -> Self {
        let mut counts = Self::zeroed(options);
        for answer in answers {
            if let Answer::Choices(choices) = answer {
                for choice in choices {
                    counts.increment(choice);
                }
            }
        }
        counts
    }

    /// The count for `label`, if it has a bucket.
    pub fn get(&self, label: &str) -> Option<u64> {
        self.position(label).map(|i| self.0[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(label, count)| (label.as_str(), *count))
    }
}

impl Serialize for OptionCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

/// Summary of integer scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    /// Mean score rounded to two decimal places, half to even. `None` with
    /// no scores, which serialises as the integer `0`.
    #[serde(serialize_with = "average_or_zero")]
    pub average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Number of times each score was given, in ascending score order.
    pub distribution: BTreeMap<i64, u64>,
}

impl RatingSummary {
    /// Summarise the answers that coerce to integers, discarding the rest.
    fn new(answers: &[&Answer]) -> Self {
        let scores: Vec<i64> = answers.iter().filter_map(|a| a.as_integer()).collect();
        let mut distribution = BTreeMap::new();
        for &score in &scores {
            *distribution.entry(score).or_insert(0) += 1;
        }
        let average = (!scores.is_empty()).then(|| {
            let mean = scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64;
            (mean * 100.0).round_ties_even() / 100.0
        });
        Self {
            average,
            min: scores.iter().copied().min(),
            max: scores.iter().copied().max(),
            distribution,
        }
    }
}

fn average_or_zero<S: Serializer>(average: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match average {
        Some(mean) => serializer.serialize_f64(*mean),
        None => serializer.serialize_u64(0),
    }
}

/// The last [`RECENT_ANSWER_COUNT`] answers, oldest first.
fn recent(answers: &[&Answer]) -> Vec<Answer> {
    let skip = answers.len().saturating_sub(RECENT_ANSWER_COUNT);
    answers[skip..].iter().map(|&a| a.clone()).collect()
}
