use std::fmt::Formatter;

use serde::{
    de::{IgnoredAny, MapAccess, SeqAccess, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

/// One respondent's answer to one question.
///
/// Submitted answers are loosely typed JSON; they are resolved into this form
/// once, on ingestion, and aggregation only ever matches on the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// A single value: a chosen option, a rating, or free text.
    Scalar(String),
    /// Several chosen options.
    Choices(Vec<String>),
    /// No usable answer.
    Absent,
}

impl Answer {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Interpret this answer as an integer score, if possible.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Scalar(value) => value.trim().parse().ok(),
            _ => None,
        }
    }
}

impl Serialize for Answer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(value) => serializer.serialize_str(value),
            Self::Choices(values) => values.serialize(serializer),
            Self::Absent => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Answer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AnswerVisitor)
    }
}

struct AnswerVisitor;

impl<'de> Visitor<'de> for AnswerVisitor {
    type Value = Answer;

    fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str("a string, number, list of choices or null")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Answer::Scalar(v.to_string()))
    }

    fn visit_string<E: serde::de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Answer::Scalar(v))
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Answer::Scalar(v.to_string()))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Answer::Scalar(v.to_string()))
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
        // Fractional scores truncate towards zero, like an integer cast.
        if v.is_finite() {
            Ok(Answer::Scalar((v.trunc() as i64).to_string()))
        } else {
            Ok(Answer::Scalar(v.to_string()))
        }
    }

    fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Answer::Scalar(v.to_string()))
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(Answer::Absent)
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(Answer::Absent)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        // Only strings can ever match a declared option, so anything else is dropped here.
        let mut choices = Vec::new();
        while let Some(item) = seq.next_element::<Answer>()? {
            if let Answer::Scalar(value) = item {
                choices.push(value);
            }
        }
        Ok(Answer::Choices(choices))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Answer::Absent)
    }
}
