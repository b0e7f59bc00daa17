use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::ServiceError;
use crate::quiz::window::parse_timestamp;

/// Quiz submission as received from a client. Every field may be absent;
/// `validate` reports all missing ones at once.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct NewQuizInput {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Index of the correct option. Accepts integers, floats and numeric strings.
    #[serde(default, deserialize_with = "deserialize_answer")]
    pub answer: Option<i64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// A submission that passed validation, ready to be given an id.
#[derive(Clone, Debug, PartialEq)]
pub struct NewQuiz {
    pub question: String,
    pub options: Vec<String>,
    pub answer: i64,
    pub start_date: String,
    pub end_date: String,
}

/// Stored quiz record as written at creation time.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Quiz {
    pub id: u64,
    pub question: String,
    pub options: Vec<String>,
    pub answer: i64,
    pub start_date: String,
    pub end_date: String,
}

impl NewQuizInput {
    /// Check required fields in the order question, options, answer,
    /// start_date, end_date. Empty strings and empty option lists count as
    /// missing; an `answer` of `0` is a valid index.
    pub fn validate(self) -> Result<NewQuiz, ServiceError> {
        let mut missing = Vec::new();
        if self.question.as_deref().map_or(true, str::is_empty) {
            missing.push("question");
        }
        if self.options.as_ref().map_or(true, Vec::is_empty) {
            missing.push("options");
        }
        if self.answer.is_none() {
            missing.push("answer");
        }
        if self.start_date.as_deref().map_or(true, str::is_empty) {
            missing.push("start_date");
        }
        if self.end_date.as_deref().map_or(true, str::is_empty) {
            missing.push("end_date");
        }

        match (self.question, self.options, self.answer, self.start_date, self.end_date) {
            (Some(question), Some(options), Some(answer), Some(start_date), Some(end_date))
                if missing.is_empty() =>
            {
                // stored dates must stay readable by the active/result lookups
                parse_timestamp(&start_date)?;
                parse_timestamp(&end_date)?;
                Ok(NewQuiz { question, options, answer, start_date, end_date })
            }
            _ => Err(ServiceError::MissingFields(missing)),
        }
    }
}

impl Quiz {
    pub fn assign(id: u64, new: NewQuiz) -> Self {
        Self {
            id,
            question: new.question,
            options: new.options,
            answer: new.answer,
            start_date: new.start_date,
            end_date: new.end_date,
        }
    }
}

fn deserialize_answer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(i64::from(b))),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("answer {n} is not a valid index"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid literal for answer: {s:?}"))),
        Some(other) => Err(D::Error::custom(format!("answer must be an integer, got {other}"))),
    }
}

/// A quiz exactly as found in storage. Kept as a raw JSON object so lookups
/// return what was written, unknown keys included.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct QuizDocument(Map<String, Value>);

impl QuizDocument {
    pub fn as_map(&self) -> &Map<String, Value> { &self.0 }

    pub fn id(&self) -> Result<u64, ServiceError> {
        self.0.get("id").and_then(Value::as_u64).ok_or(ServiceError::MissingField("id"))
    }

    pub fn start_date(&self) -> Result<&str, ServiceError> { self.text("start_date") }

    pub fn end_date(&self) -> Result<&str, ServiceError> { self.text("end_date") }

    pub fn has_answer(&self) -> bool { self.0.contains_key("answer") }

    /// Drop the `answer` key. A document without one is an error, not a no-op.
    pub fn without_answer(mut self) -> Result<Self, ServiceError> {
        self.0.remove("answer").ok_or(ServiceError::MissingField("answer"))?;
        Ok(self)
    }

    fn text(&self, key: &'static str) -> Result<&str, ServiceError> {
        self.0.get(key).and_then(Value::as_str).ok_or(ServiceError::MissingField(key))
    }
}

impl From<&Quiz> for QuizDocument {
    fn from(quiz: &Quiz) -> Self {
        let mut map = Map::new();
        map.insert("id".into(), Value::from(quiz.id));
        map.insert("question".into(), Value::from(quiz.question.clone()));
        map.insert("options".into(), Value::from(quiz.options.clone()));
        map.insert("answer".into(), Value::from(quiz.answer));
        map.insert("start_date".into(), Value::from(quiz.start_date.clone()));
        map.insert("end_date".into(), Value::from(quiz.end_date.clone()));
        Self(map)
    }
}
