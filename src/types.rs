//! Validated request inputs shared by the agents and the pipeline.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_GRADE: u8 = 1;
pub const MAX_GRADE: u8 = 12;
pub const DEFAULT_GRADE: u8 = 4;
pub const DEFAULT_TOPIC: &str = "Photosynthesis";

/// School grade, 1 through 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Grade(u8);

impl Grade {
    pub fn new(value: u8) -> Result<Self, ApiError> {
        if (MIN_GRADE..=MAX_GRADE).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ApiError::InvalidRequest(format!(
                "Grade must be between {} and {}, got {}",
                MIN_GRADE, MAX_GRADE, value
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Grade {
    fn default() -> Self {
        Self(DEFAULT_GRADE)
    }
}

impl TryFrom<u8> for Grade {
    type Error = ApiError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Grade::new(value)
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-empty topic text, surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    pub fn new(value: impl Into<String>) -> Result<Self, ApiError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ApiError::InvalidRequest("Topic cannot be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Topic {
    fn default() -> Self {
        Self(DEFAULT_TOPIC.to_string())
    }
}

impl TryFrom<String> for Topic {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Topic::new(value)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
