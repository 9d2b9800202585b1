// 📚 Course Entity - code identity, level derived from the code
//
// "Level is a FUNCTION of the code, not a field."
// CS101 → undergraduate, CS501 → graduate. Never stored, always recomputed.

use crate::entities::Level;
use crate::errors::ValidationError;
use crate::validation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCourse {
    pub code: String,
    pub title: String,
    pub credits: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    code: String,
    title: String,
    credits: u8,
}

impl Course {
    pub fn new(code: &str, title: &str, credits: u8) -> Result<Self, ValidationError> {
        Self::validate_fields(code, title)?;
        validation::check_credits(credits)?;
        Ok(Self::assemble(code, title, credits))
    }

    pub fn from_raw(raw: &RawCourse) -> Result<Self, ValidationError> {
        Self::validate_fields(&raw.code, &raw.title)?;
        let credits = validation::parse_credits(&raw.credits)?;
        Ok(Self::assemble(&raw.code, &raw.title, credits))
    }

    /// `course_level` also rejects codes whose numeric group starts with 0
    fn validate_fields(code: &str, title: &str) -> Result<(), ValidationError> {
        validation::course_level(code)?;
        validation::validate_text(title, "title")
    }

    fn assemble(code: &str, title: &str, credits: u8) -> Self {
        Course {
            code: code.trim().to_string(),
            title: title.trim().to_string(),
            credits,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn credits(&self) -> u8 {
        self.credits
    }

    /// Derived level. The code was validated at construction, so the
    /// fallback arm is unreachable.
    pub fn level(&self) -> Level {
        validation::course_level(&self.code).unwrap_or(Level::Undergraduate)
    }

    pub fn to_raw(&self) -> RawCourse {
        RawCourse {
            code: self.code.clone(),
            title: self.title.clone(),
            credits: self.credits.to_string(),
        }
    }
}
