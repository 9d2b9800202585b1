// 🎓 Student Entity - numeric-string identity + stored academic level
//
// A student's level is DATA (it comes from the records file), unlike a
// course's level which is derived from its code. Students are immutable once
// created; the registry only ever hands out shared references.

use crate::errors::ValidationError;
use crate::validation;
use serde::{Deserialize, Serialize};

// ============================================================================
// LEVEL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Undergraduate,
    Graduate,
}

impl Level {
    /// Symbolic token used in data files and query criteria ("UG" / "G")
    pub fn code(&self) -> &'static str {
        match self {
            Level::Undergraduate => "UG",
            Level::Graduate => "G",
        }
    }

    /// Human label used in displays and reports
    pub fn label(&self) -> &'static str {
        match self {
            Level::Undergraduate => "undergraduate",
            Level::Graduate => "graduate",
        }
    }
}

// ============================================================================
// RAW RECORD
// ============================================================================

/// Unvalidated student fields, as read from `students.txt` or typed by the
/// operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStudent {
    pub id: String,
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub email: String,
    pub level: String,
}

// ============================================================================
// STUDENT ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Student {
    id: String,
    name: String,
    surname: String,
    email: Option<String>,
    level: Level,
}

impl Student {
    /// Validate every field and build the student. Blank email becomes `None`.
    pub fn new(
        id: &str,
        name: &str,
        surname: &str,
        email: &str,
        level: Level,
    ) -> Result<Self, ValidationError> {
        Self::validate_fields(id, name, surname, email)?;
        Ok(Self::assemble(id, name, surname, email, level))
    }

    /// Error precedence: id, names, email, then the level token.
    pub fn from_raw(raw: &RawStudent) -> Result<Self, ValidationError> {
        Self::validate_fields(&raw.id, &raw.name, &raw.surname, &raw.email)?;
        let level = validation::parse_level(&raw.level)?;

        Ok(Self::assemble(&raw.id, &raw.name, &raw.surname, &raw.email, level))
    }

    fn validate_fields(id: &str, name: &str, surname: &str, email: &str) -> Result<(), ValidationError> {
        validation::validate_student_id(id)?;
        validation::validate_text(name, "name")?;
        validation::validate_text(surname, "surname")?;
        validation::validate_email(email)
    }

    fn assemble(id: &str, name: &str, surname: &str, email: &str, level: Level) -> Self {
        let email = email.trim();
        Student {
            id: id.trim().to_string(),
            name: name.trim().to_string(),
            surname: surname.trim().to_string(),
            email: (!email.is_empty()).then(|| email.to_string()),
            level,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Convert back to raw fields (used by the append-only writer)
    pub fn to_raw(&self) -> RawStudent {
        RawStudent {
            id: self.id.clone(),
            name: self.name.clone(),
            surname: self.surname.clone(),
            email: self.email.clone().unwrap_or_default(),
            level: self.level.code().to_string(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, email: &str, level: &str) -> RawStudent {
        RawStudent {
            id: id.to_string(),
            name: "Anna".to_string(),
            surname: "Berg".to_string(),
            email: email.to_string(),
            level: level.to_string(),
        }
    }

    #[test]
    fn test_student_from_raw() {
        let s = Student::from_raw(&raw("1001", "anna@uni.edu", "UG")).unwrap();

        assert_eq!(s.id(), "1001");
        assert_eq!(s.name(), "Anna");
        assert_eq!(s.email(), Some("anna@uni.edu"));
        assert_eq!(s.level(), Level::Undergraduate);
    }

    #[test]
    fn test_blank_email_is_none() {
        let s = Student::from_raw(&raw("7", "  ", "G")).unwrap();
        assert_eq!(s.email(), None);
        assert_eq!(s.to_raw().email, "");
    }

    #[test]
    fn test_invalid_fields_rejected() {
        assert_eq!(
            Student::from_raw(&raw("x1", "", "UG")),
            Err(ValidationError::InvalidStudentId)
        );
        assert_eq!(
            Student::from_raw(&raw("1", "bad-email", "UG")),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            Student::from_raw(&raw("1", "", "PhD")),
            Err(ValidationError::InvalidLevel)
        );
        // Id is checked before the level token
        assert_eq!(
            Student::from_raw(&raw("x1", "", "PhD")),
            Err(ValidationError::InvalidStudentId)
        );
    }

    #[test]
    fn test_comma_in_name_rejected() {
        let mut r = raw("1", "", "UG");
        r.surname = "Berg,Lind".to_string();
        assert_eq!(
            Student::from_raw(&r),
            Err(ValidationError::DelimiterInField("surname"))
        );
        assert!(Student::new("1", "Anna", "Berg", "a,b@uni.edu", Level::Graduate).is_err());
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(Level::Undergraduate.code(), "UG");
        assert_eq!(Level::Graduate.code(), "G");
        assert_eq!(Level::Graduate.label(), "graduate");
    }

    #[test]
    fn test_fields_are_trimmed() {
        let s = Student::new(" 12 ", " Joanna ", " Lind ", "", Level::Graduate).unwrap();
        assert_eq!(s.id(), "12");
        assert_eq!(s.name(), "Joanna");
        assert_eq!(s.to_raw().level, "G");
    }
}
