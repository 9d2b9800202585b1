// 📐 Field Validation Rules
// Stateless checks reused by the flat-file bulk load and the interactive add.
//
// Each check fails with a named `ValidationError` kind; none of them touch the
// registry, so cross-entity rules (duplicates, references, cross-level) live
// in `registry.rs` instead.

use crate::entities::{Level, Season, Semester};
use crate::errors::ValidationError;

type Check<T> = std::result::Result<T, ValidationError>;

// ============================================================================
// STUDENT FIELDS
// ============================================================================

/// Student ids: non-empty, ASCII decimal digits only.
pub fn validate_student_id(id: &str) -> Check<()> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::MissingField("student ID"));
    }
    if !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidStudentId);
    }
    Ok(())
}

/// Record files separate fields with commas, so free text may not hold one.
pub const FIELD_DELIMITER: char = ',';

/// name / surname / title: non-empty after trim, no field delimiter.
pub fn validate_text(value: &str, field: &'static str) -> Check<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    if value.contains(FIELD_DELIMITER) {
        return Err(ValidationError::DelimiterInField(field));
    }
    Ok(())
}

/// Optional email. Blank is accepted; otherwise needs `x@y.z`:
/// at least one character before the first `@`, and the last `.` must sit
/// after the character following `@` without being the final character.
pub fn validate_email(email: &str) -> Check<()> {
    let email = email.trim();
    if email.is_empty() {
        return Ok(());
    }
    if email.contains(FIELD_DELIMITER) {
        return Err(ValidationError::InvalidEmail);
    }

    let at = match email.find('@') {
        Some(at) if at > 0 => at,
        _ => return Err(ValidationError::InvalidEmail),
    };
    let dot = email.rfind('.').ok_or(ValidationError::InvalidEmail)?;

    if dot <= at + 1 || dot + 1 >= email.len() {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Level token: exactly "UG" or "G".
pub fn parse_level(token: &str) -> Check<Level> {
    match token.trim() {
        "" => Err(ValidationError::MissingField("level")),
        "UG" => Ok(Level::Undergraduate),
        "G" => Ok(Level::Graduate),
        _ => Err(ValidationError::InvalidLevel),
    }
}

// ============================================================================
// COURSE FIELDS
// ============================================================================

/// Course codes: 2-4 uppercase ASCII letters followed by exactly 3 digits.
pub fn validate_course_code(code: &str) -> Check<()> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ValidationError::MissingField("course code"));
    }

    let letters = code.bytes().take_while(|b| b.is_ascii_uppercase()).count();
    let rest = &code.as_bytes()[letters..];

    if !(2..=4).contains(&letters) || rest.len() != 3 || !rest.iter().all(u8::is_ascii_digit) {
        return Err(ValidationError::InvalidCourseCode);
    }
    Ok(())
}

/// Derived course level: first digit of the trailing 3-digit group.
/// 1-4 → Undergraduate, 5-9 → Graduate, 0 → invalid code.
pub fn course_level(code: &str) -> Check<Level> {
    validate_course_code(code)?;
    let code = code.trim();

    match code.as_bytes()[code.len() - 3] {
        b'1'..=b'4' => Ok(Level::Undergraduate),
        b'5'..=b'9' => Ok(Level::Graduate),
        _ => Err(ValidationError::InvalidCourseCode),
    }
}

pub fn parse_credits(raw: &str) -> Check<u8> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingField("credits"));
    }
    raw.parse::<u8>()
        .map_err(|_| ValidationError::InvalidCredits)
        .and_then(check_credits)
}

/// Credits: 2, 3 or 4.
pub fn check_credits(credits: u8) -> Check<u8> {
    match credits {
        2..=4 => Ok(credits),
        _ => Err(ValidationError::InvalidCredits),
    }
}

// ============================================================================
// EVALUATION FIELDS
// ============================================================================

/// Semester labels: `Spring` or `Fall` immediately followed by 4 digits.
pub fn parse_semester(label: &str) -> Check<Semester> {
    let label = label.trim();
    if label.is_empty() {
        return Err(ValidationError::MissingField("semester"));
    }

    let (season, year) = if let Some(year) = label.strip_prefix("Spring") {
        (Season::Spring, year)
    } else if let Some(year) = label.strip_prefix("Fall") {
        (Season::Fall, year)
    } else {
        return Err(ValidationError::InvalidSemester);
    };

    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidSemester);
    }
    let year = year.parse::<u16>().map_err(|_| ValidationError::InvalidSemester)?;

    Ok(Semester { season, year })
}

pub fn validate_semester(label: &str) -> Check<()> {
    parse_semester(label).map(|_| ())
}

/// Numeric grade: integer in [0, 100].
pub fn parse_grade(raw: &str) -> Check<u8> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingField("grade"));
    }
    raw.parse::<u8>()
        .map_err(|_| ValidationError::InvalidGrade)
        .and_then(check_grade)
}

pub fn check_grade(grade: u8) -> Check<u8> {
    if grade > 100 {
        return Err(ValidationError::InvalidGrade);
    }
    Ok(grade)
}

// ============================================================================
// TESTS
// ============================================================================
