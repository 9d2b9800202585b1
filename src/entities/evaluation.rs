// 📝 Evaluation Entity - one numeric grade tying a student to a course
//
// Identity is the composite (student_id, course_code) pair; a student holds
// at most one evaluation per course.

use crate::errors::ValidationError;
use crate::validation;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// SEMESTER
// ============================================================================

/// Declaration order is the chronological order within a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Spring,
    Fall,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Fall => "Fall",
        }
    }
}

/// Parsed `(Spring|Fall)YYYY` label.
///
/// Ordering is chronological: by year first, then Spring before Fall, so
/// `Spring2020 < Fall2020 < Spring2021`. Field order matters for the derive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Semester {
    pub year: u16,
    pub season: Season,
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}", self.season.as_str(), self.year)
    }
}

impl std::str::FromStr for Semester {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validation::parse_semester(s)
    }
}

impl Serialize for Semester {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// KEY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EvaluationKey {
    pub student_id: String,
    pub course_code: String,
}

impl EvaluationKey {
    pub fn new(student_id: &str, course_code: &str) -> Self {
        EvaluationKey {
            student_id: student_id.trim().to_string(),
            course_code: course_code.trim().to_string(),
        }
    }
}

// ============================================================================
// EVALUATION
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvaluation {
    pub student_id: String,
    pub course_code: String,
    pub semester: String,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    student_id: String,
    course_code: String,
    semester: Semester,
    grade: u8,
}

impl Evaluation {
    pub fn new(
        student_id: &str,
        course_code: &str,
        semester: Semester,
        grade: u8,
    ) -> Result<Self, ValidationError> {
        validation::check_grade(grade)?;
        Self::validate_key(student_id, course_code)?;
        Ok(Self::assemble(student_id, course_code, semester, grade))
    }

    /// Error precedence: grade, student id, course code, then semester.
    pub fn from_raw(raw: &RawEvaluation) -> Result<Self, ValidationError> {
        let grade = validation::parse_grade(&raw.grade)?;
        Self::validate_key(&raw.student_id, &raw.course_code)?;
        let semester = validation::parse_semester(&raw.semester)?;

        Ok(Self::assemble(&raw.student_id, &raw.course_code, semester, grade))
    }

    fn validate_key(student_id: &str, course_code: &str) -> Result<(), ValidationError> {
        validation::validate_student_id(student_id)?;
        validation::validate_course_code(course_code)
    }

    fn assemble(student_id: &str, course_code: &str, semester: Semester, grade: u8) -> Self {
        Evaluation {
            student_id: student_id.trim().to_string(),
            course_code: course_code.trim().to_string(),
            semester,
            grade,
        }
    }

    pub fn key(&self) -> EvaluationKey {
        EvaluationKey {
            student_id: self.student_id.clone(),
            course_code: self.course_code.clone(),
        }
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn course_code(&self) -> &str {
        &self.course_code
    }

    pub fn semester(&self) -> Semester {
        self.semester
    }

    pub fn grade(&self) -> u8 {
        self.grade
    }

    pub fn to_raw(&self) -> RawEvaluation {
        RawEvaluation {
            student_id: self.student_id.clone(),
            course_code: self.course_code.clone(),
            semester: self.semester.to_string(),
            grade: self.grade.to_string(),
        }
    }
}
