// 🧮 Grading Engine - numeric score → letter grade + points, GPA aggregation
//
// Thresholds depend on the STUDENT's level (stored), not the course's.

use crate::entities::{Course, Evaluation, Level};
use crate::errors::{Result, ValidationError};
use crate::registry::Registry;
use serde::Serialize;

// ============================================================================
// LETTER GRADE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LetterGrade {
    A,
    AMinus,
    BPlus,
    B,
    BMinus,
    CPlus,
    C,
    CMinus,
    DPlus,
    D,
    DMinus,
    F,
}

impl LetterGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::DPlus => "D+",
            LetterGrade::D => "D",
            LetterGrade::DMinus => "D-",
            LetterGrade::F => "F",
        }
    }

    pub fn points(&self) -> f64 {
        match self {
            LetterGrade::A => 4.00,
            LetterGrade::AMinus => 3.67,
            LetterGrade::BPlus => 3.33,
            LetterGrade::B => 3.00,
            LetterGrade::BMinus => 2.67,
            LetterGrade::CPlus => 2.33,
            LetterGrade::C => 2.00,
            LetterGrade::CMinus => 1.67,
            LetterGrade::DPlus => 1.33,
            LetterGrade::D => 1.00,
            LetterGrade::DMinus => 0.67,
            LetterGrade::F => 0.00,
        }
    }
}

/// Lower bounds, checked top-down; anything below the last row is F.
const UNDERGRADUATE_SCALE: &[(u8, LetterGrade)] = &[
    (95, LetterGrade::A),
    (90, LetterGrade::AMinus),
    (87, LetterGrade::BPlus),
    (84, LetterGrade::B),
    (80, LetterGrade::BMinus),
    (77, LetterGrade::CPlus),
    (74, LetterGrade::C),
    (70, LetterGrade::CMinus),
    (67, LetterGrade::DPlus),
    (64, LetterGrade::D),
    (60, LetterGrade::DMinus),
];

const GRADUATE_SCALE: &[(u8, LetterGrade)] = &[
    (90, LetterGrade::A),
    (85, LetterGrade::BPlus),
    (80, LetterGrade::B),
    (75, LetterGrade::C),
];

/// Map a numeric grade to a letter grade for a student of `level`.
pub fn letter_for(level: Level, numeric: i64) -> std::result::Result<LetterGrade, ValidationError> {
    if !(0..=100).contains(&numeric) {
        return Err(ValidationError::InvalidGrade);
    }

    let scale = match level {
        Level::Undergraduate => UNDERGRADUATE_SCALE,
        Level::Graduate => GRADUATE_SCALE,
    };

    Ok(scale
        .iter()
        .find(|(floor, _)| numeric >= i64::from(*floor))
        .map(|(_, letter)| *letter)
        .unwrap_or(LetterGrade::F))
}

/// Round to 2 decimals, half away from zero.
///
/// Values like 3.455 are stored as 3.45499999…; the scaled value is nudged
/// by 1e-9 toward the rounding direction so decimal halves round up.
pub fn round2(x: f64) -> f64 {
    let scaled = x * 100.0;
    let nudged = scaled + scaled.signum() * 1e-9;
    nudged.round() / 100.0
}

// ============================================================================
// STUDENT STATISTICS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    pub courses_taken: u32,
    pub total_credits: u32,
    pub gpa: f64,
}

impl StudentStats {
    pub fn empty() -> Self {
        StudentStats {
            courses_taken: 0,
            total_credits: 0,
            gpa: 0.0,
        }
    }
}

/// Credit-weighted GPA over `(evaluation, course)` pairs for one student.
///
/// Pairs must already be resolved; an unresolvable course never reaches here.
pub fn aggregate<'a, I>(level: Level, graded: I) -> StudentStats
where
    I: IntoIterator<Item = (&'a Evaluation, &'a Course)>,
{
    let mut total_points = 0.0;
    let mut total_credits = 0u32;
    let mut courses_taken = 0u32;

    for (evaluation, course) in graded {
        // Grades are range-checked at construction
        let letter = letter_for(level, i64::from(evaluation.grade())).unwrap_or(LetterGrade::F);
        let credits = u32::from(course.credits());

        total_points += letter.points() * f64::from(credits);
        total_credits += credits;
        courses_taken += 1;
    }

    let gpa = if total_credits == 0 {
        0.0
    } else {
        round2(total_points / f64::from(total_credits))
    };

    StudentStats {
        courses_taken,
        total_credits,
        gpa,
    }
}

/// Stats for one student over every evaluation whose course resolves.
/// An unknown id yields empty stats (gpa 0.00).
pub fn compute_student_stats(registry: &Registry, student_id: &str) -> Result<StudentStats> {
    let student = match registry.lookup_student(student_id)? {
        Some(s) => s,
        None => return Ok(StudentStats::empty()),
    };

    Ok(aggregate(student.level(), registry.graded_courses(student.id())?))
}

// ============================================================================
// TESTS
// ============================================================================
