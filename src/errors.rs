// Error taxonomy
//
// Hard errors abort the current operation with no state change and are
// returned as `Err`. Recoverable conditions (duplicates, dangling references,
// cross-level enrolments, missing data files) are NOT errors: they travel as
// `Conflict` values inside `AddOutcome` / `LoadOutcome`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using RegistryError
pub type Result<T> = std::result::Result<T, RegistryError>;

// ============================================================================
// FIELD VALIDATION
// ============================================================================

/// A single failed field check. Shared by bulk load and interactive add.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("invalid student ID")]
    InvalidStudentId,

    #[error("invalid {0}: commas are not allowed")]
    DelimiterInField(&'static str),

    #[error("invalid email")]
    InvalidEmail,

    #[error("invalid level")]
    InvalidLevel,

    #[error("invalid course code")]
    InvalidCourseCode,

    #[error("invalid credits")]
    InvalidCredits,

    #[error("invalid semester")]
    InvalidSemester,

    #[error("invalid grade")]
    InvalidGrade,
}

// ============================================================================
// QUERY LANGUAGE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Clause carries both `=` and `~`, neither, or an empty field name
    #[error("invalid criteria: {0}")]
    InvalidClause(String),

    #[error("invalid field for {entity}: {field}")]
    UnknownField { entity: &'static str, field: String },

    #[error("no such entity")]
    UnknownEntity(String),
}

// ============================================================================
// REGISTRY (hard errors)
// ============================================================================

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("data not loaded")]
    NotLoaded,

    #[error("duplicate student id in file: {0}")]
    DuplicateStudentInFile(String),

    #[error("duplicate course code in file: {0}")]
    DuplicateCourseInFile(String),

    #[error("duplicate grade key: ({student_id}, {course_code})")]
    DuplicateGradeInFile {
        student_id: String,
        course_code: String,
    },

    #[error("grade references missing student: {0}")]
    DanglingStudent(String),

    #[error("grade references missing course: {0}")]
    DanglingCourse(String),

    #[error("invalid grade: graduate student in undergraduate course: {0}")]
    CrossLevelInFile(String),

    #[error("{file} invalid line {line}")]
    MalformedLine { file: String, line: u64 },

    #[error("invalid number of fields for {0}")]
    FieldCount(&'static str),

    #[error("invalid n")]
    InvalidLimit,

    #[error("unsupported report format")]
    UnsupportedFormat(PathBuf),

    #[error("cannot write to data file: {file}")]
    Append {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {file}")]
    Read {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("cannot write report file")]
    ReportIo(#[from] std::io::Error),

    #[error("cannot render CSV report")]
    Csv(#[from] csv::Error),

    #[error("cannot render JSON report")]
    Json(#[from] serde_json::Error),
}

impl RegistryError {
    /// True when the error came from a malformed field rather than from
    /// state or I/O.
    pub fn is_validation(&self) -> bool {
        matches!(self, RegistryError::Validation(_))
    }
}

// ============================================================================
// RECOVERABLE CONDITIONS
// ============================================================================

/// A negative result reported within the normal flow; never aborts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    AlreadyLoaded,
    InvalidFolder(PathBuf),
    FilesNotFound(PathBuf),
    DuplicateStudent(String),
    DuplicateCourse(String),
    DuplicateEvaluation {
        student_id: String,
        course_code: String,
    },
    MissingStudent(String),
    MissingCourse(String),
    CrossLevel {
        student_id: String,
        course_code: String,
    },
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Conflict::AlreadyLoaded => write!(f, "data already loaded, cannot load again!"),
            Conflict::InvalidFolder(_) => write!(f, "invalid folder name"),
            Conflict::FilesNotFound(_) => write!(f, "data files not found"),
            Conflict::DuplicateStudent(id) => {
                write!(f, "student with id {} is already present", id)
            }
            Conflict::DuplicateCourse(code) => {
                write!(f, "course with code {} is already present", code)
            }
            Conflict::DuplicateEvaluation {
                student_id,
                course_code,
            } => write!(
                f,
                "grade for ({}, {}) is already present",
                student_id, course_code
            ),
            Conflict::MissingStudent(_) => write!(f, "no student found"),
            Conflict::MissingCourse(_) => write!(f, "no course found"),
            Conflict::CrossLevel { .. } => {
                write!(f, "graduate student may not take undergraduate course")
            }
        }
    }
}
