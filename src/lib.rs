// Grade Registry - Core Library
// Exposes all modules for use in the shell, the API server, and tests

pub mod errors;
pub mod validation;
pub mod entities;
pub mod grading;
pub mod storage;
pub mod registry;
pub mod query;
pub mod ranking;
pub mod transcript;
pub mod report;
pub mod display;
pub mod shell;
pub mod config;
pub mod logging;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use errors::{Conflict, QueryError, RegistryError, Result, ValidationError};
pub use entities::{
    Course, Evaluation, EvaluationKey, Level, RawCourse, RawEvaluation, RawStudent, Season,
    Semester, Student,
};
pub use grading::{compute_student_stats, letter_for, round2, LetterGrade, StudentStats};
pub use storage::{load_folder, read_folder, FlatFileSink, MemorySink, RecordSink};
pub use registry::{AddOutcome, LoadCounts, LoadOutcome, Registry};
pub use query::{run_query, Criteria, EntityKind, Operator, QueryRows, Queryable};
pub use ranking::{top_courses, top_students, CourseRow, StudentRow};
pub use transcript::{transcript, Transcript, TranscriptLine, TranscriptSemester};
pub use report::{parse_limit, ReportFormat, RowLimit};
pub use shell::Shell;
pub use config::Config;
pub use logging::LogFormat;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
