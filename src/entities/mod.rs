// Entity Models
//
// Each entity has:
// - A natural key (student id, course code, (student id, course code))
// - Immutable validated values, built only through `new` / `from_raw`
// - A `Raw*` twin holding unvalidated text fields for loaders and the shell

pub mod student;
pub mod course;
pub mod evaluation;

pub use student::{Level, RawStudent, Student};
pub use course::{Course, RawCourse};
pub use evaluation::{Evaluation, EvaluationKey, RawEvaluation, Season, Semester};
