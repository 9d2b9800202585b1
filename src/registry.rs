// 🏛️ Registry - indexed store of students, courses and evaluations
//
// Lifecycle: Unloaded → Loaded, exactly once, via `bulk_load`. After that,
// records are only ever added (no update, no delete) through the `insert_*`
// operations, each of which persists its delta through the RecordSink.
//
// Records are kept in insertion order (Vec) with a key → position index, so
// snapshots and query results come back in stable store order.
//
// Persistence ordering: append first, insert on success. A failed append is
// a hard error and leaves memory untouched, so memory never runs ahead of
// the backing files.

use crate::entities::{
    Course, Evaluation, EvaluationKey, Level, RawCourse, RawEvaluation, RawStudent, Student,
};
use crate::errors::{Conflict, RegistryError, Result};
use crate::storage::RecordSink;
use std::collections::HashMap;

// ============================================================================
// OUTCOMES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadCounts {
    pub students: usize,
    pub courses: usize,
    pub evaluations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(LoadCounts),
    Rejected(Conflict),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Rejected(Conflict),
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added)
    }
}

// ============================================================================
// TABLES
// ============================================================================

#[derive(Default)]
struct Tables {
    students: Vec<Student>,
    courses: Vec<Course>,
    evaluations: Vec<Evaluation>,

    student_index: HashMap<String, usize>,
    course_index: HashMap<String, usize>,
    evaluation_index: HashMap<EvaluationKey, usize>,
    /// student id → positions in `evaluations`
    by_student: HashMap<String, Vec<usize>>,
}

impl Tables {
    fn student(&self, id: &str) -> Option<&Student> {
        self.student_index.get(id).map(|&i| &self.students[i])
    }

    fn course(&self, code: &str) -> Option<&Course> {
        self.course_index.get(code).map(|&i| &self.courses[i])
    }

    fn push_student(&mut self, student: Student) {
        self.student_index
            .insert(student.id().to_string(), self.students.len());
        self.students.push(student);
    }

    fn push_course(&mut self, course: Course) {
        self.course_index
            .insert(course.code().to_string(), self.courses.len());
        self.courses.push(course);
    }

    fn push_evaluation(&mut self, evaluation: Evaluation) {
        let position = self.evaluations.len();
        self.evaluation_index.insert(evaluation.key(), position);
        self.by_student
            .entry(evaluation.student_id().to_string())
            .or_default()
            .push(position);
        self.evaluations.push(evaluation);
    }

    /// Cross-entity rules for a new evaluation, in precedence order:
    /// missing student, missing course, duplicate key, cross-level.
    fn evaluation_conflict(&self, evaluation: &Evaluation) -> Option<EvaluationConflict> {
        let student = match self.student(evaluation.student_id()) {
            Some(s) => s,
            None => return Some(EvaluationConflict::MissingStudent),
        };
        let course = match self.course(evaluation.course_code()) {
            Some(c) => c,
            None => return Some(EvaluationConflict::MissingCourse),
        };

        if self.evaluation_index.contains_key(&evaluation.key()) {
            return Some(EvaluationConflict::Duplicate);
        }
        if student.level() == Level::Graduate && course.level() == Level::Undergraduate {
            return Some(EvaluationConflict::CrossLevel);
        }
        None
    }

    fn counts(&self) -> LoadCounts {
        LoadCounts {
            students: self.students.len(),
            courses: self.courses.len(),
            evaluations: self.evaluations.len(),
        }
    }
}

/// Why an evaluation cannot join the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EvaluationConflict {
    MissingStudent,
    MissingCourse,
    Duplicate,
    CrossLevel,
}

impl EvaluationConflict {
    /// Interactive add: a recoverable condition
    fn into_conflict(self, evaluation: &Evaluation) -> Conflict {
        let student_id = evaluation.student_id().to_string();
        let course_code = evaluation.course_code().to_string();
        match self {
            EvaluationConflict::MissingStudent => Conflict::MissingStudent(student_id),
            EvaluationConflict::MissingCourse => Conflict::MissingCourse(course_code),
            EvaluationConflict::Duplicate => Conflict::DuplicateEvaluation {
                student_id,
                course_code,
            },
            EvaluationConflict::CrossLevel => Conflict::CrossLevel {
                student_id,
                course_code,
            },
        }
    }

    /// Bulk load: integrity violations are hard errors
    fn into_load_error(self, evaluation: &Evaluation) -> RegistryError {
        let student_id = evaluation.student_id().to_string();
        let course_code = evaluation.course_code().to_string();
        match self {
            EvaluationConflict::MissingStudent => RegistryError::DanglingStudent(student_id),
            EvaluationConflict::MissingCourse => RegistryError::DanglingCourse(course_code),
            EvaluationConflict::Duplicate => RegistryError::DuplicateGradeInFile {
                student_id,
                course_code,
            },
            EvaluationConflict::CrossLevel => RegistryError::CrossLevelInFile(course_code),
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

enum State {
    Unloaded,
    Loaded { sink: Box<dyn RecordSink> },
}

/// The entity store. Owned by the caller; no ambient global state.
pub struct Registry {
    state: State,
    tables: Tables,
}

impl Registry {
    /// Create an empty, unloaded registry
    pub fn new() -> Self {
        Registry {
            state: State::Unloaded,
            tables: Tables::default(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, State::Loaded { .. })
    }

    /// Fails with `NotLoaded` until a bulk load has succeeded.
    pub fn require_loaded(&self) -> Result<()> {
        if self.is_loaded() {
            Ok(())
        } else {
            Err(RegistryError::NotLoaded)
        }
    }

    /// Record counts (zero while unloaded)
    pub fn counts(&self) -> LoadCounts {
        self.tables.counts()
    }

    // ========================================================================
    // BULK LOAD
    // ========================================================================

    /// Validate and index a full data set, all-or-nothing.
    ///
    /// Legal once, from the Unloaded state; a second call is the recoverable
    /// `AlreadyLoaded`. Any field or integrity violation aborts the load with
    /// a hard error and the registry stays Unloaded. Nothing is persisted.
    pub fn bulk_load(
        &mut self,
        students: Vec<RawStudent>,
        courses: Vec<RawCourse>,
        evaluations: Vec<RawEvaluation>,
        sink: Box<dyn RecordSink>,
    ) -> Result<LoadOutcome> {
        if self.is_loaded() {
            tracing::warn!("load rejected: registry already loaded");
            return Ok(LoadOutcome::Rejected(Conflict::AlreadyLoaded));
        }

        let mut tables = Tables::default();

        for raw in &students {
            let student = Student::from_raw(raw)?;
            if tables.student_index.contains_key(student.id()) {
                return Err(RegistryError::DuplicateStudentInFile(student.id().to_string()));
            }
            tables.push_student(student);
        }

        for raw in &courses {
            let course = Course::from_raw(raw)?;
            if tables.course_index.contains_key(course.code()) {
                return Err(RegistryError::DuplicateCourseInFile(course.code().to_string()));
            }
            tables.push_course(course);
        }

        for raw in &evaluations {
            let evaluation = Evaluation::from_raw(raw)?;
            if let Some(conflict) = tables.evaluation_conflict(&evaluation) {
                return Err(conflict.into_load_error(&evaluation));
            }
            tables.push_evaluation(evaluation);
        }

        let counts = tables.counts();
        self.tables = tables;
        self.state = State::Loaded { sink };

        tracing::info!(
            students = counts.students,
            courses = counts.courses,
            evaluations = counts.evaluations,
            "registry loaded"
        );
        Ok(LoadOutcome::Loaded(counts))
    }

    // ========================================================================
    // INCREMENTAL INSERTS
    // ========================================================================

    fn sink(&mut self) -> Result<&mut dyn RecordSink> {
        match &mut self.state {
            State::Loaded { sink } => Ok(sink.as_mut()),
            State::Unloaded => Err(RegistryError::NotLoaded),
        }
    }

    pub fn insert_student(&mut self, raw: &RawStudent) -> Result<AddOutcome> {
        self.require_loaded()?;
        let student = Student::from_raw(raw)?;

        if self.tables.student_index.contains_key(student.id()) {
            return Ok(rejected(Conflict::DuplicateStudent(student.id().to_string())));
        }

        self.sink()?.append_student(&student)?;
        tracing::info!(id = student.id(), "student added");
        self.tables.push_student(student);
        Ok(AddOutcome::Added)
    }

    pub fn insert_course(&mut self, raw: &RawCourse) -> Result<AddOutcome> {
        self.require_loaded()?;
        let course = Course::from_raw(raw)?;

        if self.tables.course_index.contains_key(course.code()) {
            return Ok(rejected(Conflict::DuplicateCourse(course.code().to_string())));
        }

        self.sink()?.append_course(&course)?;
        tracing::info!(code = course.code(), "course added");
        self.tables.push_course(course);
        Ok(AddOutcome::Added)
    }

    pub fn insert_evaluation(&mut self, raw: &RawEvaluation) -> Result<AddOutcome> {
        self.require_loaded()?;
        let evaluation = Evaluation::from_raw(raw)?;

        if let Some(conflict) = self.tables.evaluation_conflict(&evaluation) {
            return Ok(rejected(conflict.into_conflict(&evaluation)));
        }

        self.sink()?.append_evaluation(&evaluation)?;
        tracing::info!(
            student_id = evaluation.student_id(),
            course_code = evaluation.course_code(),
            "grade added"
        );
        self.tables.push_evaluation(evaluation);
        Ok(AddOutcome::Added)
    }

    // ========================================================================
    // LOOKUPS
    // ========================================================================

    pub fn lookup_student(&self, id: &str) -> Result<Option<&Student>> {
        self.require_loaded()?;
        Ok(self.tables.student(id.trim()))
    }

    pub fn lookup_course(&self, code: &str) -> Result<Option<&Course>> {
        self.require_loaded()?;
        Ok(self.tables.course(code.trim()))
    }

    pub fn lookup_evaluation(&self, student_id: &str, course_code: &str) -> Result<Option<&Evaluation>> {
        self.require_loaded()?;
        let key = EvaluationKey::new(student_id, course_code);
        Ok(self
            .tables
            .evaluation_index
            .get(&key)
            .map(|&i| &self.tables.evaluations[i]))
    }

    pub fn all_students(&self) -> Result<&[Student]> {
        self.require_loaded()?;
        Ok(&self.tables.students)
    }

    pub fn all_courses(&self) -> Result<&[Course]> {
        self.require_loaded()?;
        Ok(&self.tables.courses)
    }

    pub fn all_evaluations(&self) -> Result<&[Evaluation]> {
        self.require_loaded()?;
        Ok(&self.tables.evaluations)
    }

    /// A student's evaluations paired with their (resolvable) course, in
    /// store order.
    pub fn graded_courses(&self, student_id: &str) -> Result<Vec<(&Evaluation, &Course)>> {
        self.require_loaded()?;

        let positions = match self.tables.by_student.get(student_id) {
            Some(p) => p,
            None => return Ok(Vec::new()),
        };

        Ok(positions
            .iter()
            .map(|&i| &self.tables.evaluations[i])
            .filter_map(|e| {
                let course = self.tables.course(e.course_code());
                debug_assert!(course.is_some(), "evaluation references missing course");
                course.map(|c| (e, c))
            })
            .collect())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn rejected(conflict: Conflict) -> AddOutcome {
    tracing::warn!(%conflict, "add rejected");
    AddOutcome::Rejected(conflict)
}

// ============================================================================
// TESTS
// ============================================================================
