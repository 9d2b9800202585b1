// 🔎 Query Engine - `field=value` / `field~value` filter criteria
//
// Grammar: comma-separated clauses, each `field<op>value` with op `=`
// (exact) or `~` (case-sensitive substring). Clauses are ANDed; an empty
// criteria string matches everything.
//
// Field names are resolved ONCE, when criteria are parsed for a concrete
// entity type. Matching then dispatches on a fixed per-entity field enum,
// never on strings.

use crate::entities::{Course, Evaluation, Student};
use crate::errors::{QueryError, Result};
use crate::registry::Registry;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// QUERYABLE ENTITIES
// ============================================================================

/// An entity whose fields can be filtered by criteria.
pub trait Queryable {
    /// Entity name used in error messages
    const ENTITY: &'static str;

    type Field: Copy + fmt::Debug + PartialEq;

    fn field_named(name: &str) -> Option<Self::Field>;

    /// Canonical string form: enum symbolic names, integers as decimal text.
    fn field_value(&self, field: Self::Field) -> Cow<'_, str>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentField {
    Id,
    Name,
    Surname,
    Email,
    Level,
}

impl Queryable for Student {
    const ENTITY: &'static str = "student";
    type Field = StudentField;

    fn field_named(name: &str) -> Option<StudentField> {
        match name {
            "id" => Some(StudentField::Id),
            "name" => Some(StudentField::Name),
            "surname" => Some(StudentField::Surname),
            "email" => Some(StudentField::Email),
            "level" => Some(StudentField::Level),
            _ => None,
        }
    }

    fn field_value(&self, field: StudentField) -> Cow<'_, str> {
        match field {
            StudentField::Id => Cow::Borrowed(self.id()),
            StudentField::Name => Cow::Borrowed(self.name()),
            StudentField::Surname => Cow::Borrowed(self.surname()),
            StudentField::Email => Cow::Borrowed(self.email().unwrap_or("")),
            StudentField::Level => Cow::Borrowed(self.level().code()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseField {
    Code,
    Title,
    Credits,
}

impl Queryable for Course {
    const ENTITY: &'static str = "course";
    type Field = CourseField;

    fn field_named(name: &str) -> Option<CourseField> {
        match name {
            "code" => Some(CourseField::Code),
            "title" => Some(CourseField::Title),
            "credits" => Some(CourseField::Credits),
            _ => None,
        }
    }

    fn field_value(&self, field: CourseField) -> Cow<'_, str> {
        match field {
            CourseField::Code => Cow::Borrowed(self.code()),
            CourseField::Title => Cow::Borrowed(self.title()),
            CourseField::Credits => Cow::Owned(self.credits().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationField {
    StudentId,
    CourseCode,
    Semester,
    Grade,
}

impl Queryable for Evaluation {
    const ENTITY: &'static str = "grade";
    type Field = EvaluationField;

    fn field_named(name: &str) -> Option<EvaluationField> {
        match name {
            "studentID" => Some(EvaluationField::StudentId),
            "courseCode" => Some(EvaluationField::CourseCode),
            "semester" => Some(EvaluationField::Semester),
            "grade" => Some(EvaluationField::Grade),
            _ => None,
        }
    }

    fn field_value(&self, field: EvaluationField) -> Cow<'_, str> {
        match field {
            EvaluationField::StudentId => Cow::Borrowed(self.student_id()),
            EvaluationField::CourseCode => Cow::Borrowed(self.course_code()),
            EvaluationField::Semester => Cow::Owned(self.semester().to_string()),
            EvaluationField::Grade => Cow::Owned(self.grade().to_string()),
        }
    }
}

// ============================================================================
// CRITERIA
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=`
    Exact,
    /// `~`
    Contains,
}

impl Operator {
    fn apply(&self, actual: &str, expected: &str) -> bool {
        match self {
            Operator::Exact => actual == expected,
            Operator::Contains => actual.contains(expected),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clause<F> {
    pub field: F,
    pub op: Operator,
    pub value: String,
}

/// Parsed, field-checked criteria for entity type `T`.
pub struct Criteria<T: Queryable> {
    clauses: Vec<Clause<T::Field>>,
}

impl<T: Queryable> fmt::Debug for Criteria<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Criteria")
            .field("entity", &T::ENTITY)
            .field("clauses", &self.clauses)
            .finish()
    }
}

/// Split one clause into (field, op, value) without resolving the field.
fn split_clause(token: &str) -> std::result::Result<(&str, Operator, &str), QueryError> {
    let invalid = || QueryError::InvalidClause(token.to_string());

    let (idx, op) = match (token.find('='), token.find('~')) {
        (Some(i), None) => (i, Operator::Exact),
        (None, Some(i)) => (i, Operator::Contains),
        _ => return Err(invalid()),
    };

    let field = token[..idx].trim();
    if field.is_empty() {
        return Err(invalid());
    }
    Ok((field, op, token[idx + 1..].trim()))
}

impl<T: Queryable> Criteria<T> {
    /// Criteria that match every record
    pub fn all() -> Self {
        Criteria { clauses: Vec::new() }
    }

    pub fn parse(input: &str) -> std::result::Result<Self, QueryError> {
        let mut clauses = Vec::new();

        for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (name, op, value) = split_clause(token)?;
            let field = T::field_named(name).ok_or_else(|| QueryError::UnknownField {
                entity: T::ENTITY,
                field: name.to_string(),
            })?;
            clauses.push(Clause {
                field,
                op,
                value: value.to_string(),
            });
        }

        Ok(Criteria { clauses })
    }

    pub fn clauses(&self) -> &[Clause<T::Field>] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, item: &T) -> bool {
        self.clauses
            .iter()
            .all(|c| c.op.apply(&item.field_value(c.field), &c.value))
    }

    /// Matching records, in input order
    pub fn filter<'a>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

impl<T: Queryable> FromStr for Criteria<T> {
    type Err = QueryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Criteria::parse(s)
    }
}

// ============================================================================
// REGISTRY QUERIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Student,
    Course,
    Grade,
}

impl FromStr for EntityKind {
    type Err = QueryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "student" => Ok(EntityKind::Student),
            "course" => Ok(EntityKind::Course),
            "grade" => Ok(EntityKind::Grade),
            other => Err(QueryError::UnknownEntity(other.to_string())),
        }
    }
}

/// Matching rows of one entity kind, in store order.
#[derive(Debug, Clone)]
pub enum QueryRows<'a> {
    Students(Vec<&'a Student>),
    Courses(Vec<&'a Course>),
    Grades(Vec<&'a Evaluation>),
}

impl QueryRows<'_> {
    pub fn count(&self) -> usize {
        match self {
            QueryRows::Students(rows) => rows.len(),
            QueryRows::Courses(rows) => rows.len(),
            QueryRows::Grades(rows) => rows.len(),
        }
    }
}

pub fn query_students<'a>(registry: &'a Registry, criteria: &Criteria<Student>) -> Result<Vec<&'a Student>> {
    Ok(criteria.filter(registry.all_students()?))
}

pub fn query_courses<'a>(registry: &'a Registry, criteria: &Criteria<Course>) -> Result<Vec<&'a Course>> {
    Ok(criteria.filter(registry.all_courses()?))
}

pub fn query_grades<'a>(registry: &'a Registry, criteria: &Criteria<Evaluation>) -> Result<Vec<&'a Evaluation>> {
    Ok(criteria.filter(registry.all_evaluations()?))
}

/// `query <entity> <criteria>`: load check, then entity, then criteria.
pub fn run_query<'a>(registry: &'a Registry, entity: &str, criteria: &str) -> Result<QueryRows<'a>> {
    registry.require_loaded()?;

    let rows = match entity.parse::<EntityKind>()? {
        EntityKind::Student => QueryRows::Students(query_students(registry, &Criteria::parse(criteria)?)?),
        EntityKind::Course => QueryRows::Courses(query_courses(registry, &Criteria::parse(criteria)?)?),
        EntityKind::Grade => QueryRows::Grades(query_grades(registry, &Criteria::parse(criteria)?)?),
    };

    tracing::debug!(entity, criteria, matches = rows.count(), "query evaluated");
    Ok(rows)
}

// ============================================================================
// TESTS
// ============================================================================
