// 🏆 Ranking Engine - top-N student / course leaderboards
//
// Both orders are TOTAL: the final tie-breaker is the unique key, so results
// never depend on storage iteration order.
//
// students: gpa desc → total credits desc → id asc (lexicographic)
// courses:  grade count desc → code asc

use crate::entities::{Course, Level, Student};
use crate::errors::Result;
use crate::grading;
use crate::registry::Registry;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

// ============================================================================
// ROWS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRow {
    pub id: String,
    pub name: String,
    pub surname: String,
    #[serde(serialize_with = "serialize_level_label")]
    pub level: Level,
    pub total_credits: u32,
    pub gpa: f64,
}

impl StudentRow {
    fn new(student: &Student, total_credits: u32, gpa: f64) -> Self {
        StudentRow {
            id: student.id().to_string(),
            name: student.name().to_string(),
            surname: student.surname().to_string(),
            level: student.level(),
            total_credits,
            gpa,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRow {
    pub code: String,
    pub title: String,
    pub credits: u8,
    /// Derived from the code
    #[serde(serialize_with = "serialize_level_label")]
    pub level: Level,
    pub grade_count: usize,
}

impl CourseRow {
    fn new(course: &Course, grade_count: usize) -> Self {
        CourseRow {
            code: course.code().to_string(),
            title: course.title().to_string(),
            credits: course.credits(),
            level: course.level(),
            grade_count,
        }
    }
}

pub(crate) fn serialize_level_label<S: serde::Serializer>(
    level: &Level,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(level.label())
}

// ============================================================================
// ORDERINGS
// ============================================================================

fn compare_students(a: &StudentRow, b: &StudentRow) -> Ordering {
    b.gpa
        .total_cmp(&a.gpa)
        .then_with(|| b.total_credits.cmp(&a.total_credits))
        .then_with(|| a.id.cmp(&b.id))
}

fn compare_courses(a: &CourseRow, b: &CourseRow) -> Ordering {
    b.grade_count
        .cmp(&a.grade_count)
        .then_with(|| a.code.cmp(&b.code))
}

// ============================================================================
// LEADERBOARDS
// ============================================================================

/// Best `n` students by GPA. Returns at most `n` rows.
pub fn top_students(registry: &Registry, n: usize) -> Result<Vec<StudentRow>> {
    let mut rows = Vec::with_capacity(registry.all_students()?.len());

    for student in registry.all_students()? {
        let stats = grading::compute_student_stats(registry, student.id())?;
        rows.push(StudentRow::new(student, stats.total_credits, stats.gpa));
    }

    rows.sort_by(compare_students);
    rows.truncate(n);

    tracing::debug!(requested = n, returned = rows.len(), "top students ranked");
    Ok(rows)
}

/// Most-graded `n` courses. Courses with no grades count as 0.
pub fn top_courses(registry: &Registry, n: usize) -> Result<Vec<CourseRow>> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for evaluation in registry.all_evaluations()? {
        *counts.entry(evaluation.course_code()).or_insert(0) += 1;
    }

    let mut rows: Vec<CourseRow> = registry
        .all_courses()?
        .iter()
        .map(|c| CourseRow::new(c, counts.get(c.code()).copied().unwrap_or(0)))
        .collect();

    rows.sort_by(compare_courses);
    rows.truncate(n);

    tracing::debug!(requested = n, returned = rows.len(), "top courses ranked");
    Ok(rows)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::{course, grade, loaded_registry, student};
    use crate::storage::MemorySink;

    #[test]
    fn test_top_students_order() {
        let (registry, _) = loaded_registry();

        let rows = top_students(&registry, 10).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();

        // 1: 3.6 over 5 cr; 2: B+ graduate 3.33 over 4 cr; 3: no grades
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(rows[0].gpa, 3.6);
        assert_eq!(rows[1].gpa, 3.33);
        assert_eq!(rows[2].gpa, 0.0);
    }

    #[test]
    fn test_top_n_limits_rows() {
        let (registry, _) = loaded_registry();

        assert_eq!(top_students(&registry, 2).unwrap().len(), 2);
        assert_eq!(top_students(&registry, 0).unwrap().len(), 0);
        assert_eq!(top_courses(&registry, 1).unwrap().len(), 1);
        assert_eq!(top_courses(&registry, 50).unwrap().len(), 3);
    }

    #[test]
    fn test_student_ties_break_by_credits_then_id() {
        let mut registry = Registry::new();
        registry
            .bulk_load(
                vec![
                    student("20", "A", "UG"),
                    student("3", "B", "UG"),
                    student("100", "C", "UG"),
                ],
                vec![course("CS101", "3"), course("CS102", "3"), course("CS103", "2")],
                vec![
                    // "20" and "3": both A over 3 credits
                    grade("20", "CS101", "Fall2020", "99"),
                    grade("3", "CS102", "Fall2020", "97"),
                    // "100": A over 5 credits, same gpa, more credits
                    grade("100", "CS101", "Fall2020", "95"),
                    grade("100", "CS103", "Fall2020", "96"),
                ],
                Box::new(MemorySink::new()),
            )
            .unwrap();

        let ids: Vec<String> = top_students(&registry, 3)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();

        // Lexicographic: "20" < "3"
        assert_eq!(ids, vec!["100", "20", "3"]);
    }

    #[test]
    fn test_top_courses_count_then_code() {
        let (mut registry, _) = loaded_registry();
        registry
            .insert_evaluation(&grade("3", "CS101", "Fall2021", "70"))
            .unwrap();

        let rows = top_courses(&registry, 3).unwrap();
        let codes: Vec<&str> = rows.iter().map(|r| r.code.as_str()).collect();

        // CS101: 2; CS501 and MATH201: 1 each, tie on code
        assert_eq!(codes, vec!["CS101", "CS501", "MATH201"]);
        assert_eq!(rows[0].grade_count, 2);
        assert_eq!(rows[1].level, Level::Graduate);
    }

    #[test]
    fn test_rows_serialize_with_labels() {
        let (registry, _) = loaded_registry();
        let rows = top_courses(&registry, 1).unwrap();

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["level"], "undergraduate");
        assert_eq!(json["gradeCount"], 1);
    }
}
