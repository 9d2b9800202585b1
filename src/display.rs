// 🔎 Display lookups - `find` output and query row lines
//
// Plain text blocks, one `key: value` per line, each terminated by '\n'.

use crate::entities::{Course, Evaluation, Student};
use crate::errors::Result;
use crate::grading;
use crate::query::QueryRows;
use crate::registry::Registry;

pub fn find_student(registry: &Registry, id: &str) -> Result<String> {
    let student = match registry.lookup_student(id)? {
        Some(s) => s,
        None => return Ok("error: no student found\n".to_string()),
    };
    let stats = grading::compute_student_stats(registry, student.id())?;

    Ok(format!(
        "id: {}\nname: {}\nsurname: {}\nemail: {}\nlevel: {}\ncourses: {}\ncredits: {}\ngpa: {:.2}\n",
        student.id(),
        student.name(),
        student.surname(),
        student.email().unwrap_or(""),
        student.level().label(),
        stats.courses_taken,
        stats.total_credits,
        stats.gpa
    ))
}

pub fn find_course(registry: &Registry, code: &str) -> Result<String> {
    let course = match registry.lookup_course(code)? {
        Some(c) => c,
        None => return Ok("error: no course found\n".to_string()),
    };

    Ok(format!(
        "code: {}\ntitle: {}\ncredits: {}\nlevel: {}\n",
        course.code(),
        course.title(),
        course.credits(),
        course.level().label()
    ))
}

pub fn find_grade(registry: &Registry, student_id: &str, course_code: &str) -> Result<String> {
    let evaluation = match registry.lookup_evaluation(student_id, course_code)? {
        Some(e) => e,
        None => return Ok("error: no grade found\n".to_string()),
    };

    // Both references are checked when the evaluation is stored
    let (student, course) = match (
        registry.lookup_student(evaluation.student_id())?,
        registry.lookup_course(evaluation.course_code())?,
    ) {
        (Some(s), Some(c)) => (s, c),
        _ => return Ok("error: internal data inconsistency\n".to_string()),
    };
    let letter = grading::letter_for(student.level(), i64::from(evaluation.grade()))?;

    Ok(format!(
        "student: ({} - {} {})\ncourse: ({} - {}, {} cr.)\nsemester: {}\ngrade: {}\nlettergrade: {}\n",
        student.id(),
        student.name(),
        student.surname(),
        course.code(),
        course.title(),
        course.credits(),
        evaluation.semester(),
        evaluation.grade(),
        letter.as_str()
    ))
}

// ============================================================================
// QUERY ROWS
// ============================================================================

pub fn student_line(s: &Student) -> String {
    format!(
        "{}, {}, {}, {}, {}",
        s.id(),
        s.name(),
        s.surname(),
        s.email().unwrap_or(""),
        s.level().code()
    )
}

pub fn course_line(c: &Course) -> String {
    format!("{}, {}, {}", c.code(), c.title(), c.credits())
}

pub fn evaluation_line(e: &Evaluation) -> String {
    format!(
        "{}, {}, {}, {}",
        e.student_id(),
        e.course_code(),
        e.semester(),
        e.grade()
    )
}

/// `N records found` followed by one line per row.
pub fn query_result(rows: &QueryRows<'_>) -> String {
    let lines: Vec<String> = match rows {
        QueryRows::Students(v) => v.iter().map(|s| student_line(s)).collect(),
        QueryRows::Courses(v) => v.iter().map(|c| course_line(c)).collect(),
        QueryRows::Grades(v) => v.iter().map(|e| evaluation_line(e)).collect(),
    };

    let mut out = format!("{} records found\n", rows.count());
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::run_query;
    use crate::registry::tests::loaded_registry;

    #[test]
    fn test_find_student_block() {
        let (registry, _) = loaded_registry();

        let out = find_student(&registry, "1").unwrap();
        assert_eq!(
            out,
            "id: 1\nname: Anna\nsurname: Surname\nemail: \nlevel: undergraduate\n\
             courses: 2\ncredits: 5\ngpa: 3.60\n"
        );
        assert_eq!(find_student(&registry, "77").unwrap(), "error: no student found\n");
    }

    #[test]
    fn test_find_course_block() {
        let (registry, _) = loaded_registry();

        let out = find_course(&registry, "CS501").unwrap();
        assert!(out.contains("credits: 4\n"));
        assert!(out.ends_with("level: graduate\n"));
        assert_eq!(find_course(&registry, "XX100").unwrap(), "error: no course found\n");
    }

    #[test]
    fn test_find_grade_block() {
        let (registry, _) = loaded_registry();

        let out = find_grade(&registry, "2", "CS501").unwrap();
        assert_eq!(
            out,
            "student: (2 - Joanna Surname)\ncourse: (CS501 - CS501 title, 4 cr.)\n\
             semester: Spring2020\ngrade: 88\nlettergrade: B+\n"
        );
        assert_eq!(find_grade(&registry, "2", "CS101").unwrap(), "error: no grade found\n");
    }

    #[test]
    fn test_query_result_listing() {
        let (registry, _) = loaded_registry();

        let rows = run_query(&registry, "student", "level=G").unwrap();
        assert_eq!(query_result(&rows), "1 records found\n2, Joanna, Surname, , G\n");

        let rows = run_query(&registry, "course", "credits=9").unwrap();
        assert_eq!(query_result(&rows), "0 records found\n");
    }
}
