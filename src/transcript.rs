// 📜 Transcript Assembler
//
// Groups a student's evaluations by semester. Semester order is
// chronological (year ascending, Spring before Fall), which is exactly the
// derived `Ord` on `Semester`, so a BTreeMap keyed by semester yields the
// final order. Lines inside a semester are ordered by course code.

use crate::entities::{Level, Semester, Student};
use crate::errors::Result;
use crate::grading::{self, round2};
use crate::ranking::serialize_level_label;
use crate::registry::Registry;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptStudent {
    pub id: String,
    pub name: String,
    pub surname: String,
    #[serde(serialize_with = "serialize_level_label")]
    pub level: Level,
}

impl From<&Student> for TranscriptStudent {
    fn from(student: &Student) -> Self {
        TranscriptStudent {
            id: student.id().to_string(),
            name: student.name().to_string(),
            surname: student.surname().to_string(),
            level: student.level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptLine {
    pub course_code: String,
    pub course_title: String,
    pub credits: u8,
    pub numeric_grade: u8,
    pub letter_grade: &'static str,
    /// points × credits, 2 decimals
    pub grade_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSemester {
    pub semester: Semester,
    #[serde(rename = "records")]
    pub lines: Vec<TranscriptLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    pub student: TranscriptStudent,
    pub semesters: Vec<TranscriptSemester>,
}

impl Transcript {
    pub fn line_count(&self) -> usize {
        self.semesters.iter().map(|s| s.lines.len()).sum()
    }
}

/// Assemble the transcript of `student_id`; `None` when no such student.
pub fn transcript(registry: &Registry, student_id: &str) -> Result<Option<Transcript>> {
    let student = match registry.lookup_student(student_id)? {
        Some(s) => s,
        None => return Ok(None),
    };

    let mut by_semester: BTreeMap<Semester, Vec<TranscriptLine>> = BTreeMap::new();

    for (evaluation, course) in registry.graded_courses(student.id())? {
        let letter = grading::letter_for(student.level(), i64::from(evaluation.grade()))?;

        by_semester
            .entry(evaluation.semester())
            .or_default()
            .push(TranscriptLine {
                course_code: course.code().to_string(),
                course_title: course.title().to_string(),
                credits: course.credits(),
                numeric_grade: evaluation.grade(),
                letter_grade: letter.as_str(),
                grade_points: round2(letter.points() * f64::from(course.credits())),
            });
    }

    let semesters = by_semester
        .into_iter()
        .map(|(semester, mut lines)| {
            lines.sort_by(|a, b| a.course_code.cmp(&b.course_code));
            TranscriptSemester { semester, lines }
        })
        .collect();

    Ok(Some(Transcript {
        student: TranscriptStudent::from(student),
        semesters,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::{course, grade, loaded_registry, student};
    use crate::storage::MemorySink;

    fn labels(t: &Transcript) -> Vec<String> {
        t.semesters.iter().map(|s| s.semester.to_string()).collect()
    }

    #[test]
    fn test_unknown_student_is_none() {
        let (registry, _) = loaded_registry();
        assert!(transcript(&registry, "404").unwrap().is_none());
    }

    #[test]
    fn test_transcript_lines_and_points() {
        let (registry, _) = loaded_registry();
        let t = transcript(&registry, "1").unwrap().unwrap();

        assert_eq!(t.student.id, "1");
        assert_eq!(labels(&t), vec!["Fall2020", "Spring2021"]);

        let first = &t.semesters[0].lines[0];
        assert_eq!(first.course_code, "CS101");
        assert_eq!(first.letter_grade, "A");
        assert_eq!(first.grade_points, 12.0);

        // 85 → B (3.00) × 2 credits
        assert_eq!(t.semesters[1].lines[0].grade_points, 6.0);
        assert_eq!(t.line_count(), 2);
    }

    #[test]
    fn test_semesters_chronological_and_codes_sorted() {
        let mut registry = Registry::new();
        registry
            .bulk_load(
                vec![student("7", "Lin", "UG")],
                vec![
                    course("MATH101", "3"),
                    course("CS101", "3"),
                    course("BIO201", "4"),
                    course("CS201", "2"),
                ],
                vec![
                    grade("7", "MATH101", "Spring2021", "80"),
                    grade("7", "CS201", "Fall2020", "91"),
                    grade("7", "CS101", "Spring2021", "70"),
                    grade("7", "BIO201", "Spring2020", "88"),
                ],
                Box::new(MemorySink::new()),
            )
            .unwrap();

        let t = transcript(&registry, "7").unwrap().unwrap();

        assert_eq!(labels(&t), vec!["Spring2020", "Fall2020", "Spring2021"]);
        let codes: Vec<&str> = t.semesters[2]
            .lines
            .iter()
            .map(|l| l.course_code.as_str())
            .collect();
        assert_eq!(codes, vec!["CS101", "MATH101"]);

        // A- (3.67) × 2 credits
        assert_eq!(t.semesters[1].lines[0].grade_points, 7.34);
    }

    #[test]
    fn test_student_without_grades_has_empty_transcript() {
        let (registry, _) = loaded_registry();
        let t = transcript(&registry, "3").unwrap().unwrap();

        assert!(t.semesters.is_empty());
        assert_eq!(t.student.level, Level::Undergraduate);
    }

    #[test]
    fn test_transcript_json_shape() {
        let (registry, _) = loaded_registry();
        let t = transcript(&registry, "2").unwrap().unwrap();

        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["student"]["level"], "graduate");
        assert_eq!(json["semesters"][0]["semester"], "Spring2020");
        assert_eq!(json["semesters"][0]["records"][0]["letterGrade"], "B+");
        assert_eq!(json["semesters"][0]["records"][0]["numericGrade"], 88);
    }
}
