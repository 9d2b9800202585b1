// 📊 Report Service - leaderboards and transcripts written to disk
//
// The output format is picked from the file extension (case-insensitive):
//   .csv  → csv crate writer, header row first
//   .json → serde_json, pretty printed
//   .xml  → rendered by hand, entity-escaped
// Any other extension is a hard error. Reports always overwrite the target.

use crate::errors::{RegistryError, Result};
use crate::ranking::{self, CourseRow, StudentRow};
use crate::registry::Registry;
use crate::transcript::{self, Transcript};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Requests above this many rows are clamped.
pub const DEFAULT_REPORT_LIMIT: usize = 100;

// ============================================================================
// FORMAT + LIMIT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
    Xml,
}

impl ReportFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(ReportFormat::Csv),
            Some("json") => Ok(ReportFormat::Json),
            Some("xml") => Ok(ReportFormat::Xml),
            _ => Err(RegistryError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// A parsed row count for a top-N report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLimit {
    pub n: usize,
    /// Request exceeded the cap and was cut down to it
    pub clamped: bool,
}

/// Parse the `n` argument of a report command. Non-integers and negative
/// values are rejected; anything above `cap` is clamped.
pub fn parse_limit(raw: &str, cap: usize) -> Result<RowLimit> {
    let requested: i64 = raw.trim().parse().map_err(|_| RegistryError::InvalidLimit)?;
    if requested < 0 {
        return Err(RegistryError::InvalidLimit);
    }

    let requested = usize::try_from(requested).unwrap_or(usize::MAX);
    Ok(RowLimit {
        n: requested.min(cap),
        clamped: requested > cap,
    })
}

// ============================================================================
// REPORT COMMANDS
// ============================================================================

pub fn write_top_students(registry: &Registry, limit: RowLimit, path: &Path) -> Result<usize> {
    registry.require_loaded()?;
    let format = ReportFormat::from_path(path)?;

    let rows = ranking::top_students(registry, limit.n)?;
    let body = match format {
        ReportFormat::Csv => students_csv(&rows)?,
        ReportFormat::Json => to_json(&rows)?,
        ReportFormat::Xml => students_xml(&rows),
    };

    write_report(path, &body)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "top students report generated");
    Ok(rows.len())
}

pub fn write_top_courses(registry: &Registry, limit: RowLimit, path: &Path) -> Result<usize> {
    registry.require_loaded()?;
    let format = ReportFormat::from_path(path)?;

    let rows = ranking::top_courses(registry, limit.n)?;
    let body = match format {
        ReportFormat::Csv => courses_csv(&rows)?,
        ReportFormat::Json => to_json(&rows)?,
        ReportFormat::Xml => courses_xml(&rows),
    };

    write_report(path, &body)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "top courses report generated");
    Ok(rows.len())
}

/// Returns `false` (and writes nothing) when the student does not exist.
pub fn write_transcript(registry: &Registry, student_id: &str, path: &Path) -> Result<bool> {
    let transcript = match transcript::transcript(registry, student_id)? {
        Some(t) => t,
        None => return Ok(false),
    };

    let body = match ReportFormat::from_path(path)? {
        ReportFormat::Csv => transcript_csv(&transcript)?,
        ReportFormat::Json => to_json(&transcript)?,
        ReportFormat::Xml => transcript_xml(&transcript),
    };

    write_report(path, &body)?;
    tracing::info!(
        path = %path.display(),
        student_id,
        lines = transcript.line_count(),
        "transcript report generated"
    );
    Ok(true)
}

fn write_report(path: &Path, body: &str) -> Result<()> {
    fs::write(path, body)?;
    Ok(())
}

// ============================================================================
// CSV
// ============================================================================

fn csv_block<F>(fill: F) -> Result<String>
where
    F: FnOnce(&mut csv::Writer<Vec<u8>>) -> csv::Result<()>,
{
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    fill(&mut writer)?;

    let bytes = writer
        .into_inner()
        .map_err(|e| RegistryError::ReportIo(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn two_dp(x: f64) -> String {
    format!("{:.2}", x)
}

pub fn students_csv(rows: &[StudentRow]) -> Result<String> {
    csv_block(|w| {
        w.write_record(["id", "name", "surname", "level", "totalCredits", "gpa"])?;
        for r in rows {
            w.write_record([
                r.id.as_str(),
                &r.name,
                &r.surname,
                r.level.label(),
                &r.total_credits.to_string(),
                &two_dp(r.gpa),
            ])?;
        }
        Ok(())
    })
}

pub fn courses_csv(rows: &[CourseRow]) -> Result<String> {
    csv_block(|w| {
        w.write_record(["code", "title", "credits", "level", "gradeCount"])?;
        for r in rows {
            w.write_record([
                r.code.as_str(),
                &r.title,
                &r.credits.to_string(),
                r.level.label(),
                &r.grade_count.to_string(),
            ])?;
        }
        Ok(())
    })
}

/// Student header block, a blank line, then one row per transcript line.
pub fn transcript_csv(t: &Transcript) -> Result<String> {
    let mut out = csv_block(|w| {
        w.write_record(["studentId", "studentName", "studentSurname", "level"])?;
        w.write_record([
            t.student.id.as_str(),
            &t.student.name,
            &t.student.surname,
            t.student.level.label(),
        ])
    })?;
    out.push('\n');

    out.push_str(&csv_block(|w| {
        w.write_record([
            "semester",
            "courseCode",
            "courseTitle",
            "credits",
            "numericGrade",
            "letterGrade",
            "gradePoints",
        ])?;
        for semester in &t.semesters {
            let label = semester.semester.to_string();
            for line in &semester.lines {
                w.write_record([
                    label.as_str(),
                    &line.course_code,
                    &line.course_title,
                    &line.credits.to_string(),
                    &line.numeric_grade.to_string(),
                    line.letter_grade,
                    &two_dp(line.grade_points),
                ])?;
            }
        }
        Ok(())
    })?);

    Ok(out)
}

// ============================================================================
// JSON
// ============================================================================

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');
    Ok(body)
}

// ============================================================================
// XML
// ============================================================================

const XML_PROLOG: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn element(out: &mut String, indent: usize, tag: &str, value: &str) {
    out.push_str(&format!(
        "{}<{tag}>{}</{tag}>\n",
        "  ".repeat(indent),
        escape_xml(value),
        tag = tag
    ));
}

pub fn students_xml(rows: &[StudentRow]) -> String {
    let mut out = String::from(XML_PROLOG);
    out.push_str("<topStudents>\n");
    for r in rows {
        out.push_str("  <student>\n");
        element(&mut out, 2, "id", &r.id);
        element(&mut out, 2, "name", &r.name);
        element(&mut out, 2, "surname", &r.surname);
        element(&mut out, 2, "level", r.level.label());
        element(&mut out, 2, "totalCredits", &r.total_credits.to_string());
        element(&mut out, 2, "gpa", &two_dp(r.gpa));
        out.push_str("  </student>\n");
    }
    out.push_str("</topStudents>\n");
    out
}

pub fn courses_xml(rows: &[CourseRow]) -> String {
    let mut out = String::from(XML_PROLOG);
    out.push_str("<topCourses>\n");
    for r in rows {
        out.push_str("  <course>\n");
        element(&mut out, 2, "code", &r.code);
        element(&mut out, 2, "title", &r.title);
        element(&mut out, 2, "credits", &r.credits.to_string());
        element(&mut out, 2, "level", r.level.label());
        element(&mut out, 2, "gradeCount", &r.grade_count.to_string());
        out.push_str("  </course>\n");
    }
    out.push_str("</topCourses>\n");
    out
}

pub fn transcript_xml(t: &Transcript) -> String {
    let mut out = String::from(XML_PROLOG);
    out.push_str("<transcript>\n");

    out.push_str("  <student>\n");
    element(&mut out, 2, "id", &t.student.id);
    element(&mut out, 2, "name", &t.student.name);
    element(&mut out, 2, "surname", &t.student.surname);
    element(&mut out, 2, "level", t.student.level.label());
    out.push_str("  </student>\n");

    out.push_str("  <semesters>\n");
    for semester in &t.semesters {
        out.push_str(&format!(
            "    <semester name=\"{}\">\n",
            escape_xml(&semester.semester.to_string())
        ));
        for line in &semester.lines {
            out.push_str("      <record>\n");
            element(&mut out, 4, "courseCode", &line.course_code);
            element(&mut out, 4, "courseTitle", &line.course_title);
            element(&mut out, 4, "credits", &line.credits.to_string());
            element(&mut out, 4, "numericGrade", &line.numeric_grade.to_string());
            element(&mut out, 4, "letterGrade", line.letter_grade);
            element(&mut out, 4, "gradePoints", &two_dp(line.grade_points));
            out.push_str("      </record>\n");
        }
        out.push_str("    </semester>\n");
    }
    out.push_str("  </semesters>\n");

    out.push_str("</transcript>\n");
    out
}

// ============================================================================
// TESTS
// ============================================================================
