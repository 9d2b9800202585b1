// 🗄️ Flat-file storage - folder loader + append-only record sinks
//
// A data folder holds three comma-separated files:
//   students.txt  id, name, surname, email, level
//   courses.txt   code, title, credits
//   grades.txt    studentId, courseCode, semester, grade
//
// Loading reads all three into raw records; the registry validates them.
// After load, every successful add appends exactly one line to the matching
// file through a `RecordSink`.

use crate::entities::{Course, Evaluation, RawCourse, RawEvaluation, RawStudent, Student};
use crate::errors::{Conflict, RegistryError, Result};
use crate::registry::{LoadOutcome, Registry};
use csv::StringRecord;
use serde::de::DeserializeOwned;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

pub const STUDENTS_FILE: &str = "students.txt";
pub const COURSES_FILE: &str = "courses.txt";
pub const GRADES_FILE: &str = "grades.txt";

// ============================================================================
// RECORD SINK (append-only persistence handle)
// ============================================================================

pub trait RecordSink: Send + Sync {
    fn append_student(&mut self, student: &Student) -> Result<()>;
    fn append_course(&mut self, course: &Course) -> Result<()>;
    fn append_evaluation(&mut self, evaluation: &Evaluation) -> Result<()>;
}

/// Appends to the three data files of a folder, in the load format.
#[derive(Debug, Clone)]
pub struct FlatFileSink {
    folder: PathBuf,
}

impl FlatFileSink {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        FlatFileSink {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn append_line(&self, file_name: &str, fields: &[&str]) -> Result<()> {
        let path = self.folder.join(file_name);
        let to_err = |source| RegistryError::Append {
            file: file_name.to_string(),
            source,
        };

        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&path)
            .map_err(to_err)?;

        // Hand-edited files may lack a trailing newline
        let separator = if ends_without_newline(&mut file).map_err(to_err)? {
            "\n"
        } else {
            ""
        };

        writeln!(file, "{}{}", separator, fields.join(", ")).map_err(to_err)?;
        tracing::debug!(file = file_name, "appended record");
        Ok(())
    }
}

fn ends_without_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl RecordSink for FlatFileSink {
    fn append_student(&mut self, student: &Student) -> Result<()> {
        let raw = student.to_raw();
        self.append_line(
            STUDENTS_FILE,
            &[&raw.id, &raw.name, &raw.surname, &raw.email, &raw.level],
        )
    }

    fn append_course(&mut self, course: &Course) -> Result<()> {
        let raw = course.to_raw();
        self.append_line(COURSES_FILE, &[&raw.code, &raw.title, &raw.credits])
    }

    fn append_evaluation(&mut self, evaluation: &Evaluation) -> Result<()> {
        let raw = evaluation.to_raw();
        self.append_line(
            GRADES_FILE,
            &[&raw.student_id, &raw.course_code, &raw.semester, &raw.grade],
        )
    }
}

/// In-memory sink: records every append, optionally failing on demand.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub students: Vec<RawStudent>,
    pub courses: Vec<RawCourse>,
    pub evaluations: Vec<RawEvaluation>,
    pub fail_appends: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every append fails with an I/O error
    pub fn failing() -> Self {
        MemorySink {
            fail_appends: true,
            ..Self::default()
        }
    }

    pub fn appended(&self) -> usize {
        self.students.len() + self.courses.len() + self.evaluations.len()
    }

    fn check(&self, file: &str) -> Result<()> {
        if self.fail_appends {
            return Err(RegistryError::Append {
                file: file.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "sink closed"),
            });
        }
        Ok(())
    }
}

impl RecordSink for MemorySink {
    fn append_student(&mut self, student: &Student) -> Result<()> {
        self.check(STUDENTS_FILE)?;
        self.students.push(student.to_raw());
        Ok(())
    }

    fn append_course(&mut self, course: &Course) -> Result<()> {
        self.check(COURSES_FILE)?;
        self.courses.push(course.to_raw());
        Ok(())
    }

    fn append_evaluation(&mut self, evaluation: &Evaluation) -> Result<()> {
        self.check(GRADES_FILE)?;
        self.evaluations.push(evaluation.to_raw());
        Ok(())
    }
}

// ============================================================================
// FOLDER LOADER
// ============================================================================

/// Raw contents of a data folder
#[derive(Debug, Clone, Default)]
pub struct DataFiles {
    pub folder: PathBuf,
    pub students: Vec<RawStudent>,
    pub courses: Vec<RawCourse>,
    pub evaluations: Vec<RawEvaluation>,
}

#[derive(Debug)]
pub enum FolderRead {
    Found(DataFiles),
    Rejected(Conflict),
}

/// Read the three data files of `folder`.
///
/// A missing folder or missing file is a recoverable `Conflict`; a line with
/// the wrong number of fields is a hard `MalformedLine` error.
pub fn read_folder(folder: &Path) -> Result<FolderRead> {
    if !folder.is_dir() {
        return Ok(FolderRead::Rejected(Conflict::InvalidFolder(folder.to_path_buf())));
    }

    let paths = [STUDENTS_FILE, COURSES_FILE, GRADES_FILE].map(|f| folder.join(f));
    if paths.iter().any(|p| !p.is_file()) {
        return Ok(FolderRead::Rejected(Conflict::FilesNotFound(folder.to_path_buf())));
    }

    Ok(FolderRead::Found(DataFiles {
        folder: folder.to_path_buf(),
        students: read_records(&paths[0], STUDENTS_FILE, 5)?,
        courses: read_records(&paths[1], COURSES_FILE, 3)?,
        evaluations: read_records(&paths[2], GRADES_FILE, 4)?,
    }))
}

fn read_records<T: DeserializeOwned>(path: &Path, file: &str, arity: usize) -> Result<Vec<T>> {
    let read_err = |source| RegistryError::Read {
        file: file.to_string(),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(read_err)?;

    let mut records = Vec::new();
    let mut record = StringRecord::new();

    while rdr.read_record(&mut record).map_err(read_err)? {
        // Whitespace-only lines trim down to a single empty field
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        if record.len() != arity {
            return Err(RegistryError::MalformedLine {
                file: file.to_string(),
                line: record.position().map(|p| p.line()).unwrap_or(0),
            });
        }
        records.push(record.deserialize(None).map_err(read_err)?);
    }

    Ok(records)
}

/// `load <folder>`: read the folder and bulk-load it with a flat-file sink.
pub fn load_folder(registry: &mut Registry, folder: &Path) -> Result<LoadOutcome> {
    if registry.is_loaded() {
        return Ok(LoadOutcome::Rejected(Conflict::AlreadyLoaded));
    }

    match read_folder(folder)? {
        FolderRead::Rejected(conflict) => {
            tracing::warn!(folder = %folder.display(), %conflict, "load rejected");
            Ok(LoadOutcome::Rejected(conflict))
        }
        FolderRead::Found(files) => registry.bulk_load(
            files.students,
            files.courses,
            files.evaluations,
            Box::new(FlatFileSink::new(files.folder)),
        ),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_folder(dir: &Path, students: &str, courses: &str, grades: &str) {
        fs::write(dir.join(STUDENTS_FILE), students).unwrap();
        fs::write(dir.join(COURSES_FILE), courses).unwrap();
        fs::write(dir.join(GRADES_FILE), grades).unwrap();
    }

    #[test]
    fn test_read_folder_parses_records() {
        let dir = tempfile::tempdir().unwrap();
        write_folder(
            dir.path(),
            "1, Anna, Berg, anna@uni.edu, UG\n\n2, Bo, Ek, , G\n",
            "CS101, Intro to CS, 3\n",
            "1, CS101, Fall2023, 91\n",
        );

        let files = match read_folder(dir.path()).unwrap() {
            FolderRead::Found(files) => files,
            other => panic!("unexpected {:?}", other),
        };

        assert_eq!(files.students.len(), 2);
        assert_eq!(files.students[1].email, "");
        assert_eq!(files.students[1].level, "G");
        assert_eq!(files.courses[0].title, "Intro to CS");
        assert_eq!(files.evaluations[0].grade, "91");
    }

    #[test]
    fn test_read_folder_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STUDENTS_FILE), "").unwrap();
        fs::write(dir.path().join(COURSES_FILE), "").unwrap();

        match read_folder(dir.path()).unwrap() {
            FolderRead::Rejected(Conflict::FilesNotFound(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_read_folder_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        match read_folder(&missing).unwrap() {
            FolderRead::Rejected(Conflict::InvalidFolder(p)) => assert_eq!(p, missing),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_malformed_line_reports_position() {
        let dir = tempfile::tempdir().unwrap();
        write_folder(dir.path(), "1, Anna, Berg, , UG\n2, Bo\n", "", "");

        let err = read_folder(dir.path()).unwrap_err();
        assert_eq!(err.to_string(), "students.txt invalid line 2");
    }

    #[test]
    fn test_flat_file_sink_appends_in_load_format() {
        let dir = tempfile::tempdir().unwrap();
        // No trailing newline on the existing content
        write_folder(dir.path(), "1, Anna, Berg, , UG", "", "");

        let mut sink = FlatFileSink::new(dir.path());
        let student = Student::from_raw(&RawStudent {
            id: "2".to_string(),
            name: "Bo".to_string(),
            surname: "Ek".to_string(),
            email: String::new(),
            level: "G".to_string(),
        })
        .unwrap();
        sink.append_student(&student).unwrap();

        let content = fs::read_to_string(dir.path().join(STUDENTS_FILE)).unwrap();
        assert_eq!(content, "1, Anna, Berg, , UG\n2, Bo, Ek, , G\n");

        // Appended lines load back
        match read_folder(dir.path()).unwrap() {
            FolderRead::Found(files) => assert_eq!(files.students.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_memory_sink_failure_mode() {
        let mut sink = MemorySink::failing();
        let course = Course::new("CS101", "Intro", 3).unwrap();

        assert!(sink.append_course(&course).is_err());
        assert_eq!(sink.appended(), 0);
    }
}
