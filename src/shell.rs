// 💬 Interactive Shell - line protocol over the registry
//
// Commands:
//   load <folder>
//   find student <id> | find course <code> | find grade <id>, <code>
//   query <student|course|grade> [criteria]
//   add <student|course|grade> <comma-separated fields>
//   report topStudents|bestStudents|topCourses <n> <file>
//   report transcript <id> <file>
//   quit
//
// Every hard error is printed as `error: <message>` and the loop goes on.

use crate::display;
use crate::entities::{RawCourse, RawEvaluation, RawStudent};
use crate::errors::{RegistryError, Result};
use crate::query;
use crate::registry::{AddOutcome, LoadOutcome, Registry};
use crate::report::{self, DEFAULT_REPORT_LIMIT};
use crate::storage;
use std::io::{self, BufRead, Write};
use std::path::Path;

pub const PROMPT: &str = "? ";
pub const FAREWELL: &str = "The program is terminated.";

/// Field separator for `add` values and the `find grade` key
const FIELD_SEPARATOR: &str = ", ";

pub struct Shell {
    registry: Registry,
    report_limit: usize,
    finished: bool,
}

impl Shell {
    pub fn new(report_limit: usize) -> Self {
        Shell {
            registry: Registry::new(),
            report_limit,
            finished: false,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// True once `quit` has been executed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Run one command line and return what should be printed.
    /// Blank lines produce no output.
    pub fn execute(&mut self, line: &str) -> String {
        let line = line.trim();
        if line.is_empty() {
            return String::new();
        }

        let (command, rest) = split_head(line);
        match self.dispatch(command, rest) {
            Ok(out) => out,
            Err(e) => {
                tracing::debug!(command, error = %e, "command failed");
                format!("error: {}\n", e)
            }
        }
    }

    fn dispatch(&mut self, command: &str, rest: &str) -> Result<String> {
        match command {
            "load" => self.load(rest),
            "find" => self.find(rest),
            "query" => self.query(rest),
            "add" => self.add(rest),
            "report" => self.report(rest),
            "quit" => {
                self.finished = true;
                Ok(format!("{}\n", FAREWELL))
            }
            _ => Ok(line("error: unknown command")),
        }
    }

    // ========================================================================
    // COMMANDS
    // ========================================================================

    fn load(&mut self, folder: &str) -> Result<String> {
        if folder.is_empty() {
            return Ok(line("error: invalid folder name"));
        }

        Ok(match storage::load_folder(&mut self.registry, Path::new(folder))? {
            LoadOutcome::Loaded(counts) => format!(
                "loaded {} students, {} courses, and {} grades\n",
                counts.students, counts.courses, counts.evaluations
            ),
            LoadOutcome::Rejected(conflict) => format!("error: {}\n", conflict),
        })
    }

    fn find(&self, rest: &str) -> Result<String> {
        if rest.is_empty() {
            return Ok(line("error: missing entity"));
        }
        let (entity, key) = split_head(rest);

        match entity {
            "student" if key.is_empty() => Ok(line("error: missing student ID")),
            "student" => display::find_student(&self.registry, key),
            "course" if key.is_empty() => Ok(line("error: missing course code")),
            "course" => display::find_course(&self.registry, key),
            "grade" if key.is_empty() => Ok(line("error: missing grade key")),
            "grade" => match key.split(FIELD_SEPARATOR).collect::<Vec<_>>().as_slice() {
                [student_id, course_code] => {
                    display::find_grade(&self.registry, student_id.trim(), course_code.trim())
                }
                _ => Ok(line("error: invalid grade key")),
            },
            _ => Ok(line("error: no such entity")),
        }
    }

    fn query(&self, rest: &str) -> Result<String> {
        if rest.is_empty() {
            return Ok(line("error: missing entity"));
        }
        let (entity, criteria) = split_head(rest);

        let rows = query::run_query(&self.registry, entity, criteria)?;
        Ok(display::query_result(&rows))
    }

    fn add(&mut self, rest: &str) -> Result<String> {
        if rest.is_empty() {
            return Ok(line("error: missing entity"));
        }
        let (entity, values) = split_head(rest);

        let outcome = match entity {
            "student" => {
                self.registry.require_loaded()?;
                let f = fields(values, 5, "student")?;
                self.registry.insert_student(&RawStudent {
                    id: f[0].to_string(),
                    name: f[1].to_string(),
                    surname: f[2].to_string(),
                    email: f[3].to_string(),
                    level: f[4].to_string(),
                })?
            }
            "course" => {
                self.registry.require_loaded()?;
                let f = fields(values, 3, "course")?;
                self.registry.insert_course(&RawCourse {
                    code: f[0].to_string(),
                    title: f[1].to_string(),
                    credits: f[2].to_string(),
                })?
            }
            "grade" => {
                self.registry.require_loaded()?;
                let f = fields(values, 4, "grade")?;
                self.registry.insert_evaluation(&RawEvaluation {
                    student_id: f[0].to_string(),
                    course_code: f[1].to_string(),
                    semester: f[2].to_string(),
                    grade: f[3].to_string(),
                })?
            }
            _ => return Ok(line("error: no such entity")),
        };

        Ok(match outcome {
            AddOutcome::Added => line("1 record added"),
            AddOutcome::Rejected(conflict) => format!("error: {}\n", conflict),
        })
    }

    fn report(&self, rest: &str) -> Result<String> {
        if rest.is_empty() {
            return Ok(line("error: missing report type"));
        }
        let parts: Vec<&str> = rest.split_whitespace().collect();

        let kind = parts[0];
        if !matches!(kind, "topStudents" | "bestStudents" | "topCourses" | "transcript") {
            return Ok(line("error: unknown report type"));
        }
        if parts.len() < 3 {
            return Ok(line("error: missing parameters"));
        }
        let path = Path::new(parts[2]);

        if kind == "transcript" {
            return Ok(if report::write_transcript(&self.registry, parts[1], path)? {
                line("Report generated.")
            } else {
                line("error: no student found for given id")
            });
        }

        let limit = report::parse_limit(parts[1], self.report_limit)?;
        if kind == "topCourses" {
            report::write_top_courses(&self.registry, limit, path)?;
        } else {
            report::write_top_students(&self.registry, limit, path)?;
        }

        Ok(if limit.clamped {
            format!("Parameter limited at {}. Report generated.\n", self.report_limit)
        } else {
            line("Report generated.")
        })
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_LIMIT)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn line(text: &str) -> String {
    format!("{}\n", text)
}

/// First whitespace-delimited word and the trimmed remainder.
fn split_head(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (s, ""),
    }
}

/// Split `add` values on ", " and check the count. Fields come back trimmed.
fn fields<'a>(values: &'a str, expected: usize, entity: &'static str) -> Result<Vec<&'a str>> {
    let parts: Vec<&str> = values.split(FIELD_SEPARATOR).map(str::trim).collect();
    if parts.len() != expected {
        return Err(RegistryError::FieldCount(entity));
    }
    Ok(parts)
}

/// Prompt, read, execute, print; until `quit` or end of input.
pub fn run<R: BufRead, W: Write>(shell: &mut Shell, input: R, output: &mut W) -> io::Result<()> {
    let mut lines = input.lines();

    while !shell.is_finished() {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };

        output.write_all(shell.execute(&line).as_bytes())?;
    }

    output.flush()
}

// ============================================================================
// TESTS
// ============================================================================
