//! Shell integration tests
//!
//! Drive the interactive shell end to end against a temporary data folder:
//! load, lookups, queries, adds (with persistence), and reports.

use grade_registry::Shell;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::TempDir;

const STUDENTS: &str = "\
1, Anna, Berg, anna@uni.edu, UG
2, Joanna, Lind, , G
3, Bo, Ek, bo@uni.edu, UG
";

const COURSES: &str = "\
CS101, Intro to Programming, 3
CS501, Advanced Compilers, 4
MATH201, Linear Algebra, 2
";

const GRADES: &str = "\
1, CS101, Fall2020, 96
1, MATH201, Spring2021, 85
2, CS501, Spring2020, 88
";

fn setup_data_folder() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("students.txt"), STUDENTS).unwrap();
    fs::write(dir.path().join("courses.txt"), COURSES).unwrap();
    fs::write(dir.path().join("grades.txt"), GRADES).unwrap();
    dir
}

fn loaded_shell(dir: &Path) -> Shell {
    let mut shell = Shell::default();
    let out = shell.execute(&format!("load {}", dir.display()));
    assert_eq!(out, "loaded 3 students, 3 courses, and 3 grades\n");
    shell
}

#[test]
fn test_load_once_only() {
    let dir = setup_data_folder();
    let mut shell = loaded_shell(dir.path());

    let again = shell.execute(&format!("load {}", dir.path().display()));
    assert_eq!(again, "error: data already loaded, cannot load again!\n");
}

#[test]
fn test_load_missing_files_keeps_shell_unloaded() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("students.txt"), STUDENTS).unwrap();

    let mut shell = Shell::default();
    let out = shell.execute(&format!("load {}", dir.path().display()));

    assert_eq!(out, "error: data files not found\n");
    assert!(!shell.registry().is_loaded());
    assert_eq!(
        shell.execute("load /definitely/not/here"),
        "error: invalid folder name\n"
    );
}

#[test]
fn test_load_rejects_bad_data_line() {
    let dir = setup_data_folder();
    fs::write(dir.path().join("courses.txt"), "CS101, Intro, 3\nCS102, Broken\n").unwrap();

    let mut shell = Shell::default();
    let out = shell.execute(&format!("load {}", dir.path().display()));

    assert_eq!(out, "error: courses.txt invalid line 2\n");
    assert!(!shell.registry().is_loaded());
}

#[test]
fn test_find_commands() {
    let dir = setup_data_folder();
    let mut shell = loaded_shell(dir.path());

    let student = shell.execute("find student 1");
    assert!(student.contains("email: anna@uni.edu\n"));
    assert!(student.contains("gpa: 3.60\n"));

    let course = shell.execute("find course MATH201");
    assert!(course.contains("title: Linear Algebra\n"));
    assert!(course.contains("level: undergraduate\n"));

    let grade = shell.execute("find grade 1, CS101");
    assert!(grade.starts_with("student: (1 - Anna Berg)\n"));
    assert!(grade.contains("course: (CS101 - Intro to Programming, 3 cr.)\n"));
    assert!(grade.ends_with("lettergrade: A\n"));

    assert_eq!(shell.execute("find grade 1 CS101"), "error: invalid grade key\n");
}

#[test]
fn test_query_commands() {
    let dir = setup_data_folder();
    let mut shell = loaded_shell(dir.path());

    assert_eq!(
        shell.execute("query student level=G"),
        "1 records found\n2, Joanna, Lind, , G\n"
    );
    assert_eq!(
        shell.execute("query student name~Ann"),
        "1 records found\n1, Anna, Berg, anna@uni.edu, UG\n"
    );
    assert!(shell.execute("query grade").starts_with("3 records found\n"));
    assert_eq!(
        shell.execute("query course credits=4, title~Comp"),
        "1 records found\nCS501, Advanced Compilers, 4\n"
    );

    assert_eq!(
        shell.execute("query student height=2"),
        "error: invalid field for student: height\n"
    );
    assert_eq!(
        shell.execute("query student name=A~B"),
        "error: invalid criteria: name=A~B\n"
    );
    assert_eq!(shell.execute("query professor"), "error: no such entity\n");
}

#[test]
fn test_add_persists_to_data_files() {
    let dir = setup_data_folder();
    let mut shell = loaded_shell(dir.path());

    assert_eq!(
        shell.execute("add student 4, Cai, Wu, , G"),
        "1 record added\n"
    );
    assert_eq!(
        shell.execute("add course CS502, Type Systems, 3"),
        "1 record added\n"
    );
    assert_eq!(
        shell.execute("add grade 4, CS502, Fall2021, 91"),
        "1 record added\n"
    );

    let students = fs::read_to_string(dir.path().join("students.txt")).unwrap();
    assert!(students.ends_with("4, Cai, Wu, , G\n"));
    let grades = fs::read_to_string(dir.path().join("grades.txt")).unwrap();
    assert!(grades.ends_with("4, CS502, Fall2021, 91\n"));

    // A fresh shell sees the appended records
    let reloaded = loaded_shell_with_counts(dir.path(), "loaded 4 students, 4 courses, and 4 grades\n");
    assert!(reloaded.registry().lookup_student("4").unwrap().is_some());
}

fn loaded_shell_with_counts(dir: &Path, expected: &str) -> Shell {
    let mut shell = Shell::default();
    assert_eq!(shell.execute(&format!("load {}", dir.display())), expected);
    shell
}

#[test]
fn test_added_records_reload_and_query() {
    let dir = setup_data_folder();
    let mut shell = loaded_shell(dir.path());
    let courses_before = fs::read_to_string(dir.path().join("courses.txt")).unwrap();

    // A bare comma inside a field would split the line on reload
    assert_eq!(
        shell.execute("add course CS102, C,C++ Basics, 3"),
        "error: invalid title: commas are not allowed\n"
    );
    assert_eq!(
        shell.execute("add student 4, Cai, Wu,Lind, , G"),
        "error: invalid surname: commas are not allowed\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("courses.txt")).unwrap(),
        courses_before
    );

    assert_eq!(
        shell.execute("add course CS102, C++ Basics (Part 1), 3"),
        "1 record added\n"
    );
    assert_eq!(
        shell.execute("add grade 3, CS102, Fall2021, 79"),
        "1 record added\n"
    );

    let mut reloaded =
        loaded_shell_with_counts(dir.path(), "loaded 3 students, 4 courses, and 4 grades\n");
    assert_eq!(
        reloaded.execute("query course title~C++"),
        "1 records found\nCS102, C++ Basics (Part 1), 3\n"
    );
    assert_eq!(
        reloaded.execute("query grade courseCode=CS102"),
        "1 records found\n3, CS102, Fall2021, 79\n"
    );
}

#[test]
fn test_add_conflicts_and_hard_errors() {
    let dir = setup_data_folder();
    let mut shell = loaded_shell(dir.path());
    let before = fs::read_to_string(dir.path().join("grades.txt")).unwrap();

    assert_eq!(
        shell.execute("add student 1, Dup, Dup, , UG"),
        "error: student with id 1 is already present\n"
    );
    assert_eq!(
        shell.execute("add grade 2, CS101, Fall2021, 90"),
        "error: graduate student may not take undergraduate course\n"
    );
    assert_eq!(
        shell.execute("add grade 1, CS101, Fall2021, 50"),
        "error: grade for (1, CS101) is already present\n"
    );
    assert_eq!(
        shell.execute("add grade 9, CS101, Fall2021, 50"),
        "error: no student found\n"
    );
    assert_eq!(
        shell.execute("add grade 1, CS501, Winter2021, 50"),
        "error: invalid semester\n"
    );
    assert_eq!(
        shell.execute("add course CS102, Intro"),
        "error: invalid number of fields for course\n"
    );
    assert_eq!(
        shell.execute("add student 5, Eve, Ek, eve@, UG"),
        "error: invalid email\n"
    );

    // Nothing was appended
    let after = fs::read_to_string(dir.path().join("grades.txt")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_report_commands() {
    let dir = setup_data_folder();
    let out_dir = TempDir::new().unwrap();
    let mut shell = loaded_shell(dir.path());

    let csv = out_dir.path().join("top.csv");
    assert_eq!(
        shell.execute(&format!("report topStudents 2 {}", csv.display())),
        "Report generated.\n"
    );
    let content = fs::read_to_string(&csv).unwrap();
    assert_eq!(
        content,
        "id,name,surname,level,totalCredits,gpa\n\
         1,Anna,Berg,undergraduate,5,3.60\n\
         2,Joanna,Lind,graduate,4,3.33\n"
    );

    let xml = out_dir.path().join("courses.xml");
    assert_eq!(
        shell.execute(&format!("report topCourses 500 {}", xml.display())),
        "Parameter limited at 100. Report generated.\n"
    );
    assert!(fs::read_to_string(&xml).unwrap().contains("<code>CS101</code>"));

    let json = out_dir.path().join("transcript.json");
    assert_eq!(
        shell.execute(&format!("report transcript 1 {}", json.display())),
        "Report generated.\n"
    );
    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(parsed["semesters"][0]["semester"], "Fall2020");
    assert_eq!(parsed["semesters"][1]["records"][0]["courseCode"], "MATH201");

    assert_eq!(
        shell.execute(&format!("report transcript 99 {}", json.display())),
        "error: no student found for given id\n"
    );
    assert_eq!(
        shell.execute("report bestStudents -1 x.csv"),
        "error: invalid n\n"
    );
    assert_eq!(
        shell.execute(&format!(
            "report topStudents 3 {}",
            out_dir.path().join("top.pdf").display()
        )),
        "error: unsupported report format\n"
    );
}

#[test]
fn test_binary_session_over_stdin() {
    let dir = setup_data_folder();
    let work_dir = TempDir::new().unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_grade-registry"))
        .current_dir(work_dir.path())
        .env_remove("REGISTRY_DATA_DIR")
        .env_remove("REGISTRY_REPORT_LIMIT")
        .env_remove("REGISTRY_LOG_FORMAT")
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to start shell binary");

    {
        let stdin = child.stdin.as_mut().unwrap();
        writeln!(stdin, "load {}", dir.path().display()).unwrap();
        writeln!(stdin, "find course CS501").unwrap();
        writeln!(stdin, "dance").unwrap();
        writeln!(stdin, "quit").unwrap();
    }

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("? loaded 3 students, 3 courses, and 3 grades\n"));
    assert!(stdout.contains("level: graduate\n"));
    assert!(stdout.contains("? error: unknown command\n"));
    assert!(stdout.ends_with("? The program is terminated.\n"));
}

#[test]
fn test_binary_autoloads_data_flag() {
    let dir = setup_data_folder();
    let work_dir = TempDir::new().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_grade-registry"))
        .current_dir(work_dir.path())
        .arg("--data")
        .arg(dir.path())
        .env("RUST_LOG", "off")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .expect("Failed to run shell binary");

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("loaded 3 students, 3 courses, and 3 grades\n"));
}
