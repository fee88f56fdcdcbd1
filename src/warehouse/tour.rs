use std::io::Write;

use serde_json::{Value, json};
use tracing::info;

use crate::warehouse::{
    client::{Warehouse, WarehouseError},
    table::RowSet,
};

pub const DATABASE: &str = "university_demo";

const CREATE_STUDENTS: &str = "
CREATE TABLE IF NOT EXISTS university_demo.students (
    student_id UUID DEFAULT generateUUIDv4(),
    name String,
    age UInt8,
    country String
) ENGINE = MergeTree()
ORDER BY (name)";

const CREATE_COURSES: &str = "
CREATE TABLE IF NOT EXISTS university_demo.courses (
    course_id UUID DEFAULT generateUUIDv4(),
    title String,
    department String
) ENGINE = MergeTree()
ORDER BY (department, title)";

const CREATE_ENROLLMENTS: &str = "
CREATE TABLE IF NOT EXISTS university_demo.enrollments (
    enroll_id UUID DEFAULT generateUUIDv4(),
    student_id UUID,
    course_id UUID,
    grade Float32
) ENGINE = MergeTree()
ORDER BY (student_id, course_id)";

const JOIN_QUERY: &str = "
SELECT s.name, s.country, c.title, e.grade
FROM university_demo.enrollments e
JOIN university_demo.students s ON e.student_id = s.student_id
JOIN university_demo.courses c ON e.course_id = c.course_id
ORDER BY s.name";

const AVERAGE_BY_COUNTRY_QUERY: &str = "
SELECT s.country, avg(e.grade) AS avg_grade
FROM university_demo.enrollments e
JOIN university_demo.students s ON e.student_id = s.student_id
GROUP BY s.country
ORDER BY avg_grade DESC";

const STUDENTS: [(&str, u8, &str); 4] = [
    ("Alice", 22, "UK"),
    ("Bob", 24, "USA"),
    ("Carlos", 23, "Spain"),
    ("Diana", 21, "Germany"),
];

const COURSES: [(&str, &str); 4] = [
    ("Databases", "Computer Science"),
    ("Machine Learning", "Computer Science"),
    ("Econometrics", "Economics"),
    ("Marketing", "Business"),
];

/// (student row, course row, grade) against the rows read back after insert.
const ENROLLMENTS: [(usize, usize, f64); 4] = [
    (0, 0, 95.0),
    (1, 1, 88.0),
    (2, 0, 92.5),
    (3, 2, 76.5),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct TourOptions {
    pub cleanup: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TourReport {
    pub steps: usize,
    pub version: Option<String>,
    pub enrollments: usize,
    pub joined_rows: usize,
    pub country_averages: usize,
}

/// Runs the walkthrough top to bottom, printing each step to `out`.
///
/// Stops at the first failing statement; earlier steps are not rolled back.
pub async fn run_tour<W, O>(
    warehouse: &W,
    out: &mut O,
    options: TourOptions,
) -> Result<TourReport, WarehouseError>
where
    W: Warehouse + ?Sized,
    O: Write,
{
    let mut report = TourReport::default();

    heading(out, "1. Connect")?;
    let version = warehouse.query("SELECT version()").await?;
    report.version = version
        .rows
        .first()
        .and_then(|row| row.first())
        .and_then(Value::as_str)
        .map(str::to_string);
    writeln!(out, "Connected to the server.")?;
    version.render(out)?;
    report.steps += 1;

    heading(out, "2. Create database")?;
    warehouse
        .command(&format!("CREATE DATABASE IF NOT EXISTS {DATABASE}"))
        .await?;
    writeln!(out, "Database '{DATABASE}' created.")?;
    report.steps += 1;

    heading(out, "3. Create tables")?;
    for ddl in [CREATE_STUDENTS, CREATE_COURSES, CREATE_ENROLLMENTS] {
        warehouse.command(ddl).await?;
    }
    writeln!(out, "Created tables: students, courses, enrollments.")?;
    report.steps += 1;

    heading(out, "4. Insert data")?;
    report.enrollments = insert_sample_data(warehouse, out).await?;
    report.steps += 1;

    heading(out, "5. Queries")?;
    writeln!(out, "All students:")?;
    warehouse
        .query(&format!("SELECT name, age, country FROM {DATABASE}.students"))
        .await?
        .render(out)?;

    writeln!(out, "\nStudents joined with enrollments and courses:")?;
    let joined = warehouse.query(JOIN_QUERY).await?;
    joined.render(out)?;
    report.joined_rows = joined.row_count();

    writeln!(out, "\nAverage grade by country:")?;
    let averages = warehouse.query(AVERAGE_BY_COUNTRY_QUERY).await?;
    averages.render(out)?;
    report.country_averages = averages.row_count();
    report.steps += 1;

    heading(out, "6. UUID generation")?;
    warehouse
        .query("SELECT generateUUIDv4() AS new_uuid")
        .await?
        .render(out)?;
    report.steps += 1;

    if options.cleanup {
        heading(out, "7. Clean up")?;
        warehouse
            .command(&format!("DROP DATABASE IF EXISTS {DATABASE}"))
            .await?;
        writeln!(out, "Dropped database '{DATABASE}'.")?;
        report.steps += 1;
    }

    info!(steps = report.steps, "warehouse tour finished");
    Ok(report)
}

async fn insert_sample_data<W, O>(warehouse: &W, out: &mut O) -> Result<usize, WarehouseError>
where
    W: Warehouse + ?Sized,
    O: Write,
{
    let students = STUDENTS
        .iter()
        .map(|(name, age, country)| vec![json!(name), json!(age), json!(country)])
        .collect::<Vec<_>>();
    warehouse
        .insert(
            &format!("{DATABASE}.students"),
            &["name", "age", "country"],
            &students,
        )
        .await?;
    writeln!(out, "Inserted {} students.", students.len())?;

    let courses = COURSES
        .iter()
        .map(|(title, department)| vec![json!(title), json!(department)])
        .collect::<Vec<_>>();
    warehouse
        .insert(
            &format!("{DATABASE}.courses"),
            &["title", "department"],
            &courses,
        )
        .await?;
    writeln!(out, "Inserted {} courses.", courses.len())?;

    // Read back in sort-key order to pick up the generated UUIDs.
    let stored_students = warehouse
        .query(&format!("SELECT * FROM {DATABASE}.students ORDER BY name"))
        .await?;
    let stored_courses = warehouse
        .query(&format!(
            "SELECT * FROM {DATABASE}.courses ORDER BY department, title"
        ))
        .await?;

    writeln!(out, "\nStudents table:")?;
    stored_students.render(out)?;
    writeln!(out, "\nCourses table:")?;
    stored_courses.render(out)?;

    ensure_rows(&stored_students, "students", required_rows(|(student, _)| student))?;
    ensure_rows(&stored_courses, "courses", required_rows(|(_, course)| course))?;

    let enrollments = ENROLLMENTS
        .iter()
        .map(|&(student, course, grade)| -> Result<Vec<Value>, WarehouseError> {
            Ok(vec![
                id_at(&stored_students, student, "student_id", "students")?,
                id_at(&stored_courses, course, "course_id", "courses")?,
                json!(grade),
            ])
        })
        .collect::<Result<Vec<_>, _>>()?;

    warehouse
        .insert(
            &format!("{DATABASE}.enrollments"),
            &["student_id", "course_id", "grade"],
            &enrollments,
        )
        .await?;
    writeln!(out, "Inserted {} enrollments.", enrollments.len())?;

    Ok(enrollments.len())
}

fn required_rows(pick: impl Fn((usize, usize)) -> usize) -> usize {
    ENROLLMENTS
        .iter()
        .map(|&(student, course, _)| pick((student, course)) + 1)
        .max()
        .unwrap_or_default()
}

fn ensure_rows(
    rows: &RowSet,
    table: &'static str,
    expected: usize,
) -> Result<(), WarehouseError> {
    if rows.row_count() < expected {
        return Err(WarehouseError::MissingRows {
            table,
            expected,
            actual: rows.row_count(),
        });
    }
    Ok(())
}

fn id_at(
    rows: &RowSet,
    row: usize,
    column: &'static str,
    table: &'static str,
) -> Result<Value, WarehouseError> {
    rows.value(row, column)
        .cloned()
        .ok_or(WarehouseError::MissingColumn { table, column })
}

fn heading<O: Write>(out: &mut O, title: &str) -> Result<(), WarehouseError> {
    writeln!(out, "\n=== {title} ===")?;
    Ok(())
}
