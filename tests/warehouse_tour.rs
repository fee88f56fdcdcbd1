use std::sync::Mutex;

use async_trait::async_trait;
use classroom_kit::warehouse::{RowSet, TourOptions, Warehouse, WarehouseError, run_tour};
use serde_json::{Value, json};

/// Records every statement and answers queries from canned row sets.
#[derive(Default)]
struct ScriptedWarehouse {
    statements: Mutex<Vec<String>>,
    inserts: Mutex<Vec<(String, Vec<String>, Vec<Vec<Value>>)>>,
    students: usize,
}

impl ScriptedWarehouse {
    fn with_students(students: usize) -> Self {
        Self {
            students,
            ..Self::default()
        }
    }

    fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    fn canned(&self, sql: &str) -> RowSet {
        if sql.contains("version()") {
            return RowSet::new(vec!["version()".into()], vec![vec![json!("24.8.4.13")]]);
        }
        if sql.contains("SELECT * FROM university_demo.students") {
            let rows = (0..self.students)
                .map(|i| vec![json!(format!("s-{i}")), json!(format!("student {i}"))])
                .collect();
            return RowSet::new(vec!["student_id".into(), "name".into()], rows);
        }
        if sql.contains("SELECT * FROM university_demo.courses") {
            let rows = (0..4)
                .map(|i| vec![json!(format!("c-{i}")), json!(format!("course {i}"))])
                .collect();
            return RowSet::new(vec!["course_id".into(), "title".into()], rows);
        }
        if sql.contains("avg(e.grade)") {
            return RowSet::new(
                vec!["country".into(), "avg_grade".into()],
                vec![vec![json!("UK"), json!(95.0)], vec![json!("USA"), json!(88.0)]],
            );
        }
        if sql.contains("JOIN") {
            return RowSet::new(
                vec!["name".into(), "grade".into()],
                vec![vec![json!("Alice"), json!(95.0)]; 4],
            );
        }
        RowSet::new(vec!["new_uuid".into()], vec![vec![json!("0b6c")]])
    }
}

#[async_trait]
impl Warehouse for ScriptedWarehouse {
    async fn command(&self, sql: &str) -> Result<(), WarehouseError> {
        self.statements.lock().unwrap().push(sql.trim().to_string());
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<RowSet, WarehouseError> {
        self.statements.lock().unwrap().push(sql.trim().to_string());
        Ok(self.canned(sql))
    }

    async fn insert(
        &self,
        table: &str,
        columns: &[&str],
        rows: &[Vec<Value>],
    ) -> Result<(), WarehouseError> {
        self.inserts.lock().unwrap().push((
            table.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
            rows.to_vec(),
        ));
        Ok(())
    }
}

#[tokio::test]
async fn tour_runs_every_step_in_order() {
    let warehouse = ScriptedWarehouse::with_students(4);
    let mut out = Vec::new();

    let report = run_tour(&warehouse, &mut out, TourOptions::default())
        .await
        .expect("tour should succeed");

    assert_eq!(report.steps, 6);
    assert_eq!(report.version.as_deref(), Some("24.8.4.13"));
    assert_eq!(report.enrollments, 4);
    assert_eq!(report.joined_rows, 4);
    assert_eq!(report.country_averages, 2);

    let statements = warehouse.statements();
    assert_eq!(statements[0], "SELECT version()");
    assert_eq!(statements[1], "CREATE DATABASE IF NOT EXISTS university_demo");
    assert!(statements[2].starts_with("CREATE TABLE IF NOT EXISTS university_demo.students"));
    assert!(statements[3].starts_with("CREATE TABLE IF NOT EXISTS university_demo.courses"));
    assert!(statements[4].starts_with("CREATE TABLE IF NOT EXISTS university_demo.enrollments"));
    assert!(!statements.iter().any(|sql| sql.starts_with("DROP")));

    let text = String::from_utf8(out).expect("utf-8 output");
    assert!(text.contains("=== 1. Connect ==="));
    assert!(text.contains("=== 6. UUID generation ==="));
    assert!(text.contains("Inserted 4 enrollments."));
}

#[tokio::test]
async fn enrollments_use_ids_read_back_from_the_server() {
    let warehouse = ScriptedWarehouse::with_students(4);
    let mut out = Vec::new();

    run_tour(&warehouse, &mut out, TourOptions::default())
        .await
        .expect("tour should succeed");

    let inserts = warehouse.inserts.lock().unwrap();
    assert_eq!(inserts.len(), 3);

    let (table, columns, rows) = &inserts[0];
    assert_eq!(table, "university_demo.students");
    assert_eq!(columns, &["name", "age", "country"]);
    assert_eq!(rows[0], vec![json!("Alice"), json!(22), json!("UK")]);

    let (table, columns, rows) = &inserts[2];
    assert_eq!(table, "university_demo.enrollments");
    assert_eq!(columns, &["student_id", "course_id", "grade"]);
    assert_eq!(
        rows,
        &vec![
            vec![json!("s-0"), json!("c-0"), json!(95.0)],
            vec![json!("s-1"), json!("c-1"), json!(88.0)],
            vec![json!("s-2"), json!("c-0"), json!(92.5)],
            vec![json!("s-3"), json!("c-2"), json!(76.5)],
        ]
    );
}

#[tokio::test]
async fn cleanup_drops_the_database() {
    let warehouse = ScriptedWarehouse::with_students(4);
    let mut out = Vec::new();

    let report = run_tour(&warehouse, &mut out, TourOptions { cleanup: true })
        .await
        .expect("tour should succeed");

    assert_eq!(report.steps, 7);
    assert_eq!(
        warehouse.statements().last().map(String::as_str),
        Some("DROP DATABASE IF EXISTS university_demo")
    );
}

#[tokio::test]
async fn too_few_students_stops_before_enrolling() {
    let warehouse = ScriptedWarehouse::with_students(2);
    let mut out = Vec::new();

    let err = run_tour(&warehouse, &mut out, TourOptions::default())
        .await
        .expect_err("tour should fail");

    assert!(matches!(
        err,
        WarehouseError::MissingRows {
            table: "students",
            expected: 4,
            actual: 2
        }
    ));
    assert_eq!(warehouse.inserts.lock().unwrap().len(), 2);
}
