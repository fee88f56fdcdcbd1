use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    students::model::{Student, StudentFilter},
};

#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn get(&self, id: i64) -> AppResult<Option<Student>>;
    async fn find(&self, filter: &StudentFilter) -> AppResult<Vec<Student>>;
    async fn insert(&self, student: Student) -> AppResult<Student>;
}

/// Students stored in a single CSV file.
///
/// The file is read in full on every call and rewritten in full on every
/// insert. A missing file reads as an empty roster.
pub struct CsvStudentRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvStudentRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> AppResult<Vec<Student>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_roster(&path))
            .await
            .map_err(|err| AppError::internal(format!("roster read task failed: {err}")))?
    }
}

#[async_trait]
impl StudentRepository for CsvStudentRepository {
    async fn get(&self, id: i64) -> AppResult<Option<Student>> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|student| student.id == id))
    }

    async fn find(&self, filter: &StudentFilter) -> AppResult<Vec<Student>> {
        let mut students = self.load().await?;
        students.retain(|student| filter.matches(student));
        Ok(students)
    }

    async fn insert(&self, student: Student) -> AppResult<Student> {
        let _guard = self.write_lock.lock().await;

        let mut students = self.load().await?;
        if students.iter().any(|existing| existing.id == student.id) {
            return Err(AppError::conflict(format!(
                "student {} already exists",
                student.id
            )));
        }
        students.push(student.clone());

        let path = self.path.clone();
        let rows = students.len();
        tokio::task::spawn_blocking(move || write_roster(&path, &students))
            .await
            .map_err(|err| AppError::internal(format!("roster write task failed: {err}")))??;

        debug!(path = %self.path.display(), rows, "rewrote student roster");
        Ok(student)
    }
}

fn read_roster(path: &Path) -> AppResult<Vec<Student>> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut reader = csv::Reader::from_reader(file);
    let students = reader
        .deserialize::<Student>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(students)
}

fn write_roster(path: &Path, students: &[Student]) -> AppResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for student in students {
        writer.serialize(student)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Student {
        Student {
            id: 1,
            name: "Alice".into(),
            age: 22,
            major: "CS".into(),
            city: "Lahore".into(),
        }
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CsvStudentRepository::new(dir.path().join("students.csv"));
        assert_eq!(repo.get(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn insert_creates_file_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CsvStudentRepository::new(dir.path().join("students.csv"));

        repo.insert(alice()).await.unwrap();

        let written = std::fs::read_to_string(repo.path()).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("id,name,age,major,city"));
        assert_eq!(lines.next(), Some("1,Alice,22,CS,Lahore"));
        assert_eq!(repo.get(1).await.unwrap(), Some(alice()));
    }

    #[tokio::test]
    async fn duplicate_id_is_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CsvStudentRepository::new(dir.path().join("students.csv"));

        repo.insert(alice()).await.unwrap();
        let err = repo.insert(alice()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn malformed_rows_surface_as_storage_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.csv");
        std::fs::write(&path, "id,name,age,major,city\nx,Bob,20,CS,Paris\n").unwrap();

        let err = CsvStudentRepository::new(path).get(1).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
