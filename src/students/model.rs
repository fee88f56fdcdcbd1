use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 100;

/// One row of `students.csv`; field order matches the file header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub age: u32,
    pub major: String,
    pub city: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudentRequest {
    pub id: i64,
    #[serde(default = "default_name")]
    pub name: String,
    pub age: u32,
    #[serde(default = "default_major")]
    pub major: String,
    #[serde(default = "default_city")]
    pub city: String,
}

fn default_name() -> String {
    "Unknown".to_string()
}

fn default_major() -> String {
    "Undeclared".to_string()
}

fn default_city() -> String {
    "Unknown".to_string()
}

impl CreateStudentRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate_age(self.age)
    }

    pub fn into_student(self) -> Student {
        Student {
            id: self.id,
            name: self.name,
            age: self.age,
            major: self.major,
            city: self.city,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentCreated {
    pub message: &'static str,
    pub student: Student,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListStudentsQuery {
    pub major: Option<String>,
    pub city: Option<String>,
    pub age: Option<u32>,
}

impl ListStudentsQuery {
    pub fn into_filter(self) -> AppResult<StudentFilter> {
        let Some(major) = self.major else {
            return Err(AppError::validation("major query parameter is required"));
        };
        if let Some(age) = self.age {
            validate_age(age)?;
        }

        Ok(StudentFilter {
            major,
            city: self.city.filter(|city| !city.is_empty()),
            age: self.age,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentFilter {
    pub major: String,
    pub city: Option<String>,
    pub age: Option<u32>,
}

impl StudentFilter {
    pub fn matches(&self, student: &Student) -> bool {
        student.major == self.major
            && self.city.as_ref().is_none_or(|city| &student.city == city)
            && self.age.is_none_or(|age| student.age == age)
    }
}

fn validate_age(age: u32) -> AppResult<()> {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(AppError::validation(format!(
            "age must be between {MIN_AGE} and {MAX_AGE}"
        )));
    }
    Ok(())
}
