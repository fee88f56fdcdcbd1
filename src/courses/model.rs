use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const MAX_CREDITS: i32 = 4;
pub const DEFAULT_LIST_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub credits: i32,
}

/// A course about to be stored. `id: None` lets the store pick one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub id: Option<String>,
    pub title: String,
    pub credits: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    pub title: String,
    pub credits: i32,
}

impl CreateCourseRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::validation("title must not be blank"));
        }
        if !(0..=MAX_CREDITS).contains(&self.credits) {
            return Err(AppError::validation(format!(
                "credits must be between 0 and {MAX_CREDITS}"
            )));
        }
        Ok(())
    }

    /// `id` wins over `code`; blank values count as absent.
    pub fn into_new_course(self) -> NewCourse {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .or(self.code.filter(|code| !code.trim().is_empty()));

        NewCourse {
            id,
            title: self.title,
            credits: self.credits,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCoursesQuery {
    pub limit: Option<usize>,
}

impl ListCoursesQuery {
    pub fn limit(&self) -> AppResult<usize> {
        match self.limit {
            None => Ok(DEFAULT_LIST_LIMIT),
            Some(limit) if (1..=DEFAULT_LIST_LIMIT).contains(&limit) => Ok(limit),
            Some(_) => Err(AppError::validation(format!(
                "limit must be between 1 and {DEFAULT_LIST_LIMIT}"
            ))),
        }
    }
}
