use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::{
    courses::model::{Course, NewCourse},
    error::{AppError, AppResult},
};

pub const DUPLICATE_COURSE: &str = "Course already exists";

#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn list(&self, limit: usize) -> AppResult<Vec<Course>>;
    async fn insert(&self, course: NewCourse) -> AppResult<Course>;
    async fn get(&self, id: &str) -> AppResult<Option<Course>>;
}

/// Keeps courses in insertion order, like a collection's natural order.
#[derive(Default)]
pub struct InMemoryCourseStore {
    courses: RwLock<Vec<Course>>,
}

impl InMemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseStore for InMemoryCourseStore {
    async fn list(&self, limit: usize) -> AppResult<Vec<Course>> {
        Ok(self
            .courses
            .read()
            .await
            .iter()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn insert(&self, course: NewCourse) -> AppResult<Course> {
        let mut courses = self.courses.write().await;
        let id = course.id.unwrap_or_else(|| ObjectId::new().to_hex());
        if courses.iter().any(|existing| existing.id == id) {
            return Err(AppError::conflict(DUPLICATE_COURSE));
        }

        let created = Course {
            id,
            title: course.title,
            credits: course.credits,
        };
        courses.push(created.clone());
        Ok(created)
    }

    async fn get(&self, id: &str) -> AppResult<Option<Course>> {
        Ok(self
            .courses
            .read()
            .await
            .iter()
            .find(|course| course.id == id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_course(id: Option<&str>, title: &str) -> NewCourse {
        NewCourse {
            id: id.map(str::to_string),
            title: title.to_string(),
            credits: 3,
        }
    }

    #[tokio::test]
    async fn generated_ids_look_like_object_ids() {
        let store = InMemoryCourseStore::new();
        let created = store.insert(new_course(None, "Databases")).await.unwrap();
        assert_eq!(created.id.len(), 24);
        assert!(ObjectId::parse_str(&created.id).is_ok());
        assert_eq!(store.get(&created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn duplicate_id_conflicts() {
        let store = InMemoryCourseStore::new();
        store.insert(new_course(Some("CS101"), "Databases")).await.unwrap();
        let err = store
            .insert(new_course(Some("CS101"), "Other"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref msg) if msg == DUPLICATE_COURSE));
    }

    #[tokio::test]
    async fn list_respects_limit_and_order() {
        let store = InMemoryCourseStore::new();
        for title in ["a", "b", "c"] {
            store.insert(new_course(Some(title), title)).await.unwrap();
        }
        let listed = store.list(2).await.unwrap();
        assert_eq!(
            listed.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }
}
