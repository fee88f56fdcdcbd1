use tracing::{debug, info};

use crate::{
    courses::{model::NewCourse, store::CourseStore},
    error::{AppError, AppResult},
};

const SEED_COURSES: [(&str, &str, i32); 4] = [
    ("CS101", "Databases", 3),
    ("CS102", "Machine Learning", 4),
    ("EC201", "Econometrics", 3),
    ("BU110", "Marketing", 2),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Inserts the sample catalog; courses that already exist are left alone.
pub async fn seed_courses(store: &dyn CourseStore) -> AppResult<SeedReport> {
    let mut report = SeedReport::default();

    for (id, title, credits) in SEED_COURSES {
        let outcome = store
            .insert(NewCourse {
                id: Some(id.to_string()),
                title: title.to_string(),
                credits,
            })
            .await;

        match outcome {
            Ok(_) => report.inserted += 1,
            Err(AppError::Conflict(_)) => {
                debug!(id, "course already present");
                report.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        inserted = report.inserted,
        skipped = report.skipped,
        "seeded courses"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::courses::store::InMemoryCourseStore;

    #[tokio::test]
    async fn seeding_twice_skips_existing() {
        let store = InMemoryCourseStore::new();

        let first = seed_courses(&store).await.unwrap();
        assert_eq!(first, SeedReport { inserted: 4, skipped: 0 });

        let second = seed_courses(&store).await.unwrap();
        assert_eq!(second, SeedReport { inserted: 0, skipped: 4 });
        assert_eq!(store.list(100).await.unwrap().len(), 4);
    }
}
