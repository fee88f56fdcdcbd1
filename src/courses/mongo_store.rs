use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection,
    bson::{Bson, Document, doc, oid::ObjectId},
    error::{Error as MongoError, ErrorKind, WriteFailure},
};
use tracing::{debug, info};

use crate::{
    config::MongoConfig,
    courses::{
        model::{Course, NewCourse},
        store::{CourseStore, DUPLICATE_COURSE},
    },
    error::{AppError, AppResult},
};

const COURSES_COLLECTION: &str = "courses";
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoCourseStore {
    collection: Collection<Document>,
}

impl MongoCourseStore {
    pub fn new(collection: Collection<Document>) -> Self {
        Self { collection }
    }

    /// The driver connects lazily; this only validates the URL.
    pub async fn connect(config: &MongoConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.url)
            .await
            .with_context(|| format!("invalid MongoDB URL {}", config.url))?;
        info!(database = %config.database, "document store client ready");
        Ok(Self::new(
            client
                .database(&config.database)
                .collection(COURSES_COLLECTION),
        ))
    }
}

#[async_trait]
impl CourseStore for MongoCourseStore {
    async fn list(&self, limit: usize) -> AppResult<Vec<Course>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let documents: Vec<Document> = self
            .collection
            .find(doc! {})
            .limit(limit)
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)?;

        documents.iter().map(document_to_course).collect()
    }

    async fn insert(&self, course: NewCourse) -> AppResult<Course> {
        let mut document = doc! {
            "title": course.title.as_str(),
            "credits": course.credits,
        };
        if let Some(id) = &course.id {
            document.insert("_id", id.as_str());
        }

        let result = self
            .collection
            .insert_one(document)
            .await
            .map_err(map_mongo_error)?;

        let id = course
            .id
            .unwrap_or_else(|| bson_id_to_string(&result.inserted_id));
        debug!(id = %id, "inserted course");

        Ok(Course {
            id,
            title: course.title,
            credits: course.credits,
        })
    }

    async fn get(&self, id: &str) -> AppResult<Option<Course>> {
        // Generated ids are ObjectIds, client-chosen ones are strings.
        let filter = match ObjectId::parse_str(id) {
            Ok(oid) => doc! { "_id": { "$in": [id, oid] } },
            Err(_) => doc! { "_id": id },
        };

        let maybe_document = self
            .collection
            .find_one(filter)
            .await
            .map_err(map_mongo_error)?;

        maybe_document.as_ref().map(document_to_course).transpose()
    }
}

fn document_to_course(document: &Document) -> AppResult<Course> {
    let id = document
        .get("_id")
        .map(bson_id_to_string)
        .ok_or_else(|| AppError::storage("course document has no _id"))?;

    let title = document
        .get_str("title")
        .map_err(|err| AppError::storage(format!("course {id} has no title: {err}")))?
        .to_string();

    let credits = match document.get("credits") {
        Some(Bson::Int32(credits)) => *credits,
        Some(Bson::Int64(credits)) => i32::try_from(*credits)
            .map_err(|_| AppError::storage(format!("course {id} credits out of range")))?,
        Some(Bson::Double(credits)) if credits.fract() == 0.0 => *credits as i32,
        _ => {
            return Err(AppError::storage(format!(
                "course {id} has no integer credits"
            )));
        }
    };

    Ok(Course { id, title, credits })
}

fn bson_id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn is_duplicate_key(error: &MongoError) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

fn map_mongo_error(error: MongoError) -> AppError {
    if is_duplicate_key(&error) {
        AppError::conflict(DUPLICATE_COURSE)
    } else {
        AppError::storage(error.to_string())
    }
}
