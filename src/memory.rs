//! In-memory [`MovieService`] used to exercise handlers without a database.

use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use jiff::Timestamp;

use crate::{
    models::{Movie, MovieInput},
    service::{MovieService, ServiceError, ServiceResult, next_update_stamp},
};

#[derive(Default)]
pub struct MemoryMovieService {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    last_id: i64,
    rows: BTreeMap<i64, Movie>,
}

impl MemoryMovieService {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inner {
    fn check(&self, id: Option<i64>, input: &MovieInput) -> ServiceResult<()> {
        if input.title.is_empty() || input.external_reference.is_empty() {
            return Err(ServiceError::Validation(
                "title and external reference must not be empty".to_string(),
            ));
        }
        let taken = self
            .rows
            .values()
            .any(|m| Some(m.id) != id && m.external_reference == input.external_reference);
        if taken {
            return Err(ServiceError::Conflict("external reference already exists".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MovieService for MemoryMovieService {
    async fn list_all(&self) -> ServiceResult<Vec<Movie>> {
        Ok(self.lock().rows.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> ServiceResult<Movie> {
        self.lock().rows.get(&id).cloned().ok_or(ServiceError::NotFound { id })
    }

    async fn create(&self, input: &MovieInput) -> ServiceResult<i64> {
        let mut inner = self.lock();
        inner.check(None, input)?;

        inner.last_id += 1;
        let id = inner.last_id;
        let now = Timestamp::now();
        inner.rows.insert(
            id,
            Movie {
                id,
                title: input.title.clone(),
                external_reference: input.external_reference.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn update(&self, id: i64, input: &MovieInput) -> ServiceResult<()> {
        let mut inner = self.lock();
        inner.check(Some(id), input)?;

        let movie = inner.rows.get_mut(&id).ok_or(ServiceError::NotFound { id })?;
        movie.title = input.title.clone();
        movie.external_reference = input.external_reference.clone();
        movie.updated_at = next_update_stamp(movie.updated_at)?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.lock().rows.remove(&id).map(|_| ()).ok_or(ServiceError::NotFound { id })
    }
}
