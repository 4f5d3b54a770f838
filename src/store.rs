use async_trait::async_trait;
use jiff::{Timestamp, fmt::temporal::DateTimePrinter};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait, sea_query::Expr,
};

use crate::{
    entities::movie,
    models::{Movie, MovieInput},
    service::{MovieService, ServiceError, ServiceResult, next_update_stamp},
};

/// SQLite-backed [`MovieService`].
#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MovieService for MovieStore {
    async fn list_all(&self) -> ServiceResult<Vec<Movie>> {
        let rows = movie::Entity::find()
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await
            .map_err(classify)?;

        rows.into_iter().map(to_movie).collect()
    }

    async fn get(&self, id: i64) -> ServiceResult<Movie> {
        let row = movie::Entity::find_by_id(id).one(&self.db).await.map_err(classify)?;
        match row {
            Some(row) => to_movie(row),
            None => Err(ServiceError::NotFound { id }),
        }
    }

    async fn create(&self, input: &MovieInput) -> ServiceResult<i64> {
        let now = format_timestamp(Timestamp::now());
        let model = movie::ActiveModel {
            id: Default::default(),
            title: Set(input.title.clone()),
            external_reference: Set(input.external_reference.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let res = movie::Entity::insert(model).exec(&self.db).await.map_err(classify)?;
        Ok(res.last_insert_id)
    }

    /// Runs in one transaction so the new `updated_at` is strictly later than the
    /// stored one even if the wall clock stepped backwards.
    async fn update(&self, id: i64, input: &MovieInput) -> ServiceResult<()> {
        let txn = self.db.begin().await.map_err(classify)?;

        let Some(row) = movie::Entity::find_by_id(id).one(&txn).await.map_err(classify)? else {
            return Err(ServiceError::NotFound { id });
        };
        let updated_at = next_update_stamp(parse_timestamp(&row.updated_at)?)?;

        let res = movie::Entity::update_many()
            .col_expr(movie::Column::Title, Expr::value(input.title.clone()))
            .col_expr(movie::Column::ExternalReference, Expr::value(input.external_reference.clone()))
            .col_expr(movie::Column::UpdatedAt, Expr::value(format_timestamp(updated_at)))
            .filter(movie::Column::Id.eq(id))
            .exec(&txn)
            .await
            .map_err(classify)?;

        // A zero-row update means the id does not exist; never report it as success.
        if res.rows_affected == 0 {
            return Err(ServiceError::NotFound { id });
        }

        txn.commit().await.map_err(classify)?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> ServiceResult<()> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await.map_err(classify)?;
        if res.rows_affected == 0 {
            return Err(ServiceError::NotFound { id });
        }
        Ok(())
    }
}

fn to_movie(row: movie::Model) -> ServiceResult<Movie> {
    let created_at = parse_timestamp(&row.created_at)?;
    let updated_at = parse_timestamp(&row.updated_at)?;
    Ok(Movie {
        id: row.id,
        title: row.title,
        external_reference: row.external_reference,
        created_at,
        updated_at,
    })
}

/// Always nine fractional digits so that text order is time order.
fn format_timestamp(ts: Timestamp) -> String {
    DateTimePrinter::new().precision(Some(9)).timestamp_to_string(&ts)
}

fn parse_timestamp(raw: &str) -> ServiceResult<Timestamp> {
    raw.parse::<Timestamp>().map_err(|e| {
        ServiceError::Storage(anyhow::Error::new(e).context(format!("bad stored timestamp {raw:?}")))
    })
}

/// Maps engine errors onto the service taxonomy.
fn classify(err: DbErr) -> ServiceError {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
        return ServiceError::Conflict("external reference already exists".to_string());
    }

    // SqlErr has no variant for CHECK or NOT NULL failures, so match SQLite's message.
    let text = err.to_string();
    if text.contains("CHECK constraint failed") || text.contains("NOT NULL constraint failed") {
        return ServiceError::Validation(
            "title and external reference must not be empty".to_string(),
        );
    }

    ServiceError::Storage(anyhow::Error::new(err))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sea_orm::{ConnectionTrait, Statement};

    use super::*;
    use crate::db;

    async fn store() -> MovieStore {
        MovieStore::new(db::connect_and_migrate("sqlite::memory:").await.unwrap())
    }

    fn input(title: &str, external_reference: &str) -> MovieInput {
        MovieInput { title: title.to_string(), external_reference: external_reference.to_string() }
    }

    #[tokio::test]
    async fn list_all_on_empty_table_is_empty() {
        let store = store().await;
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_then_get_round_trips_fields() {
        let store = store().await;
        let id = store.create(&input("Inception", "tt1375666")).await.unwrap();
        assert_eq!(id, 1);

        let movie = store.get(id).await.unwrap();
        assert_eq!(movie.title, "Inception");
        assert_eq!(movie.external_reference, "tt1375666");
        assert_eq!(movie.created_at, movie.updated_at);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = store().await;
        assert!(matches!(store.get(42).await, Err(ServiceError::NotFound { id: 42 })));
    }

    #[tokio::test]
    async fn duplicate_reference_is_conflict_and_keeps_first() {
        let store = store().await;
        let first = store.create(&input("Heat", "tt0113277")).await.unwrap();

        let err = store.create(&input("Heat (remake)", "tt0113277")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let movies = store.list_all().await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].id, first);
        assert_eq!(movies[0].title, "Heat");
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_by_the_schema() {
        let store = store().await;
        let err = store.create(&input("", "tt0000001")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_only() {
        let store = store().await;
        let id = store.create(&input("Inception", "tt1375666")).await.unwrap();
        let before = store.get(id).await.unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        store.update(id, &input("Inception (2010)", "tt1375666")).await.unwrap();

        let after = store.get(id).await.unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.title, "Inception (2010)");
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn padded_values_are_stored_as_sent() {
        let store = store().await;
        let id = store.create(&input("  Heat ", " tt0113277")).await.unwrap();

        let movie = store.get(id).await.unwrap();
        assert_eq!(movie.title, "  Heat ");
        assert_eq!(movie.external_reference, " tt0113277");
    }

    #[tokio::test]
    async fn update_moves_past_a_stored_future_timestamp() {
        let store = store().await;
        store
            .db
            .execute(Statement::from_string(
                store.db.get_database_backend(),
                "INSERT INTO movies (title, external_reference, created_at, updated_at) \
                 VALUES ('Alien', 'tt0078748', '2999-01-01T00:00:00.000000000Z', \
                 '2999-01-01T00:00:00.000000000Z')"
                    .to_string(),
            ))
            .await
            .unwrap();
        let before = store.get(1).await.unwrap();

        store.update(1, &input("Alien (1979)", "tt0078748")).await.unwrap();

        let after = store.get(1).await.unwrap();
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
        assert!(after.updated_at >= after.created_at);
    }

    #[test]
    fn stored_timestamps_have_fixed_width() {
        let whole: Timestamp = "2024-01-01T00:00:00Z".parse().unwrap();
        let fractional: Timestamp = "2024-01-01T00:00:00.5Z".parse().unwrap();
        let (a, b) = (format_timestamp(whole), format_timestamp(fractional));
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[tokio::test]
    async fn update_into_taken_reference_is_conflict() {
        let store = store().await;
        store.create(&input("Alien", "tt0078748")).await.unwrap();
        let id = store.create(&input("Aliens", "tt0090605")).await.unwrap();

        let err = store.update(id, &input("Aliens", "tt0078748")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_and_delete_missing_are_not_found() {
        let store = store().await;
        let err = store.update(7, &input("Nope", "tt7")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { id: 7 }));
        assert!(matches!(store.delete(7).await, Err(ServiceError::NotFound { id: 7 })));
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let store = store().await;
        store.create(&input("Alien", "tt0078748")).await.unwrap();
        let second = store.create(&input("Aliens", "tt0090605")).await.unwrap();

        store.delete(second).await.unwrap();
        assert!(matches!(store.get(second).await, Err(ServiceError::NotFound { .. })));

        let third = store.create(&input("Alien 3", "tt0103644")).await.unwrap();
        assert!(third > second);
    }

    #[tokio::test]
    async fn list_all_is_ordered_by_id() {
        let store = store().await;
        for (title, reference) in [("B", "tt2"), ("A", "tt1"), ("C", "tt3")] {
            store.create(&input(title, reference)).await.unwrap();
        }
        let ids: Vec<i64> = store.list_all().await.unwrap().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
