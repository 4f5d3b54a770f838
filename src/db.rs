use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

const MIGRATION_001: &str = include_str!("../migrations/001_create_movies.sql");

/// Opens the database and makes sure the schema exists.
///
/// Safe to call on every start: table creation is `IF NOT EXISTS` and never
/// touches existing rows.
pub async fn connect_and_migrate(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL", "PRAGMA foreign_keys=ON"]
    {
        db.execute(Statement::from_string(db.get_database_backend(), pragma.to_string())).await?;
    }

    run_sql(&db, MIGRATION_001).await?;
    tracing::debug!("schema ready");
    Ok(db)
}

async fn run_sql(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    for stmt in sql.split(';') {
        let stmt = stmt.trim();
        if stmt.is_empty() {
            continue;
        }
        db.execute(Statement::from_string(db.get_database_backend(), stmt.to_string())).await?;
    }
    Ok(())
}
