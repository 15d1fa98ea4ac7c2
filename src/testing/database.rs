//! In-memory test databases with the full schema applied.

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::migrations::Migrator;

static TEST_DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A migrated SQLite in-memory database.
///
/// Each instance gets its own named shared-cache database (process id plus an
/// atomic counter) so tests running in parallel never see each other's rows,
/// while every connection in the pool still reaches the same data.
pub struct TestDb {
    pub connection: DatabaseConnection,
}

impl TestDb {
    /// Create a fresh database and run all migrations.
    pub async fn new() -> Result<Self, DbErr> {
        let counter = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let url = format!(
            "sqlite:file:studentorg_test_{}_{}?mode=memory&cache=shared",
            std::process::id(),
            counter
        );
        let connection = Database::connect(url).await?;

        connection
            .execute_unprepared("PRAGMA journal_mode=WAL;")
            .await?;
        connection
            .execute_unprepared("PRAGMA busy_timeout=5000;")
            .await?;

        Migrator::up(&connection, None).await?;
        Ok(Self { connection })
    }

    /// Get a clone of the database connection, for handing to the router.
    pub fn connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    /// Execute raw SQL statements, useful for fixtures.
    pub async fn seed(&self, statements: &[&str]) -> Result<(), DbErr> {
        for statement in statements {
            self.connection.execute_unprepared(statement).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_applies_migrations() {
        let db = TestDb::new().await.unwrap();
        // all five tables exist and are empty
        for table in [
            "colleges",
            "programs",
            "students",
            "organizations",
            "org_members",
        ] {
            db.connection
                .execute_unprepared(&format!("SELECT COUNT(*) FROM {}", table))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_instances_are_isolated() {
        let first = TestDb::new().await.unwrap();
        let second = TestDb::new().await.unwrap();

        first
            .seed(&["INSERT INTO colleges (name) VALUES ('Isolated College')"])
            .await
            .unwrap();

        let count = second
            .connection
            .execute_unprepared("SELECT COUNT(*) FROM colleges")
            .await;
        assert!(count.is_ok());

        use sea_orm::{EntityTrait, PaginatorTrait};
        let rows = crate::entities::college::Entity::find()
            .count(&second.connection)
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }
}
