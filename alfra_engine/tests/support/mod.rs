use alfra_engine::{
    test_utils::{prepare_test_env, random_db_path},
    SqliteDatabase,
};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

/// Creates a fresh, migrated database in the temp directory and returns its url along with a connection to it.
pub async fn prepare_test_db() -> (String, SqliteDatabase) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    debug!("🚀️ Test database ready at {url}");
    (url, db)
}

pub async fn drop_test_db(url: &str, db: &SqliteDatabase) {
    db.close().await;
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("🚀️ Could not remove test database {url}: {e}");
    }
}
