//! SQLite Persistence - 任务持久化

mod database;
mod task_repo;

pub use database::{create_pool, run_migrations, DatabaseConfig, DbPool};
pub use task_repo::SqliteTaskStore;
