use blossom_db::migrations;

use crate::commands::{with_database, CommandResult, OpsError};

pub fn run() -> CommandResult {
    with_database("migrate", |pool| async move {
        migrations::run_pending(&pool)
            .await
            .map_err(|error| OpsError::new("migration", error.to_string(), 5))?;
        Ok("applied pending migrations".to_owned())
    })
}
