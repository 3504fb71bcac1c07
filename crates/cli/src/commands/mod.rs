pub mod config;
pub mod doctor;
pub mod migrate;
pub mod seed;

use std::future::Future;

use serde::Serialize;

use blossom_core::config::{AppConfig, LoadOptions};
use blossom_db::{connect_with_settings, DbPool};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum OutcomeStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize)]
struct CommandOutcome<'a> {
    command: &'a str,
    status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_class: Option<&'a str>,
    detail: String,
}

impl CommandResult {
    pub fn success(command: &str, detail: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            output: render(CommandOutcome {
                command,
                status: OutcomeStatus::Ok,
                error_class: None,
                detail: detail.into(),
            }),
        }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        detail: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self {
            exit_code,
            output: render(CommandOutcome {
                command,
                status: OutcomeStatus::Error,
                error_class: Some(error_class),
                detail: detail.into(),
            }),
        }
    }
}

fn render(outcome: CommandOutcome<'_>) -> String {
    serde_json::to_string(&outcome)
        .unwrap_or_else(|_| r#"{"command":"unknown","status":"error"}"#.to_owned())
}

pub(crate) struct OpsError {
    pub class: &'static str,
    pub detail: String,
    pub exit_code: u8,
}

impl OpsError {
    pub(crate) fn new(class: &'static str, detail: impl Into<String>, exit_code: u8) -> Self {
        Self { class, detail: detail.into(), exit_code }
    }
}

/// Shared preamble for commands that touch the database: load config,
/// bring up a current-thread runtime and a connected pool, run the body,
/// close the pool. The body returns its success message.
pub(crate) fn with_database<Fut>(
    command: &'static str,
    body: impl FnOnce(DbPool) -> Fut,
) -> CommandResult
where
    Fut: Future<Output = Result<String, OpsError>>,
{
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                command,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let outcome = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| OpsError::new("db_connectivity", error.to_string(), 4))?;

        let result = body(pool.clone()).await;
        pool.close().await;
        result
    });

    match outcome {
        Ok(detail) => CommandResult::success(command, detail),
        Err(error) => CommandResult::failure(command, error.class, error.detail, error.exit_code),
    }
}

#[cfg(test)]
mod tests {
    use super::CommandResult;

    #[test]
    fn outcomes_serialize_with_and_without_an_error_class() {
        let ok = CommandResult::success("migrate", "applied");
        assert_eq!(ok.exit_code, 0);
        assert!(ok.output.contains(r#""status":"ok""#));
        assert!(!ok.output.contains("error_class"));

        let failed = CommandResult::failure("migrate", "db_connectivity", "no disk", 4);
        assert_eq!(failed.exit_code, 4);
        assert!(failed.output.contains(r#""error_class":"db_connectivity""#));
        assert!(failed.output.contains(r#""detail":"no disk""#));
    }
}
