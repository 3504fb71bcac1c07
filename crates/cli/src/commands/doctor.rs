use serde::Serialize;

use blossom_core::config::{AppConfig, LoadOptions};
use blossom_db::connect_with_settings;

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    ok: bool,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    status: &'static str,
    checks: Vec<DoctorCheck>,
}

pub fn run(json: bool) -> String {
    let checks = collect_checks();
    let all_ok = checks.iter().all(|check| check.ok);
    let report = DoctorReport { status: if all_ok { "ok" } else { "error" }, checks };

    if json {
        return serde_json::to_string_pretty(&report)
            .unwrap_or_else(|error| format!("{{\"status\":\"error\",\"message\":\"{error}\"}}"));
    }

    let mut lines = vec![format!("doctor: {}", report.status)];
    for check in &report.checks {
        let mark = if check.ok { "ok " } else { "FAIL" };
        lines.push(format!("  [{mark}] {:<16} {}", check.name, check.detail));
    }
    lines.join("\n")
}

fn collect_checks() -> Vec<DoctorCheck> {
    let mut checks = Vec::new();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config",
                ok: true,
                detail: format!(
                    "loaded; {} admin id(s), payment {}",
                    config.chat.admin_ids.len(),
                    if config.payment.provider_token.is_some() {
                        "configured"
                    } else {
                        "not configured"
                    }
                ),
            });
            config
        }
        Err(error) => {
            checks.push(DoctorCheck { name: "config", ok: false, detail: error.to_string() });
            return checks;
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            checks.push(DoctorCheck {
                name: "runtime",
                ok: false,
                detail: format!("failed to initialize async runtime: {error}"),
            });
            return checks;
        }
    };

    let database_check = runtime.block_on(async {
        let pool = match connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        {
            Ok(pool) => pool,
            Err(error) => {
                return DoctorCheck {
                    name: "database",
                    ok: false,
                    detail: format!("connect failed: {error}"),
                };
            }
        };

        let check = match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&pool).await {
            Ok(_) => DoctorCheck {
                name: "database",
                ok: true,
                detail: format!("reachable at {}", config.database.url),
            },
            Err(error) => DoctorCheck {
                name: "database",
                ok: false,
                detail: format!("query failed: {error}"),
            },
        };
        pool.close().await;
        check
    });
    checks.push(database_check);

    checks
}
