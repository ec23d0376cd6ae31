use coffre_core::config::{AppConfig, LoadOptions};
use coffre_core::{InventoryFile, LedgerFile};
use coffre_db::{connect_read_only, EmployeeDirectory, SqlEmployeeDirectory};
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    command: &'static str,
    status: &'static str,
    error_class: Option<&'static str>,
    message: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.error_class.is_some() { 1 } else { 0 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"command\":\"doctor\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_ledger_file(&config));
            checks.push(check_inventory_snapshot(&config));
            checks.push(check_roster_database(&config));
            checks.push(check_listener_readiness(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in
                ["ledger_file", "inventory_snapshot", "roster_database", "listener_readiness"]
            {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let (status, error_class, message) = if failed {
        ("error", Some("readiness"), "doctor: one or more readiness checks failed")
    } else {
        ("ok", None, "doctor: all readiness checks passed")
    };

    DoctorReport { command: "doctor", status, error_class, message: message.to_string(), checks }
}

fn check_ledger_file(config: &AppConfig) -> DoctorCheck {
    let file = LedgerFile::new(&config.storage.ledger_path);
    let (status, details) = match file.load() {
        Ok(Some(document)) => (
            CheckStatus::Pass,
            format!(
                "`{}` holds {} sale(s), last reset {}",
                file.path().display(),
                document.sales.len(),
                document.last_reset.as_deref().unwrap_or("never")
            ),
        ),
        Ok(None) => (
            CheckStatus::Pass,
            format!("`{}` not created yet; gateway starts empty", file.path().display()),
        ),
        Err(error) => (CheckStatus::Fail, error.to_string()),
    };

    DoctorCheck { name: "ledger_file", status, details }
}

fn check_inventory_snapshot(config: &AppConfig) -> DoctorCheck {
    let Some(path) = &config.storage.inventory_path else {
        return DoctorCheck {
            name: "inventory_snapshot",
            status: CheckStatus::Skipped,
            details: "storage.inventory_path unset; inventory lives in memory only".to_string(),
        };
    };

    let (status, details) = match InventoryFile::new(path).load() {
        Ok(store) => (
            CheckStatus::Pass,
            format!("`{}` restores {} warehouse(s)", path.display(), store.read().len()),
        ),
        Err(error) => (CheckStatus::Fail, error.to_string()),
    };

    DoctorCheck { name: "inventory_snapshot", status, details }
}

fn check_roster_database(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "roster_database",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_read_only(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .map_err(|error| format!("invalid roster database url: {error}"))?;

        let directory = SqlEmployeeDirectory::new(pool.clone());
        let employees = directory
            .list_active()
            .await
            .map_err(|error| format!("failed to query roster: {error}"));
        pool.close().await;
        employees
    });

    match result {
        Ok(employees) => DoctorCheck {
            name: "roster_database",
            status: CheckStatus::Pass,
            details: format!(
                "`{}` lists {} active employee(s)",
                config.database.url,
                employees.len()
            ),
        },
        Err(error) => DoctorCheck { name: "roster_database", status: CheckStatus::Fail, details: error },
    }
}

fn check_listener_readiness(config: &AppConfig) -> DoctorCheck {
    if config.discord.token.expose_secret().trim().is_empty() {
        return DoctorCheck {
            name: "listener_readiness",
            status: CheckStatus::Skipped,
            details: "discord.token unset; only the gateway can run".to_string(),
        };
    }

    match config.validate_listener() {
        Ok(()) => DoctorCheck {
            name: "listener_readiness",
            status: CheckStatus::Pass,
            details: format!(
                "forwarding {} warehouse channel(s) to `{}`",
                config.warehouses.allowed.len(),
                config.discord.forward_url
            ),
        },
        Err(error) => DoctorCheck {
            name: "listener_readiness",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.message.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
