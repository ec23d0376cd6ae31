use std::env;
use std::sync::{Mutex, OnceLock};

use coffre_cli::commands::{config, doctor, listen, parse};
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn listen_returns_config_failure_without_token() {
    with_env(&[], || {
        let result = listen::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "listen");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn listen_rejects_non_websocket_gateway_url() {
    with_env(
        &[
            ("COFFRE_DISCORD_TOKEN", "MTIz.abc.def"),
            ("COFFRE_DISCORD_GATEWAY_URL", "https://gateway.discord.gg"),
        ],
        || {
            let result = listen::run();
            assert_eq!(result.exit_code, 2);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["error_class"], "config_validation");
            assert!(payload["message"].as_str().unwrap_or_default().contains("gateway_url"));
        },
    );
}

#[test]
fn config_attributes_sources_and_redacts_secrets() {
    with_env(&[("DISCORD_TOKEN", "MTIz.abc.def"), ("ADMIN_PASSWORD", "s3cret-admin")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 0);
        assert!(!result.output.contains("s3cret-admin"));
        assert!(!result.output.contains("abc.def"));

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "ok");

        let token = row(&payload, "discord.token");
        assert_eq!(token["value"], "MTIz.***");
        assert_eq!(token["source"], "env (DISCORD_TOKEN)");

        let password = row(&payload, "ledger.admin_password");
        assert_eq!(password["value"], "<redacted>");
        assert_eq!(password["source"], "env (ADMIN_PASSWORD)");

        let port = row(&payload, "server.port");
        assert_eq!(port["value"], "5000");
        assert_eq!(port["source"], "default");
    });
}

#[test]
fn config_reports_blank_env_values_as_default() {
    with_env(&[("COFFRE_SERVER_PORT", "  "), ("PORT", ""), ("ADMIN_PASSWORD", "s3cret-admin")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let port = row(&payload, "server.port");
        assert_eq!(port["value"], "5000");
        assert_eq!(port["source"], "default");
    });
}

#[test]
fn config_returns_failure_on_invalid_env_override() {
    with_env(&[("COFFRE_SERVER_PORT", "not-a-port")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn doctor_reports_each_check_and_fails_on_missing_roster() {
    let dir = TempDir::new().expect("tempdir");
    let ledger = dir.path().join("ventes.json");
    std::fs::write(
        &ledger,
        r#"{"ventes":[{"vendeur":"Alice","item":"Emmental","quantite":3}],"derniere_reset":"2025-07-06T23:00:00"}"#,
    )
    .expect("seed ledger");
    let inventory = dir.path().join("coffres.json");
    let roster = format!("sqlite://{}", dir.path().join("absent.db").display());

    with_env(
        &[
            ("COFFRE_STORAGE_LEDGER_PATH", ledger.to_str().expect("utf8 path")),
            ("COFFRE_STORAGE_INVENTORY_PATH", inventory.to_str().expect("utf8 path")),
            ("COFFRE_DATABASE_URL", roster.as_str()),
        ],
        || {
            let result = doctor::run(true);
            assert_eq!(result.exit_code, 1);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "doctor");
            assert_eq!(payload["status"], "error");
            assert_eq!(payload["error_class"], "readiness");

            assert_eq!(check(&payload, "config_validation")["status"], "pass");
            let ledger_check = check(&payload, "ledger_file");
            assert_eq!(ledger_check["status"], "pass");
            assert!(ledger_check["details"].as_str().unwrap_or_default().contains("1 sale(s)"));
            assert_eq!(check(&payload, "inventory_snapshot")["status"], "pass");
            assert_eq!(check(&payload, "roster_database")["status"], "fail");
            assert_eq!(check(&payload, "listener_readiness")["status"], "skipped");
        },
    );
}

#[test]
fn doctor_flags_corrupt_ledger() {
    let dir = TempDir::new().expect("tempdir");
    let ledger = dir.path().join("ventes.json");
    std::fs::write(&ledger, "{broken").expect("seed ledger");

    with_env(&[("COFFRE_STORAGE_LEDGER_PATH", ledger.to_str().expect("utf8 path"))], || {
        let payload = parse_payload(&doctor::run(true).output);
        assert_eq!(check(&payload, "ledger_file")["status"], "fail");
    });
}

#[test]
fn doctor_skips_dependent_checks_when_config_is_invalid() {
    with_env(&[("COFFRE_LEDGER_RESET_HOUR", "24")], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(check(&payload, "config_validation")["status"], "fail");
        for name in ["ledger_file", "inventory_snapshot", "roster_database", "listener_readiness"] {
            assert_eq!(check(&payload, name)["status"], "skipped", "{name}");
        }
    });
}

#[test]
fn doctor_human_output_lists_markers() {
    with_env(&[("COFFRE_LEDGER_RESET_HOUR", "24")], || {
        let result = doctor::run(false);
        assert!(result.output.starts_with("doctor: one or more readiness checks failed"));
        assert!(result.output.contains("- [fail] config_validation:"));
        assert!(result.output.contains("- [skip] roster_database:"));
    });
}

#[test]
fn parse_extracts_inventory_movement() {
    let result = parse::run("**Bob Martin** a déposé 5x Tomate");
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["data"]["kind"], "inventory");
    assert_eq!(payload["data"]["player"], "Bob Martin");
    assert_eq!(payload["data"]["quantity"], 5);
    assert_eq!(payload["data"]["action"], "deposit");
}

#[test]
fn parse_extracts_sale() {
    let result = parse::run("Vente de 3x Emmental pour 45$ par Alice.");
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["data"]["kind"], "sale");
}

#[test]
fn parse_reports_unmatched_text() {
    let result = parse::run("Bob a mangé une pomme");
    assert_eq!(result.exit_code, 1);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "no_match");
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn row<'a>(payload: &'a Value, key: &str) -> &'a Value {
    payload["data"]
        .as_array()
        .and_then(|rows| rows.iter().find(|row| row["key"] == key))
        .unwrap_or_else(|| panic!("missing config row {key}"))
}

fn check<'a>(payload: &'a Value, name: &str) -> &'a Value {
    payload["checks"]
        .as_array()
        .and_then(|checks| checks.iter().find(|check| check["name"] == name))
        .unwrap_or_else(|| panic!("missing doctor check {name}"))
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "COFFRE_SERVER_BIND_ADDRESS",
        "COFFRE_SERVER_PORT",
        "PORT",
        "COFFRE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "COFFRE_DATABASE_URL",
        "COFFRE_DATABASE_MAX_CONNECTIONS",
        "COFFRE_DATABASE_TIMEOUT_SECS",
        "COFFRE_STORAGE_LEDGER_PATH",
        "COFFRE_STORAGE_INVENTORY_PATH",
        "COFFRE_STORAGE_SNAPSHOT_INTERVAL_SECS",
        "COFFRE_LEDGER_ADMIN_PASSWORD",
        "ADMIN_PASSWORD",
        "COFFRE_LEDGER_AUTO_RESET",
        "COFFRE_LEDGER_RESET_WEEKDAY",
        "COFFRE_LEDGER_RESET_HOUR",
        "COFFRE_WAREHOUSES_ALLOWED",
        "COFFRE_WAREHOUSES_ENFORCE_AT_GATEWAY",
        "COFFRE_DISCORD_TOKEN",
        "DISCORD_TOKEN",
        "COFFRE_DISCORD_GATEWAY_URL",
        "COFFRE_DISCORD_CHANNEL_PREFIX",
        "COFFRE_DISCORD_SALES_CHANNEL",
        "COFFRE_DISCORD_FORWARD_URL",
        "COFFRE_DISCORD_MAX_RETRIES",
        "COFFRE_LOGGING_LEVEL",
        "COFFRE_LOGGING_FORMAT",
        "COFFRE_LOG_LEVEL",
        "COFFRE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
