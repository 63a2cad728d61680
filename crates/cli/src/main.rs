use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use conform_api::{AdminClient, ConsoleApi, fetch_current_user, send_impersonation};
use conform_engine::{
    ConnectorForm, ConnectorFormOptions, DetachedSink, RouteDecision, SessionState, StarterMessageList, impersonation_access,
    starter_generation_prompt,
};
use conform_tui::{Screen, ScreenOutcome, read_starter_file, write_starter_file};
use conform_types::{ConnectionConfiguration, FormValues, ImpersonateRequest};
use conform_util::{ConsoleConfig, default_config_path, default_log_path, expand_tilde};
use serde_json::json;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    init_tracing(uses_terminal_ui(&matches));

    let config_path = matches
        .get_one::<String>("config")
        .map(|path| expand_tilde(path))
        .unwrap_or_else(default_config_path);
    let config = ConsoleConfig::load_from(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?
        .with_env_overrides();
    debug!(?config, "console config loaded");

    match matches.subcommand() {
        Some(("schema", _)) => print_schema(),
        Some(("form", sub)) => run_form(&config, sub).await,
        Some(("check", sub)) => run_check(sub),
        Some(("starters", sub)) => run_starters(&config, sub).await,
        Some(("starter-prompt", sub)) => {
            let name = sub.get_one::<String>("name").map(String::as_str).unwrap_or_default();
            let description = sub.get_one::<String>("description").map(String::as_str).unwrap_or_default();
            println!("{}", starter_generation_prompt(name, description));
            Ok(())
        }
        Some(("impersonate", sub)) => run_impersonate(&config, sub).await,
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}

fn build_cli() -> Command {
    Command::new("conform")
        .about("Schema-driven admin console forms")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .action(ArgAction::Set)
                .help("Path to the console config file"),
        )
        .subcommand(Command::new("schema").about("Print the JSON schema of a connection configuration"))
        .subcommand(
            Command::new("form")
                .about("Fill in a connector form in the terminal and print the submission")
                .arg(Arg::new("file").required(true).help("Connection configuration (JSON or YAML)"))
                .arg(Arg::new("name").long("name").action(ArgAction::Set).help("Prefilled connector name"))
                .arg(
                    Arg::new("defaults")
                        .long("defaults")
                        .action(ArgAction::Set)
                        .help("Initial field values (JSON or YAML object)"),
                )
                .arg(
                    Arg::new("enterprise")
                        .long("enterprise")
                        .action(ArgAction::SetTrue)
                        .help("Show the public flag and group access section"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Print initial values, validation errors, and whether the form can be submitted")
                .arg(Arg::new("file").required(true).help("Connection configuration (JSON or YAML)"))
                .arg(
                    Arg::new("values")
                        .long("values")
                        .action(ArgAction::Set)
                        .help("Field values to check (JSON or YAML object)"),
                ),
        )
        .subcommand(
            Command::new("starters")
                .about("Normalize a starter message file and print it")
                .arg(Arg::new("file").required(true).help("JSON array of starter messages"))
                .arg(
                    Arg::new("edit")
                        .long("edit")
                        .action(ArgAction::SetTrue)
                        .help("Open the starter editor and write the result back"),
                ),
        )
        .subcommand(
            Command::new("starter-prompt")
                .about("Print the prompt used to generate a starter message")
                .arg(Arg::new("name").long("name").required(true).action(ArgAction::Set))
                .arg(Arg::new("description").long("description").required(true).action(ArgAction::Set)),
        )
        .subcommand(
            Command::new("impersonate")
                .about("Impersonate a tenant user (cloud superusers only)")
                .arg(Arg::new("email").long("email").action(ArgAction::Set).requires("api-key"))
                .arg(Arg::new("api-key").long("api-key").action(ArgAction::Set).requires("email")),
        )
}

/// Commands that hand the terminal to the TUI.
fn uses_terminal_ui(matches: &ArgMatches) -> bool {
    match matches.subcommand() {
        Some(("form", _)) => true,
        Some(("starters", sub)) => sub.get_flag("edit"),
        Some(("impersonate", sub)) => sub.get_one::<String>("email").is_none(),
        _ => false,
    }
}

/// Installs the tracing subscriber. `RUST_LOG` picks the filter (default
/// `info`). While the TUI owns the terminal, logs go to the log file.
fn init_tracing(log_to_file: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_to_file && let Some(file) = open_log_file() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn open_log_file() -> Option<fs::File> {
    let path = default_log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

fn console_api(config: &ConsoleConfig) -> Result<Arc<dyn ConsoleApi>> {
    let client = AdminClient::from_config(config).context("building console client")?;
    Ok(Arc::new(client))
}

/// Parses a file as YAML when its extension says so, JSON otherwise.
fn read_document<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| matches!(extension, "yaml" | "yml"));
    if is_yaml {
        serde_yaml::from_str(&data).with_context(|| format!("parsing YAML in {}", path.display()))
    } else {
        serde_json::from_str(&data).with_context(|| format!("parsing JSON in {}", path.display()))
    }
}

fn file_arg(matches: &ArgMatches, id: &str) -> Option<PathBuf> {
    matches.get_one::<String>(id).map(|path| expand_tilde(path))
}

fn print_schema() -> Result<()> {
    let schema = schemars::schema_for!(ConnectionConfiguration);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

async fn run_form(config: &ConsoleConfig, matches: &ArgMatches) -> Result<()> {
    let path = file_arg(matches, "file").context("a connection configuration file is required")?;
    let configuration: ConnectionConfiguration = read_document(&path)?;
    let defaults = file_arg(matches, "defaults")
        .map(|path| read_document::<FormValues>(&path))
        .transpose()?;
    let options = ConnectorFormOptions {
        initial_name: matches.get_one::<String>("name").cloned(),
        defaults,
        enterprise_features: config.enterprise_features || matches.get_flag("enterprise"),
        ..ConnectorFormOptions::default()
    };

    let screen = Screen::ConnectorForm {
        config: configuration,
        options,
    };
    match conform_tui::run(console_api(config)?, screen).await? {
        ScreenOutcome::Connector(submission) => {
            info!(name = %submission.name, "connector form submitted");
            println!("{}", serde_json::to_string_pretty(&submission)?);
        }
        other => eprintln!("Connector form closed without submitting ({other:?})"),
    }
    Ok(())
}

fn run_check(matches: &ArgMatches) -> Result<()> {
    let path = file_arg(matches, "file").context("a connection configuration file is required")?;
    let configuration: ConnectionConfiguration = read_document(&path)?;
    let values = file_arg(matches, "values")
        .map(|path| read_document::<FormValues>(&path))
        .transpose()?;
    let report = check_report(configuration, values)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Initial values, every validation error, and the submission gate for a
/// configuration filled with `values`.
fn check_report(configuration: ConnectionConfiguration, values: Option<FormValues>) -> Result<serde_json::Value> {
    let options = ConnectorFormOptions {
        defaults: values,
        ..ConnectorFormOptions::default()
    };
    let mut form =
        ConnectorForm::new(configuration, options, Box::new(DetachedSink)).context("invalid connection configuration")?;
    form.touch_all();
    Ok(json!({
        "values": form.values(),
        "errors": form.state().errors(),
        "submittable": form.is_submittable(),
    }))
}

async fn run_starters(config: &ConsoleConfig, matches: &ArgMatches) -> Result<()> {
    let path = file_arg(matches, "file").context("a starter message file is required")?;
    let messages = if path.exists() {
        read_starter_file(&path)?
    } else if matches.get_flag("edit") {
        Vec::new()
    } else {
        bail!("starter message file {} does not exist", path.display());
    };

    if !matches.get_flag("edit") {
        let mut list = StarterMessageList::new(messages);
        list.initialize();
        println!("{}", serde_json::to_string_pretty(list.messages())?);
        return Ok(());
    }

    let screen = Screen::Starters {
        path: path.clone(),
        messages,
    };
    match conform_tui::run(console_api(config)?, screen).await? {
        ScreenOutcome::Starters(messages) => {
            write_starter_file(&path, &messages)?;
            info!(count = messages.len(), path = %path.display(), "starter messages saved");
            eprintln!("Saved {} starter messages to {}", messages.len(), path.display());
        }
        other => eprintln!("Starter editor closed without saving ({other:?})"),
    }
    Ok(())
}

async fn run_impersonate(config: &ConsoleConfig, matches: &ArgMatches) -> Result<()> {
    let api = console_api(config)?;
    let (Some(email), Some(api_key)) = (
        matches.get_one::<String>("email").cloned(),
        matches.get_one::<String>("api-key").cloned(),
    ) else {
        match conform_tui::run(api, Screen::Impersonate).await? {
            ScreenOutcome::Redirect(route) => bail!("impersonation is restricted to cloud superusers (redirected to {route})"),
            ScreenOutcome::Impersonated => eprintln!("Impersonation request sent; see the log for the response"),
            other => debug!(?other, "impersonation page closed"),
        }
        return Ok(());
    };

    let session = SessionState::resolved(fetch_current_user(api.as_ref()).await);
    match impersonation_access(&session) {
        RouteDecision::Render => {
            send_impersonation(api.as_ref(), ImpersonateRequest { email, api_key }).await;
            eprintln!("Impersonation request sent; see the log for the response");
            Ok(())
        }
        RouteDecision::Redirect(route) => {
            warn!(route, "impersonation refused");
            bail!("impersonation is restricted to cloud superusers (redirected to {route})")
        }
        RouteDecision::Pending => bail!("session could not be resolved"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_types::{FieldKind, FieldSchema, FieldValue};

    fn configuration() -> ConnectionConfiguration {
        ConnectionConfiguration {
            description: "Site".into(),
            subtext: None,
            values: vec![
                FieldSchema::new("host", "Host", FieldKind::Text),
                FieldSchema::new("port", "Port", FieldKind::Text).optional(),
            ],
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn only_interactive_commands_log_to_file() {
        let matches = build_cli().get_matches_from(["conform", "form", "site.yaml"]);
        assert!(uses_terminal_ui(&matches));
        let matches = build_cli().get_matches_from(["conform", "starters", "s.json"]);
        assert!(!uses_terminal_ui(&matches));
        let matches = build_cli().get_matches_from(["conform", "impersonate", "--email", "a@b.io", "--api-key", "k"]);
        assert!(!uses_terminal_ui(&matches));
    }

    #[test]
    fn check_reports_missing_required_fields() {
        let report = check_report(configuration(), None).unwrap();
        assert_eq!(report["submittable"], json!(false));
        assert!(report["errors"].get("host").is_some());
        assert_eq!(report["values"]["port"], json!(""));
    }

    #[test]
    fn check_accepts_filled_values() {
        let mut values = FormValues::new();
        values.insert("name".into(), FieldValue::from("site"));
        values.insert("host".into(), FieldValue::from("example.com"));
        let report = check_report(configuration(), Some(values)).unwrap();
        assert_eq!(report["submittable"], json!(true));
        assert_eq!(report["errors"], json!({}));
    }

    #[test]
    fn reads_yaml_and_json_documents() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("site.yaml");
        fs::write(&yaml, "description: Site\nvalues:\n  - name: host\n    label: Host\n    type: text\n").unwrap();
        let parsed: ConnectionConfiguration = read_document(&yaml).unwrap();
        assert_eq!(parsed.values[0].name, "host");

        let json_path = dir.path().join("values.json");
        fs::write(&json_path, r#"{ "host": "example.com" }"#).unwrap();
        let values: FormValues = read_document(&json_path).unwrap();
        assert_eq!(values["host"], FieldValue::Text("example.com".into()));
    }
}
