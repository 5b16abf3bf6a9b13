use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use ignite_engine::{
    Collaborators, ComponentRegistry, EngineConfig, EntitySnapshot, Presenter, Renderer, Session, Transport, TransportError, TreeBuilder,
};
use ignite_types::{AlertRequest, Category, DataProviderRequest, FunctionCall, parse_document_file};
use ignite_util::redact_headers;
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let matches = build_cli().get_matches();
    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("inspect", sub)) => inspect(&config, sub),
        Some(("types", sub)) => list_types(&config, sub),
        Some(("run", sub)) => run(config, sub).await,
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// `RUST_LOG` directives, or `info` when unset or unparsable.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn build_cli() -> Command {
    let file = Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Path to a JSON or YAML document");

    Command::new("ignite")
        .about("Resolve declarative component documents and dispatch their events")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .action(ArgAction::Set)
                .value_parser(value_parser!(PathBuf))
                .help("Engine configuration file (defaults to $IGNITE_CONFIG_PATH or the user config directory)"),
        )
        .subcommand(
            Command::new("inspect")
                .about("Build a document and print its tree and build errors")
                .arg(file.clone()),
        )
        .subcommand(
            Command::new("types").about("List registered class names per category").arg(
                Arg::new("category")
                    .long("category")
                    .short('c')
                    .action(ArgAction::Set)
                    .value_parser(value_parser!(Category))
                    .help("Only list one category"),
            ),
        )
        .subcommand(
            Command::new("run")
                .about("Open a session, raise events and print the delivery journal")
                .arg(file)
                .arg(
                    Arg::new("raise")
                        .long("raise")
                        .short('r')
                        .action(ArgAction::Append)
                        .help("Event to raise as <entity>:<event>; repeatable and raised in order"),
                )
                .arg(
                    Arg::new("load")
                        .long("load")
                        .short('l')
                        .action(ArgAction::Append)
                        .help("Data provider to load before raising events; repeatable"),
                )
                .arg(
                    Arg::new("wait-ms")
                        .long("wait-ms")
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(u64))
                        .default_value("0")
                        .help("Keep the session open this long so delayed and repeated actions can fire"),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> Result<EngineConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => EngineConfig::load_from(path).with_context(|| format!("Failed to load engine configuration: {}", path.display())),
        None => Ok(EngineConfig::load()),
    }
}

fn registry(config: &EngineConfig) -> Result<ComponentRegistry> {
    ComponentRegistry::with_builtins(&config.registry).context("Failed to register built-in components")
}

fn inspect(config: &EngineConfig, matches: &ArgMatches) -> Result<()> {
    let path = matches.get_one::<PathBuf>("file").context("missing document path")?;
    let document = parse_document_file(path)?;
    let registry = registry(config)?;
    let evaluator = ignite_engine::ConditionEvaluator;
    let report = TreeBuilder::new(&registry, &evaluator, &config.dispatch).build(&document);

    let out = json!({
        "tree": report.tree.root_snapshot(),
        "errors": report.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn list_types(config: &EngineConfig, matches: &ArgMatches) -> Result<()> {
    let registry = registry(config)?;
    let categories = match matches.get_one::<Category>("category") {
        Some(category) => vec![*category],
        None => Category::ALL.to_vec(),
    };

    let mut out = serde_json::Map::new();
    for category in categories {
        let entries = registry
            .registered_types(category)
            .into_iter()
            .map(|entry| json!({ "type": entry.type_name, "class_name": entry.class_name }))
            .collect();
        out.insert(category.to_string(), Value::Array(entries));
    }
    println!("{}", serde_json::to_string_pretty(&Value::Object(out))?);
    Ok(())
}

async fn run(config: EngineConfig, matches: &ArgMatches) -> Result<()> {
    let path = matches.get_one::<PathBuf>("file").context("missing document path")?;
    let document = parse_document_file(path)?;
    let raises = matches
        .get_many::<String>("raise")
        .into_iter()
        .flatten()
        .map(String::as_str)
        .map(parse_raise)
        .collect::<Result<Vec<_>>>()?;
    let wait = Duration::from_millis(matches.get_one::<u64>("wait-ms").copied().unwrap_or(0));

    let logger = Arc::new(LoggingCollaborator);
    let collaborators = Collaborators::default()
        .with_renderer(logger.clone())
        .with_presenter(logger)
        .with_transport(Arc::new(LoopbackTransport));
    let session = Session::builder(config.clone())
        .registry(registry(&config)?)
        .collaborators(collaborators)
        .open(document)
        .await
        .with_context(|| format!("Failed to open a session for {}", path.display()))?;

    for provider in matches.get_many::<String>("load").into_iter().flatten() {
        session.load(provider).with_context(|| format!("Failed to load data provider '{provider}'"))?;
    }
    for (source, event) in &raises {
        session
            .raise(source, event, None)
            .with_context(|| format!("Failed to raise '{event}' on '{source}'"))?;
    }
    session.settle().await;
    if !wait.is_zero() {
        tokio::time::sleep(wait).await;
        session.settle().await;
    }
    session.teardown();

    let out = json!({
        "build_errors": session.build_errors().iter().map(ToString::to_string).collect::<Vec<_>>(),
        "journal": session.journal(),
        "tree": session.snapshot(),
        "app": session.app(),
        "session": session.session_store(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

/// Splits `<entity>:<event>`.
fn parse_raise(raw: &str) -> Result<(String, String)> {
    let (source, event) = raw
        .rsplit_once(':')
        .with_context(|| format!("'{raw}' is not of the form <entity>:<event>"))?;
    let (source, event) = (source.trim(), event.trim());
    anyhow::ensure!(!source.is_empty() && !event.is_empty(), "'{raw}' is not of the form <entity>:<event>");
    Ok((source.to_string(), event.to_string()))
}

/// Renderer and presenter that log what a host would draw.
struct LoggingCollaborator;

impl Renderer for LoggingCollaborator {
    fn render(&self, root: &EntitySnapshot) {
        info!(root = %root.id, controls = root.controls.len(), "render");
    }

    fn update(&self, node: &EntitySnapshot, animated: bool) {
        info!(node = %node.id, animated, "update");
    }

    fn refresh(&self, node_id: &str) {
        info!(node = %node_id, "refresh");
    }

    fn invoke_function(&self, call: &FunctionCall) -> Result<(), String> {
        info!(node = %call.target, function = %call.function_name, "function");
        Ok(())
    }
}

impl Presenter for LoggingCollaborator {
    fn present_alert(&self, alert: &AlertRequest) {
        info!(source = %alert.source, title = ?alert.title, sub_title = ?alert.sub_title, "alert");
    }
}

/// Answers every load with the request it received.
struct LoopbackTransport;

#[async_trait]
impl Transport for LoopbackTransport {
    async fn load(&self, mut request: DataProviderRequest) -> Result<Value, TransportError> {
        request.headers = redact_headers(&request.headers);
        serde_json::to_value(&request).map_err(|error| TransportError::error(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_arguments_split_on_the_last_colon() {
        assert_eq!(parse_raise("button:touch").unwrap(), ("button".into(), "touch".into()));
        assert_eq!(parse_raise("ns:button:touch").unwrap(), ("ns:button".into(), "touch".into()));
        assert!(parse_raise("button").is_err());
        assert!(parse_raise("button:").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn log_filter_follows_rust_log() {
        use tracing_subscriber::filter::LevelFilter;

        temp_env::with_var("RUST_LOG", Some("debug"), || {
            assert_eq!(log_filter().max_level_hint(), Some(LevelFilter::DEBUG));
        });
        temp_env::with_var("RUST_LOG", None::<&str>, || {
            assert_eq!(log_filter().max_level_hint(), Some(LevelFilter::INFO));
        });
    }
}
