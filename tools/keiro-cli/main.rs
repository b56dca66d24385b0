use clap::{Parser, Subcommand};
use keiro::prelude::*;
use std::fs;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Inspect and check workflow definitions exported from the persistence API
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to an editor config JSON file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to a device catalog JSON file (an array of device models)
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the derived step graph as JSON
    Graph {
        /// Path to the workflow JSON file
        workflow_path: String,
    },
    /// Run the standard validation schema and list every error
    Validate { workflow_path: String },
    /// Print the create/update payload for the workflow
    Payload {
        workflow_path: String,
        /// Kiosk version to bind instead of the workflow's own
        #[arg(long)]
        kiosk_version: Option<String>,
    },
    /// Check a connection between two step codes and commit it as a callback
    Connect {
        workflow_path: String,
        source: String,
        target: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = match &cli.config {
        Some(path) => EditorConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => EditorConfig::default(),
    };
    let catalog = match &cli.catalog {
        Some(path) => load_catalog(path),
        None => DeviceCatalog::default(),
    };

    match cli.command {
        Command::Graph { workflow_path } => {
            let store = open_store(&workflow_path, &config, catalog);
            print_json(store.graph());
        }
        Command::Validate { workflow_path } => {
            let mut store = open_store(&workflow_path, &config, catalog);
            run_validation(&mut store, &config);
        }
        Command::Payload {
            workflow_path,
            kiosk_version,
        } => {
            let mut store = open_store(&workflow_path, &config, catalog);
            let schema = StandardSchema::new(config.schema);
            match store.submit(&schema, kiosk_version.as_deref()) {
                Ok(payload) => print_json(&payload),
                Err(e) => exit_with_error(&format!("Workflow is not valid: {}", e)),
            }
        }
        Command::Connect {
            workflow_path,
            source,
            target,
        } => {
            let mut store = open_store(&workflow_path, &config, catalog);
            let mut canvas = EditableGraph::new(store.graph());
            if let Err(rejection) = canvas.connect(Connection::new(&source, &target)) {
                exit_with_error(&rejection.to_string());
            }
            if !store.bind_callback(&StepCode::new(&source), &StepCode::new(&target)) {
                exit_with_error(&format!(
                    "Step '{}' already calls back to another step",
                    source
                ));
            }
            print_json(store.workflow());
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(path: &str, config: &EditorConfig, catalog: DeviceCatalog) -> StepStore {
    let start = Instant::now();
    let json = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read workflow file '{}': {}", path, e)));
    let payload: WorkflowPayload = serde_json::from_str(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse workflow JSON: {}", e)));
    let workflow = payload
        .into_workflow()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert workflow: {}", e)));

    let store = StepStore::builder()
        .with_config(config.clone())
        .with_catalog(Arc::new(catalog))
        .load(workflow);
    tracing::info!(
        path,
        steps = store.steps().len(),
        elapsed = ?start.elapsed(),
        "loaded workflow"
    );
    store
}

fn load_catalog(path: &str) -> DeviceCatalog {
    let json = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read catalog file '{}': {}", path, e)));
    let models: Vec<DeviceModel> = serde_json::from_str(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse catalog JSON: {}", e)));
    DeviceCatalog::new(models)
}

fn run_validation(store: &mut StepStore, config: &EditorConfig) {
    let schema = StandardSchema::new(config.schema);
    match store.submit(&schema, None) {
        Ok(_) => println!("Workflow '{}' is valid.", store.workflow().name),
        Err(SubmissionError::Invalid { errors, first_step }) => {
            println!("Found {} validation error(s):", errors.len());
            for (path, message) in errors.iter() {
                println!("  - {}: {}", path, message);
            }
            if let Some(index) = first_step {
                println!("\nFirst step with errors: #{}", index);
            }
            std::process::exit(2);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    let out = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize output: {}", e)));
    println!("{}", out);
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
