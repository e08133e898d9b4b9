//! # VMEXTCTL CLI
//!
//! Command-line driver for the Azure Virtual Machine Extension adapter.
//!
//! The configuration file is YAML or JSON and holds the resource attributes;
//! state is persisted as JSON between runs, the way a declarative host would
//! persist it.
//!
//! ## Usage
//!
//! ```bash
//! # Check a configuration file
//! vmextctl validate extension.yaml
//!
//! # Show what apply would change
//! vmextctl plan extension.yaml --state extension.state.json
//!
//! # Create or update the extension
//! vmextctl apply extension.yaml --state extension.state.json
//!
//! # Refresh state from Azure
//! vmextctl read --state extension.state.json
//!
//! # Adopt an existing extension
//! vmextctl import /subscriptions/.../virtualMachines/vm1/extensions/ext1 --state extension.state.json
//!
//! # Delete the extension
//! vmextctl destroy --state extension.state.json
//! ```
//!
//! Azure settings come from the environment (`ARM_SUBSCRIPTION_ID`,
//! `ARM_CLIENT_ID`, `ARM_ENDPOINT`, ...).

use anyhow::{bail, Context, Result};
use azurerm_vm_extension::constants::RESOURCE_TYPE;
use azurerm_vm_extension::observability::{gather_metrics, init_tracing, register_metrics};
use azurerm_vm_extension::provider::azure::ComputeRestClient;
use azurerm_vm_extension::schema::{self, attributes, PlanAction};
use azurerm_vm_extension::{
    AdapterConfig, ExtensionConfig, ResourceData, ResourceOptions,
    VirtualMachineExtensionResource,
};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_STATE_FILE: &str = "vmextension.state.json";

/// Azure Virtual Machine Extension CLI
#[derive(Parser)]
#[command(name = "vmextctl")]
#[command(
    about = "Manage Azure Virtual Machine Extensions from a configuration file",
    long_about = None,
    after_help = "\
Examples:
  vmextctl validate extension.yaml
  vmextctl apply extension.yaml --state ext.state.json
  vmextctl destroy --state ext.state.json
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print Prometheus metrics to stderr when the command finishes
    #[arg(long, global = true)]
    print_metrics: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file without contacting Azure
    Validate {
        /// YAML or JSON configuration file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Show the changes apply would make
    Plan {
        /// YAML or JSON configuration file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// State file from a previous apply
        #[arg(long, default_value = DEFAULT_STATE_FILE)]
        state: PathBuf,
    },
    /// Create or update the extension described by a configuration file
    Apply {
        /// YAML or JSON configuration file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// State file to read and update
        #[arg(long, default_value = DEFAULT_STATE_FILE)]
        state: PathBuf,
    },
    /// Refresh state from Azure
    Read {
        /// State file to refresh
        #[arg(long, default_value = DEFAULT_STATE_FILE)]
        state: PathBuf,
    },
    /// Start managing an existing extension
    Import {
        /// Extension resource ID
        #[arg(value_name = "ID")]
        id: String,

        /// State file to write
        #[arg(long, default_value = DEFAULT_STATE_FILE)]
        state: PathBuf,
    },
    /// Delete the extension recorded in a state file
    Destroy {
        /// State file of the extension
        #[arg(long, default_value = DEFAULT_STATE_FILE)]
        state: PathBuf,
    },
    /// Print the JSON schema of the configuration file
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Configure rustls crypto provider FIRST, before any other operations
    // Required for rustls 0.23+ when no default provider is set via features
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        bail!("Failed to install rustls crypto provider");
    }

    let config = AdapterConfig::from_env();
    init_tracing(&config);

    let cli = Cli::parse();

    if config.enable_metrics || cli.print_metrics {
        register_metrics().context("Failed to register metrics")?;
    }

    let result = match cli.command {
        Commands::Validate { file } => validate_command(&file),
        Commands::Plan { file, state } => plan_command(&file, &state),
        Commands::Apply { file, state } => apply_command(&config, &file, &state).await,
        Commands::Read { state } => read_command(&config, &state).await,
        Commands::Import { id, state } => import_command(&config, &id, &state).await,
        Commands::Destroy { state } => destroy_command(&config, &state).await,
        Commands::Schema => schema_command(),
    };

    if cli.print_metrics {
        eprintln!("{}", gather_metrics()?);
    }

    result
}

fn validate_command(file: &Path) -> Result<()> {
    let data = load_config(file)?;
    let diagnostics = schema::validate(&data);
    if diagnostics.is_empty() {
        println!("✅ {} is valid", file.display());
        return Ok(());
    }

    for diagnostic in &diagnostics {
        println!("❌ {diagnostic}");
    }
    bail!(
        "{} has {} configuration problem(s)",
        file.display(),
        diagnostics.len()
    )
}

fn plan_command(file: &Path, state: &Path) -> Result<()> {
    let proposed = load_config(file)?;
    ExtensionConfig::decode(&proposed)?;
    let prior = load_state(state)?.unwrap_or_default();

    let plan = schema::plan(&prior, &proposed);
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

async fn apply_command(config: &AdapterConfig, file: &Path, state: &Path) -> Result<()> {
    let mut data = load_config(file)?;
    let mut prior = load_state(state)?.unwrap_or_default();
    let plan = schema::plan(&prior, &data);

    if plan.action == PlanAction::NoChange {
        println!("No changes. Virtual Machine Extension is up to date.");
        return Ok(());
    }

    let resource = build_resource(config)?;

    if plan.action == PlanAction::Replace {
        info!("Replacing Virtual Machine Extension {}", prior.id().unwrap_or_default());
        resource
            .delete(&mut prior)
            .await
            .context("Failed to delete Virtual Machine Extension before replacement")?;
    }

    resource
        .create(&mut data)
        .await
        .context("Failed to apply Virtual Machine Extension")?;

    match data.id() {
        Some(id) => println!("✅ Applied {id}"),
        None => warn!("Virtual Machine Extension disappeared right after apply"),
    }
    save_state(state, &data)
}

async fn read_command(config: &AdapterConfig, state: &Path) -> Result<()> {
    let mut data = load_state(state)?
        .with_context(|| format!("No state found at {}", state.display()))?;

    build_resource(config)?
        .read(&mut data)
        .await
        .context("Failed to read Virtual Machine Extension")?;

    if data.id().is_none() {
        println!("Virtual Machine Extension no longer exists; it will be recreated on next apply");
    }
    save_state(state, &data)
}

async fn import_command(config: &AdapterConfig, id: &str, state: &Path) -> Result<()> {
    let resource = build_resource(config)?;
    let mut data = resource.import(id).context("Failed to import Virtual Machine Extension")?;

    resource
        .read(&mut data)
        .await
        .context("Failed to read imported Virtual Machine Extension")?;

    if data.id().is_none() {
        bail!("Virtual Machine Extension {id} does not exist");
    }
    println!("✅ Imported {id}");
    save_state(state, &data)
}

async fn destroy_command(config: &AdapterConfig, state: &Path) -> Result<()> {
    let mut data = load_state(state)?
        .with_context(|| format!("No state found at {}", state.display()))?;

    build_resource(config)?
        .delete(&mut data)
        .await
        .context("Failed to delete Virtual Machine Extension")?;

    std::fs::remove_file(state)
        .with_context(|| format!("Failed to remove state file {}", state.display()))?;
    println!("✅ Destroyed");
    Ok(())
}

fn schema_command() -> Result<()> {
    let mut schema = schemars::schema_for!(ExtensionConfig);
    schema.insert("title".to_string(), RESOURCE_TYPE.into());
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn build_resource(
    config: &AdapterConfig,
) -> Result<VirtualMachineExtensionResource<ComputeRestClient>> {
    let client = ComputeRestClient::new(config).context("Failed to create Azure Compute client")?;
    Ok(VirtualMachineExtensionResource::new(
        Arc::new(client),
        ResourceOptions::from_config(config),
    ))
}

/// Read a YAML or JSON configuration file into a handle
///
/// Settings written as nested maps are rendered to JSON text.
fn load_config(path: &Path) -> Result<ResourceData> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
    let value: Value = serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse configuration file {}", path.display()))?;

    let Value::Object(mut values) = value else {
        bail!("Configuration file {} must contain a mapping", path.display());
    };
    render_nested_settings(&mut values)?;
    Ok(ResourceData::from_attributes(values))
}

fn render_nested_settings(values: &mut Map<String, Value>) -> Result<()> {
    for key in [attributes::SETTINGS, attributes::PROTECTED_SETTINGS] {
        if let Some(value) = values.get_mut(key) {
            if value.is_object() {
                *value = Value::String(serde_json::to_string(value)?);
            }
        }
    }
    Ok(())
}

fn load_state(path: &Path) -> Result<Option<ResourceData>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file {}", path.display()))?;
    let data = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse state file {}", path.display()))?;
    Ok(Some(data))
}

fn save_state(path: &Path, data: &ResourceData) -> Result<()> {
    let text = serde_json::to_string_pretty(data)?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write state file {}", path.display()))
}
