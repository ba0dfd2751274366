use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Deserialize;

use azrm_core::provider::ResourceType;
use azrm_core::resource::Value;
use azrm_core::resource_id::arm::ArmResourceId;
use azrm_core::resource_id::{ResourceId, ResourceIdSchema};
use azrm_provider::ProviderConfig;
use azrm_provider::config::SUBSCRIPTION_ID_ENV;
use azrm_provider::ids::{ManagedEnvironmentId, NetworkManagerId, UserAssignedIdentityId};
use azrm_provider::resources::{resource_type, resource_types};

#[derive(Parser)]
#[command(name = "azrm")]
#[command(about = "Azure Resource Manager resource IDs and schemas", long_about = None)]
struct Cli {
    /// Subscription used when building resource IDs
    #[arg(long, global = true, env = SUBSCRIPTION_ID_ENV)]
    subscription_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported resource types
    Types,
    /// Show the attribute schema of a resource type
    Schema {
        /// Resource type (e.g., azurerm_kusto_cluster)
        resource_type: String,
    },
    /// Resource ID commands
    Id {
        #[command(subcommand)]
        command: IdCommands,
    },
    /// Validate a JSON configuration file
    Validate {
        /// Path to the configuration file
        #[arg(default_value = "main.json")]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum IdCommands {
    /// Parse a resource ID into its fields
    Parse {
        resource_type: String,
        id: String,
        /// Accept literal segments in any casing
        #[arg(long)]
        insensitive: bool,
        /// Print the fields as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build a resource ID from field values, in order
    Format {
        resource_type: String,
        values: Vec<String>,
    },
    /// Check a resource ID without printing its fields
    Validate { resource_type: String, id: String },
    /// Break down any ARM resource ID
    Inspect { id: String },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = ProviderConfig::from_env();
    if let Some(subscription_id) = cli.subscription_id {
        config.subscription_id = subscription_id;
    }

    let result = match cli.command {
        Commands::Types => run_types(&config),
        Commands::Schema { resource_type } => run_schema(&config, &resource_type),
        Commands::Id { command } => run_id_command(&config, command),
        Commands::Validate { file } => run_validate(&config, &file),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

// =============================================================================
// Resource Types
// =============================================================================

fn run_types(config: &ProviderConfig) -> Result<(), String> {
    for resource_type in resource_types(config) {
        println!(
            "{}  {}",
            resource_type.name().cyan().bold(),
            resource_type.id_schema().template()
        );
    }
    Ok(())
}

fn run_schema(config: &ProviderConfig, name: &str) -> Result<(), String> {
    let resource_type = resource_type(config, name)
        .ok_or_else(|| format!("Unknown resource type: {}", name))?;
    let schema = resource_type.schema();

    println!("{}", schema.resource_type.cyan().bold());
    if let Some(description) = &schema.description {
        println!("  {}", description);
    }
    println!("  ID: {}", resource_type.id_schema().template());
    println!();

    for attr in schema.sorted_attributes() {
        println!("  {}: {}{}", attr.name.bold(), attr.attr_type, attribute_flags(attr));
    }
    Ok(())
}

fn attribute_flags(attr: &azrm_core::schema::AttributeSchema) -> String {
    let mut flags = Vec::new();
    if attr.required {
        flags.push("required".to_string());
    }
    if attr.computed {
        flags.push("computed".to_string());
    }
    if attr.force_new {
        flags.push("force new".to_string());
    }
    if attr.sensitive {
        flags.push("sensitive".to_string());
    }
    if let Some(default) = &attr.default {
        flags.push(format!("default {}", default.to_json()));
    }
    if flags.is_empty() {
        String::new()
    } else {
        format!(" ({})", flags.join(", ")).dimmed().to_string()
    }
}

// =============================================================================
// Resource IDs
// =============================================================================

/// ID schemas addressable from the command line
///
/// Every resource type plus the parents and references their attributes take.
fn id_schema(config: &ProviderConfig, name: &str) -> Result<&'static ResourceIdSchema, String> {
    if let Some(resource_type) = resource_type(config, name) {
        return Ok(resource_type.id_schema());
    }
    match name {
        "azurerm_container_app_environment" => Ok(ManagedEnvironmentId::schema()),
        "azurerm_network_manager" => Ok(NetworkManagerId::schema()),
        "azurerm_user_assigned_identity" => Ok(UserAssignedIdentityId::schema()),
        _ => Err(format!("Unknown resource type: {}", name)),
    }
}

fn run_id_command(config: &ProviderConfig, command: IdCommands) -> Result<(), String> {
    match command {
        IdCommands::Parse {
            resource_type,
            id,
            insensitive,
            json,
        } => {
            let id = parse_id(config, &resource_type, &id, insensitive)?;
            if json {
                let fields = id_fields_json(&id);
                let output = serde_json::to_string_pretty(&fields).map_err(|e| e.to_string())?;
                println!("{}", output);
            } else {
                println!("{}", id.schema().name().cyan().bold());
                for (field, value) in id.schema().fields().zip(id.values()) {
                    println!("  {}: {}", field.bold(), value);
                }
            }
            Ok(())
        }
        IdCommands::Format {
            resource_type,
            values,
        } => {
            println!("{}", format_id(config, &resource_type, &values)?);
            Ok(())
        }
        IdCommands::Validate { resource_type, id } => {
            id_schema(config, &resource_type)?
                .validate(&id)
                .map_err(|e| e.to_string())?;
            println!("{}", format!("✓ valid {} ID", resource_type).green());
            Ok(())
        }
        IdCommands::Inspect { id } => {
            let parsed = ArmResourceId::parse(&id).map_err(|e| e.to_string())?;
            println!("  {}: {}", "subscription".bold(), parsed.subscription_id);
            if let Some(group) = &parsed.resource_group {
                println!("  {}: {}", "resource group".bold(), group);
            }
            if let Some(provider) = &parsed.provider {
                println!("  {}: {}", "provider".bold(), provider);
            }
            if let Some(resource_type) = parsed.resource_type() {
                println!("  {}: {}", "type".bold(), resource_type);
            }
            if let Some(name) = parsed.name() {
                println!("  {}: {}", "name".bold(), name);
            }
            Ok(())
        }
    }
}

fn parse_id(
    config: &ProviderConfig,
    resource_type: &str,
    id: &str,
    insensitive: bool,
) -> Result<ResourceId, String> {
    let schema = id_schema(config, resource_type)?;
    let parsed = if insensitive {
        schema.parse_insensitively(id)
    } else {
        schema.parse(id)
    };
    parsed.map_err(|e| e.to_string())
}

fn id_fields_json(id: &ResourceId) -> serde_json::Map<String, serde_json::Value> {
    id.schema()
        .fields()
        .zip(id.values())
        .map(|(field, value)| (field.to_string(), serde_json::Value::String(value.clone())))
        .collect()
}

fn format_id(
    config: &ProviderConfig,
    resource_type: &str,
    values: &[String],
) -> Result<String, String> {
    let schema = id_schema(config, resource_type)?;
    if values.len() != schema.field_count() {
        return Err(format!(
            "{} takes {} values ({}), got {}",
            resource_type,
            schema.field_count(),
            schema.fields().collect::<Vec<_>>().join(", "),
            values.len()
        ));
    }
    schema.format(values).map_err(|e| e.to_string())
}

// =============================================================================
// Configuration Files
// =============================================================================

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    resources: Vec<ResourceConfig>,
}

#[derive(Debug, Deserialize)]
struct ResourceConfig {
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    #[serde(default)]
    attributes: HashMap<String, serde_json::Value>,
}

fn load_config(file: &Path) -> Result<ConfigFile, String> {
    let content = fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("Parse error: {}", e))
}

/// Validate every resource, returning the ID each one would get
fn validate_resources(
    config: &ProviderConfig,
    resources: &[ResourceConfig],
) -> Result<Vec<(String, String)>, String> {
    let mut ids = Vec::new();
    let mut all_errors = Vec::new();

    for resource in resources {
        let address = format!("{}.{}", resource.resource_type, resource.name);
        let Some(resource_type) = resource_type(config, &resource.resource_type) else {
            all_errors.push(format!(
                "{}: Unknown resource type: {}",
                address, resource.resource_type
            ));
            continue;
        };

        let mut attributes = HashMap::new();
        for (key, json) in &resource.attributes {
            match Value::from_json(json) {
                Some(value) => {
                    attributes.insert(key.clone(), value);
                }
                None => all_errors.push(format!("{}: unsupported value for `{}`", address, key)),
            }
        }

        let schema = resource_type.schema();
        schema.apply_defaults(&mut attributes);
        if let Err(errors) = schema.validate(&attributes) {
            for error in errors {
                all_errors.push(format!("{}: {}", address, error));
            }
            continue;
        }

        match resource_type
            .resource_id(&config.subscription_id, &attributes)
            .and_then(|id| Ok(id.id()?))
        {
            Ok(id) => ids.push((address, id)),
            Err(e) => all_errors.push(format!("{}: {}", address, e)),
        }
    }

    if all_errors.is_empty() {
        Ok(ids)
    } else {
        Err(all_errors.join("\n"))
    }
}

fn run_validate(config: &ProviderConfig, file: &Path) -> Result<(), String> {
    let parsed = load_config(file)?;

    println!("{}", "Validating...".cyan());

    let ids = validate_resources(config, &parsed.resources)?;

    println!(
        "{}",
        format!("✓ {} resources validated successfully.", ids.len())
            .green()
            .bold()
    );

    for (address, id) in &ids {
        println!("  • {} {}", address, id.dimmed());
    }

    Ok(())
}
