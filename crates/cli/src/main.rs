use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use ncrp::FormDefinition;
use oncoreg_core::constants::{DEFAULT_TIER_ENV, INCIDENCE_DEFINITION_ENV, MORTALITY_DEFINITION_ENV};
use oncoreg_core::{
    definition_path_from_env_value, load_schema, tier_from_env_value, CoreConfig, FormKind,
    FormRecord, FormSchema, Tier,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "oncoreg")]
#[command(about = "Field visibility and validation for the NCRP core registry forms")]
struct Cli {
    /// Form to work with
    #[arg(long, value_enum, default_value_t = FormArg::Incidence, global = true)]
    form: FormArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormArg {
    Incidence,
    Mortality,
}

impl From<FormArg> for FormKind {
    fn from(value: FormArg) -> Self {
        match value {
            FormArg::Incidence => FormKind::Incidence,
            FormArg::Mortality => FormKind::Mortality,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TierArg {
    Mandatory,
    Recommended,
    All,
}

impl From<TierArg> for Tier {
    fn from(value: TierArg) -> Self {
        match value {
            TierArg::Mandatory => Tier::Mandatory,
            TierArg::Recommended => Tier::Recommended,
            TierArg::All => Tier::All,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the classification of a field path
    Classify {
        /// Field path, e.g. placeOfResidence.urban.pinCode or otherSources[0].code
        path: String,
    },
    /// List the sections and fields shown at a tier
    Visible {
        /// Visibility tier (defaults to ONCOREG_DEFAULT_TIER)
        #[arg(long, value_enum)]
        tier: Option<TierArg>,
        /// Form record (JSON or YAML); limits output to active branches
        #[arg(long)]
        record: Option<PathBuf>,
    },
    /// Print the active branch of every section with a discriminator
    Branches {
        /// Form record (JSON or YAML)
        #[arg(long)]
        record: PathBuf,
    },
    /// Validate a form record; exits with status 1 when invalid
    Validate {
        /// Form record (JSON or YAML)
        #[arg(long)]
        record: PathBuf,
    },
    /// Print the effective form definition as YAML
    ExportDefinition,
}

/// Command line entry point.
///
/// # Environment Variables
/// - `ONCOREG_DEFAULT_TIER`: tier used by `visible` without `--tier` (default: "mandatory")
/// - `ONCOREG_INCIDENCE_DEFINITION`: YAML definition replacing the incidence table
/// - `ONCOREG_MORTALITY_DEFINITION`: YAML definition replacing the mortality table
fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("oncoreg=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = CoreConfig::new(
        tier_from_env_value(std::env::var(DEFAULT_TIER_ENV).ok())?,
        definition_path_from_env_value(std::env::var(INCIDENCE_DEFINITION_ENV).ok()),
        definition_path_from_env_value(std::env::var(MORTALITY_DEFINITION_ENV).ok()),
    )?;
    let schema = load_schema(&config, cli.form.into())?;

    match cli.command {
        Commands::Classify { path } => {
            let classification = schema
                .classify(&path)
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unclassified".into());
            println!("{path}: {classification}");
        }
        Commands::Visible { tier, record } => {
            let tier = tier.map(Tier::from).unwrap_or(config.default_tier());
            let record = record.as_deref().map(read_record).transpose()?;
            print_visible(&schema, tier, record.as_ref());
        }
        Commands::Branches { record } => {
            let record = read_record(&record)?;
            for section in schema.sections().iter() {
                let Some(discriminator) = section.discriminator() else {
                    continue;
                };
                let branch = schema
                    .active_branch(section.id(), &record)
                    .map(|b| format!("{b} ({})", b.code()))
                    .unwrap_or_else(|| "none".into());
                println!("{} [{}]: {branch}", section.id(), discriminator.path);
            }
        }
        Commands::Validate { record } => {
            let record = read_record(&record)?;
            let result = schema.validate(&record);
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.is_valid() {
                tracing::info!(errors = result.len(), "form record is not valid");
                return Ok(ExitCode::from(1));
            }
        }
        Commands::ExportDefinition => {
            print!("{}", FormDefinition::render(&schema.to_definition())?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_visible(schema: &FormSchema, tier: Tier, record: Option<&FormRecord>) {
    println!("{} at tier '{tier}'", schema.kind().title());

    for section in schema.sections().iter() {
        if !schema.section_has_visible_field(section.id(), tier) {
            continue;
        }

        let fields = match record {
            Some(record) => {
                if !schema.sections().is_section_active(section.id(), record) {
                    println!("{} ({}): inactive", section.id(), section.title());
                    continue;
                }
                match schema.active_branch(section.id(), record) {
                    Some(branch) => {
                        println!("{} ({}): branch {branch}", section.id(), section.title())
                    }
                    None => println!("{} ({})", section.id(), section.title()),
                }
                schema.sections().section_active_fields(section.id(), record)
            }
            None => {
                println!("{} ({})", section.id(), section.title());
                section.all_fields().collect()
            }
        };

        for field in fields {
            let path = field.path.to_string();
            if !schema.is_visible(&path, tier) {
                continue;
            }
            let classification = schema
                .classify(&path)
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unclassified".into());
            println!("  {path} - {} ({classification})", field.label);
        }
    }
}

/// Reads a form record from JSON, or YAML when the extension is `.yaml`/`.yml`.
fn read_record(path: &Path) -> anyhow::Result<FormRecord> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read form record {}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let record = if is_yaml {
        let value: serde_json::Value = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse YAML record {}", path.display()))?;
        FormRecord::from_value(value)?
    } else {
        FormRecord::from_json_str(&text)?
    };
    Ok(record)
}
