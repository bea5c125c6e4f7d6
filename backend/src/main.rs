//! Shelters CLI - publish the shelter API artifact
//!
//! # Main Command
//!
//! ```bash
//! shelters                         # Fetch, compare, version and publish
//! shelters publish                 # Same as above
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! shelters parse input.csv         # Decode + normalize a local CSV to JSON
//! shelters validate shelters.json  # Check an artifact against the schema
//! ```
//!
//! Endpoints and output root come from the environment (see `Config`).

use clap::{Parser, Subcommand};
use serde_json::Value;
use shelters::{build_candidate, run, validate_artifact_value, Config};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "shelters")]
#[command(about = "Publish Chiba City evacuation shelters as a versioned JSON API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the source CSV and publish a new artifact (default)
    Publish,

    /// Decode and normalize a local CSV file, output the dataset as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Source encoding label
        #[arg(short, long, default_value = "shift_jis")]
        encoding: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate an artifact JSON file against the published schema
    Validate {
        /// Input JSON file
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Publish) {
        Commands::Publish => cmd_publish().await,

        Commands::Parse {
            input,
            encoding,
            output,
        } => cmd_parse(&input, &encoding, output.as_deref()),

        Commands::Validate { input } => cmd_validate(&input),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_publish() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    eprintln!("🏫 Source: {}", config.source_url);
    eprintln!("   Published: {}", config.artifact_url);
    eprintln!("   Output: {}", config.output_root.display());

    let outcome = run(&config).await?;

    eprintln!("\n📦 Version {}", outcome.artifact.version);
    eprintln!("   Updated at: {}", outcome.artifact.updated_at);
    eprintln!(
        "   {} shelters, {} types{}",
        outcome.artifact.shelters.len(),
        outcome.artifact.shelter_types.len(),
        if outcome.changed { "" } else { " (unchanged)" }
    );
    eprintln!("   💾 {}", outcome.report.alias_path.display());
    eprintln!("   💾 {}", outcome.report.pinned_path.display());

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_parse(
    input: &Path,
    encoding: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let bytes = fs::read(input)?;
    let candidate = build_candidate(&bytes, encoding)?;

    eprintln!("   Columns: {}", candidate.csv_info.headers.join(", "));
    eprintln!(
        "✅ {} shelters, {} types ({})",
        candidate.dataset.shelters.len(),
        candidate.dataset.shelter_types.len(),
        candidate.report.summary()
    );

    let json = serde_json::to_string_pretty(&candidate.dataset)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let artifact: Value = serde_json::from_str(&content)?;

    validate_artifact_value(&artifact)?;
    eprintln!("✅ Valid artifact");

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
