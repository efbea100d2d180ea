use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use hybrid_score::config::{load_config, load_profile, validate_config, write_default_config, Config};
use hybrid_score::enrich::cache::{clear_cache, get_cache_path};
use hybrid_score::extract::{parse_bureau_report, parse_salary_slip, SourceKind};
use hybrid_score::lending::{guidance, LendingGuidance, LoanType};
use hybrid_score::output::{format_guidance, format_report, should_use_colors};
use hybrid_score::{PipelineError, ScoreReport, ScoreRequest, ScoringPipeline};

const EXIT_SUCCESS: i32 = 0;
const EXIT_EXTRACTION: i32 = 2;
const EXIT_BUREAU: i32 = 3;
const EXIT_CONFIG: i32 = 4;
const EXIT_IO: i32 = 5;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    /// CSV/TSV export with a header row
    Tabular,
    /// Statement text
    Text,
}

impl From<KindArg> for SourceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Tabular => SourceKind::Tabular,
            KindArg::Text => SourceKind::DocumentText,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score one applicant
    Score {
        /// Bureau (CIBIL) score, 300-900; read from --bureau-report when omitted
        #[arg(long)]
        bureau: Option<u32>,

        /// Text of a bureau report (score, late payments, utilization)
        #[arg(long)]
        bureau_report: Option<PathBuf>,

        /// Text of a salary slip; its take-home pay replaces the profile income
        #[arg(long)]
        salary_slip: Option<PathBuf>,

        /// Questionnaire answers and monthly figures (YAML or JSON)
        #[arg(long)]
        profile: PathBuf,

        /// Transaction export or extracted statement text
        #[arg(long)]
        statement: PathBuf,

        /// Statement format (inferred from the file extension when omitted)
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Bypass the enrichment cache
        #[arg(long)]
        no_cache: bool,

        /// Also print rate and affordability guidance for this loan type
        #[arg(long, value_parser = parse_loan_type)]
        loan_type: Option<LoanType>,
    },
    /// Load and validate the configuration
    Check,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Remove cached enrichment results
    ClearCache,
}

#[derive(Parser, Debug)]
#[command(name = "hybrid-score")]
#[command(about = "Hybrid credit score from a bureau score and transaction behavior", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/hybrid-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    report: &'a ScoreReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    lending: Option<&'a LendingGuidance>,
}

fn parse_loan_type(s: &str) -> Result<LoanType, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn infer_kind(path: &Path) -> SourceKind {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("csv") | Some("tsv") => SourceKind::Tabular,
        _ => SourceKind::DocumentText,
    }
}

fn load_valid_config(path: Option<PathBuf>) -> Config {
    let config = match load_config(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
    config
}

/// Read a supporting document as text, exiting on failure.
fn read_text(path: &Path) -> String {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path.display(), e);
            std::process::exit(EXIT_IO);
        }
    };
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Could not read {}: {}", path.display(), e);
            std::process::exit(EXIT_EXTRACTION);
        }
    }
}

#[tokio::main]
async fn main() {
    hybrid_score::install_crypto_provider();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Check => {
            load_valid_config(cli.config);
            println!("Config OK");
        }
        Commands::Init { force } => match write_default_config(cli.config.as_deref(), force) {
            Ok(path) => println!("Wrote default config to {}", path.display()),
            Err(e) => {
                eprintln!("Failed to write config: {:#}", e);
                std::process::exit(EXIT_IO);
            }
        },
        Commands::ClearCache => {
            let cache_path = get_cache_path();
            if let Err(e) = clear_cache(&cache_path) {
                eprintln!("Failed to clear cache: {:#}", e);
                std::process::exit(EXIT_IO);
            }
            println!("Cleared {}", cache_path.display());
        }
        Commands::Score {
            bureau,
            bureau_report,
            salary_slip,
            profile,
            statement,
            kind,
            json,
            no_cache,
            loan_type,
        } => {
            let start_time = Instant::now();
            let config = load_valid_config(cli.config);

            let mut inputs = match load_profile(&profile, Utc::now()) {
                Ok(i) => i,
                Err(e) => {
                    eprintln!("Profile error: {:#}", e);
                    std::process::exit(EXIT_IO);
                }
            };

            let bureau_details = bureau_report.map(|path| parse_bureau_report(&read_text(&path)));
            if let Some(details) = &bureau_details {
                inputs.apply_bureau_report(details);
            }
            if let Some(path) = salary_slip {
                let slip = parse_salary_slip(&read_text(&path));
                if slip.monthly_income().is_none() {
                    log::warn!("No pay figures found in {}", path.display());
                }
                inputs.apply_salary_slip(&slip);
            }

            let document = match std::fs::read(&statement) {
                Ok(d) => d,
                Err(e) => {
                    eprintln!("Failed to read {}: {}", statement.display(), e);
                    std::process::exit(EXIT_IO);
                }
            };
            let kind = kind.map(SourceKind::from).unwrap_or_else(|| infer_kind(&statement));

            let pipeline = match ScoringPipeline::from_config(&config, !no_cache) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Config error: {:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };

            let report = match pipeline
                .run(ScoreRequest {
                    bureau_score: bureau,
                    inputs: &inputs,
                    document: &document,
                    kind,
                    bureau_report: bureau_details.as_ref(),
                })
                .await
            {
                Ok(r) => r,
                Err(PipelineError::Extraction(e)) => {
                    eprintln!("Could not read {}: {}", statement.display(), e);
                    std::process::exit(EXIT_EXTRACTION);
                }
                Err(PipelineError::InvalidBureauScore(e)) => {
                    eprintln!("Invalid bureau score: {}", e);
                    std::process::exit(EXIT_BUREAU);
                }
            };

            let lending =
                loan_type.map(|t| guidance(&inputs, report.result.risk_tier, t));

            if json {
                let output = JsonOutput {
                    report: &report,
                    lending: lending.as_ref(),
                };
                match serde_json::to_string_pretty(&output) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("Failed to serialize result: {}", e);
                        std::process::exit(EXIT_IO);
                    }
                }
            } else {
                let use_colors = should_use_colors();
                println!("{}", format_report(&report, use_colors));
                if let Some(g) = &lending {
                    println!();
                    println!("{}", format_guidance(g, use_colors));
                }
            }

            log::debug!("Scored in {:?}", start_time.elapsed());
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
