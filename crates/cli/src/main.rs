use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::{Args, Parser, Subcommand, ValueEnum};
use photo_chrono_core::{
    app_paths, load_config, save_config, ChronoJob, Delimiter, JobSummary, RenameReport,
    RunOutcome, SequenceConfig,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "photo-chrono-cli")]
#[command(about = "Copies a folder of JPG photos and renames the copies in capture-time order")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Rename(RenameArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
    Set(SetArgs),
}

#[derive(Debug, Args)]
struct SetArgs {
    #[arg(long)]
    start_value: Option<u64>,
    #[arg(long)]
    precision: Option<usize>,
    #[arg(long)]
    delimiter: Option<String>,
}

#[derive(Debug, Args)]
struct RenameArgs {
    /// Folder holding the photos; results go to `<folder>_chrono`
    #[arg(default_value = ".")]
    source: PathBuf,
    /// Year label, defaults to the current year
    year: Option<i32>,
    /// First sequence number
    start_value: Option<u64>,
    /// Digits of zero padding
    precision: Option<usize>,
    /// One of `.`, `-` or `_`; anything else is treated as `.`
    #[arg(allow_hyphen_values = true)]
    delimiter: Option<String>,
    /// Skip the confirmation prompt
    #[arg(long, short = 'y', default_value_t = false)]
    yes: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Rename(args) => cmd_rename(args),
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
            ConfigAction::Set(args) => cmd_config_set(args),
        },
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn cmd_rename(args: RenameArgs) -> Result<()> {
    let defaults = load_config()?;
    let delimiter = args.delimiter.as_deref().unwrap_or(&defaults.delimiter);
    let config = SequenceConfig::new(
        args.year.unwrap_or_else(|| Local::now().year()),
        args.start_value.unwrap_or(defaults.start_value),
        args.precision.unwrap_or(defaults.precision),
        Delimiter::parse_lenient(delimiter),
    )?;
    tracing::debug!(?config, source = %args.source.display(), "resolved run settings");

    let job = ChronoJob::new(args.source, config);
    let skip_prompt = args.yes;
    let outcome = job.run(|summary| {
        print_summary(summary);
        skip_prompt || ask_to_continue()
    })?;

    match outcome {
        RunOutcome::Declined => {
            eprintln!("Aborted: nothing was changed.");
        }
        RunOutcome::Completed(report) => match args.output {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Table => {
                print_table(&report);
            }
        },
    }

    Ok(())
}

fn print_summary(summary: &JobSummary) {
    eprintln!();
    eprintln!(
        "{} jpg files in {} will be ordered by date",
        summary.file_count,
        summary.source.display()
    );
    eprintln!("starting with {}", summary.first_name);
    eprintln!(
        "into {} (existing contents will be replaced)",
        summary.destination.display()
    );
    eprintln!();
    eprintln!("Any files without a datetime stamp will be ordered alphabetically.");
    eprintln!();
}

fn ask_to_continue() -> bool {
    eprint!("Enter y to continue or n to abort: ");
    if io::stderr().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => answer.trim() == "y",
        Err(_) => false,
    }
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("config file: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn cmd_config_set(args: SetArgs) -> Result<()> {
    let mut config = load_config()?;
    if let Some(start_value) = args.start_value {
        config.start_value = start_value;
    }
    if let Some(precision) = args.precision {
        if precision == 0 {
            anyhow::bail!("precision must be at least 1 digit");
        }
        config.precision = precision;
    }
    if let Some(delimiter) = args.delimiter {
        config.delimiter = Delimiter::parse_lenient(&delimiter).to_string();
    }
    save_config(&config).context("could not save defaults")?;
    cmd_config_show()
}

fn print_table(report: &RenameReport) {
    println!("original -> final (capture time)");
    for record in &report.renamed {
        let captured = record
            .timestamp
            .map(|ts| ts.to_string())
            .unwrap_or_else(|| "none, alphabetical".to_string());
        println!(
            "{} -> {} ({})",
            record.original_name, record.final_name, captured
        );
    }

    println!(
        "\nsummary: files={} dated={} undated={} same_second={}",
        report.stats.files, report.stats.dated, report.stats.undated, report.stats.disambiguated
    );
    println!(
        "Files have been chronologically ordered and can be found in: {}",
        report.directory.display()
    );
}
