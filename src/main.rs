use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;

use bodybattery::config::AppConfig;
use bodybattery::logging::{init_logging, LogFormat, LogLevel};
use bodybattery::report::{ScoreReport, DISCLAIMER};
use bodybattery::{score_authorized, BatteryError, PartialMetrics};

/// Body Battery - daily energy estimate from sleep, activity and heart rate
#[derive(Parser)]
#[command(name = "bodybattery")]
#[command(version)]
#[command(about = "Estimate today's body battery", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log level (error, warn, info, debug, trace); overrides the config file
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Log format (pretty, json, compact); overrides the config file
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the body battery score
    Score {
        /// Hours of sleep last night
        #[arg(long)]
        sleep_hours: Option<f64>,

        /// Sleep quality (0-100)
        #[arg(long)]
        sleep_quality: Option<u8>,

        /// Steps taken yesterday
        #[arg(long)]
        steps: Option<u32>,

        /// Moderate activity minutes yesterday
        #[arg(long)]
        moderate_minutes: Option<u32>,

        /// Vigorous activity minutes yesterday
        #[arg(long)]
        vigorous_minutes: Option<u32>,

        /// Resting heart rate today (bpm)
        #[arg(long = "resting-hr")]
        resting_heart_rate: Option<u16>,

        /// Baseline resting heart rate (bpm)
        #[arg(long = "baseline-hr")]
        baseline_resting_heart_rate: Option<u16>,

        /// JSON file with metrics; flags override its values
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Reject missing metrics instead of filling defaults
        #[arg(long)]
        strict: bool,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show or initialize the configuration
    Config {
        /// Print effective weights and defaults
        #[arg(short, long)]
        show: bool,

        /// Write a default config file
        #[arg(long)]
        init: bool,

        /// Allow --init to replace an existing config file
        #[arg(long, requires = "init")]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);

    // Runs before loading so a broken file can be replaced
    if let Commands::Config { show, init: true, force } = &cli.command {
        match AppConfig::write_default(&config_path, *force) {
            Ok(fresh) => {
                println!(
                    "{}",
                    format!("✓ Wrote default configuration to {}", config_path.display()).green()
                );
                if *show {
                    print_config(&fresh);
                }
                return Ok(());
            }
            Err(err) => {
                eprintln!("{}", err.to_string().red().bold());
                std::process::exit(1);
            }
        }
    }

    // Bad weights stop everything before any score is shown
    let config = match AppConfig::load_or_default(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err.user_message().red().bold());
            std::process::exit(2);
        }
    };

    let log_config = config
        .logging
        .clone()
        .with_overrides(cli.log_level, cli.log_format, cli.verbose);
    init_logging(&log_config)?;

    tracing::info!(config = %config_path.display(), "Configuration loaded");

    match cli.command {
        Commands::Score {
            sleep_hours,
            sleep_quality,
            steps,
            moderate_minutes,
            vigorous_minutes,
            resting_heart_rate,
            baseline_resting_heart_rate,
            input,
            strict,
            format,
        } => {
            let flags = PartialMetrics {
                sleep_hours,
                sleep_quality,
                steps,
                moderate_minutes,
                vigorous_minutes,
                resting_heart_rate,
                baseline_resting_heart_rate,
            };

            match run_score(&config, input, flags, strict, format) {
                Ok(()) => {}
                Err(err @ (BatteryError::InvalidInput(_) | BatteryError::Auth(_))) => {
                    tracing::event!(
                        tracing::Level::WARN,
                        severity = ?err.severity(),
                        error = %err,
                        "Score not shown"
                    );
                    eprintln!("{}", err.user_message().yellow().bold());
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }

        Commands::Config { .. } => print_config(&config),
    }

    Ok(())
}

fn run_score(
    config: &AppConfig,
    input: Option<PathBuf>,
    flags: PartialMetrics,
    strict: bool,
    format: OutputFormat,
) -> bodybattery::Result<()> {
    let collected = match input {
        Some(path) => PartialMetrics::from_json(&std::fs::read_to_string(path)?)?,
        None => PartialMetrics::default(),
    }
    .overlay(flags);

    let metrics = if strict {
        collected.into_input()?
    } else {
        collected.with_defaults(&config.defaults)
    };

    let gate = config.access.gate();
    let (principal, breakdown) = score_authorized(gate.as_ref(), &metrics, &config.weights)?;
    tracing::info!(subject = %principal.subject, score = %breakdown.clamped_score, "Score computed");

    let report = ScoreReport::new(&breakdown);
    match format {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text | OutputFormat::Table => {
            println!("{}", "🔋 Body Battery".green().bold());
            println!("{}", DISCLAIMER.dimmed());
            println!();
            println!("Estimated Body Battery: {}", report.headline().bold());
            println!("{} {}%", report.progress_bar(30), report.progress_percent());
            println!();
            println!("{}", "What influenced this?".cyan().bold());
            if matches!(format, OutputFormat::Table) {
                println!("{}", report.to_table());
            } else {
                for line in report.contribution_lines() {
                    println!("{}", line);
                }
            }
        }
    }

    Ok(())
}

fn print_config(config: &AppConfig) {
    println!("{}", "Weights".white().bold());
    for (name, value) in config.weights.entries() {
        println!("  {:<26} {}", name, value);
    }

    let d = &config.defaults;
    println!("{}", "Input defaults".white().bold());
    println!("  {:<26} {}", "sleep_hours", d.sleep_hours);
    println!("  {:<26} {}", "sleep_quality", d.sleep_quality);
    println!("  {:<26} {}", "steps", d.steps);
    println!("  {:<26} {}", "moderate_minutes", d.moderate_minutes);
    println!("  {:<26} {}", "vigorous_minutes", d.vigorous_minutes);
    println!("  {:<26} {}", "resting_heart_rate", d.resting_heart_rate);
    println!("  {:<26} {}", "baseline_resting_heart_rate", d.baseline_resting_heart_rate);

    println!("{}", "Access".white().bold());
    let gate = if config.access.token_sha256.is_some() { "token" } else { "open" };
    println!("  {:<26} {}", "gate", gate);
}
