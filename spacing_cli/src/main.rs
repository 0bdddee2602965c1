//! # Shelf Spacing CLI
//!
//! Command line front end for `spacing_core`:
//!
//! - `calc` - print the table, the copyable summary, or JSON
//! - `template` - write a drilling template as PNG or PDF
//! - `interactive` - answer prompts instead of passing flags
//! - `config` - show or create the settings file

mod prompt;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use spacing_core::calculations::{calculate, SpacingInput, SpacingResult};
use spacing_core::precision::NumberStyle;
use spacing_core::report::{render_summary, SpacingTable};
use spacing_core::settings::{load_or_default, save_settings, CalculatorSettings};
use spacing_core::template::{render_template, TemplateFormat};
use spacing_core::units::{LengthUnit, Measurement};
use spacing_core::CalcError;

#[derive(Parser)]
#[command(name = "shelf-spacing", version)]
#[command(about = "Evenly spaced shelves for a cabinet cavity", long_about = None)]
struct Cli {
    /// Settings file (default: <config dir>/shelf-spacing/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Cavity and shelf dimensions shared by `calc` and `template`
#[derive(Args, Debug)]
struct CavityArgs {
    /// Internal cavity height
    #[arg(short = 'H', long, allow_negative_numbers = true)]
    height: f64,

    /// Shelf material thickness
    #[arg(short, long, allow_negative_numbers = true)]
    thickness: f64,

    /// Number of shelves
    #[arg(short = 'n', long)]
    count: u32,

    /// Unit of height and thickness: mm or in (default from settings)
    #[arg(short, long)]
    units: Option<LengthUnit>,

    /// Unit for results, if different from --units
    #[arg(long)]
    display_units: Option<LengthUnit>,

    /// Decimal places in results (default from settings)
    #[arg(short, long)]
    precision: Option<u32>,

    /// Always print every decimal place (185.60 instead of 185.6)
    #[arg(long)]
    fixed: bool,
}

impl CavityArgs {
    fn to_input(&self, settings: &CalculatorSettings) -> SpacingInput {
        let unit = self.units.unwrap_or(settings.default_unit);
        SpacingInput {
            height: Measurement::new(self.height, unit),
            thickness: Measurement::new(self.thickness, unit),
            count: self.count,
            display_unit: self.display_units.unwrap_or(unit),
            precision: self.precision.unwrap_or(settings.default_precision),
        }
    }

    fn style(&self, settings: &CalculatorSettings) -> NumberStyle {
        if self.fixed {
            NumberStyle::Fixed
        } else {
            settings.number_style
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Aligned table with the gap line
    Table,
    /// Plain-text summary block
    Summary,
    /// Result as JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate shelf positions
    Calc {
        #[command(flatten)]
        cavity: CavityArgs,

        /// What to print
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Write a drilling template image
    Template {
        #[command(flatten)]
        cavity: CavityArgs,

        /// Output file (default: <file_stem>.<format> from settings)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// png or pdf
        #[arg(short, long, default_value = "png")]
        format: TemplateFormat,
    },

    /// Prompt for each value, then print the results
    Interactive,

    /// Inspect or create the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective settings as JSON
    Show,
    /// Write a settings file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the settings file location
    Path,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn report_error(err: &anyhow::Error) {
    eprintln!("Error: {:#}", err);
    if let Some(calc) = err.downcast_ref::<CalcError>() {
        if let Ok(json) = serde_json::to_string_pretty(calc) {
            eprintln!();
            eprintln!("Error JSON:");
            eprintln!("{}", json);
        }
    }
}

fn settings_path(cli_path: Option<PathBuf>) -> Result<PathBuf> {
    match cli_path {
        Some(path) => Ok(path),
        None => dirs::config_dir()
            .map(|dir| dir.join("shelf-spacing").join("settings.json"))
            .context("Could not determine the user config directory; pass --config"),
    }
}

fn load_settings_at(path: &Path) -> Result<CalculatorSettings> {
    load_or_default(path).with_context(|| format!("Failed to load settings from {}", path.display()))
}

fn run(cli: Cli) -> Result<()> {
    let path = settings_path(cli.config)?;

    match cli.command {
        Commands::Calc { cavity, format } => {
            let settings = load_settings_at(&path)?;
            let input = cavity.to_input(&settings);
            let result = calculate(&input)?;
            let style = cavity.style(&settings);

            let text = match format {
                OutputFormat::Table => SpacingTable::from_result(&result, style).render(),
                OutputFormat::Summary => format!("{}\n", render_summary(&input, &result, style)),
                OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(&result)?),
            };
            print!("{}", text);
        }
        Commands::Template { cavity, output, format } => {
            let settings = load_settings_at(&path)?;
            let input = cavity.to_input(&settings);
            let result = calculate(&input)?;
            let out_path = output.unwrap_or_else(|| PathBuf::from(settings.template.file_name(format)));
            write_template(&result, &settings, cavity.style(&settings), format, &out_path)?;
            println!("Drilling template written to {}", out_path.display());
        }
        Commands::Interactive => run_interactive(&load_settings_at(&path)?)?,
        Commands::Config { action } => run_config(&action, &path)?,
    }

    Ok(())
}

fn write_template(
    result: &SpacingResult,
    settings: &CalculatorSettings,
    style: NumberStyle,
    format: TemplateFormat,
    out_path: &Path,
) -> Result<()> {
    let bytes = render_template(result, &settings.template, style, format)?;
    std::fs::write(out_path, &bytes)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    info!(path = %out_path.display(), bytes = bytes.len(), "wrote drilling template");
    Ok(())
}

fn run_interactive(settings: &CalculatorSettings) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    let Some((_, result)) = prompt::run(&mut input, &mut out, settings)? else {
        return Ok(());
    };

    writeln!(out)?;
    if prompt::confirm(&mut input, &mut out, "Save drilling template?")? {
        let format = TemplateFormat::Png;
        let out_path = PathBuf::from(settings.template.file_name(format));
        write_template(&result, settings, settings.number_style, format, &out_path)?;
        writeln!(out, "Drilling template written to {}", out_path.display())?;
    }
    Ok(())
}

fn run_config(action: &ConfigAction, path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = load_settings_at(path)?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists; use --force to overwrite",
                    path.display()
                );
            }
            save_settings(&CalculatorSettings::default(), path)?;
            println!("Settings written to {}", path.display());
        }
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(())
}
