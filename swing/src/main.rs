use std::{path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use double_pendulum::{ConfigErrors, SimulationConfig, SyncMode};
use swing_result::ResultErrors;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Error)]
pub enum SwingErrors {
    #[error("{0}")]
    Config(#[from] ConfigErrors),
    #[error("config '{0}' already exists, pass --force to overwrite it")]
    ConfigExists(PathBuf),
    #[error("{0}")]
    ProgressTemplate(#[from] indicatif::style::TemplateError),
    #[error("{0}")]
    Result(#[from] ResultErrors),
}

#[derive(Debug, Parser)]
#[command(version, about = "Double pendulum simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Integrate a full run with fixed steps and write the trajectory to csv
    Run(RunArgs),
    /// Follow the wall clock, printing the simulation time as it advances
    Realtime {
        #[command(flatten)]
        run: RunArgs,
        /// How simulated time follows the frame clock
        #[arg(long, value_enum)]
        sync: Option<SyncArg>,
        /// Frame interval in milliseconds
        #[arg(long, default_value_t = 16)]
        frame_ms: u64,
    },
    /// Write a config file populated with the defaults
    Init {
        #[arg(default_value = "swing.ron")]
        path: PathBuf,
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// RON config file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Initial angle of the first arm, in degrees
    #[arg(long, allow_negative_numbers = true)]
    theta1: Option<f64>,
    /// Initial angle of the second arm, in degrees
    #[arg(long, allow_negative_numbers = true)]
    theta2: Option<f64>,
    /// Run length in seconds
    #[arg(short, long)]
    duration: Option<f64>,
    /// Directory for the csv output
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SyncArg {
    RealTime,
    Fixed,
}

impl From<SyncArg> for SyncMode {
    fn from(value: SyncArg) -> Self {
        match value {
            SyncArg::RealTime => SyncMode::RealTime,
            SyncArg::Fixed => SyncMode::Fixed,
        }
    }
}

impl RunArgs {
    /// Loads the config file, if any, then applies the command line overrides.
    fn resolve(&self) -> Result<SimulationConfig, SwingErrors> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(theta1) = self.theta1 {
            config.inputs.theta1_deg = theta1;
        }
        if let Some(theta2) = self.theta2 {
            config.inputs.theta2_deg = theta2;
        }
        if let Some(duration) = self.duration {
            config.inputs.run_length = duration;
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn dispatch(cli: Cli) -> Result<(), SwingErrors> {
    match cli.command {
        Commands::Run(args) => {
            let config = args.resolve()?;
            commands::run(&config)?;
        }
        Commands::Realtime {
            run,
            sync,
            frame_ms,
        } => {
            let mut config = run.resolve()?;
            if let Some(sync) = sync {
                config.sync = sync.into();
            }
            commands::realtime(&config, frame_ms)?;
        }
        Commands::Init { path, force } => commands::init(&path, force)?,
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format!("error: {e}").red());
            ExitCode::FAILURE
        }
    }
}
