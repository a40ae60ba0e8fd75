use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use terminal_ballistics::report::{render_csv, render_energy_chart, render_table};
use terminal_ballistics::{
    DirectoryPresets, InMemoryPresets, PipelineReport, PresetCatalog, PresetKind, PresetSource,
    Scenario, SimulationConfig, SimulationRun,
};

#[derive(Parser)]
#[command(name = "ballistics-cli")]
#[command(author = "Terminal Ballistics Team")]
#[command(version)]
#[command(about = "Staged projectile simulation through air, armour and tissue", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fire one shot through air, armour and tissue
    Simulate {
        /// Weapon preset
        #[arg(short = 'w', long, default_value = "glock_17")]
        weapon: String,

        /// Bullet preset
        #[arg(short = 'b', long, default_value = "9mm")]
        bullet: String,

        /// Medium preset for the flight to the target
        #[arg(long, default_value = "unc_air")]
        air: String,

        /// Armour preset
        #[arg(short = 'a', long, default_value = "class_2")]
        armour: String,

        /// Medium preset behind the armour
        #[arg(short = 't', long, default_value = "unc_tissue")]
        tissue: String,

        /// Distance to the target (meters)
        #[arg(short = 'd', long, default_value = "25.0")]
        distance: f64,

        /// Travel into the tissue (meters)
        #[arg(long, default_value = "0.4")]
        depth: f64,

        /// Directory of JSON presets (built-in presets if omitted)
        #[arg(long)]
        preset_dir: Option<PathBuf>,

        /// JSON file with integrator and armour model settings
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,

        /// Override the integration time step (seconds)
        #[arg(long)]
        time_step: Option<f64>,

        /// Abort a stage after this many integration steps
        #[arg(long)]
        max_steps: Option<u64>,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,

        /// Append an energy distribution chart (table output only)
        #[arg(long)]
        chart: bool,
    },

    /// List available presets
    Presets {
        /// Directory of JSON presets (built-in presets if omitted)
        #[arg(long)]
        preset_dir: Option<PathBuf>,
    },

    /// Display engine information
    Info,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            weapon,
            bullet,
            air,
            armour,
            tissue,
            distance,
            depth,
            preset_dir,
            config,
            time_step,
            max_steps,
            output,
            chart,
        } => {
            let mut sim_config = match config {
                Some(path) => SimulationConfig::from_file(&path)?,
                None => SimulationConfig::default(),
            };
            if let Some(step) = time_step {
                sim_config.integrator.time_step = step;
            }
            if max_steps.is_some() {
                sim_config.integrator.max_steps = max_steps;
            }

            let names = PresetNames {
                weapon: &weapon,
                bullet: &bullet,
                air: &air,
                armour: &armour,
                tissue: &tissue,
            };
            let report = match preset_dir {
                Some(dir) => simulate(
                    &PresetCatalog::new(DirectoryPresets::new(dir)),
                    &names,
                    distance,
                    depth,
                    sim_config,
                )?,
                None => simulate(&PresetCatalog::builtin(), &names, distance, depth, sim_config)?,
            };

            display_results(&report, output, chart)?;
        }

        Commands::Presets { preset_dir } => match preset_dir {
            Some(dir) => list_presets(&DirectoryPresets::new(dir))?,
            None => list_presets(&InMemoryPresets::builtin())?,
        },

        Commands::Info => {
            println!("╔════════════════════════════════════════╗");
            println!("║      TERMINAL BALLISTICS v{:<13}║", env!("CARGO_PKG_VERSION"));
            println!("╠════════════════════════════════════════╣");
            println!("║ Staged projectile simulation:          ║");
            println!("║ air → armour → tissue                  ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Features:                              ║");
            println!("║ • Fixed-step drag integration          ║");
            println!("║ • Energy-absorption armour model       ║");
            println!("║ • Residual energy hand-off to tissue   ║");
            println!("║ • Table, JSON and CSV output           ║");
            println!("╚════════════════════════════════════════╝");
        }
    }

    Ok(())
}

struct PresetNames<'a> {
    weapon: &'a str,
    bullet: &'a str,
    air: &'a str,
    armour: &'a str,
    tissue: &'a str,
}

fn simulate<S: PresetSource>(
    presets: &PresetCatalog<S>,
    names: &PresetNames<'_>,
    distance: f64,
    depth: f64,
    config: SimulationConfig,
) -> Result<PipelineReport, Box<dyn Error>> {
    let launcher = presets.weapon(names.weapon)?;
    let projectile = presets.bullet(names.bullet)?;
    let scenario = Scenario {
        air: presets.medium(names.air)?,
        air_distance: distance,
        armour: presets.armour(names.armour)?,
        tissue: presets.medium(names.tissue)?,
        tissue_depth: depth,
    };

    let mut run = SimulationRun::with_config(projectile.clone(), launcher.clone(), config)?;
    let results = run.run_pipeline(&scenario)?;
    Ok(PipelineReport::new(&launcher, &projectile, &scenario, results))
}

fn list_presets<S: PresetSource>(source: &S) -> Result<(), Box<dyn Error>> {
    for kind in PresetKind::ALL {
        let names = source.names(kind)?;
        println!("{kind}:");
        if names.is_empty() {
            println!("  (none)");
        }
        for name in names {
            println!("  {name}");
        }
    }
    Ok(())
}

fn display_results(
    report: &PipelineReport,
    format: OutputFormat,
    chart: bool,
) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Table => {
            print!("{}", render_table(report));
            if chart {
                println!();
                print!("{}", render_energy_chart(&report.energy, 40));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Csv => {
            print!("{}", render_csv(report));
        }
    }
    Ok(())
}
