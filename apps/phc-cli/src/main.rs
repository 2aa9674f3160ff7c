use clap::{Parser, Subcommand, ValueEnum};
use phc_core::units::{CELSIUS_OFFSET_K, bar, deg_c};
use phc_tables::{
    PhaseMode, PhaseResolver, PropertyTable, StatePoint, TableResult, load_table,
};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "phc-cli")]
#[command(about = "ph-chart CLI - Property table queries on the P-h diagram", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a fluid table file and print its shape
    Validate {
        /// Path to the table JSON file
        table: PathBuf,
    },
    /// Resolve a state point from pressure plus temperature or enthalpy
    State {
        /// Path to the table JSON file
        table: PathBuf,
        /// Pressure in bar
        #[arg(long)]
        pressure_bar: f64,
        /// Temperature in °C (drives the T -> h direction)
        #[arg(long, conflicts_with = "enthalpy", required_unless_present = "enthalpy")]
        temperature_c: Option<f64>,
        /// Specific enthalpy in kJ/kg (drives the h -> T direction)
        #[arg(long)]
        enthalpy: Option<f64>,
        /// Phase selection
        #[arg(long, value_enum, default_value = "auto")]
        phase: PhaseArg,
    },
    /// Show the saturation state at a pressure
    Sat {
        /// Path to the table JSON file
        table: PathBuf,
        /// Pressure in bar
        #[arg(long)]
        pressure_bar: f64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PhaseArg {
    Auto,
    Liquid,
    Vapor,
    TwoPhase,
}

impl From<PhaseArg> for PhaseMode {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::Auto => PhaseMode::Auto,
            PhaseArg::Liquid => PhaseMode::Liquid,
            PhaseArg::Vapor => PhaseMode::Vapor,
            PhaseArg::TwoPhase => PhaseMode::TwoPhase,
        }
    }
}

fn main() -> TableResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { table } => cmd_validate(&table),
        Commands::State {
            table,
            pressure_bar,
            temperature_c,
            enthalpy,
            phase,
        } => cmd_state(&table, pressure_bar, temperature_c, enthalpy, phase.into()),
        Commands::Sat {
            table,
            pressure_bar,
        } => cmd_sat(&table, pressure_bar),
    }
}

fn load(path: &Path) -> TableResult<PropertyTable> {
    let table = load_table(path)?;
    info!(
        pressures = table.pressure_axis().len(),
        temperatures = table.temperature_axis().len(),
        sat_records = table.saturation().len(),
        "table loaded"
    );
    Ok(table)
}

fn cmd_validate(path: &Path) -> TableResult<()> {
    println!("Validating table: {}", path.display());
    let table = load(path)?;

    println!("✓ Table is valid");
    println!(
        "  Grid: {} temperatures x {} pressures",
        table.temperature_axis().len(),
        table.pressure_axis().len()
    );
    println!("  Saturation records: {}", table.saturation().len());
    println!(
        "  Entropy grids: {}",
        if table.has_entropy() { "yes" } else { "no" }
    );
    println!(
        "  Two-phase grid: {}",
        if table.two_phase().is_some() {
            "yes"
        } else {
            "no"
        }
    );
    Ok(())
}

fn cmd_state(
    path: &Path,
    pressure_bar: f64,
    temperature_c: Option<f64>,
    enthalpy: Option<f64>,
    mode: PhaseMode,
) -> TableResult<()> {
    let table = load(path)?;
    let resolver = PhaseResolver::new(&table);
    let p = bar(pressure_bar);

    let resolved = match (temperature_c, enthalpy) {
        (Some(t_c), _) => resolver.enthalpy_from_tp(p, deg_c(t_c), mode, None, None),
        (None, Some(h)) => resolver.temperature_from_ph(p, h),
        (None, None) => unreachable!("clap enforces one driving field"),
    };

    let mut point = StatePoint::from_ph(pressure_bar, resolved.enthalpy);
    point.temperature_c = resolved.temperature_c;
    point.quality = resolved.quality;
    point.phase_mode = mode;
    let entropy = resolver.entropy_for_point(&point);
    let hint = resolver.phase_hint(p, resolved.enthalpy);

    println!("State at {:.4} bar ({}):", pressure_bar, mode.label());
    println!("  h = {} kJ/kg", fmt(resolved.enthalpy));
    println!("  T = {} °C", fmt(resolved.temperature_c));
    println!("  x = {}", fmt(resolved.quality));
    println!("  s = {} kJ/(kg·K)", fmt(entropy));
    println!("  phase: {}", hint.label());
    Ok(())
}

fn cmd_sat(path: &Path, pressure_bar: f64) -> TableResult<()> {
    let table = load(path)?;
    let curve = match table.saturation_curve() {
        Some(c) => c,
        None => {
            println!("Table has no usable saturation curve");
            return Ok(());
        }
    };

    let (p_min, p_max) = curve.pressure_range_pa();
    println!(
        "Saturation range: {:.4} - {:.4} bar",
        p_min / 1.0e5,
        p_max / 1.0e5
    );

    match curve.state_at_pressure(pressure_bar * 1.0e5, false) {
        Some(s) => {
            println!("At {:.4} bar:", pressure_bar);
            println!("  T_bubble = {} °C", fmt(s.bubble_t_k - CELSIUS_OFFSET_K));
            println!("  T_dew    = {} °C", fmt(s.dew_t_k - CELSIUS_OFFSET_K));
            println!("  h_liq    = {} kJ/kg", fmt(s.liquid_enthalpy));
            println!("  h_vap    = {} kJ/kg", fmt(s.vapor_enthalpy));
            if s.has_glide() {
                println!("  glide    = {:.3} K", s.dew_t_k - s.bubble_t_k);
            }
        }
        None => println!("{:.4} bar is outside the saturation range", pressure_bar),
    }
    Ok(())
}

fn fmt(v: f64) -> String {
    if v.is_finite() {
        format!("{:.4}", v)
    } else {
        "-".to_string()
    }
}
