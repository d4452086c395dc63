use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use execution_monitor::engine::parse_time;
use execution_monitor::plan::parse_duration;
use execution_monitor::prelude::*;
use tracing_subscriber::EnvFilter;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "execution-monitor")]
#[command(about = "Simulate and monitor workflow executions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate an execution until it finishes
    Run {
        /// Path to the plan YAML file
        #[arg(value_name = "FILE", required_unless_present = "preset")]
        file: Option<PathBuf>,

        /// Run a built-in plan instead of a file
        #[arg(short, long, conflicts_with = "file")]
        preset: Option<String>,

        /// Path to monitor.yaml (default: monitor.yaml next to the plan)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for reproducible runs (overrides config)
        #[arg(long)]
        seed: Option<u64>,

        /// Completion probability per tick (overrides config)
        #[arg(long)]
        probability: Option<f64>,

        /// Tick interval such as "1500ms" or "3s" (overrides config)
        #[arg(short, long)]
        interval: Option<String>,

        /// Stop after this many ticks (overrides config)
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Run on a virtual clock starting at this time (ISO 8601 or Unix seconds)
        #[arg(long)]
        start_time: Option<String>,

        /// Print events as JSON lines
        #[arg(long)]
        json: bool,

        /// Write the final report as JSON
        #[arg(short, long, value_name = "FILE")]
        export: Option<PathBuf>,
    },

    /// Print metrics for a plan's initial state as JSON
    Metrics {
        /// Path to the plan YAML file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Validate plan files without running them
    Validate {
        /// Path to plan file or directory
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// List built-in plans
    Presets,
}

#[cfg(feature = "otel")]
fn init_otel_tracing(verbose: bool) {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::runtime::Tokio;
    use opentelemetry_sdk::trace::TracerProvider;

    let filter = if verbose {
        "execution_monitor=debug"
    } else {
        "execution_monitor=info"
    };

    let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&otlp_endpoint)
        .build()
        .expect("Failed to create OTLP exporter");

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, Tokio)
        .build();

    let tracer = provider.tracer("execution-monitor");
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(otel_layer)
        .init();

    opentelemetry::global::set_tracer_provider(provider);
}

#[cfg(not(feature = "otel"))]
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "execution_monitor=debug"
    } else {
        "execution_monitor=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    #[cfg(feature = "otel")]
    init_otel_tracing(cli.verbose);

    #[cfg(not(feature = "otel"))]
    init_tracing(cli.verbose);

    let result = run(cli).await;

    #[cfg(feature = "otel")]
    opentelemetry::global::shutdown_tracer_provider();

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Run {
            file,
            preset,
            config,
            seed,
            probability,
            interval,
            max_ticks,
            start_time,
            json,
            export,
        } => {
            let overrides = Overrides {
                seed,
                probability,
                interval,
                max_ticks,
            };
            run_plan(
                file,
                preset,
                config,
                overrides,
                start_time,
                json,
                export,
            )
            .await
        }
        Commands::Metrics { file } => print_metrics(file),
        Commands::Validate { path } => validate(path),
        Commands::Presets => list_presets(),
    }
}

/// CLI flags that take precedence over monitor.yaml
struct Overrides {
    seed: Option<u64>,
    probability: Option<f64>,
    interval: Option<String>,
    max_ticks: Option<u64>,
}

impl Overrides {
    fn apply(self, config: &mut SimulationConfig) -> anyhow::Result<()> {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(probability) = self.probability {
            config.completion_probability = probability;
        }
        if let Some(interval) = self.interval {
            config.tick_interval = parse_duration(&interval)?;
        }
        if let Some(max_ticks) = self.max_ticks {
            config.max_ticks = Some(max_ticks);
        }
        config.validate()?;
        Ok(())
    }
}

fn load_plan(file: Option<&Path>, preset: Option<&str>) -> anyhow::Result<ExecutionPlan> {
    match (file, preset) {
        (_, Some(name)) => {
            presets::get(name).ok_or_else(|| SimulationError::UnknownPreset(name.to_string()).into())
        }
        (Some(path), None) => {
            if !path.exists() {
                anyhow::bail!("Plan file not found: {}", path.display());
            }
            Ok(PlanLoader::load_file(path).map_err(SimulationError::from)?)
        }
        (None, None) => anyhow::bail!("Either a plan file or --preset is required"),
    }
}

fn load_config(explicit: Option<&Path>, plan_file: Option<&Path>) -> anyhow::Result<SimulationConfig> {
    if let Some(path) = explicit {
        return Ok(SimulationConfig::load(path)?);
    }
    let dir = plan_file.and_then(Path::parent).filter(|d| !d.as_os_str().is_empty());
    match dir {
        Some(dir) => Ok(SimulationConfig::find_in(dir)?.unwrap_or_default()),
        None => Ok(SimulationConfig::default()),
    }
}

#[tracing::instrument(skip_all)]
async fn run_plan(
    file: Option<PathBuf>,
    preset: Option<String>,
    config_path: Option<PathBuf>,
    overrides: Overrides,
    start_time: Option<String>,
    json: bool,
    export: Option<PathBuf>,
) -> anyhow::Result<bool> {
    let plan = load_plan(file.as_deref(), preset.as_deref())?;
    let mut config = load_config(config_path.as_deref(), file.as_deref())?;
    overrides.apply(&mut config)?;

    let clock = match start_time {
        Some(s) => MockClock::at(parse_time(&s)?),
        None => MockClock::new(),
    };

    let source = SeededSource::from_seed_option(config.seed);
    let sim = ExecutionSimulation::start_with_clock(plan, config.clone(), source, clock)?;

    if !json {
        println!(
            "Monitoring: {} ({} steps, tick every {:?})\n",
            sim.workflow_name(),
            sim.steps().len(),
            config.tick_interval
        );
    }

    let (tx, rx) = async_channel::unbounded::<MonitorEvent>();
    let handle = Ticker::from_config(&config).spawn(sim, tx);

    // The channel closes once the ticker task drops its sender
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => print_event(&event, json)?,
                Err(_) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Interrupted, stopping ticker");
                handle.cancel();
            }
        }
    }

    let (sim, reason) = handle.join().await?;
    let report = ExecutionReport::from(&sim);

    if !json {
        let mut view = MonitorView::new();
        if reason != StopReason::Finished {
            println!("Stopped: {:?}\n", reason);
        }
        if let Some(running) = sim.running_step() {
            view.toggle(&running.id);
        }
        println!("{}", view.render(&sim));
        println!("{}", report.render_summary()?);
    }

    if let Some(path) = export {
        report.write_to(&path)?;
        if !json {
            println!("Report written to {}", path.display());
        }
    }

    Ok(sim.status() == ExecutionStatus::Completed)
}

fn print_event(event: &MonitorEvent, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }

    let step = event.step_name.as_deref().unwrap_or("");
    let progress = event
        .metrics
        .as_ref()
        .map(|m| format!(" ({:.0}%)", m.progress_percent))
        .unwrap_or_default();

    match event.event_type {
        EventType::ExecutionStarted => println!("▶ Execution {} started{}", event.execution_id, progress),
        EventType::StepStarted => println!("  → {}", step),
        EventType::StepCompleted => println!("  ✓ {}{}", step, progress),
        EventType::ExecutionCompleted => println!("■ Execution completed{}\n", progress),
    }
    Ok(())
}

fn print_metrics(file: PathBuf) -> anyhow::Result<bool> {
    let plan = load_plan(Some(&file), None)?;
    plan.validate().map_err(SimulationError::from)?;

    // Report the plan as written; starting a simulation would promote a step
    let steps: Vec<ExecutionStep> = plan.steps.iter().map(ExecutionStep::from).collect();
    println!("{}", serde_json::to_string_pretty(&ExecutionMetrics::from_steps(&steps))?);
    Ok(true)
}

fn validate(path: PathBuf) -> anyhow::Result<bool> {
    if !path.exists() {
        anyhow::bail!("Path not found: {}", path.display());
    }

    if path.is_dir() {
        if let Some(config) = SimulationConfig::find_in(&path)? {
            config.validate()?;
        }

        let plans = PlanLoader::load_directory(&path)?;
        if plans.is_empty() {
            println!("No plans found in: {}", path.display());
            return Ok(true);
        }

        let mut valid = true;
        for plan in &plans {
            match plan.validate() {
                Ok(()) => println!("✓ {} ({} steps)", plan.name, plan.len()),
                Err(e) => {
                    println!("✗ {}: {}", plan.name, e);
                    valid = false;
                }
            }
        }
        Ok(valid)
    } else {
        let plan = PlanLoader::load_file(&path)?;
        match plan.validate() {
            Ok(()) => {
                println!("✓ {} is valid", path.display());
                Ok(true)
            }
            Err(e) => {
                println!("✗ {}: {}", path.display(), e);
                Ok(false)
            }
        }
    }
}

fn list_presets() -> anyhow::Result<bool> {
    for name in presets::names() {
        if let Some(plan) = presets::get(name) {
            println!("{:<22} {} ({} steps)", name, plan.name, plan.len());
        }
    }
    Ok(true)
}
