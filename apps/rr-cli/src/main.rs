use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rr_core::{GageId, LinkId};
use rr_config::{RunConfig, TopologySource};
use rr_engine::{
    EngineResult, ExecutionPlan, FailurePolicy, KernelState, LoopWindow, RoutingKernel, RunDriver,
    SubnetworkPlan,
};
use rr_forcing::{build_da_sets, build_parity_sets, build_run_sets, list_matching_files, WindowConfig};
use rr_network::{
    NetworkBuilder, NetworkGraph, NetworkPartition, SegmentRecord, TopologyCodes,
    UnknownWaterbodyPolicy, WaterbodyNetwork, WaterbodyTable,
};
use rr_state::{Checkpoint, WarmState};
use tracing::info;

mod table;

#[derive(Parser)]
#[command(name = "rr-cli")]
#[command(about = "RiverRoute CLI - river network routing orchestration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a run configuration document
    Validate {
        /// Path to the run YAML file
        config_path: PathBuf,
    },
    /// Build the network and print the execution plan
    Plan {
        /// Path to the run YAML file
        config_path: PathBuf,
    },
    /// Execute the loop sequence with the pass-through kernel
    Run {
        /// Path to the run YAML file
        config_path: PathBuf,
        /// Keep routing healthy sub-networks after a failure
        #[arg(long)]
        continue_on_failure: bool,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("Config error: {0}")]
    Config(#[from] rr_config::ConfigError),

    #[error("Table error: {0}")]
    Table(#[from] table::TableError),

    #[error("Network error: {0}")]
    Network(#[from] rr_network::NetworkError),

    #[error("Forcing error: {0}")]
    Forcing(#[from] rr_forcing::ForcingError),

    #[error("State error: {0}")]
    State(#[from] rr_state::StateError),

    #[error("Engine error: {0}")]
    Engine(#[from] rr_engine::EngineError),
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Plan { config_path } => cmd_plan(&config_path),
        Commands::Run {
            config_path,
            continue_on_failure,
        } => cmd_run(&config_path, continue_on_failure),
    }
}

fn cmd_validate(config_path: &Path) -> Result<(), CliError> {
    println!("Validating run configuration: {}", config_path.display());
    rr_config::load_yaml(config_path)?;
    println!("✓ Configuration is valid");
    Ok(())
}

fn cmd_plan(config_path: &Path) -> Result<(), CliError> {
    let config = rr_config::load_yaml(config_path)?;
    let (plan, graph, _) = assemble_plan(&config)?;

    println!(
        "Network: {} segments, {} outlets",
        graph.len(),
        graph.outlets().len()
    );
    println!("Sub-networks:");
    for sub in &plan.subnetworks {
        println!(
            "  tailwater {} - {} reaches ({} segments, {} waterbodies)",
            sub.tailwater,
            sub.reaches.len(),
            sub.segments.len(),
            sub.waterbodies.len()
        );
    }
    Ok(())
}

fn cmd_run(config_path: &Path, continue_on_failure: bool) -> Result<(), CliError> {
    let config = rr_config::load_yaml(config_path)?;
    let (plan, graph, waterbodies) = assemble_plan(&config)?;

    let compute = &config.compute;
    let window_config = WindowConfig {
        steps_per_file: compute.forcing.steps_per_file,
        qts_subdivisions: compute.qts_subdivisions as u64,
        max_loop_steps: compute.max_loop_steps,
    };
    let files = list_matching_files(&compute.forcing.folder, &compute.forcing.pattern)?;
    let run_sets = build_run_sets(&window_config, &files, compute.t0, compute.nts)?;
    info!(
        loops = run_sets.len(),
        nts = compute.nts,
        "forcing windows built"
    );
    let da_sets = match &compute.data_assimilation {
        Some(da) => {
            let obs = list_matching_files(&da.obs_folder, &da.obs_pattern)?;
            build_da_sets(&run_sets, &obs, compute.t0)?
        }
        None => run_sets.iter().map(|_| Default::default()).collect(),
    };

    if let Some(parity) = &config.output.parity {
        let validation = list_matching_files(&parity.folder, &parity.pattern)?;
        let parity_sets = build_parity_sets(&run_sets, &validation, compute.t0)?;
        let total: usize = parity_sets.iter().map(|p| p.validation_files.len()).sum();
        println!(
            "Parity: {} window(s), {} validation file(s)",
            parity_sets.len(),
            total
        );
    }

    let mut warm = match &compute.restart {
        Some(restart) => {
            let checkpoint = Checkpoint::read(&restart.checkpoint)?;
            WarmState::from_checkpoint(&checkpoint, &graph, &waterbodies)?
        }
        None => WarmState::cold_start(compute.t0, &graph, &waterbodies),
    };
    if let Some(da) = &compute.data_assimilation {
        if !da.gage_crosswalk.is_empty() {
            let crosswalk = da
                .gage_crosswalk
                .iter()
                .map(|(gage, &segment)| (GageId::from(gage.as_str()), LinkId(segment)))
                .collect();
            warm.align_lastobs(&crosswalk);
        }
    }

    let driver = RunDriver {
        plan: &plan,
        run_sets: &run_sets,
        da_sets: &da_sets,
        dt_s: compute.dt_s,
        workers: compute.workers,
        policy: if continue_on_failure {
            FailurePolicy::Continue
        } else {
            FailurePolicy::Abort
        },
        checkpoint_out: config.output.checkpoint.as_deref(),
    };
    let report = driver.run(&mut warm, PassthroughKernel::default)?;

    let failures: usize = report.loops.iter().map(|l| l.failures.len()).sum();
    if failures == 0 {
        println!("✓ Run completed: {} loops", report.loops.len());
    } else {
        println!(
            "Run completed with {} sub-network failure(s) across {} loops:",
            failures,
            report.loops.len()
        );
        for (i, outcome) in report.loops.iter().enumerate() {
            for failure in &outcome.failures {
                println!("  loop {} tailwater {}: {}", i, failure.tailwater, failure.message);
            }
        }
    }
    Ok(())
}

fn assemble_plan(
    config: &RunConfig,
) -> Result<(ExecutionPlan, NetworkGraph, WaterbodyTable), CliError> {
    let codes = TopologyCodes {
        terminal_code: config.network.terminal_code,
        waterbody_null_code: config.network.waterbody_null_code,
    };
    let records: Vec<SegmentRecord> = match &config.network.topology {
        TopologySource::LegacyTable { path } | TopologySource::Hydrofabric { path } => {
            table::read_segment_table(path)?
        }
    };

    let mut builder = NetworkBuilder::new(codes);
    builder.extend_segments(records.iter().copied());
    let graph = builder.build()?;

    let waterbody_config = &config.network.waterbodies;
    let waterbody_table = match &waterbody_config.parameter_table {
        Some(path) => table::read_waterbody_table(path)?,
        None => WaterbodyTable::new(),
    };
    let policy = if waterbody_config.degrade_unknown_to_segment {
        UnknownWaterbodyPolicy::DegradeToSegment
    } else {
        UnknownWaterbodyPolicy::Error
    };
    let wbodies = WaterbodyNetwork::resolve(&records, codes, &waterbody_table, policy)?;

    let routed = if waterbody_config.break_network {
        wbodies.break_network(&graph)?
    } else {
        graph.clone()
    };
    let partition = NetworkPartition::build(&routed, &wbodies);
    let plan = ExecutionPlan::assemble(&partition, &records, &waterbody_table);
    Ok((plan, graph, waterbody_table))
}

/// Stands in for the external hydraulic solver: carries state through
/// each window unchanged so the plumbing (windows, dispatch, restart
/// cycling) can be exercised end to end.
#[derive(Default)]
struct PassthroughKernel {
    state: KernelState,
}

impl RoutingKernel for PassthroughKernel {
    fn initialize(&mut self, _plan: &SubnetworkPlan, state: &KernelState) -> EngineResult<()> {
        self.state = state.clone();
        Ok(())
    }

    fn advance(&mut self, _window: &LoopWindow<'_>) -> EngineResult<()> {
        Ok(())
    }

    fn get_state(&self) -> KernelState {
        self.state.clone()
    }

    fn set_state(&mut self, state: &KernelState) -> EngineResult<()> {
        self.state = state.clone();
        Ok(())
    }
}
