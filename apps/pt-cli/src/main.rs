use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use pt_app::{AppError, AppResult, Assembler, AssemblerConfig, EngineHandoff, HandoffStep};
use pt_graph::Assembly;
use pt_registry::{TypeKind, TypeRegistry};

#[derive(Parser)]
#[command(name = "pt-cli")]
#[command(about = "Power-train topology assembler for hybrid-electric aircraft", long_about = None)]
struct Cli {
    /// Assembler configuration YAML (equilibrium policy, namespace, option policy)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a topology file and report every problem found
    Validate {
        /// Path to the topology YAML file
        topology_path: PathBuf,
    },
    /// Show the evaluation plan of a topology
    Plan {
        /// Path to the topology YAML file
        topology_path: PathBuf,
        /// Print the full engine hand-off as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show energy sources, watched variables and output files
    Views {
        /// Path to the topology YAML file
        topology_path: PathBuf,
    },
    /// List the registered component types
    Types,
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AssemblerConfig::load_yaml(path)?,
        None => AssemblerConfig::default(),
    };
    let registry = TypeRegistry::builtin();

    match cli.command {
        Commands::Validate { topology_path } => cmd_validate(&topology_path, &registry, config),
        Commands::Plan {
            topology_path,
            json,
        } => cmd_plan(&topology_path, &registry, config, json),
        Commands::Views { topology_path } => cmd_views(&topology_path, &registry, config),
        Commands::Types => cmd_types(&registry),
    }
}

/// Run the assembler to completion, printing diagnostics on failure.
fn assemble(path: &Path, registry: &TypeRegistry, config: AssemblerConfig) -> AppResult<Assembly> {
    let mut assembler = Assembler::new(registry, config);
    let result = assembler
        .load_file(path)
        .and_then(|_| assembler.validate().map(|_| ()))
        .and_then(|_| assembler.assemble().cloned());

    if let Err(AppError::Diagnostics(diagnostics)) = &result {
        eprintln!("✗ {} problem(s) in {}", diagnostics.len(), path.display());
        for problem in diagnostics.iter() {
            eprintln!("  - {problem}");
        }
    }
    result
}

fn cmd_validate(path: &Path, registry: &TypeRegistry, config: AssemblerConfig) -> AppResult<()> {
    println!("Validating topology: {}", path.display());
    let assembly = assemble(path, registry, config)?;
    let graph = assembly.graph();
    println!(
        "✓ Topology '{}' is valid ({} components, {} connections)",
        graph.name(),
        graph.instances().len(),
        graph.connections().len()
    );
    Ok(())
}

fn cmd_plan(
    path: &Path,
    registry: &TypeRegistry,
    config: AssemblerConfig,
    json: bool,
) -> AppResult<()> {
    let assembly = assemble(path, registry, config)?;
    let handoff = EngineHandoff::from_assembly(&assembly);

    if json {
        println!("{}", handoff.to_json()?);
        return Ok(());
    }

    println!("Evaluation plan for '{}':", handoff.name);
    for (i, step) in handoff.steps.iter().enumerate() {
        match step {
            HandoffStep::FeedForward { instance } => println!("  {:>3}. {}", i + 1, instance),
            HandoffStep::Equilibrium { cluster } => {
                let members = handoff
                    .clusters
                    .iter()
                    .find(|c| &c.name == cluster)
                    .map(|c| {
                        c.members
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                    .unwrap_or_default();
                println!("  {:>3}. {} [{}]", i + 1, cluster, members);
            }
        }
    }
    println!("Promotions: {}", handoff.promotions.len());
    println!("Fingerprint: {}", handoff.fingerprint()?);
    Ok(())
}

fn cmd_views(path: &Path, registry: &TypeRegistry, config: AssemblerConfig) -> AppResult<()> {
    let assembly = assemble(path, registry, config)?;

    println!("Energy sources:");
    for source in assembly.energy_consuming_sources() {
        match &source.consumption_variable {
            Some(variable) => {
                println!("  {} ({}) -> {}", source.instance, source.category, variable)
            }
            None => println!("  {} ({})", source.instance, source.category),
        }
    }

    println!("Watched variables:");
    for watched in assembly.performance_watcher_variables() {
        println!("  {} [{}]", watched.variable, watched.unit);
    }

    println!("Output files:");
    for instance in assembly.ordered_instances() {
        if let Some(path) = assembly.output_file_path(&instance.key) {
            println!("  {}", path.display());
        }
    }
    Ok(())
}

fn cmd_types(registry: &TypeRegistry) -> AppResult<()> {
    println!("Registered component types:");
    for (tag, entry) in registry.iter() {
        let origin = match entry.kind {
            TypeKind::Builtin(_) => "builtin",
            TypeKind::Custom => "custom",
        };
        let d = &entry.descriptor;
        println!(
            "  {:<28} {:<16} {} in / {} out ({})",
            tag,
            d.category.as_str(),
            d.inputs.len(),
            d.outputs.len(),
            origin
        );
    }
    Ok(())
}
