use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use kprint_core::{Kernel, LoweringOptions, PassManager, PrintLoweringPass};
use kprint_emit::{EmitterConfig, Emitter, KernelEmitter, VerbosityLevel};
use kprint_sim::{BlockedLayout, Simulator};

mod request;

use request::PrintRequest;

#[derive(Parser)]
#[command(name = "kprint")]
#[command(about = "Lower tensor prints into per-element printf calls and simulate their output")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log lowering and simulation progress to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the kernel after print lowering.
    Lower {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print every element in hex, whatever the request says.
        #[arg(long)]
        hex: bool,

        /// JSON file with lowering options.
        #[arg(long)]
        options: Option<PathBuf>,

        #[arg(long)]
        no_color: bool,

        #[arg(long)]
        no_types: bool,

        /// Hide the string table.
        #[arg(short, long)]
        quiet: bool,
    },

    /// Lower the print, run the kernel and show what every thread prints.
    Run {
        input: PathBuf,

        #[arg(long)]
        hex: bool,

        #[arg(long)]
        options: Option<PathBuf>,

        /// Stop after this many lines.
        #[arg(long)]
        limit: Option<usize>,

        /// Tag each line with the block and thread that printed it.
        #[arg(long)]
        show_thread: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Lower {
            input,
            output,
            hex,
            options,
            no_color,
            no_types,
            quiet,
        } => cmd_lower(
            &input,
            output,
            hex,
            options.as_deref(),
            no_color,
            no_types,
            quiet,
        ),
        Commands::Run {
            input,
            hex,
            options,
            limit,
            show_thread,
        } => cmd_run(&input, hex, options.as_deref(), limit, show_thread),
    }
}

fn load_options(path: Option<&Path>, hex: bool) -> Result<LoweringOptions> {
    let mut options = match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            LoweringOptions::from_json(&json)?
        }
        None => LoweringOptions::default(),
    };
    if hex {
        options.hex_override = Some(true);
    }
    Ok(options)
}

fn lowered_kernel(input: &Path, options: LoweringOptions) -> Result<Kernel> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let mut kernel = PrintRequest::from_json(&json)?.to_kernel()?;

    let mut manager = PassManager::new();
    manager.enable_statistics();
    manager.register_pass(PrintLoweringPass::new(BlockedLayout).with_options(options));
    manager.run_all(&mut kernel)?;

    if let Some(pass) = manager.get_pass::<PrintLoweringPass<BlockedLayout>>() {
        let stats = pass.stats();
        info!(
            prints = stats.prints_lowered,
            printf = stats.printf_emitted,
            strings = kernel.strings.len(),
            "lowered kernel '{}'",
            kernel.name
        );
    }
    for stat in manager.statistics() {
        info!("pass {} took {:?}", stat.name, stat.duration);
    }
    Ok(kernel)
}

fn cmd_lower(
    input: &Path,
    output: Option<PathBuf>,
    hex: bool,
    options: Option<&Path>,
    no_color: bool,
    no_types: bool,
    quiet: bool,
) -> Result<()> {
    let kernel = lowered_kernel(input, load_options(options, hex)?)?;

    let emitter = KernelEmitter::new(EmitterConfig {
        // Files never get escape codes.
        use_colors: !no_color && output.is_none(),
        show_types: !no_types,
        verbosity: if quiet {
            VerbosityLevel::Quiet
        } else {
            VerbosityLevel::Normal
        },
        ..EmitterConfig::default()
    });
    let text = emitter.emit_to_string(&kernel)?;

    match output {
        Some(path) => {
            fs::write(&path, &text).with_context(|| format!("Failed to write {}", path.display()))?
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn cmd_run(
    input: &Path,
    hex: bool,
    options: Option<&Path>,
    limit: Option<usize>,
    show_thread: bool,
) -> Result<()> {
    let kernel = lowered_kernel(input, load_options(options, hex)?)?;

    let mut simulator = Simulator::new();
    if let Some(limit) = limit {
        simulator = simulator.with_line_limit(limit);
    }
    let lines = simulator.run(&kernel).context("Simulation failed")?;

    for line in &lines {
        if show_thread {
            let [x, y, z] = line.block;
            println!("[{}, {}, {}:{}] {}", x, y, z, line.thread, line.text);
        } else {
            println!("{}", line.text);
        }
    }
    info!("{} lines printed", lines.len());
    Ok(())
}
