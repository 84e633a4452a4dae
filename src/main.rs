use anyhow::{Context, Result};
use clap::Parser;
use cyclestack::{
    cli::Cli, config::StackOptions, csv_output, pipeline::StackEngine, report, run::Run,
    tree::CategoryTree,
};
use std::io;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let base = match &args.config {
        Some(path) => StackOptions::from_toml(path)?,
        None => StackOptions::default(),
    };
    let options = args.stack_options(base);

    let tree = match &args.tree {
        Some(path) => {
            let tree = CategoryTree::from_toml(path)?;
            if options.simplified {
                tree.simplify(&Default::default())
            } else {
                tree
            }
        }
        None => options.tree_variant().build(),
    };

    let run = Run::load(&args.results)?;
    let stack = StackEngine::default()
        .compute(&run, &tree, &options)
        .with_context(|| format!("Failed to build stack for {}", args.results.display()))?;

    for diagnostic in &stack.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }

    report::write_text(&mut io::stdout().lock(), &stack).context("Failed to write stack")?;

    if let Some(path) = &args.csv {
        csv_output::append_report(path, &stack, &args.job_name, args.csv_header)?;
    }

    Ok(())
}
