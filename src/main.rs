//! pagetrim - auto-crop scanned pages to their content
//!
//! CLI entry point

use anyhow::Context;
use clap::Parser;
use pagetrim::{exit_codes, BatchTrimmer, Cli, Config, TrimError, WalkEntry};
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() {
    let cli = Cli::parse();
    setup_logging(&cli);

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            match e.downcast_ref::<TrimError>() {
                Some(TrimError::InputNotFound(_)) => exit_codes::INPUT_NOT_FOUND,
                _ => exit_codes::GENERAL_ERROR,
            }
        }
    };

    std::process::exit(code);
}

fn setup_logging(cli: &Cli) {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: logging already initialized");
    }
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let start_time = Instant::now();

    // Explicit config file must load; the implicit lookup falls back to defaults
    let file_config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!("Ignoring config file: {}", e);
            Config::default()
        }),
    };

    let (pipeline_config, batch_options) = file_config.merge_with_cli(&cli.overrides());
    let trimmer = BatchTrimmer::new(pipeline_config, batch_options);

    if cli.dry_run {
        print_execution_plan(&trimmer)?;
        return Ok(exit_codes::SUCCESS);
    }

    let summary = trimmer.run()?;

    if !cli.quiet {
        summary.print();
        println!("Total time: {:.2}s", start_time.elapsed().as_secs_f64());
    }

    if summary.has_fatal_errors() {
        eprintln!(
            "Error: {} output director{} could not be created",
            summary.directory_failures,
            if summary.directory_failures == 1 { "y" } else { "ies" }
        );
        return Ok(exit_codes::GENERAL_ERROR);
    }

    Ok(exit_codes::SUCCESS)
}

/// Print execution plan for dry-run mode
fn print_execution_plan(trimmer: &BatchTrimmer) -> anyhow::Result<()> {
    let config = trimmer.config();
    let options = trimmer.options();
    let plan = trimmer.plan()?;

    println!("=== Dry Run - Execution Plan ===");
    println!();
    println!("Input:  {}", options.input_root.display());
    println!("Output: {}", options.output_root.display());
    println!();
    println!("Pipeline Configuration:");
    match config.threshold_override {
        Some(t) => println!("  1. Binarization: fixed level {}", t),
        None => println!("  1. Binarization: Otsu"),
    }
    println!(
        "  2. Closing kernel: {}x{}",
        config.closing_kernel.0, config.closing_kernel.1
    );
    println!("  3. Min blob area: {}% of page", config.min_area_ratio * 100.0);
    println!("  4. Padding: {}px", config.padding);
    println!("  5. JPEG quality: {}", config.jpeg_quality);
    println!();
    println!("Processing Options:");
    println!("  Threads: {}", options.worker_count());
    println!(
        "  Skip existing: {}",
        if options.skip_existing { "YES" } else { "NO" }
    );
    println!();

    let mut images = 0usize;
    for entry in &plan {
        match entry {
            WalkEntry::Directory { output, .. } => println!("  mkdir {}", output.display()),
            WalkEntry::Image(job) => {
                images += 1;
                println!("  trim  {} -> {}", job.input.display(), job.output.display());
            }
        }
    }
    println!();
    println!("Images to process: {}", images);

    Ok(())
}
