use anyhow::{Context, Result};
use btnscan_cv::TesseractEngine;
use clap::Parser;
use std::process::ExitCode;

mod args;
mod driver;
mod recorder;

use args::Args;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = args.to_config()?;

    if args.dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let engine = TesseractEngine::from_config(&config.ocr);
    let version = engine.version().context("OCR engine unavailable")?;
    log::info!("Using {}", version);

    let report = driver::run(config, engine)?;
    report.log_summary();

    if let Some(path) = &args.report {
        report.save(path)?;
    }
    Ok(())
}
