use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use std::path::PathBuf;

use specpair::config::Config;
use specpair::download::WgetTransport;
use specpair::pipeline::{Pipeline, RunReport, Schedule, SkipExternal};

/// Run the pipeline once, or forever on the configured schedule
pub fn run(config: &Config, watch: bool, report_path: Option<PathBuf>) -> Result<()> {
    let transport = WgetTransport::from_config(&config.download);
    let external = SkipExternal;
    let pipeline = Pipeline::from_config(config, &transport, &external)?;

    if !watch {
        let report = pipeline.run();
        finish(&report, report_path.as_ref())?;
        if report.has_failures() {
            std::process::exit(1);
        }
        return Ok(());
    }

    let schedule = Schedule::from_config(&config.schedule)?;
    loop {
        let now = Utc::now();
        let next = schedule.next_run_after(now);
        info!("Next pipeline run at {}", next.to_rfc3339());
        if let Ok(wait) = (next - now).to_std() {
            std::thread::sleep(wait);
        }
        let report = pipeline.run();
        finish(&report, report_path.as_ref())?;
    }
}

fn finish(report: &RunReport, report_path: Option<&PathBuf>) -> Result<()> {
    #[cfg(feature = "colorized_output")]
    {
        println!("{}", report.format_colored());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("{}", report);
    }

    if let Some(path) = report_path {
        let json = report.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write run report: {}", path.display()))?;
        info!("Run report written to {}", path.display());
    }
    Ok(())
}
