use anyhow::Result;
use chrono::Utc;

#[cfg(feature = "colorized_output")]
use console::style;

use specpair::config::Config;
use specpair::pipeline::{Schedule, Task, TaskGraph};

/// Show the task graph and the upcoming scheduled runs
pub fn run(config: &Config) -> Result<()> {
    let graph = TaskGraph::from_config(config)?;
    let schedule = Schedule::from_config(&config.schedule)?;

    println!("{}", heading("Pipeline Plan"));
    println!("=============");
    for (i, node) in graph.nodes().iter().enumerate() {
        let name = node.id.to_string();
        if node.id.is_external() {
            println!("{:2}. {} {}", i + 1, task_name(&name), external_marker());
        } else {
            println!("{:2}. {}", i + 1, task_name(&name));
        }
        if !node.dependencies.is_empty() {
            let deps: Vec<String> = node.dependencies.iter().map(|d| d.to_string()).collect();
            println!("      after:  {}", deps.join(", "));
        }
        for output in outputs(&node.task) {
            println!("      writes: {}", output);
        }
    }

    println!();
    println!("{}", heading("Schedule"));
    println!("========");
    println!(
        "Every {} days, retries {} with {}s delay",
        config.schedule.interval_days, config.schedule.retries, config.schedule.retry_delay_secs
    );
    for next in schedule.upcoming(Utc::now(), 3) {
        println!("  {}", next.to_rfc3339());
    }
    Ok(())
}

fn outputs(task: &Task) -> Vec<String> {
    match task {
        Task::ConvertMetadata { metadata, .. } => vec![metadata.display().to_string()],
        Task::SplitMetadata { metadata, .. } => {
            let paths = specpair::metadata::split_paths(metadata);
            vec![
                paths.train.display().to_string(),
                paths.val.display().to_string(),
                paths.test.display().to_string(),
            ]
        }
        Task::DownloadPeaks { peak_dir, .. } => vec![format!("{}/<dataset>/<file>", peak_dir.display())],
        Task::EncodeFeatures { feature_dir, .. } => vec![feature_dir.display().to_string()],
        Task::PairsPositive { pairs, .. } | Task::PairsNegative { pairs, .. } => {
            vec![pairs.display().to_string()]
        }
        Task::TrainModel { .. } => Vec::new(),
    }
}

#[cfg(feature = "colorized_output")]
fn heading(text: &str) -> String {
    style(text).bold().cyan().to_string()
}

#[cfg(not(feature = "colorized_output"))]
fn heading(text: &str) -> String {
    text.to_string()
}

#[cfg(feature = "colorized_output")]
fn task_name(name: &str) -> String {
    style(name).bold().to_string()
}

#[cfg(not(feature = "colorized_output"))]
fn task_name(name: &str) -> String {
    name.to_string()
}

#[cfg(feature = "colorized_output")]
fn external_marker() -> String {
    style("(external)").dim().to_string()
}

#[cfg(not(feature = "colorized_output"))]
fn external_marker() -> String {
    "(external)".to_string()
}
