use crate::cli::AnnealArgs;
use crate::config::AnnealFile;
use crate::error::{CliError, Result};
use cellforge::workflows;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

pub fn run(args: AnnealArgs) -> Result<()> {
    let spec = AnnealFile::from_file(&args.config)?.into_spec(&args);
    info!(
        runs = spec.runs,
        steps = spec.monte_carlo.steps,
        temperature_k = spec.monte_carlo.temperature_k,
        "starting Metropolis annealing"
    );

    let bar = ProgressBar::new((spec.runs * spec.monte_carlo.steps) as u64);
    let style = ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} steps | E = {msg} eV | {elapsed}",
    )
    .map_err(|e| CliError::Other(anyhow::anyhow!("invalid progress template: {e}")))?;
    bar.set_style(style);

    println!(
        "Starting Metropolis annealing ({} independent run(s))...",
        spec.runs
    );
    let reports = workflows::anneal::run(&spec, |progress| {
        bar.set_position(progress.step as u64);
        bar.set_message(format!("{:.4}", progress.current_energy));
    })?;
    bar.finish_and_clear();

    for report in &reports {
        match &report.path {
            Some(path) => println!(
                "✓ run {}: E = {:.6} eV after {} accepted move(s), written to: {}",
                report.run,
                report.energy,
                report.accepted,
                path.display()
            ),
            None => println!(
                "run {}: no move accepted after {} step(s); nothing written.",
                report.run, spec.monte_carlo.steps
            ),
        }
    }
    Ok(())
}
