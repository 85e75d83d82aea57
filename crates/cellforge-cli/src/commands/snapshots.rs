use crate::cli::SnapshotsArgs;
use crate::error::Result;
use cellforge::workflows;
use tracing::info;

pub fn run(args: SnapshotsArgs) -> Result<()> {
    info!(times = ?args.times, potim = args.potim, "extracting trajectory snapshots");

    let reports =
        workflows::snapshots::run(&args.input, args.potim, &args.times, &args.output_dir)?;

    for report in &reports {
        println!(
            "✓ snapshot for {} ps (ionic step {}, actual {:.4} ps) written to: {}",
            report.requested_ps,
            report.step,
            report.actual_ps,
            report.path.display()
        );
    }
    Ok(())
}
