use crate::cli::SupercellArgs;
use crate::error::Result;
use cellforge::workflows;
use tracing::info;

pub fn run(args: SupercellArgs) -> Result<()> {
    // clap guarantees exactly three values.
    let repetitions = [
        args.repetitions[0],
        args.repetitions[1],
        args.repetitions[2],
    ];
    info!(?repetitions, "building supercell");

    let (supercell, path) = workflows::supercell::run(&args.input, repetitions, &args.output_dir)?;

    println!(
        "✓ {}-atom supercell written to: {}",
        supercell.total_atoms(),
        path.display()
    );
    Ok(())
}
