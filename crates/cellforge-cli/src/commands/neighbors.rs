use crate::cli::NeighborsArgs;
use crate::error::Result;
use cellforge::workflows;
use tracing::info;

pub fn run(args: NeighborsArgs) -> Result<()> {
    info!(center = %args.center, cutoff = args.cutoff, "searching periodic neighbors");

    let result = workflows::neighbors::run(&args.input, &args.center, args.cutoff)?;

    println!(
        "Neighbors of {} within {:.3} Å:",
        result.center, result.cutoff
    );
    for group in &result.groups {
        if group.images.is_empty() {
            println!("  {}: none", group.species);
            continue;
        }
        println!("  {}: {} image(s)", group.species, group.images.len());
        for image in &group.images {
            println!(
                "    {}{:<4} d = {:>8.4} Å  at ({:>10.4}, {:>10.4}, {:>10.4})",
                group.species,
                image.index,
                image.distance,
                image.position.x,
                image.position.y,
                image.position.z
            );
        }
    }
    println!("Total: {} image(s)", result.total_images());
    Ok(())
}
