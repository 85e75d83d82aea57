use crate::core::io::poscar::{PoscarError, PoscarFile, PoscarMetadata};
use crate::core::io::traits::StructureFile;
use crate::core::models::structure::Structure;
use crate::engine::supercell::{self, SupercellError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum SupercellWorkflowError {
    #[error("Failed to read '{path}': {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: PoscarError,
    },
    #[error(transparent)]
    Build(#[from] SupercellError),
    #[error("Failed to write '{path}': {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: PoscarError,
    },
}

/// Parses `input`, replicates it by `repetitions`, and writes the result to
/// `POSCAR_{Nx}{Ny}{Nz}.vasp` under `output_dir`.
///
/// Returns the supercell and the path written. No partial output is left on
/// failure beyond whatever the OS already flushed; a write failure surfaces
/// the underlying I/O error unchanged.
#[instrument(level = "info", skip(input, output_dir), fields(input = %input.as_ref().display()))]
pub fn run(
    input: impl AsRef<Path>,
    repetitions: [i64; 3],
    output_dir: impl AsRef<Path>,
) -> Result<(Structure, PathBuf), SupercellWorkflowError> {
    let input = input.as_ref();
    let (structure, _) =
        PoscarFile::read_from_path(input).map_err(|source| SupercellWorkflowError::Read {
            path: input.to_path_buf(),
            source,
        })?;

    let supercell = supercell::build(&structure, repetitions)?;

    let file_name = format!(
        "POSCAR_{}{}{}.vasp",
        repetitions[0], repetitions[1], repetitions[2]
    );
    let path = output_dir.as_ref().join(file_name);
    PoscarFile::write_to_path(&supercell, &PoscarMetadata::titled("supercell"), &path).map_err(
        |source| SupercellWorkflowError::Write {
            path: path.clone(),
            source,
        },
    )?;
    info!(atoms = supercell.total_atoms(), path = %path.display(), "supercell written");

    Ok((supercell, path))
}
