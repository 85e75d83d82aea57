use crate::core::io::poscar::{PoscarError, PoscarFile};
use crate::core::io::traits::StructureFile;
use crate::core::models::label::SiteLabel;
use crate::engine::neighbors::{self, NeighborError, NeighborResult};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum NeighborWorkflowError {
    #[error("Failed to read '{path}': {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: PoscarError,
    },
    #[error(transparent)]
    Search(#[from] NeighborError),
}

/// Parses `input` and reports all periodic images within `cutoff` Å of the
/// atom identified by `center`.
///
/// Library-level contract only: the result is returned to the caller, no
/// file is written.
#[instrument(level = "info", skip(input), fields(input = %input.as_ref().display(), center = %center))]
pub fn run(
    input: impl AsRef<Path>,
    center: &SiteLabel,
    cutoff: f64,
) -> Result<NeighborResult, NeighborWorkflowError> {
    let input = input.as_ref();
    let (structure, _) =
        PoscarFile::read_from_path(input).map_err(|source| NeighborWorkflowError::Read {
            path: input.to_path_buf(),
            source,
        })?;
    Ok(neighbors::search(&structure, center, cutoff)?)
}
