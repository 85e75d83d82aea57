use crate::core::io::poscar::{PoscarError, PoscarFile, PoscarMetadata};
use crate::core::io::traits::StructureFile;
use crate::core::io::xdatcar::{XdatcarError, XdatcarFile};
use crate::engine::snapshots::{self, SnapshotError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum SnapshotWorkflowError {
    #[error("Failed to read '{path}': {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: XdatcarError,
    },
    #[error(transparent)]
    Select(#[from] SnapshotError),
    #[error("Frame {frame} is inconsistent with the trajectory header")]
    CorruptFrame { frame: usize },
    #[error("Failed to write '{path}': {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: PoscarError,
    },
}

/// One extracted snapshot: the requested time and where it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotReport {
    pub requested_ps: f64,
    pub actual_ps: f64,
    pub step: u64,
    pub path: PathBuf,
}

/// Extracts, for each requested simulation time, the trajectory frame with
/// the closest timestamp and writes it as `POSCAR_{time}.vasp` under
/// `output_dir`.
///
/// `potim_fs` is the ionic time step of the simulation in fs; requested
/// times are in ps.
#[instrument(level = "info", skip(input, output_dir), fields(input = %input.as_ref().display()))]
pub fn run(
    input: impl AsRef<Path>,
    potim_fs: f64,
    requested_ps: &[f64],
    output_dir: impl AsRef<Path>,
) -> Result<Vec<SnapshotReport>, SnapshotWorkflowError> {
    let input = input.as_ref();
    let trajectory =
        XdatcarFile::read_from_path(input).map_err(|source| SnapshotWorkflowError::Read {
            path: input.to_path_buf(),
            source,
        })?;

    let selections = snapshots::select_frames(&trajectory, potim_fs, requested_ps)?;

    let mut reports = Vec::with_capacity(selections.len());
    for selection in selections {
        let structure = trajectory
            .frame_structure(selection.frame_index)
            .ok_or(SnapshotWorkflowError::CorruptFrame {
                frame: selection.frame_index,
            })?;
        let path = output_dir
            .as_ref()
            .join(format!("POSCAR_{}.vasp", selection.requested_ps));
        let metadata = PoscarMetadata::titled(format!("snapshot at {} ps", selection.requested_ps));
        PoscarFile::write_to_path(&structure, &metadata, &path).map_err(|source| {
            SnapshotWorkflowError::Write {
                path: path.clone(),
                source,
            }
        })?;
        info!(step = selection.step, path = %path.display(), "snapshot written");
        reports.push(SnapshotReport {
            requested_ps: selection.requested_ps,
            actual_ps: selection.actual_ps,
            step: selection.step,
            path,
        });
    }
    Ok(reports)
}
