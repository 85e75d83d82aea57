use cellforge::workflows::anneal::AnnealError;
use cellforge::workflows::neighbors::NeighborWorkflowError;
use cellforge::workflows::snapshots::SnapshotWorkflowError;
use cellforge::workflows::supercell::SupercellWorkflowError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Supercell(#[from] SupercellWorkflowError),

    #[error(transparent)]
    Neighbors(#[from] NeighborWorkflowError),

    #[error(transparent)]
    Snapshots(#[from] SnapshotWorkflowError),

    #[error(transparent)]
    Anneal(#[from] AnnealError),

    #[error("Configuration error in '{path}': {message}", path = path.display())]
    Config { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
