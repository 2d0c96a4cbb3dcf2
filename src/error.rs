use thiserror::Error;

use crate::{command::CommandError, region_spec::RegionSpecError, vertices::VertexFileError};

#[derive(Debug, Error)]
pub enum WbError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Region specification: {0}")]
    RegionSpec(#[from] RegionSpecError),

    #[error("Vertex file: {0}")]
    VertexFile(#[from] VertexFileError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FREESURFER_HOME is not set; source FreeSurfer's SetUpFreeSurfer.sh or export it")]
    FreeSurferHomeNotSet,
}
