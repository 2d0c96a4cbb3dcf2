//! # wb-sanity
//!
//! Convenience wrappers around Connectome Workbench (`wb_command`) and
//! FreeSurfer for the conversions that come up when visualizing results on
//! the cortical surface:
//!  - Restricting a CIfTI atlas (`.dlabel.nii`) to a few regions
//!  - Painting per-region values from a CSV file onto an atlas
//!    (`.dlabel.nii` → `.dscalar.nii`)
//!  - Projecting NIfTI volumes onto GIfTI surfaces as metrics
//!    (`.shape.gii`/`.func.gii`) or labels (`.label.gii`)
//!  - Resampling metrics between surface meshes
//!  - Projecting volumes with FreeSurfer's `mri_vol2surf`
//!
//! No imaging math happens here: every operation builds a command line for
//! the external tool and runs it, rewriting an intermediate text file where
//! needed. Non-zero exit codes from the tools are reported as errors.
//!
//! Commands go through a [`CommandRunner`]. [`ProcessRunner`] executes them;
//! [`DryRunRunner`] only records them, which is handy for checking what
//! would run. Output directories and intermediate files are created through
//! the runner too, so a dry run leaves the filesystem alone.
//!
//! # Examples
//!
//! ## Keeping a few regions of an atlas
//!
//! ```no_run
//! # use wb_sanity::Workbench;
//! # async fn run() -> Result<(), wb_sanity::WbError> {
//! let wb = Workbench::default();
//! wb.make_label_map(
//!     "Glasser_2016.dlabel.nii",
//!     &[1, 4, 5],
//!     "results/visual.dlabel.nii",
//!     0.0,
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Projecting a statistical map
//!
//! ```no_run
//! # use wb_sanity::{MappingMethod, Workbench};
//! # async fn run() -> Result<(), wb_sanity::WbError> {
//! let wb = Workbench::default();
//! let written = wb
//!     .vol_to_metric(
//!         "zstat1.nii.gz",
//!         "S1200.L.very_inflated_MSMAll.32k_fs_LR.surf.gii",
//!         "results/L.zstat1",
//!         MappingMethod::Trilinear,
//!     )
//!     .await?;
//! assert!(written.ends_with("L.zstat1.shape.gii"));
//! # Ok(())
//! # }
//! ```

pub mod atlas;
pub mod command;
pub mod config;
pub mod enums;
pub mod error;
pub mod freesurfer;
pub mod logging;
pub mod paths;
pub mod region_spec;
pub mod surface;
pub mod vertices;
pub mod workbench;

pub use atlas::LabelSelection;
pub use command::{CommandError, CommandRunner, DryRunRunner, ProcessRunner, ToolCommand};
pub use config::Config;
pub use enums::{
    Hemisphere, MappingMethod, Projection, ProjectionMethod, ProjectionSummary, Registration,
    SurfaceInterpolation,
};
pub use error::WbError;
pub use freesurfer::{FreeSurfer, Vol2SurfRequest};
pub use paths::ScratchFile;
pub use region_spec::RegionSpec;
pub use vertices::VertexTable;
pub use workbench::Workbench;
