//! Volume-to-surface projection with FreeSurfer's `mri_vol2surf`.

use std::{
    env,
    path::{Path, PathBuf},
};

use crate::{
    command::{CommandRunner, ProcessRunner, ToolCommand},
    enums::{Hemisphere, Projection, Registration, SurfaceInterpolation},
    error::WbError,
    paths,
};

pub const FREESURFER_HOME_VAR: &str = "FREESURFER_HOME";
pub const DEFAULT_TARGET_SUBJECT: &str = "fsaverage";

/// A FreeSurfer installation.
#[derive(Debug, Clone)]
pub struct FreeSurfer<R = ProcessRunner> {
    home: PathBuf,
    runner: R,
}

impl<R: CommandRunner> FreeSurfer<R> {
    pub fn new(home: impl AsRef<Path>, runner: R) -> Self {
        Self {
            home: home.as_ref().to_path_buf(),
            runner,
        }
    }

    /// Locate FreeSurfer through `FREESURFER_HOME`.
    pub fn from_env(runner: R) -> Result<Self, WbError> {
        Self::from_home(env::var_os(FREESURFER_HOME_VAR).map(PathBuf::from), runner)
    }

    /// Fails when `home` is missing or empty.
    pub fn from_home(home: Option<PathBuf>, runner: R) -> Result<Self, WbError> {
        let home = home
            .filter(|home| !home.as_os_str().is_empty())
            .ok_or(WbError::FreeSurferHomeNotSet)?;
        Ok(Self::new(home, runner))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn vol2surf_binary(&self) -> PathBuf {
        self.home.join("bin").join("mri_vol2surf")
    }

    pub fn vol2surf_command(&self, request: &Vol2SurfRequest) -> ToolCommand {
        ToolCommand::new(self.vol2surf_binary()).args(request.arguments())
    }

    /// Sample a volume onto a subject's surface. Returns the output path
    /// after suffix normalization.
    pub async fn vol_to_surf(&self, request: &Vol2SurfRequest) -> Result<PathBuf, WbError> {
        let request = Vol2SurfRequest {
            output: paths::freesurfer_output(&request.output),
            ..request.clone()
        };
        let dir = paths::output_dir(&request.output);
        self.runner.prepare_output_dir(&dir)?;

        self.runner.run(&self.vol2surf_command(&request)).await?;
        Ok(request.output)
    }
}

/// Parameters for one `mri_vol2surf` run.
#[derive(Debug, Clone, PartialEq)]
pub struct Vol2SurfRequest {
    pub volume: PathBuf,
    pub output: PathBuf,
    pub hemisphere: Hemisphere,
    pub registration: Registration,
    pub target_subject: String,
    pub projection: Projection,
    pub interpolation: SurfaceInterpolation,
    /// Source surface (`white` when unset).
    pub surface: Option<String>,
    /// Full width at half maximum of surface smoothing, in mm.
    pub smoothing_fwhm: Option<f64>,
    pub subjects_dir: Option<PathBuf>,
}

impl Vol2SurfRequest {
    pub fn new(
        volume: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        hemisphere: Hemisphere,
        registration: Registration,
    ) -> Self {
        Self {
            volume: volume.into(),
            output: output.into(),
            hemisphere,
            registration,
            target_subject: DEFAULT_TARGET_SUBJECT.to_string(),
            projection: Projection::default(),
            interpolation: SurfaceInterpolation::default(),
            surface: None,
            smoothing_fwhm: None,
            subjects_dir: None,
        }
    }

    pub fn with_target_subject(mut self, subject: impl Into<String>) -> Self {
        self.target_subject = subject.into();
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_interpolation(mut self, interpolation: SurfaceInterpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_surface(mut self, surface: impl Into<String>) -> Self {
        self.surface = Some(surface.into());
        self
    }

    pub fn with_smoothing(mut self, fwhm: f64) -> Self {
        self.smoothing_fwhm = Some(fwhm);
        self
    }

    pub fn with_subjects_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.subjects_dir = Some(dir.into());
        self
    }

    pub fn arguments(&self) -> Vec<String> {
        let mut args = vec!["--mov".to_string(), self.volume.display().to_string()];
        args.extend(self.registration.arguments());
        args.extend([
            "--trgsubject".to_string(),
            self.target_subject.clone(),
            "--hemi".to_string(),
            self.hemisphere.code().to_string(),
        ]);
        if let Some(surface) = &self.surface {
            args.extend(["--surf".to_string(), surface.clone()]);
        }
        args.extend([
            "--interp".to_string(),
            self.interpolation.name().to_string(),
        ]);
        args.extend(self.projection.arguments());
        if let Some(fwhm) = self.smoothing_fwhm {
            args.extend(["--surf-fwhm".to_string(), fwhm.to_string()]);
        }
        if let Some(dir) = &self.subjects_dir {
            args.extend(["--sd".to_string(), dir.display().to_string()]);
        }
        args.extend(["--o".to_string(), self.output.display().to_string()]);
        args
    }
}
