use std::path::{Path, PathBuf};

use crate::{
    command::{CommandError, CommandRunner, ProcessRunner, ToolCommand},
    enums::MappingMethod,
};

pub const DEFAULT_WB_COMMAND: &str = "wb_command";

/// Connectome Workbench's `wb_command` and the runner that executes it.
///
/// The primitives here map one-to-one onto `wb_command` operations; the
/// composite helpers live in [`crate::atlas`] and [`crate::surface`].
#[derive(Debug, Clone)]
pub struct Workbench<R = ProcessRunner> {
    binary: PathBuf,
    runner: R,
}

impl Default for Workbench<ProcessRunner> {
    fn default() -> Self {
        Self::new(DEFAULT_WB_COMMAND, ProcessRunner)
    }
}

impl<R: CommandRunner> Workbench<R> {
    pub fn new(binary: impl AsRef<Path>, runner: R) -> Self {
        Self {
            binary: binary.as_ref().to_path_buf(),
            runner,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    fn command(&self, operation: &str) -> ToolCommand {
        ToolCommand::new(&self.binary).arg(operation)
    }

    /// `-cifti-convert -to-text <input> <output>`
    pub async fn cifti_to_text(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<(), CommandError> {
        let command = self
            .command("-cifti-convert")
            .arg("-to-text")
            .arg(input.as_ref())
            .arg(output.as_ref());
        self.runner.run(&command).await
    }

    /// `-cifti-convert -from-text <input> <template> <output>`
    pub async fn cifti_from_text(
        &self,
        input: impl AsRef<Path>,
        template: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<(), CommandError> {
        let command = self
            .command("-cifti-convert")
            .arg("-from-text")
            .arg(input.as_ref())
            .arg(template.as_ref())
            .arg(output.as_ref());
        self.runner.run(&command).await
    }

    /// `-volume-to-surface-mapping <volume> <surface> <output> -<method>`
    pub async fn volume_to_surface_mapping(
        &self,
        volume: impl AsRef<Path>,
        surface: impl AsRef<Path>,
        output: impl AsRef<Path>,
        method: MappingMethod,
    ) -> Result<(), CommandError> {
        let command = self
            .command("-volume-to-surface-mapping")
            .arg(volume.as_ref())
            .arg(surface.as_ref())
            .arg(output.as_ref())
            .arg(method.flag());
        self.runner.run(&command).await
    }

    /// `-metric-label-import <metric> <labels> <output>`
    pub async fn metric_label_import(
        &self,
        metric: impl AsRef<Path>,
        label_list: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<(), CommandError> {
        let command = self
            .command("-metric-label-import")
            .arg(metric.as_ref())
            .arg(label_list.as_ref())
            .arg(output.as_ref());
        self.runner.run(&command).await
    }

    /// `-metric-resample` with adaptive barycentric area-corrected weights.
    pub async fn metric_resample(
        &self,
        input: impl AsRef<Path>,
        current_sphere: impl AsRef<Path>,
        new_sphere: impl AsRef<Path>,
        output: impl AsRef<Path>,
        current_area: impl AsRef<Path>,
        new_area: impl AsRef<Path>,
    ) -> Result<(), CommandError> {
        let command = self
            .command("-metric-resample")
            .arg(input.as_ref())
            .arg(current_sphere.as_ref())
            .arg(new_sphere.as_ref())
            .arg("ADAP_BARY_AREA")
            .arg(output.as_ref())
            .arg("-area-metrics")
            .arg(current_area.as_ref())
            .arg(new_area.as_ref());
        self.runner.run(&command).await
    }
}
