//! Projection of volumes onto surfaces, and metric resampling.

use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use tracing::info;

use crate::{
    command::CommandRunner, enums::MappingMethod, error::WbError, paths, workbench::Workbench,
};

impl<R: CommandRunner> Workbench<R> {
    fn create_output_dir(&self, output: &Path) -> Result<(), WbError> {
        self.runner().prepare_output_dir(&paths::output_dir(output))?;
        Ok(())
    }

    /// Project a 3D NIfTI volume onto a GIfTI surface as a metric file.
    ///
    /// `output_img` gets `.shape.gii` appended unless it already ends in
    /// `.shape.gii` or `.func.gii`. Returns the path actually written.
    /// Thresholding, if desired, has to happen on the volume beforehand.
    pub async fn vol_to_metric(
        &self,
        vol_img: impl AsRef<Path>,
        surface: impl AsRef<Path>,
        output_img: impl AsRef<Path>,
        method: MappingMethod,
    ) -> Result<PathBuf, WbError> {
        let output_img = paths::metric_output(output_img.as_ref());
        self.create_output_dir(&output_img)?;

        self.volume_to_surface_mapping(vol_img, surface, &output_img, method)
            .await?;
        Ok(output_img)
    }

    /// Project one volume onto several surfaces at once, e.g. both
    /// hemispheres. Outputs are returned in the order of `targets`.
    pub async fn vol_to_metric_many<S, O>(
        &self,
        vol_img: impl AsRef<Path>,
        targets: &[(S, O)],
        method: MappingMethod,
    ) -> Result<Vec<PathBuf>, WbError>
    where
        S: AsRef<Path>,
        O: AsRef<Path>,
    {
        let vol_img = vol_img.as_ref();
        info!(
            volume = %vol_img.display(),
            surfaces = targets.len(),
            "projecting volume"
        );
        try_join_all(
            targets
                .iter()
                .map(|(surface, output)| self.vol_to_metric(vol_img, surface, output, method)),
        )
        .await
    }

    /// Project an integer-labelled volume onto a surface as a `.label.gii`.
    ///
    /// The volume is first mapped with [`MappingMethod::Enclosing`] so that
    /// labels are not blended, then `label_file` assigns names and colors.
    /// Each region in `label_file` spans two lines:
    ///
    /// ```text
    /// <region name>
    /// <integer label> <red> <green> <blue> <alpha>
    /// ```
    pub async fn vol_to_label(
        &self,
        vol_img: impl AsRef<Path>,
        surface: impl AsRef<Path>,
        label_file: impl AsRef<Path>,
        output_img: impl AsRef<Path>,
    ) -> Result<PathBuf, WbError> {
        let output_img = paths::label_output(output_img.as_ref());
        let dir = paths::output_dir(&output_img);
        let runner = self.runner();
        runner.prepare_output_dir(&dir)?;
        let metric = runner.scratch_file(&dir, "tmp", paths::DEFAULT_METRIC_SUFFIX)?;

        self.vol_to_metric(vol_img, surface, &metric, MappingMethod::Enclosing)
            .await?;
        self.metric_label_import(&metric, label_file, &output_img)
            .await?;

        metric.close()?;
        Ok(output_img)
    }

    /// Resample a metric between surface meshes using area-corrected
    /// adaptive barycentric weights.
    pub async fn resample_metric(
        &self,
        input: impl AsRef<Path>,
        current_sphere: impl AsRef<Path>,
        new_sphere: impl AsRef<Path>,
        output: impl AsRef<Path>,
        current_area: impl AsRef<Path>,
        new_area: impl AsRef<Path>,
    ) -> Result<PathBuf, WbError> {
        let output = paths::metric_output(output.as_ref());
        self.create_output_dir(&output)?;

        self.metric_resample(
            input,
            current_sphere,
            new_sphere,
            &output,
            current_area,
            new_area,
        )
        .await?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::DryRunRunner;

    fn workbench() -> (Workbench<DryRunRunner>, DryRunRunner) {
        let runner = DryRunRunner::new();
        (Workbench::new("wb_command", runner.clone()), runner)
    }

    #[tokio::test]
    async fn vol_to_metric_appends_suffix_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let (wb, runner) = workbench();
        let requested = dir.path().join("maps").join("lh.tstat");

        let written = wb
            .vol_to_metric(
                "tstat.nii.gz",
                "lh.very_inflated.surf.gii",
                &requested,
                MappingMethod::default(),
            )
            .await
            .unwrap();

        assert_eq!(written, dir.path().join("maps").join("lh.tstat.shape.gii"));
        assert!(!dir.path().join("maps").exists());
        let args = runner.commands()[0].arguments_lossy();
        assert_eq!(args[1..3], ["tstat.nii.gz", "lh.very_inflated.surf.gii"]);
        assert_eq!(Path::new(&args[3]), written);
        assert_eq!(args[4], "-trilinear");
    }

    #[tokio::test]
    async fn vol_to_metric_keeps_func_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let (wb, _runner) = workbench();
        let requested = dir.path().join("lh.zstat.func.gii");
        let written = wb
            .vol_to_metric("z.nii", "lh.surf.gii", &requested, MappingMethod::Cubic)
            .await
            .unwrap();
        assert_eq!(written, requested);
    }

    #[tokio::test]
    async fn vol_to_metric_many_preserves_target_order() {
        let dir = tempfile::tempdir().unwrap();
        let (wb, runner) = workbench();
        let targets = [
            ("lh.surf.gii", dir.path().join("lh")),
            ("rh.surf.gii", dir.path().join("rh")),
        ];

        let written = wb
            .vol_to_metric_many("z.nii", &targets, MappingMethod::Enclosing)
            .await
            .unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(written[0], dir.path().join("lh.shape.gii"));
        assert_eq!(written[1], dir.path().join("rh.shape.gii"));
        assert_eq!(runner.commands().len(), 2);
    }

    #[tokio::test]
    async fn vol_to_label_projects_with_enclosing_then_imports() {
        let dir = tempfile::tempdir().unwrap();
        let (wb, runner) = workbench();
        let requested = dir.path().join("rois");

        let written = wb
            .vol_to_label("rois.nii.gz", "lh.surf.gii", "labels.txt", &requested)
            .await
            .unwrap();

        assert_eq!(written, dir.path().join("rois.label.gii"));
        let commands = runner.commands();
        assert_eq!(commands.len(), 2);

        let mapping = commands[0].arguments_lossy();
        assert_eq!(mapping[0], "-volume-to-surface-mapping");
        assert_eq!(mapping[4], "-enclosing");
        let metric = Path::new(&mapping[3]);
        assert!(mapping[3].ends_with(".shape.gii"));
        assert_eq!(metric.parent(), Some(dir.path()));

        let import = commands[1].arguments_lossy();
        assert_eq!(import[0], "-metric-label-import");
        assert_eq!(import[1], mapping[3]);
        assert_eq!(import[2], "labels.txt");
        assert_eq!(Path::new(&import[3]), written);
        assert!(!metric.exists());
    }

    #[tokio::test]
    async fn resample_metric_normalizes_output() {
        let dir = tempfile::tempdir().unwrap();
        let (wb, runner) = workbench();
        let written = wb
            .resample_metric(
                "lh.func.gii",
                "cur.sphere.surf.gii",
                "new.sphere.surf.gii",
                dir.path().join("lh.32k"),
                "cur.area.shape.gii",
                "new.area.shape.gii",
            )
            .await
            .unwrap();
        assert_eq!(written, dir.path().join("lh.32k.shape.gii"));
        let args = runner.commands()[0].arguments_lossy();
        assert_eq!(args[4], "ADAP_BARY_AREA");
        assert_eq!(Path::new(&args[5]), written);
    }
}
