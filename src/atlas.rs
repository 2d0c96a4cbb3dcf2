//! Relabeling and recoloring of CIfTI atlases.
//!
//! Both operations dump the atlas to text with `wb_command`, rewrite the
//! vertex values, and convert the text back to CIfTI against a template.

use std::path::Path;

use tracing::debug;

use crate::{
    command::CommandRunner,
    error::WbError,
    paths::{self, ScratchFile},
    region_spec::RegionSpec,
    vertices::VertexTable,
    workbench::Workbench,
};

/// Which atlas regions keep their value, and what everything else becomes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelSelection {
    /// `None` keeps every region.
    pub label_numbers: Option<Vec<i64>>,
    /// Value for unselected or unknown regions. 0 is transparent in Workbench.
    pub fill_value: f64,
}

impl LabelSelection {
    pub fn all(fill_value: f64) -> Self {
        Self {
            label_numbers: None,
            fill_value,
        }
    }

    pub fn only(label_numbers: impl Into<Vec<i64>>, fill_value: f64) -> Self {
        Self {
            label_numbers: Some(label_numbers.into()),
            fill_value,
        }
    }
}

/// Vertex text file next to `output`, removed on drop.
fn vertex_file_for(runner: &impl CommandRunner, output: &Path) -> Result<ScratchFile, WbError> {
    let dir = paths::output_dir(output);
    runner.prepare_output_dir(&dir)?;
    Ok(runner.scratch_file(&dir, "tmp_vertices", ".txt")?)
}

impl<R: CommandRunner> Workbench<R> {
    /// Keep only `label_numbers` from a `.dlabel.nii` atlas.
    ///
    /// Every other vertex is set to `fill_value`, and the result is written
    /// to `output_img` using `input_img` as the CIfTI template.
    pub async fn make_label_map(
        &self,
        input_img: impl AsRef<Path>,
        label_numbers: &[i64],
        output_img: impl AsRef<Path>,
        fill_value: f64,
    ) -> Result<(), WbError> {
        let input_img = input_img.as_ref();
        let output_img = output_img.as_ref();
        let vertex_file = vertex_file_for(self.runner(), output_img)?;

        self.cifti_to_text(input_img, &vertex_file).await?;

        // a runner that only records commands leaves no text to rewrite
        if vertex_file.is_on_disk() {
            let mut vertices = VertexTable::read(&vertex_file)?;
            debug!(
                rows = vertices.dim().0,
                labels = label_numbers.len(),
                "retaining labels"
            );
            vertices.retain_labels(label_numbers, fill_value);
            vertices.write(&vertex_file)?;
        }

        self.cifti_from_text(&vertex_file, input_img, output_img)
            .await?;
        vertex_file.close()?;
        Ok(())
    }

    /// Assign the `value_name` column of `region_spec` to the regions of a
    /// `.dlabel.nii` atlas, producing a `.dscalar.nii`.
    ///
    /// `scalar_img` is the CIfTI template for the output; atlases usually
    /// ship a `.dscalar.nii` alongside the `.dlabel.nii`. Vertices whose
    /// label is unselected, background (0), or absent from `region_spec`
    /// take `selection.fill_value`.
    pub async fn make_scalar_map(
        &self,
        input_img: impl AsRef<Path>,
        region_spec: &RegionSpec,
        value_name: &str,
        output_img: impl AsRef<Path>,
        scalar_img: impl AsRef<Path>,
        selection: &LabelSelection,
    ) -> Result<(), WbError> {
        let output_img = output_img.as_ref();
        let fill_value = selection.fill_value;
        let value_map =
            region_spec.value_map(value_name, selection.label_numbers.as_deref(), fill_value)?;
        let vertex_file = vertex_file_for(self.runner(), output_img)?;

        self.cifti_to_text(input_img.as_ref(), &vertex_file).await?;

        if vertex_file.is_on_disk() {
            let vertices = VertexTable::read(&vertex_file)?;
            debug!(
                rows = vertices.dim().0,
                regions = value_map.len(),
                value_name,
                "mapping region values"
            );
            vertices
                .map_first_column(&value_map, fill_value)
                .write(&vertex_file)?;
        }

        self.cifti_from_text(&vertex_file, scalar_img.as_ref(), output_img)
            .await?;
        vertex_file.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::DryRunRunner;

    #[tokio::test]
    async fn label_map_converts_through_temporary_text() {
        let dir = tempfile::tempdir().unwrap();
        let runner = DryRunRunner::new();
        let wb = Workbench::new("wb_command", runner.clone());
        let output = dir.path().join("out").join("visual.dlabel.nii");

        wb.make_label_map("Glasser.dlabel.nii", &[1, 4], &output, 0.0)
            .await
            .unwrap();

        let commands = runner.commands();
        assert_eq!(commands.len(), 2);
        let to_text = commands[0].arguments_lossy();
        let from_text = commands[1].arguments_lossy();
        assert_eq!(
            &to_text[..3],
            &["-cifti-convert", "-to-text", "Glasser.dlabel.nii"]
        );
        assert_eq!(&from_text[..2], &["-cifti-convert", "-from-text"]);

        let vertex_file = Path::new(&to_text[3]);
        assert_eq!(vertex_file.parent(), output.parent());
        assert!(to_text[3].ends_with(".txt"));
        assert_eq!(from_text[2], to_text[3]);
        assert_eq!(from_text[3], "Glasser.dlabel.nii");
        assert_eq!(Path::new(&from_text[4]), output);
        assert!(!dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn scalar_map_uses_scalar_template() {
        let dir = tempfile::tempdir().unwrap();
        let runner = DryRunRunner::new();
        let wb = Workbench::new("wb_command", runner.clone());
        let spec = RegionSpec::from_reader("Index,r\n1,0.5\n".as_bytes()).unwrap();
        let output = dir.path().join("r.dscalar.nii");

        wb.make_scalar_map(
            "atlas.dlabel.nii",
            &spec,
            "r",
            &output,
            "atlas.dscalar.nii",
            &LabelSelection::all(0.0),
        )
        .await
        .unwrap();

        let commands = runner.commands();
        let from_text = commands[1].arguments_lossy();
        assert_eq!(from_text[3], "atlas.dscalar.nii");
        assert_eq!(Path::new(&from_text[4]), output);
    }

    #[tokio::test]
    async fn scalar_map_rejects_unknown_column_before_running() {
        let runner = DryRunRunner::new();
        let wb = Workbench::new("wb_command", runner.clone());
        let spec = RegionSpec::from_reader("Index,r\n1,0.5\n".as_bytes()).unwrap();

        let err = wb
            .make_scalar_map(
                "atlas.dlabel.nii",
                &spec,
                "loading",
                "out.dscalar.nii",
                "atlas.dscalar.nii",
                &LabelSelection::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WbError::RegionSpec(_)));
        assert!(runner.commands().is_empty());
    }
}
