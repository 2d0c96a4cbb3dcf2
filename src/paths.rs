use std::{
    io,
    path::{Path, PathBuf},
};

use tempfile::TempPath;

pub const METRIC_SUFFIXES: &[&str] = &[".func.gii", ".shape.gii"];
pub const DEFAULT_METRIC_SUFFIX: &str = ".shape.gii";

pub const LABEL_SUFFIX: &str = ".label.gii";

pub const FREESURFER_SUFFIXES: &[&str] = &[".mgh", ".mgz", ".nii", ".nii.gz", ".gii"];
pub const DEFAULT_FREESURFER_SUFFIX: &str = ".mgz";

/// Append `default` to `path` unless its file name already ends with one of
/// `accepted`.
pub fn with_default_suffix(path: &Path, accepted: &[&str], default: &str) -> PathBuf {
    let has_suffix = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .is_some_and(|name| accepted.iter().any(|suffix| name.ends_with(suffix)));

    if has_suffix {
        return path.to_path_buf();
    }

    let mut extended = path.as_os_str().to_os_string();
    extended.push(default);
    PathBuf::from(extended)
}

pub fn metric_output(path: &Path) -> PathBuf {
    with_default_suffix(path, METRIC_SUFFIXES, DEFAULT_METRIC_SUFFIX)
}

pub fn label_output(path: &Path) -> PathBuf {
    with_default_suffix(path, &[LABEL_SUFFIX], LABEL_SUFFIX)
}

pub fn freesurfer_output(path: &Path) -> PathBuf {
    with_default_suffix(path, FREESURFER_SUFFIXES, DEFAULT_FREESURFER_SUFFIX)
}

/// Directory an output file will be written to, `.` for bare file names.
pub fn output_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Intermediate file handed between two tool invocations.
///
/// `OnDisk` files are unique and removed on drop. `Planned` only names the
/// file, for runners that never execute anything.
#[derive(Debug)]
pub enum ScratchFile {
    OnDisk(TempPath),
    Planned(PathBuf),
}

impl ScratchFile {
    /// Create an empty, uniquely named file in `dir`.
    pub fn create(dir: &Path, prefix: &str, suffix: &str) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(dir)?;
        Ok(Self::OnDisk(file.into_temp_path()))
    }

    pub fn planned(dir: &Path, prefix: &str, suffix: &str) -> Self {
        Self::Planned(dir.join(format!("{prefix}{suffix}")))
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::OnDisk(path) => &**path,
            Self::Planned(path) => path.as_path(),
        }
    }

    pub fn is_on_disk(&self) -> bool {
        matches!(self, Self::OnDisk(_))
    }

    /// Remove the file, reporting failures that a drop would swallow.
    pub fn close(self) -> io::Result<()> {
        match self {
            Self::OnDisk(path) => path.close(),
            Self::Planned(_) => Ok(()),
        }
    }
}

impl AsRef<Path> for ScratchFile {
    fn as_ref(&self) -> &Path {
        self.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_suffix_is_appended_when_missing() {
        assert_eq!(
            metric_output(Path::new("out/lh.tstat")),
            PathBuf::from("out/lh.tstat.shape.gii")
        );
        assert_eq!(
            metric_output(Path::new("out/lh.tstat.func.gii")),
            PathBuf::from("out/lh.tstat.func.gii")
        );
        assert_eq!(
            metric_output(Path::new("lh.shape.gii")),
            PathBuf::from("lh.shape.gii")
        );
    }

    #[test]
    fn other_gifti_suffixes_are_not_metrics() {
        assert_eq!(
            metric_output(Path::new("lh.label.gii")),
            PathBuf::from("lh.label.gii.shape.gii")
        );
        assert_eq!(
            label_output(Path::new("rois/lh.shape.gii")),
            PathBuf::from("rois/lh.shape.gii.label.gii")
        );
        assert_eq!(
            label_output(Path::new("rois/lh.label.gii")),
            PathBuf::from("rois/lh.label.gii")
        );
    }

    #[test]
    fn freesurfer_outputs_default_to_mgz() {
        assert_eq!(
            freesurfer_output(Path::new("lh.thickness")),
            PathBuf::from("lh.thickness.mgz")
        );
        assert_eq!(
            freesurfer_output(Path::new("lh.sig.nii.gz")),
            PathBuf::from("lh.sig.nii.gz")
        );
    }

    #[test]
    fn output_dir_of_bare_file_is_current_dir() {
        assert_eq!(output_dir(Path::new("map.dscalar.nii")), PathBuf::from("."));
        assert_eq!(
            output_dir(Path::new("results/map.dscalar.nii")),
            PathBuf::from("results")
        );
    }

    #[test]
    fn scratch_file_is_removed_on_close() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchFile::create(dir.path(), "tmp_vertices", ".txt").unwrap();
        let path = scratch.path().to_path_buf();

        assert!(scratch.is_on_disk());
        assert!(path.is_file());
        assert_eq!(path.parent(), Some(dir.path()));
        assert!(path.to_string_lossy().ends_with(".txt"));

        scratch.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn planned_scratch_file_is_never_created() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchFile::planned(&dir.path().join("out"), "tmp", ".shape.gii");

        assert!(!scratch.is_on_disk());
        assert_eq!(scratch.path(), dir.path().join("out").join("tmp.shape.gii"));
        assert!(!dir.path().join("out").exists());
        scratch.close().unwrap();
    }
}
