use std::{env, ffi::OsString, path::PathBuf};

use crate::{freesurfer::FREESURFER_HOME_VAR, workbench::DEFAULT_WB_COMMAND};

pub const WB_COMMAND_VAR: &str = "WB_COMMAND";

/// Where the external tools live and whether to actually run them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub wb_command: PathBuf,
    pub freesurfer_home: Option<PathBuf>,
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wb_command: PathBuf::from(DEFAULT_WB_COMMAND),
            freesurfer_home: None,
            dry_run: false,
        }
    }
}

impl Config {
    /// `WB_COMMAND` overrides the `wb_command` found on `PATH`;
    /// `FREESURFER_HOME` locates FreeSurfer.
    pub fn from_env() -> Self {
        Self::from_vars(
            env::var_os(WB_COMMAND_VAR),
            env::var_os(FREESURFER_HOME_VAR),
        )
    }

    fn from_vars(wb_command: Option<OsString>, freesurfer_home: Option<OsString>) -> Self {
        Self {
            wb_command: non_empty(wb_command)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WB_COMMAND)),
            freesurfer_home: non_empty(freesurfer_home),
            dry_run: false,
        }
    }

    pub fn with_wb_command(mut self, wb_command: Option<PathBuf>) -> Self {
        if let Some(wb_command) = wb_command {
            self.wb_command = wb_command;
        }
        self
    }

    pub fn with_freesurfer_home(mut self, home: Option<PathBuf>) -> Self {
        if home.is_some() {
            self.freesurfer_home = home;
        }
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Empty variables count as unset.
fn non_empty(value: Option<OsString>) -> Option<PathBuf> {
    value.filter(|value| !value.is_empty()).map(PathBuf::from)
}
