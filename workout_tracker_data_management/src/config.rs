//! Where the workout slot lives on disk.

use std::{ffi::OsString, path::PathBuf};

use const_format::concatcp;

use crate::DATA_DIR;

pub const DATA_DIR_ENV: &str = "WORKOUT_TRACKER_DATA_DIR";

const FALLBACK_DATA_DIR: &str = concatcp!("./", DATA_DIR);

/// Resolves the data directory in priority order:
/// 1. `cli_arg`
/// 2. the `WORKOUT_TRACKER_DATA_DIR` environment variable
/// 3. `data/` under the project root
/// 4. `./data/`
pub fn resolve_data_dir(cli_arg: Option<PathBuf>) -> PathBuf {
    resolve_data_dir_from(
        cli_arg,
        std::env::var_os(DATA_DIR_ENV),
        project_root::get_project_root().ok(),
    )
}

fn resolve_data_dir_from(cli_arg: Option<PathBuf>, env_value: Option<OsString>, project_root: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = cli_arg {
        return dir;
    }

    if let Some(dir) = env_value.filter(|value| !value.is_empty()) {
        return PathBuf::from(dir);
    }

    match project_root {
        Some(root) => root.join(DATA_DIR),
        None => PathBuf::from(FALLBACK_DATA_DIR),
    }
}
