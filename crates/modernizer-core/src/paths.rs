use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = ".cobol-modernizer";

/// Application directory (~/.cobol-modernizer)
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

/// Path of the optional JSON config file
pub fn config_json_path() -> PathBuf {
    app_dir().join("config.json")
}

/// Directory holding session snapshots and event logs under `data_dir`
pub fn sessions_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("sessions")
}

/// Directory exported artifacts are written to when no output directory is given
pub fn exports_dir(data_dir: &Path, session_id: &str) -> PathBuf {
    data_dir.join("exports").join(session_id)
}
