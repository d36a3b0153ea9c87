use std::path::PathBuf;

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_entry_path() -> PathBuf {
    PathBuf::from("src/index.ts")
}

pub(crate) fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}
