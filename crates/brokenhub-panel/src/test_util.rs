use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Create an empty scratch directory unique to the calling test.
pub fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("brokenhub-panel-{}", uuid::Uuid::now_v7()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

/// Write an executable `/bin/sh` script into `dir` and return its path.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod script");
    path
}
