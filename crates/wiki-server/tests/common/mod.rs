#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tempfile::TempDir;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// Empty config file so tests never pick up a developer's real config.
fn config_file() -> &'static Path {
    static CONFIG: OnceLock<(TempDir, PathBuf)> = OnceLock::new();
    let (_, path) = CONFIG.get_or_init(|| {
        let dir = tempfile::tempdir().expect("failed to create config dir for tests");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").expect("failed to write test config");
        (dir, path)
    });
    path
}

/// Create a configured `wiki` command serving `content_dir`.
#[allow(dead_code)]
pub fn wiki_cmd(content_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wiki"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("WIKI_CONFIG", config_file());
    cmd.env("WIKI_CONTENT_DIR", content_dir);
    cmd.env_remove("WIKI_PORT");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Write `<root>/<dir>/<name>.md` for each `("dir/name", text)` pair.
#[allow(dead_code)]
pub fn write_docs(root: &Path, docs: &[(&str, &str)]) {
    for (id, text) in docs {
        let path = root.join(format!("{id}.md"));
        std::fs::create_dir_all(path.parent().expect("document has a parent"))
            .expect("create document dir");
        std::fs::write(&path, text).expect("write document");
    }
}
