//! Shared utilities for integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use vhost_dispatch::SharedVhosts;

/// Renders a site table with one `[[sites]]` entry per `(name, address)`.
pub fn sites_toml(sites: &[(&str, &str)]) -> String {
    let mut out = String::new();
    for (name, address) in sites {
        out.push_str(&format!(
            "[[sites]]\nname = \"{}\"\naddresses = [\"{}\"]\n\n",
            name, address
        ));
    }
    out
}

/// Writes `content` as `vhosts.toml` inside a fresh temp dir.
pub fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vhosts.toml");
    fs::write(&path, content).unwrap();
    (dir, path)
}

/// Replaces the config atomically, the way editors save files.
#[allow(dead_code)]
pub fn rewrite_config(path: &Path, content: &str) {
    let staging = path.with_extension("toml.tmp");
    fs::write(&staging, content).unwrap();
    fs::rename(&staging, path).unwrap();
}

/// Polls `key` until it resolves to `expected` (site name) or the deadline passes.
#[allow(dead_code)]
pub async fn wait_for_site<S>(
    vhosts: &SharedVhosts<S>,
    key: &str,
    expected: Option<&str>,
    site_name: impl Fn(&S) -> String,
) -> bool
where
    S: Clone,
{
    for _ in 0..100 {
        let current = vhosts.resolve(key).map(|r| site_name(&r.site));
        if current.as_deref() == expected {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    false
}
