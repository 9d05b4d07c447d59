use sla_core::paths::HELPDESK_DIR;
use std::path::{Path, PathBuf};

/// Resolve the helpdesk root directory.
///
/// Priority:
/// 1. `--root` flag / `HELPDESK_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.helpdesk/`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_helpdesk_root(&cwd).unwrap_or(cwd)
}

fn find_helpdesk_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(HELPDESK_DIR).is_dir())
        .map(Path::to_path_buf)
}
