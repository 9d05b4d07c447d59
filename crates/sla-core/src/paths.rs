use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const HELPDESK_DIR: &str = ".helpdesk";
pub const CONFIG_FILE: &str = ".helpdesk/config.yaml";
pub const TICKETS_FILE: &str = ".helpdesk/tickets.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn helpdesk_dir(root: &Path) -> PathBuf {
    root.join(HELPDESK_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn tickets_path(root: &Path) -> PathBuf {
    root.join(TICKETS_FILE)
}

pub fn is_initialized(root: &Path) -> bool {
    helpdesk_dir(root).is_dir()
}
