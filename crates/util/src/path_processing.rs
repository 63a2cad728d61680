use std::path::PathBuf;

use dirs_next::{config_dir, home_dir};

/// Directory under the platform config dir that holds Conform's files.
pub const APP_DIR_NAME: &str = "conform";
/// File the terminal UI writes logs to while it owns the terminal.
pub const LOG_FILE_NAME: &str = "conform.log";

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    if let Some(rest) = trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        return home().join(rest);
    }
    PathBuf::from(trimmed)
}

/// `~/.config/conform` on most platforms.
pub fn config_root() -> PathBuf {
    config_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR_NAME)
}

pub fn default_log_path() -> PathBuf {
    config_root().join(LOG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_plain_paths_alone() {
        assert_eq!(expand_tilde(" /tmp/conform.json "), PathBuf::from("/tmp/conform.json"));
    }

    #[test]
    fn expands_home_prefix() {
        let Some(home) = home_dir() else {
            return;
        };
        assert_eq!(expand_tilde("~/conform/config.json"), home.join("conform/config.json"));
        assert_eq!(expand_tilde("~"), home);
    }

    #[test]
    fn log_file_lives_in_config_root() {
        assert!(default_log_path().ends_with("conform/conform.log"));
    }
}
