//! Config and data directory discovery.

use std::path::{Path, PathBuf};

/// Application name used for XDG paths.
const APP_NAME: &str = "zenith";

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "ZENITH_CONFIG_DIR";

/// Get the XDG config directory for zenith.
///
/// Returns `$ZENITH_CONFIG_DIR` when set, otherwise
/// `~/.config/zenith/` (or platform equivalent).
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Expand `~` to the home directory in paths.
pub fn expand_path(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str() {
        if s == "~"
            && let Some(home) = dirs::home_dir()
        {
            return home;
        }
        if let Some(rest) = s.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_path(Path::new("~/zenith")), home.join("zenith"));
        assert_eq!(expand_path(Path::new("~")), home);
    }

    #[test]
    fn test_expand_leaves_other_paths() {
        assert_eq!(
            expand_path(Path::new("/var/lib/zenith")),
            PathBuf::from("/var/lib/zenith")
        );
        assert_eq!(expand_path(Path::new("~other")), PathBuf::from("~other"));
    }
}
