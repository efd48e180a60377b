//! Destination directory management.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Result;
use crate::fs::naming::sanitize_path_component;

/// Get the destination folder for an account.
pub fn get_account_folder(config: &Config, account: &str) -> Result<PathBuf> {
    let folder = sanitize_path_component(account)?;
    Ok(config.download_directory().join(folder))
}

/// Ensure a directory exists, creating it if necessary.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        tokio::fs::create_dir_all(path).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_account_folder() {
        let mut config = Config::default();
        config.options.download_directory = Some(PathBuf::from("/downloads"));

        let path = get_account_folder(&config, "demo").unwrap();
        assert_eq!(path, PathBuf::from("/downloads/demo"));

        assert!(get_account_folder(&config, "../demo").is_err());
    }

    #[tokio::test]
    async fn test_ensure_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        ensure_dir(&nested).await.unwrap();
        assert!(nested.is_dir());

        // Second call is a no-op
        ensure_dir(&nested).await.unwrap();
    }
}
