use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ReframeError, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Locates the CHENyx06 grid, downloading it once if no copy exists.
#[derive(Debug, Clone)]
pub struct GridProvisioner {
    url: String,
    local_path: PathBuf,
    search_paths: Vec<PathBuf>,
    client: Client,
}

impl GridProvisioner {
    pub fn new(url: impl Into<String>, local_path: impl Into<PathBuf>, search_paths: Vec<PathBuf>) -> Self {
        Self {
            url: url.into(),
            local_path: local_path.into(),
            search_paths,
            client: Client::new(),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(
            config.grid_url(),
            config.grid_local_path(),
            config.grid_search_paths(),
        )
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.local_path.file_name()
    }

    /// First existing copy of the grid in the search paths.
    pub fn find_existing(&self) -> Option<PathBuf> {
        if self.local_path.is_file() {
            return Some(self.local_path.clone());
        }
        let file_name = self.file_name()?;
        self.search_paths
            .iter()
            .map(|dir| dir.join(file_name))
            .find(|candidate| candidate.is_file())
    }

    /// Returns an absolute path to the grid, downloading it if needed.
    ///
    /// PROJ only opens `+grids=` values starting with `/`, `./` or `../` as
    /// files, so the result is always canonical.
    pub async fn ensure_available(&self) -> Result<PathBuf> {
        let path = match self.find_existing() {
            Some(path) => {
                tracing::info!("Found shift grid: {}", path.display());
                path
            }
            None => {
                tracing::info!(
                    "No shift grid found in {} search path(s), downloading from {}",
                    self.search_paths.len(),
                    self.url
                );
                self.download().await?;
                tracing::info!("Shift grid saved to {}", self.local_path.display());
                self.local_path.clone()
            }
        };

        tokio::fs::canonicalize(&path)
            .await
            .map_err(|e| self.unavailable(format!("cannot resolve {}: {}", path.display(), e)))
    }

    fn unavailable(&self, reason: String) -> ReframeError {
        ReframeError::ResourceUnavailable {
            resource: format!("shift grid {}", self.url),
            reason,
        }
    }

    fn part_path(&self) -> PathBuf {
        let mut part_name = self.file_name().unwrap_or_default().to_os_string();
        part_name.push(".part");
        self.local_path.with_file_name(part_name)
    }

    async fn download(&self) -> Result<()> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.unavailable(e.to_string()))?;

        tracing::debug!("Grid download status: {}", response.status());
        if !response.status().is_success() {
            return Err(self.unavailable(format!("HTTP {}", response.status())));
        }

        if let Some(parent) = self.local_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    self.unavailable(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }

        // 先寫到 .part，完整下載後才改名；任何失敗都把 .part 刪掉
        let part_path = self.part_path();
        let outcome = self.store(response, &part_path).await;
        if outcome.is_err() {
            let _ = tokio::fs::remove_file(&part_path).await;
        }
        outcome
    }

    async fn store(&self, mut response: reqwest::Response, part_path: &Path) -> Result<()> {
        let io_failure = |action: &str, e: std::io::Error| {
            self.unavailable(format!("cannot {} {}: {}", action, part_path.display(), e))
        };

        let mut file = tokio::fs::File::create(part_path)
            .await
            .map_err(|e| io_failure("create", e))?;
        let mut written: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.unavailable(e.to_string()))?
        {
            file.write_all(&chunk).await.map_err(|e| io_failure("write", e))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| io_failure("flush", e))?;
        drop(file);

        if written == 0 {
            return Err(self.unavailable("empty response body".to_string()));
        }

        tokio::fs::rename(part_path, &self.local_path)
            .await
            .map_err(|e| io_failure("rename", e))?;
        tracing::debug!("Wrote {} bytes of grid data", written);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_existing_prefers_local_path() {
        let local = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        std::fs::write(local.path().join("chenyx06etrs.gsb"), b"grid").unwrap();
        std::fs::write(other.path().join("chenyx06etrs.gsb"), b"grid").unwrap();

        let provisioner = GridProvisioner::new(
            "http://localhost/unused",
            local.path().join("chenyx06etrs.gsb"),
            vec![other.path().to_path_buf()],
        );

        assert_eq!(
            provisioner.find_existing(),
            Some(local.path().join("chenyx06etrs.gsb"))
        );
    }

    #[test]
    fn test_find_existing_walks_search_paths() {
        let local = TempDir::new().unwrap();
        let empty = TempDir::new().unwrap();
        let proj_lib = TempDir::new().unwrap();
        std::fs::write(proj_lib.path().join("chenyx06etrs.gsb"), b"grid").unwrap();

        let provisioner = GridProvisioner::new(
            "http://localhost/unused",
            local.path().join("chenyx06etrs.gsb"),
            vec![empty.path().to_path_buf(), proj_lib.path().to_path_buf()],
        );

        assert_eq!(
            provisioner.find_existing(),
            Some(proj_lib.path().join("chenyx06etrs.gsb"))
        );
    }

    #[test]
    fn test_find_existing_none() {
        let local = TempDir::new().unwrap();
        let provisioner =
            GridProvisioner::new("http://localhost/unused", local.path().join("chenyx06etrs.gsb"), vec![]);
        assert!(provisioner.find_existing().is_none());
    }
}
