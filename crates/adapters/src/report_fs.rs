//! Report file writer, whole or split into numbered parts

use post_insights_domain::split_chunks;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, thiserror::Error)]
pub enum ReportWriteError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ReportWriter;

impl ReportWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write `content` to `path`, creating parent directories
    pub async fn write(&self, path: &Path, content: &str) -> Result<(), ReportWriteError> {
        let io_err = |source| ReportWriteError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(io_err)?;
            }
        }
        fs::write(path, content).await.map_err(io_err)?;

        tracing::info!(path = %path.display(), bytes = content.len(), "Report written");
        Ok(())
    }

    /// Write `content` as `<base>_part1.md`, `<base>_part2.md`, ... of at most
    /// `chunk_size` characters each
    pub async fn write_chunked(
        &self,
        base: &Path,
        content: &str,
        chunk_size: usize,
    ) -> Result<Vec<PathBuf>, ReportWriteError> {
        let chunks = split_chunks(content, chunk_size);
        let mut written = Vec::with_capacity(chunks.len());

        for (idx, chunk) in chunks.iter().enumerate() {
            let path = part_path(base, idx + 1);
            self.write(&path, chunk).await?;
            written.push(path);
        }

        Ok(written)
    }
}

/// `reports/acme.md` -> `reports/acme_part2.md`
pub fn part_path(base: &Path, part: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    base.with_file_name(format!("{}_part{}.md", stem, part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports").join("analysis.md");

        ReportWriter::new().write(&path, "# Report\n").await.unwrap();

        assert_eq!(fs::read_to_string(&path).await.unwrap(), "# Report\n");
    }

    #[tokio::test]
    async fn test_write_chunked_splits_by_chars() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("competitor_analysis_nutrilak.md");
        let content = "я".repeat(25);

        let parts = ReportWriter::new()
            .write_chunked(&base, &content, 10)
            .await
            .unwrap();

        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts[2].file_name().unwrap(),
            "competitor_analysis_nutrilak_part3.md"
        );
        let last = fs::read_to_string(&parts[2]).await.unwrap();
        assert_eq!(last.chars().count(), 5);
    }

    #[test]
    fn test_part_path_without_extension() {
        assert_eq!(
            part_path(Path::new("out/report"), 1),
            PathBuf::from("out/report_part1.md")
        );
    }
}
