//! 报表输出服务 - 业务能力层
//!
//! 只负责"把报表完整写到指定文件"，每次都先删除旧文件再写入

use crate::error::OutputError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// 输出目标
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// 文件存在则删除，返回是否删除了旧文件
    async fn remove_if_exists(&self, path: &Path) -> Result<bool, OutputError>;

    /// 写入内容
    async fn write(&self, path: &Path, contents: &[u8]) -> Result<(), OutputError>;

    /// 完整替换文件内容
    async fn replace(&self, path: &Path, contents: &[u8]) -> Result<(), OutputError> {
        if self.remove_if_exists(path).await? {
            debug!("已删除旧数据: {}", path.display());
        }
        self.write(path, contents).await
    }
}

/// 写本地文件，目录不存在时自动创建
#[derive(Debug, Default, Clone)]
pub struct OutputWriter;

impl OutputWriter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OutputSink for OutputWriter {
    async fn remove_if_exists(&self, path: &Path) -> Result<bool, OutputError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(OutputError::DeleteFailed {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> Result<(), OutputError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !fs::try_exists(dir).await.unwrap_or(false) {
                fs::create_dir_all(dir)
                    .await
                    .map_err(|e| OutputError::CreateDirFailed {
                        path: dir.display().to_string(),
                        source: e,
                    })?;
                debug!("已创建输出目录: {}", dir.display());
            }
        }

        fs::write(path, contents)
            .await
            .map_err(|e| OutputError::WriteFailed {
                path: path.display().to_string(),
                source: e,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replace_overwrites_longer_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(&path, "a much longer previous report body").unwrap();

        OutputWriter::new().replace(&path, b"[]").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_write_creates_missing_folders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("output").join("report.csv");

        OutputWriter::new().replace(&path, b"a,b\n").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"a,b\n");
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let removed = OutputWriter::new()
            .remove_if_exists(&dir.path().join("nothing.json"))
            .await
            .unwrap();
        assert!(!removed);
    }

    #[tokio::test]
    async fn test_unwritable_destination_fails() {
        let dir = tempfile::tempdir().unwrap();
        // 目标路径是一个目录
        let result = OutputWriter::new().write(dir.path(), b"x").await;
        assert!(matches!(result, Err(OutputError::WriteFailed { .. })));
    }
}
