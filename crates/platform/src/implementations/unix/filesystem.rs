//! Unix filesystem operations implementation

use async_trait::async_trait;
use nodeup_errors::PlatformError;
use nodeup_events::{AppEvent, EventEmitter, PlatformEvent};
use std::path::Path;
use tokio::fs;

use crate::core::PlatformContext;
use crate::filesystem::FilesystemOperations;

/// Unix implementation of filesystem operations
pub struct UnixFilesystemOperations;

impl UnixFilesystemOperations {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnixFilesystemOperations {
    fn default() -> Self {
        Self::new()
    }
}

fn fs_error(operation: &str, path: &Path, err: &std::io::Error) -> PlatformError {
    PlatformError::FilesystemOperationFailed {
        operation: operation.to_string(),
        message: format!("{}: {err}", path.display()),
    }
}

#[async_trait]
impl FilesystemOperations for UnixFilesystemOperations {
    async fn create_dir_all(
        &self,
        _ctx: &PlatformContext,
        path: &Path,
    ) -> Result<(), PlatformError> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| fs_error("create_dir_all", path, &e))
    }

    async fn write_file(
        &self,
        _ctx: &PlatformContext,
        path: &Path,
        contents: &[u8],
    ) -> Result<(), PlatformError> {
        fs::write(path, contents)
            .await
            .map_err(|e| fs_error("write_file", path, &e))
    }

    async fn move_file(
        &self,
        ctx: &PlatformContext,
        src: &Path,
        dst: &Path,
    ) -> Result<(), PlatformError> {
        let copied = match fs::rename(src, dst).await {
            Ok(()) => false,
            // EXDEV and friends: fall back to copy + delete
            Err(rename_err) if src.is_file() => {
                fs::copy(src, dst)
                    .await
                    .map_err(|e| PlatformError::FilesystemOperationFailed {
                        operation: "move_file".to_string(),
                        message: format!(
                            "{}: rename failed ({rename_err}), copy failed ({e})",
                            src.display()
                        ),
                    })?;
                fs::remove_file(src)
                    .await
                    .map_err(|e| fs_error("move_file", src, &e))?;
                true
            }
            Err(e) => return Err(fs_error("move_file", src, &e)),
        };

        ctx.emit(AppEvent::Platform(PlatformEvent::FileMoved {
            source_path: src.display().to_string(),
            target_path: dst.display().to_string(),
            copied,
        }));
        Ok(())
    }

    async fn exists(&self, _ctx: &PlatformContext, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }
}
