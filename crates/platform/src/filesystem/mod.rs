//! Filesystem operations used while materializing configuration

use async_trait::async_trait;
use nodeup_errors::PlatformError;
use std::path::Path;

use crate::core::PlatformContext;

/// Trait for filesystem operations
#[async_trait]
pub trait FilesystemOperations: Send + Sync {
    /// Create directory and all parent directories
    async fn create_dir_all(&self, ctx: &PlatformContext, path: &Path)
        -> Result<(), PlatformError>;

    /// Write a file, creating or truncating it
    async fn write_file(
        &self,
        ctx: &PlatformContext,
        path: &Path,
        contents: &[u8],
    ) -> Result<(), PlatformError>;

    /// Move a file, falling back to copy and delete across filesystems
    async fn move_file(
        &self,
        ctx: &PlatformContext,
        src: &Path,
        dst: &Path,
    ) -> Result<(), PlatformError>;

    /// Check if a path exists
    async fn exists(&self, ctx: &PlatformContext, path: &Path) -> bool;
}
