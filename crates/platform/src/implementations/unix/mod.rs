//! Unix platform implementation (Linux and macOS hosts)

pub mod filesystem;
pub mod process;

/// Unix platform implementation
pub struct UnixPlatform;

impl UnixPlatform {
    /// Create a new Unix platform instance
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> crate::core::Platform {
        use filesystem::UnixFilesystemOperations;
        use process::UnixProcessOperations;

        crate::core::Platform::new(
            Box::new(UnixFilesystemOperations::new()),
            Box::new(UnixProcessOperations::new()),
        )
    }
}
