//! Effective user queries

/// Effective user id of this process
#[must_use]
#[allow(unsafe_code)]
pub fn effective_uid() -> u32 {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() }
}

/// Whether the installer runs with root privileges
#[must_use]
pub fn is_root() -> bool {
    effective_uid() == 0
}

/// Split the output of `id -nG` into group names
#[must_use]
pub fn parse_group_list(output: &str) -> Vec<String> {
    output.split_whitespace().map(str::to_string).collect()
}
