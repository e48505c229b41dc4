//! Process elevation check
//!
//! Device enable/disable needs administrative rights on Windows; without
//! them the external tools fail with access errors that surface as failed
//! actions. The check runs once at startup so the UI can warn up front.

/// Whether the current process runs with administrative rights.
#[cfg(windows)]
pub fn is_elevated() -> bool {
    unsafe { windows_sys::Win32::UI::Shell::IsUserAnAdmin() != 0 }
}

#[cfg(not(windows))]
pub fn is_elevated() -> bool {
    false
}
