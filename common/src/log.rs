//! Logging macros shared by every crate.
//!
//! These are thin wrappers over `tracing` so call sites read the same across
//! the workspace. `success!` carries its own target so terminal formatters can
//! render it apart from plain info lines.

pub const SUCCESS_TARGET: &str = "scopr::success";
pub const PRINT_TARGET: &str = "scopr::print";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "scopr::success", $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::tracing::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::tracing::debug!($($arg)*)
    };
}
