//! Error types and the unrecoverable-failure policy.

use log::error;
use thiserror::Error;

/// Errors reported to callers. Most drawing entry points do not return
/// these; bad input degenerates to a no-op instead, matching what windowing
/// toolkits expect from a paint backend.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphicsError {
    #[error("invalid size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// GPU device condition as reported by the host context after a submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuHealth {
    Healthy,
    /// The device ran out of memory mid-frame.
    OutOfMemory,
    /// The device was lost or the context abandoned.
    Abandoned,
}

/// Abort on failures that leave no consistent pixels to continue with.
/// There is no path to recover a lost device or a failed surface
/// allocation mid-paint; continuing would render from poisoned state.
pub(crate) fn fatal(what: &str) -> ! {
    error!("fatal graphics failure: {what}");
    std::process::abort();
}
