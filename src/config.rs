//! Backend construction options.

use crate::error::GraphicsError;

/// Options fixed at backend construction.
///
/// The defaults match the production behavior: GPU surfaces are attempted
/// when a context is available, antialiasing is on, and a synchronous flush
/// is forced after 1000 unflushed image draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicsConfig {
    /// Never attempt GPU surface creation, even if a context is available.
    pub force_raster: bool,
    /// Initial antialiasing state; may be changed later by the caller.
    pub antialias: bool,
    /// Number of image draws allowed to queue up before a synchronous
    /// flush is forced. Bounds command-queue growth under pathological
    /// many-tiny-bitmaps load.
    pub pending_ops_flush_threshold: u32,
}

impl GraphicsConfig {
    pub fn standard() -> Self {
        Self {
            force_raster: false,
            antialias: true,
            pending_ops_flush_threshold: 1000,
        }
    }

    pub fn validate(&self) -> Result<(), GraphicsError> {
        if self.pending_ops_flush_threshold == 0 {
            return Err(GraphicsError::InvalidConfig(
                "pending_ops_flush_threshold must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_values() {
        let config = GraphicsConfig::standard();
        assert!(!config.force_raster);
        assert!(config.antialias);
        assert_eq!(config.pending_ops_flush_threshold, 1000);
    }

    #[test]
    fn validation_rejects_zero_threshold() {
        let config = GraphicsConfig {
            pending_ops_flush_threshold: 0,
            ..GraphicsConfig::standard()
        };
        assert!(config.validate().is_err());
    }
}
