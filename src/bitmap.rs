//! Host bitmap wrapper with content identity for cache keying.

use std::sync::atomic::{AtomicU64, Ordering};

use tiny_skia::{Mask, MaskType, Pixmap};

use crate::error::GraphicsError;

static NEXT_BITMAP_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a bitmap's pixel content: a process-unique id plus a version
/// bumped on every mutation. Used as a cache key component so cached
/// composites never require per-pixel hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentKey {
    pub id: u64,
    pub version: u64,
}

/// A bitmap supplied by the document collaborator.
///
/// Wraps renderer pixels with the content identity needed by the
/// compositing cache. Mutable pixel access bumps the version.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pixmap: Pixmap,
    id: u64,
    version: u64,
}

impl Bitmap {
    /// Transparent bitmap of the given size.
    pub fn new(width: i32, height: i32) -> Result<Self, GraphicsError> {
        if width <= 0 || height <= 0 {
            return Err(GraphicsError::InvalidSize { width, height });
        }
        let pixmap = Pixmap::new(width as u32, height as u32)
            .ok_or(GraphicsError::InvalidSize { width, height })?;
        Ok(Self::from_pixmap(pixmap))
    }

    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self {
            pixmap,
            id: NEXT_BITMAP_ID.fetch_add(1, Ordering::Relaxed),
            version: 0,
        }
    }

    pub fn width(&self) -> i32 {
        self.pixmap.width() as i32
    }

    pub fn height(&self) -> i32 {
        self.pixmap.height() as i32
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Mutable pixel access. Any write invalidates cached composites, so
    /// the version is bumped unconditionally.
    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        self.version += 1;
        &mut self.pixmap
    }

    pub fn content_key(&self) -> ContentKey {
        ContentKey {
            id: self.id,
            version: self.version,
        }
    }

    /// True if every pixel is fully opaque. A fully opaque alpha mask
    /// contributes nothing and is treated as absent by the callers.
    pub fn is_fully_opaque(&self) -> bool {
        self.pixmap.pixels().iter().all(|p| p.alpha() == 255)
    }

    /// Coverage mask built from this bitmap's alpha channel.
    pub fn to_mask(&self) -> Mask {
        Mask::from_pixmap(self.pixmap.as_ref(), MaskType::Alpha)
    }
}
