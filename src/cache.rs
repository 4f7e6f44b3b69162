//! Cache of pre-composited, pre-scaled bitmap+mask images.
//!
//! Scaling a bitmap and blending its alpha mask is the most expensive part
//! of repeated image draws (scrolling redraws the same images at the same
//! size over and over). The result is keyed by content identity and target
//! size, never by pixel comparison, and shared across all backends.

use std::sync::Arc;

use log::debug;
use lru::LruCache;
use parking_lot::Mutex;
use tiny_skia::{FilterQuality, Mask, MaskType, Pixmap, PixmapPaint, Transform};

use crate::bitmap::{Bitmap, ContentKey};

/// Identity of one cached composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub width: i32,
    pub height: i32,
    pub bitmap: ContentKey,
    pub mask: Option<ContentKey>,
}

struct Inner {
    entries: LruCache<CacheKey, Arc<Pixmap>>,
    used_bytes: usize,
}

/// Shared LRU cache with a byte budget.
pub struct ImageCache {
    inner: Mutex<Inner>,
    budget_bytes: usize,
}

impl ImageCache {
    pub const DEFAULT_BUDGET_BYTES: usize = 64 * 1024 * 1024;

    pub fn new(budget_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::unbounded(),
                used_bytes: 0,
            }),
            budget_bytes,
        }
    }

    /// A single entry may not swamp the cache; anything above 70% of the
    /// budget is drawn directly instead of cached.
    pub fn accepts(&self, bytes: usize) -> bool {
        bytes <= self.budget_bytes / 10 * 7
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<Pixmap>> {
        self.inner.lock().entries.get(key).cloned()
    }

    /// Insert a composite, evicting least-recently-used entries until the
    /// budget holds again.
    pub fn insert(&self, key: CacheKey, image: Arc<Pixmap>) {
        let bytes = image.data().len();
        let mut inner = self.inner.lock();
        if let Some(old) = inner.entries.put(key, image) {
            inner.used_bytes -= old.data().len();
        }
        inner.used_bytes += bytes;
        while inner.used_bytes > self.budget_bytes {
            match inner.entries.pop_lru() {
                Some((_, evicted)) => {
                    inner.used_bytes -= evicted.data().len();
                    debug!("evicted cached image, {} bytes in use", inner.used_bytes);
                }
                None => break,
            }
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.inner.lock().used_bytes
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.used_bytes = 0;
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BUDGET_BYTES)
    }
}

/// Render `bitmap`, scaled to the target size and with `mask` applied, into
/// a fresh image. Returns `None` for degenerate targets.
pub fn compose(bitmap: &Bitmap, mask: Option<&Bitmap>, width: i32, height: i32) -> Option<Pixmap> {
    let mut result = Pixmap::new(width.max(0) as u32, height.max(0) as u32)?;
    let scale_x = width as f32 / bitmap.width() as f32;
    let scale_y = height as f32 / bitmap.height() as f32;
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    result.draw_pixmap(
        0,
        0,
        bitmap.pixmap().as_ref(),
        &paint,
        Transform::from_scale(scale_x, scale_y),
        None,
    );
    if let Some(mask) = mask {
        let scaled = scaled_mask(mask, width, height)?;
        result.apply_mask(&scaled);
    }
    Some(result)
}

/// Scale a mask bitmap's alpha to the target size as a coverage mask.
fn scaled_mask(mask: &Bitmap, width: i32, height: i32) -> Option<Mask> {
    let mut scaled = Pixmap::new(width as u32, height as u32)?;
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    scaled.draw_pixmap(
        0,
        0,
        mask.pixmap().as_ref(),
        &paint,
        Transform::from_scale(
            width as f32 / mask.width() as f32,
            height as f32 / mask.height() as f32,
        ),
        None,
    );
    Some(Mask::from_pixmap(scaled.as_ref(), MaskType::Alpha))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Color as SkColor;

    fn key_for(bitmap: &Bitmap, width: i32, height: i32) -> CacheKey {
        CacheKey {
            width,
            height,
            bitmap: bitmap.content_key(),
            mask: None,
        }
    }

    fn image(width: u32, height: u32) -> Arc<Pixmap> {
        Arc::new(Pixmap::new(width, height).unwrap())
    }

    #[test]
    fn hit_and_miss() {
        let cache = ImageCache::default();
        let bitmap = Bitmap::new(8, 8).unwrap();
        let key = key_for(&bitmap, 16, 16);
        assert!(cache.get(&key).is_none());
        cache.insert(key, image(16, 16));
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn mutation_changes_the_key() {
        let cache = ImageCache::default();
        let mut bitmap = Bitmap::new(8, 8).unwrap();
        cache.insert(key_for(&bitmap, 16, 16), image(16, 16));
        bitmap.pixmap_mut().fill(SkColor::WHITE);
        assert!(cache.get(&key_for(&bitmap, 16, 16)).is_none());
    }

    #[test]
    fn eviction_respects_budget() {
        // Budget of 3 small images; inserting a fourth evicts the oldest.
        let bytes = 4 * 4 * 4;
        let cache = ImageCache::new(3 * bytes);
        let bitmaps: Vec<_> = (0..4).map(|_| Bitmap::new(4, 4).unwrap()).collect();
        for b in &bitmaps {
            cache.insert(key_for(b, 4, 4), image(4, 4));
        }
        assert_eq!(cache.used_bytes(), 3 * bytes);
        assert!(cache.get(&key_for(&bitmaps[0], 4, 4)).is_none());
        assert!(cache.get(&key_for(&bitmaps[3], 4, 4)).is_some());
    }

    #[test]
    fn oversized_entries_are_rejected_up_front() {
        let cache = ImageCache::new(1000);
        assert!(cache.accepts(700));
        assert!(!cache.accepts(701));
    }

    #[test]
    fn compose_scales_bitmap() {
        let mut bitmap = Bitmap::new(2, 2).unwrap();
        bitmap.pixmap_mut().fill(SkColor::from_rgba8(10, 20, 30, 255));
        let result = compose(&bitmap, None, 8, 8).unwrap();
        assert_eq!((result.width(), result.height()), (8, 8));
        let center = result.pixels()[4 * 8 + 4].demultiply();
        assert_eq!((center.red(), center.green(), center.blue()), (10, 20, 30));
    }

    #[test]
    fn compose_applies_mask() {
        let mut bitmap = Bitmap::new(4, 4).unwrap();
        bitmap.pixmap_mut().fill(SkColor::from_rgba8(50, 60, 70, 255));
        let mut mask = Bitmap::new(4, 4).unwrap();
        mask.pixmap_mut().fill(SkColor::from_rgba8(0, 0, 0, 0));
        let result = compose(&bitmap, Some(&mask), 4, 4).unwrap();
        assert!(result.pixels().iter().all(|p| p.alpha() == 0));
    }
}
