//! Clip regions as normalized rectangle decompositions.
//!
//! Regions are always stored and applied as rectangle lists, never as
//! arbitrary polygons; polygon clips are prone to off-by-one coverage at
//! the edges, so callers decompose to rectangles first.

use tiny_skia::{FillRule, Mask, Transform};

use crate::geometry::IRect;
use crate::path;

/// Current visible drawing area: an ordered set of rectangles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Region {
    rects: Vec<IRect>,
}

impl Region {
    pub fn from_rect(rect: IRect) -> Self {
        Self::from_rects(vec![rect])
    }

    /// Normalizes the list: drops empty rects and orders top-down,
    /// left-right, so equal regions compare equal regardless of the
    /// caller's rect order.
    pub fn from_rects(mut rects: Vec<IRect>) -> Self {
        rects.retain(|r| !r.is_empty());
        rects.sort_by_key(|r| (r.y, r.x, r.h, r.w));
        rects.dedup();
        Self { rects }
    }

    pub fn rects(&self) -> &[IRect] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Bounding rectangle of the whole region.
    pub fn bounds(&self) -> IRect {
        self.rects
            .iter()
            .fold(IRect::default(), |acc, r| acc.union(r))
    }

    /// True if the region is a single rectangle covering `bounds` whole.
    pub fn covers(&self, bounds: IRect) -> bool {
        matches!(self.rects.as_slice(), [only] if only.contains(&bounds))
    }

    /// Render the region into a coverage mask sized to the surface.
    ///
    /// Returns `None` when the region needs no mask (it covers the whole
    /// surface), so draws can take the unclipped fast path.
    pub fn to_mask(&self, width: u32, height: u32) -> Option<Mask> {
        let surface = IRect::from_size(width as i32, height as i32);
        if self.covers(surface) {
            return None;
        }
        let mut mask = Mask::new(width, height)?;
        if let Some(clip_path) = path::from_rects(self.rects.iter()) {
            // Hard-edged clip; antialiased clip boundaries would bleed into
            // neighboring update regions.
            mask.fill_path(&clip_path, FillRule::Winding, false, Transform::identity());
        }
        Some(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_makes_order_irrelevant() {
        let a = Region::from_rects(vec![IRect::new(0, 0, 5, 5), IRect::new(10, 0, 5, 5)]);
        let b = Region::from_rects(vec![IRect::new(10, 0, 5, 5), IRect::new(0, 0, 5, 5)]);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_rects_are_dropped() {
        let region = Region::from_rects(vec![IRect::new(0, 0, 0, 5), IRect::new(1, 1, 2, 2)]);
        assert_eq!(region.rects().len(), 1);
    }

    #[test]
    fn bounds_spans_all_rects() {
        let region = Region::from_rects(vec![IRect::new(0, 0, 5, 5), IRect::new(10, 10, 5, 5)]);
        assert_eq!(region.bounds(), IRect::new(0, 0, 15, 15));
    }

    #[test]
    fn full_cover_needs_no_mask() {
        let region = Region::from_rect(IRect::from_size(20, 10));
        assert!(region.covers(IRect::from_size(20, 10)));
        assert!(region.to_mask(20, 10).is_none());
    }

    #[test]
    fn partial_region_builds_mask() {
        let region = Region::from_rect(IRect::new(0, 0, 5, 10));
        let mask = region.to_mask(10, 10).unwrap();
        assert_eq!(mask.data()[0], 255);
        assert_eq!(mask.data()[9], 0);
    }

    #[test]
    fn oversized_single_rect_still_covers() {
        let region = Region::from_rect(IRect::new(-5, -5, 30, 30));
        assert!(region.covers(IRect::from_size(20, 20)));
    }
}
