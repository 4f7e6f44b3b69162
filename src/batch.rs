//! Delayed polygon fills.
//!
//! Document layout engines often split one visual area into many adjacent
//! polygons and fill them one by one. Drawn individually with antialiasing,
//! the shared edges blend against the background and show up as hairline
//! seams. Compatible consecutive fills are therefore held back and drawn in
//! one pass; see [`crate::backend::Graphics`] for the draw side.

use tiny_skia::Rect;

use crate::geometry::{rects_overlap, PolyPolygon};
use crate::path;

/// Outcome of offering a polygon to the pending batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    /// The polygon was absorbed; nothing to draw yet.
    Held,
    /// Incompatible with the pending content. The caller must draw the
    /// pending batch first and then offer the polygon again.
    FlushFirst,
}

/// Accumulator for consecutive compatible polygon fills.
#[derive(Default)]
pub struct PolygonBatch {
    polygons: Vec<PolyPolygon>,
    transparency: f64,
    bounds: Option<Rect>,
}

impl PolygonBatch {
    /// Whether a fill is a candidate for delaying at all.
    ///
    /// Only antialiased pure fills of a single closed polygon qualify, and
    /// the polygon must have at least one straight edge. Everything else is
    /// either not a split-area fragment or must be visible immediately.
    pub fn is_batchable(
        poly: &PolyPolygon,
        antialias: bool,
        has_fill: bool,
        has_stroke: bool,
    ) -> bool {
        antialias
            && has_fill
            && !has_stroke
            && poly.count() == 1
            && poly.is_closed()
            && path::contains_line(poly)
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Whether a polygon would join the pending batch without flushing.
    /// An empty batch accepts anything batchable.
    pub fn accepts(&self, poly: &PolyPolygon, transparency: f64) -> bool {
        if self.polygons.is_empty() {
            return true;
        }
        let Some(bounds) = poly.bounds() else {
            return true;
        };
        self.compatible(poly, bounds, transparency)
    }

    fn compatible(&self, poly: &PolyPolygon, bounds: Rect, transparency: f64) -> bool {
        self.transparency == transparency
            && self.bounds.is_some_and(|b| rects_overlap(b, bounds))
            && self
                .polygons
                .last()
                .is_some_and(|last| shares_vertex(last, poly))
    }

    /// Offer a batchable polygon.
    ///
    /// Joins the pending batch when it uses the same transparency, its
    /// bounds touch the accumulated bounds and it shares a vertex with the
    /// most recently added polygon; split fragments of one shape always
    /// do. Otherwise the pending content must be drawn first.
    pub fn offer(&mut self, poly: PolyPolygon, transparency: f64) -> Delay {
        let bounds = match poly.bounds() {
            Some(b) => b,
            // Degenerate shape, nothing will be drawn for it anyway.
            None => return Delay::Held,
        };
        if self.polygons.is_empty() {
            self.polygons.push(poly);
            self.transparency = transparency;
            self.bounds = Some(bounds);
            return Delay::Held;
        }
        if !self.compatible(&poly, bounds, transparency) {
            return Delay::FlushFirst;
        }
        self.polygons.push(poly);
        self.bounds = Some(self.bounds.map_or(bounds, |b| join(b, bounds)));
        Delay::Held
    }

    /// Hand out the accumulated content for drawing, leaving the batch
    /// empty.
    pub fn take(&mut self) -> Option<(Vec<PolyPolygon>, f64)> {
        if self.polygons.is_empty() {
            return None;
        }
        self.bounds = None;
        Some((std::mem::take(&mut self.polygons), self.transparency))
    }
}

fn join(a: Rect, b: Rect) -> Rect {
    Rect::from_ltrb(
        a.left().min(b.left()),
        a.top().min(b.top()),
        a.right().max(b.right()),
        a.bottom().max(b.bottom()),
    )
    .unwrap_or(a)
}

/// Adjacent fragments of a split area always share at least one vertex.
fn shares_vertex(last: &PolyPolygon, next: &PolyPolygon) -> bool {
    for a in last.polygons().iter().flat_map(|p| p.points()) {
        for b in next.polygons().iter().flat_map(|p| p.points()) {
            if a.point.approx_eq(b.point) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Polygon};

    fn rect_poly(x: f32, y: f32, w: f32, h: f32) -> PolyPolygon {
        PolyPolygon::from_polygon(Polygon::from_points(
            &[
                Point::new(x, y),
                Point::new(x + w, y),
                Point::new(x + w, y + h),
                Point::new(x, y + h),
            ],
            true,
        ))
    }

    #[test]
    fn stroke_disqualifies() {
        let poly = rect_poly(0.0, 0.0, 4.0, 4.0);
        assert!(PolygonBatch::is_batchable(&poly, true, true, false));
        assert!(!PolygonBatch::is_batchable(&poly, true, true, true));
        assert!(!PolygonBatch::is_batchable(&poly, true, false, false));
        assert!(!PolygonBatch::is_batchable(&poly, false, true, false));
    }

    #[test]
    fn adjacent_fragments_merge() {
        let mut batch = PolygonBatch::default();
        assert_eq!(batch.offer(rect_poly(0.0, 0.0, 4.0, 4.0), 0.0), Delay::Held);
        // Shares the (4,0)-(4,4) edge with the first fragment.
        assert_eq!(batch.offer(rect_poly(4.0, 0.0, 4.0, 4.0), 0.0), Delay::Held);
        assert_eq!(batch.len(), 2);
        let bounds = batch.bounds().unwrap();
        assert_eq!(bounds.right(), 8.0);
    }

    #[test]
    fn transparency_change_forces_flush() {
        let mut batch = PolygonBatch::default();
        batch.offer(rect_poly(0.0, 0.0, 4.0, 4.0), 0.0);
        assert_eq!(batch.offer(rect_poly(4.0, 0.0, 4.0, 4.0), 0.5), Delay::FlushFirst);
    }

    #[test]
    fn disjoint_bounds_force_flush() {
        let mut batch = PolygonBatch::default();
        batch.offer(rect_poly(0.0, 0.0, 4.0, 4.0), 0.0);
        assert_eq!(
            batch.offer(rect_poly(100.0, 100.0, 4.0, 4.0), 0.0),
            Delay::FlushFirst
        );
    }

    #[test]
    fn touching_without_shared_vertex_forces_flush() {
        let mut batch = PolygonBatch::default();
        batch.offer(rect_poly(0.0, 0.0, 4.0, 4.0), 0.0);
        // Overlapping bounds but vertices offset by half a unit everywhere.
        assert_eq!(
            batch.offer(rect_poly(3.5, 0.5, 4.0, 4.0), 0.0),
            Delay::FlushFirst
        );
    }

    #[test]
    fn take_empties_the_batch() {
        let mut batch = PolygonBatch::default();
        batch.offer(rect_poly(0.0, 0.0, 4.0, 4.0), 0.25);
        let (polys, transparency) = batch.take().unwrap();
        assert_eq!(polys.len(), 1);
        assert_eq!(transparency, 0.25);
        assert!(batch.is_empty());
        assert!(batch.take().is_none());
    }
}
