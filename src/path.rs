//! Conversion of polygon primitives into renderer paths.
//!
//! Polygons used for fill operations miss the right-most and bottom-most
//! pixel line of their bounding rectangle, so rectangle-to-polygon
//! conversions are avoided by callers; this module only translates what it
//! is given.

use tiny_skia::{Path, PathBuilder};

use crate::geometry::{IRect, Point, PolyPolygon, Polygon};

/// Append one polygon to the builder.
///
/// When `only_orthogonal` is supplied it is cleared if the polygon contains
/// any segment that is not strictly horizontal or vertical; callers use
/// this to skip the pixel-center offset for shapes that line up with the
/// pixel grid anyway.
pub fn add_polygon(builder: &mut PathBuilder, polygon: &Polygon, only_orthogonal: Option<&mut bool>) {
    let points = polygon.points();
    let count = points.len();
    if count <= 1 {
        return;
    }

    let closed = polygon.is_closed();
    let has_curves = polygon.has_curves();
    let mut orthogonal = true;

    let mut first = true;
    let mut previous = points[count - 1];
    for index in 0..=count {
        if index == count && !closed {
            continue;
        }
        // Loop the last point back to the first for closed polygons.
        let current = points[index % count];
        if first {
            builder.move_to(current.point.x, current.point.y);
            first = false;
        } else {
            let control_out = previous.control_next;
            let control_in = current.control_prev;
            if !has_curves || (control_out.is_none() && control_in.is_none()) {
                builder.line_to(current.point.x, current.point.y);
                if current.point.x != previous.point.x && current.point.y != previous.point.y {
                    orthogonal = false;
                }
            } else {
                // A control point sitting exactly on its anchor confuses the
                // renderer's cubic evaluation; nudge it along the segment.
                let c1 = control_out.unwrap_or_else(|| nudge(previous.point, current.point));
                let c2 = control_in.unwrap_or_else(|| nudge(current.point, previous.point));
                builder.cubic_to(c1.x, c1.y, c2.x, c2.y, current.point.x, current.point.y);
                orthogonal = false;
            }
        }
        previous = current;
    }
    if closed {
        builder.close();
    }

    if let Some(flag) = only_orthogonal {
        if !orthogonal {
            *flag = false;
        }
    }
}

fn nudge(anchor: Point, toward: Point) -> Point {
    Point::new(
        anchor.x + (anchor.x - toward.x) * 0.0005,
        anchor.y + (anchor.y - toward.y) * 0.0005,
    )
}

/// Build a path from every polygon of a poly-polygon.
pub fn from_poly_polygon(poly: &PolyPolygon, mut only_orthogonal: Option<&mut bool>) -> Option<Path> {
    if poly.count() == 0 {
        return None;
    }
    let mut builder = PathBuilder::with_capacity(
        poly.polygons().iter().map(Polygon::len).sum::<usize>() + poly.count(),
        poly.polygons().iter().map(|p| p.len() * 3).sum(),
    );
    for polygon in poly.polygons() {
        add_polygon(&mut builder, polygon, only_orthogonal.as_deref_mut());
    }
    builder.finish()
}

/// Build a path from a rectangle list (clip regions, invert shapes).
pub fn from_rects<'a>(rects: impl IntoIterator<Item = &'a IRect>) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for rect in rects {
        if let Some(r) = rect.to_sk_rect() {
            builder.push_rect(r);
        }
    }
    builder.finish()
}

/// True if the polygon set has at least one straight segment. A shape made
/// purely of curves is never a split fragment worth merge-batching.
pub fn contains_line(poly: &PolyPolygon) -> bool {
    if poly.polygons().iter().all(|p| !p.has_curves()) {
        return true; // no curves at all
    }
    for polygon in poly.polygons() {
        let points = polygon.points();
        let count = points.len();
        if count <= 1 {
            continue;
        }
        let segments = if polygon.is_closed() { count } else { count - 1 };
        for index in 0..segments {
            let from = points[index];
            let to = points[(index + 1) % count];
            if from.control_next.is_none() && to.control_prev.is_none() {
                return true;
            }
        }
    }
    false
}
