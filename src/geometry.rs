//! Geometry primitives shared by the drawing backend.
//!
//! Primitive operations use integer device coordinates; polygon data from
//! the document collaborator uses float coordinates with optional cubic
//! control points. Both are converted to renderer types only at the draw
//! boundary.

use tiny_skia::Rect as SkRect;

/// 2D point in device-independent float coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Equality within floating-point tolerance, used by the polygon
    /// batching vertex-sharing test.
    pub fn approx_eq(self, other: Point) -> bool {
        const EPS: f32 = 1e-4;
        (self.x - other.x).abs() <= EPS && (self.y - other.y).abs() <= EPS
    }

    pub fn rounded(&self) -> Point {
        Point::new(self.x.round(), self.y.round())
    }
}

/// Integer device rectangle, x/y plus extent.
///
/// Extents may be zero or negative in caller-supplied data; such rects are
/// treated as empty everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl IRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub const fn from_size(w: i32, h: i32) -> Self {
        Self::new(0, 0, w, h)
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn intersect(&self, other: &IRect) -> Option<IRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(IRect::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Bounding box of both rects; an empty rect contributes nothing.
    pub fn union(&self, other: &IRect) -> IRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        IRect::new(x0, y0, x1 - x0, y1 - y0)
    }

    pub fn contains(&self, other: &IRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    /// Smallest integer rect covering a float rect.
    pub fn round_out(rect: SkRect) -> IRect {
        let x0 = rect.left().floor() as i32;
        let y0 = rect.top().floor() as i32;
        let x1 = rect.right().ceil() as i32;
        let y1 = rect.bottom().ceil() as i32;
        IRect::new(x0, y0, x1 - x0, y1 - y0)
    }

    pub fn to_sk_rect(&self) -> Option<SkRect> {
        if self.is_empty() {
            return None;
        }
        SkRect::from_xywh(self.x as f32, self.y as f32, self.w as f32, self.h as f32)
    }
}

/// Source and destination rectangle pair for copy/blit operations.
///
/// Source and destination extents may differ, in which case the operation
/// scales. Operations receiving a degenerate pair (any extent <= 0) must
/// perform no pixel writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TwoRect {
    pub src_x: i32,
    pub src_y: i32,
    pub src_w: i32,
    pub src_h: i32,
    pub dest_x: i32,
    pub dest_y: i32,
    pub dest_w: i32,
    pub dest_h: i32,
}

impl TwoRect {
    /// Unscaled copy: same extent at both positions.
    pub const fn unscaled(src_x: i32, src_y: i32, dest_x: i32, dest_y: i32, w: i32, h: i32) -> Self {
        Self {
            src_x,
            src_y,
            src_w: w,
            src_h: h,
            dest_x,
            dest_y,
            dest_w: w,
            dest_h: h,
        }
    }

    pub const fn new(src: IRect, dest: IRect) -> Self {
        Self {
            src_x: src.x,
            src_y: src.y,
            src_w: src.w,
            src_h: src.h,
            dest_x: dest.x,
            dest_y: dest.y,
            dest_w: dest.w,
            dest_h: dest.h,
        }
    }

    pub fn src(&self) -> IRect {
        IRect::new(self.src_x, self.src_y, self.src_w, self.src_h)
    }

    pub fn dest(&self) -> IRect {
        IRect::new(self.dest_x, self.dest_y, self.dest_w, self.dest_h)
    }

    /// True if either rectangle has a zero or negative extent.
    pub fn is_degenerate(&self) -> bool {
        self.src_w <= 0 || self.src_h <= 0 || self.dest_w <= 0 || self.dest_h <= 0
    }

    pub fn scales(&self) -> bool {
        self.src_w != self.dest_w || self.src_h != self.dest_h
    }
}

/// One polygon vertex with optional cubic control points.
///
/// `control_prev` is the control point leaving the previous vertex toward
/// this one, `control_next` the control point leaving this vertex toward
/// the next. Absent control points mean a straight segment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolyPoint {
    pub point: Point,
    pub control_prev: Option<Point>,
    pub control_next: Option<Point>,
}

impl PolyPoint {
    pub const fn line(point: Point) -> Self {
        Self {
            point,
            control_prev: None,
            control_next: None,
        }
    }
}

/// A single open or closed polygon.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    points: Vec<PolyPoint>,
    closed: bool,
}

impl Polygon {
    pub fn new(points: Vec<PolyPoint>, closed: bool) -> Self {
        Self { points, closed }
    }

    /// Straight-segment polygon from raw points.
    pub fn from_points(points: &[Point], closed: bool) -> Self {
        Self {
            points: points.iter().copied().map(PolyPoint::line).collect(),
            closed,
        }
    }

    pub fn points(&self) -> &[PolyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn has_curves(&self) -> bool {
        self.points
            .iter()
            .any(|p| p.control_prev.is_some() || p.control_next.is_some())
    }

    /// Round every vertex to integer coordinates. Control points are
    /// relative refinements and are left alone.
    pub fn round_points(&mut self) {
        for p in &mut self.points {
            p.point = p.point.rounded();
        }
    }

    pub fn bounds(&self) -> Option<SkRect> {
        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        let mut any = false;
        for p in &self.points {
            for q in [Some(p.point), p.control_prev, p.control_next].into_iter().flatten() {
                min_x = min_x.min(q.x);
                min_y = min_y.min(q.y);
                max_x = max_x.max(q.x);
                max_y = max_y.max(q.y);
                any = true;
            }
        }
        if !any {
            return None;
        }
        // Zero-extent bounds are legal for degenerate polygons; widen by a
        // hair so SkRect accepts them.
        SkRect::from_ltrb(
            min_x,
            min_y,
            max_x.max(min_x + f32::EPSILON),
            max_y.max(min_y + f32::EPSILON),
        )
    }
}

/// An ordered set of polygons treated as one filled shape (even-odd).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolyPolygon {
    polygons: Vec<Polygon>,
}

impl PolyPolygon {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    pub fn from_polygon(polygon: Polygon) -> Self {
        Self {
            polygons: vec![polygon],
        }
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn polygons_mut(&mut self) -> &mut [Polygon] {
        &mut self.polygons
    }

    pub fn count(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_closed(&self) -> bool {
        !self.polygons.is_empty() && self.polygons.iter().all(Polygon::is_closed)
    }

    pub fn bounds(&self) -> Option<SkRect> {
        let mut acc: Option<SkRect> = None;
        for poly in &self.polygons {
            let Some(b) = poly.bounds() else { continue };
            acc = Some(match acc {
                None => b,
                Some(a) => SkRect::from_ltrb(
                    a.left().min(b.left()),
                    a.top().min(b.top()),
                    a.right().max(b.right()),
                    a.bottom().max(b.bottom()),
                )?,
            });
        }
        acc
    }
}

/// True if two float rects overlap (shared edges count as overlapping).
pub fn rects_overlap(a: SkRect, b: SkRect) -> bool {
    a.left() <= b.right() && b.left() <= a.right() && a.top() <= b.bottom() && b.top() <= a.bottom()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn irect_intersect_disjoint() {
        let a = IRect::new(0, 0, 10, 10);
        let b = IRect::new(20, 20, 5, 5);
        assert_eq!(a.intersect(&b), None);
    }

    #[test]
    fn irect_intersect_overlap() {
        let a = IRect::new(0, 0, 10, 10);
        let b = IRect::new(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), Some(IRect::new(5, 5, 5, 5)));
    }

    #[test]
    fn irect_union_ignores_empty() {
        let a = IRect::new(2, 3, 4, 5);
        let empty = IRect::default();
        assert_eq!(a.union(&empty), a);
        assert_eq!(empty.union(&a), a);
    }

    #[test]
    fn irect_round_out_covers_fractional() {
        let r = SkRect::from_xywh(0.2, 0.7, 3.5, 1.1).unwrap();
        assert_eq!(IRect::round_out(r), IRect::new(0, 0, 4, 2));
    }

    #[test]
    fn two_rect_degenerate() {
        let mut two = TwoRect::unscaled(0, 0, 0, 0, 10, 10);
        assert!(!two.is_degenerate());
        two.dest_h = 0;
        assert!(two.is_degenerate());
        two.dest_h = -1;
        assert!(two.is_degenerate());
    }

    #[test]
    fn polygon_bounds_and_rounding() {
        let mut poly = Polygon::from_points(
            &[
                Point::new(0.4, 0.6),
                Point::new(9.7, 0.0),
                Point::new(9.7, 9.3),
            ],
            true,
        );
        let bounds = poly.bounds().unwrap();
        assert_eq!(bounds.left(), 0.4);
        assert_eq!(bounds.bottom(), 9.3);
        poly.round_points();
        assert_eq!(poly.points()[0].point, Point::new(0.0, 1.0));
        assert_eq!(poly.points()[1].point, Point::new(10.0, 0.0));
    }

    #[test]
    fn point_approx_eq_tolerance() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(1.00005, 2.0);
        assert!(a.approx_eq(b));
        assert!(!a.approx_eq(Point::new(1.1, 2.0)));
    }

    #[test]
    fn poly_polygon_closed_requires_all() {
        let open = Polygon::from_points(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)], false);
        let closed = Polygon::from_points(
            &[Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)],
            true,
        );
        assert!(PolyPolygon::from_polygon(closed.clone()).is_closed());
        assert!(!PolyPolygon::new(vec![closed, open]).is_closed());
        assert!(!PolyPolygon::default().is_closed());
    }
}
