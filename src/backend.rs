//! The drawing backend: draw state tracking, primitive operations, and the
//! pre/post-draw plumbing that ties surfaces, batching, XOR emulation, the
//! compositing cache and flush scheduling together.
//!
//! Every primitive brackets itself with `pre_draw` (validate/create the
//! surface, draw any pending batched polygons) and `post_draw` (schedule a
//! flush, bound the pending command count, verify GPU health). Drawing is
//! synchronous for the caller; presentation happens later from the host's
//! idle callback via [`Graphics::perform_flush`].

use std::sync::Arc;
use std::thread::{self, ThreadId};

use log::debug;
use tiny_skia::{
    BlendMode, FillRule, FilterQuality, LinearGradient, Mask, Paint, PathBuilder, Pattern, Pixmap,
    PixmapPaint, Point as SkPoint, RadialGradient, Rect as SkRect, SpreadMode, Stroke, StrokeDash,
    Transform,
};

use crate::batch::{Delay, PolygonBatch};
use crate::bitmap::Bitmap;
use crate::cache::{self, CacheKey, ImageCache};
use crate::color::Color;
use crate::config::GraphicsConfig;
use crate::error::{fatal, GpuHealth, GraphicsError};
use crate::geometry::{IRect, Point, PolyPolygon, Polygon, TwoRect};
use crate::path;
use crate::region::Region;
use crate::scheduler::{IdleScheduler, TaskPriority};
use crate::surface::{GpuContext, PresentTarget, Surface};
use crate::xor::XorBuffer;

/// Pixel centers sit at half-coordinates; paths built from integer device
/// coordinates are shifted there before rasterization.
const PIXEL_CENTER: f32 = 0.5;
/// Exactly-centered antialiased lines pick up tiny color shifts from the
/// half-pixel placement, so AA geometry is nudged off-center by 1/64.
const AA_POS_FIX: f32 = -0.015625;

/// Raster-operation color presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RopColor {
    Zero,
    One,
    Invert,
}

impl RopColor {
    fn color(self) -> Color {
        match self {
            RopColor::Zero => Color::BLACK,
            RopColor::One | RopColor::Invert => Color::WHITE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    /// Segments drawn individually with no join geometry at all.
    None,
    Miter,
    Bevel,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

/// Stroke parameters for polyline drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub join: LineJoin,
    pub cap: LineCap,
    /// Joints sharper than this angle (radians) get cut to a bevel.
    pub miter_minimum_angle: f32,
    /// On/off interval lengths; `None` or all-zero means solid.
    pub dash: Option<Vec<f32>>,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            join: LineJoin::Miter,
            cap: LineCap::Butt,
            miter_minimum_angle: 15.0_f32.to_radians(),
            dash: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientStyle {
    Linear,
    /// Mirrored linear: end color on both edges, start color in the middle.
    Axial,
    Radial,
}

/// Gradient descriptor from the document collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub style: GradientStyle,
    pub start_color: Color,
    pub end_color: Color,
    /// Channel intensity percentages applied to the respective colors.
    pub start_intensity: u16,
    pub end_intensity: u16,
    /// Rotation of the gradient axis, degrees.
    pub angle_degrees: f32,
    /// Percentage of the run kept at the start color before blending.
    pub border: f32,
    /// Explicit color-step count; only smooth (0) is supported.
    pub steps: u32,
}

/// One stop of an explicit-stop linear gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvertStyle {
    /// Invert every pixel of the shape.
    Full,
    /// Invert in a 2x2 checkerboard pattern.
    Checker50,
    /// Invert a dashed outline, kept inside the shape bounds.
    TrackFrame,
}

/// One positioned glyph: an outline shape placed at a device position.
#[derive(Debug, Clone)]
pub struct Glyph {
    pub outline: PolyPolygon,
    pub position: Point,
    pub vertical: bool,
}

/// A shaped text run; vertical glyphs are rotated an extra 90 degrees.
#[derive(Debug, Clone, Default)]
pub struct GlyphRun {
    pub glyphs: Vec<Glyph>,
    pub orientation_degrees: f32,
}

/// A 2D drawing backend bound to one presentation target.
pub struct Graphics {
    target: Box<dyn PresentTarget>,
    scheduler: Box<dyn IdleScheduler>,
    gpu: Option<Box<dyn GpuContext>>,
    cache: Arc<ImageCache>,
    config: GraphicsConfig,

    surface: Option<Surface>,
    clip: Region,
    line_color: Option<Color>,
    fill_color: Option<Color>,
    antialias: bool,
    xor_mode: bool,
    xor: Option<XorBuffer>,
    batch: PolygonBatch,

    dirty: IRect,
    pending_ops: u32,
    flush_requested: bool,
    flush_priority: TaskPriority,
    owner: ThreadId,
}

impl Graphics {
    pub fn new(
        target: Box<dyn PresentTarget>,
        scheduler: Box<dyn IdleScheduler>,
        gpu: Option<Box<dyn GpuContext>>,
        cache: Arc<ImageCache>,
        config: GraphicsConfig,
    ) -> Result<Self, GraphicsError> {
        config.validate()?;
        let antialias = config.antialias;
        Ok(Self {
            target,
            scheduler,
            gpu,
            cache,
            config,
            surface: None,
            clip: Region::default(),
            line_color: None,
            fill_color: None,
            antialias,
            xor_mode: false,
            xor: None,
            batch: PolygonBatch::default(),
            dirty: IRect::default(),
            pending_ops: 0,
            flush_requested: false,
            flush_priority: TaskPriority::PostPaint,
            owner: thread::current().id(),
        })
    }

    pub fn width(&self) -> i32 {
        self.target.width()
    }

    pub fn height(&self) -> i32 {
        self.target.height()
    }

    pub fn is_gpu(&self) -> bool {
        self.surface.as_ref().is_some_and(Surface::is_gpu)
    }

    /// A zero-sized window target cannot back a real surface; treat it as
    /// off-screen and let surface creation clamp it to 1x1.
    fn is_offscreen(&self) -> bool {
        self.target.is_offscreen() || self.target.width() <= 0 || self.target.height() <= 0
    }

    // ---- surface lifecycle -------------------------------------------------

    /// Create the surface on demand, or recreate it if the target has been
    /// resized behind our back. Window surfaces carry their old content
    /// over, since the windowing system may repaint only the changed parts.
    fn check_surface(&mut self) {
        let (width, height) = (self.target.width(), self.target.height());
        let current = self.surface.as_ref().map(|s| (s.width(), s.height()));
        match current {
            None => {
                self.create_surface();
                debug!("created surface {width}x{height}");
            }
            Some((old_w, old_h)) if old_w != width || old_h != height => {
                // A zero-size resize is a windowing-system glitch; keep the
                // old surface rather than destroy real content.
                if width == 0 || height == 0 {
                    return;
                }
                let snapshot = if !self.is_offscreen() {
                    self.flush_drawing();
                    self.surface.as_ref().map(Surface::snapshot)
                } else {
                    None
                };
                self.drop_surface();
                self.create_surface();
                if let (Some(snapshot), Some(surface)) = (snapshot, self.surface.as_mut()) {
                    surface.draw_snapshot(&snapshot);
                }
                debug!("recreated surface {old_w}x{old_h} -> {width}x{height}");
            }
            Some(_) => {}
        }
    }

    fn create_surface(&mut self) {
        let offscreen = self.is_offscreen();
        let surface = Surface::create(
            self.target.width(),
            self.target.height(),
            offscreen,
            self.gpu.as_deref_mut(),
            self.config.force_raster,
        );
        self.clip = Region::from_rect(surface.bounds());
        self.dirty = surface.bounds();
        self.surface = Some(surface);
        // Don't present before anything has been painted.
        self.flush_requested = false;
        self.flush_priority = TaskPriority::PostPaint;
    }

    fn drop_surface(&mut self) {
        if self.surface.take().is_some() {
            if let Some(gpu) = self.gpu.as_deref_mut() {
                gpu.flush();
                gpu.destroy_binding();
            }
        }
        self.xor = None;
    }

    /// Tear down the surface; must happen before the host releases the
    /// presentation context.
    pub fn destroy_surface(&mut self) {
        self.flush_drawing();
        self.drop_surface();
    }

    fn surface_mut(&mut self) -> &mut Surface {
        self.surface.as_mut().expect("surface exists after pre_draw")
    }

    // ---- pre/post draw hooks ----------------------------------------------

    fn pre_draw(&mut self) {
        debug_assert_eq!(thread::current().id(), self.owner);
        self.check_surface();
        self.flush_pending_batch();
    }

    fn post_draw(&mut self) {
        self.schedule_flush();
        // The renderer queues work; too many queued image draws can eat
        // memory, so force a submit past the threshold.
        if self.pending_ops > self.config.pending_ops_flush_threshold {
            if let Some(gpu) = self.gpu.as_deref_mut() {
                gpu.flush();
            }
            self.pending_ops = 0;
        }
        self.check_gpu_health();
    }

    fn check_gpu_health(&self) {
        if !self.is_gpu() {
            return;
        }
        if let Some(gpu) = self.gpu.as_deref() {
            match gpu.health() {
                GpuHealth::Healthy => {}
                // What has and has not reached the surface is unknowable
                // here, so there is no way to redraw just the lost part.
                GpuHealth::OutOfMemory => fatal("GPU context out of memory"),
                GpuHealth::Abandoned => fatal("GPU context abandoned"),
            }
        }
    }

    fn add_update_region(&mut self, rect: IRect) {
        self.dirty = self.dirty.union(&rect);
        if self.xor_mode {
            if let Some(surface) = self.surface.as_ref() {
                let (w, h) = (surface.width(), surface.height());
                self.xor
                    .get_or_insert_with(|| XorBuffer::new(w, h))
                    .add_touched(rect);
            }
        }
    }

    /// Pixels and clip for the current draw: the XOR side layer while XOR
    /// mode is active, the surface otherwise.
    fn canvas(&mut self) -> (&mut Pixmap, Option<&Mask>) {
        let surface = self.surface.as_mut().expect("surface exists after pre_draw");
        if self.xor_mode {
            let (w, h) = (surface.width(), surface.height());
            let buffer = self.xor.get_or_insert_with(|| XorBuffer::new(w, h));
            (buffer.pixmap_mut(), surface.clip_mask())
        } else {
            surface.draw_parts()
        }
    }

    // ---- flush / present ---------------------------------------------------

    fn schedule_flush(&mut self) {
        if self.is_offscreen() {
            return;
        }
        if !self.scheduler.is_main_loop_running() {
            // Nothing would ever trigger idle presentation.
            self.perform_flush();
        } else if !self.flush_requested {
            self.flush_requested = true;
            self.scheduler.request_idle_flush(self.flush_priority);
        }
    }

    /// Submit all buffered drawing to the renderer without presenting.
    fn flush_drawing(&mut self) {
        if self.surface.is_none() {
            return;
        }
        self.flush_pending_batch();
        if self.xor_mode {
            self.apply_xor();
        }
        if let Some(gpu) = self.gpu.as_deref_mut() {
            gpu.flush();
        }
        self.pending_ops = 0;
    }

    /// Flush and present; the host calls this from the scheduled idle task.
    pub fn perform_flush(&mut self) {
        debug_assert_eq!(thread::current().id(), self.owner);
        self.flush_requested = false;
        self.flush_priority = TaskPriority::Highest;
        self.flush_drawing();
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if let Some(area) = self.dirty.intersect(&surface.bounds()) {
            if surface.is_gpu() {
                if let Some(gpu) = self.gpu.as_deref_mut() {
                    match gpu.health() {
                        GpuHealth::Healthy => {}
                        GpuHealth::OutOfMemory => fatal("GPU context out of memory"),
                        GpuHealth::Abandoned => fatal("GPU context abandoned"),
                    }
                    if let Err(err) = surface.present_gpu(gpu) {
                        log::warn!("present failed: {err}");
                    }
                }
            } else if let Err(err) = self.target.present_region(surface.pixmap().as_ref(), area) {
                log::warn!("present failed: {err}");
            }
        }
        self.dirty = IRect::default();
    }

    // ---- draw state --------------------------------------------------------

    pub fn set_line_color(&mut self, color: Option<Color>) {
        if self.line_color == color {
            return;
        }
        self.flush_pending_batch();
        self.line_color = color;
    }

    pub fn set_fill_color(&mut self, color: Option<Color>) {
        if self.fill_color == color {
            return;
        }
        self.flush_pending_batch();
        self.fill_color = color;
    }

    pub fn set_rop_line_color(&mut self, rop: RopColor) {
        self.set_line_color(Some(rop.color()));
    }

    pub fn set_rop_fill_color(&mut self, rop: RopColor) {
        self.set_fill_color(Some(rop.color()));
    }

    pub fn line_color(&self) -> Option<Color> {
        self.line_color
    }

    pub fn fill_color(&self) -> Option<Color> {
        self.fill_color
    }

    pub fn set_antialias(&mut self, antialias: bool) {
        if self.antialias == antialias {
            return;
        }
        self.flush_pending_batch();
        self.antialias = antialias;
    }

    pub fn set_clip_region(&mut self, region: Region) {
        if self.clip == region {
            return;
        }
        self.flush_pending_batch();
        self.check_surface();
        debug!("set clip region, {} rects", region.rects().len());
        self.clip = region;
        let clip = self.clip.clone();
        self.surface_mut().set_clip(&clip);
    }

    pub fn reset_clip_region(&mut self) {
        let full = IRect::from_size(self.target.width(), self.target.height());
        self.set_clip_region(Region::from_rect(full));
    }

    pub fn clip_region(&self) -> &Region {
        &self.clip
    }

    pub fn set_xor_mode(&mut self, enable: bool) {
        if self.xor_mode == enable {
            return;
        }
        self.flush_pending_batch();
        debug!("set xor mode {enable}");
        if !enable {
            self.apply_xor();
        }
        self.xor_mode = enable;
    }

    fn apply_xor(&mut self) {
        if let (Some(buffer), Some(surface)) = (self.xor.take(), self.surface.as_mut()) {
            let mut buffer = buffer;
            buffer.apply(surface.pixmap_mut());
        }
    }

    // ---- batching ----------------------------------------------------------

    /// Draw any pending batched polygons.
    fn flush_pending_batch(&mut self) {
        let Some((mut polygons, transparency)) = self.batch.take() else {
            return;
        };
        if polygons.len() == 1 {
            let poly = polygons.remove(0);
            self.perform_draw_poly_polygon(&poly, transparency, true);
        } else {
            // Rounding vertices to the pixel grid makes the shared edges of
            // adjacent fragments exactly coincident, so a single
            // winding-rule pass over all of them rasterizes as one seamless
            // area.
            for poly in &mut polygons {
                for polygon in poly.polygons_mut() {
                    polygon.round_points();
                }
            }
            self.perform_draw_merged(&polygons, transparency);
        }
    }

    // ---- primitives --------------------------------------------------------

    pub fn draw_pixel(&mut self, x: i32, y: i32) {
        self.draw_pixel_with_color(x, y, self.line_color);
    }

    /// Sets the pixel as-is, alpha included, rather than blending it.
    pub fn draw_pixel_with_color(&mut self, x: i32, y: i32, color: Option<Color>) {
        let Some(color) = color else { return };
        self.pre_draw();
        self.add_update_region(IRect::new(x, y, 1, 1));
        let Some(rect) = SkRect::from_xywh(x as f32, y as f32, 1.0, 1.0) else {
            self.post_draw();
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.to_sk());
        paint.blend_mode = BlendMode::Source;
        let (pixmap, mask) = self.canvas();
        pixmap.fill_rect(rect, &paint, Transform::identity(), mask);
        self.post_draw();
    }

    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let Some(color) = self.line_color else { return };
        self.pre_draw();
        let bounds = IRect::new(x1.min(x2), y1.min(y2), (x2 - x1).abs() + 1, (y2 - y1).abs() + 1);
        self.add_update_region(bounds);
        let mut builder = PathBuilder::new();
        builder.move_to(x1 as f32 + PIXEL_CENTER, y1 as f32 + PIXEL_CENTER);
        builder.line_to(x2 as f32 + PIXEL_CENTER, y2 as f32 + PIXEL_CENTER);
        let Some(line) = builder.finish() else {
            self.post_draw();
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.to_sk());
        paint.anti_alias = self.antialias;
        let stroke = Stroke::default();
        let (pixmap, mask) = self.canvas();
        pixmap.stroke_path(&line, &paint, &stroke, Transform::identity(), mask);
        self.post_draw();
    }

    pub fn draw_rect(&mut self, rect: IRect) {
        // Rectangles line up with the pixel grid; antialiasing them only
        // makes edge transitions fuzzy.
        self.private_draw_alpha_rect(rect, 0.0, true);
    }

    pub fn draw_alpha_rect(&mut self, rect: IRect, transparency: f64) -> bool {
        self.private_draw_alpha_rect(rect, transparency, false);
        true
    }

    fn private_draw_alpha_rect(&mut self, rect: IRect, transparency: f64, block_aa: bool) {
        self.pre_draw();
        self.add_update_region(rect);
        let antialias = !block_aa && self.antialias;
        if let Some(fill) = self.fill_color {
            let mut paint = Paint::default();
            paint.set_color(fill.to_sk_with_transparency(transparency));
            paint.anti_alias = antialias;
            if self.line_color.is_none() && rect.is_empty() {
                // A zero-extent rectangle is still expected to show up as a
                // line; filling draws nothing, so stroke it instead.
                self.stroke_degenerate_rect(rect, &paint);
            } else if let Some(sk) = rect.to_sk_rect() {
                let (pixmap, mask) = self.canvas();
                pixmap.fill_rect(sk, &paint, Transform::identity(), mask);
            }
        }
        if let Some(line) = self.line_color {
            let mut paint = Paint::default();
            paint.set_color(line.to_sk_with_transparency(transparency));
            paint.anti_alias = antialias;
            // The stroke sits one pixel inside the fill extent; drawing at
            // the full extent paints the outline one pixel past where the
            // callers expect it.
            let stroke_rect = IRect::new(rect.x, rect.y, (rect.w - 1).max(1), (rect.h - 1).max(1));
            if let Some(sk) = stroke_rect.to_sk_rect() {
                let outline = PathBuilder::from_rect(sk);
                let stroke = Stroke::default();
                let (pixmap, mask) = self.canvas();
                pixmap.stroke_path(&outline, &paint, &stroke, Transform::identity(), mask);
            }
        }
        self.post_draw();
    }

    fn stroke_degenerate_rect(&mut self, rect: IRect, paint: &Paint) {
        let mut builder = PathBuilder::new();
        builder.move_to(rect.x as f32, rect.y as f32);
        builder.line_to((rect.x + rect.w.max(0)) as f32, (rect.y + rect.h.max(0)) as f32);
        if let Some(line) = builder.finish() {
            let stroke = Stroke::default();
            let (pixmap, mask) = self.canvas();
            pixmap.stroke_path(&line, paint, &stroke, Transform::identity(), mask);
        }
    }

    pub fn draw_polygon(&mut self, polygon: Polygon) -> bool {
        self.draw_poly_polygon(PolyPolygon::from_polygon(polygon), 0.0)
    }

    pub fn draw_poly_polygon(&mut self, poly: PolyPolygon, transparency: f64) -> bool {
        let has_fill = self.fill_color.is_some();
        let has_line = self.line_color.is_some();
        if poly.count() == 0
            || (!has_fill && !has_line)
            || transparency < 0.0
            || !(transparency < 1.0)
        {
            return true;
        }
        if PolygonBatch::is_batchable(&poly, self.antialias, has_fill, has_line) {
            // An incompatible pending batch gets drawn first; the new
            // polygon then starts a fresh batch, so it is always delayed.
            if !self.batch.accepts(&poly, transparency) {
                self.flush_pending_batch();
            }
            let _delayed = self.batch.offer(poly, transparency);
            debug_assert_eq!(_delayed, Delay::Held);
            self.schedule_flush();
            return true;
        }
        self.perform_draw_poly_polygon(&poly, transparency, self.antialias);
        true
    }

    fn perform_draw_poly_polygon(&mut self, poly: &PolyPolygon, transparency: f64, use_aa: bool) {
        self.pre_draw();
        let mut only_orthogonal = true;
        let Some(mut path) = path::from_poly_polygon(poly, Some(&mut only_orthogonal)) else {
            self.post_draw();
            return;
        };
        self.add_update_region(IRect::round_out(path.bounds()));
        if let Some(offset) = pixel_offset(use_aa, only_orthogonal) {
            if let Some(moved) = path.clone().transform(offset) {
                path = moved;
            }
        }
        let degenerate =
            path.bounds().width() == 0.0 || path.bounds().height() == 0.0;
        let stroke_hack = self.line_color.is_none() && degenerate;
        if let Some(fill) = self.fill_color {
            let mut paint = Paint::default();
            paint.set_color(fill.to_sk_with_transparency(transparency));
            paint.anti_alias = use_aa;
            let (pixmap, mask) = self.canvas();
            if stroke_hack {
                // Zero-area polygons are really lines; fills skip them.
                pixmap.stroke_path(&path, &paint, &Stroke::default(), Transform::identity(), mask);
            } else {
                pixmap.fill_path(&path, &paint, FillRule::EvenOdd, Transform::identity(), mask);
            }
        }
        if let Some(line) = self.line_color {
            let mut paint = Paint::default();
            paint.set_color(line.to_sk_with_transparency(transparency));
            paint.anti_alias = use_aa;
            let (pixmap, mask) = self.canvas();
            pixmap.stroke_path(&path, &paint, &Stroke::default(), Transform::identity(), mask);
        }
        self.post_draw();
    }

    /// Draw a set of batched polygons as one seamless area.
    fn perform_draw_merged(&mut self, polygons: &[PolyPolygon], transparency: f64) {
        self.pre_draw();
        let Some(fill) = self.fill_color else {
            self.post_draw();
            return;
        };
        let mut only_orthogonal = true;
        let mut builder = PathBuilder::new();
        for poly in polygons {
            for polygon in poly.polygons() {
                path::add_polygon(&mut builder, polygon, Some(&mut only_orthogonal));
            }
        }
        let Some(mut path) = builder.finish() else {
            self.post_draw();
            return;
        };
        self.add_update_region(IRect::round_out(path.bounds()));
        if let Some(offset) = pixel_offset(true, only_orthogonal) {
            if let Some(moved) = path.clone().transform(offset) {
                path = moved;
            }
        }
        let mut paint = Paint::default();
        paint.set_color(fill.to_sk_with_transparency(transparency));
        paint.anti_alias = true;
        let (pixmap, mask) = self.canvas();
        // Winding rule: the coincident opposite-direction edges shared by
        // adjacent fragments cancel, which realizes the geometric union.
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), mask);
        self.post_draw();
    }

    pub fn draw_polyline(&mut self, polygon: &Polygon, transparency: f64, style: &StrokeStyle) -> bool {
        let Some(color) = self.line_color else { return true };
        if polygon.is_empty() || transparency < 0.0 || transparency > 1.0 {
            return true;
        }
        self.pre_draw();
        let mut paint = Paint::default();
        paint.set_color(color.to_sk_with_transparency(transparency));
        paint.anti_alias = self.antialias;
        let stroke = to_stroke(style);
        let offset = Transform::from_translate(
            PIXEL_CENTER + if self.antialias { AA_POS_FIX } else { 0.0 },
            PIXEL_CENTER + if self.antialias { AA_POS_FIX } else { 0.0 },
        );
        // There is no join geometry for LineJoin::None, so wide polylines
        // fall back to drawing every segment on its own.
        if style.join != LineJoin::None || style.width <= 1.0 {
            let mut builder = PathBuilder::new();
            path::add_polygon(&mut builder, polygon, None);
            if let Some(path) = builder.finish().and_then(|p| p.transform(offset)) {
                self.add_update_region(IRect::round_out(path.bounds()));
                let (pixmap, mask) = self.canvas();
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), mask);
            }
        } else {
            let points = polygon.points();
            let count = points.len();
            let segments = if polygon.is_closed() { count } else { count.saturating_sub(1) };
            for index in 0..segments {
                let from = points[index].point;
                let to = points[(index + 1) % count].point;
                let mut builder = PathBuilder::new();
                builder.move_to(from.x, from.y);
                builder.line_to(to.x, to.y);
                if let Some(segment) = builder.finish().and_then(|p| p.transform(offset)) {
                    self.add_update_region(IRect::round_out(segment.bounds()));
                    let (pixmap, mask) = self.canvas();
                    pixmap.stroke_path(&segment, &paint, &stroke, Transform::identity(), mask);
                }
            }
        }
        self.post_draw();
        true
    }

    /// Bezier point-array variants are left to the caller's fallback path.
    pub fn draw_polyline_bezier(&mut self, _points: &[Point]) -> bool {
        false
    }

    pub fn draw_polygon_bezier(&mut self, _points: &[Point]) -> bool {
        false
    }

    pub fn draw_poly_polygon_bezier(&mut self, _points: &[&[Point]]) -> bool {
        false
    }

    /// Embedded PostScript is not something a raster backend can render.
    pub fn draw_eps(&mut self, _rect: IRect, _data: &[u8]) -> bool {
        false
    }

    // ---- copies ------------------------------------------------------------

    pub fn copy_area(&mut self, dest_x: i32, dest_y: i32, src_x: i32, src_y: i32, width: i32, height: i32) {
        if dest_x == src_x && dest_y == src_y {
            return;
        }
        if width <= 0 || height <= 0 {
            return;
        }
        debug_assert!(!self.xor_mode);
        self.pre_draw();
        let two = TwoRect::unscaled(src_x, src_y, dest_x, dest_y, width, height);
        self.add_update_region(two.dest());
        let snapshot = self.surface_mut().snapshot();
        self.draw_pixmap_two(two, &snapshot, BlendMode::Source, 1.0);
        self.post_draw();
    }

    /// Copy between surfaces (or within this one when `source` is `None`).
    pub fn copy_bits(&mut self, two: TwoRect, source: Option<&mut Graphics>) {
        if two.is_degenerate() {
            return;
        }
        self.pre_draw();
        let snapshot = match source {
            Some(other) => {
                other.check_surface();
                other.flush_drawing();
                other.surface_mut().snapshot()
            }
            None => {
                debug_assert!(!self.xor_mode);
                self.surface_mut().snapshot()
            }
        };
        self.add_update_region(two.dest());
        self.draw_pixmap_two(two, &snapshot, BlendMode::Source, 1.0);
        self.post_draw();
    }

    /// Map `src` onto `dest` through a pattern shader; the blend applies
    /// only inside the destination rectangle.
    fn draw_pixmap_two(&mut self, two: TwoRect, src: &Pixmap, blend: BlendMode, opacity: f32) {
        let Some(dest) = two.dest().to_sk_rect() else { return };
        let scale_x = two.dest_w as f32 / two.src_w as f32;
        let scale_y = two.dest_h as f32 / two.src_h as f32;
        let transform = Transform::from_row(
            scale_x,
            0.0,
            0.0,
            scale_y,
            two.dest_x as f32 - scale_x * two.src_x as f32,
            two.dest_y as f32 - scale_y * two.src_y as f32,
        );
        let quality = if two.scales() { FilterQuality::Bilinear } else { FilterQuality::Nearest };
        let mut paint = Paint::default();
        paint.shader = Pattern::new(src.as_ref(), SpreadMode::Pad, quality, opacity, transform);
        paint.blend_mode = blend;
        let (pixmap, mask) = self.canvas();
        pixmap.fill_rect(dest, &paint, Transform::identity(), mask);
    }

    // ---- bitmaps -----------------------------------------------------------

    pub fn draw_bitmap(&mut self, two: TwoRect, bitmap: &Bitmap) {
        if two.is_degenerate() {
            return;
        }
        self.draw_bitmap_blended(two, bitmap, BlendMode::SourceOver);
    }

    fn draw_bitmap_blended(&mut self, two: TwoRect, bitmap: &Bitmap, blend: BlendMode) {
        // When the whole bitmap is being scaled, let the cache do the
        // scaling once instead of the renderer doing it on every draw.
        let (image_two, target_w, target_h) = cacheable_geometry(two, bitmap);
        if let Some(image) = self.merge_cache_bitmaps(bitmap, None, target_w, target_h) {
            self.draw_image(image_two, &image, blend);
        } else {
            let pixmap = bitmap.pixmap().clone();
            self.draw_image(two, &pixmap, blend);
        }
    }

    pub fn draw_bitmap_masked(&mut self, two: TwoRect, bitmap: &Bitmap, alpha: &Bitmap) -> bool {
        if two.is_degenerate() {
            return true;
        }
        let (image_two, target_w, target_h) = cacheable_geometry(two, bitmap);
        if let Some(image) = self.merge_cache_bitmaps(bitmap, Some(alpha), target_w, target_h) {
            self.draw_image(image_two, &image, BlendMode::SourceOver);
        } else if alpha.is_fully_opaque() {
            self.draw_bitmap(two, bitmap);
        } else if let Some(composed) =
            cache::compose(bitmap, Some(alpha), bitmap.width(), bitmap.height())
        {
            self.draw_image(two, &composed, BlendMode::SourceOver);
        }
        true
    }

    /// Multiply-blend a bitmap over the destination; an all-opaque source
    /// multiplies to a plain copy, which is cheaper drawn directly.
    pub fn blend_bitmap(&mut self, two: TwoRect, bitmap: &Bitmap) -> bool {
        if two.is_degenerate() {
            return false;
        }
        if bitmap.is_fully_opaque() {
            self.draw_bitmap(two, bitmap);
        } else {
            self.draw_bitmap_blended(two, bitmap, BlendMode::Multiply);
        }
        true
    }

    /// Paint a solid color through the bitmap's alpha channel.
    ///
    /// Never cached: the result depends on the color, which the cache key
    /// does not carry.
    pub fn draw_mask(&mut self, two: TwoRect, bitmap: &Bitmap, color: Color) {
        if two.is_degenerate() {
            return;
        }
        let Some(mut colored) =
            Pixmap::new(bitmap.width() as u32, bitmap.height() as u32)
        else {
            return;
        };
        colored.fill(color.to_sk());
        colored.apply_mask(&bitmap.to_mask());
        self.draw_image(two, &colored, BlendMode::SourceOver);
    }

    fn draw_image(&mut self, two: TwoRect, image: &Pixmap, blend: BlendMode) {
        self.pre_draw();
        self.add_update_region(two.dest());
        self.draw_pixmap_two(two, image, blend, 1.0);
        self.pending_ops += 1;
        self.post_draw();
    }

    /// Draw a bitmap mapped onto an arbitrary parallelogram given by the
    /// destinations of its (0,0), (w,0) and (0,h) corners.
    pub fn draw_transformed_bitmap(
        &mut self,
        null: Point,
        x_axis: Point,
        y_axis: Point,
        bitmap: &Bitmap,
        alpha: Option<&Bitmap>,
        opacity: f64,
    ) -> bool {
        let alpha = alpha.filter(|a| !a.is_fully_opaque());
        let x_rel = Point::new(x_axis.x - null.x, x_axis.y - null.y);
        let y_rel = Point::new(y_axis.x - null.x, y_axis.y - null.y);
        let target_w = (x_rel.x.hypot(x_rel.y)).round() as i32;
        let target_h = (y_rel.x.hypot(y_rel.y)).round() as i32;

        self.pre_draw();
        // The mapped area is not worth computing exactly; treat the whole
        // surface as touched.
        let full = IRect::from_size(self.target.width(), self.target.height());
        self.add_update_region(full);

        let (source, source_w, source_h): (Pixmap, i32, i32) =
            match self.merge_cache_bitmaps(bitmap, alpha, target_w, target_h) {
                Some(image) => ((*image).clone(), target_w, target_h),
                None => {
                    let composed = match alpha {
                        Some(_) => cache::compose(bitmap, alpha, bitmap.width(), bitmap.height()),
                        None => None,
                    };
                    match composed {
                        Some(p) => (p, bitmap.width(), bitmap.height()),
                        None => (bitmap.pixmap().clone(), bitmap.width(), bitmap.height()),
                    }
                }
            };

        // Rounded scale components keep an already-scaled cached image from
        // being rescaled by a sub-pixel factor.
        let transform = Transform::from_row(
            x_rel.x.round() / source_w as f32,
            x_rel.y / source_w as f32,
            y_rel.x / source_h as f32,
            y_rel.y.round() / source_h as f32,
            null.x,
            null.y,
        );
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0) as f32,
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        let (pixmap, mask) = self.canvas();
        pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, transform, mask);
        self.post_draw();
        true
    }

    /// Composite-and-scale through the shared cache; `None` means the
    /// caller should draw directly because caching would not pay off.
    fn merge_cache_bitmaps(
        &mut self,
        bitmap: &Bitmap,
        alpha: Option<&Bitmap>,
        target_w: i32,
        target_h: i32,
    ) -> Option<Arc<Pixmap>> {
        if target_w <= 0 || target_h <= 0 {
            return None;
        }
        let alpha = alpha.filter(|a| !a.is_fully_opaque());
        let unscaled = target_w == bitmap.width() && target_h == bitmap.height();
        // A plain unscaled, unmasked copy is as cheap as a cache hit.
        if alpha.is_none() && unscaled {
            return None;
        }
        if unscaled && target_w < 100 && target_h < 100 {
            return None;
        }
        if self.is_gpu() {
            // GPU compositing is cheap; caching only pays off when it
            // replaces a heavy repeated downscale.
            let reduce_ratio =
                bitmap.width() as i64 * bitmap.height() as i64 / target_w as i64 / target_h as i64;
            if reduce_ratio < 10 {
                return None;
            }
        }
        // Before the first draw there is no clip yet; the whole target is
        // the drawable area then.
        let draw_area = if self.clip.is_empty() {
            IRect::from_size(self.target.width(), self.target.height())
        } else {
            self.clip.bounds()
        };
        if target_w > draw_area.w || target_h > draw_area.h {
            // Part of the result will never be drawn. Scrolling still makes
            // caching worth it for moderate overlap, so only refuse when
            // the upscale work and the oversize both get large.
            let upscale = (target_w as f64 / bitmap.width() as f64
                * target_h as f64 / bitmap.height() as f64)
                .max(1.0);
            let oversize = target_w as f64 / draw_area.w.max(1) as f64 * target_h as f64
                / draw_area.h.max(1) as f64;
            if upscale * oversize > 4.0 {
                debug!(
                    "not caching scaled bitmap, ratio {:.1} for {}x{} -> {}x{}",
                    upscale * oversize,
                    bitmap.width(),
                    bitmap.height(),
                    target_w,
                    target_h
                );
                return None;
            }
        }
        let bytes = target_w as usize * target_h as usize * 4;
        if !self.cache.accepts(bytes) {
            return None;
        }
        let key = CacheKey {
            width: target_w,
            height: target_h,
            bitmap: bitmap.content_key(),
            mask: alpha.map(Bitmap::content_key),
        };
        if let Some(image) = self.cache.get(&key) {
            return Some(image);
        }
        let image = Arc::new(cache::compose(bitmap, alpha, target_w, target_h)?);
        self.cache.insert(key, Arc::clone(&image));
        Some(image)
    }

    // ---- gradients ---------------------------------------------------------

    pub fn draw_gradient(&mut self, poly: &PolyPolygon, gradient: &Gradient) -> bool {
        if gradient.steps != 0 {
            // The renderer cannot be told how many discrete colors to use.
            return false;
        }
        self.pre_draw();
        let Some(bounds) = poly.bounds() else {
            self.post_draw();
            return true;
        };
        // Rect-shaped polygons lost their right/bottom pixel line in the
        // rect-to-polygon conversion; restore it.
        let (path, geometry) = match rect_shape(poly, bounds) {
            Some(rect) => {
                let widened = SkRect::from_ltrb(
                    rect.left(),
                    rect.top(),
                    rect.right() + 1.0,
                    rect.bottom() + 1.0,
                )
                .unwrap_or(rect);
                (Some(PathBuilder::from_rect(rect)), widened)
            }
            None => (path::from_poly_polygon(poly, None), bounds),
        };
        let Some(path) = path else {
            self.post_draw();
            return true;
        };
        self.add_update_region(IRect::round_out(path.bounds()));

        let start = gradient.start_color.to_sk_with_intensity(gradient.start_intensity);
        let end = gradient.end_color.to_sk_with_intensity(gradient.end_intensity);
        let border = (gradient.border / 100.0).clamp(0.0, 1.0);
        let shader = match gradient.style {
            GradientStyle::Linear | GradientStyle::Axial => {
                let (p0, p1) = gradient_axis(geometry, gradient.angle_degrees);
                let stops = if gradient.style == GradientStyle::Linear {
                    vec![
                        tiny_skia::GradientStop::new(border, start),
                        tiny_skia::GradientStop::new(1.0, end),
                    ]
                } else {
                    vec![
                        tiny_skia::GradientStop::new(border.min(0.5), end),
                        tiny_skia::GradientStop::new(0.5, start),
                        tiny_skia::GradientStop::new((1.0 - border).max(0.5), end),
                    ]
                };
                LinearGradient::new(p0, p1, stops, SpreadMode::Pad, Transform::identity())
            }
            GradientStyle::Radial => {
                let center = SkPoint::from_xy(
                    geometry.left() + geometry.width() / 2.0 - PIXEL_CENTER,
                    geometry.top() + geometry.height() / 2.0 - PIXEL_CENTER,
                );
                let radius = (geometry.width() / 2.0).max(geometry.height() / 2.0);
                RadialGradient::new(
                    center,
                    center,
                    radius,
                    vec![
                        tiny_skia::GradientStop::new(border, end),
                        tiny_skia::GradientStop::new(1.0, start),
                    ],
                    SpreadMode::Pad,
                    Transform::identity(),
                )
            }
        };
        let Some(shader) = shader else {
            self.post_draw();
            return true;
        };
        let mut paint = Paint::default();
        paint.shader = shader;
        paint.anti_alias = self.antialias;
        let (pixmap, mask) = self.canvas();
        pixmap.fill_path(&path, &paint, FillRule::EvenOdd, Transform::identity(), mask);
        self.post_draw();
        true
    }

    /// Linear gradient with explicit stops between two device points.
    pub fn draw_gradient_stops(
        &mut self,
        poly: &PolyPolygon,
        from: Point,
        to: Point,
        stops: &[GradientStop],
    ) -> bool {
        self.pre_draw();
        let Some(path) = path::from_poly_polygon(poly, None) else {
            self.post_draw();
            return true;
        };
        self.add_update_region(IRect::round_out(path.bounds()));
        let stops: Vec<_> = stops
            .iter()
            .map(|s| tiny_skia::GradientStop::new(s.offset, s.color.to_sk()))
            .collect();
        let shader = LinearGradient::new(
            SkPoint::from_xy(from.x + PIXEL_CENTER, from.y + PIXEL_CENTER),
            SkPoint::from_xy(to.x + PIXEL_CENTER, to.y + PIXEL_CENTER),
            stops,
            SpreadMode::Pad,
            Transform::identity(),
        );
        let Some(shader) = shader else {
            self.post_draw();
            return false;
        };
        let mut paint = Paint::default();
        paint.shader = shader;
        paint.anti_alias = self.antialias;
        let (pixmap, mask) = self.canvas();
        pixmap.fill_path(&path, &paint, FillRule::EvenOdd, Transform::identity(), mask);
        self.post_draw();
        true
    }

    // ---- invert ------------------------------------------------------------

    pub fn invert_rect(&mut self, rect: IRect, style: InvertStyle) {
        let polygon = Polygon::from_points(
            &[
                Point::new(rect.x as f32, rect.y as f32),
                Point::new(rect.right() as f32, rect.y as f32),
                Point::new(rect.right() as f32, rect.bottom() as f32),
                Point::new(rect.x as f32, rect.bottom() as f32),
            ],
            true,
        );
        self.invert(&PolyPolygon::from_polygon(polygon), style);
    }

    pub fn invert(&mut self, poly: &PolyPolygon, style: InvertStyle) {
        debug_assert!(!self.xor_mode);
        self.pre_draw();
        let Some(path) = path::from_poly_polygon(poly, None) else {
            self.post_draw();
            return;
        };
        self.add_update_region(IRect::round_out(path.bounds()));
        match style {
            InvertStyle::TrackFrame => {
                // The wide dashed stroke must not paint outside the shape
                // bounds, so tighten the clip to them for this draw.
                let bounds = IRect::round_out(path.bounds());
                let rects: Vec<IRect> = self
                    .clip
                    .rects()
                    .iter()
                    .filter_map(|r| r.intersect(&bounds))
                    .collect();
                let surface = self.surface_mut();
                let (w, h) = (surface.width() as u32, surface.height() as u32);
                let frame_mask = Region::from_rects(rects).to_mask(w, h);
                let mut paint = Paint::default();
                paint.set_color(Color::WHITE.to_sk());
                paint.blend_mode = BlendMode::Difference;
                let stroke = Stroke {
                    width: 2.0,
                    dash: StrokeDash::new(vec![4.0, 4.0], 0.0),
                    ..Stroke::default()
                };
                surface.pixmap_mut().stroke_path(
                    &path,
                    &paint,
                    &stroke,
                    Transform::identity(),
                    frame_mask.as_ref(),
                );
            }
            InvertStyle::Full => {
                let mut paint = Paint::default();
                paint.set_color(Color::WHITE.to_sk());
                paint.blend_mode = BlendMode::Difference;
                let (pixmap, mask) = self.canvas();
                pixmap.fill_path(&path, &paint, FillRule::EvenOdd, Transform::identity(), mask);
            }
            InvertStyle::Checker50 => {
                let checker = checker_pattern();
                let mut paint = Paint::default();
                paint.shader = Pattern::new(
                    checker.as_ref(),
                    SpreadMode::Repeat,
                    FilterQuality::Nearest,
                    1.0,
                    Transform::identity(),
                );
                paint.blend_mode = BlendMode::Difference;
                let (pixmap, mask) = self.canvas();
                pixmap.fill_path(&path, &paint, FillRule::EvenOdd, Transform::identity(), mask);
            }
        }
        self.post_draw();
    }

    // ---- text --------------------------------------------------------------

    /// Fill positioned glyph outlines. Vertical glyphs get an extra quarter
    /// turn on top of the run orientation.
    pub fn draw_glyph_run(&mut self, run: &GlyphRun, color: Color) {
        if run.glyphs.is_empty() {
            return;
        }
        self.pre_draw();
        let mut paint = Paint::default();
        paint.set_color(color.to_sk());
        paint.anti_alias = self.antialias;
        for glyph in &run.glyphs {
            let Some(outline) = path::from_poly_polygon(&glyph.outline, None) else {
                continue;
            };
            let mut angle = run.orientation_degrees;
            if glyph.vertical {
                angle += 90.0;
            }
            let placement = Transform::from_rotate(angle)
                .post_translate(glyph.position.x, glyph.position.y);
            let Some(placed) = outline.transform(placement) else {
                continue;
            };
            self.add_update_region(IRect::round_out(placed.bounds()));
            let (pixmap, mask) = self.canvas();
            pixmap.fill_path(&placed, &paint, FillRule::EvenOdd, Transform::identity(), mask);
        }
        self.post_draw();
    }

    // ---- readback ----------------------------------------------------------

    pub fn get_pixel(&mut self, x: i32, y: i32) -> Option<Color> {
        debug_assert_eq!(thread::current().id(), self.owner);
        self.check_surface();
        self.flush_drawing();
        let surface = self.surface.as_ref()?;
        if x < 0 || y < 0 {
            return None;
        }
        let pixel = surface.pixmap().pixel(x as u32, y as u32)?;
        let c = pixel.demultiply();
        Some(Color::new(c.red(), c.green(), c.blue(), c.alpha()))
    }

    pub fn get_bitmap(&mut self, rect: IRect) -> Option<Bitmap> {
        debug_assert_eq!(thread::current().id(), self.owner);
        self.check_surface();
        self.flush_drawing();
        let surface = self.surface.as_ref()?;
        let int_rect = tiny_skia::IntRect::from_xywh(
            rect.x,
            rect.y,
            u32::try_from(rect.w).ok()?,
            u32::try_from(rect.h).ok()?,
        )?;
        let copy = surface.pixmap().as_ref().clone_rect(int_rect)?;
        Some(Bitmap::from_pixmap(copy))
    }
}

/// Prefer scaling through the cache when the whole bitmap is drawn scaled.
fn cacheable_geometry(two: TwoRect, bitmap: &Bitmap) -> (TwoRect, i32, i32) {
    if two.scales()
        && two.src_x == 0
        && two.src_y == 0
        && two.src_w == bitmap.width()
        && two.src_h == bitmap.height()
    {
        let mut image_two = two;
        image_two.src_w = two.dest_w;
        image_two.src_h = two.dest_h;
        (image_two, two.dest_w, two.dest_h)
    } else {
        (two, bitmap.width(), bitmap.height())
    }
}

/// The half-pixel placement shift, or `None` for AA orthogonal shapes,
/// which already line up with the pixel grid and would only go fuzzy.
fn pixel_offset(use_aa: bool, only_orthogonal: bool) -> Option<Transform> {
    if use_aa && only_orthogonal {
        return None;
    }
    let fix = if use_aa { AA_POS_FIX } else { 0.0 };
    Some(Transform::from_translate(PIXEL_CENTER + fix, PIXEL_CENTER + fix))
}

/// Detect a poly-polygon that is exactly one axis-aligned rectangle.
fn rect_shape(poly: &PolyPolygon, bounds: SkRect) -> Option<SkRect> {
    if poly.count() != 1 {
        return None;
    }
    let polygon = &poly.polygons()[0];
    if !polygon.is_closed() || polygon.has_curves() {
        return None;
    }
    let mut points = polygon.points().to_vec();
    if points.len() == 5 && points[0].point.approx_eq(points[4].point) {
        points.pop();
    }
    if points.len() != 4 {
        return None;
    }
    let corner = |x: f32, y: f32| {
        points
            .iter()
            .any(|p| p.point.approx_eq(Point::new(x, y)))
    };
    let is_rect = corner(bounds.left(), bounds.top())
        && corner(bounds.right(), bounds.top())
        && corner(bounds.right(), bounds.bottom())
        && corner(bounds.left(), bounds.bottom());
    is_rect.then_some(bounds)
}

/// Endpoints of the gradient axis: the vertical top-to-bottom run of the
/// bound rect, rotated around its center.
fn gradient_axis(bounds: SkRect, angle_degrees: f32) -> (SkPoint, SkPoint) {
    let cx = bounds.left() + bounds.width() / 2.0;
    let cy = bounds.top() + bounds.height() / 2.0;
    let angle = angle_degrees.to_radians();
    let (sin, cos) = angle.sin_cos();
    // Span long enough for the rotated axis to cover the whole rect.
    let span = bounds.width() * sin.abs() + bounds.height() * cos.abs();
    let dir = (sin * span / 2.0, cos * span / 2.0);
    (
        SkPoint::from_xy(cx - dir.0 + PIXEL_CENTER, cy - dir.1 + PIXEL_CENTER),
        SkPoint::from_xy(cx + dir.0 + PIXEL_CENTER, cy + dir.1 + PIXEL_CENTER),
    )
}

fn to_stroke(style: &StrokeStyle) -> Stroke {
    let join = match style.join {
        LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
        LineJoin::Round => tiny_skia::LineJoin::Round,
        LineJoin::None | LineJoin::Miter => tiny_skia::LineJoin::Miter,
    };
    let cap = match style.cap {
        LineCap::Butt => tiny_skia::LineCap::Butt,
        LineCap::Round => tiny_skia::LineCap::Round,
        LineCap::Square => tiny_skia::LineCap::Square,
    };
    let dash = style
        .dash
        .as_ref()
        .filter(|d| d.iter().sum::<f32>() != 0.0)
        .and_then(|d| StrokeDash::new(d.clone(), 0.0));
    Stroke {
        width: if style.width > 0.0 { style.width } else { 1.0 },
        miter_limit: 1.0 / (style.miter_minimum_angle / 2.0).sin(),
        line_cap: cap,
        line_join: join,
        dash,
    }
}

/// 2x2 white/black checkerboard tile for 50% inverts.
fn checker_pattern() -> Pixmap {
    let mut pixmap = match Pixmap::new(2, 2) {
        Some(p) => p,
        None => fatal("checker tile allocation failed"),
    };
    let white = tiny_skia::ColorU8::from_rgba(255, 255, 255, 255).premultiply();
    let black = tiny_skia::ColorU8::from_rgba(0, 0, 0, 255).premultiply();
    let pixels = pixmap.pixels_mut();
    pixels[0] = white;
    pixels[1] = black;
    pixels[2] = black;
    pixels[3] = white;
    pixmap
}
