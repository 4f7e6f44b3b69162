//! End-to-end behavior of the drawing backend through its public API:
//! draw, read pixels back, present, and check the state-tracking rules
//! hold across operation sequences.

use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use proptest::prelude::*;
use rstest::rstest;
use tiny_skia::{Pixmap, PixmapRef};

use slate2d::cache::ImageCache;
use slate2d::{
    Bitmap, Color, GpuContext, GradientStop, Graphics, GraphicsConfig, IRect, IdleScheduler,
    InvertStyle, Point, PolyPolygon, Polygon, PresentTarget, StrokeStyle, TaskPriority, TwoRect,
};

const RED: Color = Color::rgb(255, 0, 0);
const BLUE: Color = Color::rgb(0, 0, 255);
const CLEAR: Color = Color::new(0, 0, 0, 0);

#[derive(Default)]
struct TargetState {
    width: i32,
    height: i32,
    offscreen: bool,
    presents: Vec<IRect>,
}

struct StubTarget {
    state: Arc<Mutex<TargetState>>,
}

impl PresentTarget for StubTarget {
    fn width(&self) -> i32 {
        self.state.lock().width
    }
    fn height(&self) -> i32 {
        self.state.lock().height
    }
    fn is_offscreen(&self) -> bool {
        self.state.lock().offscreen
    }
    fn present_region(&mut self, _pixels: PixmapRef<'_>, region: IRect) -> Result<()> {
        self.state.lock().presents.push(region);
        Ok(())
    }
}

struct StubScheduler {
    running: bool,
    requests: Arc<Mutex<Vec<TaskPriority>>>,
}

impl IdleScheduler for StubScheduler {
    fn is_main_loop_running(&self) -> bool {
        self.running
    }
    fn request_idle_flush(&mut self, priority: TaskPriority) {
        self.requests.lock().push(priority);
    }
}

fn stub_target(width: i32, height: i32, offscreen: bool) -> (Box<StubTarget>, Arc<Mutex<TargetState>>) {
    let state = Arc::new(Mutex::new(TargetState {
        width,
        height,
        offscreen,
        presents: Vec::new(),
    }));
    (
        Box::new(StubTarget {
            state: Arc::clone(&state),
        }),
        state,
    )
}

fn offscreen(width: i32, height: i32) -> Graphics {
    let (target, _) = stub_target(width, height, true);
    let scheduler = Box::new(StubScheduler {
        running: false,
        requests: Arc::default(),
    });
    Graphics::new(target, scheduler, None, Arc::default(), GraphicsConfig::standard()).unwrap()
}

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

fn solid_bitmap(width: i32, height: i32, color: Color) -> Bitmap {
    let mut bitmap = Bitmap::new(width, height).unwrap();
    bitmap
        .pixmap_mut()
        .fill(tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a));
    bitmap
}

#[test]
fn filled_rect_reads_back() {
    let mut g = offscreen(100, 100);
    g.set_fill_color(Some(RED));
    g.draw_rect(IRect::new(0, 0, 10, 10));
    assert_eq!(g.get_pixel(5, 5), Some(RED));
    assert_eq!(g.get_pixel(50, 50), Some(CLEAR));
}

#[test]
fn polyline_width_covers_pixels() {
    let mut g = offscreen(16, 16);
    g.set_line_color(Some(RED));
    let line = Polygon::from_points(&[Point::new(2.0, 5.0), Point::new(12.0, 5.0)], false);
    let style = StrokeStyle {
        width: 3.0,
        ..StrokeStyle::default()
    };
    assert!(g.draw_polyline(&line, 0.0, &style));
    assert_eq!(g.get_pixel(6, 5), Some(RED));
    assert_eq!(g.get_pixel(6, 10), Some(CLEAR));
}

#[test]
fn alpha_rect_applies_transparency() {
    let mut g = offscreen(8, 8);
    g.set_fill_color(Some(RED));
    assert!(g.draw_alpha_rect(IRect::from_size(8, 8), 0.5));
    let pixel = g.get_pixel(4, 4).unwrap();
    assert_eq!((pixel.r, pixel.g, pixel.b), (255, 0, 0));
    assert!((pixel.a as i32 - 128).abs() <= 1, "alpha was {}", pixel.a);
}

#[test]
fn scaled_copy_bits_fills_destination() {
    let mut g = offscreen(16, 16);
    g.set_fill_color(Some(RED));
    g.draw_rect(IRect::new(0, 0, 2, 2));
    g.copy_bits(TwoRect::new(IRect::new(0, 0, 2, 2), IRect::new(8, 8, 4, 4)), None);
    assert_eq!(g.get_pixel(9, 9), Some(RED));
    assert_eq!(g.get_pixel(10, 10), Some(RED));
    assert_eq!(g.get_pixel(13, 13), Some(CLEAR));
}

#[test]
fn masked_bitmap_honors_the_mask() {
    let bitmap = solid_bitmap(4, 4, RED);
    let hidden = solid_bitmap(4, 4, Color::new(0, 0, 0, 0));
    let shown = solid_bitmap(4, 4, Color::rgb(9, 9, 9));

    let mut g = offscreen(16, 16);
    let two = TwoRect::unscaled(0, 0, 1, 1, 4, 4);
    assert!(g.draw_bitmap_masked(two, &bitmap, &hidden));
    assert_eq!(g.get_pixel(2, 2), Some(CLEAR));
    assert!(g.draw_bitmap_masked(two, &bitmap, &shown));
    assert_eq!(g.get_pixel(2, 2), Some(RED));
}

#[test]
fn transformed_bitmap_lands_at_the_target_parallelogram() {
    let bitmap = solid_bitmap(4, 4, BLUE);
    let mut g = offscreen(16, 16);
    let drew = g.draw_transformed_bitmap(
        Point::new(5.0, 5.0),
        Point::new(9.0, 5.0),
        Point::new(5.0, 9.0),
        &bitmap,
        None,
        1.0,
    );
    assert!(drew);
    assert_eq!(g.get_pixel(6, 6), Some(BLUE));
    assert_eq!(g.get_pixel(2, 2), Some(CLEAR));
}

#[test]
fn gradient_stops_interpolate_between_points() {
    let mut g = offscreen(8, 32);
    let stops = [
        GradientStop { offset: 0.0, color: RED },
        GradientStop { offset: 1.0, color: BLUE },
    ];
    assert!(g.draw_gradient_stops(
        &rect_poly(0.0, 0.0, 8.0, 32.0),
        Point::new(0.0, 0.0),
        Point::new(0.0, 31.0),
        &stops,
    ));
    let top = g.get_pixel(4, 1).unwrap();
    let bottom = g.get_pixel(4, 30).unwrap();
    assert!(top.r > 200 && top.b < 60, "top was {top:?}");
    assert!(bottom.b > 200 && bottom.r < 60, "bottom was {bottom:?}");
}

#[test]
fn checker_invert_alternates_neighboring_pixels() {
    let mut g = offscreen(8, 8);
    g.set_fill_color(Some(Color::BLACK));
    g.draw_rect(IRect::from_size(8, 8));
    g.invert_rect(IRect::new(0, 0, 4, 4), InvertStyle::Checker50);
    let a = g.get_pixel(0, 0).unwrap();
    let b = g.get_pixel(1, 0).unwrap();
    assert_ne!(a, b);
    assert!(a == Color::WHITE || b == Color::WHITE);
}

#[test]
fn track_frame_invert_stays_inside_the_shape_bounds() {
    let mut g = offscreen(20, 20);
    g.set_fill_color(Some(Color::BLACK));
    g.draw_rect(IRect::from_size(20, 20));
    g.invert_rect(IRect::new(5, 5, 8, 8), InvertStyle::TrackFrame);
    // The stroke is two pixels wide; without the tightened clip it would
    // spill one pixel outside the rectangle.
    assert_eq!(g.get_pixel(3, 9), Some(Color::BLACK));
    assert_eq!(g.get_pixel(16, 9), Some(Color::BLACK));
}

#[test]
fn present_happens_on_idle_flush_only() {
    let (target, state) = stub_target(8, 8, false);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let scheduler = Box::new(StubScheduler {
        running: true,
        requests: Arc::clone(&requests),
    });
    let mut g =
        Graphics::new(target, scheduler, None, Arc::default(), GraphicsConfig::standard()).unwrap();
    g.set_fill_color(Some(RED));
    g.draw_rect(IRect::new(0, 0, 4, 4));
    g.draw_rect(IRect::new(4, 4, 4, 4));

    assert_eq!(requests.lock().len(), 1, "draw bursts coalesce to one request");
    assert!(state.lock().presents.is_empty());
    g.perform_flush();
    assert_eq!(state.lock().presents.len(), 1);
}

#[test]
fn cache_is_shared_between_backends() {
    let cache = Arc::new(ImageCache::default());
    let make = |cache: &Arc<ImageCache>| {
        let (target, _) = stub_target(300, 300, true);
        let scheduler = Box::new(StubScheduler {
            running: false,
            requests: Arc::default(),
        });
        Graphics::new(
            target,
            scheduler,
            None,
            Arc::clone(cache),
            GraphicsConfig::standard(),
        )
        .unwrap()
    };
    let bitmap = solid_bitmap(50, 50, RED);
    let two = TwoRect::new(IRect::from_size(50, 50), IRect::new(0, 0, 200, 200));

    let mut first = make(&cache);
    first.draw_bitmap(two, &bitmap);
    let after_first = cache.used_bytes();
    assert_eq!(after_first, 200 * 200 * 4);

    // The second backend reuses the composite instead of adding one.
    let mut second = make(&cache);
    second.draw_bitmap(two, &bitmap);
    assert_eq!(cache.used_bytes(), after_first);
    assert_eq!(second.get_pixel(100, 100), Some(RED));
}

#[rstest]
#[case(TwoRect::unscaled(0, 0, 1, 1, 0, 4))]
#[case(TwoRect::unscaled(0, 0, 1, 1, 4, 0))]
#[case(TwoRect::new(IRect::new(0, 0, 4, 4), IRect::new(1, 1, -2, 4)))]
fn degenerate_bitmap_draws_touch_nothing(#[case] two: TwoRect) {
    let bitmap = solid_bitmap(4, 4, RED);
    let mut g = offscreen(8, 8);
    g.draw_bitmap(two, &bitmap);
    assert!(g.draw_bitmap_masked(two, &bitmap, &bitmap));
    assert!(!g.blend_bitmap(two, &bitmap));
    let pixels = g.get_bitmap(IRect::from_size(8, 8)).unwrap();
    assert!(pixels.pixmap().pixels().iter().all(|p| p.alpha() == 0));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn xor_mode_is_an_involution(red in 0u8..=255, green in 0u8..=255, blue in 0u8..=255) {
        let base = Color::rgb(red, green, blue);
        let mut g = offscreen(8, 8);
        g.set_fill_color(Some(base));
        g.draw_rect(IRect::from_size(8, 8));

        g.set_fill_color(Some(Color::WHITE));
        for _ in 0..2 {
            g.set_xor_mode(true);
            g.draw_rect(IRect::new(1, 1, 5, 5));
            g.set_xor_mode(false);
        }
        prop_assert_eq!(g.get_pixel(3, 3), Some(base));
    }

    #[test]
    fn adjacent_batched_fills_leave_no_seam(split in 1i32..9) {
        // One 10-wide area filled as two fragments split at an arbitrary x;
        // every interior pixel must come out fully opaque.
        let mut g = offscreen(16, 16);
        g.set_fill_color(Some(RED));
        g.draw_poly_polygon(rect_poly(0.0, 2.0, split as f32, 6.0), 0.0);
        g.draw_poly_polygon(rect_poly(split as f32, 2.0, 10.0 - split as f32, 6.0), 0.0);
        for x in 0..10 {
            prop_assert_eq!(g.get_pixel(x, 5), Some(RED), "seam at x={}", x);
        }
    }
}

// GpuContext is exercised indirectly: binding creation fails, the backend
// must fall back to raster and still render correctly.
struct NoDeviceGpu;

impl GpuContext for NoDeviceGpu {
    fn create_binding(&mut self, _width: u32, _height: u32) -> Result<()> {
        anyhow::bail!("no device")
    }
    fn destroy_binding(&mut self) {}
    fn back_buffer(&mut self) -> Result<&mut Pixmap> {
        anyhow::bail!("no binding")
    }
    fn swap_buffers(&mut self) -> Result<()> {
        anyhow::bail!("no binding")
    }
    fn flush(&mut self) {}
    fn health(&self) -> slate2d::GpuHealth {
        slate2d::GpuHealth::Healthy
    }
}

#[test]
fn gpu_binding_failure_falls_back_to_raster_drawing() {
    let (target, state) = stub_target(8, 8, false);
    let scheduler = Box::new(StubScheduler {
        running: false,
        requests: Arc::default(),
    });
    let mut g = Graphics::new(
        target,
        scheduler,
        Some(Box::new(NoDeviceGpu)),
        Arc::default(),
        GraphicsConfig::standard(),
    )
    .unwrap();
    g.set_fill_color(Some(RED));
    g.draw_rect(IRect::from_size(8, 8));
    assert!(!g.is_gpu());
    assert_eq!(g.get_pixel(4, 4), Some(RED));
    assert!(!state.lock().presents.is_empty());
}
