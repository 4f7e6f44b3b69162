// slate2d: raster/GPU 2D drawing backend
// Draws into tiny-skia pixmaps with deferred presentation.

pub mod backend;
pub mod batch;
pub mod bitmap;
pub mod cache;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod path;
pub mod region;
pub mod scheduler;
pub mod surface;
pub mod xor;

pub use backend::{
    Glyph, GlyphRun, Gradient, GradientStop, GradientStyle, Graphics, InvertStyle, LineCap,
    LineJoin, RopColor, StrokeStyle,
};
pub use bitmap::Bitmap;
pub use color::Color;
pub use config::GraphicsConfig;
pub use error::{GpuHealth, GraphicsError};
pub use geometry::{IRect, Point, PolyPoint, PolyPolygon, Polygon, TwoRect};
pub use region::Region;
pub use scheduler::{IdleScheduler, TaskPriority};
pub use surface::{GpuContext, PresentTarget};
