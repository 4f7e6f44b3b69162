//! Drawing surface lifecycle and the host presentation collaborators.
//!
//! A surface always draws into a CPU pixmap. The difference between the
//! raster and GPU strategies is how pixels reach the window: raster
//! surfaces present their backing pixmap directly, GPU surfaces keep the
//! pixmap offscreen and blit it into a back buffer fetched from the host
//! context on every present (the back buffer's identity may change between
//! presents, so it is re-fetched each time).

use anyhow::Result;
use log::{debug, warn};
use tiny_skia::{BlendMode, Mask, Pixmap, PixmapPaint, PixmapRef, Transform};

use crate::error::{fatal, GpuHealth};
use crate::geometry::IRect;
use crate::region::Region;

/// Windowing collaborator: target geometry plus raster presentation.
pub trait PresentTarget {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    /// Off-screen targets have no present step at all.
    fn is_offscreen(&self) -> bool;
    /// Present a sub-region of the backing pixels to the window.
    fn present_region(&mut self, pixels: PixmapRef<'_>, region: IRect) -> Result<()>;
}

/// Host-provided GPU presentation context.
///
/// Creation failure falls back to raster once; bad health after a draw is
/// unrecoverable and aborts.
pub trait GpuContext {
    /// Bind the context to a window back-buffer chain of the given size.
    fn create_binding(&mut self, width: u32, height: u32) -> Result<()>;
    fn destroy_binding(&mut self);
    /// Current back buffer to blit into. Identity may differ per call.
    fn back_buffer(&mut self) -> Result<&mut Pixmap>;
    /// Present the entire back buffer.
    fn swap_buffers(&mut self) -> Result<()>;
    /// Submit queued commands without presenting.
    fn flush(&mut self);
    fn health(&self) -> GpuHealth;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backing {
    Raster,
    Gpu,
}

/// The drawable target owned by one graphics backend.
pub struct Surface {
    pixmap: Pixmap,
    clip_mask: Option<Mask>,
    backing: Backing,
    offscreen: bool,
}

impl Surface {
    /// Create a surface for the given target dimensions.
    ///
    /// Off-screen targets (including zero-sized ones, which the renderer
    /// cannot represent) get a raster surface clamped to at least 1x1.
    /// Window targets try the GPU binding first when a context is supplied
    /// and not forced off; on failure the fallback to raster is silent
    /// apart from a warning. Raster allocation failure is fatal.
    pub(crate) fn create(
        width: i32,
        height: i32,
        offscreen: bool,
        mut gpu: Option<&mut (dyn GpuContext + '_)>,
        force_raster: bool,
    ) -> Surface {
        if offscreen {
            let pixmap = alloc_pixmap(width.max(1), height.max(1));
            return Surface {
                pixmap,
                clip_mask: None,
                backing: Backing::Raster,
                offscreen: true,
            };
        }
        if !force_raster {
            if let Some(ctx) = gpu.as_deref_mut() {
                match ctx.create_binding(width as u32, height as u32) {
                    Ok(()) => {
                        debug!("created {width}x{height} GPU surface");
                        return Surface {
                            pixmap: alloc_pixmap(width, height),
                            clip_mask: None,
                            backing: Backing::Gpu,
                            offscreen: false,
                        };
                    }
                    Err(err) => {
                        warn!("cannot create GPU window surface, falling back to raster: {err}");
                        ctx.destroy_binding();
                    }
                }
            }
        }
        debug!("created {width}x{height} raster surface");
        Surface {
            pixmap: alloc_pixmap(width, height),
            clip_mask: None,
            backing: Backing::Raster,
            offscreen: false,
        }
    }

    pub fn width(&self) -> i32 {
        self.pixmap.width() as i32
    }

    pub fn height(&self) -> i32 {
        self.pixmap.height() as i32
    }

    pub fn bounds(&self) -> IRect {
        IRect::from_size(self.width(), self.height())
    }

    pub fn is_gpu(&self) -> bool {
        self.backing == Backing::Gpu
    }

    pub fn is_offscreen(&self) -> bool {
        self.offscreen
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    pub(crate) fn clip_mask(&self) -> Option<&Mask> {
        self.clip_mask.as_ref()
    }

    /// Mutable pixels together with the clip mask, for one draw call.
    pub(crate) fn draw_parts(&mut self) -> (&mut Pixmap, Option<&Mask>) {
        (&mut self.pixmap, self.clip_mask.as_ref())
    }

    /// Replace the surface clip wholesale; never stacked.
    pub(crate) fn set_clip(&mut self, region: &Region) {
        self.clip_mask = region.to_mask(self.pixmap.width(), self.pixmap.height());
    }

    /// Immutable copy of the current pixels, used for resize carry-over
    /// and cross-surface copies.
    pub(crate) fn snapshot(&self) -> Pixmap {
        self.pixmap.clone()
    }

    /// Paint a snapshot back over this surface as-is, alpha included.
    pub(crate) fn draw_snapshot(&mut self, snapshot: &Pixmap) {
        let paint = PixmapPaint {
            blend_mode: BlendMode::Source,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, snapshot.as_ref(), &paint, Transform::identity(), None);
    }

    /// Blit this surface into the GPU back buffer and present it.
    ///
    /// The whole buffer is swapped: partial swaps are only valid when the
    /// back buffer identity is stable, which GPU chains do not guarantee.
    pub(crate) fn present_gpu(&self, ctx: &mut dyn GpuContext) -> Result<()> {
        let back = ctx.back_buffer()?;
        let paint = PixmapPaint {
            blend_mode: BlendMode::Source,
            ..PixmapPaint::default()
        };
        back.draw_pixmap(0, 0, self.pixmap.as_ref(), &paint, Transform::identity(), None);
        ctx.swap_buffers()
    }
}

fn alloc_pixmap(width: i32, height: i32) -> Pixmap {
    match Pixmap::new(width.max(1) as u32, height.max(1) as u32) {
        Some(pixmap) => pixmap,
        None => fatal("surface pixel buffer allocation failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    struct FailingGpu {
        create_calls: u32,
        destroyed: bool,
    }

    impl GpuContext for FailingGpu {
        fn create_binding(&mut self, _width: u32, _height: u32) -> Result<()> {
            self.create_calls += 1;
            bail!("no device")
        }
        fn destroy_binding(&mut self) {
            self.destroyed = true;
        }
        fn back_buffer(&mut self) -> Result<&mut Pixmap> {
            bail!("no binding")
        }
        fn swap_buffers(&mut self) -> Result<()> {
            bail!("no binding")
        }
        fn flush(&mut self) {}
        fn health(&self) -> GpuHealth {
            GpuHealth::Healthy
        }
    }

    #[test]
    fn offscreen_zero_size_clamps_to_one() {
        let surface = Surface::create(0, -4, true, None, false);
        assert_eq!((surface.width(), surface.height()), (1, 1));
        assert!(!surface.is_gpu());
        assert!(surface.is_offscreen());
    }

    #[test]
    fn gpu_failure_falls_back_to_raster() {
        let mut gpu = FailingGpu {
            create_calls: 0,
            destroyed: false,
        };
        let surface = Surface::create(8, 8, false, Some(&mut gpu), false);
        assert!(!surface.is_gpu());
        assert_eq!(gpu.create_calls, 1);
        assert!(gpu.destroyed);
        assert_eq!((surface.width(), surface.height()), (8, 8));
    }

    #[test]
    fn force_raster_never_touches_gpu() {
        let mut gpu = FailingGpu {
            create_calls: 0,
            destroyed: false,
        };
        let surface = Surface::create(8, 8, false, Some(&mut gpu), true);
        assert!(!surface.is_gpu());
        assert_eq!(gpu.create_calls, 0);
    }

    #[test]
    fn clip_covering_surface_clears_mask() {
        let mut surface = Surface::create(10, 10, true, None, false);
        surface.set_clip(&Region::from_rect(IRect::new(0, 0, 4, 4)));
        assert!(surface.clip_mask().is_some());
        surface.set_clip(&Region::from_rect(IRect::from_size(10, 10)));
        assert!(surface.clip_mask().is_none());
    }

    #[test]
    fn snapshot_round_trip() {
        let mut surface = Surface::create(4, 4, true, None, false);
        surface.pixmap_mut().fill(tiny_skia::Color::from_rgba8(9, 8, 7, 255));
        let snap = surface.snapshot();
        surface.pixmap_mut().fill(tiny_skia::Color::TRANSPARENT);
        surface.draw_snapshot(&snap);
        assert_eq!(surface.pixmap().data(), snap.data());
    }
}
