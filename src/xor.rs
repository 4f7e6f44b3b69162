//! Bitwise-XOR drawing emulation.
//!
//! The renderer has no XOR blend, so XOR-mode drawing goes to a separate
//! layer which is folded into the surface pixel by pixel: the RGB channels
//! of every touched pixel are XORed into the destination, alpha stays
//! untouched. Channel math happens on straight (demultiplied) values,
//! otherwise premultiplication turns the bit pattern into garbage.

use tiny_skia::{ColorU8, Pixmap};

use crate::error::fatal;
use crate::geometry::IRect;

/// Side layer collecting XOR-mode draws until they are applied.
pub struct XorBuffer {
    pixmap: Pixmap,
    touched: Option<IRect>,
}

impl XorBuffer {
    /// Transparent layer matching the surface size.
    pub fn new(width: i32, height: i32) -> Self {
        match Pixmap::new(width.max(1) as u32, height.max(1) as u32) {
            Some(pixmap) => Self {
                pixmap,
                touched: None,
            },
            None => fatal("xor layer allocation failed"),
        }
    }

    /// Drawing target while XOR mode is active.
    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Record the area a draw affected; apply only walks this.
    pub fn add_touched(&mut self, rect: IRect) {
        self.touched = Some(match self.touched {
            Some(existing) => existing.union(&rect),
            None => rect,
        });
    }

    pub fn has_content(&self) -> bool {
        self.touched.is_some()
    }

    /// Fold the layer into `target` and reset to empty.
    pub fn apply(&mut self, target: &mut Pixmap) {
        let touched = match self.touched.take() {
            Some(t) => t,
            None => return,
        };
        let surface = IRect::from_size(target.width() as i32, target.height() as i32);
        let area = match touched.intersect(&surface) {
            Some(a) => a,
            None => {
                self.clear();
                return;
            }
        };

        let width = target.width() as usize;
        for y in area.y..area.bottom() {
            let row = y as usize * width;
            for x in area.x..area.right() {
                let index = row + x as usize;
                let src = self.pixmap.pixels()[index].demultiply();
                if src.alpha() == 0 {
                    continue; // never drawn to in this round
                }
                let dst = target.pixels()[index].demultiply();
                let mixed = ColorU8::from_rgba(
                    dst.red() ^ src.red(),
                    dst.green() ^ src.green(),
                    dst.blue() ^ src.blue(),
                    dst.alpha(),
                );
                target.pixels_mut()[index] = mixed.premultiply();
            }
        }
        self.clear();
    }

    fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
        self.touched = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Color as SkColor;

    fn solid(width: i32, height: i32, color: SkColor) -> Pixmap {
        let mut pixmap = Pixmap::new(width as u32, height as u32).unwrap();
        pixmap.fill(color);
        pixmap
    }

    #[test]
    fn xor_twice_restores_pixels() {
        let mut target = solid(4, 4, SkColor::from_rgba8(0x12, 0x34, 0x56, 255));
        let original = target.data().to_vec();

        for _ in 0..2 {
            let mut layer = XorBuffer::new(4, 4);
            layer.pixmap_mut().fill(SkColor::from_rgba8(0xFF, 0xFF, 0xFF, 255));
            layer.add_touched(IRect::from_size(4, 4));
            layer.apply(&mut target);
        }
        assert_eq!(target.data(), original.as_slice());
    }

    #[test]
    fn alpha_is_preserved() {
        let mut target = solid(1, 1, SkColor::from_rgba8(100, 100, 100, 128));
        let mut layer = XorBuffer::new(1, 1);
        layer.pixmap_mut().fill(SkColor::from_rgba8(0xFF, 0, 0, 255));
        layer.add_touched(IRect::from_size(1, 1));
        layer.apply(&mut target);
        assert_eq!(target.pixels()[0].demultiply().alpha(), 128);
    }

    #[test]
    fn untouched_pixels_stay() {
        let mut target = solid(4, 1, SkColor::from_rgba8(10, 10, 10, 255));
        let mut layer = XorBuffer::new(4, 1);
        layer.pixmap_mut().fill(SkColor::from_rgba8(0xFF, 0xFF, 0xFF, 255));
        layer.add_touched(IRect::new(0, 0, 2, 1)); // only the left half
        layer.apply(&mut target);

        let left = target.pixels()[0].demultiply();
        let right = target.pixels()[3].demultiply();
        assert_eq!(left.red(), 10 ^ 0xFF);
        assert_eq!(right.red(), 10);
    }

    #[test]
    fn apply_resets_the_layer() {
        let mut target = solid(2, 2, SkColor::from_rgba8(1, 2, 3, 255));
        let mut layer = XorBuffer::new(2, 2);
        layer.pixmap_mut().fill(SkColor::from_rgba8(0xF0, 0, 0, 255));
        layer.add_touched(IRect::from_size(2, 2));
        layer.apply(&mut target);
        assert!(!layer.has_content());

        // A second apply with no new drawing must be a no-op.
        let after_first = target.data().to_vec();
        layer.apply(&mut target);
        assert_eq!(target.data(), after_first.as_slice());
    }

    #[test]
    fn touched_outside_surface_is_ignored() {
        let mut target = solid(2, 2, SkColor::from_rgba8(1, 2, 3, 255));
        let before = target.data().to_vec();
        let mut layer = XorBuffer::new(2, 2);
        layer.add_touched(IRect::new(50, 50, 4, 4));
        layer.apply(&mut target);
        assert_eq!(target.data(), before.as_slice());
    }
}
