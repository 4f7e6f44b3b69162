//! Host color model and conversions to the renderer's pixel format.

use tiny_skia::Color as SkColor;

/// RGBA color in the host model, 8 bits per channel.
///
/// Stroke and fill colors are carried as `Option<Color>` by the backend;
/// `None` means that stroke or fill is skipped entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Renderer color, alpha preserved.
    pub fn to_sk(self) -> SkColor {
        SkColor::from_rgba8(self.r, self.g, self.b, self.a)
    }

    /// Renderer color with alpha derived from a transparency factor,
    /// 0.0 (opaque) to 1.0; the color's own alpha is ignored.
    pub fn to_sk_with_transparency(self, transparency: f64) -> SkColor {
        let alpha = (255.0 * (1.0 - transparency)).round().clamp(0.0, 255.0) as u8;
        SkColor::from_rgba8(self.r, self.g, self.b, alpha)
    }

    /// Renderer color with channel intensity scaled by a 0..=100 percent
    /// factor, used by gradient endpoints.
    pub fn to_sk_with_intensity(self, intensity: u16) -> SkColor {
        let scale = |c: u8| (u32::from(c) * u32::from(intensity) / 100).min(255) as u8;
        SkColor::from_rgba8(scale(self.r), scale(self.g), scale(self.b), self.a)
    }

    /// Back-conversion from the renderer model, used by pixel readback.
    pub fn from_sk(color: SkColor) -> Self {
        let c = color.to_color_u8();
        Self::new(c.red(), c.green(), c.blue(), c.alpha())
    }
}
