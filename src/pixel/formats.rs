use crate::pixel::color::Color;

/// Runtime tag describing a pixel layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PixelFormat {
    /// 8-bit B, G, R, A.
    Bgra8888,
    /// 8-bit R, G, B, A.
    Rgba8888,
    /// 8-bit B, G, R.
    Bgr888,
    /// 16-bit packed 5-6-5.
    Bgr565,
    /// 8-bit luma.
    Grayscale8,
    /// 16-bit luma.
    Grayscale16,
}

impl PixelFormat {
    /// Bytes occupied by one pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bgra8888 | Self::Rgba8888 => 4,
            Self::Bgr888 => 3,
            Self::Bgr565 | Self::Grayscale16 => 2,
            Self::Grayscale8 => 1,
        }
    }
}

/// Contract for fixed-layout pixel values.
///
/// For formats with at most 8 bits per channel `from_color(to_color(p)) == p`. Going the other
/// way is exact only up to the quantization of the narrower format.
pub trait Pixel: Copy + Default + PartialEq + Send + Sync + std::fmt::Debug + 'static {
    /// Layout tag.
    const FORMAT: PixelFormat;

    /// Quantize a color into this format.
    fn from_color(c: Color) -> Self;

    /// Expand this pixel into a color.
    fn to_color(self) -> Color;
}

/// 32-bit straight-alpha pixel stored as B, G, R, A.
#[repr(C)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Bgra8888 {
    /// Blue.
    pub b: u8,
    /// Green.
    pub g: u8,
    /// Red.
    pub r: u8,
    /// Alpha.
    pub a: u8,
}

impl Bgra8888 {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Build from R, G, B, A channel values.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { b, g, r, a }
    }
}

impl Pixel for Bgra8888 {
    const FORMAT: PixelFormat = PixelFormat::Bgra8888;

    fn from_color(c: Color) -> Self {
        Self::new(c.r, c.g, c.b, c.a)
    }

    fn to_color(self) -> Color {
        Color::from_argb(self.a, self.r, self.g, self.b)
    }
}

impl From<Color> for Bgra8888 {
    fn from(c: Color) -> Self {
        Self::from_color(c)
    }
}

/// 32-bit straight-alpha pixel stored as R, G, B, A.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba8888 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Pixel for Rgba8888 {
    const FORMAT: PixelFormat = PixelFormat::Rgba8888;

    fn from_color(c: Color) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }

    fn to_color(self) -> Color {
        Color::from_argb(self.a, self.r, self.g, self.b)
    }
}

/// 24-bit opaque pixel stored as B, G, R. Alpha is dropped on conversion.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bgr888 {
    /// Blue.
    pub b: u8,
    /// Green.
    pub g: u8,
    /// Red.
    pub r: u8,
}

impl Pixel for Bgr888 {
    const FORMAT: PixelFormat = PixelFormat::Bgr888;

    fn from_color(c: Color) -> Self {
        Self {
            b: c.b,
            g: c.g,
            r: c.r,
        }
    }

    fn to_color(self) -> Color {
        Color::from_rgb(self.r, self.g, self.b)
    }
}

/// 16-bit packed pixel: red in bits 11..16, green in 5..11, blue in 0..5.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bgr565(pub u16);

impl Bgr565 {
    fn expand5(v: u16) -> u8 {
        let v = (v & 0x1f) as u8;
        (v << 3) | (v >> 2)
    }

    fn expand6(v: u16) -> u8 {
        let v = (v & 0x3f) as u8;
        (v << 2) | (v >> 4)
    }
}

impl Pixel for Bgr565 {
    const FORMAT: PixelFormat = PixelFormat::Bgr565;

    fn from_color(c: Color) -> Self {
        let r = u16::from(c.r >> 3);
        let g = u16::from(c.g >> 2);
        let b = u16::from(c.b >> 3);
        Self((r << 11) | (g << 5) | b)
    }

    fn to_color(self) -> Color {
        Color::from_rgb(
            Self::expand5(self.0 >> 11),
            Self::expand6(self.0 >> 5),
            Self::expand5(self.0),
        )
    }
}

/// 8-bit luma.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Grayscale8(pub u8);

impl Pixel for Grayscale8 {
    const FORMAT: PixelFormat = PixelFormat::Grayscale8;

    fn from_color(c: Color) -> Self {
        Self(c.luminance())
    }

    fn to_color(self) -> Color {
        Color::from_rgb(self.0, self.0, self.0)
    }
}

/// 16-bit luma; 8-bit luma `v` maps to `v * 257`.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Grayscale16(pub u16);

impl Pixel for Grayscale16 {
    const FORMAT: PixelFormat = PixelFormat::Grayscale16;

    fn from_color(c: Color) -> Self {
        Self(u16::from(c.luminance()) * 257)
    }

    fn to_color(self) -> Color {
        let v = (self.0 >> 8) as u8;
        Color::from_rgb(v, v, v)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pixel/formats.rs"]
mod tests;
