/// An 8 bit per channel RGBA color.
///
/// This is the color format stored in every sprite vertex, the GPU normalizes the channels to
/// `0.0..=1.0`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::new(red, green, blue, 255)
    }

    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub const fn rgb_u32(rgb: u32) -> Self {
        let r = ((rgb & 0xff0000) >> 16) as u8;
        let g = ((rgb & 0xff00) >> 8) as u8;
        let b = (rgb & 0xff) as u8;
        Self::rgb(r, g, b)
    }

    /// Creates a color from normalized components, clamping each to `0.0..=1.0`.
    pub fn from_normalized(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self::new(
            unit_to_u8(red),
            unit_to_u8(green),
            unit_to_u8(blue),
            unit_to_u8(alpha),
        )
    }

    #[must_use]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self { alpha, ..self }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }
}

impl From<[u8; 4]> for Color {
    fn from([red, green, blue, alpha]: [u8; 4]) -> Self {
        Self::new(red, green, blue, alpha)
    }
}

impl From<Color> for [u8; 4] {
    fn from(color: Color) -> Self {
        color.to_array()
    }
}

impl From<glam::Vec4> for Color {
    fn from(v: glam::Vec4) -> Self {
        Self::from_normalized(v.x, v.y, v.z, v.w)
    }
}

fn unit_to_u8(v: f32) -> u8 {
    // NaN clamps to 0 through the saturating cast.
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
