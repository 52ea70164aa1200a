use derive_more::From;

/// A rectangle in the `(x, y, width, height)` convention.
///
/// Used for both the destination of a sprite and its texture coordinate source. Values are not
/// validated: a negative width or height describes a mirrored rectangle, which is how sprites are
/// flipped.
#[derive(Copy, Clone, PartialEq, Debug, Default, From)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// The texture coordinates covering a full texture.
    pub const UNIT: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// The x coordinate of the second vertical edge. Left of `x` if the width is negative.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// The y coordinate of the second horizontal edge. Below `y` if the height is negative.
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    #[must_use]
    pub fn flipped_horizontally(&self) -> Self {
        Self::new(self.right(), self.y, -self.width, self.height)
    }

    #[must_use]
    pub fn flipped_vertically(&self) -> Self {
        Self::new(self.x, self.top(), self.width, -self.height)
    }
}

/// `z` is the width, `w` the height.
impl From<glam::Vec4> for Rect {
    fn from(v: glam::Vec4) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}
