/// Axis-aligned rectangles in world (pixel) coordinates.
///
/// `(x, y)` is the top-left corner, `y` grows downward.

use serde::Deserialize;

#[derive(Clone, Copy, PartialEq, Debug, Default, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 { self.x + self.w }

    #[inline]
    pub fn bottom(&self) -> f32 { self.y + self.h }

    #[inline]
    pub fn center_x(&self) -> f32 { self.x + self.w / 2.0 }

    /// Same size, moved to `(x, y)`.
    #[inline]
    pub fn at(&self, x: f32, y: f32) -> Rect {
        Rect { x, y, w: self.w, h: self.h }
    }

    #[inline]
    pub fn shifted(&self, dx: f32, dy: f32) -> Rect {
        self.at(self.x + dx, self.y + dy)
    }
}

/// True iff `a` and `b` share positive area. Touching edges do not overlap.
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}
