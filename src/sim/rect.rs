//! Axis-aligned rectangles in world space
//!
//! World units, origin at the top-left, Y grows downward. `pos` is the
//! top-left corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size.x * 0.5
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Clamp a point onto the rectangle (closest point inside or on the edge)
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.pos, self.pos + self.size)
    }

    /// Grow horizontally around the center and extend the top upward
    pub fn grown(&self, extra_width: f32, extra_top: f32) -> Rect {
        Rect::new(
            self.pos.x - extra_width * 0.5,
            self.pos.y - extra_top,
            self.size.x + extra_width,
            self.size.y + extra_top,
        )
    }
}
