//! Axis-aligned rectangles and road layout
//!
//! Screen coordinates throughout: origin at the top-left, +y down. The road
//! is a vertical band in the center of the virtual screen, split into equal
//! lanes; everything that moves is an axis-aligned rect inside it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts;

/// An axis-aligned rectangle, top-left anchored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge (x + w)
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge (y + h)
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Center point
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Overlap test with strict inequalities: rects that merely touch along
    /// an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Shrink about the center, keeping the given fraction of each dimension.
    /// `shrink_centered(0.5, 0.4)` keeps half the width and 40% of the height.
    pub fn shrink_centered(&self, keep_w: f32, keep_h: f32) -> Rect {
        Rect {
            x: self.x + self.w * (1.0 - keep_w) / 2.0,
            y: self.y + self.h * (1.0 - keep_h) / 2.0,
            w: self.w * keep_w,
            h: self.h * keep_h,
        }
    }
}

/// Road layout, fixed at construction
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Road {
    /// Left edge of the road
    pub start_x: f32,
    /// Total road width (lane_width * lane count, exactly)
    pub width: f32,
    /// Width of a single lane
    pub lane_width: f32,
}

impl Road {
    /// Lay out the road on a screen of the given width: the road band covers
    /// the center `ROAD_WIDTH_FRACTION` of it, split into `LANE_COUNT` lanes.
    pub fn new(screen_w: f32) -> Self {
        let lane_width = screen_w * consts::ROAD_WIDTH_FRACTION / consts::LANE_COUNT as f32;
        let width = lane_width * consts::LANE_COUNT as f32;
        Self {
            start_x: (screen_w - width) / 2.0,
            width,
            lane_width,
        }
    }

    /// Right edge of the road
    #[inline]
    pub fn right_edge(&self) -> f32 {
        self.start_x + self.width
    }

    /// Left edge of a lane
    #[inline]
    pub fn lane_origin_x(&self, lane: u32) -> f32 {
        self.start_x + lane as f32 * self.lane_width
    }

    /// X position that centers a rect of width `w` inside a lane
    pub fn spawn_x(&self, lane: u32, w: f32) -> f32 {
        self.lane_origin_x(lane) + (self.lane_width - w) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersects_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_rect_intersects_disjoint() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_rect_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        let c = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_shrink_centered_arithmetic() {
        let r = Rect::new(100.0, 200.0, 80.0, 160.0);
        let s = r.shrink_centered(0.5, 0.4);
        assert_eq!(s.x, 100.0 + 80.0 * 0.25);
        assert_eq!(s.y, 200.0 + 160.0 * 0.3);
        assert_eq!(s.w, 40.0);
        assert_eq!(s.h, 64.0);
        // Shrinking keeps the center fixed
        assert!((s.center() - r.center()).length() < 1e-4);
    }

    #[test]
    fn test_road_layout_800() {
        let road = Road::new(800.0);
        assert!((road.lane_width - 160.0).abs() < 1e-3);
        assert!((road.width - 480.0).abs() < 1e-3);
        assert!((road.start_x - 160.0).abs() < 1e-3);
        assert_eq!(road.width, road.lane_width * 3.0);
        assert_eq!(road.right_edge(), road.start_x + road.width);
    }

    #[test]
    fn test_spawn_x_centers_in_lane() {
        let road = Road::new(800.0);
        let w = 100.0;
        for lane in 0..3 {
            let x = road.spawn_x(lane, w);
            // The documented formula, recomputed
            assert_eq!(
                x,
                road.start_x + lane as f32 * road.lane_width + (road.lane_width - w) / 2.0
            );
            // Strictly inside the road band
            assert!(x > road.start_x);
            assert!(x + w < road.right_edge());
        }
    }
}
