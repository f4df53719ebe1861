/// Moving platforms: one-way surfaces shuttling between two endpoints.
///
/// Each tick `advance()` first records the current position in
/// `prev_x / prev_y`, then moves toward the active endpoint. Rider
/// transport later reads `delta()` to carry whoever stands on top, so
/// platforms must advance before any body is integrated.
///
/// Arrival snaps exactly onto the endpoint before reversing, which keeps
/// long-running cycles free of drift.

use super::entity::Sign;
use super::geometry::Rect;

/// Remaining distance treated as "arrived".
pub const ARRIVE_EPSILON: f32 = 1e-3;

#[derive(Clone, Debug)]
pub struct MovingPlatform {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Endpoint A (reached while `dir == Neg`).
    pub ax: f32,
    pub ay: f32,
    /// Endpoint B (reached while `dir == Pos`).
    pub bx: f32,
    pub by: f32,
    /// Pixels per tick before `dt_scale`.
    pub speed: f32,
    pub dir: Sign,
    pub prev_x: f32,
    pub prev_y: f32,
    pub collidable: bool,
    origin: (f32, f32),
}

impl MovingPlatform {
    pub fn new(rect: Rect, a: (f32, f32), b: (f32, f32), speed: f32) -> Self {
        MovingPlatform {
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
            ax: a.0,
            ay: a.1,
            bx: b.0,
            by: b.1,
            speed,
            dir: Sign::Pos,
            prev_x: rect.x,
            prev_y: rect.y,
            collidable: true,
            origin: (rect.x, rect.y),
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Where the platform stood at the start of the tick.
    #[inline]
    pub fn prev_rect(&self) -> Rect {
        Rect::new(self.prev_x, self.prev_y, self.w, self.h)
    }

    /// Displacement during the current tick.
    #[inline]
    pub fn delta(&self) -> (f32, f32) {
        (self.x - self.prev_x, self.y - self.prev_y)
    }

    #[inline]
    pub fn moved_up(&self) -> bool {
        self.y < self.prev_y
    }

    fn target(&self) -> (f32, f32) {
        match self.dir {
            Sign::Pos => (self.bx, self.by),
            Sign::Neg => (self.ax, self.ay),
        }
    }

    /// Move one tick along the path.
    pub fn advance(&mut self, dt_scale: f32) {
        self.prev_x = self.x;
        self.prev_y = self.y;

        let (tx, ty) = self.target();
        let dx = tx - self.x;
        let dy = ty - self.y;
        let dist = (dx * dx + dy * dy).sqrt();

        // Degenerate path or already parked on the endpoint.
        if dist < ARRIVE_EPSILON {
            self.dir = self.dir.flipped();
            return;
        }

        let step = (self.speed * dt_scale).max(0.0).min(dist);
        self.x += dx / dist * step;
        self.y += dy / dist * step;

        let overshot = dx * (tx - self.x) < 0.0 || dy * (ty - self.y) < 0.0;
        if dist - step < ARRIVE_EPSILON || overshot {
            self.x = tx;
            self.y = ty;
            self.dir = self.dir.flipped();
        }
    }

    /// Back to the level-load state.
    pub fn reset(&mut self) {
        self.x = self.origin.0;
        self.y = self.origin.1;
        self.prev_x = self.x;
        self.prev_y = self.y;
        self.dir = Sign::Pos;
    }
}

/// Advance every platform in level order.
pub fn advance_platforms(platforms: &mut [MovingPlatform], dt_scale: f32) {
    for p in platforms.iter_mut() {
        p.advance(dt_scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform(a: (f32, f32), b: (f32, f32), speed: f32) -> MovingPlatform {
        MovingPlatform::new(Rect::new(a.0, a.1, 80.0, 16.0), a, b, speed)
    }

    #[test]
    fn horizontal_cycle_is_periodic() {
        let mut p = platform((0.0, 0.0), (100.0, 0.0), 10.0);
        for _ in 0..10 { p.advance(1.0); }
        assert_eq!((p.x, p.y), (100.0, 0.0));
        assert_eq!(p.dir, Sign::Neg);
        for _ in 0..10 { p.advance(1.0); }
        assert_eq!((p.x, p.y), (0.0, 0.0));
        assert_eq!(p.dir, Sign::Pos);
    }

    #[test]
    fn many_cycles_do_not_drift() {
        let mut p = platform((10.0, 40.0), (73.0, 118.0), 1.7);
        let mut arrivals_at_a = 0;
        for _ in 0..5000 {
            let before = p.dir;
            p.advance(1.25);
            assert!(p.x >= 10.0 && p.x <= 73.0);
            assert!(p.y >= 40.0 && p.y <= 118.0);
            if before == Sign::Neg && p.dir == Sign::Pos {
                assert_eq!((p.x, p.y), (10.0, 40.0));
                arrivals_at_a += 1;
            }
        }
        assert!(arrivals_at_a > 40);
    }

    #[test]
    fn vertical_path_reverses_at_endpoints() {
        let mut p = platform((0.0, 100.0), (0.0, 40.0), 20.0);
        for _ in 0..3 { p.advance(1.0); }
        assert_eq!(p.y, 40.0);
        assert_eq!(p.dir, Sign::Neg);
        assert!(p.moved_up());
        p.advance(1.0);
        assert_eq!(p.y, 60.0);
        assert!(!p.moved_up());
    }

    #[test]
    fn final_step_is_clamped_to_endpoint() {
        let mut p = platform((0.0, 0.0), (25.0, 0.0), 10.0);
        p.advance(1.0);
        p.advance(1.0);
        p.advance(1.0);
        assert_eq!(p.x, 25.0);
        assert_eq!(p.delta(), (5.0, 0.0));
        assert_eq!(p.dir, Sign::Neg);
    }

    #[test]
    fn diagonal_step_has_unit_speed_length() {
        let mut p = platform((0.0, 0.0), (300.0, 400.0), 5.0);
        p.advance(1.0);
        let (dx, dy) = p.delta();
        assert!((dx - 3.0).abs() < 1e-4);
        assert!((dy - 4.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_path_flips_without_moving() {
        let mut p = platform((50.0, 50.0), (50.0, 50.0), 10.0);
        p.advance(1.0);
        assert_eq!(p.dir, Sign::Neg);
        p.advance(1.0);
        assert_eq!(p.dir, Sign::Pos);
        assert_eq!((p.x, p.y), (50.0, 50.0));
        assert!(p.x.is_finite() && p.y.is_finite());
    }

    #[test]
    fn prev_tracks_start_of_tick() {
        let mut p = platform((0.0, 0.0), (100.0, 0.0), 4.0);
        p.advance(1.25);
        assert_eq!((p.prev_x, p.prev_y), (0.0, 0.0));
        assert_eq!(p.x, 5.0);
        p.advance(1.25);
        assert_eq!(p.prev_x, 5.0);
    }

    #[test]
    fn reset_restores_origin_and_dir() {
        let mut p = platform((0.0, 0.0), (100.0, 0.0), 30.0);
        for _ in 0..5 { p.advance(1.0); }
        p.reset();
        assert_eq!((p.x, p.y, p.prev_x, p.prev_y), (0.0, 0.0, 0.0, 0.0));
        assert_eq!(p.dir, Sign::Pos);
    }
}
