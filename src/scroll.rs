//! Smooth page scrolling
//!
//! Wheel input moves a target offset; every frame the applied offset eases
//! toward it. While idle the scroller follows the native offset so keyboard and
//! scrollbar scrolling are not fought.

/// Pixels per wheel "line" when the browser reports line deltas
pub const LINE_HEIGHT: f32 = 16.0;

/// How a wheel delta is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelUnit {
    Pixel,
    Line,
    Page,
}

impl WheelUnit {
    /// Map a DOM `deltaMode` value
    pub fn from_delta_mode(mode: u32) -> Self {
        match mode {
            1 => WheelUnit::Line,
            2 => WheelUnit::Page,
            _ => WheelUnit::Pixel,
        }
    }
}

/// Eased scroll offset
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    current: f32,
    target: f32,
    limit: f32,
    /// Fraction of the remaining distance covered per frame
    lerp: f32,
    wheel_multiplier: f32,
    /// Distance under which the offset snaps to the target
    snap: f32,
}

impl Default for SmoothScroll {
    fn default() -> Self {
        Self::new(0.1, 1.0)
    }
}

impl SmoothScroll {
    pub fn new(lerp: f32, wheel_multiplier: f32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            limit: 0.0,
            lerp: lerp.clamp(0.01, 1.0),
            wheel_multiplier,
            snap: 0.5,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        self.current != self.target
    }

    /// Set the largest reachable offset (document height minus viewport)
    pub fn set_limit(&mut self, limit: f32) {
        self.limit = limit.max(0.0);
        self.target = self.target.clamp(0.0, self.limit);
        self.current = self.current.clamp(0.0, self.limit);
    }

    /// Adopt the native offset when no animation is running
    pub fn sync(&mut self, native: f32) {
        if !self.is_animating() {
            let native = native.clamp(0.0, self.limit);
            self.current = native;
            self.target = native;
        }
    }

    /// Feed a wheel event
    pub fn on_wheel(&mut self, delta: f32, unit: WheelUnit, viewport_height: f32) {
        let pixels = match unit {
            WheelUnit::Pixel => delta,
            WheelUnit::Line => delta * LINE_HEIGHT,
            WheelUnit::Page => delta * viewport_height,
        };
        self.target = (self.target + pixels * self.wheel_multiplier).clamp(0.0, self.limit);
    }

    /// Ease one frame. Returns the offset to apply, or `None` when idle.
    pub fn advance(&mut self) -> Option<f32> {
        if !self.is_animating() {
            return None;
        }
        self.current += (self.target - self.current) * self.lerp;
        if (self.target - self.current).abs() < self.snap {
            self.current = self.target;
        }
        Some(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scroller() -> SmoothScroll {
        let mut s = SmoothScroll::default();
        s.set_limit(2000.0);
        s
    }

    #[test]
    fn test_wheel_eases_toward_target_and_settles() {
        let mut s = scroller();
        s.on_wheel(100.0, WheelUnit::Pixel, 800.0);
        assert_eq!(s.target(), 100.0);

        let first = s.advance().unwrap();
        assert!((first - 10.0).abs() < 1e-4);

        let mut frames = 1;
        while s.advance().is_some() {
            frames += 1;
            assert!(frames < 200);
        }
        assert_eq!(s.current(), 100.0);
        assert!(!s.is_animating());
    }

    #[test]
    fn test_target_clamped_to_document() {
        let mut s = scroller();
        s.on_wheel(-50.0, WheelUnit::Pixel, 800.0);
        assert_eq!(s.target(), 0.0);
        assert_eq!(s.advance(), None);

        s.on_wheel(10.0, WheelUnit::Page, 800.0);
        assert_eq!(s.target(), 2000.0);

        s.set_limit(500.0);
        assert_eq!(s.target(), 500.0);
    }

    #[test]
    fn test_line_deltas_scale() {
        let mut s = scroller();
        s.on_wheel(3.0, WheelUnit::Line, 800.0);
        assert_eq!(s.target(), 48.0);
        assert_eq!(WheelUnit::from_delta_mode(1), WheelUnit::Line);
        assert_eq!(WheelUnit::from_delta_mode(7), WheelUnit::Pixel);
    }

    #[test]
    fn test_sync_only_when_idle() {
        let mut s = scroller();
        s.sync(300.0);
        assert_eq!(s.current(), 300.0);
        assert_eq!(s.target(), 300.0);

        s.on_wheel(100.0, WheelUnit::Pixel, 800.0);
        s.sync(0.0);
        assert_eq!(s.target(), 400.0);
        assert_eq!(s.current(), 300.0);
    }
}
