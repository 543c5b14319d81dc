//! Mouse and touch input mapped onto a [`PointerRecord`].
//!
//! Positions are surface pixels, y-down. While the pointer is down each
//! update overwrites the deltas with the scaled displacement from the
//! previous recorded position; the y delta is negated into y-up space.

use sim2d::constants::POINTER_FORCE;
use sim2d::PointerRecord;
use winit::event::TouchPhase;

#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
    record: PointerRecord,
    /// Latest cursor position, tracked even while released
    cursor: (f32, f32),
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) -> &PointerRecord {
        &self.record
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) {
        self.cursor = (x, y);
        if self.record.is_down {
            self.update(x, y);
        }
    }

    /// Press at the current cursor. The delta is taken from the last
    /// recorded position, which may be from an earlier drag.
    pub fn pressed(&mut self) {
        self.record.is_down = true;
        let (x, y) = self.cursor;
        self.update(x, y);
    }

    pub fn released(&mut self) {
        self.record.is_down = false;
    }

    pub fn touch(&mut self, phase: TouchPhase, x: f32, y: f32) {
        match phase {
            TouchPhase::Started => {
                self.cursor = (x, y);
                self.pressed();
            }
            TouchPhase::Moved => self.cursor_moved(x, y),
            TouchPhase::Ended | TouchPhase::Cancelled => self.released(),
        }
    }

    /// Snapshot for this frame; the deltas are consumed.
    pub fn take_frame(&mut self) -> PointerRecord {
        let snapshot = self.record;
        self.record.dx = 0.0;
        self.record.dy = 0.0;
        snapshot
    }

    fn update(&mut self, x: f32, y: f32) {
        if self.record.is_down {
            self.record.dx = (x - self.record.x) * POINTER_FORCE;
            self.record.dy = (y - self.record.y) * -POINTER_FORCE;
        }
        self.record.x = x;
        self.record.y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_while_released_is_ignored() {
        let mut tracker = PointerTracker::new();
        tracker.cursor_moved(100.0, 50.0);
        let frame = tracker.take_frame();
        assert!(!frame.is_down);
        assert_eq!((frame.x, frame.y), (0.0, 0.0));
        assert_eq!((frame.dx, frame.dy), (0.0, 0.0));
    }

    #[test]
    fn test_drag_scales_and_flips_delta() {
        let mut tracker = PointerTracker::new();
        tracker.cursor_moved(100.0, 100.0);
        tracker.pressed();
        tracker.take_frame();

        tracker.cursor_moved(110.0, 96.0);
        let frame = tracker.take_frame();
        assert!(frame.is_down);
        assert_eq!((frame.x, frame.y), (110.0, 96.0));
        assert_eq!(frame.dx, 50.0);
        assert_eq!(frame.dy, 20.0);
    }

    #[test]
    fn test_take_frame_clears_deltas_only() {
        let mut tracker = PointerTracker::new();
        tracker.pressed();
        tracker.cursor_moved(4.0, 0.0);
        assert_eq!(tracker.take_frame().dx, 20.0);

        let idle = tracker.take_frame();
        assert!(idle.is_down);
        assert_eq!(idle.x, 4.0);
        assert_eq!((idle.dx, idle.dy), (0.0, 0.0));
    }

    #[test]
    fn test_later_move_overwrites_delta() {
        let mut tracker = PointerTracker::new();
        tracker.pressed();
        tracker.cursor_moved(10.0, 0.0);
        tracker.cursor_moved(12.0, 0.0);
        assert_eq!(tracker.take_frame().dx, 10.0);
    }

    #[test]
    fn test_press_uses_last_recorded_position() {
        let mut tracker = PointerTracker::new();
        tracker.pressed();
        tracker.cursor_moved(10.0, 10.0);
        tracker.released();
        tracker.take_frame();

        // Moves while released do not update the record
        tracker.cursor_moved(30.0, 10.0);
        tracker.pressed();
        let frame = tracker.take_frame();
        assert_eq!(frame.x, 30.0);
        assert_eq!(frame.dx, 100.0);
    }

    #[test]
    fn test_release_stops_splats() {
        let mut tracker = PointerTracker::new();
        tracker.pressed();
        tracker.cursor_moved(8.0, 8.0);
        tracker.released();
        let frame = tracker.take_frame();
        assert!(!frame.is_down);
        let surface = sim2d::SurfaceSize::new(100, 100);
        let style = sim2d::FluidConfig::default().pointer;
        assert!(frame.splat(surface, &style).is_none());
    }

    #[test]
    fn test_touch_phases() {
        let mut tracker = PointerTracker::new();
        tracker.touch(TouchPhase::Started, 20.0, 20.0);
        assert!(tracker.record().is_down);
        assert_eq!(tracker.record().x, 20.0);

        tracker.touch(TouchPhase::Moved, 22.0, 18.0);
        let frame = tracker.take_frame();
        assert_eq!(frame.dx, 10.0);
        assert_eq!(frame.dy, 10.0);

        tracker.touch(TouchPhase::Cancelled, 0.0, 0.0);
        assert!(!tracker.record().is_down);
    }
}
