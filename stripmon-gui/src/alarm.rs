use stripmon_core::Interval;

use crate::scene::{Color, Scene};

/// Two horizontal threshold lines spanning the plot width.
///
/// Levels are kept in data space with non-finite bounds clamped to 0 (an
/// unconfigured limit draws at the zero line rather than disappearing), and
/// in pre-mapped normalized draw space. The owner re-maps the draw positions
/// whenever its Y range changes.
pub struct AlarmLevels {
    levels: Interval,
    draw_levels: Interval,
    lines: Vec<[[f32; 2]; 2]>,
    color: Color,
}

impl AlarmLevels {
    pub fn new(color: Color) -> Self {
        Self {
            levels: Interval::new(0.0, 0.0),
            draw_levels: Interval::new(0.0, 0.0),
            lines: Vec::new(),
            color,
        }
    }

    pub fn levels(&self) -> Interval {
        self.levels
    }

    pub fn set_levels(&mut self, levels: Interval, draw: Interval) {
        self.levels = sanitize(levels);
        self.draw_levels = draw;
        self.update();
    }

    fn update(&mut self) {
        self.lines.clear();
        for y in [self.draw_levels.min, self.draw_levels.max] {
            let y = y as f32;
            if !y.is_finite() {
                continue;
            }
            self.lines.push([[-1.0, y], [1.0, y]]);
        }
    }

    pub fn draw(&self, scene: &mut Scene) {
        scene.line_segments(&self.lines, self.color);
    }
}

/// Non-finite bounds clamp to the zero line.
pub fn sanitize(mut levels: Interval) -> Interval {
    if !levels.min.is_finite() {
        levels.min = 0.0;
    }
    if !levels.max.is_finite() {
        levels.max = 0.0;
    }
    levels
}
