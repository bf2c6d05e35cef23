use feed::Severity;
use stripmon_core::blocklist::{BlockList, Sample};
use stripmon_core::interval::Interval;
use stripmon_core::ticks;

use crate::alarm::{sanitize, AlarmLevels};
use crate::formatting::{format_axis_value, format_readout, format_time_offset};
use crate::scene::{palette, Align, Color, Scene};

const TICK_LABEL_HEIGHT: f32 = 0.09;
const READOUT_HEIGHT: f32 = 0.6;

/// Latest-value display in the plot's upper corner, colored by severity.
pub struct ValueReadout {
    value: Option<f64>,
    precision: usize,
    color: Color,
}

impl ValueReadout {
    fn new() -> Self {
        Self {
            value: None,
            precision: 2,
            color: palette::TEXT,
        }
    }

    pub fn text(&self) -> String {
        match self.value {
            Some(v) => format_readout(v, self.precision),
            None => "--".to_string(),
        }
    }

    fn draw(&self, scene: &mut Scene) {
        scene.text([0.0, 0.0], READOUT_HEIGHT, &self.text(), self.color, Align::Left);
    }
}

struct TickLabel {
    pos: [f32; 2],
    text: String,
    align: Align,
}

/// The strip-chart widget: rolling buffer, tick layout, alarm lines and
/// value readout in one normalized [-1, 1]² plot area.
pub struct Graph {
    blocklist: BlockList,
    minor_alarm: AlarmLevels,
    major_alarm: AlarmLevels,
    readout: ValueReadout,
    tick_lines: Vec<[[f32; 2]; 2]>,
    tick_labels: Vec<TickLabel>,
    x_pixels: f64,
    y_pixels: f64,
    host_width: f64,
    host_height: f64,
}

impl Graph {
    pub fn new(back_length: f64) -> Self {
        Self {
            blocklist: BlockList::new(back_length),
            minor_alarm: AlarmLevels::new(palette::MINOR_ALARM),
            major_alarm: AlarmLevels::new(palette::MAJOR_ALARM),
            readout: ValueReadout::new(),
            tick_lines: Vec::new(),
            tick_labels: Vec::new(),
            x_pixels: 0.0,
            y_pixels: 0.0,
            host_width: 0.0,
            host_height: 0.0,
        }
    }

    /// Data x offset to normalized plot space: [-backlength, 0] -> [-1, 1].
    pub fn x_global(&self, x: f64) -> f64 {
        1.0 + 2.0 * x / self.blocklist.x_range().length()
    }

    /// Data y to normalized plot space; non-finite for a degenerate range,
    /// callers filter.
    pub fn y_global(&self, y: f64) -> f64 {
        let range = self.blocklist.y_range();
        2.0 * (y - range.center()) / range.length()
    }

    pub fn blocklist(&self) -> &BlockList {
        &self.blocklist
    }

    pub fn readout(&self) -> &ValueReadout {
        &self.readout
    }

    pub fn set_now(&mut self, now: f64) {
        self.blocklist.set_now(now);
    }

    pub fn add(&mut self, sample: Sample) {
        self.blocklist.add(sample);
        self.readout.value = Some(sample.y);
    }

    pub fn new_block(&mut self) {
        self.blocklist.new_block();
    }

    pub fn set_track_latest(&mut self, on: bool) {
        self.blocklist.set_track_latest(on);
    }

    pub fn set_back_length(&mut self, len: f64) {
        self.blocklist.set_back_length(len);
        self.update_ticks();
    }

    pub fn back_length(&self) -> f64 {
        self.blocklist.back_length()
    }

    /// Record the widget's pixel share and the host extent; both feed the
    /// tick density. Called by the owner after every layout change.
    pub fn set_extents(&mut self, x_pixels: f64, y_pixels: f64, host_width: f64, host_height: f64) {
        self.x_pixels = x_pixels;
        self.y_pixels = y_pixels;
        self.host_width = host_width;
        self.host_height = host_height;
        self.refresh();
    }

    pub fn set_y_range(&mut self, range: Interval) {
        self.blocklist.set_y_range(range);
        self.refresh();
    }

    pub fn set_auto_range(&mut self, on: bool) {
        self.blocklist.set_auto_range(on);
        self.refresh();
    }

    /// With auto-range on, the Y extent moves with the data, so ticks and
    /// pre-mapped alarm positions are rebuilt once per frame.
    pub fn refresh_auto_range(&mut self) {
        if self.blocklist.auto_range() {
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        self.update_ticks();
        self.remap_alarms();
    }

    pub fn set_minor_alarms(&mut self, levels: Interval) {
        let levels = sanitize(levels);
        let draw = Interval::new(self.y_global(levels.min), self.y_global(levels.max));
        self.minor_alarm.set_levels(levels, draw);
    }

    pub fn set_major_alarms(&mut self, levels: Interval) {
        let levels = sanitize(levels);
        let draw = Interval::new(self.y_global(levels.min), self.y_global(levels.max));
        self.major_alarm.set_levels(levels, draw);
    }

    pub fn minor_alarms(&self) -> Interval {
        self.minor_alarm.levels()
    }

    pub fn major_alarms(&self) -> Interval {
        self.major_alarm.levels()
    }

    pub fn set_precision(&mut self, precision: usize) {
        self.readout.precision = precision;
    }

    pub fn set_severity(&mut self, severity: Severity) {
        self.readout.color = match severity {
            Severity::None => palette::TEXT,
            Severity::Minor => palette::MINOR_ALARM,
            Severity::Major => palette::MAJOR_ALARM,
            Severity::Invalid => palette::INVALID_ALARM,
        };
    }

    /// Alarm draw positions are stored pre-mapped; recompute them from the
    /// current Y range.
    fn remap_alarms(&mut self) {
        let minor = self.minor_alarm.levels();
        let draw = Interval::new(self.y_global(minor.min), self.y_global(minor.max));
        self.minor_alarm.set_levels(minor, draw);

        let major = self.major_alarm.levels();
        let draw = Interval::new(self.y_global(major.min), self.y_global(major.max));
        self.major_alarm.set_levels(major, draw);
    }

    /// Rebuild tick lines and labels from scratch; never patched in place.
    pub fn update_ticks(&mut self) {
        self.tick_lines.clear();
        self.tick_labels.clear();

        let xlen = self.blocklist.x_range().length();
        for x in ticks::x_ticks(xlen, self.x_pixels, self.host_width) {
            let gx = self.x_global(x) as f32;
            if !gx.is_finite() {
                continue;
            }
            self.tick_lines.push([[gx, 1.0], [gx, -1.0]]);
            self.tick_labels.push(TickLabel {
                pos: [gx, -1.12],
                text: format_time_offset(x),
                align: Align::Center,
            });
        }

        let yrange = self.blocklist.y_range();
        for y in ticks::y_ticks(yrange, self.y_pixels, self.host_height) {
            let gy = self.y_global(y) as f32;
            if !gy.is_finite() {
                continue;
            }
            self.tick_lines.push([[-1.0, gy], [1.0, gy]]);
            self.tick_labels.push(TickLabel {
                pos: [1.05, gy],
                text: format_axis_value(y),
                align: Align::Left,
            });
        }
    }

    pub fn tick_count(&self) -> usize {
        self.tick_lines.len()
    }

    /// Two-pass masked draw: the plot-area quad first defines the clip
    /// shape, then everything inside the window scrolls without bleeding
    /// past the widget bounds.
    pub fn draw(&self, scene: &mut Scene) {
        scene.push();
        scene.scale(0.8, 0.8);

        scene.mask_begin();
        scene.quad(
            [-1.0, -1.0],
            [1.0, 1.0],
            Some(palette::PLOT_BACKGROUND),
            Some(palette::PLOT_BORDER),
        );
        scene.mask_apply();
        scene.quad(
            [-1.0, -1.0],
            [1.0, 1.0],
            Some(palette::PLOT_BACKGROUND),
            Some(palette::PLOT_BORDER),
        );

        for strip in self.blocklist.strips() {
            let points: Vec<[f32; 2]> = strip
                .iter()
                .map(|&[x, y]| [self.x_global(x) as f32, self.y_global(y) as f32])
                .filter(|p| p[0].is_finite() && p[1].is_finite())
                .collect();
            scene.strip(&points, palette::DATA_LINE);
        }
        scene.mask_off();

        scene.line_segments(&self.tick_lines, palette::TICKS);
        for label in &self.tick_labels {
            scene.text(
                label.pos,
                TICK_LABEL_HEIGHT,
                &label.text,
                palette::TICK_LABELS,
                label.align,
            );
        }

        scene.push();
        scene.translate(-0.7, 0.85);
        scene.scale(0.5, 0.3);
        self.readout.draw(scene);
        scene.pop();

        self.minor_alarm.draw(scene);
        self.major_alarm.draw(scene);

        scene.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::Graph;
    use crate::scene::{Scene, SceneOp};
    use feed::Severity;
    use stripmon_core::blocklist::Sample;
    use stripmon_core::interval::Interval;

    fn graph_with_range(min: f64, max: f64) -> Graph {
        let mut graph = Graph::new(60.0);
        graph.set_auto_range(false);
        graph.set_y_range(Interval::new(min, max));
        graph
    }

    #[test]
    fn x_mapping_spans_minus_one_to_one() {
        let graph = Graph::new(60.0);
        assert!((graph.x_global(0.0) - 1.0).abs() < 1e-9);
        assert!((graph.x_global(-60.0) + 1.0).abs() < 1e-9);
        assert!((graph.x_global(-30.0)).abs() < 1e-9);
    }

    #[test]
    fn y_mapping_centers_the_range() {
        let graph = graph_with_range(-10.0, 30.0);
        assert!((graph.y_global(10.0)).abs() < 1e-9);
        assert!((graph.y_global(30.0) - 1.0).abs() < 1e-9);
        assert!((graph.y_global(-10.0) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn alarm_draw_positions_follow_y_range_changes() {
        let mut graph = graph_with_range(0.0, 10.0);
        graph.set_major_alarms(Interval::new(2.0, 8.0));
        let mut scene = Scene::new();
        graph.draw(&mut scene);
        let before = major_alarm_ys(&scene);
        assert!((before[0] - (-0.6)).abs() < 1e-6);
        assert!((before[1] - 0.6).abs() < 1e-6);

        // widen the range; pre-mapped positions must move inward
        graph.set_y_range(Interval::new(-10.0, 30.0));
        let mut scene = Scene::new();
        graph.draw(&mut scene);
        let after = major_alarm_ys(&scene);
        assert!((after[0] - (-0.4)).abs() < 1e-6);
        assert!((after[1] - (-0.1)).abs() < 1e-6);
    }

    // The last Lines op of a graph draw is the major alarm pair.
    fn major_alarm_ys(scene: &Scene) -> Vec<f32> {
        let lines: Vec<_> = scene
            .ops()
            .iter()
            .filter_map(|op| match op {
                SceneOp::Lines { segments, .. } => Some(segments.clone()),
                _ => None,
            })
            .collect();
        let alarm = lines.last().unwrap();
        // undo the widget's 0.8 content scale
        alarm.iter().map(|seg| seg[0][1] / 0.8).collect()
    }

    #[test]
    fn nan_alarm_limits_draw_at_zero_line() {
        let mut graph = graph_with_range(-10.0, 10.0);
        graph.set_major_alarms(Interval::new(f64::NAN, 5.0));
        assert_eq!(graph.major_alarms(), Interval::new(0.0, 5.0));
        let mut scene = Scene::new();
        graph.draw(&mut scene); // must not panic
        assert!(!scene.ops().is_empty());
    }

    #[test]
    fn draw_separates_blocks_into_distinct_strips() {
        let mut graph = graph_with_range(0.0, 10.0);
        graph.set_now(0.0);
        graph.add(Sample { t: 0.0, y: 1.0 });
        graph.add(Sample { t: 1.0, y: 2.0 });
        graph.new_block();
        graph.add(Sample { t: 2.0, y: 3.0 });
        graph.add(Sample { t: 3.0, y: 4.0 });
        graph.set_now(3.0);

        let mut scene = Scene::new();
        graph.draw(&mut scene);
        let strips = scene
            .ops()
            .iter()
            .filter(|op| matches!(op, SceneOp::Strip { .. }))
            .count();
        assert_eq!(strips, 2);
    }

    #[test]
    fn degenerate_range_draws_no_data_or_y_ticks() {
        let mut graph = Graph::new(60.0);
        graph.set_extents(400.0, 300.0, 800.0, 600.0);
        graph.set_now(0.0);
        graph.add(Sample { t: 0.0, y: 5.0 }); // auto range collapses to (5,5)
        let mut scene = Scene::new();
        graph.draw(&mut scene); // must not panic
        assert_eq!(
            scene
                .ops()
                .iter()
                .filter(|op| matches!(op, SceneOp::Strip { .. }))
                .count(),
            0
        );
    }

    #[test]
    fn ticks_rebuild_when_extents_change() {
        let mut graph = graph_with_range(0.0, 10.0);
        graph.set_extents(800.0, 600.0, 800.0, 600.0);
        let full = graph.tick_count();
        assert!(full > 0);
        graph.set_extents(200.0, 600.0, 800.0, 600.0);
        assert!(graph.tick_count() < full);
    }

    #[test]
    fn readout_tracks_latest_value_and_precision() {
        let mut graph = graph_with_range(0.0, 10.0);
        assert_eq!(graph.readout().text(), "--");
        graph.set_now(0.0);
        graph.add(Sample { t: 0.0, y: 1.23456 });
        graph.set_precision(3);
        assert_eq!(graph.readout().text(), "1.235");
        graph.set_severity(Severity::Major);
    }
}
