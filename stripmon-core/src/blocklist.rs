use std::collections::VecDeque;

use crate::interval::Interval;

/// One sample: absolute feed time and value. The drawable x offset is
/// `t - now`, so advancing `now` scrolls the window without touching stored
/// samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub t: f64,
    pub y: f64,
}

type Block = VecDeque<Sample>;

/// Rolling time-series store for one channel.
///
/// Samples live in blocks; a new block starts on every reconnect so that
/// line drawing never bridges a disconnect gap. Samples older than the
/// back-length window are trimmed lazily on each mutating call.
pub struct BlockList {
    blocks: VecDeque<Block>,
    back_length: f64,
    now: f64,
    y_range: Interval,
    auto_range: bool,
    track_latest: bool,
}

impl BlockList {
    pub fn new(back_length: f64) -> Self {
        let mut blocks = VecDeque::new();
        blocks.push_back(Block::new());
        Self {
            blocks,
            back_length,
            now: 0.0,
            y_range: Interval::new(0.0, 0.0),
            auto_range: true,
            track_latest: false,
        }
    }

    pub fn back_length(&self) -> f64 {
        self.back_length
    }

    /// Change the visible window length. Samples already outside the new
    /// window stay until the next mutating call trims them.
    pub fn set_back_length(&mut self, len: f64) {
        self.back_length = len;
    }

    /// Advance the time origin; x offsets are interpreted against it.
    pub fn set_now(&mut self, now: f64) {
        self.now = now;
        self.trim();
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Append a sample to the open block. A sample whose offset is already
    /// older than the window is dropped silently.
    pub fn add(&mut self, sample: Sample) {
        if sample.t < self.now - self.back_length {
            return;
        }
        // new() guarantees at least one block
        self.blocks.back_mut().unwrap().push_back(sample);
        self.trim();
    }

    /// Close the current block and open a fresh one. Called on a
    /// disconnect/reconnect transition so the gap stays visible.
    pub fn new_block(&mut self) {
        if !self.blocks.back().map(Block::is_empty).unwrap_or(true) {
            self.blocks.push_back(Block::new());
        }
        self.trim();
    }

    pub fn set_y_range(&mut self, range: Interval) {
        self.y_range = range;
    }

    pub fn set_auto_range(&mut self, on: bool) {
        self.auto_range = on;
    }

    pub fn auto_range(&self) -> bool {
        self.auto_range
    }

    /// While set, the draw pass extends the newest sample to x = 0.
    pub fn set_track_latest(&mut self, on: bool) {
        self.track_latest = on;
    }

    pub fn x_range(&self) -> Interval {
        Interval::new(-self.back_length, 0.0)
    }

    /// Explicit range, or the min/max of in-window values when auto-ranging.
    /// With no samples in the window the result is degenerate (0, 0).
    pub fn y_range(&self) -> Interval {
        if !self.auto_range {
            return self.y_range;
        }
        let cutoff = self.now - self.back_length;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for sample in self.blocks.iter().flatten() {
            if sample.t < cutoff {
                continue;
            }
            min = min.min(sample.y);
            max = max.max(sample.y);
        }
        if min.is_infinite() || max.is_infinite() {
            Interval::new(0.0, 0.0)
        } else {
            Interval::new(min, max)
        }
    }

    pub fn sample_count(&self) -> usize {
        self.blocks.iter().map(Block::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count() == 0
    }

    pub fn latest(&self) -> Option<Sample> {
        self.blocks
            .iter()
            .rev()
            .find_map(|block| block.back().copied())
    }

    /// Per-block polylines in (x offset, y) form, oldest block first.
    /// Strips are never joined across blocks; with track-latest on, the
    /// newest strip gains a point at x = 0 holding the last value.
    pub fn strips(&self) -> Vec<Vec<[f64; 2]>> {
        let mut strips: Vec<Vec<[f64; 2]>> = self
            .blocks
            .iter()
            .filter(|block| !block.is_empty())
            .map(|block| {
                block
                    .iter()
                    .map(|sample| [sample.t - self.now, sample.y])
                    .collect()
            })
            .collect();
        if self.track_latest {
            if let Some(last) = strips.last_mut() {
                if let Some(&[x, y]) = last.last() {
                    if x < 0.0 {
                        last.push([0.0, y]);
                    }
                }
            }
        }
        strips
    }

    /// Offsets of all retained samples, for invariant checks.
    pub fn offsets(&self) -> Vec<f64> {
        self.blocks
            .iter()
            .flatten()
            .map(|sample| sample.t - self.now)
            .collect()
    }

    fn trim(&mut self) {
        let cutoff = self.now - self.back_length;
        for block in &mut self.blocks {
            while block.front().map(|s| s.t < cutoff).unwrap_or(false) {
                block.pop_front();
            }
        }
        while self.blocks.len() > 1 && self.blocks.front().map(Block::is_empty).unwrap_or(false) {
            self.blocks.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BlockList, Sample};
    use crate::interval::Interval;

    fn filled(back: f64, times: &[f64]) -> BlockList {
        let mut list = BlockList::new(back);
        for &t in times {
            list.set_now(t);
            list.add(Sample { t, y: t * 2.0 });
        }
        list
    }

    #[test]
    fn retained_offsets_stay_inside_window() {
        let mut list = filled(10.0, &[0.0, 3.0, 6.0, 9.0, 12.0, 15.0]);
        list.set_now(15.0);
        for x in list.offsets() {
            assert!((-10.0..=0.0).contains(&x), "offset {x} escaped window");
        }
        assert_eq!(list.sample_count(), 4); // 6, 9, 12, 15
    }

    #[test]
    fn add_outside_window_is_a_silent_no_op() {
        let mut list = BlockList::new(5.0);
        list.set_now(100.0);
        list.add(Sample { t: 90.0, y: 1.0 });
        assert!(list.is_empty());
        // exactly on the edge is kept
        list.add(Sample { t: 95.0, y: 1.0 });
        assert_eq!(list.sample_count(), 1);
    }

    #[test]
    fn shrinking_back_length_trims_on_next_mutation() {
        let mut list = filled(100.0, &[0.0, 10.0, 20.0, 30.0]);
        list.set_back_length(15.0);
        // nothing trimmed yet
        assert_eq!(list.sample_count(), 4);
        list.set_now(30.0);
        assert_eq!(list.sample_count(), 2); // 20, 30
    }

    #[test]
    fn new_block_separates_strips() {
        let mut list = BlockList::new(100.0);
        list.set_now(0.0);
        list.add(Sample { t: 0.0, y: 1.0 });
        list.add(Sample { t: 1.0, y: 2.0 });
        list.new_block();
        list.add(Sample { t: 5.0, y: 3.0 });
        list.set_now(5.0);

        let strips = list.strips();
        assert_eq!(strips.len(), 2);
        assert_eq!(strips[0].len(), 2);
        assert_eq!(strips[1], vec![[0.0, 3.0]]);
    }

    #[test]
    fn repeated_new_block_does_not_stack_empties() {
        let mut list = BlockList::new(100.0);
        list.new_block();
        list.new_block();
        list.add(Sample { t: 0.0, y: 1.0 });
        assert_eq!(list.strips().len(), 1);
    }

    #[test]
    fn trimmed_out_block_disappears() {
        let mut list = BlockList::new(10.0);
        list.set_now(0.0);
        list.add(Sample { t: 0.0, y: 1.0 });
        list.new_block();
        list.set_now(5.0);
        list.add(Sample { t: 5.0, y: 2.0 });
        list.set_now(20.0);
        // both blocks aged out entirely
        assert!(list.is_empty());
        list.add(Sample { t: 20.0, y: 3.0 });
        assert_eq!(list.strips().len(), 1);
    }

    #[test]
    fn auto_y_range_follows_window_contents() {
        let mut list = BlockList::new(10.0);
        list.set_now(0.0);
        list.add(Sample { t: 0.0, y: -3.0 });
        list.add(Sample { t: 1.0, y: 7.0 });
        list.set_now(1.0);
        assert_eq!(list.y_range(), Interval::new(-3.0, 7.0));

        // age the minimum out of the window
        list.set_now(10.5);
        assert_eq!(list.y_range(), Interval::new(7.0, 7.0));
    }

    #[test]
    fn explicit_y_range_wins_over_auto() {
        let mut list = BlockList::new(10.0);
        list.add(Sample { t: 0.0, y: 100.0 });
        list.set_auto_range(false);
        list.set_y_range(Interval::new(-1.0, 1.0));
        assert_eq!(list.y_range(), Interval::new(-1.0, 1.0));
    }

    #[test]
    fn empty_auto_range_is_degenerate() {
        let list = BlockList::new(10.0);
        assert!(list.y_range().is_degenerate());
    }

    #[test]
    fn track_latest_extends_newest_strip_to_now() {
        let mut list = BlockList::new(10.0);
        list.set_now(4.0);
        list.add(Sample { t: 4.0, y: 2.0 });
        list.set_now(6.0);
        list.set_track_latest(true);
        let strips = list.strips();
        assert_eq!(strips[0], vec![[-2.0, 2.0], [0.0, 2.0]]);

        list.set_track_latest(false);
        assert_eq!(list.strips()[0], vec![[-2.0, 2.0]]);
    }
}
