pub mod blocklist;
pub mod interval;
pub mod settings;
pub mod ticks;

pub use blocklist::{BlockList, Sample};
pub use interval::Interval;
pub use settings::MonitorSettings;
