use std::sync::{Arc, Mutex};
use std::time::Instant;

use feed::Feed;

use crate::manager::WindowManager;
use crate::text::ImageSource;
use crate::window::Window;

/// Everything the frame pass and the command handlers share: the window
/// manager plus the collaborators new windows bind to. Always used behind
/// one mutex so event application and drawing are strictly serialized.
pub struct Monitor {
    pub manager: WindowManager,
    feed: Arc<dyn Feed>,
    images: Arc<dyn ImageSource>,
    default_back_length: f64,
    epoch: Instant,
}

pub type SharedMonitor = Arc<Mutex<Monitor>>;

impl Monitor {
    /// `epoch` must be the same instant the feed producers time-stamp
    /// against, otherwise samples land outside the visible window.
    pub fn new(
        manager: WindowManager,
        feed: Arc<dyn Feed>,
        images: Arc<dyn ImageSource>,
        default_back_length: f64,
        epoch: Instant,
    ) -> Self {
        Self {
            manager,
            feed,
            images,
            default_back_length,
            epoch,
        }
    }

    pub fn into_shared(self) -> SharedMonitor {
        Arc::new(Mutex::new(self))
    }

    /// Seconds since the shared epoch.
    pub fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    pub fn add_plot_window(&mut self, channel: &str) -> Result<(), String> {
        let window = Window::plot(channel, self.default_back_length);
        self.manager
            .add_window(window, self.feed.as_ref(), self.images.as_ref())
    }

    pub fn add_image_window(&mut self, channel: &str) -> Result<(), String> {
        let window = Window::image(channel);
        self.manager
            .add_window(window, self.feed.as_ref(), self.images.as_ref())
    }

    /// One frame's worth of event application.
    pub fn tick(&mut self) {
        let now = self.now();
        self.manager.update_frame(now);
    }
}
