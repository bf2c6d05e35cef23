use std::sync::Arc;

use feed::{ChannelEvent, ChannelProperties, Feed, Subscription};
use stripmon_core::blocklist::Sample;
use stripmon_core::interval::Interval;

use crate::graph::Graph;
use crate::scene::{palette, Align, Scene};
use crate::text::{ImageSource, Texture};

const TITLE_HEIGHT: f32 = 0.12;
const DISCONNECTED_HEIGHT: f32 = 0.2;

/// A titled, bordered, independently scaled tile bound to one channel.
pub struct Window {
    name: String,
    title: String,
    x_scale: f32,
    y_scale: f32,
    x_pixels: f64,
    y_pixels: f64,
    kind: WindowKind,
}

pub enum WindowKind {
    Plot(PlotWindow),
    Image(ImageWindow),
}

pub struct PlotWindow {
    graph: Graph,
    subscription: Option<Subscription>,
    connected: bool,
    last_props: ChannelProperties,
}

pub struct ImageWindow {
    texture: Option<Arc<Texture>>,
}

impl Window {
    pub fn plot(channel: &str, back_length: f64) -> Self {
        Self {
            name: channel.to_string(),
            title: channel.to_string(),
            x_scale: 1.0,
            y_scale: 1.0,
            x_pixels: 0.0,
            y_pixels: 0.0,
            kind: WindowKind::Plot(PlotWindow {
                graph: Graph::new(back_length),
                subscription: None,
                connected: false,
                last_props: ChannelProperties::default(),
            }),
        }
    }

    pub fn image(channel: &str) -> Self {
        Self {
            name: channel.to_string(),
            title: channel.to_string(),
            x_scale: 1.0,
            y_scale: 1.0,
            x_pixels: 0.0,
            y_pixels: 0.0,
            kind: WindowKind::Image(ImageWindow { texture: None }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_plot(&self) -> bool {
        matches!(self.kind, WindowKind::Plot(_))
    }

    /// Extra user scale applied inside the assigned cell.
    pub fn scale(&self) -> (f32, f32) {
        (self.x_scale, self.y_scale)
    }

    pub fn set_scale(&mut self, x_scale: f32, y_scale: f32) {
        self.x_scale = x_scale;
        self.y_scale = y_scale;
    }

    pub fn x_pixels(&self) -> f64 {
        self.x_pixels
    }

    pub fn y_pixels(&self) -> f64 {
        self.y_pixels
    }

    pub fn set_pixel_size(&mut self, x_pixels: f64, y_pixels: f64) {
        self.x_pixels = x_pixels;
        self.y_pixels = y_pixels;
    }

    pub fn graph(&self) -> Option<&Graph> {
        match &self.kind {
            WindowKind::Plot(plot) => Some(&plot.graph),
            WindowKind::Image(_) => None,
        }
    }

    /// Bind to the collaborators. Fails on an empty channel name, an
    /// already-taken channel, or an image that cannot be fetched; the
    /// caller discards the window on failure.
    pub fn init(&mut self, feed: &dyn Feed, images: &dyn ImageSource) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("A channel name is required.".to_string());
        }
        match &mut self.kind {
            WindowKind::Plot(plot) => {
                plot.subscription = Some(feed.subscribe(&self.name).map_err(|e| e.to_string())?);
                Ok(())
            }
            WindowKind::Image(image) => {
                image.texture = Some(Arc::new(images.fetch(&self.name)?));
                Ok(())
            }
        }
    }

    /// Recompute layout-dependent state after tiling changed.
    pub fn update(&mut self, host_width: f64, host_height: f64) {
        if let WindowKind::Plot(plot) = &mut self.kind {
            plot.graph
                .set_extents(self.x_pixels, self.y_pixels, host_width, host_height);
        }
    }

    pub fn set_back_length(&mut self, seconds: f64) -> Result<(), String> {
        match &mut self.kind {
            WindowKind::Plot(plot) => {
                plot.graph.set_back_length(seconds);
                Ok(())
            }
            WindowKind::Image(_) => Err(format!("'{}' is not a plot window.", self.name)),
        }
    }

    /// Advance the clock and apply every queued feed event. Runs inside the
    /// frame pass, under the global lock.
    pub fn update_frame(&mut self, now: f64) {
        let name = self.name.clone();
        if let WindowKind::Plot(plot) = &mut self.kind {
            plot.graph.set_now(now);
            while let Some(event) = plot.subscription.as_ref().and_then(|s| s.try_recv()) {
                match event {
                    ChannelEvent::Connected => {
                        plot.connected = true;
                        plot.graph.set_track_latest(true);
                    }
                    ChannelEvent::Disconnected => {
                        // start a new block so the gap stays visible
                        if plot.connected {
                            plot.graph.new_block();
                        }
                        plot.connected = false;
                        plot.graph.set_track_latest(false);
                    }
                    ChannelEvent::Value { t, y } => {
                        plot.graph.add(Sample { t, y });
                    }
                    ChannelEvent::Properties(props) => {
                        if let Some(title) = plot.apply_properties(&name, props) {
                            self.title = title;
                        }
                    }
                }
            }
            plot.graph.refresh_auto_range();
        }
    }

    pub fn connected(&self) -> bool {
        match &self.kind {
            WindowKind::Plot(plot) => plot.connected,
            WindowKind::Image(_) => true,
        }
    }

    pub fn draw(&self, scene: &mut Scene) {
        scene.push();
        scene.scale(self.x_scale, self.y_scale);

        scene.quad(
            [-1.0, -1.0],
            [1.0, 1.0],
            Some(palette::BACKGROUND),
            Some(palette::WINDOW_BORDER),
        );

        match &self.kind {
            WindowKind::Plot(plot) => {
                plot.graph.draw(scene);
                if !plot.connected {
                    scene.text(
                        [0.0, 0.0],
                        DISCONNECTED_HEIGHT,
                        "Disconnected",
                        palette::DISCONNECTED,
                        Align::Center,
                    );
                }
            }
            WindowKind::Image(image) => {
                if let Some(texture) = &image.texture {
                    scene.push();
                    let cell_aspect = if self.y_pixels > 0.0 {
                        (self.x_pixels / self.y_pixels) as f32
                    } else {
                        1.0
                    };
                    let total = texture.aspect() / cell_aspect;
                    if total >= 1.0 {
                        scene.scale(0.9, 0.9 / total);
                    } else {
                        scene.scale(0.9 * total, 0.9);
                    }
                    scene.textured_unit_quad(Arc::clone(texture), palette::TEXT);
                    scene.pop();
                }
            }
        }

        scene.text(
            [0.0, 0.88],
            TITLE_HEIGHT,
            &self.title,
            palette::TEXT,
            Align::Center,
        );

        scene.pop();
    }
}

impl PlotWindow {
    /// Diff incoming properties against the last-known snapshot and apply
    /// only the fields that changed. Returns a new window title when the
    /// units changed.
    fn apply_properties(&mut self, name: &str, props: ChannelProperties) -> Option<String> {
        let delta = props.diff(&self.last_props);

        if delta.alarm_limits {
            self.graph.set_major_alarms(Interval::new(
                props.lower_alarm_limit,
                props.upper_alarm_limit,
            ));
        }
        if delta.warning_limits {
            self.graph.set_minor_alarms(Interval::new(
                props.lower_warning_limit,
                props.upper_warning_limit,
            ));
        }
        if delta.severity {
            self.graph.set_severity(props.severity);
        }
        if delta.display_limits {
            let range = Interval::new(props.lower_display_limit, props.upper_display_limit);
            // an empty display interval means the channel has no opinion
            if range.length() == 0.0 {
                self.graph.set_auto_range(true);
            } else {
                self.graph.set_auto_range(false);
                self.graph.set_y_range(range);
            }
        }
        if delta.precision && props.precision > 0 {
            self.graph.set_precision(props.precision as usize);
        }
        let title = if delta.units {
            Some(if props.units.is_empty() {
                name.to_string()
            } else {
                format!("{name} / {}", props.units)
            })
        } else {
            None
        };

        self.last_props = props;
        title
    }
}
