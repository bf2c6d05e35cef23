use std::sync::Arc;

use feed::Feed;

use crate::scene::{palette, Align, Scene};
use crate::text::{ImageSource, TextRasterizer, Texture};
use crate::window::Window;

const PLACEHOLDER_HEIGHT: f32 = 0.12;

/// Owns the window set and the derived row layout, and draws every window
/// through its per-cell transform.
pub struct WindowManager {
    windows: Vec<Window>,
    rows: Vec<usize>,
    host_width: f64,
    host_height: f64,
    placeholder_message: String,
    placeholder: Option<Arc<Texture>>,
}

impl WindowManager {
    pub fn new(host_width: f64, host_height: f64, placeholder_message: &str) -> Self {
        Self {
            windows: Vec::new(),
            rows: Vec::new(),
            host_width,
            host_height,
            placeholder_message: placeholder_message.to_string(),
            placeholder: None,
        }
    }

    /// Pre-render the "no windows" message with the text service.
    pub fn rasterize_placeholder(&mut self, rasterizer: &dyn TextRasterizer) {
        self.placeholder = Some(Arc::new(rasterizer.rasterize(&self.placeholder_message)));
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn window(&self, index: usize) -> Option<&Window> {
        self.windows.get(index)
    }

    pub fn window_named(&self, name: &str) -> Option<&Window> {
        self.windows.iter().find(|w| w.name() == name)
    }

    pub fn window_names(&self) -> Vec<String> {
        self.windows.iter().map(|w| w.name().to_string()).collect()
    }

    pub fn set_host_size(&mut self, width: f64, height: f64) {
        if (width, height) != (self.host_width, self.host_height) {
            self.host_width = width;
            self.host_height = height;
            self.align_windows();
        }
    }

    /// Add a window: the name must be unique and init must succeed,
    /// otherwise the candidate is discarded and an error returned.
    pub fn add_window(
        &mut self,
        mut window: Window,
        feed: &dyn Feed,
        images: &dyn ImageSource,
    ) -> Result<(), String> {
        if self.windows.iter().any(|w| w.name() == window.name()) {
            return Err("Window already exists.".to_string());
        }
        match window.init(feed, images) {
            Ok(()) => {
                log::debug!("window '{}' added", window.name());
                self.windows.push(window);
                self.align_windows();
                Ok(())
            }
            Err(err) => Err(format!("Window could not be initialized: {err}")),
        }
    }

    /// Remove by position; returns the removed window so the caller can
    /// release anything registered under its name.
    pub fn remove_window(&mut self, index: usize) -> Result<Window, String> {
        if index >= self.windows.len() {
            return Err(format!("No window at index {index}."));
        }
        let window = self.windows.remove(index);
        self.align_windows();
        Ok(window)
    }

    pub fn remove_window_named(&mut self, name: &str) -> Result<Window, String> {
        match self.windows.iter().position(|w| w.name() == name) {
            Some(index) => self.remove_window(index),
            None => Err(format!("No window named '{name}'.")),
        }
    }

    pub fn remove_all(&mut self) -> Vec<Window> {
        let windows = std::mem::take(&mut self.windows);
        self.align_windows();
        windows
    }

    pub fn set_back_length(&mut self, name: &str, seconds: f64) -> Result<(), String> {
        match self.windows.iter_mut().find(|w| w.name() == name) {
            Some(window) => window.set_back_length(seconds),
            None => Err(format!("No window named '{name}'.")),
        }
    }

    /// Apply queued feed events and advance every window's clock. Runs
    /// under the global lock, strictly serialized with drawing.
    pub fn update_frame(&mut self, now: f64) {
        for window in &mut self.windows {
            window.update_frame(now);
        }
    }

    /// Recompute the row layout and push the new per-cell pixel sizes into
    /// every window.
    fn align_windows(&mut self) {
        self.rows = compute_rows(self.windows.len());

        let row_count = self.rows.len().max(1);
        let cell_height = self.host_height / row_count as f64;
        let mut index = 0;
        for &columns in &self.rows {
            let cell_width = self.host_width / columns as f64;
            for _ in 0..columns {
                self.windows[index].set_pixel_size(cell_width, cell_height);
                self.windows[index].update(self.host_width, self.host_height);
                index += 1;
            }
        }
    }

    pub fn draw(&self, scene: &mut Scene) {
        if self.windows.is_empty() {
            self.draw_placeholder(scene);
            return;
        }

        let dy = 2.0 / self.rows.len() as f32;
        let scale_y = 1.0 / self.rows.len() as f32;
        let mut index = 0;
        for (row, &columns) in self.rows.iter().enumerate() {
            let dx = 2.0 / columns as f32;
            let scale_x = 1.0 / columns as f32;
            for in_row in 0..columns {
                scene.push();
                scene.translate(
                    -1.0 + dx / 2.0 + in_row as f32 * dx,
                    1.0 - dy / 2.0 - row as f32 * dy,
                );
                scene.scale(scale_x, scale_y);
                self.windows[index].draw(scene);
                index += 1;
                scene.pop();
            }
        }
    }

    /// Aspect-corrected "no windows" banner filling the viewport.
    fn draw_placeholder(&self, scene: &mut Scene) {
        match &self.placeholder {
            Some(texture) => {
                let host_ratio = if self.host_height > 0.0 {
                    (self.host_width / self.host_height) as f32
                } else {
                    1.0
                };
                let total = texture.aspect() / host_ratio;
                scene.push();
                if total >= 1.0 {
                    scene.scale(1.0, 1.0 / total);
                } else {
                    scene.scale(total, 1.0);
                }
                scene.textured_unit_quad(Arc::clone(texture), palette::TEXT);
                scene.pop();
            }
            None => {
                scene.text(
                    [0.0, 0.0],
                    PLACEHOLDER_HEIGHT,
                    &self.placeholder_message,
                    palette::TEXT,
                    Align::Center,
                );
            }
        }
    }
}

/// Auto-tiling balance: the first two windows each get their own row; from
/// then on a row absorbs windows until it matches the row count, and a row
/// that just grew past the "too many columns" check restarts the scan.
/// Kept exactly as specified; the feedback loop is part of the contract.
fn compute_rows(count: usize) -> Vec<usize> {
    let mut rows: Vec<usize> = Vec::new();
    let mut row: isize = -1;
    let mut i = 0;
    while i < count {
        if i < 2 {
            rows.push(1);
            i += 1;
            continue;
        }
        row += 1;
        let r = row as usize;
        if r >= rows.len() {
            rows.push(1);
            i += 1;
            if rows[r] < rows.len() - 1 && i < count {
                rows[r] += 1;
                i += 1;
                row = -1;
            }
        } else {
            while rows[r] < rows.len() && i < count {
                rows[r] += 1;
                i += 1;
            }
        }
    }
    rows
}
