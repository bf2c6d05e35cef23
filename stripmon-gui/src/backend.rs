use std::collections::HashMap;
use std::sync::Arc;

use crate::monitor::SharedMonitor;
use crate::scene::{palette, Align, Color, Scene, SceneOp};
use crate::text::{Texture, TexturePixels};

#[derive(Debug, Clone)]
pub struct GuiConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            title: "stripmon".to_string(),
            width: 1280.0,
            height: 720.0,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum GuiError {
    #[error("gui error: {0}")]
    Gui(String),
}

/// Run the native window around an already-wired monitor. Blocks until the
/// window closes.
pub fn run_gui(config: GuiConfig, monitor: SharedMonitor) -> Result<(), GuiError> {
    let mut options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([config.width, config.height]),
        ..Default::default()
    };
    // NOTE: Vsync generates hangs and lag on occluded windows.
    options.vsync = false;

    eframe::run_native(
        &config.title,
        options,
        Box::new(move |_cc| Box::new(MonitorApp::new(monitor))),
    )
    .map_err(|err| GuiError::Gui(err.to_string()))
}

struct MonitorApp {
    monitor: SharedMonitor,
    scene: Scene,
    textures: HashMap<u64, egui::TextureHandle>,
}

impl MonitorApp {
    fn new(monitor: SharedMonitor) -> Self {
        Self {
            monitor,
            scene: Scene::new(),
            textures: HashMap::new(),
        }
    }
}

impl eframe::App for MonitorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(color32(palette::BACKGROUND)))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                // The whole frame pass, event application included, runs
                // under the one monitor lock.
                let mut monitor = self.monitor.lock().unwrap();
                monitor
                    .manager
                    .set_host_size(rect.width() as f64, rect.height() as f64);
                monitor.tick();
                self.scene.clear();
                monitor.manager.draw(&mut self.scene);
                replay(ui.painter(), rect, &self.scene, &mut self.textures, ctx);
            });
        ctx.request_repaint_after(std::time::Duration::from_millis(33));
    }
}

fn to_screen(rect: egui::Rect, p: [f32; 2]) -> egui::Pos2 {
    egui::pos2(
        rect.center().x + p[0] * rect.width() / 2.0,
        rect.center().y - p[1] * rect.height() / 2.0,
    )
}

fn color32(c: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(
        (c.r * 255.0).round() as u8,
        (c.g * 255.0).round() as u8,
        (c.b * 255.0).round() as u8,
        (c.a * 255.0).round() as u8,
    )
}

fn clipped(painter: &egui::Painter, clip: Option<egui::Rect>) -> egui::Painter {
    match clip {
        Some(rect) => painter.with_clip_rect(rect),
        None => painter.clone(),
    }
}

/// Replay the display list. Quads recorded during a mask pass are not
/// painted; they accumulate the clip region applied until MaskOff, which is
/// how the two-pass clip-then-draw protocol maps onto the painter.
fn replay(
    painter: &egui::Painter,
    rect: egui::Rect,
    scene: &Scene,
    textures: &mut HashMap<u64, egui::TextureHandle>,
    ctx: &egui::Context,
) {
    let mut mask_pass = false;
    let mut mask_accum: Option<egui::Rect> = None;
    let mut clip: Option<egui::Rect> = None;

    for op in scene.ops() {
        match op {
            SceneOp::MaskBegin => {
                mask_pass = true;
                mask_accum = None;
            }
            SceneOp::MaskApply => {
                mask_pass = false;
                clip = mask_accum;
            }
            SceneOp::MaskOff => {
                clip = None;
            }
            SceneOp::Quad {
                min,
                max,
                fill,
                border,
            } => {
                let quad = egui::Rect::from_min_max(
                    to_screen(rect, [min[0], max[1]]),
                    to_screen(rect, [max[0], min[1]]),
                );
                if mask_pass {
                    mask_accum = Some(match mask_accum {
                        Some(acc) => acc.union(quad),
                        None => quad,
                    });
                    continue;
                }
                let painter = clipped(painter, clip);
                if let Some(fill) = fill {
                    painter.rect_filled(quad, 0.0, color32(*fill));
                }
                if let Some(border) = border {
                    painter.rect_stroke(quad, 0.0, egui::Stroke::new(1.0, color32(*border)));
                }
            }
            SceneOp::Lines { segments, color } => {
                if mask_pass {
                    continue;
                }
                let painter = clipped(painter, clip);
                let stroke = egui::Stroke::new(1.0, color32(*color));
                for seg in segments {
                    painter.line_segment([to_screen(rect, seg[0]), to_screen(rect, seg[1])], stroke);
                }
            }
            SceneOp::Strip { points, color } => {
                if mask_pass {
                    continue;
                }
                let painter = clipped(painter, clip);
                let points: Vec<egui::Pos2> = points.iter().map(|&p| to_screen(rect, p)).collect();
                painter.add(egui::Shape::line(
                    points,
                    egui::Stroke::new(1.5, color32(*color)),
                ));
            }
            SceneOp::TexturedQuad {
                texture,
                min,
                max,
                tint,
            } => {
                if mask_pass {
                    continue;
                }
                let handle = texture_handle(ctx, textures, texture);
                let quad = egui::Rect::from_min_max(
                    to_screen(rect, [min[0], max[1]]),
                    to_screen(rect, [max[0], min[1]]),
                );
                clipped(painter, clip).image(
                    handle.id(),
                    quad,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    color32(*tint),
                );
            }
            SceneOp::Text {
                pos,
                height,
                text,
                color,
                align,
            } => {
                if mask_pass {
                    continue;
                }
                let anchor = match align {
                    Align::Left => egui::Align2::LEFT_CENTER,
                    Align::Center => egui::Align2::CENTER_CENTER,
                    Align::Right => egui::Align2::RIGHT_CENTER,
                };
                let size = (height * rect.height() / 2.0).max(8.0);
                clipped(painter, clip).text(
                    to_screen(rect, *pos),
                    anchor,
                    text,
                    egui::FontId::proportional(size),
                    color32(*color),
                );
            }
        }
    }
}

fn texture_handle<'a>(
    ctx: &egui::Context,
    cache: &'a mut HashMap<u64, egui::TextureHandle>,
    texture: &Arc<Texture>,
) -> &'a egui::TextureHandle {
    cache.entry(texture.id()).or_insert_with(|| {
        let image = match &texture.pixels {
            TexturePixels::Luminance(data) => {
                let pixels = data
                    .iter()
                    .map(|&l| egui::Color32::from_white_alpha(l))
                    .collect();
                egui::ColorImage {
                    size: [texture.width, texture.height],
                    pixels,
                }
            }
            TexturePixels::Rgba(data) => {
                egui::ColorImage::from_rgba_unmultiplied([texture.width, texture.height], data)
            }
        };
        ctx.load_texture(
            format!("stripmon-texture-{}", texture.id()),
            image,
            egui::TextureOptions::LINEAR,
        )
    })
}
