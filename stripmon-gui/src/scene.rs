use std::sync::Arc;

use crate::text::Texture;

/// Straight-alpha color in [0, 1] components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// Fixed display colors.
pub mod palette {
    use super::Color;

    pub const BACKGROUND: Color = Color::rgb(0.05, 0.05, 0.08);
    pub const WINDOW_BORDER: Color = Color::rgb(0.55, 0.55, 0.60);
    pub const PLOT_BACKGROUND: Color = Color::rgb(0.02, 0.02, 0.03);
    pub const PLOT_BORDER: Color = Color::rgb(0.40, 0.40, 0.45);
    pub const DATA_LINE: Color = Color::rgb(0.30, 0.85, 0.35);
    pub const TICKS: Color = Color::rgb(0.35, 0.35, 0.40);
    pub const TICK_LABELS: Color = Color::rgb(0.65, 0.65, 0.70);
    pub const TEXT: Color = Color::rgb(0.90, 0.90, 0.90);
    pub const MINOR_ALARM: Color = Color::rgb(0.95, 0.80, 0.15);
    pub const MAJOR_ALARM: Color = Color::rgb(0.95, 0.20, 0.15);
    pub const INVALID_ALARM: Color = Color::rgb(0.80, 0.80, 0.80);
    pub const DISCONNECTED: Color = Color::rgb(1.00, 0.45, 0.70);
}

/// Horizontal anchoring of a text op at its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Translate-then-scale transform, composed the way a matrix stack composes:
/// operations apply to points recorded after them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub tx: f32,
    pub ty: f32,
    pub sx: f32,
    pub sy: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        tx: 0.0,
        ty: 0.0,
        sx: 1.0,
        sy: 1.0,
    };

    pub fn apply(&self, p: [f32; 2]) -> [f32; 2] {
        [self.tx + self.sx * p[0], self.ty + self.sy * p[1]]
    }

    fn translated(&self, dx: f32, dy: f32) -> Transform {
        Transform {
            tx: self.tx + self.sx * dx,
            ty: self.ty + self.sy * dy,
            ..*self
        }
    }

    fn scaled(&self, kx: f32, ky: f32) -> Transform {
        Transform {
            sx: self.sx * kx,
            sy: self.sy * ky,
            ..*self
        }
    }
}

impl Default for Transform {
    fn default() -> Transform {
        Transform::IDENTITY
    }
}

/// One recorded drawing operation, already in final normalized coordinates.
#[derive(Debug, Clone)]
pub enum SceneOp {
    Lines {
        segments: Vec<[[f32; 2]; 2]>,
        color: Color,
    },
    Strip {
        points: Vec<[f32; 2]>,
        color: Color,
    },
    Quad {
        min: [f32; 2],
        max: [f32; 2],
        fill: Option<Color>,
        border: Option<Color>,
    },
    TexturedQuad {
        texture: Arc<Texture>,
        min: [f32; 2],
        max: [f32; 2],
        tint: Color,
    },
    Text {
        pos: [f32; 2],
        height: f32,
        text: String,
        color: Color,
        align: Align,
    },
    /// Start recording the mask shape (first stencil pass).
    MaskBegin,
    /// Shape recorded; ops until MaskOff render only inside it.
    MaskApply,
    MaskOff,
}

/// Display list standing in for immediate-mode drawing: widgets record
/// primitives through the transform stack; a backend replays the ops.
///
/// Masking is the two-pass protocol: the shape quads recorded between
/// `mask_begin` and `mask_apply` are not painted, they define the region
/// that clips every op up to `mask_off`.
#[derive(Default)]
pub struct Scene {
    ops: Vec<SceneOp>,
    stack: Vec<Transform>,
    current: Transform,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            stack: Vec::new(),
            current: Transform::IDENTITY,
        }
    }

    pub fn clear(&mut self) {
        self.ops.clear();
        self.stack.clear();
        self.current = Transform::IDENTITY;
    }

    pub fn push(&mut self) {
        self.stack.push(self.current);
    }

    pub fn pop(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.current = t;
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.current = self.current.translated(dx, dy);
    }

    pub fn scale(&mut self, kx: f32, ky: f32) {
        self.current = self.current.scaled(kx, ky);
    }

    pub fn transform(&self) -> Transform {
        self.current
    }

    pub fn line_segments(&mut self, segments: &[[[f32; 2]; 2]], color: Color) {
        if segments.is_empty() {
            return;
        }
        let segments = segments
            .iter()
            .map(|seg| [self.current.apply(seg[0]), self.current.apply(seg[1])])
            .collect();
        self.ops.push(SceneOp::Lines { segments, color });
    }

    pub fn strip(&mut self, points: &[[f32; 2]], color: Color) {
        if points.len() < 2 {
            return;
        }
        let points = points.iter().map(|&p| self.current.apply(p)).collect();
        self.ops.push(SceneOp::Strip { points, color });
    }

    pub fn quad(
        &mut self,
        min: [f32; 2],
        max: [f32; 2],
        fill: Option<Color>,
        border: Option<Color>,
    ) {
        let (min, max) = self.corners(min, max);
        self.ops.push(SceneOp::Quad {
            min,
            max,
            fill,
            border,
        });
    }

    /// Textured quad over [-1, 1]² through the current transform.
    pub fn textured_unit_quad(&mut self, texture: Arc<Texture>, tint: Color) {
        let (min, max) = self.corners([-1.0, -1.0], [1.0, 1.0]);
        self.ops.push(SceneOp::TexturedQuad {
            texture,
            min,
            max,
            tint,
        });
    }

    /// Text anchored at `pos`; `height` is given in pre-transform units and
    /// scaled by the current vertical scale.
    pub fn text(&mut self, pos: [f32; 2], height: f32, text: &str, color: Color, align: Align) {
        if text.is_empty() {
            return;
        }
        self.ops.push(SceneOp::Text {
            pos: self.current.apply(pos),
            height: height * self.current.sy.abs(),
            text: text.to_string(),
            color,
            align,
        });
    }

    pub fn mask_begin(&mut self) {
        self.ops.push(SceneOp::MaskBegin);
    }

    pub fn mask_apply(&mut self) {
        self.ops.push(SceneOp::MaskApply);
    }

    pub fn mask_off(&mut self) {
        self.ops.push(SceneOp::MaskOff);
    }

    pub fn ops(&self) -> &[SceneOp] {
        &self.ops
    }

    fn corners(&self, min: [f32; 2], max: [f32; 2]) -> ([f32; 2], [f32; 2]) {
        let a = self.current.apply(min);
        let b = self.current.apply(max);
        (
            [a[0].min(b[0]), a[1].min(b[1])],
            [a[0].max(b[0]), a[1].max(b[1])],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{palette, Align, Scene, SceneOp};

    #[test]
    fn transform_stack_composes_translate_then_scale() {
        let mut scene = Scene::new();
        scene.push();
        scene.translate(1.0, -1.0);
        scene.scale(0.5, 0.25);
        // point (2, 4) -> scale (1, 1) -> translate (2, 0)
        scene.strip(&[[2.0, 4.0], [0.0, 0.0]], palette::DATA_LINE);
        scene.pop();
        scene.strip(&[[2.0, 4.0], [0.0, 0.0]], palette::DATA_LINE);

        let ops = scene.ops();
        match &ops[0] {
            SceneOp::Strip { points, .. } => {
                assert_eq!(points[0], [2.0, 0.0]);
                assert_eq!(points[1], [1.0, -1.0]);
            }
            other => panic!("unexpected op {other:?}"),
        }
        match &ops[1] {
            SceneOp::Strip { points, .. } => assert_eq!(points[0], [2.0, 4.0]),
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn nested_push_pop_restores_outer_transform() {
        let mut scene = Scene::new();
        scene.push();
        scene.scale(2.0, 2.0);
        scene.push();
        scene.translate(1.0, 0.0);
        assert_eq!(scene.transform().tx, 2.0);
        scene.pop();
        assert_eq!(scene.transform().tx, 0.0);
        assert_eq!(scene.transform().sx, 2.0);
        scene.pop();
        assert_eq!(scene.transform().sx, 1.0);
    }

    #[test]
    fn quads_normalize_corner_order() {
        let mut scene = Scene::new();
        scene.quad([1.0, 1.0], [-1.0, -1.0], Some(palette::BACKGROUND), None);
        match &scene.ops()[0] {
            SceneOp::Quad { min, max, .. } => {
                assert_eq!(*min, [-1.0, -1.0]);
                assert_eq!(*max, [1.0, 1.0]);
            }
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn text_height_scales_with_transform() {
        let mut scene = Scene::new();
        scene.scale(1.0, 0.5);
        scene.text([0.0, 0.0], 0.2, "hello", palette::TEXT, Align::Center);
        match &scene.ops()[0] {
            SceneOp::Text { height, .. } => assert!((height - 0.1).abs() < 1e-6),
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn mask_ops_record_in_protocol_order() {
        let mut scene = Scene::new();
        scene.mask_begin();
        scene.quad([-1.0, -1.0], [1.0, 1.0], Some(palette::PLOT_BACKGROUND), None);
        scene.mask_apply();
        scene.strip(&[[0.0, 0.0], [1.0, 1.0]], palette::DATA_LINE);
        scene.mask_off();

        let kinds: Vec<&'static str> = scene
            .ops()
            .iter()
            .map(|op| match op {
                SceneOp::MaskBegin => "begin",
                SceneOp::Quad { .. } => "quad",
                SceneOp::MaskApply => "apply",
                SceneOp::Strip { .. } => "strip",
                SceneOp::MaskOff => "off",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["begin", "quad", "apply", "strip", "off"]);
    }

    #[test]
    fn degenerate_primitives_are_skipped() {
        let mut scene = Scene::new();
        scene.strip(&[[0.0, 0.0]], palette::DATA_LINE);
        scene.line_segments(&[], palette::TICKS);
        scene.text([0.0, 0.0], 0.1, "", palette::TEXT, Align::Left);
        assert!(scene.ops().is_empty());
    }
}
