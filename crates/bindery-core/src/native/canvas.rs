//! Raster drawing target with z-ordered submission.
//!
//! Draw calls are queued with a `z` value and replayed lowest-z first when the
//! canvas is flushed. Calls sharing a `z` keep their submission order.

use super::color::WHITE;
use super::image::NativeImage;
use crate::errors::{BindingError, Result};
use skia_safe::{
    color_filters, surfaces, AlphaType, BlendMode, Color, ColorType, FilterMode, Font, ImageInfo,
    Matrix, MipmapMode, Paint, Point, Rect, SamplingOptions, Surface,
};

/// How a draw blends with what is already on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    #[default]
    Default,
    Additive,
}

impl DrawMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "default" => Some(DrawMode::Default),
            "additive" | "add" => Some(DrawMode::Additive),
            _ => None,
        }
    }

    fn blend_mode(self) -> BlendMode {
        match self {
            DrawMode::Default => BlendMode::SrcOver,
            DrawMode::Additive => BlendMode::Plus,
        }
    }
}

/// Parameters shared by image and text draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawParams {
    pub z: f64,
    pub scale_x: f32,
    pub scale_y: f32,
    pub color: Color,
    pub mode: DrawMode,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            z: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            color: WHITE,
            mode: DrawMode::Default,
        }
    }
}

impl DrawParams {
    /// Paint that tints with `color` and blends with `mode`.
    pub(crate) fn paint(&self) -> Paint {
        let mut paint = Paint::default();
        paint.set_anti_alias(true);
        paint.set_blend_mode(self.mode.blend_mode());
        if self.color != WHITE {
            paint.set_color_filter(color_filters::blend(self.color, BlendMode::Modulate));
        }
        paint
    }
}

enum DrawOp {
    Image {
        image: skia_safe::Image,
        sampling: SamplingOptions,
    },
    Text {
        text: String,
        font: Font,
        baseline: f32,
        underline: Option<Rect>,
    },
}

struct QueuedDraw {
    z: f64,
    transform: Matrix,
    paint: Paint,
    op: DrawOp,
}

/// An off-screen raster surface scripts draw into.
pub struct NativeCanvas {
    surface: Surface,
    queue: Vec<QueuedDraw>,
}

impl NativeCanvas {
    pub fn new(width: i64, height: i64) -> Result<Self> {
        let (w, h) = checked_size(width, height)?;
        let surface = surfaces::raster_n32_premul((w, h))
            .ok_or_else(|| BindingError::native(format!("failed to create {w}x{h} surface")))?;
        Ok(Self {
            surface,
            queue: Vec::new(),
        })
    }

    pub fn width(&self) -> i32 {
        self.surface.width()
    }

    pub fn height(&self) -> i32 {
        self.surface.height()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Fills the whole surface, discarding anything still queued.
    pub fn clear(&mut self, color: Color) {
        self.queue.clear();
        self.surface.canvas().clear(color);
    }

    pub(crate) fn queue_image(
        &mut self,
        image: &NativeImage,
        transform: Matrix,
        params: &DrawParams,
    ) {
        let sampling = if image.retro() {
            SamplingOptions::new(FilterMode::Nearest, MipmapMode::None)
        } else {
            SamplingOptions::new(FilterMode::Linear, MipmapMode::None)
        };
        let mut paint = params.paint();
        // Hard edges so neighbouring tiles meet without seams.
        paint.set_anti_alias(!image.tileable());
        self.queue.push(QueuedDraw {
            z: params.z,
            transform,
            paint,
            op: DrawOp::Image {
                image: image.skia_image().clone(),
                sampling,
            },
        });
    }

    pub(crate) fn queue_text(
        &mut self,
        text: &str,
        font: &Font,
        baseline: f32,
        underline: Option<Rect>,
        transform: Matrix,
        params: &DrawParams,
    ) {
        let mut paint = params.paint();
        paint.set_color(params.color);
        paint.set_color_filter(None);
        self.queue.push(QueuedDraw {
            z: params.z,
            transform,
            paint,
            op: DrawOp::Text {
                text: text.to_string(),
                font: font.clone(),
                baseline,
                underline,
            },
        });
    }

    /// Replays queued draws onto the surface in z order.
    pub fn flush(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        let mut queue = std::mem::take(&mut self.queue);
        // Stable sort keeps submission order within one z.
        queue.sort_by(|a, b| a.z.total_cmp(&b.z));

        let canvas = self.surface.canvas();
        for draw in queue {
            canvas.save();
            canvas.concat(&draw.transform);
            match &draw.op {
                DrawOp::Image { image, sampling } => {
                    let dst = Rect::from_iwh(image.width(), image.height());
                    canvas.draw_image_rect_with_sampling_options(
                        image,
                        None,
                        dst,
                        *sampling,
                        &draw.paint,
                    );
                }
                DrawOp::Text {
                    text,
                    font,
                    baseline,
                    underline,
                } => {
                    canvas.draw_str(text, Point::new(0.0, *baseline), font, &draw.paint);
                    if let Some(line) = underline {
                        canvas.draw_rect(line, &draw.paint);
                    }
                }
            }
            canvas.restore();
        }
    }

    /// Flushes and captures the current contents.
    pub fn snapshot(&mut self) -> NativeImage {
        self.flush();
        NativeImage::from_skia(self.surface.image_snapshot())
    }

    /// The `0xAARRGGBB` value of one pixel (unpremultiplied).
    pub fn pixel(&mut self, x: i64, y: i64) -> Result<u32> {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return Err(BindingError::native(format!(
                "pixel ({x}, {y}) is outside the {}x{} canvas",
                self.width(),
                self.height()
            )));
        }
        self.flush();
        let info = ImageInfo::new((1, 1), ColorType::RGBA8888, AlphaType::Unpremul, None);
        let mut rgba = [0u8; 4];
        if !self
            .surface
            .read_pixels(&info, &mut rgba, 4, (x as i32, y as i32))
        {
            return Err(BindingError::native("failed to read canvas pixels"));
        }
        let [r, g, b, a] = rgba;
        Ok(u32::from_be_bytes([a, r, g, b]))
    }

    pub fn save(&mut self, path: &str) -> Result<()> {
        self.snapshot().save(path)
    }
}

/// Validates script-supplied dimensions for a raster surface.
pub(crate) fn checked_size(width: i64, height: i64) -> Result<(i32, i32)> {
    let w = i32::try_from(width).ok().filter(|w| *w > 0);
    let h = i32::try_from(height).ok().filter(|h| *h > 0);
    match (w, h) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(BindingError::native(format!(
            "invalid dimensions {width}x{height}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(color: [u8; 4], w: i32, h: i32) -> NativeImage {
        let pixels: Vec<u8> = (0..w * h).flat_map(|_| color).collect();
        NativeImage::from_rgba(w as i64, h as i64, &pixels).unwrap()
    }

    #[test]
    fn rejects_empty_canvas() {
        assert!(NativeCanvas::new(0, 10).is_err());
        assert!(NativeCanvas::new(10, -1).is_err());
    }

    #[test]
    fn clear_fills_every_pixel() {
        let mut canvas = NativeCanvas::new(4, 4).unwrap();
        canvas.clear(Color::from_rgb(10, 20, 30));
        assert_eq!(canvas.pixel(3, 3).unwrap(), 0xff0a141e);
        assert!(canvas.pixel(4, 0).is_err());
    }

    #[test]
    fn higher_z_draws_on_top_regardless_of_order() {
        let mut canvas = NativeCanvas::new(2, 2).unwrap();
        let red = solid([255, 0, 0, 255], 2, 2);
        let blue = solid([0, 0, 255, 255], 2, 2);

        let top = DrawParams {
            z: 5.0,
            ..Default::default()
        };
        canvas.queue_image(&red, Matrix::new_identity(), &top);
        canvas.queue_image(&blue, Matrix::new_identity(), &DrawParams::default());
        assert_eq!(canvas.pending(), 2);

        assert_eq!(canvas.pixel(0, 0).unwrap(), 0xffff0000);
        assert_eq!(canvas.pending(), 0);
    }

    #[test]
    fn same_z_keeps_submission_order() {
        let mut canvas = NativeCanvas::new(2, 2).unwrap();
        let red = solid([255, 0, 0, 255], 2, 2);
        let green = solid([0, 255, 0, 255], 2, 2);

        canvas.queue_image(&red, Matrix::new_identity(), &DrawParams::default());
        canvas.queue_image(&green, Matrix::new_identity(), &DrawParams::default());

        assert_eq!(canvas.pixel(1, 1).unwrap(), 0xff00ff00);
    }

    #[test]
    fn tint_modulates_image() {
        let mut canvas = NativeCanvas::new(1, 1).unwrap();
        let white = solid([255, 255, 255, 255], 1, 1);
        let params = DrawParams {
            color: Color::from_rgb(255, 0, 0),
            ..Default::default()
        };
        canvas.queue_image(&white, Matrix::new_identity(), &params);
        assert_eq!(canvas.pixel(0, 0).unwrap(), 0xffff0000);
    }

    #[test]
    fn draw_mode_names() {
        assert_eq!(DrawMode::parse("additive"), Some(DrawMode::Additive));
        assert_eq!(DrawMode::parse("default"), Some(DrawMode::Default));
        assert_eq!(DrawMode::parse("multiply"), None);
    }
}
