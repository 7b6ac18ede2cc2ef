use super::canvas::{checked_size, DrawParams, NativeCanvas};
use super::font::NativeFont;
use crate::errors::{BindingError, Result};
use skia_safe::{
    images, surfaces, AlphaType, BlendMode, Color, ColorType, Data, Image, ImageInfo, Matrix,
    Paint,
};
use tracing::debug;

/// Construction flags for images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageOptions {
    /// Edges are drawn hard so tiles line up without seams.
    pub tileable: bool,
    /// Nearest-neighbour sampling when scaled.
    pub retro: bool,
    /// Crop `[x, y, w, h]` applied after decoding.
    pub rect: Option<[i64; 4]>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
}

impl TextAlign {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(TextAlign::Left),
            "right" => Some(TextAlign::Right),
            "center" | "centre" => Some(TextAlign::Center),
            _ => None,
        }
    }
}

/// Layout options for `NativeImage::from_text`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextImageOptions {
    /// Wrap width in pixels. Unset means one line per `\n`.
    pub width: Option<f32>,
    pub align: TextAlign,
    /// Extra pixels between lines.
    pub spacing: f32,
    pub retro: bool,
}

/// A decoded raster image owned by a binding.
#[derive(Debug, Clone)]
pub struct NativeImage {
    image: Image,
    tileable: bool,
    retro: bool,
}

impl NativeImage {
    pub(crate) fn from_skia(image: Image) -> Self {
        Self {
            image,
            tileable: false,
            retro: false,
        }
    }

    fn with_flags(mut self, tileable: bool, retro: bool) -> Self {
        self.tileable = tileable;
        self.retro = retro;
        self
    }

    /// Decodes an encoded image (PNG, JPEG, ...).
    pub fn decode(bytes: &[u8], options: &ImageOptions) -> Result<Self> {
        let image = Image::from_encoded(Data::new_copy(bytes))
            .ok_or_else(|| BindingError::native("could not decode image data"))?;
        let decoded = Self::from_skia(image).with_flags(options.tileable, options.retro);
        debug!(
            width = decoded.width(),
            height = decoded.height(),
            "decoded image"
        );
        match options.rect {
            Some([x, y, w, h]) => decoded.subimage(x, y, w, h),
            None => Ok(decoded),
        }
    }

    /// Builds an image from tightly packed RGBA8 pixels.
    pub fn from_rgba(width: i64, height: i64, rgba: &[u8]) -> Result<Self> {
        let (w, h) = checked_size(width, height)?;
        let expected = w as usize * h as usize * 4;
        if rgba.len() != expected {
            return Err(BindingError::native(format!(
                "expected {expected} bytes of RGBA data for {w}x{h}, got {}",
                rgba.len()
            )));
        }
        let info = ImageInfo::new((w, h), ColorType::RGBA8888, AlphaType::Unpremul, None);
        images::raster_from_data(&info, Data::new_copy(rgba), w as usize * 4)
            .map(Self::from_skia)
            .ok_or_else(|| BindingError::native("failed to create raster image"))
    }

    /// Renders `text` in white onto a transparent image.
    pub fn from_text(text: &str, font: &NativeFont, options: &TextImageOptions) -> Result<Self> {
        let lines = match options.width {
            Some(width) => font.wrap(text, width),
            None => text.lines().map(str::to_string).collect(),
        };
        let line_height = font.height() as f32;
        let count = lines.len().max(1) as f32;

        let widest = lines
            .iter()
            .map(|line| font.text_width(line, 1.0))
            .fold(0.0_f32, f32::max);
        let width = options.width.unwrap_or(widest).ceil().max(1.0);
        let height = (count * line_height + (count - 1.0) * options.spacing)
            .ceil()
            .max(1.0);

        let mut canvas = NativeCanvas::new(width as i64, height as i64)?;
        canvas.clear(Color::TRANSPARENT);
        for (i, line) in lines.iter().enumerate() {
            let line_width = font.text_width(line, 1.0);
            let x = match options.align {
                TextAlign::Left => 0.0,
                TextAlign::Right => width - line_width,
                TextAlign::Center => (width - line_width) / 2.0,
            };
            let y = i as f32 * (line_height + options.spacing);
            font.draw_text(&mut canvas, line, x, y, &DrawParams::default());
        }
        Ok(canvas.snapshot().with_flags(false, options.retro))
    }

    /// Splits an encoded image into row-major tiles. A negative tile size is
    /// the number of tiles along that axis.
    pub fn tiles(
        bytes: &[u8],
        tile_width: i64,
        tile_height: i64,
        options: &ImageOptions,
    ) -> Result<Vec<Self>> {
        let source = Self::decode(bytes, options)?;
        let tile_w = tile_extent(source.width() as i64, tile_width)?;
        let tile_h = tile_extent(source.height() as i64, tile_height)?;

        let cols = source.width() as i64 / tile_w;
        let rows = source.height() as i64 / tile_h;
        let mut tiles = Vec::with_capacity((cols * rows).max(0) as usize);
        for row in 0..rows {
            for col in 0..cols {
                tiles.push(source.subimage(col * tile_w, row * tile_h, tile_w, tile_h)?);
            }
        }
        debug!(count = tiles.len(), tile_w, tile_h, "split image into tiles");
        Ok(tiles)
    }

    pub fn width(&self) -> i32 {
        self.image.width()
    }

    pub fn height(&self) -> i32 {
        self.image.height()
    }

    pub fn tileable(&self) -> bool {
        self.tileable
    }

    pub fn retro(&self) -> bool {
        self.retro
    }

    /// Identity of the underlying native image.
    pub fn unique_id(&self) -> u32 {
        self.image.unique_id()
    }

    pub(crate) fn skia_image(&self) -> &Image {
        &self.image
    }

    /// Copies a rectangle into a new image.
    pub fn subimage(&self, x: i64, y: i64, width: i64, height: i64) -> Result<Self> {
        let (w, h) = checked_size(width, height)?;
        let past = |start: i64, extent: i64, limit: i32| {
            start.checked_add(extent).map_or(true, |end| end > limit as i64)
        };
        if x < 0 || y < 0 || past(x, width, self.width()) || past(y, height, self.height()) {
            return Err(BindingError::native(format!(
                "rect ({x}, {y}, {width}, {height}) is outside the {}x{} image",
                self.width(),
                self.height()
            )));
        }
        let mut surface = surfaces::raster_n32_premul((w, h))
            .ok_or_else(|| BindingError::native("failed to create surface"))?;
        surface
            .canvas()
            .draw_image(&self.image, (-x as f32, -y as f32), Some(&copy_paint()));
        Ok(Self::from_skia(surface.image_snapshot()).with_flags(self.tileable, self.retro))
    }

    /// Tightly packed, unpremultiplied RGBA8 pixels.
    pub fn to_rgba(&self) -> Result<Vec<u8>> {
        let (w, h) = (self.width(), self.height());
        let mut surface = surfaces::raster_n32_premul((w, h))
            .ok_or_else(|| BindingError::native("failed to create surface"))?;
        surface
            .canvas()
            .draw_image(&self.image, (0.0, 0.0), Some(&copy_paint()));

        let info = ImageInfo::new((w, h), ColorType::RGBA8888, AlphaType::Unpremul, None);
        let mut bytes = vec![0u8; w as usize * h as usize * 4];
        if !surface.read_pixels(&info, &mut bytes, w as usize * 4, (0, 0)) {
            return Err(BindingError::native("failed to read image pixels"));
        }
        Ok(bytes)
    }

    /// Encodes to a file; the format follows the extension.
    pub fn save(&self, path: &str) -> Result<()> {
        let rgba = self.to_rgba()?;
        let buffer = ::image::RgbaImage::from_raw(self.width() as u32, self.height() as u32, rgba)
            .ok_or_else(|| BindingError::native("pixel buffer size mismatch"))?;
        buffer
            .save(path)
            .map_err(|e| BindingError::native(format!("failed to save '{path}': {e}")))?;
        debug!(path, "saved image");
        Ok(())
    }

    /// Returns a copy with `other` written over the pixels at `(x, y)`.
    pub fn insert(&self, other: &NativeImage, x: i64, y: i64) -> Result<Self> {
        let (w, h) = (self.width(), self.height());
        let mut surface = surfaces::raster_n32_premul((w, h))
            .ok_or_else(|| BindingError::native("failed to create surface"))?;
        let canvas = surface.canvas();
        let paint = copy_paint();
        canvas.draw_image(&self.image, (0.0, 0.0), Some(&paint));
        canvas.draw_image(&other.image, (x as f32, y as f32), Some(&paint));
        Ok(Self::from_skia(surface.image_snapshot()).with_flags(self.tileable, self.retro))
    }

    /// Queues the image with its top-left corner at `(x, y)`.
    pub fn draw(&self, canvas: &mut NativeCanvas, x: f32, y: f32, params: &DrawParams) {
        let mut transform = Matrix::translate((x, y));
        transform.pre_scale((params.scale_x, params.scale_y), None);
        canvas.queue_image(self, transform, params);
    }

    /// Queues the image rotated `angle` degrees clockwise around the point
    /// `(center_x, center_y)` of the image (in 0..1 units), placed at `(x, y)`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_rot(
        &self,
        canvas: &mut NativeCanvas,
        x: f32,
        y: f32,
        angle: f32,
        center_x: f32,
        center_y: f32,
        params: &DrawParams,
    ) {
        let mut transform = Matrix::translate((x, y));
        transform.pre_rotate(angle, None);
        transform.pre_scale((params.scale_x, params.scale_y), None);
        transform.pre_translate((
            -center_x * self.width() as f32,
            -center_y * self.height() as f32,
        ));
        canvas.queue_image(self, transform, params);
    }
}

fn copy_paint() -> Paint {
    let mut paint = Paint::default();
    paint.set_blend_mode(BlendMode::Src);
    paint
}

fn tile_extent(total: i64, requested: i64) -> Result<i64> {
    let extent = if requested < 0 {
        requested.checked_neg().map_or(0, |count| total / count)
    } else {
        requested
    };
    if extent <= 0 {
        return Err(BindingError::native(format!(
            "invalid tile size {requested} for an image extent of {total}"
        )));
    }
    Ok(extent)
}
