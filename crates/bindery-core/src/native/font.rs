use super::canvas::{DrawParams, NativeCanvas};
use crate::errors::{BindingError, Result};
use crate::AssetLoader;
use skia_safe::{Font, FontMgr, FontStyle, Matrix, Rect, Typeface};
use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FontFlags {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl FontFlags {
    fn style(&self) -> FontStyle {
        match (self.bold, self.italic) {
            (true, true) => FontStyle::bold_italic(),
            (true, false) => FontStyle::bold(),
            (false, true) => FontStyle::italic(),
            (false, false) => FontStyle::normal(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontOptions {
    /// Family name or path to a font file.
    pub name: Option<String>,
    pub flags: FontFlags,
}

/// A sized font owned by a binding.
#[derive(Debug, Clone)]
pub struct NativeFont {
    font: Font,
    name: String,
    height: u32,
    flags: FontFlags,
}

fn is_font_path(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    [".ttf", ".otf", ".ttc"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}

fn checked_height(height: i64) -> Result<u32> {
    u32::try_from(height)
        .ok()
        .filter(|h| *h > 0)
        .ok_or_else(|| BindingError::native(format!("invalid font height {height}")))
}

impl NativeFont {
    /// Creates a font `height` pixels tall.
    ///
    /// Font files are read through `loader` and must parse. Unknown family
    /// names fall back to the platform default typeface.
    pub fn load(
        height: i64,
        options: &FontOptions,
        loader: &dyn AssetLoader,
        default_name: &str,
    ) -> Result<Self> {
        let height = checked_height(height)?;
        let requested = options.name.as_deref().unwrap_or(default_name);
        let style = options.flags.style();

        let (typeface, synthetic) = if is_font_path(requested) {
            let bytes = loader.load_bytes(requested)?;
            let typeface = FontMgr::new().new_from_data(&bytes, 0).ok_or_else(|| {
                BindingError::native(format!("'{requested}' is not a valid font file"))
            })?;
            (Some(typeface), true)
        } else {
            let mgr = FontMgr::default();
            let typeface = mgr
                .match_family_style(requested, style)
                .or_else(|| {
                    warn!(family = requested, "font family not found, using default");
                    mgr.legacy_make_typeface(None, style)
                });
            (typeface, false)
        };

        let name = typeface
            .as_ref()
            .map(Typeface::family_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| requested.to_string());

        let mut font = match typeface {
            Some(typeface) => Font::new(typeface, Some(height as f32)),
            None => {
                warn!("no typeface available, text will not render");
                let mut font = Font::default();
                font.set_size(height as f32);
                font
            }
        };
        // A single file has one style; fake the requested one.
        if synthetic {
            font.set_embolden(options.flags.bold);
            if options.flags.italic {
                font.set_skew_x(-0.25);
            }
        }

        debug!(name = %name, height, "loaded font");
        Ok(Self {
            font,
            name,
            height,
            flags: options.flags,
        })
    }

    /// Same typeface and flags at another size.
    pub fn with_height(&self, height: i64) -> Result<Self> {
        let height = checked_height(height)?;
        let mut font = self.font.clone();
        font.set_size(height as f32);
        Ok(Self {
            font,
            name: self.name.clone(),
            height,
            flags: self.flags,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn flags(&self) -> FontFlags {
        self.flags
    }

    pub fn text_width(&self, text: &str, scale_x: f32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let (advance, _bounds) = self.font.measure_str(text, None);
        advance * scale_x
    }

    /// Greedy word wrap to `max_width` pixels. Explicit newlines always break.
    pub fn wrap(&self, text: &str, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.lines() {
            let mut current = String::new();
            for word in paragraph.split_word_bounds() {
                let candidate = format!("{current}{word}");
                if !current.is_empty() && self.text_width(candidate.trim_end(), 1.0) > max_width {
                    lines.push(current.trim_end().to_string());
                    current = word.trim_start().to_string();
                } else {
                    current = candidate;
                }
            }
            lines.push(current.trim_end().to_string());
        }
        lines
    }

    /// Queues `text` with its top-left corner at `(x, y)`.
    pub fn draw_text(
        &self,
        canvas: &mut NativeCanvas,
        text: &str,
        x: f32,
        y: f32,
        params: &DrawParams,
    ) {
        let (_spacing, metrics) = self.font.metrics();
        let baseline = -metrics.ascent;
        let underline = self.flags.underline.then(|| {
            let offset = metrics
                .underline_position()
                .unwrap_or(self.height as f32 * 0.1);
            let thickness = metrics.underline_thickness().unwrap_or(1.0).max(1.0);
            Rect::from_xywh(
                0.0,
                baseline + offset,
                self.text_width(text, 1.0),
                thickness,
            )
        });

        let mut transform = Matrix::translate((x, y));
        transform.pre_scale((params.scale_x, params.scale_y), None);
        canvas.queue_text(text, &self.font, baseline, underline, transform, params);
    }

    /// Like `draw_text`, but `(x, y)` is the point `(rel_x, rel_y)` of the
    /// text box, so 0.5/0.5 centres it.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text_rel(
        &self,
        canvas: &mut NativeCanvas,
        text: &str,
        x: f32,
        y: f32,
        rel_x: f32,
        rel_y: f32,
        params: &DrawParams,
    ) {
        let width = self.text_width(text, params.scale_x);
        let height = self.height as f32 * params.scale_y;
        self.draw_text(canvas, text, x - width * rel_x, y - height * rel_y, params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoFiles;
    impl AssetLoader for NoFiles {
        fn load_bytes(&self, path: &str) -> anyhow::Result<Vec<u8>> {
            Err(anyhow::anyhow!("no asset '{}'", path))
        }
    }

    struct Garbage;
    impl AssetLoader for Garbage {
        fn load_bytes(&self, _path: &str) -> anyhow::Result<Vec<u8>> {
            Ok(b"not a font".to_vec())
        }
    }

    #[test]
    fn rejects_non_positive_height() {
        let err = NativeFont::load(0, &FontOptions::default(), &NoFiles, "Sans Serif")
            .unwrap_err();
        assert!(matches!(err, BindingError::NativeOperation(_)));
    }

    #[test]
    fn missing_font_file_is_native_error() {
        let options = FontOptions {
            name: Some("fonts/missing.ttf".into()),
            ..Default::default()
        };
        let err = NativeFont::load(20, &options, &NoFiles, "Sans Serif").unwrap_err();
        assert!(matches!(err, BindingError::NativeOperation(_)));
    }

    #[test]
    fn malformed_font_file_is_native_error() {
        let options = FontOptions {
            name: Some("broken.otf".into()),
            ..Default::default()
        };
        let err = NativeFont::load(20, &options, &Garbage, "Sans Serif").unwrap_err();
        assert!(err.to_string().contains("not a valid font file"));
    }

    #[test]
    fn unknown_family_falls_back() {
        let options = FontOptions {
            name: Some("No Such Family 1234".into()),
            flags: FontFlags {
                underline: true,
                ..Default::default()
            },
        };
        let font = NativeFont::load(24, &options, &NoFiles, "Sans Serif").unwrap();
        assert_eq!(font.height(), 24);
        assert!(font.flags().underline);
        assert!(!font.name().is_empty());
    }

    #[test]
    fn width_grows_with_text() {
        let font = NativeFont::load(20, &FontOptions::default(), &NoFiles, "Sans Serif").unwrap();
        assert_eq!(font.text_width("", 1.0), 0.0);
        let one = font.text_width("W", 1.0);
        let three = font.text_width("WWW", 1.0);
        assert!(three >= one);
        assert!((font.text_width("WWW", 2.0) - three * 2.0).abs() < 0.01);
    }

    #[test]
    fn wrap_keeps_explicit_lines() {
        let font = NativeFont::load(20, &FontOptions::default(), &NoFiles, "Sans Serif").unwrap();
        let lines = font.wrap("first\nsecond", 10_000.0);
        assert_eq!(lines, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn resizing_keeps_name_and_flags() {
        let options = FontOptions {
            flags: FontFlags {
                italic: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let font = NativeFont::load(12, &options, &NoFiles, "Sans Serif").unwrap();
        let big = font.with_height(48).unwrap();
        assert_eq!(big.height(), 48);
        assert_eq!(big.name(), font.name());
        assert!(big.flags().italic);
        assert!(font.with_height(-3).is_err());
    }

    #[test]
    fn font_path_detection() {
        assert!(is_font_path("fonts/Inter.TTF"));
        assert!(is_font_path("a.otf"));
        assert!(!is_font_path("Sans Serif"));
    }
}
