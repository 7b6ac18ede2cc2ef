//! # Scripting Utilities
//!
//! Argument parsing helpers for Rhai bindings.
//!
//! ## Responsibilities
//! - **Numbers**: scripts pass ints or floats interchangeably.
//! - **Option maps**: draw, image, text and font options from `#{ ... }`.

use crate::errors::{BindingError, Result};
use crate::native::color::color_from_dynamic;
use crate::native::{
    DrawMode, DrawParams, FontFlags, FontOptions, ImageOptions, TextAlign, TextImageOptions,
};
use crate::object::{script_type_name, FontObject};
use rhai::{Dynamic, Map};

fn mismatch(expected: &'static str, value: &Dynamic) -> BindingError {
    BindingError::TypeMismatch {
        expected,
        found: script_type_name(value),
    }
}

/// Reads an int or float argument.
pub fn number(value: &Dynamic) -> Result<f64> {
    if let Ok(f) = value.as_float() {
        return Ok(f);
    }
    value
        .as_int()
        .map(|i| i as f64)
        .map_err(|_| mismatch("number", value))
}

fn opt_number(map: &Map, key: &str) -> Result<Option<f64>> {
    map.get(key).map(number).transpose()
}

fn opt_bool(map: &Map, key: &str) -> Result<Option<bool>> {
    map.get(key)
        .map(|v| v.as_bool().map_err(|_| mismatch("bool", v)))
        .transpose()
}

fn opt_string(map: &Map, key: &str) -> Result<Option<String>> {
    map.get(key)
        .map(|v| v.clone().into_string().map_err(|_| mismatch("string", v)))
        .transpose()
}

/// Draw options: `z`, `scale`, `scale_x`, `scale_y`, `color`, `mode`.
pub fn parse_draw_params(map: &Map) -> Result<DrawParams> {
    let mut params = DrawParams::default();
    if let Some(z) = opt_number(map, "z")? {
        params.z = z;
    }
    if let Some(s) = opt_number(map, "scale")? {
        params.scale_x = s as f32;
        params.scale_y = s as f32;
    }
    if let Some(s) = opt_number(map, "scale_x")? {
        params.scale_x = s as f32;
    }
    if let Some(s) = opt_number(map, "scale_y")? {
        params.scale_y = s as f32;
    }
    if let Some(c) = map.get("color") {
        params.color = color_from_dynamic(c).ok_or_else(|| mismatch("color", c))?;
    }
    if let Some(m) = opt_string(map, "mode")? {
        params.mode = DrawMode::parse(&m).ok_or(BindingError::TypeMismatch {
            expected: "draw mode",
            found: format!("'{m}'"),
        })?;
    }
    Ok(params)
}

/// Image options: `tileable`, `retro`, `rect: [x, y, w, h]`.
pub fn parse_image_options(map: &Map) -> Result<ImageOptions> {
    let mut options = ImageOptions {
        tileable: opt_bool(map, "tileable")?.unwrap_or(false),
        retro: opt_bool(map, "retro")?.unwrap_or(false),
        rect: None,
    };
    if let Some(r) = map.get("rect") {
        let items = r
            .clone()
            .into_array()
            .map_err(|_| mismatch("array of 4 integers", r))?;
        let ints: Vec<i64> = items.iter().filter_map(|v| v.as_int().ok()).collect();
        match ints.as_slice() {
            [x, y, w, h] if items.len() == 4 => options.rect = Some([*x, *y, *w, *h]),
            _ => return Err(mismatch("array of 4 integers", r)),
        }
    }
    Ok(options)
}

/// Font options: `name`, `bold`, `italic`, `underline`.
pub fn parse_font_options(map: &Map) -> Result<FontOptions> {
    Ok(FontOptions {
        name: opt_string(map, "name")?,
        flags: FontFlags {
            bold: opt_bool(map, "bold")?.unwrap_or(false),
            italic: opt_bool(map, "italic")?.unwrap_or(false),
            underline: opt_bool(map, "underline")?.unwrap_or(false),
        },
    })
}

/// Text image options: `width`, `align`, `spacing`, `retro`, plus `font`
/// (family or file) and the font flags.
pub fn parse_text_image_options(map: &Map) -> Result<(TextImageOptions, FontOptions)> {
    let mut text = TextImageOptions {
        width: opt_number(map, "width")?.map(|w| w as f32),
        spacing: opt_number(map, "spacing")?.unwrap_or(0.0) as f32,
        retro: opt_bool(map, "retro")?.unwrap_or(false),
        ..Default::default()
    };
    if let Some(a) = opt_string(map, "align")? {
        text.align = TextAlign::parse(&a).ok_or(BindingError::TypeMismatch {
            expected: "alignment",
            found: format!("'{a}'"),
        })?;
    }
    let mut font = parse_font_options(map)?;
    // A `Font` object is resolved by the caller; only names are read here.
    let font_object = map.get("font").is_some_and(|v| v.is::<FontObject>());
    if !font_object {
        if let Some(name) = opt_string(map, "font")? {
            font.name = Some(name);
        }
    }
    Ok((text, font))
}

#[cfg(test)]
mod tests {
    use super::*;
    use skia_safe::Color;

    fn map(pairs: &[(&str, Dynamic)]) -> Map {
        pairs
            .iter()
            .map(|(k, v)| ((*k).into(), v.clone()))
            .collect()
    }

    #[test]
    fn numbers_accept_int_and_float() {
        assert_eq!(number(&Dynamic::from(3_i64)).unwrap(), 3.0);
        assert_eq!(number(&Dynamic::from(2.5_f64)).unwrap(), 2.5);
        assert!(matches!(
            number(&Dynamic::from("x".to_string())),
            Err(BindingError::TypeMismatch { expected: "number", .. })
        ));
    }

    #[test]
    fn draw_params_from_map() {
        let params = parse_draw_params(&map(&[
            ("z", Dynamic::from(2_i64)),
            ("scale", Dynamic::from(2.0_f64)),
            ("scale_y", Dynamic::from(3_i64)),
            ("color", Dynamic::from("#ff0000".to_string())),
            ("mode", Dynamic::from("additive".to_string())),
        ]))
        .unwrap();
        assert_eq!(params.z, 2.0);
        assert_eq!((params.scale_x, params.scale_y), (2.0, 3.0));
        assert_eq!(params.color, Color::RED);
        assert_eq!(params.mode, DrawMode::Additive);
    }

    #[test]
    fn bad_draw_options_are_type_mismatches() {
        let err = parse_draw_params(&map(&[("mode", Dynamic::from("blur".to_string()))]))
            .unwrap_err();
        assert!(matches!(err, BindingError::TypeMismatch { expected: "draw mode", .. }));

        let err = parse_draw_params(&map(&[("color", Dynamic::from(true))])).unwrap_err();
        assert!(matches!(err, BindingError::TypeMismatch { expected: "color", .. }));
    }

    #[test]
    fn image_rect_needs_four_ints() {
        let rect: rhai::Array = vec![1_i64.into(), 2_i64.into(), 3_i64.into(), 4_i64.into()];
        let options = parse_image_options(&map(&[
            ("rect", Dynamic::from(rect)),
            ("retro", Dynamic::from(true)),
        ]))
        .unwrap();
        assert_eq!(options.rect, Some([1, 2, 3, 4]));
        assert!(options.retro);

        let short: rhai::Array = vec![1_i64.into(), 2_i64.into()];
        assert!(parse_image_options(&map(&[("rect", Dynamic::from(short))])).is_err());
    }

    #[test]
    fn text_options_pick_up_font() {
        let (text, font) = parse_text_image_options(&map(&[
            ("font", Dynamic::from("Serif".to_string())),
            ("align", Dynamic::from("center".to_string())),
            ("width", Dynamic::from(120_i64)),
            ("bold", Dynamic::from(true)),
        ]))
        .unwrap();
        assert_eq!(text.align, TextAlign::Center);
        assert_eq!(text.width, Some(120.0));
        assert_eq!(font.name.as_deref(), Some("Serif"));
        assert!(font.flags.bold);
    }
}
