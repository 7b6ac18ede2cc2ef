//! # Color API
//!
//! Colour helpers exposed to Rhai as the static `color` module.
//!
//! ## Responsibilities
//! - **Construction**: `color::rgba(r, g, b, a)`, `color::rgb(r, g, b)`
//! - **Parsing**: `color::parse("#ff8800")`
//! - **Constants**: `color::white()`, `color::black()`, `color::none()`
//!
//! Colours are plain `0xAARRGGBB` integers, so they can be stored and
//! compared like any other number.

use crate::errors::BindingError;
use crate::native::color::{color_to_int, parse_hex_color};
use rhai::Module;
use skia_safe::Color;

use super::super::RhaiResult;

fn channel(value: i64) -> RhaiResult<u8> {
    u8::try_from(value).map_err(|_| {
        BindingError::TypeMismatch {
            expected: "channel in 0..=255",
            found: value.to_string(),
        }
        .into()
    })
}

/// Creates the `color` module.
pub fn create_color_api() -> Module {
    let mut module = Module::new();

    module.set_native_fn("rgba", |r: i64, g: i64, b: i64, a: i64| {
        let color = Color::from_argb(channel(a)?, channel(r)?, channel(g)?, channel(b)?);
        Ok(color_to_int(color))
    });

    module.set_native_fn("rgb", |r: i64, g: i64, b: i64| {
        let color = Color::from_rgb(channel(r)?, channel(g)?, channel(b)?);
        Ok(color_to_int(color))
    });

    module.set_native_fn("parse", |hex: &str| -> RhaiResult<i64> {
        parse_hex_color(hex).map(color_to_int).ok_or_else(|| {
            BindingError::TypeMismatch {
                expected: "hex colour",
                found: format!("'{hex}'"),
            }
            .into()
        })
    });

    module.set_native_fn("white", || Ok(color_to_int(Color::WHITE)));
    module.set_native_fn("black", || Ok(color_to_int(Color::BLACK)));
    module.set_native_fn("none", || Ok(color_to_int(Color::TRANSPARENT)));

    module
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhai::Engine;

    fn engine() -> Engine {
        let mut engine = Engine::new();
        engine.register_static_module("color", create_color_api().into());
        engine
    }

    #[test]
    fn builds_argb_integers() {
        let engine = engine();
        assert_eq!(
            engine.eval::<i64>("color::rgba(255, 0, 0, 128)").unwrap(),
            0x80FF0000
        );
        assert_eq!(engine.eval::<i64>("color::rgb(0, 0, 255)").unwrap(), 0xFF0000FF);
        assert_eq!(engine.eval::<i64>("color::white()").unwrap(), 0xFFFFFFFF);
        assert_eq!(engine.eval::<i64>("color::none()").unwrap(), 0);
    }

    #[test]
    fn parse_matches_rgb() {
        let engine = engine();
        assert!(engine
            .eval::<bool>(r#"color::parse("#00ff00") == color::rgb(0, 255, 0)"#)
            .unwrap());
    }

    #[test]
    fn bad_input_is_catchable() {
        let engine = engine();
        let kind = engine
            .eval::<String>(
                r#"let k = ""; try { color::parse("nope"); } catch (e) { k = e.kind; } k"#,
            )
            .unwrap();
        assert_eq!(kind, "TypeMismatchError");
        assert!(engine.eval::<i64>("color::rgb(300, 0, 0)").is_err());
    }
}
