//! # Image API
//!
//! Registers the `Image` class.
//!
//! ## Responsibilities
//! - **Construction**: `Image(path)`, `image_from_blob`, `image_from_text`, `load_tiles`
//! - **Queries**: `width`, `height`, `tileable`, `retro`, `disposed`
//! - **Pixels**: `subimage`, `to_blob`, `insert`, `save`
//! - **Drawing**: `draw`, `draw_rot` onto a `Canvas`
//! - **Lifetime**: `dispose`; otherwise released when the last reference drops

use crate::errors::{BindingError, Result};
use crate::native::{DrawParams, ImageOptions, NativeFont, NativeImage, TextImageOptions};
use crate::object::{FontObject, ImageObject};
use rhai::{Array, Blob, Dynamic, Engine, Map};
use tracing::debug;

use super::font::native_font;
use super::super::types::{BindingContext, CanvasHandle};
use super::super::utils::{
    number, parse_draw_params, parse_image_options, parse_text_image_options,
};
use super::super::RhaiResult;

/// Extracts the native image behind any script value.
///
/// Fails with `TypeMismatch` for non-images and `UseAfterFree` for disposed ones.
pub fn native_image(value: &Dynamic) -> Result<NativeImage> {
    ImageObject::from_dynamic(value)
}

fn load_image(ctx: &BindingContext, path: &str, options: &ImageOptions) -> Result<ImageObject> {
    let bytes = ctx.loader.load_bytes(path)?;
    let image = NativeImage::decode(&bytes, options)?;
    debug!(path, "loaded image");
    ImageObject::new_bound(&ctx.registry, image)
}

fn text_image(ctx: &BindingContext, text: &str, height: i64, options: &Map) -> Result<ImageObject> {
    let (text_options, font_options): (TextImageOptions, _) = parse_text_image_options(options)?;
    let font = match options.get("font").filter(|v| v.is::<FontObject>()) {
        Some(object) => native_font(object)?.with_height(height)?,
        None => NativeFont::load(
            height,
            &font_options,
            ctx.loader.as_ref(),
            &ctx.config.default_font,
        )?,
    };
    let image = NativeImage::from_text(text, &font, &text_options)?;
    ImageObject::new_bound(&ctx.registry, image)
}

fn tiles(
    ctx: &BindingContext,
    path: &str,
    tile_width: i64,
    tile_height: i64,
    options: &ImageOptions,
) -> Result<Array> {
    let bytes = ctx.loader.load_bytes(path)?;
    NativeImage::tiles(&bytes, tile_width, tile_height, options)?
        .into_iter()
        .map(|tile| ImageObject::new_bound(&ctx.registry, tile).map(Dynamic::from))
        .collect()
}

fn draw(
    image: &ImageObject,
    canvas: &CanvasHandle,
    x: &Dynamic,
    y: &Dynamic,
    params: &DrawParams,
) -> Result<()> {
    let native = image.get()?;
    let (x, y) = (number(x)? as f32, number(y)? as f32);
    native.draw(&mut canvas.canvas.lock(), x, y, params);
    Ok(())
}

fn draw_rot(
    image: &ImageObject,
    canvas: &CanvasHandle,
    x: &Dynamic,
    y: &Dynamic,
    angle: &Dynamic,
    options: &Map,
) -> Result<()> {
    let native = image.get()?;
    let params = parse_draw_params(options)?;
    let center_x = options.get("center_x").map(number).transpose()?.unwrap_or(0.5);
    let center_y = options.get("center_y").map(number).transpose()?.unwrap_or(0.5);
    native.draw_rot(
        &mut canvas.canvas.lock(),
        number(x)? as f32,
        number(y)? as f32,
        number(angle)? as f32,
        center_x as f32,
        center_y as f32,
        &params,
    );
    Ok(())
}

/// Installs the `Image` class into `engine`.
pub fn register(engine: &mut Engine, ctx: BindingContext) {
    engine.register_type_with_name::<ImageObject>("Image");

    // ========== CONSTRUCTION ==========
    let c = ctx.clone();
    engine.register_fn("Image", move |path: &str| -> RhaiResult<ImageObject> {
        Ok(load_image(&c, path, &ImageOptions::default())?)
    });

    let c = ctx.clone();
    engine.register_fn(
        "Image",
        move |path: &str, options: Map| -> RhaiResult<ImageObject> {
            let options = parse_image_options(&options)?;
            Ok(load_image(&c, path, &options)?)
        },
    );

    let c = ctx.clone();
    engine.register_fn(
        "image_from_blob",
        move |width: i64, height: i64, rgba: Blob| -> RhaiResult<ImageObject> {
            let image = NativeImage::from_rgba(width, height, &rgba)?;
            Ok(ImageObject::new_bound(&c.registry, image)?)
        },
    );

    let c = ctx.clone();
    engine.register_fn(
        "image_from_text",
        move |text: &str, height: i64| -> RhaiResult<ImageObject> {
            Ok(text_image(&c, text, height, &Map::new())?)
        },
    );

    let c = ctx.clone();
    engine.register_fn(
        "image_from_text",
        move |text: &str, height: i64, options: Map| -> RhaiResult<ImageObject> {
            Ok(text_image(&c, text, height, &options)?)
        },
    );

    let c = ctx.clone();
    engine.register_fn(
        "load_tiles",
        move |path: &str, tile_width: i64, tile_height: i64| -> RhaiResult<Array> {
            Ok(tiles(&c, path, tile_width, tile_height, &ImageOptions::default())?)
        },
    );

    let c = ctx.clone();
    engine.register_fn(
        "load_tiles",
        move |path: &str, tile_width: i64, tile_height: i64, options: Map| -> RhaiResult<Array> {
            let options = parse_image_options(&options)?;
            Ok(tiles(&c, path, tile_width, tile_height, &options)?)
        },
    );

    // ========== QUERIES ==========
    engine.register_get("width", |img: &mut ImageObject| -> RhaiResult<i64> {
        Ok(img.with(|i| i.width() as i64)?)
    });
    engine.register_get("height", |img: &mut ImageObject| -> RhaiResult<i64> {
        Ok(img.with(|i| i.height() as i64)?)
    });
    engine.register_get("tileable", |img: &mut ImageObject| -> RhaiResult<bool> {
        Ok(img.with(NativeImage::tileable)?)
    });
    engine.register_get("retro", |img: &mut ImageObject| -> RhaiResult<bool> {
        Ok(img.with(NativeImage::retro)?)
    });
    engine.register_get("disposed", |img: &mut ImageObject| img.is_disposed());

    // ========== PIXELS ==========
    let c = ctx.clone();
    engine.register_fn(
        "subimage",
        move |img: &mut ImageObject, x: i64, y: i64, w: i64, h: i64| -> RhaiResult<ImageObject> {
            let part = img.get()?.subimage(x, y, w, h)?;
            Ok(ImageObject::new_bound(&c.registry, part)?)
        },
    );

    engine.register_fn("to_blob", |img: &mut ImageObject| -> RhaiResult<Blob> {
        Ok(img.get()?.to_rgba()?)
    });

    engine.register_fn("save", |img: &mut ImageObject, path: &str| -> RhaiResult<()> {
        Ok(img.get()?.save(path)?)
    });

    // Overwrites pixels of this image in place.
    engine.register_fn(
        "insert",
        |img: &mut ImageObject, source: Dynamic, x: i64, y: i64| -> RhaiResult<()> {
            let source = native_image(&source)?;
            let merged = img.get()?.insert(&source, x, y)?;
            img.with_mut(|native| *native = merged)?;
            Ok(())
        },
    );

    // ========== DRAWING ==========
    engine.register_fn(
        "draw",
        |img: &mut ImageObject, canvas: CanvasHandle, x: Dynamic, y: Dynamic| -> RhaiResult<()> {
            Ok(draw(img, &canvas, &x, &y, &DrawParams::default())?)
        },
    );

    // Positional z; typed so it never competes with the options overload.
    engine.register_fn(
        "draw",
        |img: &mut ImageObject,
         canvas: CanvasHandle,
         x: Dynamic,
         y: Dynamic,
         z: i64|
         -> RhaiResult<()> {
            let params = DrawParams {
                z: z as f64,
                ..Default::default()
            };
            Ok(draw(img, &canvas, &x, &y, &params)?)
        },
    );
    engine.register_fn(
        "draw",
        |img: &mut ImageObject,
         canvas: CanvasHandle,
         x: Dynamic,
         y: Dynamic,
         z: f64|
         -> RhaiResult<()> {
            let params = DrawParams {
                z,
                ..Default::default()
            };
            Ok(draw(img, &canvas, &x, &y, &params)?)
        },
    );

    engine.register_fn(
        "draw",
        |img: &mut ImageObject,
         canvas: CanvasHandle,
         x: Dynamic,
         y: Dynamic,
         options: Map|
         -> RhaiResult<()> {
            let params = parse_draw_params(&options)?;
            Ok(draw(img, &canvas, &x, &y, &params)?)
        },
    );

    engine.register_fn(
        "draw_rot",
        |img: &mut ImageObject,
         canvas: CanvasHandle,
         x: Dynamic,
         y: Dynamic,
         angle: Dynamic|
         -> RhaiResult<()> {
            Ok(draw_rot(img, &canvas, &x, &y, &angle, &Map::new())?)
        },
    );

    engine.register_fn(
        "draw_rot",
        |img: &mut ImageObject,
         canvas: CanvasHandle,
         x: Dynamic,
         y: Dynamic,
         angle: Dynamic,
         options: Map|
         -> RhaiResult<()> {
            Ok(draw_rot(img, &canvas, &x, &y, &angle, &options)?)
        },
    );

    // ========== LIFETIME ==========
    engine.register_fn("dispose", |img: &mut ImageObject| img.dispose());

    engine.register_fn("to_string", |img: &mut ImageObject| -> String {
        match img.get() {
            Ok(native) => format!("Image({}x{})", native.width(), native.height()),
            Err(BindingError::UseAfterFree { .. }) => "Image(disposed)".to_string(),
            Err(_) => "Image(?)".to_string(),
        }
    });
    engine.register_fn("to_debug", |img: &mut ImageObject| format!("{img:?}"));
}
