//! The `Font` class as scripts see it.

mod common;

use common::Fixture;

#[test]
fn font_properties() {
    let fx = Fixture::new();
    let props = fx
        .runtime
        .eval::<rhai::Array>(
            r#"
            let f = Font(18, #{ bold: true, underline: true });
            [f.height, f.bold, f.italic, f.underline, f.name != ""]
            "#,
        )
        .unwrap();
    assert_eq!(props[0].as_int().unwrap(), 18);
    assert!(props[1].as_bool().unwrap());
    assert!(!props[2].as_bool().unwrap());
    assert!(props[3].as_bool().unwrap());
    assert!(props[4].as_bool().unwrap());
}

#[test]
fn text_width_scales() {
    let fx = Fixture::new();
    let ok = fx
        .runtime
        .eval::<bool>(
            r#"
            let f = Font(20);
            let w = f.text_width("Hello");
            f.text_width("") == 0.0 && (f.text_width("Hello", 2) - w * 2.0).abs() < 0.01
            "#,
        )
        .unwrap();
    assert!(ok);
}

#[test]
fn font_file_errors() {
    let fx = Fixture::new();
    fx.file("broken.ttf", b"nope");

    assert_eq!(
        fx.caught_kind(r#"Font(12, #{ name: "broken.ttf" });"#),
        "NativeOperationError"
    );
    assert_eq!(
        fx.caught_kind(r#"Font(12, #{ name: "missing.ttf" });"#),
        "NativeOperationError"
    );
    assert_eq!(fx.caught_kind("Font(0);"), "NativeOperationError");
    assert_eq!(fx.runtime.registry().stats().allocated, 0);
}

#[test]
fn disposed_font_cannot_draw() {
    let fx = Fixture::new();
    let kind = fx.caught_kind(
        r#"
        let f = Font(12);
        f.dispose();
        f.draw_text(Canvas(10, 10), "x", 0, 0);
        "#,
    );
    assert_eq!(kind, "UseAfterFreeError");
}

#[test]
fn draw_text_queues_until_flush() {
    let fx = Fixture::new();
    let pending = fx
        .runtime
        .eval::<rhai::Array>(
            r#"
            let canvas = Canvas(64, 32);
            let f = Font(16);
            f.draw_text(canvas, "A", 0, 0, #{ color: color::white() });
            f.draw_text_rel(canvas, "B", 32, 16, 0.5, 0.5);
            let before = canvas.pending;
            canvas.flush();
            [before, canvas.pending]
            "#,
        )
        .unwrap();
    assert_eq!(pending[0].as_int().unwrap(), 2);
    assert_eq!(pending[1].as_int().unwrap(), 0);
}

#[test]
fn font_object_feeds_text_images() {
    let fx = Fixture::new();
    let height = fx
        .runtime
        .eval::<i64>(
            r#"
            let f = Font(10, #{ italic: true });
            image_from_text("abc", 30, #{ font: f }).height
            "#,
        )
        .unwrap();
    assert_eq!(height, 30);
}
