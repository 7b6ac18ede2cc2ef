use rhai::Dynamic;
use skia_safe::Color;

/// Opaque white, which draws an image untinted.
pub const WHITE: Color = Color::WHITE;

/// Reads a colour given as a `0xAARRGGBB` integer.
pub fn color_from_int(value: i64) -> Option<Color> {
    u32::try_from(value).ok().map(Color::new)
}

/// Helper to parse hex strings like "#RGB", "#RRGGBB" or "#AARRGGBB".
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let r = channel(&hex[0..1])?;
            let g = channel(&hex[1..2])?;
            let b = channel(&hex[2..3])?;
            Some(Color::from_rgb(r * 17, g * 17, b * 17))
        }
        6 => Some(Color::from_rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        8 => Some(Color::from_argb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        )),
        _ => None,
    }
}

/// Accepts either colour form from a script value.
pub fn color_from_dynamic(value: &Dynamic) -> Option<Color> {
    if let Ok(i) = value.as_int() {
        return color_from_int(i);
    }
    value
        .clone()
        .into_string()
        .ok()
        .and_then(|s| parse_hex_color(&s))
}

/// Packs a colour back into the `0xAARRGGBB` integer scripts use.
pub fn color_to_int(color: Color) -> i64 {
    u32::from(color) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(parse_hex_color("#fff"), Some(Color::WHITE));
        assert_eq!(
            parse_hex_color("#FF0000"),
            Some(Color::from_rgb(255, 0, 0))
        );
        assert_eq!(
            parse_hex_color("80ff0000"),
            Some(Color::from_argb(0x80, 0xff, 0, 0))
        );
        assert_eq!(parse_hex_color("#12"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn int_colors_round_trip() {
        let c = color_from_int(0xff_20_40_60).unwrap();
        assert_eq!((c.a(), c.r(), c.g(), c.b()), (0xff, 0x20, 0x40, 0x60));
        assert_eq!(color_to_int(c), 0xff_20_40_60);
        assert_eq!(color_from_int(-1), None);
        assert_eq!(color_from_int(0x1_0000_0000), None);
    }

    #[test]
    fn dynamic_accepts_int_or_string() {
        assert_eq!(
            color_from_dynamic(&Dynamic::from(0xff_00_00_ff_i64)),
            Some(Color::BLUE)
        );
        assert_eq!(
            color_from_dynamic(&Dynamic::from("#00ff00".to_string())),
            Some(Color::GREEN)
        );
        assert_eq!(color_from_dynamic(&Dynamic::from(true)), None);
    }
}
