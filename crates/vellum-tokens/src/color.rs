//! Fail-soft HSL <-> hex conversion.
//!
//! Token values are stored as bare HSL triples (`"225 27% 15%"`), while color
//! pickers speak 6-digit hex. These helpers convert between the two and never
//! fail: unparseable input degrades to black and logs, because a bad color in
//! an editor field must not take the session down.
//!
//! Round trips are stable to within one unit per 8-bit channel. They are not
//! bit-exact, and nothing downstream assumes they are.

use tracing::warn;

const HEX_FALLBACK: &str = "#000000";
const HSL_FALLBACK: &str = "hsl(0, 0%, 0%)";

/// Converts an HSL triple to a lowercase `#rrggbb` string.
///
/// Accepts bare (`"225 27% 15%"`), comma-separated (`"225, 27%, 15%"`), and
/// `hsl(...)`-wrapped forms; the `%` signs are optional. Returns `"#000000"`
/// when the input cannot be parsed.
pub fn hsl_to_hex(hsl: &str) -> String {
    let Some((h, s, l)) = parse_hsl(hsl) else {
        warn!(input = %hsl, "unparseable HSL value, falling back to black");
        return HEX_FALLBACK.to_string();
    };

    let s = s / 100.0;
    let l = l / 100.0;

    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let h = h / 360.0;
        (
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
        )
    };

    format!(
        "#{:02x}{:02x}{:02x}",
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8
    )
}

/// Converts a 6-digit hex color to the comma form `hsl(h, s%, l%)`.
///
/// The leading `#` is optional. Hue, saturation, and lightness are rounded to
/// integers. Returns `"hsl(0, 0%, 0%)"` when the input cannot be parsed.
pub fn hex_to_hsl(hex: &str) -> String {
    let Some((r, g, b)) = parse_hex(hex) else {
        warn!(input = %hex, "unparseable hex color, falling back to black");
        return HSL_FALLBACK.to_string();
    };

    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    let (h, s) = if (max - min).abs() < f64::EPSILON {
        (0.0, 0.0)
    } else {
        let d = max - min;
        let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
        let h = if (max - r).abs() < f64::EPSILON {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if (max - g).abs() < f64::EPSILON {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (h / 6.0, s)
    };

    format!(
        "hsl({}, {}%, {}%)",
        (h * 360.0).round(),
        (s * 100.0).round(),
        (l * 100.0).round()
    )
}

/// One HSL-to-RGB channel segment.
fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

fn parse_hsl(input: &str) -> Option<(f64, f64, f64)> {
    let mut body = input.trim();
    if let Some(rest) = strip_prefix_ci(body, "hsl(") {
        body = rest.strip_suffix(')')?;
    }

    let cleaned = body.replace(',', " ");
    let mut parts = cleaned.split_whitespace();
    let h = parse_component(parts.next()?)?;
    let s = parse_component(parts.next()?)?;
    let l = parse_component(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }

    Some((h.rem_euclid(360.0), s.clamp(0.0, 100.0), l.clamp(0.0, 100.0)))
}

fn parse_component(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim_end_matches('%').parse().ok()?;
    value.is_finite().then_some(value)
}

fn parse_hex(input: &str) -> Option<(u8, u8, u8)> {
    let digits = input.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some((
        u8::from_str_radix(&digits[0..2], 16).ok()?,
        u8::from_str_radix(&digits[2..4], 16).ok()?,
        u8::from_str_radix(&digits[4..6], 16).ok()?,
    ))
}

fn strip_prefix_ci<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    if input.len() >= prefix.len() && input[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&input[prefix.len()..])
    } else {
        None
    }
}
