//! Aspect-ratio parsing and the sizing hints derived from it.

/// Card size reported when no aspect ratio is configured.
pub const DEFAULT_CARD_SIZE: u32 = 7;

/// Card size reported when the computed size collapses to zero.
pub const MIN_CARD_SIZE: u32 = 3;

/// Height percentage used when the aspect ratio is absent or unusable.
const DEFAULT_PERCENT: f64 = 100.0;

/// A `width : height` ratio such as `16:9`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio {
    pub w: f64,
    pub h: f64,
}

impl AspectRatio {
    /// Parse `"W:H"`, `"WxH"`, or a bare `"W"` (height 1).
    ///
    /// Returns `None` for empty or non-numeric input.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        if input.is_empty() {
            return None;
        }
        let normalized = input.replace(':', "x");
        let mut parts = normalized.split('x');
        let w = parse_number(parts.next()?)?;
        let h = match parts.next() {
            Some(part) => parse_number(part)?,
            None => 1.0,
        };
        Some(Self { w, h })
    }

    /// Height as a percentage of width, rounded to two decimals.
    ///
    /// Returns `None` unless both sides are strictly positive.
    #[must_use]
    pub fn height_percent(self) -> Option<f64> {
        if self.w > 0.0 && self.h > 0.0 {
            format!("{:.2}", 100.0 * self.h / self.w).parse().ok()
        } else {
            None
        }
    }
}

/// Parse the longest numeric prefix of `part`, ignoring trailing garbage
/// (`"16px"` reads as `16`).
///
/// The prefix is an optionally signed decimal with an optional exponent
/// (`"1.5e1"` reads as `15`). An exponent marker without digits is not part
/// of the number (`"2e"` reads as `2`).
fn parse_number(part: &str) -> Option<f64> {
    let trimmed = part.trim_start();
    let end = trimmed
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .map(|(idx, c)| idx + c.len_utf8())
        .last()?;
    (1..=end)
        .rev()
        .find_map(|len| trimmed[..len].parse::<f64>().ok())
}

fn height_percent(aspect_ratio: &str) -> f64 {
    AspectRatio::parse(aspect_ratio)
        .and_then(AspectRatio::height_percent)
        .unwrap_or(DEFAULT_PERCENT)
}

/// Layout sizing hint in grid rows for the given aspect-ratio setting.
///
/// `7` with no aspect ratio, otherwise `1 + floor(percent / 25)`, with `3`
/// standing in for a computation that yields zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn card_size(aspect_ratio: Option<&str>) -> u32 {
    let Some(aspect_ratio) = aspect_ratio.filter(|value| !value.is_empty()) else {
        return DEFAULT_CARD_SIZE;
    };
    let size = 1.0 + (height_percent(aspect_ratio) / 25.0).floor();
    if size >= 1.0 {
        size as u32
    } else {
        MIN_CARD_SIZE
    }
}

/// CSS `padding-bottom` that gives the map container its aspect ratio.
#[must_use]
pub fn padding_bottom(aspect_ratio: Option<&str>) -> String {
    match aspect_ratio
        .and_then(AspectRatio::parse)
        .and_then(AspectRatio::height_percent)
    {
        Some(percent) => format!("{percent:.2}%"),
        None => "100%".to_string(),
    }
}
