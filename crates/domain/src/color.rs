//! Palette colors used for markers and paths.

use std::fmt;

use serde::Serialize;

/// Fixed palette, indexed cyclically.
pub const PALETTE: [&str; 54] = [
    "#44739e", "#984ea3", "#00d2d5", "#ff7f00", "#af8d00", "#7f80cd", "#b3e900", "#c42e60",
    "#a65628", "#f781bf", "#8dd3c7", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#fccde5",
    "#bc80bd", "#ffed6f", "#c4eaff", "#cf8c00", "#1b9e77", "#d95f02", "#e7298a", "#e6ab02",
    "#a6761d", "#0097ff", "#00d067", "#f43600", "#4ba93b", "#5779bb", "#927acc", "#97ee3f",
    "#bf3947", "#9f5b00", "#f48758", "#8caed6", "#f2b94f", "#eff26e", "#e43872", "#d9b100",
    "#9d7a00", "#698cff", "#d9d9d9", "#00d27e", "#d06800", "#009f82", "#c49200", "#cbe8ff",
    "#fecddf", "#c27eb6", "#8cd2ce", "#c4b8d9", "#f883b0", "#a49100",
];

/// An opaque color token (a CSS hex color).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Color(&'static str);

impl Color {
    /// Palette color at `index`, wrapping around the palette length.
    #[must_use]
    pub fn by_index(index: usize) -> Self {
        Self(PALETTE[index % PALETTE.len()])
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_wrap_around_palette() {
        assert_eq!(Color::by_index(0), Color::by_index(PALETTE.len()));
        assert_eq!(Color::by_index(3), Color::by_index(PALETTE.len() + 3));
    }

    #[test]
    fn should_have_distinct_palette_entries() {
        let mut seen = std::collections::HashSet::new();
        for color in PALETTE {
            assert!(seen.insert(color), "{color} is duplicated");
        }
    }
}
