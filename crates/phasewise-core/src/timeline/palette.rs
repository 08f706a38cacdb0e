use serde::Serialize;
use std::fmt;

/// Fixed bar colours, assigned by position among the dated phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteColor {
    Blue,
    Green,
    Purple,
    Amber,
    Pink,
    Indigo,
    Cyan,
    Rose,
}

pub const PALETTE: [PaletteColor; 8] = [
    PaletteColor::Blue,
    PaletteColor::Green,
    PaletteColor::Purple,
    PaletteColor::Amber,
    PaletteColor::Pink,
    PaletteColor::Indigo,
    PaletteColor::Cyan,
    PaletteColor::Rose,
];

impl PaletteColor {
    /// Colour for the `position`-th dated phase. Wraps around the palette.
    #[must_use]
    pub const fn for_position(position: usize) -> Self {
        PALETTE[position % PALETTE.len()]
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Purple => "purple",
            Self::Amber => "amber",
            Self::Pink => "pink",
            Self::Indigo => "indigo",
            Self::Cyan => "cyan",
            Self::Rose => "rose",
        }
    }

    /// sRGB hex of the 500 shade, for renderers that draw real colour.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Blue => "#3b82f6",
            Self::Green => "#22c55e",
            Self::Purple => "#a855f7",
            Self::Amber => "#f59e0b",
            Self::Pink => "#ec4899",
            Self::Indigo => "#6366f1",
            Self::Cyan => "#06b6d4",
            Self::Rose => "#f43f5e",
        }
    }

    /// Single-glyph fill used by the text chart.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Blue => '█',
            Self::Green => '▓',
            Self::Purple => '▒',
            Self::Amber => '░',
            Self::Pink => '#',
            Self::Indigo => '=',
            Self::Cyan => '*',
            Self::Rose => '+',
        }
    }
}

impl fmt::Display for PaletteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
