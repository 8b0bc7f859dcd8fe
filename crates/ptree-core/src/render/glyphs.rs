//! Line-drawing glyph sets.

use serde::{Deserialize, Serialize};

/// Which family of line-drawing characters to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphStyle {
    /// `-`, `|`, `` ` ``, `+`.
    Ascii,
    /// DEC special graphics, wrapped in charset-switching escapes.
    Vt100,
    /// Unicode box-drawing code points.
    Unicode,
}

impl std::fmt::Display for GlyphStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GlyphStyle::Ascii => write!(f, "ascii"),
            GlyphStyle::Vt100 => write!(f, "vt100"),
            GlyphStyle::Unicode => write!(f, "unicode"),
        }
    }
}

/// The five connector characters the renderer draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyphs {
    pub horizontal: char,
    pub vertical: char,
    pub up_and_right: char,
    pub vertical_and_right: char,
    pub down_and_horizontal: char,
    /// Connectors must be written inside enter/exit graphics escapes.
    pub graphics_mode: bool,
}

impl Glyphs {
    pub const ASCII: Glyphs = Glyphs {
        horizontal: '-',
        vertical: '|',
        up_and_right: '`',
        vertical_and_right: '|',
        down_and_horizontal: '+',
        graphics_mode: false,
    };

    pub const VT100: Glyphs = Glyphs {
        horizontal: 'q',
        vertical: 'x',
        up_and_right: 'm',
        vertical_and_right: 't',
        down_and_horizontal: 'w',
        graphics_mode: true,
    };

    pub const UNICODE: Glyphs = Glyphs {
        horizontal: '\u{2500}',
        vertical: '\u{2502}',
        up_and_right: '\u{2514}',
        vertical_and_right: '\u{251c}',
        down_and_horizontal: '\u{252c}',
        graphics_mode: false,
    };

    pub fn for_style(style: GlyphStyle) -> Glyphs {
        match style {
            GlyphStyle::Ascii => Glyphs::ASCII,
            GlyphStyle::Vt100 => Glyphs::VT100,
            GlyphStyle::Unicode => Glyphs::UNICODE,
        }
    }

    /// Every connector, in a fixed order.
    pub fn connectors(&self) -> [char; 5] {
        [
            self.horizontal,
            self.vertical,
            self.up_and_right,
            self.vertical_and_right,
            self.down_and_horizontal,
        ]
    }
}

/// Choose a glyph style.
///
/// An explicit request wins, except that Unicode degrades to VT100 when the
/// locale cannot carry the Unicode connectors. Without a request, a terminal
/// gets Unicode (or VT100 when it cannot) and anything else gets ASCII.
pub fn select_style(
    requested: Option<GlyphStyle>,
    is_terminal: bool,
    unicode_glyphs: bool,
) -> GlyphStyle {
    let wanted = match requested {
        Some(style) => style,
        None if is_terminal => GlyphStyle::Unicode,
        None => GlyphStyle::Ascii,
    };

    if wanted == GlyphStyle::Unicode && !unicode_glyphs {
        GlyphStyle::Vt100
    } else {
        wanted
    }
}
