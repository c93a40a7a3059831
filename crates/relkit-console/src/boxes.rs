//! Box-drawing themes for headers and tree menus

/// Available box-drawing styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxStyle {
    Light,
    #[default]
    Bold,
    Double,
    Rounded,
    Ascii,
}

impl BoxStyle {
    /// Parse a style name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "bold" => Some(Self::Bold),
            "double" => Some(Self::Double),
            "rounded" => Some(Self::Rounded),
            "ascii" => Some(Self::Ascii),
            _ => None,
        }
    }
}

/// Glyphs used to draw one box style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxTheme {
    pub top_left: &'static str,
    pub top_right: &'static str,
    pub horizontal: &'static str,
    pub vertical: &'static str,
    pub bottom_left: &'static str,
    pub bottom_right: &'static str,
    /// Tree middle junction
    pub junction: &'static str,
    /// Tree end
    pub terminator: &'static str,
}

impl BoxTheme {
    #[must_use]
    pub const fn get(style: BoxStyle) -> Self {
        let glyphs = match style {
            BoxStyle::Light => ["┌", "┐", "─", "│", "└", "┘", "├", "└"],
            BoxStyle::Bold => ["┏", "┓", "━", "┃", "┗", "┛", "┣", "┗"],
            BoxStyle::Double => ["╔", "╗", "═", "║", "╚", "╝", "╠", "╚"],
            BoxStyle::Rounded => ["╭", "╮", "─", "│", "╰", "╯", "├", "╰"],
            BoxStyle::Ascii => ["·", "·", "-", "|", "·", "·", "·", "L"],
        };
        Self {
            top_left: glyphs[0],
            top_right: glyphs[1],
            horizontal: glyphs[2],
            vertical: glyphs[3],
            bottom_left: glyphs[4],
            bottom_right: glyphs[5],
            junction: glyphs[6],
            terminator: glyphs[7],
        }
    }
}

impl Default for BoxTheme {
    fn default() -> Self {
        Self::get(BoxStyle::default())
    }
}

/// Layout of a boxed header, see [`Console::print_header`](crate::Console::print_header).
#[derive(Debug, Clone)]
pub struct HeaderOptions {
    /// Printed before the box
    pub pre: String,
    /// Printed after the box
    pub post: String,
    /// Use the tree junction as bottom-left corner so a list can hang below
    pub is_tree: bool,
    /// Padding around the title
    pub fill_char: String,
    pub theme: BoxTheme,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            pre: "\n\n".to_string(),
            post: "\n".to_string(),
            is_tree: false,
            fill_char: "·".to_string(),
            theme: BoxTheme::default(),
        }
    }
}
