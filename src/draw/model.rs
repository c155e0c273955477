use serde::{Deserialize, Serialize};

pub const MIN_LINE_WIDTH: u32 = 1;
pub const MAX_LINE_WIDTH: u32 = 30;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Pencil,
    Brush,
    Eraser,
    Fill,
}

impl Tool {
    pub fn is_freehand(self) -> bool {
        !matches!(self, Tool::Fill)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_rgba_array(color: [u8; 4]) -> Self {
        Self::rgba(color[0], color[1], color[2], color[3])
    }

    /// Parses `#rgb` or `#rrggbb`. Parsed colours are always opaque.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#')?;
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return None,
        };
        let value = u32::from_str_radix(&expanded, 16).ok()?;
        Some(Self::rgb(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        ))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Colour the eraser paints with.
    pub fn background(self) -> Color {
        match self {
            Theme::Light => Color::WHITE,
            Theme::Dark => Color::rgb(0x22, 0x22, 0x22),
        }
    }
}

/// A pointer sample in logical (pre device-pixel-ratio) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Active tool selection. Handlers build a new value instead of mutating
/// shared state, so drawing code only ever sees what it is handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolState {
    pub tool: Tool,
    pub color: Color,
    pub width: u32,
    pub theme: Theme,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            tool: Tool::Pencil,
            color: Color::WHITE,
            width: 3,
            theme: Theme::Light,
        }
    }
}

impl ToolState {
    pub fn with_tool(self, tool: Tool) -> Self {
        Self { tool, ..self }
    }

    pub fn with_color(self, color: Color) -> Self {
        Self { color, ..self }
    }

    pub fn with_width(self, width: u32) -> Self {
        Self {
            width: clamp_line_width(width),
            ..self
        }
    }

    pub fn with_theme(self, theme: Theme) -> Self {
        Self { theme, ..self }
    }

    /// Logical stroke width after the per-tool multiplier. The base width is
    /// clamped again since the field can be set without `with_width`.
    pub fn effective_width(&self) -> u32 {
        let width = clamp_line_width(self.width);
        match self.tool {
            Tool::Brush => width.saturating_mul(2),
            Tool::Pencil | Tool::Eraser | Tool::Fill => width,
        }
    }

    pub fn effective_color(&self) -> Color {
        match self.tool {
            Tool::Eraser => self.theme.background(),
            Tool::Pencil | Tool::Brush | Tool::Fill => self.color,
        }
    }
}

pub fn clamp_line_width(width: u32) -> u32 {
    width.clamp(MIN_LINE_WIDTH, MAX_LINE_WIDTH)
}
