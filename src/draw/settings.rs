use crate::draw::model::{clamp_line_width, Color, Theme, Tool, ToolState};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RECOGNIZER_URL: &str = "http://localhost:8900";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SurfaceSettings {
    #[serde(default = "default_recognizer_url")]
    pub recognizer_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Cap on entries per history stack; `None` keeps everything.
    #[serde(default)]
    pub history_limit: Option<usize>,
    #[serde(default = "default_tool")]
    pub default_tool: Tool,
    #[serde(default = "default_color")]
    pub default_color: String,
    #[serde(default = "default_width")]
    pub default_width: u32,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default = "default_swatches")]
    pub swatches: Vec<String>,
}

fn default_recognizer_url() -> String {
    DEFAULT_RECOGNIZER_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_tool() -> Tool {
    Tool::Pencil
}

fn default_color() -> String {
    "#ffffff".to_string()
}

fn default_width() -> u32 {
    3
}

fn default_swatches() -> Vec<String> {
    [
        "#ffffff", "#ee3333", "#e64980", "#be4bdb", "#893200", "#228be6", "#3333ee", "#40c057",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            recognizer_url: default_recognizer_url(),
            request_timeout_secs: default_request_timeout_secs(),
            history_limit: None,
            default_tool: default_tool(),
            default_color: default_color(),
            default_width: default_width(),
            theme: Theme::default(),
            debug_logging: false,
            swatches: default_swatches(),
        }
    }
}

impl SurfaceSettings {
    pub fn sanitize(&mut self) {
        self.default_width = clamp_line_width(self.default_width);
        self.request_timeout_secs = self.request_timeout_secs.max(1);
        if Color::from_hex(&self.default_color).is_none() {
            tracing::warn!(color = %self.default_color, "invalid default colour, using white");
            self.default_color = default_color();
        }
        self.swatches.retain(|swatch| Color::from_hex(swatch).is_some());
        if let Some(limit) = self.history_limit.as_mut() {
            *limit = (*limit).max(1);
        }
    }

    pub fn swatch_colors(&self) -> Vec<Color> {
        self.swatches
            .iter()
            .filter_map(|swatch| Color::from_hex(swatch))
            .collect()
    }

    pub fn initial_tool_state(&self) -> ToolState {
        ToolState {
            tool: self.default_tool,
            color: Color::from_hex(&self.default_color).unwrap_or(Color::WHITE),
            width: clamp_line_width(self.default_width),
            theme: self.theme,
        }
    }
}
