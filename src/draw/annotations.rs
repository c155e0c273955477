use crate::draw::buffer::PixelBuffer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive pixel bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Rect {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}

/// Smallest rectangle covering every pixel with alpha > 0, or `None` for a
/// blank buffer.
pub fn bounding_box_of_non_transparent(buffer: &PixelBuffer) -> Option<Rect> {
    let width = buffer.width() as usize;
    if width == 0 {
        return None;
    }
    let mut bounds: Option<Rect> = None;
    for (row, line) in buffer.pixels().chunks_exact(width * 4).enumerate() {
        for (col, px) in line.chunks_exact(4).enumerate() {
            if px[3] == 0 {
                continue;
            }
            let (x, y) = (col as u32, row as u32);
            bounds = Some(match bounds {
                None => Rect {
                    min_x: x,
                    min_y: y,
                    max_x: x,
                    max_y: y,
                },
                Some(r) => Rect {
                    min_x: r.min_x.min(x),
                    min_y: r.min_y.min(y),
                    max_x: r.max_x.max(x),
                    max_y: r.max_y.max(y),
                },
            });
        }
    }
    bounds
}

/// One entry of a recognizer response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub expr: String,
    pub result: String,
    #[serde(rename = "assign", default)]
    pub is_assignment: bool,
}

impl RecognitionResult {
    pub fn new(expr: impl Into<String>, result: impl Into<String>, is_assignment: bool) -> Self {
        Self {
            expr: expr.into(),
            result: result.into(),
            is_assignment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub expression: String,
    pub answer: String,
}

impl Annotation {
    pub fn display_text(&self) -> String {
        format!("{} = {}", self.expression, self.answer)
    }
}

/// Resolved variables sent back to the recognizer on every run.
pub type VariableTable = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultOverlay {
    variables: VariableTable,
    annotations: Vec<Annotation>,
}

impl ResultOverlay {
    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Records assignments (last write wins) and appends every entry, in
    /// input order, to the annotation list.
    pub fn apply_results(&mut self, results: &[RecognitionResult]) {
        for entry in results {
            if entry.is_assignment {
                self.variables
                    .insert(entry.expr.clone(), parse_number(&entry.result));
            }
            self.annotations.push(Annotation {
                expression: entry.expr.clone(),
                answer: entry.result.clone(),
            });
        }
    }

    pub fn clear(&mut self) {
        self.variables.clear();
        self.annotations.clear();
    }
}

/// Parses the longest leading decimal number, ignoring leading whitespace
/// and trailing garbage (`"3.5 cm"` is 3.5). Yields NaN when no number
/// starts the string.
pub fn parse_number(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    if text[end..].starts_with("Infinity") {
        let sign = if bytes.first() == Some(&b'-') { -1.0 } else { 1.0 };
        return sign * f64::INFINITY;
    }

    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return f64::NAN;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse().unwrap_or(f64::NAN)
}
