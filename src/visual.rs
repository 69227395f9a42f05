// src/visual.rs
//
// Caption layout and the drawtext filters that put it on screen.

use crate::types::{RenderSpec, TextAlign};
use crate::utils::escape_filter_value;

pub const MIN_FONT_SIZE: u32 = 16;
const FONT_STEP: u32 = 2;
// Average glyph advance relative to the font size, for a proportional sans face.
const GLYPH_ADVANCE: f64 = 0.55;
const MARGIN_PERCENT: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionLayout {
    pub lines: Vec<String>,
    pub font_size: u32,
    pub line_height: u32,
    pub margin_x: u32,
    /// y of the first line's top edge
    pub top: u32,
}

impl CaptionLayout {
    pub fn block_height(&self) -> u32 {
        self.lines.len() as u32 * self.line_height
    }

    /// Indices and text of the lines that actually draw something.
    pub fn visible_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| (i, line.as_str()))
    }
}

fn line_height_for(font_size: u32) -> u32 {
    font_size * 6 / 5
}

pub fn chars_per_line(usable_width: u32, font_size: u32) -> usize {
    let advance = font_size as f64 * GLYPH_ADVANCE;
    ((usable_width as f64 / advance).floor() as usize).max(1)
}

/// Greedy word wrap. Explicit newlines are kept, words longer than a line are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > max_chars {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
            if needed > max_chars && current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += word.len();
            current.extend(word);
        }

        // blank paragraphs survive as empty lines
        if current_len > 0 || paragraph.trim().is_empty() {
            lines.push(current);
        }
    }

    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines
}

/// Lay the text out inside the frame, shrinking the font until the block fits vertically.
pub fn layout_caption(spec: &RenderSpec) -> CaptionLayout {
    let margin_x = spec.width * MARGIN_PERCENT / 100;
    let margin_y = spec.height * MARGIN_PERCENT / 100;
    let usable_width = spec.width.saturating_sub(2 * margin_x).max(1);
    let usable_height = spec.height.saturating_sub(2 * margin_y).max(1);

    let mut font_size = spec.font_size.max(1);
    loop {
        let lines = if spec.caption {
            wrap_text(&spec.text, chars_per_line(usable_width, font_size))
        } else {
            spec.text.lines().map(str::to_string).collect()
        };
        let line_height = line_height_for(font_size);
        let block_height = lines.len() as u32 * line_height;

        let fits = block_height <= usable_height;
        if fits || !spec.caption || font_size <= MIN_FONT_SIZE {
            let top = spec.height.saturating_sub(block_height) / 2;
            return CaptionLayout {
                lines,
                font_size,
                line_height,
                margin_x,
                top,
            };
        }

        font_size = font_size.saturating_sub(FONT_STEP).max(MIN_FONT_SIZE);
    }
}

pub fn line_file_name(index: usize) -> String {
    format!("line_{:03}.txt", index)
}

fn x_expression(align: TextAlign, margin_x: u32) -> String {
    match align {
        TextAlign::Left => margin_x.to_string(),
        TextAlign::Center => "(w-text_w)/2".to_string(),
        TextAlign::Right => format!("w-text_w-{}", margin_x),
    }
}

/// One drawtext per visible line, each reading its text from `line_file_name(i)`
/// relative to FFmpeg's working directory, so script text never needs escaping.
pub fn build_caption_filter(
    layout: &CaptionLayout,
    spec: &RenderSpec,
    font_file: Option<&str>,
) -> String {
    let x = x_expression(spec.align, layout.margin_x);
    let font = font_file
        .map(|f| format!(":fontfile={}", escape_filter_value(f)))
        .unwrap_or_default();

    let filters: Vec<String> = layout
        .visible_lines()
        .map(|(i, _)| {
            let y = layout.top + i as u32 * layout.line_height;
            format!(
                "drawtext=textfile={}:expansion=none{}:fontcolor={}:fontsize={}:x={}:y={}",
                line_file_name(i),
                font,
                spec.font_color,
                layout.font_size,
                x,
                y
            )
        })
        .collect();

    if filters.is_empty() {
        // nothing to draw; keep the stream untouched
        "null".to_string()
    } else {
        filters.join(",")
    }
}
