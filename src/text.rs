//! Label wrapping by estimated character width.
//!
//! Glyphs are not measured: every character is assumed to be
//! `font_size * char_width_ratio` wide. Labels are centered, so an
//! off-by-one in the line budget is harmless.

pub fn max_chars(max_width: f32, font_size: f32, char_width_ratio: f32) -> usize {
    let char_width = font_size * char_width_ratio;
    if char_width <= 0.0 || max_width <= 0.0 {
        return 0;
    }
    (max_width / char_width).floor() as usize
}

/// Splits `text` into lines that fit `max_width`.
///
/// A label that already fits comes back unchanged as a single line.
/// Otherwise words are packed greedily; a word is never broken, so a word
/// longer than the budget occupies a line of its own.
pub fn wrap_text(text: &str, max_width: f32, font_size: f32, char_width_ratio: f32) -> Vec<String> {
    let limit = max_chars(max_width, font_size, char_width_ratio);
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > limit {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
