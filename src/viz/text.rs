//! Text measurement and wrapping for tick names and legend entries.

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Line height used for stacked label lines.
pub fn line_height_px(font_px: u32) -> i32 {
    font_px as i32 + 2
}

/// Truncate to fit `max_px` and add a single ellipsis if needed.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        if estimate_text_width_px(&format!("{out}…"), font_px) > max_px {
            out.pop();
            break;
        }
    }
    out.push('…');
    out
}

/// Wrap a label on word boundaries to fit `max_px`; single words that are too
/// long on their own are truncated with an ellipsis.
pub fn wrap_text_to_width(text: &str, font_px: u32, max_px: u32) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let candidate = if cur.is_empty() {
            word.to_string()
        } else {
            format!("{cur} {word}")
        };
        if estimate_text_width_px(&candidate, font_px) <= max_px {
            cur = candidate;
            continue;
        }
        if !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
        }
        if estimate_text_width_px(word, font_px) <= max_px {
            cur = word.to_string();
        } else {
            lines.push(truncate_to_width(word, font_px, max_px));
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

/// Pixel height of a wrapped label block (at least one line).
pub fn wrapped_height_px(text: &str, font_px: u32, max_px: u32) -> i32 {
    let n = wrap_text_to_width(text, font_px, max_px).len().max(1);
    n as i32 * line_height_px(font_px)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_words() {
        // 12px font -> 7.2px per char; 60px fits 8 chars
        let lines = wrap_text_to_width("Capital costs total", 12, 60);
        assert_eq!(lines, vec!["Capital", "costs", "total"]);
        assert_eq!(wrapped_height_px("Capital costs total", 12, 60), 3 * 14);
    }

    #[test]
    fn short_text_is_one_line() {
        assert_eq!(wrap_text_to_width("Fuel", 12, 100), vec!["Fuel"]);
        assert_eq!(wrapped_height_px("", 12, 100), 14);
    }

    #[test]
    fn long_words_get_ellipsis() {
        let s = truncate_to_width("Supercalifragilistic", 10, 40);
        assert!(s.ends_with('…'));
        assert!(estimate_text_width_px(&s, 10) <= 40);
    }
}
