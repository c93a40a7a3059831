//! Display-width aware text helpers

use unicode_width::UnicodeWidthChar;

/// Terminal column width of `text`.
///
/// Wide and fullwidth characters count as 2 columns, combining marks and
/// zero-width format characters as 0. Newlines count as 0 when
/// `ignore_newline` is set and as 1 otherwise; other control characters count
/// as 1.
#[must_use]
pub fn display_width(text: &str, ignore_newline: bool) -> usize {
    text.chars()
        .map(|ch| match ch {
            '\n' if ignore_newline => 0,
            _ => ch.width().unwrap_or(1),
        })
        .sum()
}

/// Uppercase the first character and lowercase the rest.
#[must_use]
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Replace `{name}` placeholders in a single pass.
///
/// Values are inserted verbatim (never re-scanned); unknown placeholders are
/// kept as written.
#[must_use]
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match values.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Render `template`, stretching every `{s}` slot with repetitions of `sep` so
/// the line is `max_width` columns wide.
///
/// Free columns are shared evenly between slots; the remainder of that
/// division is added to every slot, and the final line is then shortened by
/// removing trailing separators (at most 10 times) while it is too wide.
#[must_use]
pub fn fill_template(
    template: &str,
    sep: &str,
    values: &[(&str, &str)],
    max_width: usize,
) -> String {
    let sep = if sep.is_empty() { " " } else { sep };
    let with_fill = |fill: &str| {
        let mut all: Vec<(&str, &str)> = values.to_vec();
        all.push(("s", fill));
        render_template(template, &all)
    };

    let intermediate = with_fill("");
    let slots = template.matches("{s}").count();
    if slots == 0 {
        return intermediate;
    }

    let free = max_width.saturating_sub(display_width(&intermediate, true));
    let sep_width = display_width(sep, false).max(1);
    let count = free / slots / sep_width + free % slots;
    let mut line = with_fill(&sep.repeat(count));

    let mut tries = 0;
    while display_width(&line, true) > max_width && tries < 10 {
        match line.rfind(sep) {
            Some(idx) => line.replace_range(idx..idx + sep.len(), ""),
            None => break,
        }
        tries += 1;
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_width_ascii() {
        assert_eq!(display_width("hello", false), 5);
        assert_eq!(display_width("", false), 0);
    }

    #[test]
    fn test_display_width_wide_and_zero_width() {
        assert_eq!(display_width("日本", false), 4);
        assert_eq!(display_width("🚀", false), 2);
        // e + combining acute accent
        assert_eq!(display_width("e\u{301}", false), 1);
        assert_eq!(display_width("a\u{200d}b", false), 2);
    }

    #[test]
    fn test_display_width_newline_handling() {
        assert_eq!(display_width("ab\n", true), 2);
        assert_eq!(display_width("ab\n", false), 3);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("choose ONE"), "Choose one");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("x"), "X");
    }

    #[test]
    fn test_render_template_single_pass() {
        let rendered = render_template("{a}-{b}-{c}", &[("a", "{b}"), ("b", "2")]);
        assert_eq!(rendered, "{b}-2-{c}");
    }

    #[test]
    fn test_render_template_unclosed_brace() {
        assert_eq!(render_template("x{y", &[("y", "1")]), "x{y");
    }

    #[test]
    fn test_fill_single_slot_reaches_width() {
        let line = fill_template("[{s}]", "-", &[], 10);
        assert_eq!(line, "[--------]");
    }

    #[test]
    fn test_fill_two_slots_even() {
        let line = fill_template("<{s} {m} {s}>", "·", &[("m", "HI")], 20);
        assert_eq!(display_width(&line, true), 20);
        assert_eq!(line, "<······· HI ·······>");
    }

    #[test]
    fn test_fill_two_slots_odd_is_trimmed_back() {
        let line = fill_template("<{s} {m} {s}>", ".", &[("m", "ABC")], 20);
        assert_eq!(display_width(&line, true), 20);
        assert!(line.starts_with("<"));
        assert!(line.ends_with(">"));
    }

    #[test]
    fn test_fill_ignores_trailing_newline() {
        let line = fill_template("{s}\n", "=", &[], 5);
        assert_eq!(line, "=====\n");
    }

    #[test]
    fn test_fill_empty_separator_uses_space() {
        let line = fill_template("a{s}b", "", &[], 6);
        assert_eq!(line, "a    b");
    }

    #[test]
    fn test_fill_without_slots_renders_values() {
        assert_eq!(fill_template("{x}!", "-", &[("x", "ok")], 40), "ok!");
    }

    #[test]
    fn test_fill_content_wider_than_width() {
        let line = fill_template("{s}{m}", "-", &[("m", "0123456789")], 4);
        assert_eq!(line, "0123456789");
    }
}
