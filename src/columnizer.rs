use std::sync::LazyLock;

use regex::Regex;

static CONTROL_SEQUENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[.*?m").expect("valid control sequence pattern"));

/// Arrange `strings` in as many columns as fit in `width`, filling each
/// column top to bottom before moving to the next.
///
/// Widths are measured without terminal control sequences, so styled
/// strings line up as if unstyled. A string wider than `width` is emitted
/// unchanged.
pub fn columnize(strings: &[String], width: usize) -> String {
    if strings.is_empty() {
        return String::new();
    }

    let mut layout: Vec<&[String]> = vec![strings];
    loop {
        if layout[0].len() <= 1 {
            break;
        }
        let next_layout = layout_in_columns(strings, layout.len() + 1);
        if layout_width(&next_layout) > width {
            break;
        }
        layout = next_layout;
    }

    let widths = column_widths(&layout);
    let height = layout[0].len();
    let mut rows = Vec::with_capacity(height);
    for row in 0..height {
        let cells: Vec<String> = layout
            .iter()
            .zip(&widths)
            .filter_map(|(column, &column_width)| column.get(row).map(|s| pad(s, column_width)))
            .collect();
        rows.push(format!("  {}", cells.join("  ")));
    }

    let mut out = rows.join("\n");
    out.push('\n');
    out
}

/// Length of `string` once terminal control sequences are removed.
pub fn display_width(string: &str) -> usize {
    CONTROL_SEQUENCE.replace_all(string, "").chars().count()
}

fn layout_in_columns(strings: &[String], num_columns: usize) -> Vec<&[String]> {
    let per_column = strings.len().div_ceil(num_columns);
    (0..num_columns)
        .map(|i| {
            let start = (i * per_column).min(strings.len());
            let end = ((i + 1) * per_column).min(strings.len());
            &strings[start..end]
        })
        .collect()
}

// Every column, including the first, carries a two-character gap.
fn layout_width(layout: &[&[String]]) -> usize {
    column_widths(layout).iter().sum::<usize>() + 2 * layout.len()
}

fn column_widths(layout: &[&[String]]) -> Vec<usize> {
    layout
        .iter()
        .map(|column| column.iter().map(|s| display_width(s)).max().unwrap_or(0))
        .collect()
}

fn pad(string: &str, column_width: usize) -> String {
    let padding = column_width.saturating_sub(display_width(string));
    format!("{string}{}", " ".repeat(padding))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(columnize(&[], 5), "");
    }

    #[test]
    fn fills_as_many_columns_as_fit() {
        let input = strings(&[
            "aaa", "bbb", "ccc", "ddd", "eee", "fff", "ggg", "hhh", "iii", "jjj", "kkk", "lll",
        ]);
        assert_eq!(
            columnize(&input, 20),
            "  aaa  ddd  ggg  jjj\n  bbb  eee  hhh  kkk\n  ccc  fff  iii  lll\n"
        );
    }

    #[test]
    fn single_long_string_is_not_wrapped() {
        assert_eq!(columnize(&strings(&["looooooong"]), 5), "  looooooong\n");
    }

    #[test]
    fn fills_columns_top_to_bottom() {
        let input = strings(&["a", "b", "c", "d", "e"]);
        // two columns need 1 + 1 + 4 = 6; three would need 1 + 1 + 1 + 6 = 9
        assert_eq!(columnize(&input, 8), "  a  d\n  b  e\n  c\n");
    }

    #[test]
    fn single_column_when_nothing_else_fits() {
        let input = strings(&["abc", "def"]);
        assert_eq!(columnize(&input, 9), "  abc\n  def\n");
    }

    #[test]
    fn one_row_when_everything_fits() {
        let input = strings(&["a", "bbb", "cc", "d"]);
        assert_eq!(columnize(&input, 20), "  a  bbb  cc  d\n");
    }

    #[test]
    fn pads_shorter_entries_within_a_column() {
        let input = strings(&["a", "bbbb", "cc", "d"]);
        // two columns: [a, bbbb] and [cc, d]
        assert_eq!(columnize(&input, 12), "  a     cc\n  bbbb  d \n");
    }

    #[test]
    fn ignores_control_sequences_when_measuring() {
        let styled = vec![
            "\x1b[1;32maa\x1b[0m".to_string(),
            "\x1b[1;32mbb\x1b[0m".to_string(),
        ];
        // unstyled, two columns take 2 + 2 + 4 = 8
        assert_eq!(
            columnize(&styled, 8),
            "  \x1b[1;32maa\x1b[0m  \x1b[1;32mbb\x1b[0m\n"
        );
    }

    #[test]
    fn pads_styled_strings_by_display_width() {
        let styled = vec!["\x1b[1mx\x1b[0m".to_string(), "yyy".to_string()];
        assert_eq!(columnize(&styled, 3), "  \x1b[1mx\x1b[0m  \n  yyy\n");
    }

    #[test]
    fn ragged_last_row_has_no_extra_separators() {
        let input = strings(&["a", "b", "c", "d", "e", "f", "g"]);
        // three columns of up to three: [a b c] [d e f] [g]
        assert_eq!(columnize(&input, 9), "  a  d  g\n  b  e\n  c  f\n");
    }

    #[test]
    fn rows_never_exceed_width() {
        let input: Vec<String> = (0..37).map(|i| "x".repeat(i % 7 + 1)).collect();
        for width in 10..60 {
            let out = columnize(&input, width);
            for row in out.lines() {
                assert!(
                    display_width(row) <= width,
                    "row {row:?} exceeds width {width}"
                );
            }
        }
    }

    #[test]
    fn display_width_strips_sgr_sequences() {
        assert_eq!(display_width("\x1b[1;31mprivate\x1b[0m"), 7);
        assert_eq!(display_width("plain"), 5);
        assert_eq!(display_width("ünïcode"), 7);
    }
}
