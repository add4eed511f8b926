// SPDX-License-Identifier: MIT
use regex::Regex;

/// Deterministic, total, idempotent post-processing of `ai_response`.
/// Applied in exactly the order below; later rules may widen gaps left by
/// earlier ones, and the final newline-collapse absorbs any over-insertion
/// so the whole pipeline is a fixed point after one pass.
pub fn format_output(raw: &str) -> String {
    let s = raw.trim().to_string();
    let s = insert_header_blank_lines(&s);
    let s = insert_bullet_blank_lines(&s);
    let s = space_around_bold(&s);
    let s = split_adjacent_bold(&s);
    collapse_blank_lines(&s)
}

fn is_header_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return false;
    }
    matches!(trimmed.as_bytes().get(hashes), Some(b' ') | Some(b'\t'))
}

/// Rule 2: blank line before and after every Markdown header line.
fn insert_header_blank_lines(s: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in s.split('\n') {
        if is_header_line(line) {
            out.push("");
            out.push(line);
            out.push("");
        } else {
            out.push(line);
        }
    }
    out.join("\n")
}

fn is_bullet_line(line: &str) -> bool {
    line.trim_start().starts_with("- ")
}

/// Rule 3: blank line before a bulleted list item, whether or not it opens
/// with a bold run.
fn insert_bullet_blank_lines(s: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in s.split('\n') {
        if is_bullet_line(line) {
            out.push("");
        }
        out.push(line);
    }
    out.join("\n")
}

/// Rule 4: a bold run must be surrounded by non-newline whitespace. A
/// boundary touching another `*` is left alone — that is rule 5's case, two
/// immediately adjacent bold runs, not a bare word glued to one.
fn space_around_bold(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        if s[i..].starts_with("**") {
            if let Some(rel_close) = s[i + 2..].find("**") {
                let close_start = i + 2 + rel_close;
                let inner = &s[i + 2..close_start];
                if !inner.is_empty() && !inner.contains('\n') {
                    if let Some(prev) = out.chars().last() {
                        if prev != '\n' && prev != '*' && !prev.is_whitespace() {
                            out.push(' ');
                        }
                    }
                    out.push_str("**");
                    out.push_str(inner);
                    out.push_str("**");
                    let after = close_start + 2;
                    if let Some(next) = s[after..].chars().next() {
                        if next != '\n' && next != '*' && !next.is_whitespace() {
                            out.push(' ');
                        }
                    }
                    i = after;
                    continue;
                }
            }
        }
        let ch = s[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

/// Rule 5: two bold runs with no gap at all (`**a****b**`) become separate
/// paragraphs rather than merely spaced.
fn split_adjacent_bold(s: &str) -> String {
    s.replace("****", "**\n\n**")
}

/// Rule 6: collapse 3+ consecutive newlines down to exactly two.
fn collapse_blank_lines(s: &str) -> String {
    let re = Regex::new(r"\n{3,}").unwrap();
    re.replace_all(s, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_outer_whitespace() {
        assert_eq!(format_output("  hi  \n\n"), "hi");
    }

    #[test]
    fn wraps_headers_in_blank_lines() {
        let out = format_output("intro\n## Title\nbody");
        assert_eq!(out, "intro\n\n## Title\n\nbody");
    }

    #[test]
    fn ignores_non_header_hash_runs() {
        let out = format_output("not a #######header");
        assert_eq!(out, "not a #######header");
    }

    #[test]
    fn adds_blank_line_before_bullets() {
        let out = format_output("before\n- one\n- two");
        assert_eq!(out, "before\n\n- one\n\n- two");
    }

    #[test]
    fn adds_blank_line_before_bold_bullets() {
        let out = format_output("before\n- **bold item**");
        assert_eq!(out, "before\n\n- **bold item**");
    }

    #[test]
    fn spaces_bold_run_glued_to_words() {
        let out = format_output("word**bold**word");
        assert_eq!(out, "word **bold** word");
    }

    #[test]
    fn leaves_already_spaced_bold_alone() {
        let out = format_output("word **bold** word");
        assert_eq!(out, "word **bold** word");
    }

    #[test]
    fn splits_adjacent_bold_runs_into_paragraphs() {
        let out = format_output("**a****b**");
        assert_eq!(out, "**a**\n\n**b**");
    }

    #[test]
    fn collapses_long_newline_runs() {
        let out = format_output("a\n\n\n\n\nb");
        assert_eq!(out, "a\n\nb");
    }

    #[test]
    fn format_output_is_idempotent() {
        let inputs = [
            "  # Title\nsome text\n- **item one**\n- item two\n\n\n\nword**bold**glue**again**end",
            "plain text with no markdown at all",
            "**solo**",
        ];
        for input in inputs {
            let once = format_output(input);
            let twice = format_output(&once);
            assert_eq!(once, twice, "not idempotent for input: {input:?}");
        }
    }
}
