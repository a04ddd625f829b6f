use regex::Regex;
use std::sync::OnceLock;

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"))
}

fn italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*(.*?)\*").expect("valid italic regex"))
}

fn line_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid line break regex"))
}

/// Turns message content into plain display lines.
///
/// Emphasis markers are removed rather than styled, and `<br>` markup becomes a line break.
/// Bold is stripped before italic so `**x**` never leaves stray asterisks.
pub fn render_content(content: &str) -> Vec<String> {
    let out = bold_re().replace_all(content, "$1");
    let out = italic_re().replace_all(&out, "$1");
    let out = line_break_re().replace_all(&out, "\n");

    out.split('\n')
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}
