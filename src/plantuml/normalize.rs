use crate::xml::sanitize_xml_text;

/// Directives that carry no structure for any dialect.
const IGNORED_PREFIXES: &[&str] = &[
    "skinparam",
    "title ",
    "hide ",
    "show ",
    "left to right direction",
    "top to bottom direction",
    "autonumber",
    "!",
];

/// Remove `'` line comments and `/' … '/` block comments.
///
/// Line structure is kept: every input line yields one trimmed output line,
/// empty when it held only comment text.
pub fn strip_comments(source: &str) -> String {
    let mut out = Vec::new();
    let mut in_block_comment = false;

    for raw in source.lines() {
        let mut line = raw.trim();

        if in_block_comment {
            match line.find("'/") {
                Some(end) => {
                    in_block_comment = false;
                    line = line[end + 2..].trim();
                }
                None => {
                    out.push("");
                    continue;
                }
            }
        }

        if let Some(start) = line.find("/'") {
            match line[start + 2..].find("'/") {
                Some(_) if start > 0 => line = line[..start].trim(),
                Some(end) => line = line[start + 2 + end + 2..].trim(),
                None => {
                    in_block_comment = true;
                    line = line[..start].trim();
                }
            }
        }

        out.push(if line.starts_with('\'') { "" } else { line });
    }

    out.join("\n")
}

/// Split DSL source into trimmed, comment-free, non-empty lines.
///
/// `@start…`/`@end…` markers and comments are dropped along with
/// directives that no parser uses.
pub fn normalize(source: &str) -> Vec<String> {
    strip_comments(source)
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with('@'))
        .filter(|line| !IGNORED_PREFIXES.iter().any(|p| line.starts_with(p)) && *line != "title")
        .map(sanitize_xml_text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize, strip_comments};

    #[test]
    fn strips_markers_comments_and_blank_lines() {
        let src = "@startuml\n  ' a comment\n\n  class A  \nskinparam monochrome true\n@enduml\n";
        assert_eq!(normalize(src), vec!["class A"]);
    }

    #[test]
    fn strips_block_comments() {
        let src = "class A\n/' multi\nline\ncomment '/\nclass B /' inline '/\n/' one '/ class C";
        assert_eq!(normalize(src), vec!["class A", "class B", "class C"]);
    }

    #[test]
    fn keeps_unknown_syntax_for_parsers_to_ignore() {
        assert_eq!(normalize("foo bar baz"), vec!["foo bar baz"]);
    }

    #[test]
    fn strip_comments_keeps_line_count() {
        let src = "a\n' gone\n/' x\ny '/ b\nc";
        assert_eq!(strip_comments(src), "a\n\n\nb\nc");
    }
}
