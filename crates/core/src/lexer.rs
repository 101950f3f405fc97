//! Character-level scanning for rule scripts: comment removal and
//! dotted-identifier extraction.
//!
//! Neither function ever fails. An unterminated block comment is left in
//! the text untouched.

/// Remove `/* ... */` block comments (non-greedy, may span lines), then
/// `// ...` line comments, from the whole source.
pub fn strip_comments(src: &str) -> String {
    strip_line_comments(&strip_block_comments(src))
}

fn strip_block_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(open) = rest.find("/*") {
        let Some(close) = rest[open + 2..].find("*/") else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &rest[open + 2 + close + 2..];
    }
    out.push_str(rest);
    out
}

fn strip_line_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(start) = rest.find("//") {
        out.push_str(&rest[..start]);
        match rest[start..].find('\n') {
            Some(nl) => rest = &rest[start + nl..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Extract every dotted identifier (`a`, `order.total`, `_x.y_2`) from a line.
///
/// A token must begin on a word boundary with a letter or underscore; a
/// word run starting with a digit (`3rd`, `1e5`) yields nothing. Keywords
/// are returned too -- filtering is the caller's business.
pub fn identifiers(line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut idents = Vec::new();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        if !is_word_char(c) {
            pos += 1;
            continue;
        }

        // Word run that cannot start an identifier: skip all of it.
        if !is_ident_start(c) {
            while pos < chars.len() && is_word_char(chars[pos]) {
                pos += 1;
            }
            continue;
        }

        let start = pos;
        while pos < chars.len() && is_word_char(chars[pos]) {
            pos += 1;
        }
        // Dotted continuation segments.
        while pos + 1 < chars.len() && chars[pos] == '.' && is_ident_start(chars[pos + 1]) {
            pos += 1;
            while pos < chars.len() && is_word_char(chars[pos]) {
                pos += 1;
            }
        }
        idents.push(chars[start..pos].iter().collect());
    }

    idents
}
