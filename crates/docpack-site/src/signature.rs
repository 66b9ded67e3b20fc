//! Declaration text normalization for member signatures.

/// Storage and specifier keywords dropped from the front of a signature.
const LEADING_KEYWORDS: &[&str] = &[
    "inline",
    "static",
    "constexpr",
    "consteval",
    "constinit",
    "virtual",
    "friend",
    "extern",
    "volatile",
];

/// Qualifiers dropped after the parameter list and at the end.
const TRAILING_QUALIFIERS: &[&str] = &["const", "noexcept", "override", "final"];

/// Normalize a declaration for display and search.
///
/// Collapses whitespace, strips a run of leading keywords, and strips
/// trailing qualifiers (`const`, `noexcept`, `noexcept(...)`, `override`,
/// `final`) in any order and number, both right after the closing `)` and
/// at the very end before an optional `;`. A trailing `//` comment is kept
/// as written. Idempotent.
pub fn normalize_signature(signature: &str) -> String {
    let collapsed = signature.split_whitespace().collect::<Vec<_>>().join(" ");
    let (code, comment) = split_line_comment(&collapsed);
    let stripped = strip_leading_keywords(code.trim_end());
    let stripped = strip_qualifiers_after_parens(stripped);
    let stripped = strip_trailing_qualifiers(&stripped);
    match comment {
        Some(comment) if stripped.is_empty() => comment.to_owned(),
        Some(comment) => format!("{stripped} {comment}"),
        None => stripped,
    }
}

/// Split off a `//` comment that starts outside any parentheses.
fn split_line_comment(text: &str) -> (&str, Option<&str>) {
    let mut depth = 0usize;
    let mut previous = '\0';
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '/' if previous == '/' && depth == 0 => return (&text[..i - 1], Some(&text[i - 1..])),
            _ => {}
        }
        previous = c;
    }
    (text, None)
}

fn strip_leading_keywords(mut text: &str) -> &str {
    while let Some((word, rest)) = text.split_once(' ') {
        if !LEADING_KEYWORDS.iter().any(|k| word.eq_ignore_ascii_case(k)) {
            break;
        }
        text = rest;
    }
    text
}

/// Length of the qualifier at the start of `text`, if one is there and is
/// followed by a space, `;` or the end.
fn qualifier_prefix(text: &str) -> Option<usize> {
    for qualifier in TRAILING_QUALIFIERS {
        let Some(head) = text.get(..qualifier.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(qualifier) {
            continue;
        }
        let mut len = qualifier.len();
        if *qualifier == "noexcept"
            && let Some(args) = text[len..].strip_prefix('(')
            && let Some(close) = args.find(')')
            && close > 0
        {
            len += close + 2;
        }
        if matches!(text[len..].chars().next(), None | Some(' ' | ';')) {
            return Some(len);
        }
    }
    None
}

/// Remove qualifier runs that directly follow a `)`.
fn strip_qualifiers_after_parens(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(paren) = rest.find(')') {
        out.push_str(&rest[..=paren]);
        rest = &rest[paren + 1..];

        let mut cut = 0;
        loop {
            let Some(after_space) = rest[cut..].strip_prefix(' ') else {
                break;
            };
            let Some(len) = qualifier_prefix(after_space) else {
                break;
            };
            cut += 1 + len;
        }
        rest = &rest[cut..];
    }
    out.push_str(rest);
    out
}

/// Remove qualifier tokens at the end of the text, before an optional `;`,
/// until nothing more comes off.
fn strip_trailing_qualifiers(text: &str) -> String {
    let mut current = text.to_owned();
    loop {
        let next = strip_trailing_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_trailing_once(text: &str) -> String {
    let (mut body, terminator) = match text.strip_suffix(';') {
        Some(body) => (body.trim_end(), ";"),
        None => (text, ""),
    };
    while let Some(shorter) = strip_one_trailing(body) {
        body = shorter;
    }
    format!("{body}{terminator}")
}

fn strip_one_trailing(body: &str) -> Option<&str> {
    let (head, last) = body.rsplit_once(' ')?;
    if head.is_empty() {
        return None;
    }
    let len = qualifier_prefix(last)?;
    (len == last.len()).then(|| head.trim_end())
}
