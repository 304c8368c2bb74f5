use std::sync::LazyLock;

use regex::Regex;

use crate::models::document::{Category, DocumentFields, Status};

/// Header keys excluded from cleaned bodies. `X-*` headers are matched
/// separately.
const HEADER_KEYS: [&str; 9] = [
    "From:",
    "Subject:",
    "Date:",
    "Organization:",
    "Lines:",
    "Message-ID:",
    "NNTP-Posting-Host:",
    "Reply-To:",
    "Newsgroups:",
];

/// Cleaned bodies shorter than this are dropped.
const MIN_BODY_LEN: usize = 50;

const MAX_SUBJECT_LEN: usize = 500;
const MAX_FALLBACK_TITLE_LEN: usize = 200;

static RE_SUBJECT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(re:\s*)+").expect("subject prefix regex"));
static RE_ANGLE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(.+?)>").expect("angle email regex"));
static RE_WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace run regex"));

/// Subject and author values derived from an article's header block.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Headers {
    pub subject: Option<String>,
    pub author: Option<String>,
}

/// Extract subject and author from raw article text in one pass.
///
/// Subject: repeated `Re:` prefixes stripped case-insensitively, then
/// truncated to 500 characters. Author: `Name <email>` prefers the name;
/// a bare address uses its local part.
pub fn parse_headers(text: &str) -> Headers {
    let mut headers = Headers::default();

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("Subject:") {
            let subject = rest.trim();
            if subject.is_empty() {
                continue;
            }
            let stripped = RE_SUBJECT_PREFIX.replace(subject, "");
            let stripped = stripped.trim();
            if !stripped.is_empty() {
                headers.subject = Some(truncate_chars(stripped, MAX_SUBJECT_LEN));
            }
        } else if let Some(rest) = line.strip_prefix("From:") {
            let author = rest.trim();
            if !author.is_empty() {
                headers.author = parse_author(author);
            }
        }
    }

    headers
}

fn parse_author(raw: &str) -> Option<String> {
    if raw.contains('<') && raw.contains('>') {
        let name = raw.split('<').next().unwrap_or("").trim();
        if !name.is_empty() {
            return Some(name.to_string());
        }
        return RE_ANGLE_EMAIL.captures(raw).map(|captures| {
            let email = &captures[1];
            email.split('@').next().unwrap_or(email).to_string()
        });
    }

    let author = match raw.split_once('@') {
        Some((local, _)) => local,
        None => raw,
    };
    Some(author.to_string())
}

/// Strip header and quoted lines, collapse whitespace runs, and rejoin.
pub fn clean_text(text: &str) -> String {
    let mut cleaned = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_header_line(line, trimmed) || trimmed.starts_with('>') {
            continue;
        }
        cleaned.push(RE_WHITESPACE_RUN.replace_all(trimmed, " ").into_owned());
    }

    cleaned.join("\n")
}

fn is_header_line(line: &str, trimmed: &str) -> bool {
    HEADER_KEYS.iter().any(|header| line.starts_with(header))
        || (trimmed.starts_with("X-") && trimmed.contains(':'))
}

/// The category slug plus its coarse family tag
/// (e.g. `sci.space` → `["sci-space", "science"]`).
pub fn derive_tags(category: Category) -> Vec<String> {
    vec![category.slug(), category.family().to_string()]
}

/// Turn a raw newsgroup article into create-ready document fields.
///
/// Returns `None` when the cleaned body is under 50 characters; such
/// articles are dropped silently rather than surfaced as errors.
pub fn normalize(raw: &str, category: Category) -> Option<DocumentFields> {
    let body = clean_text(raw);
    if body.chars().count() < MIN_BODY_LEN {
        return None;
    }

    let headers = parse_headers(raw);
    let title = headers
        .subject
        .unwrap_or_else(|| fallback_title(&body, category));
    let author = headers.author.unwrap_or_else(|| "Anonymous".to_string());

    Some(DocumentFields {
        title,
        body,
        category,
        tags: derive_tags(category),
        author: Some(author),
        source_url: None,
        status: Status::Active,
    })
}

/// Without a subject, the first two cleaned lines stand in as the title.
fn fallback_title(body: &str, category: Category) -> String {
    let first_lines: Vec<&str> = body.lines().take(2).collect();
    let title = truncate_chars(first_lines.join(" ").trim(), MAX_FALLBACK_TITLE_LEN);
    if title.is_empty() {
        format!("Post from {category}")
    } else {
        title
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
