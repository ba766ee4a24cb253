//! HTML to plain text conversion.

/// Elements whose content is never visible.
const HIDDEN_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "svg"];

/// Elements that start a new line of text.
const BLOCK_ELEMENTS: [&str; 31] = [
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Visible text and title extracted from an HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub title: Option<String>,
    pub text: String,
}

/// Strip markup from `html`.
///
/// Hidden elements and comments are dropped with their content, block-level
/// tags become line breaks, entities are decoded, whitespace inside each
/// line is collapsed and blank lines are removed.
pub fn extract_text(html: &str) -> PageText {
    // ASCII lowercasing keeps byte offsets aligned with `html`
    let lower = html.to_ascii_lowercase();
    let mut raw = String::with_capacity(html.len());
    let mut title = None;
    let mut pos = 0;

    while let Some(offset) = lower[pos..].find('<') {
        let tag_start = pos + offset;
        raw.push_str(&html[pos..tag_start]);

        if lower[tag_start..].starts_with("<!--") {
            pos = match lower[tag_start..].find("-->") {
                Some(end) => tag_start + end + 3,
                None => html.len(),
            };
            continue;
        }

        let Some(tag_len) = lower[tag_start..].find('>') else {
            pos = html.len();
            break;
        };
        let tag_end = tag_start + tag_len + 1;
        let tag = &lower[tag_start + 1..tag_end - 1];
        let closing = tag.starts_with('/');
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();

        if !closing && (HIDDEN_ELEMENTS.contains(&name.as_str()) || name == "title") {
            let close = format!("</{}", name);
            let (content_end, resume) = match lower[tag_end..].find(&close) {
                Some(rel) => {
                    let close_start = tag_end + rel;
                    let resume = lower[close_start..]
                        .find('>')
                        .map(|gt| close_start + gt + 1)
                        .unwrap_or(html.len());
                    (close_start, resume)
                }
                None => (html.len(), html.len()),
            };
            if name == "title" && title.is_none() {
                let text = collapse(&decode_entities(&html[tag_end..content_end]));
                if !text.is_empty() {
                    title = Some(text);
                }
            }
            pos = resume;
            continue;
        }

        if BLOCK_ELEMENTS.contains(&name.as_str()) {
            raw.push('\n');
        } else if matches!(name.as_str(), "td" | "th") {
            raw.push(' ');
        }
        pos = tag_end;
    }
    raw.push_str(&html[pos.min(html.len())..]);

    let text = decode_entities(&raw)
        .lines()
        .map(collapse)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    PageText { title, text }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode named and numeric character references. Unknown ones are kept.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];

        let decoded = candidate[1..]
            .char_indices()
            .take(10)
            .find(|&(_, c)| c == ';')
            .and_then(|(semi, _)| decode_entity(&candidate[1..1 + semi]).map(|c| (c, semi + 2)));

        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &candidate[consumed..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    let c = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "copy" => '\u{a9}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        _ => return None,
    };
    Some(c)
}
