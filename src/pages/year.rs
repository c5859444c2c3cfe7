//! Footer year stamping.
//!
//! Pages mark their copyright year with `class="year"`. The server fills
//! those elements in on every HTML response, so the markup never goes stale.

pub const YEAR_CLASS: &str = "year";

#[must_use]
pub fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}

/// Replace the text of every element carrying the `year` class with `year`.
///
/// Only the text up to the element's first child tag is replaced, which is
/// all a year marker ever holds. Running it twice changes nothing.
#[must_use]
pub fn stamp_year(html: &str, year: i32) -> String {
    let year = year.to_string();
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        let Some(len) = rest[open..].find('>') else {
            break;
        };
        let tag_end = open + len + 1;
        let tag = &rest[open..tag_end];
        out.push_str(&rest[..tag_end]);
        rest = &rest[tag_end..];

        if is_year_marker(tag) {
            let text_end = rest.find('<').unwrap_or(rest.len());
            out.push_str(&year);
            rest = &rest[text_end..];
        }
    }
    out.push_str(rest);
    out
}

fn is_year_marker(tag: &str) -> bool {
    if tag.starts_with("</") || tag.starts_with("<!") || tag.ends_with("/>") {
        return false;
    }
    attribute(tag, "class").is_some_and(|classes| classes.split_whitespace().any(|c| c == YEAR_CLASS))
}

/// Value of attribute `name` in a start tag, quoted or bare.
fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let bytes = tag.as_bytes();
    let mut search_from = 0;

    while let Some(found) = find_ignore_ascii_case(&tag[search_from..], name) {
        let start = search_from + found;
        let mut i = start + name.len();
        search_from = i;

        // Must be a whole attribute name: preceded by whitespace.
        if start == 0 || !bytes[start - 1].is_ascii_whitespace() {
            continue;
        }
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        return match bytes.get(i).copied() {
            Some(quote @ (b'"' | b'\'')) => {
                let value_start = i + 1;
                let value_len = tag[value_start..].find(char::from(quote))?;
                Some(&tag[value_start..value_start + value_len])
            }
            Some(_) => {
                let value_len = tag[i..]
                    .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
                    .unwrap_or(tag.len() - i);
                Some(&tag[i..i + value_len])
            }
            None => None,
        };
    }
    None
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
#[path = "year_test.rs"]
mod tests;
