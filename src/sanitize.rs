//! Allowlist sanitizer for fetched markup fragments.
//!
//! Fragment bodies come from the network and are injected into the page, so
//! they are filtered before storage: only allowlisted elements and attributes
//! survive, event-handler attributes and non-http(s) URL schemes are dropped,
//! and `script`/`style`-like elements are removed together with their text.
//! Text content passes through unchanged.

use crate::page::escape_attr;

const ALLOWED_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "code", "div", "em", "h1", "h2", "h3", "h4", "h5", "h6",
    "hr", "i", "img", "li", "ol", "p", "pre", "s", "small", "span", "strong", "sub", "sup",
    "table", "tbody", "td", "th", "thead", "tr", "u", "ul",
];

/// Elements removed together with everything up to their closing tag
const DROPPED_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "noscript", "object", "embed", "template",
];

const ALLOWED_ATTRS: &[&str] = &[
    "alt", "class", "colspan", "height", "rowspan", "title", "width",
];

struct RawTag {
    name: String,
    closing: bool,
    attrs: Vec<(String, String)>,
    /// Bytes consumed from the input, including the final `>`
    len: usize,
}

/// Filter a markup fragment down to the allowlist.
pub fn sanitize_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        rest = &rest[lt..];

        if rest.starts_with("<!--") {
            rest = match rest.find("-->") {
                Some(end) => &rest[end + 3..],
                None => "",
            };
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            rest = match rest.find('>') {
                Some(end) => &rest[end + 1..],
                None => "",
            };
        } else if let Some(tag) = parse_tag(rest) {
            rest = &rest[tag.len..];
            if tag.closing {
                if ALLOWED_TAGS.contains(&tag.name.as_str()) {
                    out.push_str("</");
                    out.push_str(&tag.name);
                    out.push('>');
                }
            } else if DROPPED_WITH_CONTENT.contains(&tag.name.as_str()) {
                rest = skip_past_closing(rest, &tag.name);
            } else if ALLOWED_TAGS.contains(&tag.name.as_str()) {
                emit_tag(&mut out, &tag);
            }
            // any other tag is dropped while its inner content is kept
        } else {
            // stray `<` that opens no tag
            out.push_str("&lt;");
            rest = &rest[1..];
        }
    }

    out.push_str(rest);
    out
}

fn emit_tag(out: &mut String, tag: &RawTag) {
    out.push('<');
    out.push_str(&tag.name);
    for (name, value) in &tag.attrs {
        if keep_attr(&tag.name, name, value) {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
    }
    out.push('>');
}

fn keep_attr(tag: &str, name: &str, value: &str) -> bool {
    // event handlers never survive, and fetched content must not alias
    // container element ids
    if name.starts_with("on") || name == "id" {
        return false;
    }
    match name {
        "href" => tag == "a" && safe_url(value),
        "src" => tag == "img" && safe_url(value),
        _ => ALLOWED_ATTRS.contains(&name),
    }
}

/// Accept relative URLs and the http / https / mailto schemes.
fn safe_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    // entity escapes could smuggle a scheme past the check below
    if compact.contains("&#") {
        return false;
    }
    match compact.find(':') {
        Some(i) => {
            let scheme = &compact[..i];
            if scheme.contains('/') || scheme.contains('?') || scheme.contains('#') {
                // colon after a path/query/fragment separator is not a scheme
                true
            } else {
                matches!(scheme, "http" | "https" | "mailto")
            }
        }
        None => true,
    }
}

fn parse_tag(input: &str) -> Option<RawTag> {
    let bytes = input.as_bytes();
    debug_assert_eq!(bytes.first(), Some(&b'<'));

    let mut i = 1;
    let closing = bytes.get(i) == Some(&b'/');
    if closing {
        i += 1;
    }

    let name_start = i;
    if !matches!(bytes.get(i), Some(b) if b.is_ascii_alphabetic()) {
        return None;
    }
    while matches!(bytes.get(i), Some(b) if b.is_ascii_alphanumeric()) {
        i += 1;
    }
    let name = input[name_start..i].to_ascii_lowercase();

    let mut attrs = Vec::new();
    loop {
        while matches!(bytes.get(i), Some(b) if b.is_ascii_whitespace() || *b == b'/') {
            i += 1;
        }
        match bytes.get(i) {
            None => return None,
            Some(&b'>') => {
                i += 1;
                break;
            }
            Some(_) => {}
        }

        let attr_start = i;
        while matches!(bytes.get(i), Some(b) if !b.is_ascii_whitespace() && !matches!(*b, b'=' | b'>' | b'/'))
        {
            i += 1;
        }
        if i == attr_start {
            return None;
        }
        let attr_name = input[attr_start..i].to_ascii_lowercase();

        while matches!(bytes.get(i), Some(b) if b.is_ascii_whitespace()) {
            i += 1;
        }
        let mut value = String::new();
        if bytes.get(i) == Some(&b'=') {
            i += 1;
            while matches!(bytes.get(i), Some(b) if b.is_ascii_whitespace()) {
                i += 1;
            }
            match bytes.get(i) {
                Some(&q) if q == b'"' || q == b'\'' => {
                    i += 1;
                    let value_start = i;
                    while matches!(bytes.get(i), Some(b) if *b != q) {
                        i += 1;
                    }
                    if i >= bytes.len() {
                        return None;
                    }
                    value = input[value_start..i].to_string();
                    i += 1;
                }
                _ => {
                    let value_start = i;
                    while matches!(bytes.get(i), Some(b) if !b.is_ascii_whitespace() && *b != b'>')
                    {
                        i += 1;
                    }
                    value = input[value_start..i].to_string();
                }
            }
        }
        attrs.push((attr_name, value));
    }

    Some(RawTag {
        name,
        closing,
        attrs,
        len: i,
    })
}

/// Skip everything up to and including `</name ... >`; drops the remainder
/// when no closing tag exists.
fn skip_past_closing<'a>(input: &'a str, name: &str) -> &'a str {
    let needle = format!("</{name}");
    let haystack = input.to_ascii_lowercase();
    match haystack.find(&needle) {
        Some(pos) => match input[pos..].find('>') {
            Some(gt) => &input[pos + gt + 1..],
            None => "",
        },
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_allowed_markup_through() {
        assert_eq!(sanitize_markup("<b>hi</b>"), "<b>hi</b>");
        assert_eq!(
            sanitize_markup("<ul><li>a</li><li>b</li></ul>"),
            "<ul><li>a</li><li>b</li></ul>"
        );
    }

    #[test]
    fn strips_script_with_its_content() {
        assert_eq!(sanitize_markup("a<script>evil()</script>b"), "ab");
        assert_eq!(sanitize_markup("a<SCRIPT src=x>1</SCRIPT>b"), "ab");
    }

    #[test]
    fn unclosed_script_drops_the_remainder() {
        assert_eq!(sanitize_markup("a<script>evil()"), "a");
    }

    #[test]
    fn drops_event_handler_attributes() {
        assert_eq!(
            sanitize_markup(r#"<b onclick="steal()">hi</b>"#),
            "<b>hi</b>"
        );
    }

    #[test]
    fn drops_id_attributes() {
        assert_eq!(
            sanitize_markup(r#"<div id="widget-7" class="c">x</div>"#),
            r#"<div class="c">x</div>"#
        );
    }

    #[test]
    fn filters_url_schemes() {
        assert_eq!(
            sanitize_markup(r#"<a href="javascript:alert(1)">x</a>"#),
            "<a>x</a>"
        );
        assert_eq!(
            sanitize_markup(r#"<a href="https://example.com/a">x</a>"#),
            r#"<a href="https://example.com/a">x</a>"#
        );
        assert_eq!(sanitize_markup(r#"<a href="/local">x</a>"#), r#"<a href="/local">x</a>"#);
        // whitespace and entity obfuscation
        assert_eq!(
            sanitize_markup("<a href=\"java\tscript:alert(1)\">x</a>"),
            "<a>x</a>"
        );
        assert_eq!(
            sanitize_markup(r#"<a href="&#106;avascript:alert(1)">x</a>"#),
            "<a>x</a>"
        );
    }

    #[test]
    fn keeps_img_attributes_but_not_foreign_src() {
        assert_eq!(
            sanitize_markup(r#"<img src="/a.png" alt="a" width="10">"#),
            r#"<img src="/a.png" alt="a" width="10">"#
        );
        assert_eq!(sanitize_markup(r#"<div src="/a.png">x</div>"#), "<div>x</div>");
    }

    #[test]
    fn unknown_tags_are_dropped_but_content_kept() {
        assert_eq!(sanitize_markup("<blink>hi</blink>"), "hi");
        assert_eq!(sanitize_markup("<form><b>x</b></form>"), "<b>x</b>");
    }

    #[test]
    fn removes_comments_and_doctypes() {
        assert_eq!(sanitize_markup("a<!-- secret -->b"), "ab");
        assert_eq!(sanitize_markup("<!doctype html>x"), "x");
    }

    #[test]
    fn escapes_stray_angle_brackets() {
        assert_eq!(sanitize_markup("a < b"), "a &lt; b");
        assert_eq!(sanitize_markup("1 <3"), "1 &lt;3");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(sanitize_markup("caf\u{e9} &amp; more"), "caf\u{e9} &amp; more");
    }
}
