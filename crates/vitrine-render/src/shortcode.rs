//! Shortcode expansion — `[model id="42"]` inside arbitrary content.
//!
//! The scanner is deliberately forgiving: `id=42`, `id='42'`, and `id="42"`
//! all work, extra whitespace is tolerated, and anything malformed is left
//! in the content untouched rather than eaten. Expansion is capped so a
//! pathological document cannot fan out into unbounded render work.

/// One parsed shortcode occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Occurrence {
    start: usize,
    end: usize,
    model_id: i64,
}

/// Parse a `[model ...]` tag starting at `start` (which points at `[`).
/// Returns the byte range and model id, or None when malformed.
fn parse_at(content: &str, start: usize) -> Option<Occurrence> {
    let rest = &content[start..];
    let body = rest.strip_prefix("[model")?;

    // Require a boundary after the tag name so "[modeling]" doesn't match
    let mut chars = body.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => {}
        Some(']') => return None, // no id attribute
        _ => return None,
    }

    let close = body.find(']')?;
    let attrs = &body[..close];
    let end = start + "[model".len() + close + 1;

    let id_pos = find_id_attr(attrs)?;
    let after_id = attrs[id_pos + 2..].trim_start();
    let after_eq = after_id.strip_prefix('=')?.trim_start();

    let digits: &str = match after_eq.chars().next()? {
        quote @ ('"' | '\'') => {
            let inner = &after_eq[1..];
            let end_quote = inner.find(quote)?;
            &inner[..end_quote]
        }
        _ => {
            let stop = after_eq
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after_eq.len());
            &after_eq[..stop]
        }
    };

    let model_id = digits.trim().parse::<i64>().ok()?;
    Some(Occurrence { start, end, model_id })
}

/// Locate the `id` attribute within the attribute text. `id` must stand on
/// its own: preceded by the start of the attrs or whitespace, and followed
/// (after optional whitespace) by `=`. Names that merely contain "id", like
/// `vid` or `grid`, don't count.
fn find_id_attr(attrs: &str) -> Option<usize> {
    let mut search = 0;
    while let Some(rel) = attrs[search..].find("id") {
        let pos = search + rel;
        let bounded_before = pos == 0
            || attrs[..pos]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_whitespace());
        let bounded_after = attrs[pos + 2..].trim_start().starts_with('=');
        if bounded_before && bounded_after {
            return Some(pos);
        }
        search = pos + 2;
    }
    None
}

/// Expand every well-formed `[model id="N"]` shortcode in `content` using the
/// supplied renderer, stopping after `max_expansions`. Malformed shortcodes
/// and anything past the cap are left verbatim.
pub fn expand_shortcodes<F>(content: &str, max_expansions: u32, mut render: F) -> String
where
    F: FnMut(i64) -> String,
{
    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;
    let mut expanded = 0u32;

    while let Some(offset) = content[cursor..].find("[model") {
        let start = cursor + offset;

        if expanded >= max_expansions {
            break;
        }

        match parse_at(content, start) {
            Some(occ) => {
                out.push_str(&content[cursor..occ.start]);
                out.push_str(&render(occ.model_id));
                cursor = occ.end;
                expanded += 1;
            }
            None => {
                // Malformed: emit the bracket and keep scanning after it
                out.push_str(&content[cursor..start + 1]);
                cursor = start + 1;
            }
        }
    }

    out.push_str(&content[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(id: i64) -> String {
        format!("<RENDERED:{id}>")
    }

    #[test]
    fn expands_double_quoted_id() {
        let out = expand_shortcodes(r#"before [model id="42"] after"#, 10, render);
        assert_eq!(out, "before <RENDERED:42> after");
    }

    #[test]
    fn expands_single_quoted_and_bare_ids() {
        assert_eq!(expand_shortcodes("[model id='7']", 10, render), "<RENDERED:7>");
        assert_eq!(expand_shortcodes("[model id=7]", 10, render), "<RENDERED:7>");
        assert_eq!(expand_shortcodes("[model  id = 7 ]", 10, render), "<RENDERED:7>");
    }

    #[test]
    fn multiple_shortcodes_expand_in_order() {
        let out = expand_shortcodes(r#"[model id="1"] x [model id="2"]"#, 10, render);
        assert_eq!(out, "<RENDERED:1> x <RENDERED:2>");
    }

    #[test]
    fn malformed_shortcodes_are_left_untouched() {
        for input in [
            "[model]",
            "[model id=]",
            "[model id=\"abc\"]",
            "[model id=\"42\"",  // unterminated
            "[modeling id=\"42\"]",
            "[model foo=\"bar\"]",
        ] {
            assert_eq!(expand_shortcodes(input, 10, render), input, "input: {input}");
        }
    }

    #[test]
    fn id_must_be_a_whole_attribute_name() {
        // Attribute names that merely contain "id" are not the id attribute
        for input in ["[model vid=3]", "[model grid=\"2\"]", "[model uid='9']"] {
            assert_eq!(expand_shortcodes(input, 10, render), input, "input: {input}");
        }
        // But a real id after an unrelated attribute still expands
        assert_eq!(
            expand_shortcodes("[model width=4 id=5]", 10, render),
            "<RENDERED:5>"
        );
    }

    #[test]
    fn expansion_cap_is_respected() {
        let content = r#"[model id="1"][model id="2"][model id="3"]"#;
        let out = expand_shortcodes(content, 2, render);
        assert_eq!(out, r#"<RENDERED:1><RENDERED:2>[model id="3"]"#);
    }

    #[test]
    fn renderer_output_is_not_rescanned() {
        // A renderer returning shortcode-looking text must not recurse
        let out = expand_shortcodes(r#"[model id="1"]"#, 10, |_| "[model id=\"9\"]".to_string());
        assert_eq!(out, "[model id=\"9\"]");
    }

    #[test]
    fn plain_content_passes_through() {
        let content = "no shortcodes here, just [brackets] and text";
        assert_eq!(expand_shortcodes(content, 10, render), content);
    }
}
