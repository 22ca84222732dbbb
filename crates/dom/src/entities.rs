//! Decode a minimal, explicitly limited subset of HTML entities.
//!
//! Named entities decoded: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`,
//! `&nbsp;`. Numeric entities (`&#123;`, `&#x1F4A9;`) decode only when
//! well-formed and semicolon-terminated. Everything else passes through
//! unchanged. Intentionally not HTML5-spec-complete; keep the behavior
//! narrow and stable.

const NAMED: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&apos;", '\''),
    ("&nbsp;", '\u{a0}'),
];

pub(crate) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    'outer: while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        for (name, ch) in NAMED {
            if rest.starts_with(name) {
                out.push(*ch);
                rest = &rest[name.len()..];
                continue 'outer;
            }
        }
        if let Some((ch, len)) = decode_numeric(rest) {
            out.push(ch);
            rest = &rest[len..];
            continue;
        }
        out.push('&');
        rest = &rest[1..];
    }
    out.push_str(rest);
    out
}

/// `rest` starts with `&`. Returns the decoded scalar and the byte length of
/// the entity, or `None` if it is not a well-formed numeric entity.
fn decode_numeric(rest: &str) -> Option<(char, usize)> {
    let body = rest.strip_prefix("&#")?;
    let (digits, radix) = match body.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16),
        None => (body, 10),
    };
    let end = digits.find(';')?;
    // 0x10FFFF needs at most 7 decimal digits; longer runs are malformed.
    if end == 0 || end > 7 {
        return None;
    }
    let value = u32::from_str_radix(&digits[..end], radix).ok()?;
    let ch = char::from_u32(value)?;
    let prefix_len = rest.len() - digits.len();
    Some((ch, prefix_len + end + 1))
}

pub(crate) fn escape_text(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

pub(crate) fn escape_attribute(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
    }

    #[test]
    fn decodes_numeric_entities() {
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
    }

    #[test]
    fn leaves_malformed_entities_alone() {
        assert_eq!(decode_entities("&#;&notanentity; & x"), "&#;&notanentity; & x");
        assert_eq!(decode_entities("&#x110000;"), "&#x110000;");
    }

    #[test]
    fn escape_roundtrips_decoded_text() {
        let mut out = String::new();
        escape_text("a & b <c>", &mut out);
        assert_eq!(decode_entities(&out), "a & b <c>");
    }
}
