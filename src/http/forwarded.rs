//! `Forwarded` header parsing (RFC 7239).
//!
//! Elements are separated by commas and parameters by semicolons; values may
//! be quoted strings with backslash escapes. Separators inside quotes do not
//! split.

/// One hop of a `Forwarded` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardedElement {
    pub by: Option<String>,
    pub for_: Option<String>,
    pub host: Option<String>,
    pub proto: Option<String>,
}

/// Parse a `Forwarded` header value into its elements, nearest client first.
///
/// Unknown parameters and parameters without `=` are ignored. Elements with
/// no recognized parameter are still returned so indices line up with hops.
pub fn parse_forwarded(header: &str) -> Vec<ForwardedElement> {
    split_unquoted(header, ',')
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_element)
        .collect()
}

fn parse_element(part: &str) -> ForwardedElement {
    let mut element = ForwardedElement::default();
    for param in split_unquoted(part, ';') {
        let Some((key, value)) = param.trim().split_once('=') else {
            continue;
        };
        let value = Some(unquote(value.trim()));
        match key.trim().to_ascii_lowercase().as_str() {
            "by" => element.by = value,
            "for" => element.for_ = value,
            "host" => element.host = value,
            "proto" => element.proto = value,
            _ => {}
        }
    }
    element
}

/// Split on `sep` outside of double-quoted strings.
fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            c if c == sep && !quoted => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_element() {
        let elements = parse_forwarded("for=192.0.2.60;proto=http;by=203.0.113.43");
        assert_eq!(
            elements,
            vec![ForwardedElement {
                by: Some("203.0.113.43".into()),
                for_: Some("192.0.2.60".into()),
                host: None,
                proto: Some("http".into()),
            }]
        );
    }

    #[test]
    fn test_multiple_elements_and_case_insensitive_keys() {
        let elements = parse_forwarded("For=192.0.2.43, for=198.51.100.17;HOST=example.com");
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].for_.as_deref(), Some("192.0.2.43"));
        assert_eq!(elements[1].for_.as_deref(), Some("198.51.100.17"));
        assert_eq!(elements[1].host.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_quoted_values() {
        let elements = parse_forwarded(r#"for="[2001:db8:cafe::17]:4711";host="a,b;c""#);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].for_.as_deref(), Some("[2001:db8:cafe::17]:4711"));
        assert_eq!(elements[0].host.as_deref(), Some("a,b;c"));
    }

    #[test]
    fn test_escaped_quote() {
        let elements = parse_forwarded(r#"by="a\"b""#);
        assert_eq!(elements[0].by.as_deref(), Some(r#"a"b"#));
    }

    #[test]
    fn test_empty_and_malformed() {
        assert!(parse_forwarded("").is_empty());
        assert!(parse_forwarded(" , ").is_empty());
        assert_eq!(parse_forwarded("garbage"), vec![ForwardedElement::default()]);
    }
}
