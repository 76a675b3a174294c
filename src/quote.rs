//! git's C-style path quoting, as used in diff headers

/// whether git would quote this name (with `core.quotePath` at its default)
pub fn needs_quoting(name: &str) -> bool {
    name.bytes()
        .any(|b| b == b'"' || b == b'\\' || b < 0x20 || b >= 0x7f)
}

/// quote a name the way git does, leaving names that need no quoting untouched
pub fn quote(name: &str) -> String {
    if !needs_quoting(name) {
        return name.to_string();
    }

    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for b in name.bytes() {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\x07' => out.push_str("\\a"),
            b'\x08' => out.push_str("\\b"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            b'\x0b' => out.push_str("\\v"),
            b'\x0c' => out.push_str("\\f"),
            b'\r' => out.push_str("\\r"),
            b if b < 0x20 || b >= 0x7f => out.push_str(&format!("\\{b:03o}")),
            b => out.push(char::from(b)),
        }
    }
    out.push('"');
    out
}

/// undo git's escaping of the text between the quotes
///
/// unknown escapes are kept verbatim so nothing is silently dropped
pub fn unescape(inner: &str) -> String {
    let bytes = inner.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 == bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let next = bytes[i + 1];
        let simple = match next {
            b'a' => Some(b'\x07'),
            b'b' => Some(b'\x08'),
            b't' => Some(b'\t'),
            b'n' => Some(b'\n'),
            b'v' => Some(b'\x0b'),
            b'f' => Some(b'\x0c'),
            b'r' => Some(b'\r'),
            b'"' => Some(b'"'),
            b'\\' => Some(b'\\'),
            _ => None,
        };
        if let Some(b) = simple {
            out.push(b);
            i += 2;
            continue;
        }

        // three-digit octal escape for raw bytes
        let octal = bytes.get(i + 1..i + 4).filter(|digits| {
            digits.iter().all(|d| (b'0'..=b'7').contains(d)) && digits[0] <= b'3'
        });
        if let Some(digits) = octal {
            let value = digits.iter().fold(0u8, |acc, d| acc * 8 + (d - b'0'));
            out.push(value);
            i += 4;
            continue;
        }

        out.push(b'\\');
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}
