use http::{Method, Request};

const SAMPLE_BYTES: usize = 64;
const SAMPLE_CODE_POINTS: usize = 16;

/// Renders `request` as a paste-ready curl command.
///
/// The canonical template is the single-quote form: `-X {METHOD}` for every
/// method except GET, one `-H 'Name: value'` per header value in the order
/// they were added, `-d '...'` for a non-empty plaintext body (capped at
/// `body_limit` bytes, binary bodies replaced by a placeholder), and the
/// single-quoted URL last.
pub fn to_curl(request: &Request<Vec<u8>>, body_limit: usize) -> String {
    let mut command = String::from("curl");

    if request.method() != Method::GET {
        command.push_str(" -X ");
        command.push_str(request.method().as_str());
    }

    for (name, value) in request.headers() {
        let value = value.to_str().unwrap_or("<binary header value>");
        command.push_str(" -H ");
        command.push_str(&quote(&format!("{}: {value}", canonical_name(name.as_str()))));
    }

    let body = request.body();
    if !body.is_empty() {
        command.push_str(" -d ");
        if is_plaintext(body) {
            // Back the cap off to a UTF-8 boundary so it never splits a
            // code point into a replacement character.
            let mut end = body.len().min(body_limit);
            while end > 0 && end < body.len() && body[end] & 0xC0 == 0x80 {
                end -= 1;
            }
            command.push_str(&quote(&String::from_utf8_lossy(&body[..end])));
        } else {
            command.push_str(&quote(&format!("(binary {}-byte body omitted)", body.len())));
        }
    }

    command.push(' ');
    command.push_str(&quote(&request.uri().to_string()));
    command
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "'\\''"))
}

/// Restores the conventional `Content-Type` casing that [`http`] normalizes
/// away, so transcripts read like hand-written curl.
pub(crate) fn canonical_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut upper_next = true;
    for ch in name.chars() {
        if upper_next {
            canonical.push(ch.to_ascii_uppercase());
        } else {
            canonical.push(ch);
        }
        upper_next = ch == '-';
    }
    canonical
}

/// True if `data` probably contains human readable text.
///
/// Samples up to the first 64 bytes and decodes at most 16 code points,
/// looking for the control characters commonly found in binary file
/// signatures. A truncated or invalid encoding in the sample counts as
/// binary.
pub(crate) fn is_plaintext(data: &[u8]) -> bool {
    let sample = &data[..data.len().min(SAMPLE_BYTES)];
    let Ok(text) = std::str::from_utf8(sample) else {
        return false;
    };
    !text
        .chars()
        .take(SAMPLE_CODE_POINTS)
        .any(|code_point| code_point.is_control() && !code_point.is_whitespace())
}
