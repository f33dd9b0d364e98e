use crate::{curl, error_trace, EntryLevelData, Logbook, LogbookExt, Severity};
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, Request, Response, Uri};
use std::io;
use std::time::{Duration, Instant};

/// Default cap on the number of body bytes embedded in a curl transcript.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Executes one outbound HTTP call.
///
/// The crate's whole view of the network: the interceptor hands the request
/// to a `Transport` and reads the response or error back. Implemented for
/// any matching `FnMut` closure, which is also how tests fake a server.
pub trait Transport {
    fn proceed(&mut self, request: &Request<Vec<u8>>) -> io::Result<Response<Vec<u8>>>;
}

impl<F> Transport for F
where
    F: FnMut(&Request<Vec<u8>>) -> io::Result<Response<Vec<u8>>>,
{
    fn proceed(&mut self, request: &Request<Vec<u8>>) -> io::Result<Response<Vec<u8>>> {
        self(request)
    }
}

/// Wraps call execution with a write-now-enrich-later transcript.
///
/// When the configured level passes the logbook's threshold, one entry is
/// written before the call (curl transcript plus request dump) and then
/// mutated with the outcome: severity escalated by status class, status code
/// prepended to the title, response or failure appended to the details.
/// Below the threshold the call is executed directly with no logging
/// overhead. The wrapped call's result is never altered, and its
/// cancellation or timeout semantics stay with the transport.
pub struct HttpInterceptor<L> {
    logbook: L,
    level: Severity,
    body_limit: usize,
}

impl<L: Logbook> HttpInterceptor<L> {
    pub fn new(logbook: L, level: Severity) -> HttpInterceptor<L> {
        HttpInterceptor {
            logbook,
            level,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Changes the curl transcript's body byte cap.
    pub fn with_body_limit(mut self, body_limit: usize) -> HttpInterceptor<L> {
        self.body_limit = body_limit;
        self
    }

    /// Executes `request` through `transport`, logging around it.
    ///
    /// Errors are re-raised unchanged after best-effort logging; the
    /// interceptor never swallows a failure and never adds one of its own.
    pub fn intercept<T: Transport>(
        &self,
        request: Request<Vec<u8>>,
        transport: &mut T,
    ) -> io::Result<Response<Vec<u8>>> {
        if !self.logbook.check_level(self.level) {
            return transport.proceed(&request);
        }

        let title = format!("HTTP: {} {}", request.method(), request.uri());
        let curl = curl::to_curl(&request, self.body_limit);
        let id = self.logbook.log_instant(
            Severity::Info,
            &format!("--- {title}"),
            &format!("CURL:\n{curl}\n\n\n"),
        );
        self.logbook
            .append_log_instant(id, &format!("REQUEST:\n{}\n\n", render_request(&request)));

        let start = Instant::now();
        match transport.proceed(&request) {
            Ok(response) => {
                let level = match response.status().as_u16() {
                    200..=299 => Severity::Info,
                    400..=499 => Severity::Warn,
                    _ => Severity::Error,
                };
                self.logbook.set_severity_instant(id, level);
                let code = response.status().as_u16();
                self.logbook.update_log_instant(id, &|entry| EntryLevelData {
                    title: format!("{code} {title}"),
                    ..entry
                });
                self.logbook.append_log_instant(
                    id,
                    &format!(
                        "RESPONSE:\n{}\n",
                        render_response(&response, request.uri(), start.elapsed())
                    ),
                );
                self.logbook.append_log_instant(
                    id,
                    &format!("BODY:\n{}\n\n", render_response_body(&response)),
                );
                Ok(response)
            }
            Err(error) => {
                if is_interrupted(&error) {
                    self.logbook.update_log_instant(id, &|entry| EntryLevelData {
                        title: format!("WWW {title}"),
                        ..entry
                    });
                    self.logbook.set_severity_instant(id, Severity::Warn);
                    self.logbook.append_log_instant(
                        id,
                        &format!("REQUEST INTERRUPTED:\n{}\n\n\n", error_trace(&error)),
                    );
                } else {
                    self.logbook.update_log_instant(id, &|entry| EntryLevelData {
                        title: format!("EEE {title}"),
                        ..entry
                    });
                    self.logbook.set_severity_instant(id, Severity::Error);
                    self.logbook.append_log_instant(
                        id,
                        &format!("NETWORK EXCEPTION:\n{}\n\n\n", error_trace(&error)),
                    );
                }
                Err(error)
            }
        }
    }
}

fn is_interrupted(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

fn render_request(request: &Request<Vec<u8>>) -> String {
    let mut text = format!("{} {}\n", request.method(), request.uri());
    let headers = request.headers();
    let body = request.body();

    if !body.is_empty() {
        // Render the body headers explicitly so their values are known even
        // when the caller relies on the transport to fill them in.
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("<not specified>");
        text.push_str(&format!("Content-Type: {content_type}\n"));
        text.push_str(&format!("Content-Length: {}\n", body.len()));
    }

    for (name, value) in headers {
        if *name == CONTENT_TYPE || *name == CONTENT_LENGTH {
            continue;
        }
        let value = value.to_str().unwrap_or("<binary header value>");
        text.push_str(&format!("{}: {value}\n", curl::canonical_name(name.as_str())));
    }

    if body.is_empty() {
        text.push_str("(no body)\n");
    } else if body_encoded(headers) {
        text.push_str("(encoded body omitted)\n");
    } else if !curl::is_plaintext(body) {
        text.push_str(&format!("(binary {}-byte body omitted)\n", body.len()));
    } else {
        text.push('\n');
        text.push_str(&String::from_utf8_lossy(body));
        text.push_str(&format!("({}-byte body)\n", body.len()));
    }
    text
}

fn render_response(response: &Response<Vec<u8>>, uri: &Uri, elapsed: Duration) -> String {
    let status = response.status();
    let reason = status.canonical_reason().unwrap_or("");
    let separator = if reason.is_empty() { "" } else { " " };
    let mut text = format!(
        "{}{separator}{reason} {uri} ({}ms)\n",
        status.as_u16(),
        elapsed.as_millis()
    );
    for (name, value) in response.headers() {
        let value = value.to_str().unwrap_or("<binary header value>");
        text.push_str(&format!("{}: {value}\n", curl::canonical_name(name.as_str())));
    }
    text
}

fn render_response_body(response: &Response<Vec<u8>>) -> String {
    let body = response.body();
    if body.is_empty() {
        return "(no body)\n".to_string();
    }
    if body_encoded(response.headers()) {
        return "(encoded body omitted)\n".to_string();
    }
    if !curl::is_plaintext(body) {
        return format!("(binary {}-byte body omitted)\n", body.len());
    }

    let text = String::from_utf8_lossy(body).into_owned();
    let formatted = if is_json(response.headers()) {
        pretty_json(&text).unwrap_or(text)
    } else {
        text
    };
    format!("{formatted}\n({}-byte body)\n", body.len())
}

fn body_encoded(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .map(|encoding| !encoding.eq_ignore_ascii_case("identity"))
        .unwrap_or(false)
}

// Unparseable JSON falls back to the raw text unmodified.
fn pretty_json(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|content_type| {
            let media_type = content_type.split(';').next().unwrap_or("").trim();
            media_type.eq_ignore_ascii_case("application/json")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_media_type_detection_ignores_parameters() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));

        headers.insert(CONTENT_TYPE, "application/json".parse().unwrap());
        assert!(is_json(&headers));

        headers.insert(
            CONTENT_TYPE,
            "Application/JSON; charset=utf-8".parse().unwrap(),
        );
        assert!(is_json(&headers));

        headers.insert(CONTENT_TYPE, "text/html".parse().unwrap());
        assert!(!is_json(&headers));
    }

    #[test]
    fn request_dump_lists_body_headers_first() {
        let request = Request::builder()
            .method(http::Method::POST)
            .uri("https://example.com/a")
            .header("Accept", "*/*")
            .header(CONTENT_TYPE, "text/plain")
            .body(b"hi".to_vec())
            .unwrap();

        let text = render_request(&request);
        assert_eq!(
            text,
            "POST https://example.com/a\n\
             Content-Type: text/plain\n\
             Content-Length: 2\n\
             Accept: */*\n\
             \nhi(2-byte body)\n"
        );
    }

    #[test]
    fn request_dump_without_body() {
        let request = Request::builder()
            .uri("https://example.com/a")
            .body(Vec::new())
            .unwrap();

        assert_eq!(
            render_request(&request),
            "GET https://example.com/a\n(no body)\n"
        );
    }

    #[test]
    fn encoded_request_body_is_omitted() {
        let request = Request::builder()
            .method(http::Method::POST)
            .uri("https://example.com/a")
            .header(CONTENT_ENCODING, "gzip")
            .body(b"compressed".to_vec())
            .unwrap();

        assert!(render_request(&request).contains("(encoded body omitted)\n"));
    }

    #[test]
    fn identity_encoding_is_not_treated_as_encoded() {
        let request = Request::builder()
            .method(http::Method::POST)
            .uri("https://example.com/a")
            .header(CONTENT_ENCODING, "identity")
            .body(b"plain".to_vec())
            .unwrap();

        assert!(render_request(&request).contains("plain(5-byte body)\n"));
    }

    #[test]
    fn binary_response_body_is_omitted() {
        let response = Response::builder()
            .status(200)
            .body(vec![0u8, 159, 146, 150])
            .unwrap();

        assert_eq!(
            render_response_body(&response),
            "(binary 4-byte body omitted)\n"
        );
    }

    #[test]
    fn json_response_body_is_pretty_printed() {
        let response = Response::builder()
            .status(200)
            .header(CONTENT_TYPE, "application/json")
            .body(b"{\"a\":1}".to_vec())
            .unwrap();

        assert_eq!(
            render_response_body(&response),
            "{\n  \"a\": 1\n}\n(7-byte body)\n"
        );
    }

    #[test]
    fn unparseable_json_falls_back_to_raw_text() {
        let response = Response::builder()
            .status(200)
            .header(CONTENT_TYPE, "application/json")
            .body(b"{not json".to_vec())
            .unwrap();

        assert_eq!(render_response_body(&response), "{not json\n(9-byte body)\n");
    }
}
