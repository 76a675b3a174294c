use super::*;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

/// helper to serve one canned response per connection, returning the request lines
fn serve(responses: Vec<(u16, &'static str)>) -> (String, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            requests.push(request_line.trim_end().to_string());

            // drain the request headers
            loop {
                let mut line = String::new();
                let read = reader.read_line(&mut line).unwrap();
                if read == 0 || line == "\r\n" {
                    break;
                }
            }

            write!(
                stream,
                "HTTP/1.1 {status} Canned\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
        }
        requests
    });

    (addr, handle)
}

/// helper to build a resolver that talks plain http without retry delays
fn resolver(retries: u32) -> GitilesResolver {
    let config = DiffConfig {
        fetch_timeout: Duration::from_secs(5),
        fetch_retries: retries,
        retry_delay: Duration::ZERO,
        ..DiffConfig::default()
    };
    GitilesResolver::new(&config).insecure()
}

#[test]
fn test_url_for_short_host() {
    let resolver = GitilesResolver::new(&DiffConfig::default());
    assert_eq!(
        resolver.url("chromium", "chromium/src", "refs/heads/main", "dir/a b.txt"),
        "https://chromium.googlesource.com/chromium/src/+/refs/heads/main/dir/a%20b.txt?format=TEXT"
    );
}

#[test]
fn test_url_for_full_host() {
    let resolver = GitilesResolver::new(&DiffConfig::default());
    assert_eq!(
        resolver.url("review.example.org", "/infra/tools/", "HEAD", "/README.md"),
        "https://review.example.org/infra/tools/+/HEAD/README.md?format=TEXT"
    );
}

#[test]
fn test_encode_path() {
    assert_eq!(encode_path("a/b-c_d.e~f"), "a/b-c_d.e~f");
    assert_eq!(encode_path("a b/c#d?"), "a%20b/c%23d%3F");
    assert_eq!(encode_path("caf\u{e9}"), "caf%C3%A9");
}

#[test]
fn test_expand_host() {
    assert_eq!(expand_host("chromium"), "chromium.googlesource.com");
    assert_eq!(expand_host("chromium.googlesource.com"), "chromium.googlesource.com");
    assert_eq!(expand_host("localhost:8080"), "localhost:8080");
}

#[test]
fn test_decode_text_ignores_line_wrapping() {
    assert_eq!(decode_text("aGVs\nbG8K\n").unwrap(), b"hello\n");
    assert_eq!(decode_text("").unwrap(), b"");
    assert!(decode_text("not base64!").is_err());
}

#[test]
fn test_fetch_existing_file() {
    let (addr, server) = serve(vec![(200, "aGVsbG8K")]);

    let content = resolver(0)
        .fetch(&addr, "repo", "refs/heads/main", "dir/file.txt")
        .unwrap();

    assert_eq!(content.as_deref(), Some(b"hello\n".as_slice()));
    assert_eq!(
        server.join().unwrap(),
        ["GET /repo/+/refs/heads/main/dir/file.txt?format=TEXT HTTP/1.1"]
    );
}

#[test]
fn test_fetch_empty_file_is_not_missing() {
    let (addr, server) = serve(vec![(200, "")]);

    let content = resolver(0).fetch(&addr, "repo", "HEAD", "empty.txt").unwrap();

    assert_eq!(content, Some(Vec::new()));
    server.join().unwrap();
}

#[test]
fn test_fetch_missing_file() {
    let (addr, server) = serve(vec![(404, "Not Found")]);

    let content = resolver(2).fetch(&addr, "repo", "HEAD", "missing.txt").unwrap();

    assert_eq!(content, None);
    assert_eq!(server.join().unwrap().len(), 1, "404 must not be retried");
}

#[test]
fn test_fetch_retries_server_errors() {
    let (addr, server) = serve(vec![(503, "busy"), (200, "aGVsbG8K")]);

    let content = resolver(1).fetch(&addr, "repo", "HEAD", "file.txt").unwrap();

    assert_eq!(content.as_deref(), Some(b"hello\n".as_slice()));
    assert_eq!(server.join().unwrap().len(), 2);
}

#[test]
fn test_fetch_gives_up_after_retries() {
    let (addr, server) = serve(vec![(500, "oops"), (500, "oops")]);

    let err = resolver(1)
        .fetch(&addr, "repo", "HEAD", "file.txt")
        .unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 500, .. }), "{err}");
    server.join().unwrap();
}

#[test]
fn test_fetch_does_not_retry_client_errors() {
    let (addr, server) = serve(vec![(403, "forbidden")]);

    let err = resolver(3)
        .fetch(&addr, "repo", "HEAD", "file.txt")
        .unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 403, .. }), "{err}");
    assert!(!err.is_transient());
    assert_eq!(server.join().unwrap().len(), 1);
}

#[test]
fn test_fetch_invalid_body() {
    let (addr, server) = serve(vec![(200, "<html>not base64</html>")]);

    let err = resolver(0)
        .fetch(&addr, "repo", "HEAD", "file.txt")
        .unwrap_err();

    assert!(matches!(err, FetchError::Decode { .. }), "{err}");
    server.join().unwrap();
}

#[test]
fn test_fetch_connection_refused_is_an_error() {
    // bind then drop to get a port nothing listens on
    let addr = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .to_string();

    let err = resolver(0)
        .fetch(&addr, "repo", "HEAD", "file.txt")
        .unwrap_err();

    assert!(matches!(err, FetchError::Transport { .. }), "{err}");
}
