use crate::config::DiffConfig;
use crate::constants::{GITILES_DOMAIN, MAX_RESPONSE_BYTES};
use crate::error::FetchError;
use crate::warning;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::time::Duration;
use ureq::Agent;

/// source of file content at a ref on a remote host
pub trait ContentResolver: Sync {
    /// content of `path` at `git_ref`, or `None` if the file doesn't exist there
    fn fetch(
        &self,
        host: &str,
        repository: &str,
        git_ref: &str,
        path: &str,
    ) -> Result<Option<Vec<u8>>, FetchError>;
}

/// fetches files through the gitiles `?format=TEXT` endpoint
pub struct GitilesResolver {
    agent: Agent,
    scheme: &'static str,
    retries: u32,
    retry_delay: Duration,
}

impl GitilesResolver {
    pub fn new(config: &DiffConfig) -> Self {
        let agent_config = Agent::config_builder()
            .timeout_global(Some(config.fetch_timeout))
            .http_status_as_error(false)
            .build();
        let agent = Agent::new_with_config(agent_config);

        Self {
            agent,
            scheme: "https",
            retries: config.fetch_retries,
            retry_delay: config.retry_delay,
        }
    }

    /// use plain http, for hosts that don't terminate tls
    pub fn insecure(mut self) -> Self {
        self.scheme = "http";
        self
    }

    pub fn url(&self, host: &str, repository: &str, git_ref: &str, path: &str) -> String {
        format!(
            "{}://{}/{}/+/{}/{}?format=TEXT",
            self.scheme,
            expand_host(host),
            repository.trim_matches('/'),
            encode_path(git_ref),
            encode_path(path.trim_start_matches('/'))
        )
    }

    /// a single request, without retries
    fn fetch_once(&self, url: &str) -> Result<Option<Vec<u8>>, FetchError> {
        let mut response = self
            .agent
            .get(url)
            .call()
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Ok(None);
        }
        if !(200..300).contains(&status) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_RESPONSE_BYTES)
            .read_to_string()
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        decode_text(&body)
            .map(Some)
            .map_err(|source| FetchError::Decode {
                url: url.to_string(),
                source,
            })
    }
}

impl ContentResolver for GitilesResolver {
    fn fetch(
        &self,
        host: &str,
        repository: &str,
        git_ref: &str,
        path: &str,
    ) -> Result<Option<Vec<u8>>, FetchError> {
        let url = self.url(host, repository, git_ref, path);
        let mut delay = self.retry_delay;
        let mut attempt = 0;

        loop {
            match self.fetch_once(&url) {
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    let cause = std::error::Error::source(&e)
                        .map(|source| format!(": {source}"))
                        .unwrap_or_default();
                    warning!("{}{}, retrying ({}/{})...", e, cause, attempt, self.retries);
                    std::thread::sleep(delay);
                    delay *= 2;
                }
                result => return result,
            }
        }
    }
}

/// short gitiles host names ("chromium") live under googlesource.com
fn expand_host(host: &str) -> String {
    if host.contains('.') || host.contains(':') {
        host.to_string()
    } else {
        format!("{host}.{GITILES_DOMAIN}")
    }
}

/// percent-encode everything except unreserved characters and `/`
fn encode_path(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    for b in path.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~' | b'/') {
            encoded.push(char::from(b));
        } else {
            encoded.push_str(&format!("%{b:02X}"));
        }
    }
    encoded
}

/// gitiles text responses are base64, possibly wrapped across lines
fn decode_text(body: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(compact)
}

#[cfg(test)]
mod tests;
