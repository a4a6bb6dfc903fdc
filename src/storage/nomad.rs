//! Nomad HTTP API backend.
//!
//! Maps the store operations onto the Nomad variables API:
//! - `list`   → `GET /v1/vars`
//! - `read`   → `GET /v1/var/<path>`
//! - `create` → `PUT /v1/var/<path>`
//! - `update` → `PUT /v1/var/<path>` (with `cas=<index>` when check-and-set is on)
//!
//! Every request carries the `namespace` query parameter and, when a token
//! is configured, the `X-Nomad-Token` header.

use super::backend::VariableStore;
use super::{StoreConfig, StoreError, StoreResult};
use crate::models::{Items, Variable, VariableMetadata};
use serde::Serialize;

/// Header carrying the ACL token.
const TOKEN_HEADER: &str = "X-Nomad-Token";

/// User-Agent sent with every request
const USER_AGENT: &str = concat!("nomad-conf/", env!("CARGO_PKG_VERSION"));

/// Request body for variable writes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct VariableWrite<'a> {
    namespace: &'a str,
    path: &'a str,
    items: &'a Items,
}

/// Store backend that talks to a Nomad server.
pub struct NomadBackend {
    agent: ureq::Agent,
    address: String,
    token: Option<String>,
    namespace: String,
    check_index: bool,
    strict_reads: bool,
}

impl std::fmt::Debug for NomadBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NomadBackend")
            .field("address", &self.address)
            .field("namespace", &self.namespace)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("check_index", &self.check_index)
            .finish()
    }
}

impl NomadBackend {
    /// Create a backend for the server in `config`.
    pub fn new(config: &StoreConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build();

        Self {
            agent,
            address: config.address.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
            namespace: config.namespace.clone(),
            check_index: config.check_index,
            strict_reads: config.strict_not_found,
        }
    }

    fn var_url(&self, path: &str) -> String {
        format!("{}/v1/var/{}", self.address, path.trim_start_matches('/'))
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let req = self
            .agent
            .request(method, url)
            .query("namespace", &self.namespace);
        match &self.token {
            Some(token) => req.set(TOKEN_HEADER, token),
            None => req,
        }
    }

    fn put(&self, variable: &Variable, cas: Option<u64>) -> StoreResult<()> {
        let body = VariableWrite {
            namespace: &self.namespace,
            path: &variable.path,
            items: &variable.items,
        };

        let mut req = self.request("PUT", &self.var_url(&variable.path));
        if let Some(index) = cas {
            req = req.query("cas", &index.to_string());
        }

        tracing::debug!(path = %variable.path, cas = ?cas, "PUT variable");
        match req.send_json(&body) {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(409, _)) => Err(StoreError::Conflict {
                path: variable.path.clone(),
                expected: cas.unwrap_or_default(),
            }),
            Err(e) => Err(map_error(&variable.path, e)),
        }
    }
}

/// Translate a ureq error into a store error.
fn map_error(path: &str, err: ureq::Error) -> StoreError {
    match err {
        ureq::Error::Status(404, _) => StoreError::NotFound(path.to_string()),
        ureq::Error::Status(code @ (401 | 403), resp) => {
            let body = resp.into_string().unwrap_or_default();
            StoreError::Forbidden(format!("HTTP {}: {}", code, body.trim()))
        }
        ureq::Error::Status(status, resp) => {
            let body = resp.into_string().unwrap_or_default();
            StoreError::Http {
                status,
                body: body.trim().to_string(),
            }
        }
        ureq::Error::Transport(t) => StoreError::Transport(t.to_string()),
    }
}

impl VariableStore for NomadBackend {
    fn list(&self) -> StoreResult<Vec<VariableMetadata>> {
        let url = format!("{}/v1/vars", self.address);
        tracing::debug!(%url, "listing variables");
        let resp = self
            .request("GET", &url)
            .call()
            .map_err(|e| map_error("", e))?;
        resp.into_json()
            .map_err(|e| StoreError::Parse(e.to_string()))
    }

    fn read(&self, path: &str) -> StoreResult<Variable> {
        tracing::debug!(path, "GET variable");
        let resp = self
            .request("GET", &self.var_url(path))
            .call()
            .map_err(|e| map_error(path, e))?;
        resp.into_json()
            .map_err(|e| StoreError::Parse(e.to_string()))
    }

    fn create(&self, variable: &Variable) -> StoreResult<()> {
        self.put(variable, None)
    }

    fn update(&self, variable: &Variable) -> StoreResult<()> {
        let cas = if self.check_index {
            variable.modify_index
        } else {
            None
        };
        self.put(variable, cas)
    }

    fn strict_reads(&self) -> bool {
        self.strict_reads
    }

    fn location(&self) -> String {
        self.address.clone()
    }

    fn backend_type(&self) -> &'static str {
        "nomad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// A request as seen by the fake server.
    #[derive(Debug)]
    struct Captured {
        request_line: String,
        headers: Vec<(String, String)>,
        body: String,
    }

    impl Captured {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    /// Serve one canned response per connection, in order, and report what
    /// was received.
    fn fake_nomad(responses: Vec<(u16, &'static str)>) -> (String, mpsc::Receiver<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for (status, body) in responses {
                let (stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();

                let mut headers = Vec::new();
                let mut content_length = 0usize;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();
                    let line = line.trim_end();
                    if line.is_empty() {
                        break;
                    }
                    if let Some((k, v)) = line.split_once(':') {
                        let (k, v) = (k.trim().to_string(), v.trim().to_string());
                        if k.eq_ignore_ascii_case("content-length") {
                            content_length = v.parse().unwrap();
                        }
                        headers.push((k, v));
                    }
                }

                let mut body_buf = vec![0u8; content_length];
                reader.read_exact(&mut body_buf).unwrap();

                tx.send(Captured {
                    request_line: request_line.trim_end().to_string(),
                    headers,
                    body: String::from_utf8(body_buf).unwrap(),
                })
                .unwrap();

                let mut stream = stream;
                write!(
                    stream,
                    "HTTP/1.1 {} Fake\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                )
                .unwrap();
                stream.flush().unwrap();
            }
        });

        (address, rx)
    }

    fn backend_for(address: &str) -> NomadBackend {
        let mut config = StoreConfig::new(address);
        config.token = Some("s3cr3t".to_string());
        NomadBackend::new(&config)
    }

    #[test]
    fn test_read_parses_variable_and_sends_token() {
        let (address, rx) = fake_nomad(vec![(
            200,
            r#"{"Namespace":"default","Path":"jobs/a","Items":{"db_url":"postgres://x"},"ModifyIndex":7}"#,
        )]);
        let backend = backend_for(&address);

        let var = backend.read("jobs/a").unwrap();
        assert_eq!(var.get("db_url"), Some("postgres://x"));
        assert_eq!(var.modify_index, Some(7));

        let req = rx.recv().unwrap();
        assert!(req.request_line.starts_with("GET /v1/var/jobs/a?namespace=default"));
        assert_eq!(req.header("X-Nomad-Token"), Some("s3cr3t"));
    }

    #[test]
    fn test_read_404_is_not_found() {
        let (address, _rx) = fake_nomad(vec![(404, "variable not found")]);
        let backend = backend_for(&address);
        assert!(backend.read("jobs/missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_read_403_is_forbidden() {
        let (address, _rx) = fake_nomad(vec![(403, "Permission denied")]);
        let backend = backend_for(&address);
        assert!(matches!(
            backend.read("jobs/a").unwrap_err(),
            StoreError::Forbidden(_)
        ));
    }

    #[test]
    fn test_read_500_is_http_error() {
        let (address, _rx) = fake_nomad(vec![(500, "boom")]);
        let backend = backend_for(&address);
        match backend.read("jobs/a").unwrap_err() {
            StoreError::Http { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let backend = backend_for(&address);
        assert!(matches!(
            backend.read("jobs/a").unwrap_err(),
            StoreError::Transport(_)
        ));
    }

    #[test]
    fn test_list_parses_metadata() {
        let (address, rx) = fake_nomad(vec![(
            200,
            r#"[{"Namespace":"default","Path":"jobs/a","ModifyIndex":3},{"Namespace":"default","Path":"jobs/b","ModifyIndex":4}]"#,
        )]);
        let backend = backend_for(&address);

        let paths: Vec<String> = backend.list().unwrap().into_iter().map(|m| m.path).collect();
        assert_eq!(paths, vec!["jobs/a", "jobs/b"]);

        let req = rx.recv().unwrap();
        assert!(req.request_line.starts_with("GET /v1/vars?namespace=default"));
    }

    #[test]
    fn test_create_puts_items() {
        let (address, rx) = fake_nomad(vec![(200, "{}")]);
        let backend = backend_for(&address);

        backend
            .create(&Variable::new("jobs/a").with_item("db_url", "postgres://x"))
            .unwrap();

        let req = rx.recv().unwrap();
        assert!(req.request_line.starts_with("PUT /v1/var/jobs/a?namespace=default"));
        assert!(!req.request_line.contains("cas="));
        let body: serde_json::Value = serde_json::from_str(&req.body).unwrap();
        assert_eq!(body["Path"], "jobs/a");
        assert_eq!(body["Items"]["db_url"], "postgres://x");
    }

    #[test]
    fn test_update_without_check_index_sends_no_cas() {
        let (address, rx) = fake_nomad(vec![(200, "{}")]);
        let backend = backend_for(&address);

        let mut var = Variable::new("jobs/a").with_item("k", "v");
        var.modify_index = Some(9);
        backend.update(&var).unwrap();

        let req = rx.recv().unwrap();
        assert!(!req.request_line.contains("cas="));
    }

    #[test]
    fn test_update_with_check_index_sends_cas() {
        let (address, rx) = fake_nomad(vec![(200, "{}")]);
        let mut config = StoreConfig::new(&address);
        config.check_index = true;
        let backend = NomadBackend::new(&config);

        let mut var = Variable::new("jobs/a").with_item("k", "v");
        var.modify_index = Some(9);
        backend.update(&var).unwrap();

        let req = rx.recv().unwrap();
        assert!(req.request_line.contains("cas=9"));
        assert_eq!(req.header("X-Nomad-Token"), None);
    }

    #[test]
    fn test_update_conflict() {
        let (address, _rx) = fake_nomad(vec![(409, r#"{"Path":"jobs/a"}"#)]);
        let mut config = StoreConfig::new(&address);
        config.check_index = true;
        let backend = NomadBackend::new(&config);

        let mut var = Variable::new("jobs/a");
        var.modify_index = Some(9);
        assert!(matches!(
            backend.update(&var).unwrap_err(),
            StoreError::Conflict { expected: 9, .. }
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let backend = backend_for("http://localhost:4646");
        let debug = format!("{:?}", backend);
        assert!(!debug.contains("s3cr3t"));
        assert!(debug.contains("<redacted>"));
    }
}
