//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use upgrade_proxy::{ProxyConfig, Supervisor};

/// Start a backend that answers every request with what it received: the
/// request head (request line plus headers) and, after a blank line, the raw
/// body bytes including any chunked framing.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut received = Vec::new();
                        let mut buf = [0u8; 1024];
                        let head_end = loop {
                            if let Some(pos) = find(&received, b"\r\n\r\n") {
                                break pos;
                            }
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => received.extend_from_slice(&buf[..n]),
                            }
                        };

                        let head = String::from_utf8_lossy(&received[..head_end]).into_owned();
                        let lower = head.to_lowercase();
                        let body_start = head_end + 4;
                        let body_complete = |received: &[u8]| {
                            let body = &received[body_start..];
                            if lower.contains("transfer-encoding: chunked") {
                                body.ends_with(b"0\r\n\r\n")
                            } else {
                                body.len() >= content_length(&lower)
                            }
                        };

                        while !body_complete(&received) {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => received.extend_from_slice(&buf[..n]),
                            }
                        }

                        let mut body = head.into_bytes();
                        if received.len() > body_start {
                            body.extend_from_slice(b"\r\n\r\n");
                            body.extend_from_slice(&received[body_start..]);
                        }

                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nX-Backend: echo\r\nConnection: close\r\n\r\n",
                            body.len()
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.write_all(&body).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn content_length(lower_head: &str) -> usize {
    lower_head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

/// Write a self-signed certificate for `localhost` and its key into a fresh
/// directory, returning `(dir, cert, key)`.
#[allow(dead_code)]
pub fn self_signed_cert(tag: &str) -> (PathBuf, PathBuf, PathBuf) {
    let rcgen::CertifiedKey { cert, signing_key } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();

    let dir = std::env::temp_dir().join(format!("upgrade-proxy-{}-{}", tag, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let cert_path = dir.join("cert.pem");
    let key_path = dir.join("key.pem");
    std::fs::write(&cert_path, cert.pem()).unwrap();
    std::fs::write(&key_path, signing_key.serialize_pem()).unwrap();

    (dir, cert_path, key_path)
}

/// Start a backend that accepts connections and never answers.
#[allow(dead_code)]
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// An address with nothing listening on it.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Proxy configuration listening on ephemeral loopback ports.
pub fn local_config(target: &str) -> ProxyConfig {
    ProxyConfig {
        target: target.to_string(),
        upgrade_address: "127.0.0.1:0".to_string(),
        secure_address: "127.0.0.1:0".to_string(),
        ..ProxyConfig::default()
    }
}

/// A running proxy and the means to stop it.
pub struct RunningProxy {
    pub upgrade_addr: Option<SocketAddr>,
    pub secure_addr: Option<SocketAddr>,
    pub is_tls: bool,
    stop: Option<tokio::sync::oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<Result<(), upgrade_proxy::lifecycle::StartupError>>,
}

impl RunningProxy {
    pub async fn start(config: ProxyConfig) -> Self {
        let supervisor = Supervisor::bind(&config).await.unwrap();
        let upgrade_addr = supervisor.upgrade_addr();
        let secure_addr = supervisor.secure_addr();
        let is_tls = supervisor.is_tls();

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let task = tokio::spawn(supervisor.run(async {
            let _ = rx.await;
        }));

        tokio::time::sleep(Duration::from_millis(50)).await;

        Self {
            upgrade_addr,
            secure_addr,
            is_tls,
            stop: Some(tx),
            task,
        }
    }

    pub fn secure_url(&self, path: &str) -> String {
        format!("http://{}{}", self.secure_addr.unwrap(), path)
    }

    #[allow(dead_code)]
    pub fn upgrade_url(&self, path: &str) -> String {
        format!("http://{}{}", self.upgrade_addr.unwrap(), path)
    }

    /// Signal shutdown and wait for the supervisor to return.
    pub async fn stop(mut self) -> Result<(), upgrade_proxy::lifecycle::StartupError> {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .unwrap()
            .unwrap()
    }
}

/// A client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
