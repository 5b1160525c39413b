// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::Config;

pub mod pager;

pub use pager::{last_page_number, page_url};

/// Something that can hand back the body of a catalog page.
pub trait PageSource {
    fn fetch(&self, url: &Url) -> Result<String>;
}

/// Blocking HTTP page source.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// `timeout` of `None` lets a request block indefinitely.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.user_agent, config.timeout)
    }
}

impl PageSource for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<String> {
        debug!("Fetching text from {}", url);
        self.client
            .get(url.clone())
            .send()
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?
            .text()
            .with_context(|| format!("Reading text from {}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve a single canned HTTP response on a local port.
    fn serve_once(status: &str, body: &str) -> Result<(Url, thread::JoinHandle<()>)> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = stream.write_all(response.as_bytes());
            }
        });

        let url = Url::parse(&format!("http://{}/search?page=0", addr))?;
        Ok((url, handle))
    }

    #[test]
    fn returns_body_on_success() -> Result<()> {
        let (url, server) = serve_once("200 OK", "<div class=\"views-row\"></div>")?;
        let fetcher = HttpFetcher::new("catalogscraper-test", None)?;

        let body = fetcher.fetch(&url)?;
        assert_eq!(body, "<div class=\"views-row\"></div>");
        server.join().expect("server thread");
        Ok(())
    }

    #[test]
    fn server_error_is_fatal_and_names_the_url() -> Result<()> {
        let (url, server) = serve_once("500 Internal Server Error", "boom")?;
        let fetcher = HttpFetcher::new("catalogscraper-test", Some(Duration::from_secs(10)))?;

        let err = fetcher.fetch(&url).unwrap_err();
        assert!(err.to_string().contains(url.as_str()));
        assert!(format!("{:#}", err).contains("500"));
        server.join().expect("server thread");
        Ok(())
    }

    #[test]
    fn builds_from_config() -> Result<()> {
        let config = Config::from_lookup(|key| {
            (key == "CATALOG_TIMEOUT_SECS").then(|| "0".to_string())
        })?;
        assert_eq!(config.timeout, None);
        let (url, server) = serve_once("200 OK", "ok")?;

        assert_eq!(HttpFetcher::from_config(&config)?.fetch(&url)?, "ok");
        server.join().expect("server thread");
        Ok(())
    }
}
