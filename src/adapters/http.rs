//! Blocking HTTPS client shared by the Twilio, Imgur and camera adapters.
//!
//! Wraps `EspHttpConnection` with the ESP-IDF certificate bundle and a
//! per-request timeout.  Bodies are read into memory up to a caller-given
//! cap; anything larger is refused rather than truncated.

use core::time::Duration;

use embedded_svc::http::client::Client;
use embedded_svc::http::Method;
use embedded_svc::io::{Read, Write};
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

use crate::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub fn request(
    method: HttpMethod,
    url: &str,
    headers: &[(&str, &str)],
    body: Option<&[u8]>,
    timeout: Duration,
    max_body: usize,
) -> Result<HttpResponse, TransportError> {
    let conn = EspHttpConnection::new(&Configuration {
        timeout: Some(timeout),
        crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
        ..Default::default()
    })
    .map_err(|_| TransportError::ConnectFailed)?;
    let mut client = Client::wrap(conn);

    let method = match method {
        HttpMethod::Get => Method::Get,
        HttpMethod::Post => Method::Post,
    };
    let mut req = client
        .request(method, url, headers)
        .map_err(|_| TransportError::ConnectFailed)?;
    if let Some(body) = body {
        req.write_all(body).map_err(|_| TransportError::Io)?;
        req.flush().map_err(|_| TransportError::Io)?;
    }
    let mut resp = req.submit().map_err(|_| TransportError::Timeout)?;
    let status = resp.status();

    let mut out = Vec::new();
    let mut buf = [0u8; 512];
    loop {
        let n = resp.read(&mut buf).map_err(|_| TransportError::Io)?;
        if n == 0 {
            break;
        }
        if out.len() + n > max_body {
            return Err(TransportError::ResponseTooLarge);
        }
        out.extend_from_slice(&buf[..n]);
    }
    log::debug!("http: {} -> {} ({} bytes)", url, status, out.len());
    Ok(HttpResponse { status, body: out })
}
