//! Camera + Imgur photo adapter.
//!
//! Implements [`PhotoPort`]:
//!
//! 1. `capture` fetches a JPEG snapshot from the IP camera over HTTP and
//!    stores it at the configured image path.  Resolution and night-mode
//!    exposure are picked from the door status.
//! 2. `upload` posts the stored image to Imgur (`Client-ID` auth, base64
//!    body) and returns the public link.

use core::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::app::ports::{CapturedImage, PhotoPort};
use crate::door::DoorStatus;
use crate::error::PhotoError;

pub const IMGUR_UPLOAD_URL: &str = "https://api.imgur.com/3/image";

/// Largest snapshot accepted from the camera.
pub const MAX_IMAGE_BYTES: usize = 512 * 1024;

/// Camera parameters for one capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureProfile {
    pub width: u16,
    pub height: u16,
    /// Long exposure for a dark garage.
    pub night_mode: bool,
}

impl CaptureProfile {
    /// An open door lets daylight in; a closed (or unknown) door means the
    /// garage is likely dark.
    pub fn for_status(status: DoorStatus) -> Self {
        Self {
            width: 800,
            height: 600,
            night_mode: status != DoorStatus::Open,
        }
    }

    /// Append the profile as query parameters to the camera's snapshot URL.
    pub fn snapshot_url(&self, base: &str) -> String {
        let sep = if base.contains('?') { '&' } else { '?' };
        format!(
            "{}{}width={}&height={}&night={}",
            base,
            sep,
            self.width,
            self.height,
            u8::from(self.night_mode)
        )
    }
}

/// Form body for an Imgur upload.
pub fn upload_form(image: &[u8], title: &str) -> String {
    format!(
        "type=base64&title={}&image={}",
        urlencoding::encode(title),
        urlencoding::encode(&STANDARD.encode(image)),
    )
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    link: Option<String>,
}

/// Extract the public link from an Imgur upload response.
pub fn parse_upload_response(json: &[u8]) -> Result<String, PhotoError> {
    let resp: UploadResponse = serde_json::from_slice(json)
        .map_err(|_| PhotoError::Transport(crate::error::TransportError::Malformed))?;
    if !resp.success {
        return Err(PhotoError::MissingLink);
    }
    resp.data
        .and_then(|d| d.link)
        .filter(|l| l.starts_with("https://"))
        .ok_or(PhotoError::MissingLink)
}

pub struct ImgurCamera {
    snapshot_url: Option<&'static str>,
    client_id: Option<&'static str>,
    image_path: String,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    timeout: Duration,
}

impl ImgurCamera {
    pub fn new(
        snapshot_url: Option<&'static str>,
        client_id: Option<&'static str>,
        image_path: &str,
        timeout: Duration,
    ) -> Self {
        if snapshot_url.is_none() {
            log::warn!("camera: no snapshot URL, photos disabled");
        }
        if client_id.is_none() {
            log::warn!("camera: no Imgur client id, uploads disabled");
        }
        Self {
            snapshot_url,
            client_id,
            image_path: image_path.to_string(),
            timeout,
        }
    }

    #[cfg(target_os = "espidf")]
    fn fetch_snapshot(&self, url: &str) -> Result<Vec<u8>, PhotoError> {
        use super::http::{request, HttpMethod};

        let resp = request(HttpMethod::Get, url, &[], None, self.timeout, MAX_IMAGE_BYTES)?;
        if !resp.is_success() || resp.body.is_empty() {
            return Err(PhotoError::CaptureFailed);
        }
        Ok(resp.body)
    }

    #[cfg(not(target_os = "espidf"))]
    fn fetch_snapshot(&self, url: &str) -> Result<Vec<u8>, PhotoError> {
        log::info!("camera(sim): no camera reachable at {}", url);
        Err(PhotoError::CaptureFailed)
    }

    #[cfg(target_os = "espidf")]
    fn post_upload(&self, client_id: &str, form: &str) -> Result<String, PhotoError> {
        use super::http::{request, HttpMethod};

        let auth = format!("Client-ID {}", client_id);
        let headers = [
            ("Authorization", auth.as_str()),
            ("Content-Type", "application/x-www-form-urlencoded"),
        ];
        let resp = request(
            HttpMethod::Post,
            IMGUR_UPLOAD_URL,
            &headers,
            Some(form.as_bytes()),
            self.timeout,
            8192,
        )?;
        if !resp.is_success() {
            return Err(PhotoError::UploadRejected(resp.status));
        }
        parse_upload_response(&resp.body)
    }

    #[cfg(not(target_os = "espidf"))]
    fn post_upload(&self, _client_id: &str, form: &str) -> Result<String, PhotoError> {
        log::info!("imgur(sim): would upload {} bytes", form.len());
        Err(PhotoError::Transport(crate::error::TransportError::ConnectFailed))
    }
}

impl PhotoPort for ImgurCamera {
    fn capture(&mut self, status: DoorStatus) -> Result<CapturedImage, PhotoError> {
        let base = self.snapshot_url.ok_or(PhotoError::NotConfigured)?;
        let profile = CaptureProfile::for_status(status);
        let jpeg = self.fetch_snapshot(&profile.snapshot_url(base))?;
        std::fs::write(&self.image_path, &jpeg).map_err(|_| PhotoError::Storage)?;
        log::info!(
            "camera: {}x{} night={} captured {} bytes",
            profile.width,
            profile.height,
            profile.night_mode,
            jpeg.len()
        );
        Ok(CapturedImage {
            path: self.image_path.clone(),
        })
    }

    fn upload(&mut self, image: &CapturedImage, title: &str) -> Result<String, PhotoError> {
        let client_id = self.client_id.ok_or(PhotoError::NotConfigured)?;
        let bytes = std::fs::read(&image.path).map_err(|_| PhotoError::Storage)?;
        let link = self.post_upload(client_id, &upload_form(&bytes, title))?;
        log::info!("imgur: uploaded {}", link);
        Ok(link)
    }
}
