//! Error types for the GarageWatch firmware, one enum per subsystem.
//!
//! Ports return these directly; the control loop logs them and carries on.
//! All variants are `Copy` so they can be logged and passed around without
//! allocation.  Bring-up in `main` lifts them into `anyhow::Error`.

use core::fmt;

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// GPIO read returned an error.
    GpioReadFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
        }
    }
}

impl std::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl std::error::Error for ActuatorError {}

// ---------------------------------------------------------------------------
// Notification errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// The adapter has no credentials and cannot send.
    NotConfigured,
    /// The provider answered with a non-success HTTP status.
    Rejected(u16),
    /// The request never got an answer.
    Transport(TransportError),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "notifier not configured"),
            Self::Rejected(status) => write!(f, "rejected by provider (HTTP {status})"),
            Self::Transport(e) => write!(f, "{e}"),
        }
    }
}

impl From<TransportError> for SendError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl std::error::Error for SendError {}

// ---------------------------------------------------------------------------
// Photo errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoError {
    /// The adapter has no camera URL or upload credentials.
    NotConfigured,
    /// The camera did not deliver an image.
    CaptureFailed,
    /// The image file could not be written or read back.
    Storage,
    /// The image host refused the upload.
    UploadRejected(u16),
    /// The upload response did not contain a link.
    MissingLink,
    /// A request never got an answer.
    Transport(TransportError),
}

impl fmt::Display for PhotoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "camera not configured"),
            Self::CaptureFailed => write!(f, "capture failed"),
            Self::Storage => write!(f, "image storage failed"),
            Self::UploadRejected(status) => write!(f, "upload rejected (HTTP {status})"),
            Self::MissingLink => write!(f, "upload response has no link"),
            Self::Transport(e) => write!(f, "{e}"),
        }
    }
}

impl From<TransportError> for PhotoError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl std::error::Error for PhotoError {}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Connection could not be established (DNS, TLS, socket).
    ConnectFailed,
    /// The peer did not answer within the configured timeout.
    Timeout,
    /// Reading or writing the body failed midway.
    Io,
    /// The response body was larger than the receive buffer.
    ResponseTooLarge,
    /// The response body could not be parsed.
    Malformed,
    /// Non-success HTTP status on a read request.
    Status(u16),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed => write!(f, "connection failed"),
            Self::Timeout => write!(f, "timed out"),
            Self::Io => write!(f, "I/O error"),
            Self::ResponseTooLarge => write!(f, "response too large"),
            Self::Malformed => write!(f, "malformed response"),
            Self::Status(status) => write!(f, "HTTP {status}"),
        }
    }
}

impl std::error::Error for TransportError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_errors_render_their_cause() {
        assert_eq!(
            SendError::Rejected(401).to_string(),
            "rejected by provider (HTTP 401)"
        );
        assert_eq!(PhotoError::from(TransportError::Timeout).to_string(), "timed out");
        assert_eq!(
            SendError::from(TransportError::Status(503)),
            SendError::Transport(TransportError::Status(503))
        );
    }

    #[test]
    fn actuator_error_lifts_into_anyhow() {
        let e = anyhow::Error::from(ActuatorError::GpioWriteFailed);
        assert_eq!(e.to_string(), "GPIO write failed");
        assert_eq!(
            e.downcast_ref::<ActuatorError>(),
            Some(&ActuatorError::GpioWriteFailed)
        );
    }
}
