use std::io;

/// Failures of the image codec helper.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to read image from {origin}")]
    UnreadableFile {
        origin: String,
        #[source]
        source: io::Error,
    },
    #[error("{origin} is not a recognized image")]
    NotAnImage { origin: String },
    #[error("malformed data URL: {reason}")]
    MalformedDataUrl { reason: &'static str },
    #[error("image payload is not valid base64")]
    InvalidPayload(#[from] base64::DecodeError),
}

impl CodecError {
    pub(crate) fn unreadable(origin: impl Into<String>, source: io::Error) -> Self {
        Self::UnreadableFile {
            origin: origin.into(),
            source,
        }
    }

    pub(crate) fn malformed(reason: &'static str) -> Self {
        Self::MalformedDataUrl { reason }
    }
}
