use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("failed to read response body: {0}")]
    Read(#[from] std::io::Error),
    #[error("response body exceeds {limit} bytes")]
    TooLarge { limit: u64 },
}

impl FetchError {
    pub fn from_ureq(url: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, _) => Self::Status {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(t) => Self::Transport {
                url: url.to_string(),
                reason: t.to_string(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("malformed search response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("no image URL was provided")]
    EmptyUrl,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image loader stopped before finishing")]
    Interrupted,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save cancelled")]
    Cancelled,
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
    #[error(transparent)]
    Save(#[from] SaveError),
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Save(#[from] SaveError),
}
