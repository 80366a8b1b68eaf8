use std::io::Read;
use std::time::Duration;

use crate::error::FetchError;

/// Upper bound on a single downloaded body (full-resolution photos are large).
pub const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

pub fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(10))
        .timeout_read(Duration::from_secs(60))
        .user_agent(concat!("caption-canvas/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// GET `url` and return the raw body.
pub fn fetch_bytes(agent: &ureq::Agent, url: &str) -> Result<Vec<u8>, FetchError> {
    tracing::debug!("GET {}", url);
    let response = agent
        .get(url)
        .call()
        .map_err(|e| FetchError::from_ureq(url, e))?;
    read_limited(response.into_reader(), MAX_BODY_BYTES)
}

pub fn read_limited(reader: impl Read, limit: u64) -> Result<Vec<u8>, FetchError> {
    let mut buf = Vec::new();
    reader.take(limit + 1).read_to_end(&mut buf)?;
    if buf.len() as u64 > limit {
        return Err(FetchError::TooLarge { limit });
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_at_limit_is_accepted() {
        let data = vec![1u8; 16];
        let out = read_limited(&data[..], 16).unwrap();
        assert_eq!(out.len(), 16);
    }

    #[test]
    fn body_over_limit_is_rejected() {
        let data = vec![1u8; 17];
        let err = read_limited(&data[..], 16).unwrap_err();
        assert!(matches!(err, FetchError::TooLarge { limit: 16 }));
    }
}
