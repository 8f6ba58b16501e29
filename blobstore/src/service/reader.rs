//! Bounded reading of upload bodies.
//!
//! The content type is checked before any body byte is touched, and the
//! body is never buffered past `max_bytes + 1`, so memory per upload is
//! capped by the configured ceiling.

use std::io;

use axum::body::Bytes;
use futures::{Stream, TryStreamExt};
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct BoundedReader {
    max_bytes: u64,
    accepted: Vec<String>,
}

impl BoundedReader {
    pub fn new(max_bytes: u64, accepted: Vec<String>) -> Self {
        Self { max_bytes, accepted }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Validate the declared content type against the allow-list and return
    /// it normalised for storage.
    pub fn check_content_type(&self, declared: Option<&str>) -> Result<String, AppError> {
        let declared = declared
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AppError::ContentTypeMissing)?;
        self.accepted
            .iter()
            .find(|accepted| accepted.eq_ignore_ascii_case(declared))
            .cloned()
            .ok_or_else(|| AppError::UnsupportedMediaType(declared.to_string()))
    }

    /// Reject early when the client already announced an oversized body.
    pub fn check_declared_length(&self, declared: Option<u64>) -> Result<(), AppError> {
        match declared {
            Some(len) if len > self.max_bytes => Err(AppError::PayloadTooLarge { limit: self.max_bytes }),
            _ => Ok(()),
        }
    }

    /// Drain `stream` into memory, failing with `PayloadTooLarge` as soon as
    /// it yields more than `max_bytes`.
    pub async fn read<S, E>(&self, stream: S, size_hint: Option<u64>) -> Result<Vec<u8>, AppError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let body_reader = StreamReader::new(stream.map_err(io::Error::other));
        futures::pin_mut!(body_reader);

        let capacity = size_hint.unwrap_or(0).min(self.max_bytes) as usize;
        let mut data = Vec::with_capacity(capacity);
        body_reader
            .take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut data)
            .await
            .map_err(AppError::Read)?;

        if data.len() as u64 > self.max_bytes {
            return Err(AppError::PayloadTooLarge { limit: self.max_bytes });
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn reader(max_bytes: u64) -> BoundedReader {
        BoundedReader::new(max_bytes, vec!["application/x-tar".to_string()])
    }

    fn chunks(parts: Vec<&'static [u8]>) -> impl Stream<Item = Result<Bytes, io::Error>> + Send {
        stream::iter(parts.into_iter().map(|p| Ok(Bytes::from_static(p))))
    }

    #[test]
    fn test_content_type_allow_list() {
        let r = reader(10);
        assert_eq!(r.check_content_type(Some("application/x-tar")).unwrap(), "application/x-tar");
        assert_eq!(r.check_content_type(Some(" Application/X-Tar ")).unwrap(), "application/x-tar");
        assert!(matches!(
            r.check_content_type(Some("application/json")),
            Err(AppError::UnsupportedMediaType(t)) if t == "application/json"
        ));
        assert!(matches!(r.check_content_type(None), Err(AppError::ContentTypeMissing)));
        assert!(matches!(r.check_content_type(Some("  ")), Err(AppError::ContentTypeMissing)));
    }

    #[test]
    fn test_declared_length_over_ceiling() {
        let r = reader(10);
        assert!(r.check_declared_length(None).is_ok());
        assert!(r.check_declared_length(Some(10)).is_ok());
        assert!(matches!(
            r.check_declared_length(Some(11)),
            Err(AppError::PayloadTooLarge { limit: 10 })
        ));
    }

    #[tokio::test]
    async fn test_reads_chunked_body_up_to_ceiling() {
        let r = reader(10);
        let data = r.read(chunks(vec![&b"0123"[..], &b"4567"[..], &b"89"[..]]), None).await.unwrap();
        assert_eq!(data, b"0123456789");

        let empty = r.read(chunks(vec![]), Some(0)).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_one_byte_over_ceiling_is_too_large() {
        let r = reader(10);
        let err = r.read(chunks(vec![&b"01234"[..], &b"567890"[..]]), None).await.unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge { limit: 10 }));
    }

    #[tokio::test]
    async fn test_lying_size_hint_is_still_bounded() {
        let r = reader(4);
        let err = r.read(chunks(vec![&b"abcdefgh"[..]]), Some(2)).await.unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge { limit: 4 }));
    }

    #[tokio::test]
    async fn test_stream_fault_is_read_error() {
        let r = reader(1024);
        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away")),
        ]);
        let err = r.read(body, None).await.unwrap_err();
        match err {
            AppError::Read(e) => assert!(e.to_string().contains("client went away")),
            other => panic!("expected read error, got {other:?}"),
        }
    }
}
