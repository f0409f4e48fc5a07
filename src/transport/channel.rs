//! Channel capability - exact-size reads and writes on a byte stream.
//!
//! [`ControlChannel`] wraps any reliable, ordered byte stream (a
//! connected Unix socket in production, `tokio::io::duplex` in tests)
//! and exposes the three operations the framing layer needs:
//! `is_connected`, `read_exact`, and `write_exact`. Connection
//! establishment and teardown belong to the caller.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ControlError, Result};

/// A control channel over a byte stream.
///
/// The stream slot is empty for a channel that has not been (or is no
/// longer) established; every I/O call on it fails with `NotConnected`.
#[derive(Debug)]
pub struct ControlChannel<S> {
    stream: Option<S>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> ControlChannel<S> {
    /// Wrap an established stream.
    pub fn connected(stream: S) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    /// A channel with no connection behind it.
    pub fn disconnected() -> Self {
        Self { stream: None }
    }

    /// Is a stream currently attached?
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Detach and return the stream, leaving the channel disconnected.
    pub fn close(&mut self) -> Option<S> {
        self.stream.take()
    }

    /// Read exactly `count` bytes.
    ///
    /// A short read (peer closed mid-message) or any stream error is a
    /// `NetRead` failure; the channel contents are then unusable for
    /// further framing.
    pub async fn read_exact(&mut self, count: usize) -> Result<Bytes> {
        let stream = self.stream.as_mut().ok_or(ControlError::NotConnected)?;

        let mut buf = vec![0u8; count];
        stream
            .read_exact(&mut buf)
            .await
            .map_err(|e| ControlError::NetRead(e.to_string()))?;

        Ok(Bytes::from(buf))
    }

    /// Write all of `buf`, then flush.
    pub async fn write_exact(&mut self, buf: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(ControlError::NotConnected)?;

        stream
            .write_all(buf)
            .await
            .map_err(|e| ControlError::NetWrite(e.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|e| ControlError::NetWrite(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_write_then_read_exact() {
        let (a, b) = duplex(256);
        let mut tx = ControlChannel::connected(a);
        let mut rx = ControlChannel::connected(b);

        tx.write_exact(b"exactly these bytes").await.unwrap();
        let got = rx.read_exact(19).await.unwrap();
        assert_eq!(&got[..], b"exactly these bytes");
    }

    #[tokio::test]
    async fn test_short_read_is_net_read_error() {
        let (a, b) = duplex(256);
        let mut tx = ControlChannel::connected(a);
        let mut rx = ControlChannel::connected(b);

        tx.write_exact(b"abc").await.unwrap();
        drop(tx.close()); // peer goes away after 3 bytes

        let err = rx.read_exact(10).await.unwrap_err();
        assert!(matches!(err, ControlError::NetRead(_)));
    }

    #[tokio::test]
    async fn test_disconnected_channel_refuses_io() {
        let mut ch: ControlChannel<tokio::io::DuplexStream> = ControlChannel::disconnected();
        assert!(!ch.is_connected());

        assert!(matches!(
            ch.read_exact(1).await,
            Err(ControlError::NotConnected)
        ));
        assert!(matches!(
            ch.write_exact(b"x").await,
            Err(ControlError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_close_detaches_stream() {
        let (a, _b) = duplex(64);
        let mut ch = ControlChannel::connected(a);
        assert!(ch.is_connected());
        assert!(ch.close().is_some());
        assert!(!ch.is_connected());
        assert!(ch.close().is_none());
    }
}
