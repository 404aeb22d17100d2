//! Length-prefixed text frames
//!
//! ```text
//! +--------+--------+---------------------------+
//! | len hi | len lo |  UTF-8 payload (len bytes) |
//! +--------+--------+---------------------------+
//! ```
//!
//! The length is a 16-bit unsigned big-endian integer, so a single payload
//! carries at most 65535 bytes. The same framing is used in both directions.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{FrameError, Result};

/// Size of the length prefix
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// Largest payload a frame can carry
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// Encode a payload into a complete frame
pub fn encode_frame(payload: &str) -> Result<Bytes> {
    let len = payload.len();
    if len > MAX_PAYLOAD_LEN {
        return Err(FrameError::TooLarge(len).into());
    }

    let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + len);
    buf.put_u16(len as u16);
    buf.put_slice(payload.as_bytes());
    Ok(buf.freeze())
}

/// Decode one frame from the front of `data`
///
/// Returns `Ok(None)` and leaves `data` untouched if a full frame has not
/// arrived yet.
pub fn decode_frame(data: &mut Bytes) -> Result<Option<String>> {
    if data.remaining() < LENGTH_PREFIX_SIZE {
        return Ok(None);
    }

    let len = u16::from_be_bytes([data[0], data[1]]) as usize;
    if data.remaining() < LENGTH_PREFIX_SIZE + len {
        return Ok(None);
    }

    data.advance(LENGTH_PREFIX_SIZE);
    let payload = data.split_to(len);
    let text = String::from_utf8(payload.to_vec()).map_err(|_| FrameError::InvalidUtf8)?;
    Ok(Some(text))
}

/// Read one frame from an async reader
///
/// Returns `Ok(None)` when the peer closed the stream cleanly between
/// frames. EOF inside a frame is reported as [`FrameError::Truncated`].
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    let mut filled = 0;
    while filled < LENGTH_PREFIX_SIZE {
        let n = reader.read(&mut prefix[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(FrameError::Truncated {
                expected: LENGTH_PREFIX_SIZE,
                received: filled,
            }
            .into());
        }
        filled += n;
    }

    let len = u16::from_be_bytes(prefix) as usize;
    let mut payload = vec![0u8; len];
    let mut received = 0;
    while received < len {
        let n = reader.read(&mut payload[received..]).await?;
        if n == 0 {
            return Err(FrameError::Truncated {
                expected: len,
                received,
            }
            .into());
        }
        received += n;
    }

    let text = String::from_utf8(payload).map_err(|_| FrameError::InvalidUtf8)?;
    Ok(Some(text))
}

/// Write an already-encoded frame and flush
pub async fn write_encoded<W>(writer: &mut W, frame: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer.write_all(frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Encode and write one frame
pub async fn write_frame<W>(writer: &mut W, payload: &str) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let frame = encode_frame(payload)?;
    write_encoded(writer, &frame).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_encode_prefix() {
        let frame = encode_frame("hello").unwrap();
        assert_eq!(&frame[..], &[0x00, 0x05, b'h', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn test_encode_multibyte_length() {
        // The degree sign is two bytes in UTF-8
        let frame = encode_frame("21°C").unwrap();
        assert_eq!(u16::from_be_bytes([frame[0], frame[1]]), 5);
    }

    #[test]
    fn test_encode_too_large() {
        let payload = "x".repeat(MAX_PAYLOAD_LEN + 1);
        let result = encode_frame(&payload);
        assert!(matches!(
            result,
            Err(Error::Frame(FrameError::TooLarge(n))) if n == MAX_PAYLOAD_LEN + 1
        ));
    }

    #[test]
    fn test_encode_max_payload() {
        let payload = "x".repeat(MAX_PAYLOAD_LEN);
        let frame = encode_frame(&payload).unwrap();
        assert_eq!(frame.len(), MAX_PAYLOAD_LEN + LENGTH_PREFIX_SIZE);
    }

    #[test]
    fn test_decode_needs_more_data() {
        let mut data = Bytes::from_static(&[0x00]);
        assert_eq!(decode_frame(&mut data).unwrap(), None);
        assert_eq!(data.len(), 1);

        let mut data = Bytes::from_static(&[0x00, 0x03, b'a']);
        assert_eq!(decode_frame(&mut data).unwrap(), None);
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_decode_consecutive_frames() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&encode_frame("SUBSCRIBE:Kandy").unwrap());
        buf.extend_from_slice(&encode_frame("UNSUBSCRIBE").unwrap());
        let mut data = buf.freeze();

        assert_eq!(
            decode_frame(&mut data).unwrap().as_deref(),
            Some("SUBSCRIBE:Kandy")
        );
        assert_eq!(decode_frame(&mut data).unwrap().as_deref(), Some("UNSUBSCRIBE"));
        assert!(data.is_empty());
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let mut data = Bytes::from_static(&[0x00, 0x02, 0xff, 0xfe]);
        assert!(matches!(
            decode_frame(&mut data),
            Err(Error::Frame(FrameError::InvalidUtf8))
        ));
    }

    #[tokio::test]
    async fn test_read_frame_split_reads() {
        let mut reader = tokio_test::io::Builder::new()
            .read(&[0x00])
            .read(&[0x04, b'R', b'a'])
            .read(b"in")
            .build();

        let text = read_frame(&mut reader).await.unwrap();
        assert_eq!(text.as_deref(), Some("Rain"));
    }

    #[tokio::test]
    async fn test_read_frame_clean_eof() {
        let mut reader = tokio_test::io::Builder::new().build();
        assert_eq!(read_frame(&mut reader).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_frame_truncated_payload() {
        let mut reader = tokio_test::io::Builder::new()
            .read(&[0x00, 0x05, b'S', b'n'])
            .build();

        let err = read_frame(&mut reader).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Frame(FrameError::Truncated {
                expected: 5,
                received: 2
            })
        ));
        assert!(err.is_disconnect());
    }

    #[tokio::test]
    async fn test_read_frame_truncated_prefix() {
        let mut reader = tokio_test::io::Builder::new().read(&[0x00]).build();

        let err = read_frame(&mut reader).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Frame(FrameError::Truncated {
                expected: LENGTH_PREFIX_SIZE,
                received: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_write_then_read_over_duplex() {
        let (mut client, mut server) = tokio::io::duplex(64);

        write_frame(&mut server, "2024-01-01 00:00:00 | Galle").await.unwrap();
        write_frame(&mut server, "second").await.unwrap();

        assert_eq!(
            read_frame(&mut client).await.unwrap().as_deref(),
            Some("2024-01-01 00:00:00 | Galle")
        );
        assert_eq!(read_frame(&mut client).await.unwrap().as_deref(), Some("second"));
    }
}
