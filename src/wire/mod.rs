//! Length-prefixed wire framing: `[6-digit ASCII decimal length][JSON body]`.
//!
//! Ground truth: `examples/original_source/transfer/message.py`'s
//! `serialize`/`deserialize_from` and
//! `examples/original_source/final/transfer/message_passer.py`'s
//! `_read_length`/`_read_message`/`_write_message`.

pub mod messages;

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};

const LENGTH_DIGITS: usize = 6;
const MAX_BODY_LEN: usize = 999_999;

/// Reads exactly `buf.len()` bytes, treating a zero-byte read as an orderly
/// peer disconnect (if nothing has been read yet) or a truncated frame
/// (if the read stopped partway through).
fn read_exact_or_disconnect<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Err(Error::PeerDisconnected);
            }
            return Err(Error::FrameTooShort(format!(
                "expected {} bytes, got {filled}",
                buf.len()
            )));
        }
        filled += n;
    }
    Ok(())
}

/// Serializes `body` to JSON and writes it as one length-prefixed frame.
pub fn write_frame<W: Write, T: Serialize>(writer: &mut W, body: &T) -> Result<()> {
    let json = serde_json::to_vec(body)?;
    if json.len() > MAX_BODY_LEN {
        return Err(Error::FrameMalformed(format!(
            "body of {} bytes exceeds the 6-digit length prefix",
            json.len()
        )));
    }
    let header = format!("{:0width$}", json.len(), width = LENGTH_DIGITS);
    writer.write_all(header.as_bytes())?;
    writer.write_all(&json)?;
    Ok(())
}

/// Reads one length-prefixed frame and deserializes its JSON body as `T`.
pub fn read_frame<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<T> {
    let mut header = [0u8; LENGTH_DIGITS];
    read_exact_or_disconnect(reader, &mut header)?;
    let header_str =
        std::str::from_utf8(&header).map_err(|e| Error::FrameMalformed(e.to_string()))?;
    let length: usize = header_str
        .parse()
        .map_err(|_| Error::FrameTooShort(format!("bad length prefix {header_str:?}")))?;

    let mut body = vec![0u8; length];
    read_exact_or_disconnect(reader, &mut body)?;
    Ok(serde_json::from_slice(&body)?)
}

/// Hex-encodes byte fields for JSON transport, in place of the source's
/// `latin-1`-per-code-point string encoding (see DESIGN.md).
pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(text).map_err(serde::de::Error::custom)
    }
}

/// The same hex encoding as `hex_bytes`, for fields that may be absent.
pub(crate) mod hex_bytes_option {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_some(&hex::encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let text: Option<String> = Option::deserialize(deserializer)?;
        text.map(|text| hex::decode(text).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::io::Cursor;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Ping {
        value: u32,
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &Ping { value: 7 }).unwrap();
        assert_eq!(&buf[..6], b"000009");

        let mut cursor = Cursor::new(buf);
        let decoded: Ping = read_frame(&mut cursor).unwrap();
        assert_eq!(decoded, Ping { value: 7 });
    }

    #[test]
    fn zero_byte_read_before_any_data_is_peer_disconnected() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        let result: Result<Ping> = read_frame(&mut cursor);
        assert!(matches!(result, Err(Error::PeerDisconnected)));
    }

    #[test]
    fn truncated_frame_is_frame_too_short() {
        let mut cursor = Cursor::new(b"000100{}".to_vec());
        let result: Result<Ping> = read_frame(&mut cursor);
        assert!(matches!(result, Err(Error::FrameTooShort(_))));
    }
}
