//! Response body decoding
//!
//! The engine advertises `Accept-Encoding: gzip, deflate, br` and owns the
//! matching decompression instead of delegating it to the transport, so the
//! declared `content-encoding` decides the codec here. A missing or
//! unrecognized encoding passes the body through untouched.

use std::io::Read;

use flate2::read::{GzDecoder, ZlibDecoder};
use tracing::trace;

use crate::error::{Error, Result};

/// Buffer size for the brotli decoder
const BROTLI_BUFFER_SIZE: usize = 4096;

/// Decompress `body` according to the response `content-encoding`.
pub fn decompress(body: &[u8], encoding: Option<&str>) -> Result<Vec<u8>> {
    match encoding {
        Some("gzip") => {
            trace!("gzip decompression of {} bytes", body.len());
            let mut decoded = Vec::new();
            GzDecoder::new(body)
                .read_to_end(&mut decoded)
                .map_err(|source| Error::Decompress {
                    encoding: "gzip".to_string(),
                    source,
                })?;
            Ok(decoded)
        }
        Some("deflate") => {
            trace!("deflate decompression of {} bytes", body.len());
            let mut decoded = Vec::new();
            ZlibDecoder::new(body)
                .read_to_end(&mut decoded)
                .map_err(|source| Error::Decompress {
                    encoding: "deflate".to_string(),
                    source,
                })?;
            Ok(decoded)
        }
        Some("br") => {
            trace!("brotli decompression of {} bytes", body.len());
            let mut decoded = Vec::new();
            brotli::Decompressor::new(body, BROTLI_BUFFER_SIZE)
                .read_to_end(&mut decoded)
                .map_err(|source| Error::Decompress {
                    encoding: "br".to_string(),
                    source,
                })?;
            Ok(decoded)
        }
        _ => Ok(body.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PAYLOAD: &[u8] = br#"{"retcode":0,"message":"ok","data":{"x":1}}"#;

    #[test]
    fn test_gzip_round_trip() {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(PAYLOAD).unwrap();
        let compressed = encoder.finish().unwrap();

        let decoded = decompress(&compressed, Some("gzip")).unwrap();
        assert_eq!(decoded, PAYLOAD);
    }

    #[test]
    fn test_deflate_round_trip() {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(PAYLOAD).unwrap();
        let compressed = encoder.finish().unwrap();

        let decoded = decompress(&compressed, Some("deflate")).unwrap();
        assert_eq!(decoded, PAYLOAD);
    }

    #[test]
    fn test_brotli_round_trip() {
        let mut compressed = Vec::new();
        {
            let mut encoder =
                brotli::CompressorWriter::new(&mut compressed, BROTLI_BUFFER_SIZE, 5, 22);
            encoder.write_all(PAYLOAD).unwrap();
        }

        let decoded = decompress(&compressed, Some("br")).unwrap();
        assert_eq!(decoded, PAYLOAD);
    }

    #[test]
    fn test_unknown_encoding_passes_through() {
        assert_eq!(decompress(PAYLOAD, None).unwrap(), PAYLOAD);
        assert_eq!(decompress(PAYLOAD, Some("identity")).unwrap(), PAYLOAD);
    }

    #[test]
    fn test_corrupt_gzip_fails() {
        let result = decompress(b"definitely not gzip", Some("gzip"));
        assert!(matches!(result, Err(Error::Decompress { .. })));
    }
}
