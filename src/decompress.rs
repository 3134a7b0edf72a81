//! Content-encoding decompression for response bodies
//!
//! The adapter inspects the declared `Content-Encoding` and wraps the
//! accumulation buffer in the matching decoder: each arriving network chunk
//! is pushed through the decoder and lands decompressed in the buffer, so
//! the stage transforms the stream interface without assembling a compressed
//! copy of the body. Corrupt or mismatched data surfaces as an I/O error at
//! the chunk write or at finalization; the caller classifies both as a
//! compression fault.

use std::io::{self, Write};

use flate2::write::{GzDecoder, ZlibDecoder};

/// Streaming decoder selected from the declared `Content-Encoding`
pub(crate) enum BodyDecoder {
    /// No transformation (absent or unrecognized encoding)
    Identity(Vec<u8>),
    /// `content-encoding: gzip`
    Gzip(GzDecoder<Vec<u8>>),
    /// `content-encoding: deflate` (zlib-wrapped inflate)
    Deflate(ZlibDecoder<Vec<u8>>),
    /// `content-encoding: br` — staged compressed, inflated in one pass at
    /// finalization
    Brotli(Vec<u8>),
}

impl BodyDecoder {
    /// Select the decoder matching the declared content encoding
    ///
    /// Absent or unrecognized encodings pass bytes through untouched.
    pub(crate) fn for_encoding(encoding: Option<&str>) -> Self {
        match encoding.map(str::trim).map(|e| e.to_ascii_lowercase()).as_deref() {
            Some("gzip") => BodyDecoder::Gzip(GzDecoder::new(Vec::new())),
            Some("deflate") => BodyDecoder::Deflate(ZlibDecoder::new(Vec::new())),
            Some("br") => BodyDecoder::Brotli(Vec::new()),
            _ => BodyDecoder::Identity(Vec::new()),
        }
    }

    /// Label used in log fields and fault messages
    pub(crate) fn encoding_name(&self) -> &'static str {
        match self {
            BodyDecoder::Identity(_) => "identity",
            BodyDecoder::Gzip(_) => "gzip",
            BodyDecoder::Deflate(_) => "deflate",
            BodyDecoder::Brotli(_) => "br",
        }
    }

    /// Feed one arriving chunk through the decoder
    ///
    /// An error here means the body does not match its declared encoding.
    pub(crate) fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        match self {
            BodyDecoder::Identity(buf) | BodyDecoder::Brotli(buf) => {
                buf.extend_from_slice(chunk);
                Ok(())
            }
            BodyDecoder::Gzip(decoder) => decoder.write_all(chunk),
            BodyDecoder::Deflate(decoder) => decoder.write_all(chunk),
        }
    }

    /// Finalize the decoder and yield the complete decompressed body
    ///
    /// Truncated compressed input that passed every chunk write surfaces
    /// here.
    pub(crate) fn finish(self) -> io::Result<Vec<u8>> {
        match self {
            BodyDecoder::Identity(buf) => Ok(buf),
            BodyDecoder::Gzip(decoder) => decoder.finish(),
            BodyDecoder::Deflate(decoder) => decoder.finish(),
            BodyDecoder::Brotli(buf) => {
                let mut decompressed = Vec::new();
                brotli::BrotliDecompress(&mut io::Cursor::new(buf), &mut decompressed)?;
                Ok(decompressed)
            }
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::{GzEncoder, ZlibEncoder};

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn brotli_compress(data: &[u8]) -> Vec<u8> {
        let mut compressed = Vec::new();
        {
            let mut compressor = brotli::CompressorWriter::new(&mut compressed, 4096, 5, 22);
            compressor.write_all(data).unwrap();
        }
        compressed
    }

    /// Feed data through a decoder in small chunks, as the network would.
    fn drain(mut decoder: BodyDecoder, data: &[u8]) -> io::Result<Vec<u8>> {
        for chunk in data.chunks(3) {
            decoder.write_chunk(chunk)?;
        }
        decoder.finish()
    }

    #[test]
    fn gzip_round_trips_across_chunk_boundaries() {
        let original = "<html><body>レース結果</body></html>".as_bytes();
        let decoder = BodyDecoder::for_encoding(Some("gzip"));
        let result = drain(decoder, &gzip(original)).unwrap();
        assert_eq!(result, original);
    }

    #[test]
    fn deflate_is_zlib_wrapped() {
        let original = b"odds table body";
        let decoder = BodyDecoder::for_encoding(Some("deflate"));
        let result = drain(decoder, &zlib(original)).unwrap();
        assert_eq!(result, original);
    }

    #[test]
    fn brotli_round_trips() {
        let original = "払戻金 1,234円".as_bytes();
        let decoder = BodyDecoder::for_encoding(Some("br"));
        let result = drain(decoder, &brotli_compress(original)).unwrap();
        assert_eq!(result, original);
    }

    #[test]
    fn absent_encoding_passes_through() {
        let data = b"plain body";
        let decoder = BodyDecoder::for_encoding(None);
        assert_eq!(decoder.encoding_name(), "identity");
        let result = drain(decoder, data).unwrap();
        assert_eq!(result, data);
    }

    #[test]
    fn unrecognized_encoding_passes_through() {
        let data = b"zstd is not in the profile";
        let decoder = BodyDecoder::for_encoding(Some("zstd"));
        assert_eq!(decoder.encoding_name(), "identity");
        let result = drain(decoder, data).unwrap();
        assert_eq!(result, data);
    }

    #[test]
    fn header_value_is_normalized() {
        let decoder = BodyDecoder::for_encoding(Some(" GZIP "));
        assert_eq!(decoder.encoding_name(), "gzip");
    }

    #[test]
    fn non_gzip_bytes_behind_gzip_header_fault() {
        let decoder = BodyDecoder::for_encoding(Some("gzip"));
        let result = drain(decoder, b"<html>this is not gzip</html>");
        assert!(result.is_err(), "mismatched body must fault, not pass through");
    }

    #[test]
    fn truncated_gzip_faults_at_finalization() {
        let compressed = gzip(b"a longer body so truncation actually cuts data");
        let decoder = BodyDecoder::for_encoding(Some("gzip"));
        let result = drain(decoder, &compressed[..compressed.len() / 2]);
        assert!(result.is_err(), "truncated stream must not finalize cleanly");
    }

    #[test]
    fn corrupt_brotli_faults() {
        let decoder = BodyDecoder::for_encoding(Some("br"));
        let result = drain(decoder, &[0x0B, 0xFF, 0xFF, 0xFF, 0x00, 0x12]);
        assert!(result.is_err());
    }
}
