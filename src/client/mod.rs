//! Client-side payload decoding.
//!
//! Recovers the original UIDL payload from a response body. The form is
//! taken from the `X-Uidl-Encoding` header when the server sent one;
//! otherwise the body is sniffed for the raw `for(` prefix.

use std::sync::OnceLock;
use std::time::Instant;

use crate::codec::{GzipCodec, PayloadForm};
use crate::error::{CompressorError, Result};

/// Header announcing which form the body is in
pub const ENCODING_HEADER: &str = "x-uidl-encoding";

/// Stateless payload decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadDecoder {
    codec: GzipCodec,
}

impl PayloadDecoder {
    /// Create new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Determine the form of a body.
    ///
    /// An unknown header value is an error rather than a guess.
    pub fn detect(&self, body: &[u8], header: Option<&str>) -> Result<PayloadForm> {
        match header {
            Some(value) => PayloadForm::from_header_value(value).ok_or_else(|| {
                CompressorError::Decode(format!("Unknown payload encoding: {value}"))
            }),
            None => Ok(PayloadForm::sniff(body)),
        }
    }

    /// Recover the original payload
    pub fn decode(&self, body: &[u8], header: Option<&str>) -> Result<Vec<u8>> {
        match self.detect(body, header)? {
            PayloadForm::Raw => Ok(body.to_vec()),
            PayloadForm::Encoded => {
                let start = Instant::now();
                let decoded = self.codec.decode_decompress(body)?;
                tracing::debug!(
                    encoded_bytes = body.len(),
                    decoded_bytes = decoded.len(),
                    "Decoding UIDL took {}ms",
                    start.elapsed().as_millis()
                );
                Ok(decoded)
            },
        }
    }

    /// Recover the original payload as UTF-8 text
    pub fn decode_text(&self, body: &[u8], header: Option<&str>) -> Result<String> {
        let decoded = self.decode(body, header)?;
        String::from_utf8(decoded)
            .map_err(|e| CompressorError::Decompression(format!("Invalid UTF-8: {e}")))
    }
}

/// Response body whose decoded text is computed once on first access
#[derive(Debug)]
pub struct DecodedResponse {
    body: Vec<u8>,
    header: Option<String>,
    decoder: PayloadDecoder,
    text: OnceLock<String>,
}

impl DecodedResponse {
    /// Wrap a received body and its encoding header
    pub fn new(body: Vec<u8>, header: Option<String>) -> Self {
        Self {
            body,
            header,
            decoder: PayloadDecoder::new(),
            text: OnceLock::new(),
        }
    }

    /// Body exactly as received
    pub fn raw_body(&self) -> &[u8] {
        &self.body
    }

    /// Form the body was received in
    pub fn form(&self) -> Result<PayloadForm> {
        self.decoder.detect(&self.body, self.header.as_deref())
    }

    /// Decoded payload text
    pub fn text(&self) -> Result<&str> {
        if let Some(text) = self.text.get() {
            return Ok(text);
        }

        let text = self
            .decoder
            .decode_text(&self.body, self.header.as_deref())?;
        Ok(self.text.get_or_init(|| text))
    }
}
