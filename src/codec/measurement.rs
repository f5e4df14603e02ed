//! Payload forms, size measurements and selection results.

use serde::{Deserialize, Serialize};

/// Header value announcing the raw payload
pub const IDENTITY_ENCODING: &str = "identity";

/// Header value announcing the gzip+base64 payload
pub const GZIP_BASE64_ENCODING: &str = "gzip+base64";

/// Prefix every raw UIDL payload starts with
pub const UIDL_PREFIX: &[u8] = b"for(";

/// Which stream was put on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadForm {
    /// The payload exactly as the handler produced it
    Raw,
    /// Base64 text of the gzip-compressed payload
    Encoded,
}

impl PayloadForm {
    /// Get the transport header value for this form
    pub fn header_value(&self) -> &'static str {
        match self {
            PayloadForm::Raw => IDENTITY_ENCODING,
            PayloadForm::Encoded => GZIP_BASE64_ENCODING,
        }
    }

    /// Parse a transport header value
    pub fn from_header_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            IDENTITY_ENCODING => Some(PayloadForm::Raw),
            GZIP_BASE64_ENCODING => Some(PayloadForm::Encoded),
            _ => None,
        }
    }

    /// Guess the form from the body alone.
    ///
    /// Raw UIDL starts with `for(`; `(` is not in the base64 alphabet,
    /// so an encoded body can never carry that prefix.
    pub fn sniff(body: &[u8]) -> Self {
        if body.starts_with(UIDL_PREFIX) {
            PayloadForm::Raw
        } else {
            PayloadForm::Encoded
        }
    }
}

impl std::fmt::Display for PayloadForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadForm::Raw => write!(f, "RAW"),
            PayloadForm::Encoded => write!(f, "GZIP+BASE64"),
        }
    }
}

/// Byte counts of one compressed payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadMeasurement {
    /// Size of the payload as produced by the handler
    pub raw_bytes: usize,
    /// Size of the gzip stream
    pub compressed_bytes: usize,
    /// Size of the base64 text of the gzip stream
    pub encoded_bytes: usize,
}

impl PayloadMeasurement {
    /// Create new measurement
    pub fn new(raw_bytes: usize, compressed_bytes: usize, encoded_bytes: usize) -> Self {
        Self {
            raw_bytes,
            compressed_bytes,
            encoded_bytes,
        }
    }

    /// Percentage of the raw size removed by gzip (0 for empty payloads)
    pub fn compression_rate(&self) -> f64 {
        if self.raw_bytes == 0 {
            0.0
        } else {
            (self.raw_bytes as f64 - self.compressed_bytes as f64) / self.raw_bytes as f64 * 100.0
        }
    }

    /// Percentage of the raw size saved on the wire by the encoded form
    pub fn transport_savings_percent(&self) -> f64 {
        if self.raw_bytes == 0 {
            0.0
        } else {
            (self.raw_bytes as f64 - self.encoded_bytes as f64) / self.raw_bytes as f64 * 100.0
        }
    }

    /// Whether the encoded form is no larger than the raw payload
    pub fn encoding_pays_off(&self) -> bool {
        self.encoded_bytes <= self.raw_bytes
    }
}

/// Stream chosen for one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Bytes to write as the response body
    pub body: Vec<u8>,
    /// Which form `body` is in
    pub form: PayloadForm,
    /// Sizes measured, absent when compression is off
    pub measurement: Option<PayloadMeasurement>,
}

impl Selection {
    /// Selection that sends the raw payload without measuring it
    pub fn passthrough(raw: Vec<u8>) -> Self {
        Self {
            body: raw,
            form: PayloadForm::Raw,
            measurement: None,
        }
    }

    /// Number of bytes put on the wire
    pub fn sent_bytes(&self) -> usize {
        self.body.len()
    }

    /// Consume into the response body
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}
