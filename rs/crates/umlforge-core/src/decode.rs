//! Payload decoding: base64 → image handle.
//!
//! The generator answers with either base64 image bytes or raw diagram source
//! and never says which. [`decode_payload`] tries the image interpretation;
//! callers show the original string as text on any [`DecodeError`].

use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

/// Browser `atob` semantics: padding optional, stray trailing bits accepted.
const FORGIVING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

pub const DEFAULT_MIME: &str = "image/jpeg";
pub const DEFAULT_CHUNK_SIZE: usize = 512;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload is empty")]
    Empty,

    /// `offset` is the byte index in the original payload, whitespace included.
    /// Length errors point at the end of the payload.
    #[error("invalid base64 at offset {offset}")]
    InvalidBase64 { offset: usize },

    #[error("decoded {len} bytes are not a recognised image")]
    NotAnImage { len: usize },
}

#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// MIME tag used when sniffing is off.
    pub mime: String,
    /// Input characters decoded per step; rounded down to a multiple of 4.
    pub chunk_size: usize,
    /// Reject decoded bytes that are not a known image format.
    pub sniff: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            mime: DEFAULT_MIME.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            sniff: true,
        }
    }
}

/// Decoded image bytes tagged with a MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    mime: String,
    bytes: Vec<u8>,
}

impl ImageHandle {
    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `data:` URI usable directly as an `<img src>`.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Decode a base64 payload into an image handle.
///
/// ASCII whitespace is skipped, the rest is decoded `chunk_size` characters at
/// a time into one buffer.
pub fn decode_payload(payload: &str, opts: &DecodeOptions) -> Result<ImageHandle, DecodeError> {
    // Kept alongside each significant byte so errors point into `payload`.
    let (positions, compact): (Vec<usize>, Vec<u8>) = payload
        .bytes()
        .enumerate()
        .filter(|(_, b)| !b.is_ascii_whitespace())
        .unzip();
    if compact.is_empty() {
        return Err(DecodeError::Empty);
    }

    let step = (opts.chunk_size / 4).max(1) * 4;
    let mut bytes = Vec::with_capacity(compact.len() / 4 * 3 + 3);
    for (i, chunk) in compact.chunks(step).enumerate() {
        if let Err(e) = FORGIVING.decode_vec(chunk, &mut bytes) {
            let at = i * step + error_offset(&e, chunk.len());
            let offset = positions.get(at).copied().unwrap_or(payload.len());
            return Err(DecodeError::InvalidBase64 { offset });
        }
    }

    let mime = if opts.sniff {
        match infer::get(&bytes) {
            Some(kind) if kind.matcher_type() == infer::MatcherType::Image => {
                kind.mime_type().to_string()
            }
            _ => return Err(DecodeError::NotAnImage { len: bytes.len() }),
        }
    } else {
        opts.mime.clone()
    };

    Ok(ImageHandle { mime, bytes })
}

fn error_offset(err: &base64::DecodeError, chunk_len: usize) -> usize {
    match err {
        base64::DecodeError::InvalidByte(offset, _)
        | base64::DecodeError::InvalidLastSymbol(offset, _) => *offset,
        _ => chunk_len,
    }
}
