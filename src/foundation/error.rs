/// Convenience result type used across odsynth.
pub type OdsResult<T> = Result<T, OdsError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum OdsError {
    /// Invalid caller-provided data (collections, requests, channel names).
    #[error("validation error: {0}")]
    Validation(String),

    /// A container failed to decode.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Errors raised while running a synthesis pass.
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OdsError {
    /// Build a [`OdsError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`OdsError::Synthesis`] value.
    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::Synthesis(msg.into())
    }

    /// Build a [`OdsError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// Coarse classification of a [`DecodeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// The file uses a container feature outside the supported profile.
    UnsupportedFormat,
    /// The file uses a compression method that is recognized but not implemented.
    UnsupportedCompression,
    /// An attribute declares a type outside the closed set this decoder understands.
    UnsupportedAttribute,
    /// The bytes are truncated or internally inconsistent.
    MalformedStructure,
}

/// Terminal, per-image container decode failure. No partial image accompanies it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Tiled, deep, multipart, non-scanline or subsampled data.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Known compression method that this decoder does not implement.
    #[error("unsupported compression: {0}")]
    UnsupportedCompression(String),

    /// Attribute with a type tag outside the closed set.
    #[error("unsupported attribute type '{type_name}' on attribute '{name}'")]
    UnsupportedAttribute {
        /// Attribute name.
        name: String,
        /// Declared type tag.
        type_name: String,
    },

    /// Corrupt or truncated input.
    #[error("malformed structure: {0}")]
    MalformedStructure(String),
}

impl DecodeError {
    /// Build a [`DecodeError::UnsupportedFormat`] value.
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Build a [`DecodeError::UnsupportedCompression`] value.
    pub fn unsupported_compression(msg: impl Into<String>) -> Self {
        Self::UnsupportedCompression(msg.into())
    }

    /// Build a [`DecodeError::MalformedStructure`] value.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedStructure(msg.into())
    }

    /// Classification of this error.
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            Self::UnsupportedFormat(_) => DecodeErrorKind::UnsupportedFormat,
            Self::UnsupportedCompression(_) => DecodeErrorKind::UnsupportedCompression,
            Self::UnsupportedAttribute { .. } => DecodeErrorKind::UnsupportedAttribute,
            Self::MalformedStructure(_) => DecodeErrorKind::MalformedStructure,
        }
    }

    /// `true` for "not implemented" failures, `false` for corrupt input.
    pub fn is_unsupported(&self) -> bool {
        self.kind() != DecodeErrorKind::MalformedStructure
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
