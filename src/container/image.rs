use std::collections::BTreeMap;

use crate::{
    container::{
        attribute::AttributeValue,
        half::f16_bits_to_f32,
        header::{Box2i, ChannelDesc, PixelType},
    },
    foundation::error::DecodeError,
};

/// Typed sample storage for one channel, row-major, `width · height` entries.
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelSamples {
    /// 32-bit unsigned samples.
    U32(Vec<u32>),
    /// Raw half-precision bit patterns.
    Half(Vec<u16>),
    /// 32-bit float samples.
    F32(Vec<f32>),
}

impl ChannelSamples {
    pub(crate) fn zeroed(pixel_type: PixelType, len: usize) -> Self {
        match pixel_type {
            PixelType::Uint => Self::U32(vec![0; len]),
            PixelType::Half => Self::Half(vec![0; len]),
            PixelType::Float => Self::F32(vec![0.0; len]),
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        match self {
            Self::U32(v) => v.len(),
            Self::Half(v) => v.len(),
            Self::F32(v) => v.len(),
        }
    }

    /// `true` when there are no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample `idx` widened to `f32` without normalization (`u32` values are cast as-is).
    pub fn get_f32(&self, idx: usize) -> Option<f32> {
        match self {
            Self::U32(v) => v.get(idx).map(|s| *s as f32),
            Self::Half(v) => v.get(idx).map(|s| f16_bits_to_f32(*s)),
            Self::F32(v) => v.get(idx).copied(),
        }
    }

    /// Overwrite samples starting at `start` from little-endian bytes.
    pub(crate) fn fill_le(&mut self, start: usize, bytes: &[u8]) -> Result<(), DecodeError> {
        let oob = || DecodeError::malformed("channel row outside sample buffer");
        match self {
            Self::U32(v) => {
                let dst = v.get_mut(start..start + bytes.len() / 4).ok_or_else(oob)?;
                for (d, s) in dst.iter_mut().zip(bytes.chunks_exact(4)) {
                    *d = u32::from_le_bytes([s[0], s[1], s[2], s[3]]);
                }
            }
            Self::Half(v) => {
                let dst = v.get_mut(start..start + bytes.len() / 2).ok_or_else(oob)?;
                for (d, s) in dst.iter_mut().zip(bytes.chunks_exact(2)) {
                    *d = u16::from_le_bytes([s[0], s[1]]);
                }
            }
            Self::F32(v) => {
                let dst = v.get_mut(start..start + bytes.len() / 4).ok_or_else(oob)?;
                for (d, s) in dst.iter_mut().zip(bytes.chunks_exact(4)) {
                    *d = f32::from_le_bytes([s[0], s[1], s[2], s[3]]);
                }
            }
        }
        Ok(())
    }
}

/// One decoded channel.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    /// Declaration from the channel list.
    pub desc: ChannelDesc,
    /// Fully populated samples.
    pub samples: ChannelSamples,
}

/// Decoded single-part scanline image. Immutable once returned by the decoder.
#[derive(Clone, Debug)]
pub struct MultiChannelImage {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) data_window: Box2i,
    pub(crate) attributes: BTreeMap<String, AttributeValue>,
    pub(crate) channels: Vec<Channel>,
}

impl MultiChannelImage {
    /// Width of the data window.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the data window.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Inclusive pixel bounds the samples cover.
    pub fn data_window(&self) -> Box2i {
        self.data_window
    }

    /// All header attributes, by name.
    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }

    /// Look up one attribute.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Channels in declaration order.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Look up a channel by exact name.
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.desc.name == name)
    }

    /// Channel names in declaration order.
    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.desc.name.as_str())
    }

    /// The free-form `Note` string, if present.
    pub fn note(&self) -> Option<&str> {
        self.attribute("Note").and_then(AttributeValue::as_str)
    }

    /// View names from the `multiView` attribute, if present.
    pub fn multi_view(&self) -> Option<&[String]> {
        self.attribute("multiView")
            .and_then(AttributeValue::as_string_vector)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/container/image.rs"]
mod tests;
