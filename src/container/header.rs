use std::collections::BTreeMap;

use glam::{IVec2, Vec2};

use crate::{
    container::{
        attribute::{self, AttributeValue},
        cursor::Cursor,
    },
    foundation::error::DecodeError,
};

pub(crate) const MAGIC: u32 = 0x0131_2F76;

const FLAG_TILED: u32 = 0x200;
const FLAG_LONG_NAMES: u32 = 0x400;
const FLAG_DEEP: u32 = 0x800;
const FLAG_MULTIPART: u32 = 0x1000;

/// Block compression method declared by the `compression` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Uncompressed.
    None,
    /// Run-length encoding.
    Rle,
    /// zlib, one scanline per block.
    Zips,
    /// zlib, sixteen scanlines per block.
    Zip,
    /// Wavelet.
    Piz,
    /// Lossy 24-bit float.
    Pxr24,
    /// Lossy 4×4 blocks.
    B44,
    /// Lossy 4×4 blocks with flat-area optimization.
    B44a,
    /// Lossy DCT, 32 scanlines.
    Dwaa,
    /// Lossy DCT, 256 scanlines.
    Dwab,
}

impl Compression {
    /// Map the on-disk enum byte.
    pub fn from_byte(b: u8) -> Result<Self, DecodeError> {
        Ok(match b {
            0 => Self::None,
            1 => Self::Rle,
            2 => Self::Zips,
            3 => Self::Zip,
            4 => Self::Piz,
            5 => Self::Pxr24,
            6 => Self::B44,
            7 => Self::B44a,
            8 => Self::Dwaa,
            9 => Self::Dwab,
            other => {
                return Err(DecodeError::malformed(format!(
                    "unknown compression value {other}"
                )));
            }
        })
    }

    /// Scanlines stored per block.
    pub fn lines_per_block(self) -> u32 {
        match self {
            Self::None | Self::Rle | Self::Zips => 1,
            Self::Zip | Self::Pxr24 => 16,
            Self::Piz | Self::B44 | Self::B44a | Self::Dwaa => 32,
            Self::Dwab => 256,
        }
    }

    /// `true` for the methods this decoder implements.
    pub fn is_supported(self) -> bool {
        matches!(self, Self::None | Self::Zip | Self::Zips)
    }

    /// Lowercase name used in messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Rle => "rle",
            Self::Zips => "zips",
            Self::Zip => "zip",
            Self::Piz => "piz",
            Self::Pxr24 => "pxr24",
            Self::B44 => "b44",
            Self::B44a => "b44a",
            Self::Dwaa => "dwaa",
            Self::Dwab => "dwab",
        }
    }
}

/// Scanline ordering hint. Blocks are located through the offset table, so it does not affect
/// decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineOrder {
    /// Top to bottom.
    IncreasingY,
    /// Bottom to top.
    DecreasingY,
    /// Arbitrary.
    RandomY,
}

impl LineOrder {
    /// Map the on-disk enum byte.
    pub fn from_byte(b: u8) -> Result<Self, DecodeError> {
        match b {
            0 => Ok(Self::IncreasingY),
            1 => Ok(Self::DecreasingY),
            2 => Ok(Self::RandomY),
            other => Err(DecodeError::malformed(format!(
                "unknown lineOrder value {other}"
            ))),
        }
    }
}

/// Sample storage type of a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelType {
    /// 32-bit unsigned integer.
    Uint,
    /// 16-bit IEEE half.
    Half,
    /// 32-bit IEEE float.
    Float,
}

impl PixelType {
    /// Map the on-disk enum value.
    pub fn from_i32(v: i32) -> Result<Self, DecodeError> {
        match v {
            0 => Ok(Self::Uint),
            1 => Ok(Self::Half),
            2 => Ok(Self::Float),
            other => Err(DecodeError::malformed(format!("unknown pixel type {other}"))),
        }
    }

    /// Bytes per sample.
    pub fn bytes(self) -> usize {
        match self {
            Self::Half => 2,
            Self::Uint | Self::Float => 4,
        }
    }
}

/// One entry of the `channels` attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelDesc {
    /// Channel name, e.g. `R` or `Depth.left.V`.
    pub name: String,
    /// Storage type.
    pub pixel_type: PixelType,
    /// Perceptually-linear hint.
    pub p_linear: bool,
    /// Horizontal subsampling.
    pub x_sampling: i32,
    /// Vertical subsampling.
    pub y_sampling: i32,
}

/// Integer box with inclusive corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Box2i {
    /// Inclusive minimum corner.
    pub min: IVec2,
    /// Inclusive maximum corner.
    pub max: IVec2,
}

impl Box2i {
    /// Width and height of the inclusive extents, `None` when empty or overflowing.
    pub fn size(self) -> Option<(u32, u32)> {
        let w = i64::from(self.max.x) - i64::from(self.min.x) + 1;
        let h = i64::from(self.max.y) - i64::from(self.min.y) + 1;
        if w <= 0 || h <= 0 {
            return None;
        }
        Some((u32::try_from(w).ok()?, u32::try_from(h).ok()?))
    }
}

/// Float box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Box2f {
    /// Minimum corner.
    pub min: Vec2,
    /// Maximum corner.
    pub max: Vec2,
}

/// Options controlling header leniency.
#[derive(Clone, Debug, Default)]
pub struct DecodeOptions {
    /// Keep attributes of unknown type as [`AttributeValue::Opaque`] instead of failing.
    pub keep_unknown_attributes: bool,
}

/// Parsed header with the required attributes pulled out.
#[derive(Clone, Debug)]
pub(crate) struct Header {
    pub(crate) attributes: BTreeMap<String, AttributeValue>,
    pub(crate) channels: Vec<ChannelDesc>,
    pub(crate) compression: Compression,
    pub(crate) data_window: Box2i,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Header {
    /// Number of blocks and entries in the offset table.
    pub(crate) fn block_count(&self) -> usize {
        self.height.div_ceil(self.compression.lines_per_block()) as usize
    }
}

/// Read magic, version and attributes up to and including the terminating null byte.
pub(crate) fn read_header(c: &mut Cursor<'_>, opts: &DecodeOptions) -> Result<Header, DecodeError> {
    let magic = c.read_u32()?;
    if magic != MAGIC {
        return Err(DecodeError::malformed(format!("bad magic number {magic:#010x}")));
    }
    let version = c.read_u32()?;
    if version & 0xFF != 2 {
        return Err(DecodeError::unsupported_format(format!(
            "file version {}",
            version & 0xFF
        )));
    }
    if version & FLAG_TILED != 0 {
        return Err(DecodeError::unsupported_format("tiled images"));
    }
    if version & FLAG_DEEP != 0 {
        return Err(DecodeError::unsupported_format("deep data"));
    }
    if version & FLAG_MULTIPART != 0 {
        return Err(DecodeError::unsupported_format("multipart files"));
    }
    let max_name_len = if version & FLAG_LONG_NAMES != 0 { 255 } else { 31 };

    let mut attributes = BTreeMap::new();
    loop {
        match c.peek_u8() {
            None => return Err(DecodeError::malformed("header ends without terminator")),
            Some(0) => {
                c.read_u8()?;
                break;
            }
            Some(_) => {}
        }
        let name = c.read_cstr(max_name_len)?;
        let type_name = c.read_cstr(max_name_len)?;
        let size = c.read_i32()?;
        let size = usize::try_from(size).map_err(|_| {
            DecodeError::malformed(format!("attribute '{name}' has negative size {size}"))
        })?;
        let payload = c.read_bytes(size)?;

        let value = if attribute::is_known_type(&type_name) {
            attribute::parse_value(&name, &type_name, payload, max_name_len)?
        } else if opts.keep_unknown_attributes {
            tracing::warn!(attribute = %name, type_name = %type_name, "keeping unknown attribute");
            AttributeValue::Opaque {
                type_name,
                bytes: payload.to_vec(),
            }
        } else {
            return Err(DecodeError::UnsupportedAttribute { name, type_name });
        };
        attributes.insert(name, value);
    }

    let channels = match attributes.get("channels") {
        Some(AttributeValue::ChannelList(list)) => list.clone(),
        Some(_) => return Err(DecodeError::malformed("'channels' is not a chlist")),
        None => return Err(DecodeError::malformed("missing required attribute 'channels'")),
    };
    let compression = match attributes.get("compression") {
        Some(AttributeValue::Compression(c)) => *c,
        Some(_) => return Err(DecodeError::malformed("'compression' has the wrong type")),
        None => {
            return Err(DecodeError::malformed(
                "missing required attribute 'compression'",
            ));
        }
    };
    let data_window = match attributes.get("dataWindow") {
        Some(AttributeValue::Box2i(b)) => *b,
        Some(_) => return Err(DecodeError::malformed("'dataWindow' is not a box2i")),
        None => {
            return Err(DecodeError::malformed(
                "missing required attribute 'dataWindow'",
            ));
        }
    };

    if !compression.is_supported() {
        return Err(DecodeError::unsupported_compression(compression.name()));
    }
    if let Some(ch) = channels
        .iter()
        .find(|ch| ch.x_sampling != 1 || ch.y_sampling != 1)
    {
        return Err(DecodeError::unsupported_format(format!(
            "subsampled channel '{}' ({}x{})",
            ch.name, ch.x_sampling, ch.y_sampling
        )));
    }
    let (width, height) = data_window
        .size()
        .ok_or_else(|| DecodeError::malformed("empty or inverted dataWindow"))?;

    Ok(Header {
        attributes,
        channels,
        compression,
        data_window,
        width,
        height,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/container/header.rs"]
mod tests;
