use glam::{IVec2, IVec3, Vec2, Vec3};

use crate::{
    container::{
        cursor::Cursor,
        header::{Box2f, Box2i, ChannelDesc, Compression, LineOrder, PixelType},
    },
    foundation::error::DecodeError,
};

/// Typed value of one header attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    /// `int`
    Int(i32),
    /// `float`
    Float(f32),
    /// `string`
    String(String),
    /// `compression`
    Compression(Compression),
    /// `lineOrder`
    LineOrder(LineOrder),
    /// `v2i`
    V2i(IVec2),
    /// `v2f`
    V2f(Vec2),
    /// `v3i`
    V3i(IVec3),
    /// `v3f`
    V3f(Vec3),
    /// `box2i`
    Box2i(Box2i),
    /// `box2f`
    Box2f(Box2f),
    /// `stringvector`
    StringVector(Vec<String>),
    /// `chlist`
    ChannelList(Vec<ChannelDesc>),
    /// Payload of a type outside the closed set, kept verbatim on request.
    Opaque {
        /// Declared type tag.
        type_name: String,
        /// Raw payload bytes.
        bytes: Vec<u8>,
    },
}

impl AttributeValue {
    /// Type tag as it appears in the file.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Compression(_) => "compression",
            Self::LineOrder(_) => "lineOrder",
            Self::V2i(_) => "v2i",
            Self::V2f(_) => "v2f",
            Self::V3i(_) => "v3i",
            Self::V3f(_) => "v3f",
            Self::Box2i(_) => "box2i",
            Self::Box2f(_) => "box2f",
            Self::StringVector(_) => "stringvector",
            Self::ChannelList(_) => "chlist",
            Self::Opaque { type_name, .. } => type_name,
        }
    }

    /// The string payload, if this is a `string` attribute.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The list payload, if this is a `stringvector` attribute.
    pub fn as_string_vector(&self) -> Option<&[String]> {
        match self {
            Self::StringVector(v) => Some(v),
            _ => None,
        }
    }
}

/// Payload size for fixed-size types, `None` for variable-size ones.
fn fixed_size(type_name: &str) -> Option<usize> {
    match type_name {
        "int" | "float" => Some(4),
        "compression" | "lineOrder" => Some(1),
        "v2i" | "v2f" => Some(8),
        "v3i" | "v3f" => Some(12),
        "box2i" | "box2f" => Some(16),
        _ => None,
    }
}

/// `true` when `type_name` belongs to the closed set of understood types.
pub(crate) fn is_known_type(type_name: &str) -> bool {
    fixed_size(type_name).is_some() || matches!(type_name, "string" | "stringvector" | "chlist")
}

/// Parse the payload of a known-type attribute.
pub(crate) fn parse_value(
    name: &str,
    type_name: &str,
    payload: &[u8],
    max_name_len: usize,
) -> Result<AttributeValue, DecodeError> {
    if let Some(expected) = fixed_size(type_name)
        && payload.len() != expected
    {
        return Err(DecodeError::malformed(format!(
            "attribute '{name}' of type {type_name} has size {}, expected {expected}",
            payload.len()
        )));
    }

    let mut c = Cursor::new(payload);
    let value = match type_name {
        "int" => AttributeValue::Int(c.read_i32()?),
        "float" => AttributeValue::Float(c.read_f32()?),
        "string" => AttributeValue::String(String::from_utf8_lossy(payload).into_owned()),
        "compression" => AttributeValue::Compression(Compression::from_byte(c.read_u8()?)?),
        "lineOrder" => AttributeValue::LineOrder(LineOrder::from_byte(c.read_u8()?)?),
        "v2i" => AttributeValue::V2i(IVec2::new(c.read_i32()?, c.read_i32()?)),
        "v2f" => AttributeValue::V2f(Vec2::new(c.read_f32()?, c.read_f32()?)),
        "v3i" => AttributeValue::V3i(IVec3::new(c.read_i32()?, c.read_i32()?, c.read_i32()?)),
        "v3f" => AttributeValue::V3f(Vec3::new(c.read_f32()?, c.read_f32()?, c.read_f32()?)),
        "box2i" => AttributeValue::Box2i(Box2i {
            min: IVec2::new(c.read_i32()?, c.read_i32()?),
            max: IVec2::new(c.read_i32()?, c.read_i32()?),
        }),
        "box2f" => AttributeValue::Box2f(Box2f {
            min: Vec2::new(c.read_f32()?, c.read_f32()?),
            max: Vec2::new(c.read_f32()?, c.read_f32()?),
        }),
        "stringvector" => AttributeValue::StringVector(parse_string_vector(&mut c)?),
        "chlist" => AttributeValue::ChannelList(parse_channel_list(&mut c, max_name_len)?),
        other => {
            return Err(DecodeError::UnsupportedAttribute {
                name: name.to_owned(),
                type_name: other.to_owned(),
            });
        }
    };
    Ok(value)
}

fn parse_string_vector(c: &mut Cursor<'_>) -> Result<Vec<String>, DecodeError> {
    let mut out = Vec::new();
    while c.remaining() > 0 {
        let len = c.read_i32()?;
        let len = usize::try_from(len)
            .map_err(|_| DecodeError::malformed(format!("negative string length {len}")))?;
        out.push(String::from_utf8_lossy(c.read_bytes(len)?).into_owned());
    }
    Ok(out)
}

fn parse_channel_list(
    c: &mut Cursor<'_>,
    max_name_len: usize,
) -> Result<Vec<ChannelDesc>, DecodeError> {
    let mut out = Vec::new();
    loop {
        if c.peek_u8() == Some(0) {
            c.read_u8()?;
            break;
        }
        let name = c.read_cstr(max_name_len)?;
        let pixel_type = PixelType::from_i32(c.read_i32()?)?;
        let p_linear = c.read_u8()? != 0;
        c.read_bytes(3)?;
        let x_sampling = c.read_i32()?;
        let y_sampling = c.read_i32()?;
        out.push(ChannelDesc {
            name,
            pixel_type,
            p_linear,
            x_sampling,
            y_sampling,
        });
    }
    if c.remaining() != 0 {
        return Err(DecodeError::malformed("trailing bytes after channel list"));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/container/attribute.rs"]
mod tests;
