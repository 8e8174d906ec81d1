//! Run-length variable-length (RVL) lossless coding of 16-bit depth maps.
//!
//! Samples are grouped into runs of zeros and non-zeros. Each run length, and the zig-zag delta
//! of each non-zero sample against the previous non-zero one, is written as little groups of three
//! bits, lowest first, with bit 3 of every nibble flagging a continuation. Eight nibbles fill one
//! little-endian `u32` word starting at its most significant nibble.

use crate::foundation::error::{OdsError, OdsResult};

const MAGIC: &[u8; 4] = b"RVL\n";
const HEADER_LEN: usize = 20;

/// Map a metric depth onto the 16-bit inverse-depth scale used by RVL files.
///
/// Depths at or beyond `far` become 0, which doubles as "no sample".
pub fn quantize_depth(depth: f32, near: f32, far: f32) -> u16 {
    if depth.is_nan() || depth >= far {
        return 0;
    }
    let (d, n, f) = (f64::from(depth), f64::from(near), f64::from(far));
    let z = ((1.0 / d - 1.0 / n) / (1.0 / f - 1.0 / n)).clamp(0.0, 1.0);
    (65535.0 * (1.0 - z)).round() as u16
}

/// Inverse of [`quantize_depth`]. Zero maps to `far`.
pub fn dequantize_depth(q: u16, near: f32, far: f32) -> f32 {
    if q == 0 {
        return far;
    }
    let (n, f) = (f64::from(near), f64::from(far));
    let z = 1.0 - f64::from(q) / 65535.0;
    (n * f / (f - z * (f - n))) as f32
}

struct NibbleWriter {
    out: Vec<u8>,
    word: u32,
    nibbles: u32,
}

impl NibbleWriter {
    fn push(&mut self, mut value: u32) {
        loop {
            let mut nibble = value & 0x7;
            value >>= 3;
            if value != 0 {
                nibble |= 0x8;
            }
            self.word = (self.word << 4) | nibble;
            self.nibbles += 1;
            if self.nibbles == 8 {
                self.out.extend_from_slice(&self.word.to_le_bytes());
                self.word = 0;
                self.nibbles = 0;
            }
            if value == 0 {
                break;
            }
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.nibbles > 0 {
            let word = self.word << (4 * (8 - self.nibbles));
            self.out.extend_from_slice(&word.to_le_bytes());
        }
        self.out
    }
}

struct NibbleReader<'a> {
    words: std::slice::ChunksExact<'a, u8>,
    word: u32,
    nibbles: u32,
}

impl NibbleReader<'_> {
    fn next(&mut self) -> OdsResult<u32> {
        let mut value = 0u32;
        let mut shift = 0u32;
        loop {
            if self.nibbles == 0 {
                let bytes = self
                    .words
                    .next()
                    .ok_or_else(|| OdsError::validation("rvl stream ended early"))?;
                self.word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                self.nibbles = 8;
            }
            let nibble = self.word >> 28;
            self.word <<= 4;
            self.nibbles -= 1;
            if shift >= 32 {
                return Err(OdsError::validation("rvl value overflows 32 bits"));
            }
            value |= (nibble & 0x7) << shift;
            shift += 3;
            if nibble & 0x8 == 0 {
                return Ok(value);
            }
        }
    }
}

fn zigzag(delta: i16) -> u32 {
    u32::from(((delta << 1) ^ (delta >> 15)) as u16)
}

/// Accepts both signed zig-zag codes and the `2·delta` codes of writers that take the delta
/// on wrapped `u16` samples (up to 131070).
fn unzigzag(v: u32) -> i16 {
    ((v >> 1) as u16 as i16) ^ -((v & 1) as i16)
}

/// Encode samples. Deltas wrap in 16 bits, so every `u16` sequence round-trips.
pub fn encode_rvl(samples: &[u16]) -> Vec<u8> {
    let mut w = NibbleWriter {
        out: Vec::with_capacity(samples.len()),
        word: 0,
        nibbles: 0,
    };
    let mut previous = 0u16;
    let mut i = 0;
    while i < samples.len() {
        let zeros = samples[i..].iter().take_while(|s| **s == 0).count();
        i += zeros;
        let nonzeros = samples[i..].iter().take_while(|s| **s != 0).count();
        w.push(zeros as u32);
        w.push(nonzeros as u32);
        for s in &samples[i..i + nonzeros] {
            w.push(zigzag((*s as i16).wrapping_sub(previous as i16)));
            previous = *s;
        }
        i += nonzeros;
    }
    w.finish()
}

/// Decode exactly `count` samples.
pub fn decode_rvl(data: &[u8], count: usize) -> OdsResult<Vec<u16>> {
    if data.len() % 4 != 0 {
        return Err(OdsError::validation(format!(
            "rvl payload is {} bytes, not a whole number of words",
            data.len()
        )));
    }
    let mut r = NibbleReader {
        words: data.chunks_exact(4),
        word: 0,
        nibbles: 0,
    };
    let mut out = Vec::with_capacity(count.min(data.len().saturating_mul(8)));
    let mut previous = 0u16;
    while out.len() < count {
        let zeros = r.next()? as usize;
        let nonzeros = r.next()? as usize;
        if zeros + nonzeros == 0 {
            return Err(OdsError::validation("rvl stream holds an empty run"));
        }
        if zeros + nonzeros > count - out.len() {
            return Err(OdsError::validation(format!(
                "rvl run of {} samples overruns the {count} expected",
                zeros + nonzeros
            )));
        }
        out.resize(out.len() + zeros, 0);
        for _ in 0..nonzeros {
            let current = (previous as i16).wrapping_add(unzigzag(r.next()?)) as u16;
            out.push(current);
            previous = current;
        }
    }
    Ok(out)
}

/// A depth map stored as `"RVL\n"`, width, height, near, far, then the RVL payload.
#[derive(Clone, Debug, PartialEq)]
pub struct RvlDepthImage {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Near plane of the inverse-depth scale.
    pub near: f32,
    /// Far plane; also the depth of empty samples.
    pub far: f32,
    /// Quantized samples, row-major.
    pub samples: Vec<u16>,
}

impl RvlDepthImage {
    /// Quantize metric depths.
    pub fn from_depths(
        width: u32,
        height: u32,
        near: f32,
        far: f32,
        depths: &[f32],
    ) -> OdsResult<Self> {
        if !(near > 0.0 && far > near) {
            return Err(OdsError::validation("rvl needs 0 < near < far"));
        }
        if depths.len() != width as usize * height as usize {
            return Err(OdsError::validation(format!(
                "{} depths for a {width}x{height} image",
                depths.len()
            )));
        }
        Ok(Self {
            width,
            height,
            near,
            far,
            samples: depths
                .iter()
                .map(|d| quantize_depth(*d, near, far))
                .collect(),
        })
    }

    /// Metric depths, row-major.
    pub fn depths(&self) -> Vec<f32> {
        self.samples
            .iter()
            .map(|q| dequantize_depth(*q, self.near, self.far))
            .collect()
    }

    /// Serialize to the file layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.samples.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.near.to_le_bytes());
        out.extend_from_slice(&self.far.to_le_bytes());
        out.extend_from_slice(&encode_rvl(&self.samples));
        out
    }

    /// Parse the file layout.
    pub fn from_bytes(bytes: &[u8]) -> OdsResult<Self> {
        if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
            return Err(OdsError::validation("not an RVL depth image"));
        }
        let word = |at: usize| [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]];
        let width = u32::from_le_bytes(word(4));
        let height = u32::from_le_bytes(word(8));
        let near = f32::from_le_bytes(word(12));
        let far = f32::from_le_bytes(word(16));
        let count = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| OdsError::validation("rvl image size overflows"))?;
        let samples = decode_rvl(&bytes[HEADER_LEN..], count)?;
        Ok(Self {
            width,
            height,
            near,
            far,
            samples,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/rvl.rs"]
mod tests;
