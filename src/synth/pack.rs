//! RGB776D12: 12 bits of depth above 7/7/6 bits of color in one `u32`, so that integer order
//! is depth order and an atomic minimum resolves occlusion.

/// Value of an empty cell: the farthest depth with black color.
pub const CLEAR_SENTINEL: u32 = 0xFFF0_0000;

const DEPTH_LEVELS: f64 = 4095.0;

/// Pack color and a normalized depth in `[0, 1)`.
///
/// Color channels are rounded to 7, 7 and 6 bits; depth is truncated to 12 bits so that any
/// depth below 1.0 packs strictly below [`CLEAR_SENTINEL`].
pub fn pack_rgb776d12(rgb: [u8; 3], depth_norm: f64) -> u32 {
    let scale = |v: u8, max: u32| (u32::from(v) * max + 127) / 255;
    let r7 = scale(rgb[0], 127);
    let g7 = scale(rgb[1], 127);
    let b6 = scale(rgb[2], 63);
    let d12 = (depth_norm.clamp(0.0, 1.0) * DEPTH_LEVELS) as u32;
    ((d12 & 0xFFF) << 20) | ((b6 & 0x3F) << 14) | ((g7 & 0x7F) << 7) | (r7 & 0x7F)
}

/// Quantized depth field.
pub fn depth_bits(packed: u32) -> u32 {
    packed >> 20
}

/// Color of a packed cell, expanded back to 8 bits. Empty cells are opaque black.
pub fn unpack_color(packed: u32) -> [u8; 4] {
    if packed == CLEAR_SENTINEL {
        return [0, 0, 0, 255];
    }
    let expand = |v: u32, max: u32| ((v * 255 + max / 2) / max) as u8;
    [
        expand(packed & 0x7F, 127),
        expand((packed >> 7) & 0x7F, 127),
        expand((packed >> 14) & 0x3F, 63),
        255,
    ]
}

/// Depth of a packed cell in scene units. Empty cells report `z_max`.
pub fn unpack_depth(packed: u32, z_max: f32) -> f32 {
    (f64::from(z_max) * f64::from(depth_bits(packed)) / DEPTH_LEVELS) as f32
}

#[cfg(test)]
#[path = "../../tests/unit/synth/pack.rs"]
mod tests;
