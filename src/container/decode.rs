use rayon::prelude::*;

use crate::{
    container::{
        block,
        cursor::Cursor,
        header::{DecodeOptions, read_header},
        image::{Channel, ChannelSamples, MultiChannelImage},
    },
    foundation::error::DecodeError,
};

/// Upper bound on decoded bytes per input byte; deflate cannot exceed roughly 1032:1.
const MAX_INFLATE_RATIO: usize = 4096;

/// Decode a single-part scanline container with default options.
///
/// Either every declared channel is fully populated or an error is returned; there is no partial
/// result.
pub fn decode_container(bytes: &[u8]) -> Result<MultiChannelImage, DecodeError> {
    decode_container_with(bytes, &DecodeOptions::default())
}

/// Decode a single-part scanline container.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode_container_with(
    bytes: &[u8],
    opts: &DecodeOptions,
) -> Result<MultiChannelImage, DecodeError> {
    let mut c = Cursor::new(bytes);
    let header = read_header(&mut c, opts)?;

    let pixel_count = (header.width as usize)
        .checked_mul(header.height as usize)
        .ok_or_else(|| DecodeError::malformed("data window too large"))?;
    let block_count = header.block_count();
    let lines = header.compression.lines_per_block();

    // Validate the table against the buffer before allocating sample storage.
    let mut offsets = Vec::with_capacity(block_count.min(c.remaining() / 8 + 1));
    for _ in 0..block_count {
        offsets.push(c.read_u64_48()?);
    }
    let row_bytes = block::row_bytes(&header);
    if row_bytes
        .checked_mul(header.height as usize)
        .is_none_or(|total| total > bytes.len().saturating_mul(MAX_INFLATE_RATIO))
    {
        return Err(DecodeError::malformed(
            "declared image size is implausible for the buffer",
        ));
    }

    let mut samples: Vec<ChannelSamples> = header
        .channels
        .iter()
        .map(|desc| ChannelSamples::zeroed(desc.pixel_type, pixel_count))
        .collect();

    let mut seen = vec![false; block_count];
    for offset in offsets {
        let offset = usize::try_from(offset)
            .map_err(|_| DecodeError::malformed("block offset out of range"))?;
        c.seek(offset)?;
        let y = c.read_i32()?;
        let size = c.read_i32()?;
        let size = usize::try_from(size)
            .map_err(|_| DecodeError::malformed(format!("negative block size {size}")))?;
        let payload = c.read_bytes(size)?;

        let rel = i64::from(y) - i64::from(header.data_window.min.y);
        if rel < 0 || rel >= i64::from(header.height) || rel % i64::from(lines) != 0 {
            return Err(DecodeError::malformed(format!(
                "block scanline {y} outside data window or misaligned"
            )));
        }
        let first_row = rel as u32;
        let index = (first_row / lines) as usize;
        if std::mem::replace(&mut seen[index], true) {
            return Err(DecodeError::malformed(format!("duplicate block for scanline {y}")));
        }
        let rows = lines.min(header.height - first_row);
        tracing::debug!(y, rows, size, "decode block");
        block::decode_block(&header, payload, first_row, rows, &mut samples)?;
    }

    let channels = header
        .channels
        .into_iter()
        .zip(samples)
        .map(|(desc, samples)| Channel { desc, samples })
        .collect();

    Ok(MultiChannelImage {
        width: header.width,
        height: header.height,
        data_window: header.data_window,
        attributes: header.attributes,
        channels,
    })
}

/// Decode several containers in parallel. Each result is independent.
#[tracing::instrument(skip_all, fields(count = inputs.len()))]
pub fn decode_many<B>(inputs: &[B], opts: &DecodeOptions) -> Vec<Result<MultiChannelImage, DecodeError>>
where
    B: AsRef<[u8]> + Sync,
{
    inputs
        .par_iter()
        .map(|bytes| decode_container_with(bytes.as_ref(), opts))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/container/decode.rs"]
mod tests;
