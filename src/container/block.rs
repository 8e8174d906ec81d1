use std::borrow::Cow;

use crate::{
    container::{
        header::{Compression, Header},
        image::ChannelSamples,
    },
    foundation::error::DecodeError,
};

/// Bytes of one scanline across all channels.
pub(crate) fn row_bytes(header: &Header) -> usize {
    header
        .channels
        .iter()
        .map(|c| c.pixel_type.bytes())
        .sum::<usize>()
        * header.width as usize
}

/// Decode one block payload covering `rows` scanlines starting at image row `first_row`.
pub(crate) fn decode_block(
    header: &Header,
    payload: &[u8],
    first_row: u32,
    rows: u32,
    out: &mut [ChannelSamples],
) -> Result<(), DecodeError> {
    let expected = row_bytes(header) * rows as usize;

    // Writers store a block uncompressed when compression would not shrink it.
    let data = if header.compression == Compression::None || payload.len() == expected {
        if payload.len() != expected {
            return Err(DecodeError::malformed(format!(
                "raw block at row {first_row} has {} bytes, expected {expected}",
                payload.len()
            )));
        }
        Cow::Borrowed(payload)
    } else {
        Cow::Owned(unzip(payload, expected)?)
    };

    split_rows(header, &data, first_row, rows, out)
}

fn split_rows(
    header: &Header,
    data: &[u8],
    first_row: u32,
    rows: u32,
    out: &mut [ChannelSamples],
) -> Result<(), DecodeError> {
    let width = header.width as usize;
    let mut at = 0usize;
    for row in first_row..first_row + rows {
        let row_start = row as usize * width;
        for (desc, samples) in header.channels.iter().zip(out.iter_mut()) {
            let len = desc.pixel_type.bytes() * width;
            let bytes = data
                .get(at..at + len)
                .ok_or_else(|| DecodeError::malformed("block shorter than its scanlines"))?;
            samples.fill_le(row_start, bytes)?;
            at += len;
        }
    }
    Ok(())
}

/// Inflate, undo the delta predictor, and re-interleave the two byte planes.
pub(crate) fn unzip(payload: &[u8], expected: usize) -> Result<Vec<u8>, DecodeError> {
    let mut decoder = zune_inflate::DeflateDecoder::new(payload);
    let mut data = decoder
        .decode_zlib()
        .map_err(|e| DecodeError::malformed(format!("zlib inflate failed: {e:?}")))?;
    if data.len() != expected {
        return Err(DecodeError::malformed(format!(
            "inflated block has {} bytes, expected {expected}",
            data.len()
        )));
    }

    undo_predictor(&mut data);
    Ok(deinterleave(&data))
}

pub(crate) fn undo_predictor(data: &mut [u8]) {
    for i in 1..data.len() {
        data[i] = data[i - 1].wrapping_add(data[i]).wrapping_sub(128);
    }
}

/// Even-index bytes come from the first `ceil(n/2)` bytes, odd-index bytes from the rest.
pub(crate) fn deinterleave(data: &[u8]) -> Vec<u8> {
    let (even, odd) = data.split_at(data.len().div_ceil(2));
    let mut out = Vec::with_capacity(data.len());
    for (i, b) in even.iter().enumerate() {
        out.push(*b);
        if let Some(b) = odd.get(i) {
            out.push(*b);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/container/block.rs"]
mod tests;
