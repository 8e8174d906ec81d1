//! IEEE 754 binary16 conversion by bit manipulation.

/// Widen half-precision bits to `f32`. Exact for every input, NaN payloads included.
pub fn f16_bits_to_f32(bits: u16) -> f32 {
    let sign = u32::from(bits & 0x8000) << 16;
    let exp = u32::from((bits >> 10) & 0x1F);
    let mant = u32::from(bits & 0x03FF);

    let out = match (exp, mant) {
        (0, 0) => sign,
        (0, _) => {
            // subnormal: shift the mantissa up until the implicit bit appears
            let mut e = 127 - 15 + 1;
            let mut m = mant;
            while m & 0x0400 == 0 {
                m <<= 1;
                e -= 1;
            }
            sign | (e << 23) | ((m & 0x03FF) << 13)
        }
        (0x1F, 0) => sign | 0x7F80_0000,
        (0x1F, _) => sign | 0x7FC0_0000 | (mant << 13),
        _ => sign | ((exp + 127 - 15) << 23) | (mant << 13),
    };
    f32::from_bits(out)
}

/// Narrow `f32` to half-precision bits, rounding to nearest with ties to even.
pub fn f32_to_f16_bits(value: f32) -> u16 {
    let x = value.to_bits();
    let sign = ((x >> 16) & 0x8000) as u16;
    let exp = ((x >> 23) & 0xFF) as i32;
    let mant = x & 0x007F_FFFF;

    if exp == 0xFF {
        if mant == 0 {
            return sign | 0x7C00;
        }
        let payload = (mant >> 13) as u16;
        return sign | 0x7E00 | payload;
    }

    let half_exp = exp - 127 + 15;
    if half_exp >= 0x1F {
        return sign | 0x7C00;
    }

    if half_exp <= 0 {
        if half_exp < -10 {
            return sign;
        }
        let m = mant | 0x0080_0000;
        let shift = (14 - half_exp) as u32;
        let half_mant = m >> shift;
        let rem = m & ((1 << shift) - 1);
        let halfway = 1 << (shift - 1);
        let round_up = rem > halfway || (rem == halfway && half_mant & 1 == 1);
        return sign | (half_mant + u32::from(round_up)) as u16;
    }

    let half_mant = mant >> 13;
    let rem = mant & 0x1FFF;
    let base = ((half_exp as u32) << 10) | half_mant;
    let round_up = rem > 0x1000 || (rem == 0x1000 && half_mant & 1 == 1);
    // a mantissa carry rolls into the exponent and may produce infinity, which is correct
    sign | (base + u32::from(round_up)) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/container/half.rs"]
mod tests;
