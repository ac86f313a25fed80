//! IBM System/360 single-precision floating point (sample format code 1).
//!
//! An IBM float is 32 bits: a sign bit, a 7-bit excess-64 base-16 exponent,
//! and a 24-bit fraction. The value is
//! `(1 - 2*sign) * (fraction / 2^24) * 16^(exponent - 64)`.
//!
//! Every IBM value is exactly representable as an `f64`, so decoding is
//! lossless. Encoding truncates the fraction to 24 bits (up to three of
//! which are lost to hexadecimal normalization).

use crate::types::ByteOrder;
use crate::{Result, SegyError};

/// Smallest positive normalized IBM magnitude, `16^-65`.
pub const IBM_MIN: f64 = 5.397605346934028e-79;

/// Largest IBM magnitude, `(1 - 16^-6) * 16^63`.
pub const IBM_MAX: f64 = 7.2370051459731155e+75;

const FRACTION_MASK: u32 = 0x00FF_FFFF;
const F64_FRACTION_MASK: u64 = (1 << 52) - 1;

fn read_u32(data: &[u8], offset: usize, byte_order: ByteOrder) -> u32 {
    let bytes = [
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ];
    match byte_order {
        ByteOrder::Big => u32::from_be_bytes(bytes),
        ByteOrder::Little => u32::from_le_bytes(bytes),
    }
}

/// Interpret 32 raw bits as an IBM float.
pub fn ibm_to_f64(bits: u32) -> f64 {
    let sign = if bits >> 31 == 1 { -1.0 } else { 1.0 };
    let exponent = ((bits >> 24) & 0x7F) as i32;
    let fraction = (bits & FRACTION_MASK) as f64;
    // 16^(e - 64) / 2^24 == 2^(4 * (e - 64) - 24)
    sign * fraction * 2f64.powi(4 * (exponent - 64) - 24)
}

/// Convert a value to IBM float bits.
///
/// Zero (of either sign) encodes to `0`. Non-finite values and magnitudes
/// outside `IBM_MIN..=IBM_MAX` fail with [`SegyError::IbmRange`].
pub fn f64_to_ibm(value: f64) -> Result<u32> {
    if value == 0.0 {
        return Ok(0);
    }
    if !value.is_finite() {
        return Err(SegyError::IbmRange { value });
    }

    let sign: u32 = if value < 0.0 { 1 } else { 0 };
    let bits = value.abs().to_bits();
    let biased = ((bits >> 52) & 0x7FF) as i32;
    if biased == 0 {
        // f64 subnormals are far below IBM_MIN
        return Err(SegyError::IbmRange { value });
    }

    // value = m * 2^exp2 with m in [0.5, 1)
    let exp2 = biased - 1022;
    // Round the base-16 exponent up, then shift the mantissa right by the
    // leftover power of two so that value = fraction * 16^exp16.
    let exp16 = exp2.div_euclid(4) + i32::from(exp2.rem_euclid(4) != 0);
    let shift = (4 * exp16 - exp2) as u32;

    let ibm_exponent = exp16 + 64;
    if !(0..=127).contains(&ibm_exponent) {
        return Err(SegyError::IbmRange { value });
    }

    let mantissa = (bits & F64_FRACTION_MASK) | (1 << 52);
    let fraction = (mantissa >> (29 + shift)) as u32;

    Ok((sign << 31) | ((ibm_exponent as u32) << 24) | fraction)
}

/// Decode `num_samples` IBM floats.
pub fn decode_ibm(data: &[u8], num_samples: usize, byte_order: ByteOrder) -> Result<Vec<f64>> {
    let needed = num_samples * 4;
    if data.len() < needed {
        return Err(SegyError::block("IBM sample data", needed, data.len()));
    }
    Ok((0..num_samples)
        .map(|i| ibm_to_f64(read_u32(data, i * 4, byte_order)))
        .collect())
}

/// Encode a series of values as IBM floats.
///
/// Out-of-range values do not stop the pass: they are written as zero and
/// their indices are returned so the caller can flag the series.
pub fn encode_ibm(values: &[f64], byte_order: ByteOrder) -> (Vec<u8>, Vec<usize>) {
    let mut data = Vec::with_capacity(values.len() * 4);
    let mut out_of_range = Vec::new();
    for (i, &value) in values.iter().enumerate() {
        let bits = f64_to_ibm(value).unwrap_or_else(|_| {
            out_of_range.push(i);
            0
        });
        match byte_order {
            ByteOrder::Big => data.extend_from_slice(&bits.to_be_bytes()),
            ByteOrder::Little => data.extend_from_slice(&bits.to_le_bytes()),
        }
    }
    (data, out_of_range)
}
