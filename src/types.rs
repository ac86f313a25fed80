//! Shared types: [`ByteOrder`], [`SampleKind`], and [`SampleFormat`].

use std::fmt;

use crate::{Result, SegyError};

/// Byte order for every multi-byte field in a SEG-Y file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
}

impl ByteOrder {
    pub fn opposite(self) -> Self {
        match self {
            Self::Big => Self::Little,
            Self::Little => Self::Big,
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Big => write!(f, "big-endian"),
            Self::Little => write!(f, "little-endian"),
        }
    }
}

/// In-memory element type backing a [`DataMatrix`](crate::DataMatrix).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int8 => "i8",
            Self::UInt8 => "u8",
            Self::Int16 => "i16",
            Self::UInt16 => "u16",
            Self::Int32 => "i32",
            Self::UInt32 => "u32",
            Self::Int64 => "i64",
            Self::UInt64 => "u64",
            Self::Float32 => "f32",
            Self::Float64 => "f64",
        };
        f.write_str(name)
    }
}

/// Sample format code from the binary file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// 4-byte IBM floating point (code 1).
    Ibm32,
    /// 4-byte signed integer (code 2).
    Int32,
    /// 2-byte signed integer (code 3).
    Int16,
    /// 4-byte IEEE float (code 5).
    Float32,
    /// 8-byte IEEE float (code 6).
    Float64,
    /// 1-byte signed integer (code 8).
    Int8,
    /// 8-byte signed integer (code 9).
    Int64,
    /// 4-byte unsigned integer (code 10).
    UInt32,
    /// 2-byte unsigned integer (code 11).
    UInt16,
    /// 8-byte unsigned integer (code 12).
    UInt64,
    /// 1-byte unsigned integer (code 16).
    UInt8,
}

/// Immutable description of one sample format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleFormatDescriptor {
    pub format: SampleFormat,
    pub code: i16,
    pub byte_size: usize,
    pub kind: SampleKind,
    pub is_ibm: bool,
    pub description: &'static str,
}

const fn descriptor(
    format: SampleFormat,
    code: i16,
    byte_size: usize,
    kind: SampleKind,
    description: &'static str,
) -> SampleFormatDescriptor {
    SampleFormatDescriptor {
        format,
        code,
        byte_size,
        kind,
        is_ibm: matches!(format, SampleFormat::Ibm32),
        description,
    }
}

/// Every sample format this crate understands, in code order.
pub const SAMPLE_FORMATS: [SampleFormatDescriptor; 11] = [
    descriptor(SampleFormat::Ibm32, 1, 4, SampleKind::Float64, "4-byte IBM floating-point"),
    descriptor(SampleFormat::Int32, 2, 4, SampleKind::Int32, "4-byte signed integer"),
    descriptor(SampleFormat::Int16, 3, 2, SampleKind::Int16, "2-byte signed integer"),
    descriptor(SampleFormat::Float32, 5, 4, SampleKind::Float32, "4-byte IEEE floating-point"),
    descriptor(SampleFormat::Float64, 6, 8, SampleKind::Float64, "8-byte IEEE floating-point"),
    descriptor(SampleFormat::Int8, 8, 1, SampleKind::Int8, "1-byte signed integer"),
    descriptor(SampleFormat::Int64, 9, 8, SampleKind::Int64, "8-byte signed integer"),
    descriptor(SampleFormat::UInt32, 10, 4, SampleKind::UInt32, "4-byte unsigned integer"),
    descriptor(SampleFormat::UInt16, 11, 2, SampleKind::UInt16, "2-byte unsigned integer"),
    descriptor(SampleFormat::UInt64, 12, 8, SampleKind::UInt64, "8-byte unsigned integer"),
    descriptor(SampleFormat::UInt8, 16, 1, SampleKind::UInt8, "1-byte unsigned integer"),
];

impl SampleFormat {
    /// Look up a raw sample format code from the binary file header.
    pub fn from_code(code: i64) -> Result<Self> {
        SAMPLE_FORMATS
            .iter()
            .find(|d| d.code as i64 == code)
            .map(|d| d.format)
            .ok_or(SegyError::UnknownSampleFormat(code))
    }

    /// The native format used when writing a matrix of the given element type.
    ///
    /// `Float64` maps to IEEE code 6; IBM output has to be requested explicitly.
    pub fn for_kind(kind: SampleKind) -> Self {
        match kind {
            SampleKind::Int8 => Self::Int8,
            SampleKind::UInt8 => Self::UInt8,
            SampleKind::Int16 => Self::Int16,
            SampleKind::UInt16 => Self::UInt16,
            SampleKind::Int32 => Self::Int32,
            SampleKind::UInt32 => Self::UInt32,
            SampleKind::Int64 => Self::Int64,
            SampleKind::UInt64 => Self::UInt64,
            SampleKind::Float32 => Self::Float32,
            SampleKind::Float64 => Self::Float64,
        }
    }

    pub fn descriptor(self) -> &'static SampleFormatDescriptor {
        // Variants are declared in table order.
        &SAMPLE_FORMATS[self as usize]
    }

    pub fn code(self) -> i16 {
        self.descriptor().code
    }

    pub fn byte_size(self) -> usize {
        self.descriptor().byte_size
    }

    pub fn kind(self) -> SampleKind {
        self.descriptor().kind
    }

    pub fn is_ibm(self) -> bool {
        self.descriptor().is_ibm
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.descriptor().description, self.code())
    }
}

/// Guess the byte order from the two sample-format bytes of a binary header.
///
/// Big-endian wins when its reading is a known code, then little-endian.
/// If neither reading is valid, a big-endian reading below 16 still means
/// big-endian and anything larger means little-endian.
pub fn detect_byte_order(sample_format_bytes: [u8; 2]) -> ByteOrder {
    let big = i16::from_be_bytes(sample_format_bytes) as i64;
    let little = i16::from_le_bytes(sample_format_bytes) as i64;
    if SampleFormat::from_code(big).is_ok() {
        ByteOrder::Big
    } else if SampleFormat::from_code(little).is_ok() || big >= 16 {
        ByteOrder::Little
    } else {
        ByteOrder::Big
    }
}

/// Run `decode` with an explicit byte order, or auto-detect one.
///
/// In auto mode the detected order is tried first. If that attempt fails
/// with [`SegyError::UnknownSampleFormat`], the opposite order is tried once
/// and its result is final.
pub fn decode_with_byte_order<T>(
    requested: Option<ByteOrder>,
    sample_format_bytes: [u8; 2],
    mut decode: impl FnMut(ByteOrder) -> Result<T>,
) -> Result<(T, ByteOrder)> {
    if let Some(order) = requested {
        return decode(order).map(|value| (value, order));
    }

    let first = detect_byte_order(sample_format_bytes);
    log::debug!("detected {first} sample format field");
    match decode(first) {
        Ok(value) => Ok((value, first)),
        Err(SegyError::UnknownSampleFormat(code)) => {
            let second = first.opposite();
            log::warn!("sample format {code} invalid as {first}, retrying as {second}");
            decode(second).map(|value| (value, second))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_table_matches_variants() {
        for d in &SAMPLE_FORMATS {
            assert_eq!(d.format.descriptor(), d);
            assert_eq!(SampleFormat::from_code(d.code as i64).unwrap(), d.format);
        }
    }

    #[test]
    fn test_byte_sizes() {
        let sizes: Vec<(i16, usize)> = SAMPLE_FORMATS
            .iter()
            .map(|d| (d.code, d.byte_size))
            .collect();
        assert_eq!(
            sizes,
            vec![
                (1, 4),
                (2, 4),
                (3, 2),
                (5, 4),
                (6, 8),
                (8, 1),
                (9, 8),
                (10, 4),
                (11, 2),
                (12, 8),
                (16, 1)
            ]
        );
        assert!(SampleFormat::Ibm32.is_ibm());
        assert!(!SampleFormat::Float32.is_ibm());
    }

    #[test]
    fn test_unknown_codes_rejected() {
        for code in [0, 4, 7, 13, 15, 17, 256, -1] {
            assert!(matches!(
                SampleFormat::from_code(code),
                Err(SegyError::UnknownSampleFormat(c)) if c == code
            ));
        }
    }

    #[test]
    fn test_detect_byte_order() {
        assert_eq!(detect_byte_order(5i16.to_be_bytes()), ByteOrder::Big);
        assert_eq!(detect_byte_order(5i16.to_le_bytes()), ByteOrder::Little);
        assert_eq!(detect_byte_order(16i16.to_be_bytes()), ByteOrder::Big);
        assert_eq!(detect_byte_order(16i16.to_le_bytes()), ByteOrder::Little);
        assert_eq!(detect_byte_order([0xFF, 0xFF]), ByteOrder::Big);
        // Unknown codes: 7 stored little-endian reads as 1792 big-endian.
        assert_eq!(detect_byte_order(7i16.to_be_bytes()), ByteOrder::Big);
        assert_eq!(detect_byte_order(7i16.to_le_bytes()), ByteOrder::Little);
        assert_eq!(detect_byte_order(13i16.to_le_bytes()), ByteOrder::Little);
    }

    #[test]
    fn test_fallback_retries_once_with_opposite_order() {
        let mut attempts = Vec::new();
        let (value, order) = decode_with_byte_order(None, 5i16.to_be_bytes(), |order| {
            attempts.push(order);
            if order == ByteOrder::Big {
                Err(SegyError::UnknownSampleFormat(1280))
            } else {
                Ok(42)
            }
        })
        .unwrap();
        assert_eq!(value, 42);
        assert_eq!(order, ByteOrder::Little);
        assert_eq!(attempts, vec![ByteOrder::Big, ByteOrder::Little]);
    }

    #[test]
    fn test_fallback_does_not_retry_other_errors() {
        let mut attempts = 0;
        let result: Result<((), ByteOrder)> =
            decode_with_byte_order(None, 5i16.to_be_bytes(), |_| {
                attempts += 1;
                Err(SegyError::InvalidLine(0))
            });
        assert!(matches!(result, Err(SegyError::InvalidLine(0))));
        assert_eq!(attempts, 1);
    }

    #[test]
    fn test_explicit_order_is_not_detected() {
        let (_, order) =
            decode_with_byte_order(Some(ByteOrder::Little), 5i16.to_be_bytes(), |_| Ok(()))
                .unwrap();
        assert_eq!(order, ByteOrder::Little);
    }
}
