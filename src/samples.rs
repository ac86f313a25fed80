//! Trace sample decoding and encoding for every SEG-Y sample format.
//!
//! [`decode_samples`] and [`encode_samples`] convert one trace's worth of
//! samples between raw bytes and a typed [`Samples`] buffer. All formats
//! except IBM are a straight fixed-width read honoring the byte order; IBM
//! goes through [`crate::ibm`].

use std::fmt::Debug;

use crate::ibm;
use crate::types::{ByteOrder, SampleFormat, SampleKind};
use crate::{Result, SegyError};

/// Typed sample storage. The variant always matches a [`SampleKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

impl Samples {
    /// Zero-filled storage of `len` elements.
    pub fn zeros(kind: SampleKind, len: usize) -> Self {
        match kind {
            SampleKind::Int8 => Samples::Int8(vec![0; len]),
            SampleKind::UInt8 => Samples::UInt8(vec![0; len]),
            SampleKind::Int16 => Samples::Int16(vec![0; len]),
            SampleKind::UInt16 => Samples::UInt16(vec![0; len]),
            SampleKind::Int32 => Samples::Int32(vec![0; len]),
            SampleKind::UInt32 => Samples::UInt32(vec![0; len]),
            SampleKind::Int64 => Samples::Int64(vec![0; len]),
            SampleKind::UInt64 => Samples::UInt64(vec![0; len]),
            SampleKind::Float32 => Samples::Float32(vec![0.0; len]),
            SampleKind::Float64 => Samples::Float64(vec![0.0; len]),
        }
    }

    pub fn with_capacity(kind: SampleKind, capacity: usize) -> Self {
        match kind {
            SampleKind::Int8 => Samples::Int8(Vec::with_capacity(capacity)),
            SampleKind::UInt8 => Samples::UInt8(Vec::with_capacity(capacity)),
            SampleKind::Int16 => Samples::Int16(Vec::with_capacity(capacity)),
            SampleKind::UInt16 => Samples::UInt16(Vec::with_capacity(capacity)),
            SampleKind::Int32 => Samples::Int32(Vec::with_capacity(capacity)),
            SampleKind::UInt32 => Samples::UInt32(Vec::with_capacity(capacity)),
            SampleKind::Int64 => Samples::Int64(Vec::with_capacity(capacity)),
            SampleKind::UInt64 => Samples::UInt64(Vec::with_capacity(capacity)),
            SampleKind::Float32 => Samples::Float32(Vec::with_capacity(capacity)),
            SampleKind::Float64 => Samples::Float64(Vec::with_capacity(capacity)),
        }
    }

    pub fn kind(&self) -> SampleKind {
        match self {
            Samples::Int8(_) => SampleKind::Int8,
            Samples::UInt8(_) => SampleKind::UInt8,
            Samples::Int16(_) => SampleKind::Int16,
            Samples::UInt16(_) => SampleKind::UInt16,
            Samples::Int32(_) => SampleKind::Int32,
            Samples::UInt32(_) => SampleKind::UInt32,
            Samples::Int64(_) => SampleKind::Int64,
            Samples::UInt64(_) => SampleKind::UInt64,
            Samples::Float32(_) => SampleKind::Float32,
            Samples::Float64(_) => SampleKind::Float64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Samples::Int8(v) => v.len(),
            Samples::UInt8(v) => v.len(),
            Samples::Int16(v) => v.len(),
            Samples::UInt16(v) => v.len(),
            Samples::Int32(v) => v.len(),
            Samples::UInt32(v) => v.len(),
            Samples::Int64(v) => v.len(),
            Samples::UInt64(v) => v.len(),
            Samples::Float32(v) => v.len(),
            Samples::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `index` widened to `f64`.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            Samples::Int8(v) => v.get(index).map(|&x| x.to_f64()),
            Samples::UInt8(v) => v.get(index).map(|&x| x.to_f64()),
            Samples::Int16(v) => v.get(index).map(|&x| x.to_f64()),
            Samples::UInt16(v) => v.get(index).map(|&x| x.to_f64()),
            Samples::Int32(v) => v.get(index).map(|&x| x.to_f64()),
            Samples::UInt32(v) => v.get(index).map(|&x| x.to_f64()),
            Samples::Int64(v) => v.get(index).map(|&x| x.to_f64()),
            Samples::UInt64(v) => v.get(index).map(|&x| x.to_f64()),
            Samples::Float32(v) => v.get(index).map(|&x| x.to_f64()),
            Samples::Float64(v) => v.get(index).copied(),
        }
    }

    /// Copy of the elements in `start..start + len`.
    pub(crate) fn slice(&self, start: usize, len: usize) -> Samples {
        let range = start..start + len;
        match self {
            Samples::Int8(v) => Samples::Int8(v[range].to_vec()),
            Samples::UInt8(v) => Samples::UInt8(v[range].to_vec()),
            Samples::Int16(v) => Samples::Int16(v[range].to_vec()),
            Samples::UInt16(v) => Samples::UInt16(v[range].to_vec()),
            Samples::Int32(v) => Samples::Int32(v[range].to_vec()),
            Samples::UInt32(v) => Samples::UInt32(v[range].to_vec()),
            Samples::Int64(v) => Samples::Int64(v[range].to_vec()),
            Samples::UInt64(v) => Samples::UInt64(v[range].to_vec()),
            Samples::Float32(v) => Samples::Float32(v[range].to_vec()),
            Samples::Float64(v) => Samples::Float64(v[range].to_vec()),
        }
    }

    /// Copy the `row_len`-element rows at `rows` into a new buffer.
    pub(crate) fn gather_rows(&self, rows: &[usize], row_len: usize) -> Samples {
        fn gather<T: Copy>(v: &[T], rows: &[usize], row_len: usize) -> Vec<T> {
            let mut out = Vec::with_capacity(rows.len() * row_len);
            for &r in rows {
                out.extend_from_slice(&v[r * row_len..(r + 1) * row_len]);
            }
            out
        }
        match self {
            Samples::Int8(v) => Samples::Int8(gather(v, rows, row_len)),
            Samples::UInt8(v) => Samples::UInt8(gather(v, rows, row_len)),
            Samples::Int16(v) => Samples::Int16(gather(v, rows, row_len)),
            Samples::UInt16(v) => Samples::UInt16(gather(v, rows, row_len)),
            Samples::Int32(v) => Samples::Int32(gather(v, rows, row_len)),
            Samples::UInt32(v) => Samples::UInt32(gather(v, rows, row_len)),
            Samples::Int64(v) => Samples::Int64(gather(v, rows, row_len)),
            Samples::UInt64(v) => Samples::UInt64(gather(v, rows, row_len)),
            Samples::Float32(v) => Samples::Float32(gather(v, rows, row_len)),
            Samples::Float64(v) => Samples::Float64(gather(v, rows, row_len)),
        }
    }

    /// Append `other`, which must be of the same kind.
    pub fn extend(&mut self, other: Samples) -> Result<()> {
        match (self, other) {
            (Samples::Int8(a), Samples::Int8(b)) => a.extend(b),
            (Samples::UInt8(a), Samples::UInt8(b)) => a.extend(b),
            (Samples::Int16(a), Samples::Int16(b)) => a.extend(b),
            (Samples::UInt16(a), Samples::UInt16(b)) => a.extend(b),
            (Samples::Int32(a), Samples::Int32(b)) => a.extend(b),
            (Samples::UInt32(a), Samples::UInt32(b)) => a.extend(b),
            (Samples::Int64(a), Samples::Int64(b)) => a.extend(b),
            (Samples::UInt64(a), Samples::UInt64(b)) => a.extend(b),
            (Samples::Float32(a), Samples::Float32(b)) => a.extend(b),
            (Samples::Float64(a), Samples::Float64(b)) => a.extend(b),
            (a, b) => {
                return Err(SegyError::TypeMismatch {
                    expected: a.kind(),
                    actual: b.kind(),
                });
            }
        }
        Ok(())
    }
}

/// A primitive element type that can back a [`Samples`] buffer.
pub trait Sample: Copy + Default + PartialEq + Debug + 'static {
    const KIND: SampleKind;
    const SIZE: usize;

    fn read(bytes: &[u8], byte_order: ByteOrder) -> Self;
    fn write(self, out: &mut Vec<u8>, byte_order: ByteOrder);
    fn to_f64(self) -> f64;
    fn wrap(values: Vec<Self>) -> Samples;
    fn as_slice(samples: &Samples) -> Option<&[Self]>;
    fn as_mut_slice(samples: &mut Samples) -> Option<&mut [Self]>;
}

macro_rules! impl_sample {
    ($ty:ty, $variant:ident) => {
        impl Sample for $ty {
            const KIND: SampleKind = SampleKind::$variant;
            const SIZE: usize = std::mem::size_of::<$ty>();

            fn read(bytes: &[u8], byte_order: ByteOrder) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                buf.copy_from_slice(&bytes[..Self::SIZE]);
                match byte_order {
                    ByteOrder::Big => <$ty>::from_be_bytes(buf),
                    ByteOrder::Little => <$ty>::from_le_bytes(buf),
                }
            }

            fn write(self, out: &mut Vec<u8>, byte_order: ByteOrder) {
                match byte_order {
                    ByteOrder::Big => out.extend_from_slice(&self.to_be_bytes()),
                    ByteOrder::Little => out.extend_from_slice(&self.to_le_bytes()),
                }
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn wrap(values: Vec<Self>) -> Samples {
                Samples::$variant(values)
            }

            fn as_slice(samples: &Samples) -> Option<&[Self]> {
                match samples {
                    Samples::$variant(v) => Some(v.as_slice()),
                    _ => None,
                }
            }

            fn as_mut_slice(samples: &mut Samples) -> Option<&mut [Self]> {
                match samples {
                    Samples::$variant(v) => Some(v.as_mut_slice()),
                    _ => None,
                }
            }
        }
    };
}

impl_sample!(i8, Int8);
impl_sample!(u8, UInt8);
impl_sample!(i16, Int16);
impl_sample!(u16, UInt16);
impl_sample!(i32, Int32);
impl_sample!(u32, UInt32);
impl_sample!(i64, Int64);
impl_sample!(u64, UInt64);
impl_sample!(f32, Float32);
impl_sample!(f64, Float64);

fn decode_fixed<T: Sample>(data: &[u8], num_samples: usize, byte_order: ByteOrder) -> Vec<T> {
    data.chunks_exact(T::SIZE)
        .take(num_samples)
        .map(|chunk| T::read(chunk, byte_order))
        .collect()
}

fn encode_fixed<T: Sample>(values: &[T], byte_order: ByteOrder) -> Vec<u8> {
    let mut data = Vec::with_capacity(values.len() * T::SIZE);
    for &value in values {
        value.write(&mut data, byte_order);
    }
    data
}

/// Decode `num_samples` samples of `format` from `data`.
pub fn decode_samples(
    data: &[u8],
    num_samples: usize,
    format: SampleFormat,
    byte_order: ByteOrder,
) -> Result<Samples> {
    let needed = num_samples * format.byte_size();
    if data.len() < needed {
        return Err(SegyError::block("trace sample data", needed, data.len()));
    }
    let samples = match format {
        SampleFormat::Ibm32 => Samples::Float64(ibm::decode_ibm(data, num_samples, byte_order)?),
        SampleFormat::Int32 => Samples::Int32(decode_fixed(data, num_samples, byte_order)),
        SampleFormat::Int16 => Samples::Int16(decode_fixed(data, num_samples, byte_order)),
        SampleFormat::Float32 => Samples::Float32(decode_fixed(data, num_samples, byte_order)),
        SampleFormat::Float64 => Samples::Float64(decode_fixed(data, num_samples, byte_order)),
        SampleFormat::Int8 => Samples::Int8(decode_fixed(data, num_samples, byte_order)),
        SampleFormat::Int64 => Samples::Int64(decode_fixed(data, num_samples, byte_order)),
        SampleFormat::UInt32 => Samples::UInt32(decode_fixed(data, num_samples, byte_order)),
        SampleFormat::UInt16 => Samples::UInt16(decode_fixed(data, num_samples, byte_order)),
        SampleFormat::UInt64 => Samples::UInt64(decode_fixed(data, num_samples, byte_order)),
        SampleFormat::UInt8 => Samples::UInt8(decode_fixed(data, num_samples, byte_order)),
    };
    Ok(samples)
}

/// Encode a slice of one sample kind as `format`.
///
/// The element type must be the one `format` decodes into, otherwise this
/// fails with [`SegyError::TypeMismatch`]. IBM values out of range fail
/// with [`SegyError::IbmRange`] carrying the first offending value.
pub fn encode_slice<T: Sample>(
    values: &[T],
    format: SampleFormat,
    byte_order: ByteOrder,
) -> Result<Vec<u8>> {
    if T::KIND != format.kind() {
        return Err(SegyError::TypeMismatch {
            expected: format.kind(),
            actual: T::KIND,
        });
    }
    if format.is_ibm() {
        let widened: Vec<f64> = values.iter().map(|v| v.to_f64()).collect();
        let (data, out_of_range) = ibm::encode_ibm(&widened, byte_order);
        return match out_of_range.first() {
            Some(&i) => Err(SegyError::IbmRange { value: widened[i] }),
            None => Ok(data),
        };
    }
    Ok(encode_fixed(values, byte_order))
}

/// Encode a [`Samples`] buffer as `format`.
pub fn encode_samples(
    samples: &Samples,
    format: SampleFormat,
    byte_order: ByteOrder,
) -> Result<Vec<u8>> {
    match samples {
        Samples::Int8(v) => encode_slice(v, format, byte_order),
        Samples::UInt8(v) => encode_slice(v, format, byte_order),
        Samples::Int16(v) => encode_slice(v, format, byte_order),
        Samples::UInt16(v) => encode_slice(v, format, byte_order),
        Samples::Int32(v) => encode_slice(v, format, byte_order),
        Samples::UInt32(v) => encode_slice(v, format, byte_order),
        Samples::Int64(v) => encode_slice(v, format, byte_order),
        Samples::UInt64(v) => encode_slice(v, format, byte_order),
        Samples::Float32(v) => encode_slice(v, format, byte_order),
        Samples::Float64(v) => encode_slice(v, format, byte_order),
    }
}
