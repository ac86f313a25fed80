//! Fixed field layouts of the binary file header and the trace header.
//!
//! Each header is an ordered list of [`FieldSpec`]s. The same table drives
//! decoding and encoding, so the two directions cannot drift apart. Regions
//! not covered by a field are reserved and left untouched by [`write_field`].

use crate::types::ByteOrder;
use crate::{Result, SegyError};

/// On-disk integer type of a header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    U16,
    I16,
    I32,
    /// Stored as a 64-bit pattern; values above `i64::MAX` read back negative.
    U64,
}

impl FieldKind {
    pub const fn width(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::I32 => 4,
            Self::U64 => 8,
        }
    }

    fn accepts(self, value: i64) -> bool {
        match self {
            Self::U8 => u8::try_from(value).is_ok(),
            Self::U16 => u16::try_from(value).is_ok(),
            Self::I16 => i16::try_from(value).is_ok(),
            Self::I32 => i32::try_from(value).is_ok(),
            Self::U64 => true,
        }
    }
}

/// One named field: where it lives and how wide it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub offset: usize,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn end(&self) -> usize {
        self.offset + self.kind.width()
    }
}

const fn field(name: &'static str, offset: usize, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, offset, kind }
}

pub const BINARY_HEADER_SIZE: usize = 400;
pub const TRACE_HEADER_SIZE: usize = 240;

/// Offset of the 8-byte trace header name, after the last numeric field.
pub const TRACE_NAME_OFFSET: usize = 232;
pub const TRACE_NAME_LEN: usize = 8;

pub const BINARY_HEADER_FIELDS: [FieldSpec; 44] = [
    field("JOB_ID", 0, FieldKind::I32),
    field("LINE_NO", 4, FieldKind::I32),
    field("REEL_NO", 8, FieldKind::I32),
    field("TRACES_PER_ENSEMBLE", 12, FieldKind::I16),
    field("AUX_TRACES_PER_ENSEMBLE", 14, FieldKind::I16),
    field("SAMPLE_INTERVAL", 16, FieldKind::U16),
    field("SAMPLE_INTERVAL_ORIG", 18, FieldKind::U16),
    field("SAMPLES_PER_TRACE", 20, FieldKind::U16),
    field("SAMPLES_PER_TRACE_ORIG", 22, FieldKind::U16),
    field("SAMPLE_FORMAT", 24, FieldKind::I16),
    field("ENSEMBLE_FOLD", 26, FieldKind::I16),
    field("TRACE_SORTING", 28, FieldKind::I16),
    field("VERTICAL_SUM", 30, FieldKind::I16),
    field("SWEEP_FREQ_START", 32, FieldKind::I16),
    field("SWEEP_FREQ_END", 34, FieldKind::I16),
    field("SWEEP_LENGTH", 36, FieldKind::I16),
    field("SWEEP_TYPE", 38, FieldKind::I16),
    field("SWEEP_CHANNEL", 40, FieldKind::I16),
    field("SWEEP_TAPER_START", 42, FieldKind::I16),
    field("SWEEP_TAPER_END", 44, FieldKind::I16),
    field("TAPER_TYPE", 46, FieldKind::I16),
    field("CORRELATED", 48, FieldKind::I16),
    field("GAIN_RECOVERED", 50, FieldKind::I16),
    field("AMP_RECOVERY", 52, FieldKind::I16),
    field("MEASUREMENT_SYSTEM", 54, FieldKind::I16),
    field("IMPULSE_POLARITY", 56, FieldKind::I16),
    field("VIBRATORY_POLARITY", 58, FieldKind::I16),
    field("EXT_TRACES_PER_ENSEMBLE", 60, FieldKind::I32),
    field("EXT_AUX_TRACES_PER_ENSEMBLE", 64, FieldKind::I32),
    field("EXT_SAMPLES_PER_TRACE", 68, FieldKind::I32),
    field("EXT_SAMPLE_INTERVAL", 72, FieldKind::U64),
    field("EXT_SAMPLE_INTERVAL_ORIG", 80, FieldKind::U64),
    field("EXT_SAMPLES_PER_TRACE_ORIG", 88, FieldKind::I32),
    field("EXT_ENSEMBLE_FOLD", 92, FieldKind::I32),
    field("INTEGER_CONSTANT", 96, FieldKind::I32),
    field("REV_MAJOR", 300, FieldKind::U8),
    field("REV_MINOR", 301, FieldKind::U8),
    field("FIXED_LENGTH", 302, FieldKind::I16),
    field("EXT_TEXT_HEADERS", 304, FieldKind::I16),
    field("EXT_TRACE_HEADERS", 306, FieldKind::I32),
    field("TIME_BASIS", 310, FieldKind::I16),
    field("TRACE_COUNT", 312, FieldKind::U64),
    field("DATA_OFFSET", 320, FieldKind::U64),
    field("TRAILER_STANZAS", 328, FieldKind::I32),
];

pub const TRACE_HEADER_FIELDS: [FieldSpec; 90] = [
    field("TRACENO", 0, FieldKind::I32),
    field("TRACE_FILE", 4, FieldKind::I32),
    field("FFID", 8, FieldKind::I32),
    field("CHAN", 12, FieldKind::I32),
    field("SOURCE_NO", 16, FieldKind::I32),
    field("CDP", 20, FieldKind::I32),
    field("CDP_TRACE", 24, FieldKind::I32),
    field("TRACE_ID", 28, FieldKind::I16),
    field("VSTACK", 30, FieldKind::I16),
    field("HSTACK", 32, FieldKind::I16),
    field("DATA_USE", 34, FieldKind::I16),
    field("OFFSET", 36, FieldKind::I32),
    field("REC_ELEV", 40, FieldKind::I32),
    field("SOU_ELEV", 44, FieldKind::I32),
    field("SOU_DEPTH", 48, FieldKind::I32),
    field("REC_DATUM", 52, FieldKind::I32),
    field("SOU_DATUM", 56, FieldKind::I32),
    field("SOU_WATER", 60, FieldKind::I32),
    field("REC_WATER", 64, FieldKind::I32),
    field("ELEVSC", 68, FieldKind::I16),
    field("COORDSC", 70, FieldKind::I16),
    field("SOU_X", 72, FieldKind::I32),
    field("SOU_Y", 76, FieldKind::I32),
    field("REC_X", 80, FieldKind::I32),
    field("REC_Y", 84, FieldKind::I32),
    field("COORD_UNITS", 88, FieldKind::I16),
    field("WEATHERING_VEL", 90, FieldKind::I16),
    field("SUBWEATHERING_VEL", 92, FieldKind::I16),
    field("UPHOLE_SOU", 94, FieldKind::I16),
    field("UPHOLE_REC", 96, FieldKind::I16),
    field("SOU_STATIC", 98, FieldKind::I16),
    field("REC_STATIC", 100, FieldKind::I16),
    field("TOTAL_STATIC", 102, FieldKind::I16),
    field("LAG_A", 104, FieldKind::I16),
    field("LAG_B", 106, FieldKind::I16),
    field("DELAY", 108, FieldKind::I16),
    field("MUTE_START", 110, FieldKind::I16),
    field("MUTE_END", 112, FieldKind::I16),
    field("NUMSMP", 114, FieldKind::U16),
    field("DT", 116, FieldKind::U16),
    field("GAIN_TYPE", 118, FieldKind::I16),
    field("GAIN_CONST", 120, FieldKind::I16),
    field("INITIAL_GAIN", 122, FieldKind::I16),
    field("CORRELATED", 124, FieldKind::I16),
    field("SWEEP_START", 126, FieldKind::I16),
    field("SWEEP_END", 128, FieldKind::I16),
    field("SWEEP_LENGTH", 130, FieldKind::I16),
    field("SWEEP_TYPE", 132, FieldKind::I16),
    field("SWEEP_TAPER_START", 134, FieldKind::I16),
    field("SWEEP_TAPER_END", 136, FieldKind::I16),
    field("TAPER_TYPE", 138, FieldKind::I16),
    field("ALIAS_FREQ", 140, FieldKind::I16),
    field("ALIAS_SLOPE", 142, FieldKind::I16),
    field("NOTCH_FREQ", 144, FieldKind::I16),
    field("NOTCH_SLOPE", 146, FieldKind::I16),
    field("LOWCUT_FREQ", 148, FieldKind::I16),
    field("HIGHCUT_FREQ", 150, FieldKind::I16),
    field("LOWCUT_SLOPE", 152, FieldKind::I16),
    field("HIGHCUT_SLOPE", 154, FieldKind::I16),
    field("YEAR", 156, FieldKind::I16),
    field("DAY", 158, FieldKind::I16),
    field("HOUR", 160, FieldKind::I16),
    field("MINUTE", 162, FieldKind::I16),
    field("SECOND", 164, FieldKind::I16),
    field("TIME_BASIS", 166, FieldKind::I16),
    field("WEIGHTING", 168, FieldKind::I16),
    field("ROLL_SWITCH", 170, FieldKind::I16),
    field("FIRST_TRACE", 172, FieldKind::I16),
    field("LAST_TRACE", 174, FieldKind::I16),
    field("GAP_SIZE", 176, FieldKind::I16),
    field("OVERTRAVEL", 178, FieldKind::I16),
    field("CDP_X", 180, FieldKind::I32),
    field("CDP_Y", 184, FieldKind::I32),
    field("INLINE", 188, FieldKind::I32),
    field("CROSSLINE", 192, FieldKind::I32),
    field("SHOTPOINT", 196, FieldKind::I32),
    field("SHOTPOINT_SC", 200, FieldKind::I16),
    field("TRACE_UNIT", 202, FieldKind::I16),
    field("TRANSD_MANT", 204, FieldKind::I32),
    field("TRANSD_EXP", 208, FieldKind::I16),
    field("TRANSD_UNIT", 210, FieldKind::I16),
    field("DEVICE_ID", 212, FieldKind::I16),
    field("TIME_SC", 214, FieldKind::I16),
    field("SOU_TYPE", 216, FieldKind::I16),
    field("SOU_DIR_VERT", 218, FieldKind::I16),
    field("SOU_DIR_XLINE", 220, FieldKind::I16),
    field("SOU_DIR_INLINE", 222, FieldKind::I16),
    field("SOU_MEAS_MANT", 224, FieldKind::I32),
    field("SOU_MEAS_EXP", 228, FieldKind::I16),
    field("SOU_MEAS_UNIT", 230, FieldKind::I16),
];

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// Index of `name` in `fields`, resolved at compile time for the named
/// constants below.
const fn index_of(fields: &[FieldSpec], name: &str) -> usize {
    let mut i = 0;
    while i < fields.len() {
        if str_eq(fields[i].name, name) {
            return i;
        }
        i += 1;
    }
    panic!("no such header field");
}

/// Column indices of binary header fields the codec reads itself.
pub mod bfh {
    use super::{BINARY_HEADER_FIELDS as F, index_of};

    pub const TRACES_PER_ENSEMBLE: usize = index_of(&F, "TRACES_PER_ENSEMBLE");
    pub const SAMPLE_INTERVAL: usize = index_of(&F, "SAMPLE_INTERVAL");
    pub const SAMPLES_PER_TRACE: usize = index_of(&F, "SAMPLES_PER_TRACE");
    pub const SAMPLE_FORMAT: usize = index_of(&F, "SAMPLE_FORMAT");
    pub const EXT_SAMPLES_PER_TRACE: usize = index_of(&F, "EXT_SAMPLES_PER_TRACE");
    pub const REV_MAJOR: usize = index_of(&F, "REV_MAJOR");
    pub const FIXED_LENGTH: usize = index_of(&F, "FIXED_LENGTH");
    pub const EXT_TEXT_HEADERS: usize = index_of(&F, "EXT_TEXT_HEADERS");
    pub const TRACE_COUNT: usize = index_of(&F, "TRACE_COUNT");
    pub const DATA_OFFSET: usize = index_of(&F, "DATA_OFFSET");
}

/// Column indices of trace header fields the codec reads itself.
pub mod th {
    use super::{TRACE_HEADER_FIELDS as F, index_of};

    pub const TRACENO: usize = index_of(&F, "TRACENO");
    pub const ELEVSC: usize = index_of(&F, "ELEVSC");
    pub const COORDSC: usize = index_of(&F, "COORDSC");
    pub const SOU_X: usize = index_of(&F, "SOU_X");
    pub const SOU_Y: usize = index_of(&F, "SOU_Y");
    pub const REC_X: usize = index_of(&F, "REC_X");
    pub const REC_Y: usize = index_of(&F, "REC_Y");
    pub const NUMSMP: usize = index_of(&F, "NUMSMP");
    pub const DT: usize = index_of(&F, "DT");
    pub const YEAR: usize = index_of(&F, "YEAR");
    pub const DAY: usize = index_of(&F, "DAY");
    pub const HOUR: usize = index_of(&F, "HOUR");
    pub const MINUTE: usize = index_of(&F, "MINUTE");
    pub const SECOND: usize = index_of(&F, "SECOND");
    pub const CDP_X: usize = index_of(&F, "CDP_X");
    pub const CDP_Y: usize = index_of(&F, "CDP_Y");

    /// The six fields scaled by COORDSC.
    pub const COORDINATES: [usize; 6] = [SOU_X, SOU_Y, REC_X, REC_Y, CDP_X, CDP_Y];
}

/// Look up a field by name, returning its column index.
pub fn field_index(fields: &[FieldSpec], name: &str) -> Result<usize> {
    fields
        .iter()
        .position(|f| f.name == name)
        .ok_or_else(|| SegyError::UnknownField(name.to_string()))
}

/// Read one field from a header block.
///
/// The caller guarantees `block` covers the field.
pub fn read_field(block: &[u8], spec: &FieldSpec, byte_order: ByteOrder) -> i64 {
    let b = &block[spec.offset..spec.end()];
    macro_rules! get {
        ($ty:ty) => {{
            let mut buf = [0u8; std::mem::size_of::<$ty>()];
            buf.copy_from_slice(b);
            match byte_order {
                ByteOrder::Big => <$ty>::from_be_bytes(buf),
                ByteOrder::Little => <$ty>::from_le_bytes(buf),
            }
        }};
    }
    match spec.kind {
        FieldKind::U8 => b[0] as i64,
        FieldKind::U16 => get!(u16) as i64,
        FieldKind::I16 => get!(i16) as i64,
        FieldKind::I32 => get!(i32) as i64,
        FieldKind::U64 => get!(u64) as i64,
    }
}

/// Fail with [`SegyError::FieldOverflow`] if `value` does not fit `spec`.
pub fn check_value(spec: &FieldSpec, value: i64) -> Result<()> {
    if spec.kind.accepts(value) {
        Ok(())
    } else {
        Err(SegyError::FieldOverflow {
            field: spec.name,
            value,
        })
    }
}

/// Write one field into a header block, leaving all other bytes alone.
///
/// Fails with [`SegyError::FieldOverflow`] if `value` does not fit the
/// field's on-disk width; the block is not touched in that case.
pub fn write_field(
    block: &mut [u8],
    spec: &FieldSpec,
    value: i64,
    byte_order: ByteOrder,
) -> Result<()> {
    check_value(spec, value)?;
    let out = &mut block[spec.offset..spec.end()];
    macro_rules! put {
        ($ty:ty) => {
            match byte_order {
                ByteOrder::Big => out.copy_from_slice(&(value as $ty).to_be_bytes()),
                ByteOrder::Little => out.copy_from_slice(&(value as $ty).to_le_bytes()),
            }
        };
    }
    match spec.kind {
        FieldKind::U8 => out[0] = value as u8,
        FieldKind::U16 => put!(u16),
        FieldKind::I16 => put!(i16),
        FieldKind::I32 => put!(i32),
        FieldKind::U64 => put!(u64),
    }
    Ok(())
}
