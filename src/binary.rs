//! The 400-byte binary file header.
//!
//! Fields are addressed by name (see [`BINARY_HEADER_FIELDS`]) or through
//! typed accessors for the ones the codec itself depends on. The raw block
//! is kept so that reserved regions survive a read-modify-write.

use std::fmt;
use std::path::Path;

use crate::schema::{self, BINARY_HEADER_FIELDS, BINARY_HEADER_SIZE, bfh};
use crate::segy::LoadOptions;
use crate::textual::TEXTUAL_HEADER_SIZE;
use crate::types::{ByteOrder, SampleFormat, decode_with_byte_order};
use crate::{Result, SegyError, io};

/// Byte offset of the binary header within a SEG-Y file.
pub const BINARY_HEADER_OFFSET: usize = TEXTUAL_HEADER_SIZE;

const SAMPLE_FORMAT_OFFSET: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryFileHeader {
    raw: [u8; BINARY_HEADER_SIZE],
    values: Vec<i64>,
}

impl Default for BinaryFileHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryFileHeader {
    /// An all-zero header.
    pub fn new() -> Self {
        BinaryFileHeader {
            raw: [0; BINARY_HEADER_SIZE],
            values: vec![0; BINARY_HEADER_FIELDS.len()],
        }
    }

    /// Decode exactly 400 bytes.
    ///
    /// The sample format code must be a known one unless `forced` is given,
    /// in which case the forced format replaces whatever the bytes say.
    pub fn from_bytes(
        bytes: &[u8],
        byte_order: ByteOrder,
        forced: Option<SampleFormat>,
    ) -> Result<Self> {
        let raw: [u8; BINARY_HEADER_SIZE] = bytes
            .try_into()
            .map_err(|_| SegyError::block("binary file header", BINARY_HEADER_SIZE, bytes.len()))?;
        let mut values: Vec<i64> = BINARY_HEADER_FIELDS
            .iter()
            .map(|spec| schema::read_field(&raw, spec, byte_order))
            .collect();

        match forced {
            Some(format) => {
                if values[bfh::SAMPLE_FORMAT] != format.code() as i64 {
                    log::debug!(
                        "sample format {} overridden by {format}",
                        values[bfh::SAMPLE_FORMAT]
                    );
                }
                values[bfh::SAMPLE_FORMAT] = format.code() as i64;
            }
            None => {
                SampleFormat::from_code(values[bfh::SAMPLE_FORMAT])?;
            }
        }
        Ok(BinaryFileHeader { raw, values })
    }

    /// Encode to 400 bytes. Reserved regions are copied from the block this
    /// header was decoded from, or zero for a new header.
    pub fn to_bytes(&self, byte_order: ByteOrder) -> Result<Vec<u8>> {
        let mut block = self.raw;
        for (spec, &value) in BINARY_HEADER_FIELDS.iter().zip(&self.values) {
            schema::write_field(&mut block, spec, value, byte_order)?;
        }
        Ok(block.to_vec())
    }

    pub fn get(&self, name: &str) -> Result<i64> {
        let index = schema::field_index(&BINARY_HEADER_FIELDS, name)?;
        Ok(self.values[index])
    }

    /// Set a field by name. Values that do not fit the field are rejected.
    pub fn set(&mut self, name: &str, value: i64) -> Result<()> {
        let index = schema::field_index(&BINARY_HEADER_FIELDS, name)?;
        self.set_index(index, value)
    }

    fn set_index(&mut self, index: usize, value: i64) -> Result<()> {
        schema::check_value(&BINARY_HEADER_FIELDS[index], value)?;
        self.values[index] = value;
        Ok(())
    }

    /// All fields in layout order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, i64)> + '_ {
        BINARY_HEADER_FIELDS
            .iter()
            .zip(&self.values)
            .map(|(spec, &value)| (spec.name, value))
    }

    /// Sample interval in microseconds.
    pub fn sample_interval(&self) -> i64 {
        self.values[bfh::SAMPLE_INTERVAL]
    }

    pub fn set_sample_interval(&mut self, micros: i64) -> Result<()> {
        self.set_index(bfh::SAMPLE_INTERVAL, micros)
    }

    /// Samples per trace, falling back to the extended field when the
    /// 2-byte field is zero.
    pub fn samples_per_trace(&self) -> usize {
        let short = self.values[bfh::SAMPLES_PER_TRACE];
        let value = if short == 0 {
            self.values[bfh::EXT_SAMPLES_PER_TRACE]
        } else {
            short
        };
        usize::try_from(value).unwrap_or(0)
    }

    /// Stores the count in the 2-byte field when it fits, otherwise in the
    /// extended field with the 2-byte field zeroed.
    pub fn set_samples_per_trace(&mut self, samples: usize) -> Result<()> {
        let value = i64::try_from(samples).unwrap_or(i64::MAX);
        if u16::try_from(samples).is_ok() {
            self.set_index(bfh::SAMPLES_PER_TRACE, value)?;
            self.values[bfh::EXT_SAMPLES_PER_TRACE] = 0;
        } else {
            self.set_index(bfh::EXT_SAMPLES_PER_TRACE, value)?;
            self.values[bfh::SAMPLES_PER_TRACE] = 0;
        }
        Ok(())
    }

    pub fn sample_format(&self) -> Result<SampleFormat> {
        SampleFormat::from_code(self.values[bfh::SAMPLE_FORMAT])
    }

    pub fn set_sample_format(&mut self, format: SampleFormat) {
        self.values[bfh::SAMPLE_FORMAT] = format.code() as i64;
    }

    /// Declared number of traces; 0 means "derive from the file size".
    pub fn trace_count(&self) -> u64 {
        self.values[bfh::TRACE_COUNT] as u64
    }

    pub fn set_trace_count(&mut self, count: u64) {
        self.values[bfh::TRACE_COUNT] = count as i64;
    }

    /// Declared byte offset of the first trace; 0 means "not given".
    pub fn data_offset(&self) -> u64 {
        self.values[bfh::DATA_OFFSET] as u64
    }

    pub fn set_data_offset(&mut self, offset: u64) {
        self.values[bfh::DATA_OFFSET] = offset as i64;
    }

    /// Number of 3200-byte extended textual headers after this block.
    ///
    /// Negative values (-1 means "variable" in rev 1) are reported as 0.
    pub fn ext_text_headers(&self) -> usize {
        usize::try_from(self.values[bfh::EXT_TEXT_HEADERS]).unwrap_or(0)
    }

    pub fn set_ext_text_headers(&mut self, count: usize) -> Result<()> {
        self.set_index(bfh::EXT_TEXT_HEADERS, count as i64)
    }

    pub fn traces_per_ensemble(&self) -> i64 {
        self.values[bfh::TRACES_PER_ENSEMBLE]
    }

    pub fn set_traces_per_ensemble(&mut self, traces: i64) -> Result<()> {
        self.set_index(bfh::TRACES_PER_ENSEMBLE, traces)
    }

    /// Whether the header flags every trace as having the same length.
    pub fn fixed_length(&self) -> bool {
        self.values[bfh::FIXED_LENGTH] != 0
    }

    /// Read and decode the binary header of a file, resolving its byte
    /// order per `options`.
    pub fn load_from_file(
        path: impl AsRef<Path>,
        options: &LoadOptions,
    ) -> Result<(Self, ByteOrder)> {
        let path = path.as_ref();
        let prefix = io::read_prefix(path, BINARY_HEADER_OFFSET + BINARY_HEADER_SIZE)?;
        let block = prefix.get(BINARY_HEADER_OFFSET..).unwrap_or_default();
        Self::decode_block(block, options)
    }

    /// Decode a 400-byte block, auto-detecting the byte order unless
    /// `options` fixes it.
    pub(crate) fn decode_block(block: &[u8], options: &LoadOptions) -> Result<(Self, ByteOrder)> {
        if block.len() != BINARY_HEADER_SIZE {
            return Err(SegyError::block("binary file header", BINARY_HEADER_SIZE, block.len()));
        }
        let format_bytes = [block[SAMPLE_FORMAT_OFFSET], block[SAMPLE_FORMAT_OFFSET + 1]];
        decode_with_byte_order(options.byte_order, format_bytes, |order| {
            Self::from_bytes(block, order, options.forced_sample_format)
        })
    }

    /// Overwrite the binary header of an existing SEG-Y file in place,
    /// using that file's byte order.
    pub fn replace_in_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let (_, order) = Self::load_from_file(path, &LoadOptions::default())?;
        let bytes = self.to_bytes(order)?;
        io::patch_regions(path, &[(BINARY_HEADER_OFFSET as u64, bytes.as_slice())])
    }

    /// Write `FIELD,value` lines for every field.
    pub fn export_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut out = String::new();
        for (name, value) in self.fields() {
            out.push_str(&format!("{name},{value}\n"));
        }
        io::write_file_atomic(path.as_ref(), out.as_bytes())
    }

    /// Read `FIELD,value` lines. Fields not listed are zero; unknown field
    /// names are skipped with a warning.
    pub fn import_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SegyError::io(path, e))?;
        Self::parse_csv(&content)
    }

    fn parse_csv(content: &str) -> Result<Self> {
        let mut header = Self::new();
        for (i, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let invalid = |reason: String| SegyError::InvalidCsv { line: i + 1, reason };
            let (name, value) = line
                .split_once(',')
                .ok_or_else(|| invalid(format!("expected FIELD,value, got {line:?}")))?;
            let (name, value) = (name.trim(), value.trim());
            let Ok(index) = schema::field_index(&BINARY_HEADER_FIELDS, name) else {
                log::warn!("skipping unknown binary header field {name:?} on line {}", i + 1);
                continue;
            };
            let value: i64 = value
                .parse()
                .map_err(|_| invalid(format!("{value:?} is not an integer")))?;
            header.set_index(index, value)?;
        }
        Ok(header)
    }
}

impl fmt::Display for BinaryFileHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.fields().filter(|&(_, v)| v != 0) {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{name}: {value}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_header() -> BinaryFileHeader {
        let mut header = BinaryFileHeader::new();
        header.set_sample_interval(500).unwrap();
        header.set_samples_per_trace(20).unwrap();
        header.set_sample_format(SampleFormat::Float32);
        header.set_trace_count(10);
        header.set_data_offset(3600);
        header
    }

    #[test]
    fn test_wrong_size_rejected() {
        let err = BinaryFileHeader::from_bytes(&[0; 399], ByteOrder::Big, None).unwrap_err();
        assert!(matches!(err, SegyError::BlockSize { expected: 400, actual: 399, .. }));
    }

    #[test]
    fn test_roundtrip_key_fields() {
        let header = sample_header();
        for order in [ByteOrder::Big, ByteOrder::Little] {
            let bytes = header.to_bytes(order).unwrap();
            assert_eq!(bytes.len(), 400);
            let back = BinaryFileHeader::from_bytes(&bytes, order, None).unwrap();
            assert_eq!(back.sample_interval(), 500);
            assert_eq!(back.samples_per_trace(), 20);
            assert_eq!(back.sample_format().unwrap(), SampleFormat::Float32);
            assert_eq!(back.trace_count(), 10);
            assert_eq!(back.data_offset(), 3600);
        }
        let be = header.to_bytes(ByteOrder::Big).unwrap();
        assert_eq!(&be[16..18], &[0x01, 0xF4]);
        assert_eq!(&be[24..26], &[0, 5]);
    }

    #[test]
    fn test_unknown_format_rejected_unless_forced() {
        let mut bytes = sample_header().to_bytes(ByteOrder::Big).unwrap();
        bytes[24..26].copy_from_slice(&7i16.to_be_bytes());
        assert!(matches!(
            BinaryFileHeader::from_bytes(&bytes, ByteOrder::Big, None),
            Err(SegyError::UnknownSampleFormat(7))
        ));
        let forced =
            BinaryFileHeader::from_bytes(&bytes, ByteOrder::Big, Some(SampleFormat::Int16))
                .unwrap();
        assert_eq!(forced.sample_format().unwrap(), SampleFormat::Int16);
    }

    #[test]
    fn test_reserved_regions_preserved() {
        let mut bytes = sample_header().to_bytes(ByteOrder::Big).unwrap();
        bytes[150] = 0xAB;
        bytes[399] = 0xCD;
        let mut header = BinaryFileHeader::from_bytes(&bytes, ByteOrder::Big, None).unwrap();
        header.set("JOB_ID", 42).unwrap();
        let out = header.to_bytes(ByteOrder::Big).unwrap();
        assert_eq!(out[150], 0xAB);
        assert_eq!(out[399], 0xCD);
        assert_eq!(&out[0..4], &42i32.to_be_bytes());
    }

    #[test]
    fn test_decode_block_detects_order() {
        let header = sample_header();
        for order in [ByteOrder::Big, ByteOrder::Little] {
            let bytes = header.to_bytes(order).unwrap();
            let (back, detected) =
                BinaryFileHeader::decode_block(&bytes, &LoadOptions::default()).unwrap();
            assert_eq!(detected, order);
            assert_eq!(back.sample_interval(), 500);
        }
    }

    #[test]
    fn test_get_set_by_name() {
        let mut header = BinaryFileHeader::new();
        header.set("LINE_NO", -7).unwrap();
        assert_eq!(header.get("LINE_NO").unwrap(), -7);
        assert!(matches!(header.get("NOPE"), Err(SegyError::UnknownField(_))));
        assert!(matches!(
            header.set("SAMPLE_FORMAT", 1 << 20),
            Err(SegyError::FieldOverflow { .. })
        ));
        assert!(header.set("SAMPLE_INTERVAL", -1).is_err());
    }

    #[test]
    fn test_extended_samples_per_trace() {
        let mut header = BinaryFileHeader::new();
        header.set_samples_per_trace(100_000).unwrap();
        assert_eq!(header.get("SAMPLES_PER_TRACE").unwrap(), 0);
        assert_eq!(header.get("EXT_SAMPLES_PER_TRACE").unwrap(), 100_000);
        assert_eq!(header.samples_per_trace(), 100_000);
    }

    #[test]
    fn test_csv_roundtrip_and_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bfh.csv");
        let header = sample_header();
        header.export_csv(&path).unwrap();
        assert_eq!(BinaryFileHeader::import_csv(&path).unwrap(), header);

        let parsed = BinaryFileHeader::parse_csv("SAMPLE_INTERVAL, 250\nBOGUS,1\n\n").unwrap();
        assert_eq!(parsed.sample_interval(), 250);
        assert_eq!(parsed.trace_count(), 0);

        assert!(matches!(
            BinaryFileHeader::parse_csv("SAMPLE_INTERVAL,abc"),
            Err(SegyError::InvalidCsv { line: 1, .. })
        ));
        assert!(matches!(
            BinaryFileHeader::parse_csv("JOB_ID 3"),
            Err(SegyError::InvalidCsv { line: 1, .. })
        ));
    }

    #[test]
    fn test_display_lists_non_zero_fields() {
        let shown = sample_header().to_string();
        assert!(shown.contains("SAMPLE_INTERVAL: 500"));
        assert!(shown.contains("SAMPLE_FORMAT: 5"));
        assert!(!shown.contains("JOB_ID"));
    }
}
