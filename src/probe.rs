//! Header-only queries and in-place header patches on a file path.
//!
//! Nothing here reads trace data: only the first 3600 bytes and the file
//! length are consulted.

use std::fmt;
use std::path::Path;

use crate::binary::{BINARY_HEADER_OFFSET, BinaryFileHeader};
use crate::reader::TraceLayout;
use crate::schema::{self, BINARY_HEADER_FIELDS, bfh};
use crate::segy::LoadOptions;
use crate::types::{ByteOrder, SampleFormat};
use crate::{Result, io};

/// What a file's headers say about its traces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileSummary {
    pub byte_order: ByteOrder,
    pub sample_format: SampleFormat,
    /// Microseconds.
    pub sample_interval: i64,
    pub samples_per_trace: usize,
    /// Inferred from the file size when the header leaves it at 0.
    pub trace_count: usize,
    pub fixed_length: bool,
}

impl FileSummary {
    pub fn probe(path: impl AsRef<Path>) -> Result<Self> {
        Self::probe_with(path, &LoadOptions::default())
    }

    pub fn probe_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let (binary, layout) = TraceLayout::from_file(path, options)?;
        Ok(FileSummary {
            byte_order: layout.byte_order,
            sample_format: layout.format,
            sample_interval: binary.sample_interval(),
            samples_per_trace: layout.samples_per_trace,
            trace_count: layout.trace_count,
            fixed_length: binary.fixed_length(),
        })
    }

    /// Duration of one trace in milliseconds.
    pub fn trace_length_ms(&self) -> f64 {
        self.samples_per_trace.saturating_sub(1) as f64 * self.sample_interval as f64 / 1000.0
    }

    /// Sampling frequency in Hz, or `None` when no interval is recorded.
    pub fn sampling_frequency(&self) -> Option<f64> {
        (self.sample_interval > 0).then(|| 1e6 / self.sample_interval as f64)
    }
}

impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} traces x {} samples at {} us, {}, {}",
            self.trace_count,
            self.samples_per_trace,
            self.sample_interval,
            self.sample_format,
            self.byte_order
        )
    }
}

/// Rewrite the sample format code of a file in place.
///
/// Only the two bytes of the field change; the trace data is not converted.
pub fn patch_sample_format(path: impl AsRef<Path>, format: SampleFormat) -> Result<()> {
    let path = path.as_ref();
    // Forcing the format lets files with a broken code still be repaired.
    let options = LoadOptions::new().with_forced_sample_format(format);
    let (_, order) = BinaryFileHeader::load_from_file(path, &options)?;
    patch_field(path, bfh::SAMPLE_FORMAT, i64::from(format.code()), order)
}

/// Rewrite the sample interval (microseconds) of a file in place.
pub fn patch_sample_interval(path: impl AsRef<Path>, micros: i64) -> Result<()> {
    let path = path.as_ref();
    let (_, order) = BinaryFileHeader::load_from_file(path, &LoadOptions::default())?;
    patch_field(path, bfh::SAMPLE_INTERVAL, micros, order)
}

fn patch_field(path: &Path, index: usize, value: i64, order: ByteOrder) -> Result<()> {
    let spec = &BINARY_HEADER_FIELDS[index];
    let mut bytes = vec![0u8; spec.end()];
    schema::write_field(&mut bytes, spec, value, order)?;
    log::debug!("patching {} = {value} in {}", spec.name, path.display());
    let offset = (BINARY_HEADER_OFFSET + spec.offset) as u64;
    io::patch_regions(path, &[(offset, &bytes[spec.offset..])])
}
