//! Trace record geometry and iteration over raw trace records.
//!
//! [`TraceLayout`] turns a decoded binary header plus the file size into
//! the position and size of every trace record. [`TraceRecords`] walks the
//! records of an in-memory file, yielding the header and sample bytes of
//! each one.

use std::path::Path;

use crate::binary::BinaryFileHeader;
use crate::schema::{BINARY_HEADER_SIZE, TRACE_HEADER_SIZE};
use crate::segy::LoadOptions;
use crate::textual::TEXTUAL_HEADER_SIZE;
use crate::types::{ByteOrder, SampleFormat};
use crate::{Result, SegyError, io};

/// Start of the first trace record in a file without extended textual headers.
pub const DEFAULT_DATA_OFFSET: u64 = (TEXTUAL_HEADER_SIZE + BINARY_HEADER_SIZE) as u64;

/// Where the traces of a file live and how they are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceLayout {
    pub format: SampleFormat,
    pub byte_order: ByteOrder,
    pub samples_per_trace: usize,
    pub trace_count: usize,
    /// Byte offset of the first trace record.
    pub data_offset: u64,
}

impl TraceLayout {
    /// Derive the layout from a binary header and the total file length.
    ///
    /// The data offset is the header's DATA_OFFSET field when it points
    /// inside the file, otherwise 3600 plus 3200 bytes per extended textual
    /// header. A declared trace count of 0 is inferred from the data
    /// section, which must then hold a whole number of records.
    pub fn from_header(
        binary: &BinaryFileHeader,
        byte_order: ByteOrder,
        file_len: u64,
    ) -> Result<Self> {
        let format = binary.sample_format()?;
        let samples_per_trace = binary.samples_per_trace();

        let computed_offset =
            DEFAULT_DATA_OFFSET + (binary.ext_text_headers() * TEXTUAL_HEADER_SIZE) as u64;
        let declared_offset = binary.data_offset();
        let data_offset = if declared_offset == 0 {
            computed_offset
        } else if (DEFAULT_DATA_OFFSET..=file_len).contains(&declared_offset) {
            if declared_offset != computed_offset {
                log::warn!(
                    "data offset field {declared_offset} disagrees with {} extended textual headers",
                    binary.ext_text_headers()
                );
            }
            declared_offset
        } else {
            log::warn!("ignoring data offset field {declared_offset}, using {computed_offset}");
            computed_offset
        };

        if data_offset > file_len {
            return Err(SegyError::Layout(format!(
                "data starts at byte {data_offset} but the file has {file_len} bytes"
            )));
        }

        let record_size = record_size(format, samples_per_trace);
        let data_bytes = file_len - data_offset;
        let declared_count = binary.trace_count();
        let trace_count = if declared_count == 0 {
            if data_bytes % record_size != 0 {
                return Err(SegyError::TruncatedFile {
                    data_bytes,
                    record_size,
                });
            }
            let inferred = data_bytes / record_size;
            log::debug!("trace count not set, inferred {inferred} from file size");
            inferred
        } else {
            let needed = declared_count.saturating_mul(record_size);
            if needed > data_bytes {
                return Err(SegyError::Layout(format!(
                    "{declared_count} traces of {record_size} bytes need {needed} bytes, found {data_bytes}"
                )));
            }
            if needed < data_bytes {
                log::warn!("{} bytes after the last trace are ignored", data_bytes - needed);
            }
            declared_count
        };

        Ok(TraceLayout {
            format,
            byte_order,
            samples_per_trace,
            trace_count: usize::try_from(trace_count)
                .map_err(|_| SegyError::Layout(format!("{trace_count} traces do not fit in memory")))?,
            data_offset,
        })
    }

    /// Read only the headers of a file and derive its layout.
    pub fn from_file(
        path: impl AsRef<Path>,
        options: &LoadOptions,
    ) -> Result<(BinaryFileHeader, Self)> {
        let path = path.as_ref();
        let (binary, order) = BinaryFileHeader::load_from_file(path, options)?;
        let layout = Self::from_header(&binary, order, io::file_len(path)?)?;
        Ok((binary, layout))
    }

    /// Bytes in one trace record, header included.
    pub fn record_size(&self) -> u64 {
        record_size(self.format, self.samples_per_trace)
    }

    /// Bytes of sample data in one trace record.
    pub fn sample_bytes(&self) -> usize {
        self.samples_per_trace * self.format.byte_size()
    }

    /// Byte offset of trace `index`'s header.
    pub fn record_offset(&self, index: usize) -> u64 {
        self.data_offset + index as u64 * self.record_size()
    }

    /// Byte offset of trace `index`'s samples.
    pub fn samples_offset(&self, index: usize) -> u64 {
        self.record_offset(index) + TRACE_HEADER_SIZE as u64
    }
}

fn record_size(format: SampleFormat, samples_per_trace: usize) -> u64 {
    (TRACE_HEADER_SIZE + samples_per_trace * format.byte_size()) as u64
}

/// One raw trace record borrowed from a file buffer.
#[derive(Debug, Clone, Copy)]
pub struct TraceRecord<'a> {
    pub index: usize,
    pub header: &'a [u8],
    pub samples: &'a [u8],
}

/// Iterator over the trace records of a whole file held in memory.
///
/// Iteration stops after `trace_count` records, or after yielding an error
/// when the buffer ends inside a record.
pub struct TraceRecords<'a> {
    data: &'a [u8],
    layout: TraceLayout,
    index: usize,
    offset: usize,
}

impl<'a> TraceRecords<'a> {
    /// `data` is the full file, starting with the textual header.
    pub fn new(data: &'a [u8], layout: &TraceLayout) -> Self {
        Self {
            data,
            layout: *layout,
            index: 0,
            offset: usize::try_from(layout.data_offset).unwrap_or(usize::MAX),
        }
    }
}

impl<'a> Iterator for TraceRecords<'a> {
    type Item = Result<TraceRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.layout.trace_count {
            return None;
        }

        let sample_bytes = self.layout.sample_bytes();
        let record_len = TRACE_HEADER_SIZE + sample_bytes;
        let remaining = self.data.get(self.offset..).unwrap_or_default();
        if remaining.len() < record_len {
            // Stop iteration after reporting the short record
            self.index = self.layout.trace_count;
            return Some(Err(SegyError::block("trace record", record_len, remaining.len())));
        }

        let record = TraceRecord {
            index: self.index,
            header: &remaining[..TRACE_HEADER_SIZE],
            samples: &remaining[TRACE_HEADER_SIZE..record_len],
        };
        log::trace!("trace {} at byte {}", self.index, self.offset);
        self.index += 1;
        self.offset += record_len;
        Some(Ok(record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.layout.trace_count - self.index;
        (0, Some(left))
    }
}
