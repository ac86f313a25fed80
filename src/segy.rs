//! [`SegyFile`]: a whole SEG-Y file held in memory.
//!
//! A file is either loaded from disk or synthesized by one of the factory
//! functions; both give a ready value that can be inspected, edited and
//! saved. Saving always writes the whole file.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::binary::{BINARY_HEADER_OFFSET, BinaryFileHeader};
use crate::data::DataMatrix;
use crate::reader::{DEFAULT_DATA_OFFSET, TraceLayout, TraceRecords};
use crate::samples::Sample;
use crate::schema::{BINARY_HEADER_SIZE, TRACE_HEADER_SIZE, th};
use crate::textual::{TEXTUAL_HEADER_SIZE, TextualHeader};
use crate::trace_header::{TraceHeader, TraceHeaderTable};
use crate::types::{ByteOrder, SampleFormat, SampleKind};
use crate::{Result, SegyError, io};

/// How to read a file.
///
/// # Example
///
/// ```
/// use segy_rs::{ByteOrder, LoadOptions, SampleFormat};
///
/// let options = LoadOptions::new()
///     .with_byte_order(ByteOrder::Little)
///     .with_forced_sample_format(SampleFormat::Float32);
/// assert_eq!(options.byte_order, Some(ByteOrder::Little));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// `None` detects the byte order from the sample format field.
    pub byte_order: Option<ByteOrder>,
    /// Replaces the sample format stored in the binary header.
    pub forced_sample_format: Option<SampleFormat>,
}

impl LoadOptions {
    /// Auto-detected byte order, stored sample format.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = Some(byte_order);
        self
    }

    pub fn with_forced_sample_format(mut self, format: SampleFormat) -> Self {
        self.forced_sample_format = Some(format);
        self
    }
}

/// Where a [`SegyFile`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Loaded(PathBuf),
    Synthesized,
}

/// A SEG-Y file: textual header, binary header, one header and one row of
/// samples per trace, and the byte order used on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct SegyFile {
    pub textual: TextualHeader,
    /// Extended textual headers and any other bytes between the binary
    /// header and the first trace, kept verbatim.
    pub extended_textual: Vec<u8>,
    pub binary: BinaryFileHeader,
    pub headers: TraceHeaderTable,
    pub data: DataMatrix,
    pub byte_order: ByteOrder,
    origin: Origin,
}

impl SegyFile {
    /// Load a whole file.
    pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("loading {}", path.display());
        let bytes = io::read_file(path)?;
        let mut file = Self::from_bytes(&bytes, options)?;
        file.origin = Origin::Loaded(path.to_path_buf());
        Ok(file)
    }

    /// Decode a whole file held in memory.
    pub fn from_bytes(bytes: &[u8], options: &LoadOptions) -> Result<Self> {
        let headers_end = TEXTUAL_HEADER_SIZE + BINARY_HEADER_SIZE;
        if bytes.len() < headers_end {
            return Err(SegyError::block("SEG-Y file headers", headers_end, bytes.len()));
        }
        let textual = TextualHeader::from_bytes(&bytes[..TEXTUAL_HEADER_SIZE])?;
        let (binary, byte_order) =
            BinaryFileHeader::decode_block(&bytes[BINARY_HEADER_OFFSET..headers_end], options)?;
        log::debug!("binary header decoded as {byte_order}");

        let layout = TraceLayout::from_header(&binary, byte_order, bytes.len() as u64)?;
        log::debug!(
            "{} traces x {} samples, {}, data at byte {}",
            layout.trace_count,
            layout.samples_per_trace,
            layout.format,
            layout.data_offset
        );

        let data_offset = layout.data_offset as usize;
        let extended_textual = bytes[headers_end..data_offset].to_vec();

        let rows = TraceRecords::new(bytes, &layout)
            .map(|record| TraceHeader::from_bytes(record?.header, byte_order))
            .collect::<Result<Vec<_>>>()?;
        let data = DataMatrix::decode_records(bytes, &layout)?;

        Ok(SegyFile {
            textual,
            extended_textual,
            binary,
            headers: TraceHeaderTable::from_rows(rows),
            data,
            byte_order,
            origin: Origin::Synthesized,
        })
    }

    /// A file of `shape` zero-valued IEEE float32 traces.
    pub fn empty(shape: (usize, usize), sample_interval: i64) -> Result<Self> {
        Self::empty_with_format(shape, sample_interval, SampleFormat::Float32)
    }

    /// A file of `shape` zero-valued traces in `format`.
    pub fn empty_with_format(
        shape: (usize, usize),
        sample_interval: i64,
        format: SampleFormat,
    ) -> Result<Self> {
        let data = DataMatrix::zeros(format.kind(), shape);
        Self::synthesize(data, format, sample_interval)
    }

    /// Wrap an existing matrix; the sample format follows its element type.
    pub fn from_matrix(data: DataMatrix, sample_interval: i64) -> Result<Self> {
        let format = SampleFormat::for_kind(data.kind());
        Self::synthesize(data, format, sample_interval)
    }

    fn synthesize(data: DataMatrix, format: SampleFormat, sample_interval: i64) -> Result<Self> {
        let (traces, samples) = data.shape();
        let mut binary = BinaryFileHeader::new();
        binary.set_sample_interval(sample_interval)?;
        binary.set_sample_format(format);
        binary.set_samples_per_trace(samples)?;
        binary.set_trace_count(traces as u64);
        binary.set_data_offset(DEFAULT_DATA_OFFSET);
        if let Ok(n) = i16::try_from(traces) {
            binary.set_traces_per_ensemble(i64::from(n))?;
        }

        let mut headers = TraceHeaderTable::new(traces);
        stamp_trace_headers(&mut headers, samples, sample_interval)?;

        log::debug!("synthesized {traces} x {samples} file, {format}");
        Ok(SegyFile {
            textual: TextualHeader::new(),
            extended_textual: Vec::new(),
            binary,
            headers,
            data,
            byte_order: ByteOrder::Big,
            origin: Origin::Synthesized,
        })
    }

    /// A zero-valued file of `shape` that borrows every header from
    /// `template`. Trace headers are copied row by row; rows beyond the
    /// template's trace count are default headers.
    pub fn empty_like(template: &SegyFile, shape: (usize, usize)) -> Result<Self> {
        let (traces, samples) = shape;
        let mut binary = template.binary.clone();
        binary.set_samples_per_trace(samples)?;
        binary.set_trace_count(traces as u64);

        let rows = (0..traces)
            .map(|i| template.headers.row(i).cloned().unwrap_or_default())
            .collect();
        let mut headers = TraceHeaderTable::from_rows(rows);
        stamp_trace_headers(&mut headers, samples, binary.sample_interval())?;

        Ok(SegyFile {
            textual: template.textual.clone(),
            extended_textual: template.extended_textual.clone(),
            binary,
            headers,
            data: DataMatrix::zeros(template.data.kind(), shape),
            byte_order: template.byte_order,
            origin: Origin::Synthesized,
        })
    }

    /// [`empty_like`](Self::empty_like) with a template read from disk.
    pub fn empty_like_file(
        path: impl AsRef<Path>,
        shape: (usize, usize),
        options: &LoadOptions,
    ) -> Result<Self> {
        let template = Self::load(path, options)?;
        Self::empty_like(&template, shape)
    }

    /// A new file holding the traces whose headers equal every given
    /// `(field, value)` pair, renumbered from 0.
    pub fn extract_by_header(&self, conditions: &[(&str, f64)]) -> Result<Self> {
        let indices = self.headers.matching(conditions)?;
        log::debug!("{} of {} traces match", indices.len(), self.headers.len());

        let mut binary = self.binary.clone();
        binary.set_trace_count(indices.len() as u64);
        Ok(SegyFile {
            textual: self.textual.clone(),
            extended_textual: self.extended_textual.clone(),
            binary,
            headers: self.headers.select(&indices),
            data: self.data.select_traces(&indices),
            byte_order: self.byte_order,
            origin: Origin::Synthesized,
        })
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn trace_count(&self) -> usize {
        self.data.trace_count()
    }

    pub fn sample_format(&self) -> Result<SampleFormat> {
        self.binary.sample_format()
    }

    /// Transient view of trace `index`.
    pub fn trace(&self, index: usize) -> Option<Trace<'_>> {
        let header = self.headers.row(index)?;
        (index < self.data.trace_count()).then_some(Trace {
            index,
            header,
            data: &self.data,
        })
    }

    pub fn traces(&self) -> impl Iterator<Item = Trace<'_>> + '_ {
        (0..self.headers.len().min(self.data.trace_count())).filter_map(|i| self.trace(i))
    }

    /// Check that the components agree with each other.
    pub fn validate(&self) -> Result<()> {
        let format = self.binary.sample_format()?;
        let declared = (self.data.trace_count(), self.binary.samples_per_trace());
        if self.data.shape() != declared {
            return Err(SegyError::ShapeMismatch {
                expected: declared,
                actual: self.data.shape(),
            });
        }
        if self.headers.len() != self.data.trace_count() {
            return Err(SegyError::ShapeMismatch {
                expected: self.data.shape(),
                actual: (self.headers.len(), self.data.samples_per_trace()),
            });
        }
        if self.data.kind() != format.kind() {
            return Err(SegyError::TypeMismatch {
                expected: format.kind(),
                actual: self.data.kind(),
            });
        }
        let count = self.binary.trace_count();
        if count != 0 && count != self.data.trace_count() as u64 {
            return Err(SegyError::Layout(format!(
                "binary header declares {count} traces, the file holds {}",
                self.data.trace_count()
            )));
        }
        Ok(())
    }

    /// Encode the whole file in `byte_order`.
    ///
    /// Nothing is produced unless every component encodes: out-of-range IBM
    /// samples fail with the list of offending traces.
    pub fn to_bytes(&self, byte_order: ByteOrder) -> Result<Vec<u8>> {
        self.validate()?;
        let format = self.binary.sample_format()?;

        let mut binary = self.binary.clone();
        let data_offset = DEFAULT_DATA_OFFSET + self.extended_textual.len() as u64;
        // Padding that is not a whole number of textual headers can only be
        // skipped through the offset field.
        let padded = self.extended_textual.len() % TEXTUAL_HEADER_SIZE != 0;
        if (padded || binary.data_offset() != 0) && binary.data_offset() != data_offset {
            log::debug!("data offset field set to {data_offset}");
            binary.set_data_offset(data_offset);
        }
        binary.set_ext_text_headers(self.extended_textual.len() / TEXTUAL_HEADER_SIZE)?;

        let traces = self.data.encode_traces(format, byte_order)?;
        let headers = self
            .headers
            .iter()
            .map(|row| row.to_bytes(byte_order))
            .collect::<Result<Vec<_>>>()?;

        let record_size = TRACE_HEADER_SIZE + self.data.samples_per_trace() * format.byte_size();
        let mut out =
            Vec::with_capacity(data_offset as usize + record_size * self.data.trace_count());
        out.extend_from_slice(&self.textual.to_bytes());
        out.extend_from_slice(&binary.to_bytes(byte_order)?);
        out.extend_from_slice(&self.extended_textual);
        for (header, samples) in headers.iter().zip(&traces) {
            out.extend_from_slice(header);
            out.extend_from_slice(samples);
        }
        Ok(out)
    }

    /// Save in the file's own byte order.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_as(path, self.byte_order)
    }

    /// Save in `byte_order`. The target is replaced atomically: on any
    /// error it is left as it was.
    pub fn save_as(&self, path: impl AsRef<Path>, byte_order: ByteOrder) -> Result<()> {
        let path = path.as_ref();
        log::debug!("saving {} as {byte_order}", path.display());
        let bytes = self.to_bytes(byte_order)?;
        io::write_file_atomic(path, &bytes)
    }
}

/// Set trace number, sample count and sample interval on every row.
fn stamp_trace_headers(
    headers: &mut TraceHeaderTable,
    samples: usize,
    sample_interval: i64,
) -> Result<()> {
    let numbers: Vec<f64> = (1..=headers.len()).map(|n| n as f64).collect();
    headers.set_column("TRACENO", &numbers)?;
    // Samples past the 2-byte range live only in the binary header.
    headers.fill("NUMSMP", u16::try_from(samples).map_or(0.0, f64::from))?;
    headers.fill("DT", sample_interval as f64)?;
    Ok(())
}

/// A trace: its header row and its samples, borrowed from a [`SegyFile`].
#[derive(Debug, Clone, Copy)]
pub struct Trace<'a> {
    pub index: usize,
    pub header: &'a TraceHeader,
    data: &'a DataMatrix,
}

impl<'a> Trace<'a> {
    /// Samples as `T`, or `None` if the file stores another type.
    pub fn samples<T: Sample>(&self) -> Option<&'a [T]> {
        self.data.trace(self.index)
    }

    pub fn samples_f64(&self) -> Vec<f64> {
        self.data.trace_f64(self.index).unwrap_or_default()
    }

    pub fn kind(&self) -> SampleKind {
        self.data.kind()
    }

    /// Trace number within the line (TRACENO).
    pub fn number(&self) -> f64 {
        self.header.value(th::TRACENO)
    }
}

impl fmt::Display for SegyFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (traces, samples) = self.data.shape();
        write!(f, "SEG-Y: {traces} traces x {samples} samples, ")?;
        match self.binary.sample_format() {
            Ok(format) => write!(f, "{format}, ")?,
            Err(_) => write!(f, "unknown sample format, ")?,
        }
        write!(
            f,
            "dt {} us, {}",
            self.binary.sample_interval(),
            self.byte_order
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file() -> SegyFile {
        let mut file = SegyFile::empty((10, 20), 500).unwrap();
        file.data.fill(1.0f32).unwrap();
        file.data.set_trace(9, &[9.0f32; 20]).unwrap();
        file
    }

    #[test]
    fn test_empty_sets_headers() {
        let file = SegyFile::empty((10, 20), 500).unwrap();
        assert_eq!(file.binary.sample_interval(), 500);
        assert_eq!(file.binary.sample_format().unwrap(), SampleFormat::Float32);
        assert_eq!(file.binary.samples_per_trace(), 20);
        assert_eq!(file.binary.trace_count(), 10);
        assert_eq!(file.binary.data_offset(), 3600);
        assert_eq!(file.binary.traces_per_ensemble(), 10);
        assert_eq!(file.headers.column("NUMSMP").unwrap(), vec![20.0; 10]);
        assert_eq!(file.headers.column("DT").unwrap(), vec![500.0; 10]);
        assert_eq!(file.headers.row(3).unwrap().get("TRACENO").unwrap(), 4.0);
        assert_eq!(file.origin(), &Origin::Synthesized);
        file.validate().unwrap();
    }

    #[test]
    fn test_bytes_roundtrip_both_orders() {
        let file = sample_file();
        for order in [ByteOrder::Big, ByteOrder::Little] {
            let bytes = file.to_bytes(order).unwrap();
            assert_eq!(bytes.len(), 3600 + 10 * (240 + 80));
            let back = SegyFile::from_bytes(&bytes, &LoadOptions::default()).unwrap();
            assert_eq!(back.byte_order, order);
            assert_eq!(back.data, file.data);
            assert_eq!(back.headers, file.headers);
        }
    }

    #[test]
    fn test_forced_order_mismatch_fails() {
        let bytes = sample_file().to_bytes(ByteOrder::Big).unwrap();
        let options = LoadOptions::new().with_byte_order(ByteOrder::Little);
        assert!(matches!(
            SegyFile::from_bytes(&bytes, &options),
            Err(SegyError::UnknownSampleFormat(0x0500))
        ));
    }

    #[test]
    fn test_forced_sample_format() {
        let bytes = sample_file().to_bytes(ByteOrder::Big).unwrap();
        let options = LoadOptions::new().with_forced_sample_format(SampleFormat::Int32);
        let back = SegyFile::from_bytes(&bytes, &options).unwrap();
        assert_eq!(back.data.kind(), SampleKind::Int32);
        assert_eq!(back.data.trace::<i32>(0).unwrap()[0], 1.0f32.to_bits() as i32);
    }

    #[test]
    fn test_short_input() {
        assert!(matches!(
            SegyFile::from_bytes(&[0; 100], &LoadOptions::default()),
            Err(SegyError::BlockSize { expected: 3600, actual: 100, .. })
        ));
    }

    #[test]
    fn test_from_matrix_format_by_kind() {
        let cases = [
            (DataMatrix::from_vec(1, 1, vec![0f32]).unwrap(), 5),
            (DataMatrix::from_vec(1, 1, vec![0f64]).unwrap(), 6),
            (DataMatrix::from_vec(1, 1, vec![0i32]).unwrap(), 2),
            (DataMatrix::from_vec(1, 1, vec![0i16]).unwrap(), 3),
            (DataMatrix::from_vec(1, 1, vec![0i8]).unwrap(), 8),
            (DataMatrix::from_vec(1, 1, vec![0i64]).unwrap(), 9),
            (DataMatrix::from_vec(1, 1, vec![0u32]).unwrap(), 10),
            (DataMatrix::from_vec(1, 1, vec![0u16]).unwrap(), 11),
            (DataMatrix::from_vec(1, 1, vec![0u64]).unwrap(), 12),
            (DataMatrix::from_vec(1, 1, vec![0u8]).unwrap(), 16),
        ];
        for (matrix, code) in cases {
            let file = SegyFile::from_matrix(matrix, 250).unwrap();
            assert_eq!(file.binary.get("SAMPLE_FORMAT").unwrap(), code);
            file.to_bytes(ByteOrder::Big).unwrap();
        }
    }

    #[test]
    fn test_ibm_file_roundtrip() {
        let mut file = SegyFile::empty_with_format((2, 3), 1000, SampleFormat::Ibm32).unwrap();
        file.data.set_trace(0, &[-118.625f64, 0.5, 1.0]).unwrap();
        let bytes = file.to_bytes(ByteOrder::Big).unwrap();
        assert_eq!(&bytes[3600 + 240..3600 + 244], &[0xC2, 0x76, 0xA0, 0x00]);
        let back = SegyFile::from_bytes(&bytes, &LoadOptions::default()).unwrap();
        assert_eq!(back.data, file.data);
    }

    #[test]
    fn test_ibm_range_reports_traces() {
        let mut file = SegyFile::empty_with_format((3, 1), 1000, SampleFormat::Ibm32).unwrap();
        file.data.set_trace(1, &[1e100f64]).unwrap();
        assert!(matches!(
            file.to_bytes(ByteOrder::Big),
            Err(SegyError::IbmRangeTraces { traces }) if traces == vec![1]
        ));
    }

    #[test]
    fn test_validate_catches_mismatch() {
        let mut file = sample_file();
        file.binary.set_samples_per_trace(21).unwrap();
        assert!(matches!(file.validate(), Err(SegyError::ShapeMismatch { .. })));

        let mut file = sample_file();
        file.binary.set_sample_format(SampleFormat::Int32);
        assert!(matches!(file.validate(), Err(SegyError::TypeMismatch { .. })));

        let mut file = sample_file();
        file.binary.set_trace_count(3);
        assert!(matches!(file.validate(), Err(SegyError::Layout(_))));
    }

    #[test]
    fn test_extended_textual_preserved() {
        let mut file = sample_file();
        file.extended_textual = vec![0x40; 3200];
        let bytes = file.to_bytes(ByteOrder::Big).unwrap();
        let back = SegyFile::from_bytes(&bytes, &LoadOptions::default()).unwrap();
        assert_eq!(back.extended_textual.len(), 3200);
        assert_eq!(back.binary.data_offset(), 6800);
        assert_eq!(back.binary.ext_text_headers(), 1);
        assert_eq!(back.data, file.data);
    }

    #[test]
    fn test_padding_before_first_trace_survives_save() {
        let mut bytes = sample_file().to_bytes(ByteOrder::Big).unwrap();
        bytes.splice(3600..3600, std::iter::repeat_n(0xAB, 240));
        bytes[3520..3528].copy_from_slice(&3840u64.to_be_bytes());

        let file = SegyFile::from_bytes(&bytes, &LoadOptions::default()).unwrap();
        assert_eq!(file.extended_textual, vec![0xAB; 240]);
        assert_eq!(file.to_bytes(ByteOrder::Big).unwrap(), bytes);

        let mut file = file;
        file.binary.set_data_offset(0);
        let saved = file.to_bytes(ByteOrder::Little).unwrap();
        let back = SegyFile::from_bytes(&saved, &LoadOptions::default()).unwrap();
        assert_eq!(back.binary.data_offset(), 3840);
        assert_eq!(back.binary.ext_text_headers(), 0);
        assert_eq!(back.extended_textual, vec![0xAB; 240]);
        assert_eq!(back.data, file.data);
    }

    #[test]
    fn test_forced_sample_format_detects_little_endian() {
        let mut bytes = sample_file().to_bytes(ByteOrder::Little).unwrap();
        bytes[3224..3226].copy_from_slice(&[7, 0]);
        assert!(SegyFile::from_bytes(&bytes, &LoadOptions::default()).is_err());

        let options = LoadOptions::new().with_forced_sample_format(SampleFormat::Float32);
        let file = SegyFile::from_bytes(&bytes, &options).unwrap();
        assert_eq!(file.byte_order, ByteOrder::Little);
        assert_eq!(file.trace_count(), 10);
        assert_eq!(file.data, sample_file().data);
    }

    #[test]
    fn test_extract_by_header() {
        let mut file = sample_file();
        let ffid: Vec<f64> = (0..10).map(|i| (i % 2) as f64).collect();
        file.headers.set_column("FFID", &ffid).unwrap();
        let odd = file.extract_by_header(&[("FFID", 1.0)]).unwrap();
        assert_eq!(odd.trace_count(), 5);
        assert_eq!(odd.binary.trace_count(), 5);
        assert_eq!(odd.headers.column("TRACENO").unwrap(), vec![2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(odd.data.trace::<f32>(4).unwrap(), &[9.0; 20]);
        odd.validate().unwrap();

        let none = file.extract_by_header(&[("FFID", 7.0)]).unwrap();
        assert_eq!(none.data.shape(), (0, 20));
        assert!(file.extract_by_header(&[("NOPE", 1.0)]).is_err());
    }

    #[test]
    fn test_empty_like() {
        let mut template = sample_file();
        template.textual.set_line(1, "C 1 TEMPLATE").unwrap();
        template.headers.fill("FFID", 77.0).unwrap();
        let file = SegyFile::empty_like(&template, (12, 5)).unwrap();
        assert_eq!(file.data.shape(), (12, 5));
        assert_eq!(file.data.kind(), SampleKind::Float32);
        assert_eq!(file.textual, template.textual);
        assert_eq!(file.binary.samples_per_trace(), 5);
        assert_eq!(file.binary.trace_count(), 12);
        assert_eq!(file.headers.row(9).unwrap().get("FFID").unwrap(), 77.0);
        assert_eq!(file.headers.row(11).unwrap().get("FFID").unwrap(), 0.0);
        assert_eq!(file.headers.row(11).unwrap().get("NUMSMP").unwrap(), 5.0);
        file.validate().unwrap();
    }

    #[test]
    fn test_trace_views() {
        let file = sample_file();
        let trace = file.trace(9).unwrap();
        assert_eq!(trace.samples::<f32>().unwrap(), &[9.0; 20]);
        assert_eq!(trace.number(), 10.0);
        assert!(trace.samples::<i32>().is_none());
        assert!(file.trace(10).is_none());
        assert_eq!(file.traces().count(), 10);
    }

    #[test]
    fn test_display() {
        let shown = sample_file().to_string();
        assert!(shown.contains("10 traces x 20 samples"));
        assert!(shown.contains("code 5"));
        assert!(shown.contains("big-endian"));
    }
}
