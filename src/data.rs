//! The data matrix: one row of samples per trace.

use std::path::Path;

use crate::reader::{TraceLayout, TraceRecords};
use crate::samples::{self, Sample, Samples};
use crate::segy::LoadOptions;
use crate::types::{ByteOrder, SampleFormat, SampleKind};
use crate::{Result, SegyError, io};

/// Row-major 2-D array of trace samples, shape `(traces, samples_per_trace)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataMatrix {
    traces: usize,
    samples_per_trace: usize,
    samples: Samples,
}

impl DataMatrix {
    /// Wrap a row-major buffer. Its length must be `traces * samples_per_trace`.
    pub fn from_samples(traces: usize, samples_per_trace: usize, samples: Samples) -> Result<Self> {
        if traces.checked_mul(samples_per_trace) != Some(samples.len()) {
            return Err(SegyError::InvalidShape {
                traces,
                samples: samples_per_trace,
                len: samples.len(),
            });
        }
        Ok(DataMatrix {
            traces,
            samples_per_trace,
            samples,
        })
    }

    pub fn from_vec<T: Sample>(traces: usize, samples_per_trace: usize, values: Vec<T>) -> Result<Self> {
        Self::from_samples(traces, samples_per_trace, T::wrap(values))
    }

    /// Build from equal-length rows.
    pub fn from_rows<T: Sample>(rows: &[Vec<T>]) -> Result<Self> {
        let samples_per_trace = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(rows.len() * samples_per_trace);
        for row in rows {
            if row.len() != samples_per_trace {
                return Err(SegyError::InvalidShape {
                    traces: rows.len(),
                    samples: samples_per_trace,
                    len: values.len() + row.len(),
                });
            }
            values.extend_from_slice(row);
        }
        Self::from_vec(rows.len(), samples_per_trace, values)
    }

    pub fn zeros(kind: SampleKind, (traces, samples_per_trace): (usize, usize)) -> Self {
        DataMatrix {
            traces,
            samples_per_trace,
            samples: Samples::zeros(kind, traces * samples_per_trace),
        }
    }

    /// `(traces, samples_per_trace)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.traces, self.samples_per_trace)
    }

    pub fn trace_count(&self) -> usize {
        self.traces
    }

    pub fn samples_per_trace(&self) -> usize {
        self.samples_per_trace
    }

    pub fn kind(&self) -> SampleKind {
        self.samples.kind()
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    pub fn into_samples(self) -> Samples {
        self.samples
    }

    /// The whole buffer as `T`, or `None` if the element type differs.
    pub fn as_slice<T: Sample>(&self) -> Option<&[T]> {
        T::as_slice(&self.samples)
    }

    pub fn as_mut_slice<T: Sample>(&mut self) -> Option<&mut [T]> {
        T::as_mut_slice(&mut self.samples)
    }

    /// Row `index` as `T`.
    pub fn trace<T: Sample>(&self, index: usize) -> Option<&[T]> {
        if index >= self.traces {
            return None;
        }
        let start = index * self.samples_per_trace;
        self.as_slice::<T>()
            .map(|all| &all[start..start + self.samples_per_trace])
    }

    pub fn trace_mut<T: Sample>(&mut self, index: usize) -> Option<&mut [T]> {
        if index >= self.traces {
            return None;
        }
        let (start, len) = (index * self.samples_per_trace, self.samples_per_trace);
        self.as_mut_slice::<T>().map(|all| &mut all[start..start + len])
    }

    /// Row `index` widened to `f64`.
    pub fn trace_f64(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.traces {
            return None;
        }
        let start = index * self.samples_per_trace;
        (start..start + self.samples_per_trace)
            .map(|i| self.samples.get_f64(i))
            .collect()
    }

    pub fn get_f64(&self, trace: usize, sample: usize) -> Option<f64> {
        if trace >= self.traces || sample >= self.samples_per_trace {
            return None;
        }
        self.samples.get_f64(trace * self.samples_per_trace + sample)
    }

    /// Overwrite row `index`.
    pub fn set_trace<T: Sample>(&mut self, index: usize, values: &[T]) -> Result<()> {
        let shape = self.shape();
        let kind = self.kind();
        if values.len() != self.samples_per_trace {
            return Err(SegyError::ShapeMismatch {
                expected: (1, shape.1),
                actual: (1, values.len()),
            });
        }
        let row = self.trace_mut::<T>(index).ok_or(if index >= shape.0 {
            SegyError::ShapeMismatch {
                expected: shape,
                actual: (index + 1, shape.1),
            }
        } else {
            SegyError::TypeMismatch {
                expected: kind,
                actual: T::KIND,
            }
        })?;
        row.copy_from_slice(values);
        Ok(())
    }

    /// Set every sample of every trace to `value`.
    pub fn fill<T: Sample>(&mut self, value: T) -> Result<()> {
        let kind = self.kind();
        let all = self.as_mut_slice::<T>().ok_or(SegyError::TypeMismatch {
            expected: kind,
            actual: T::KIND,
        })?;
        all.fill(value);
        Ok(())
    }

    /// A new matrix of the given rows, in the given order. Out-of-range
    /// indices are skipped.
    pub fn select_traces(&self, indices: &[usize]) -> Self {
        let kept: Vec<usize> = indices.iter().copied().filter(|&i| i < self.traces).collect();
        DataMatrix {
            traces: kept.len(),
            samples_per_trace: self.samples_per_trace,
            samples: self.samples.gather_rows(&kept, self.samples_per_trace),
        }
    }

    /// Decode the samples of every trace record in `file`, which holds the
    /// whole SEG-Y file.
    pub(crate) fn decode_records(file: &[u8], layout: &TraceLayout) -> Result<Self> {
        let mut samples = Samples::with_capacity(
            layout.format.kind(),
            layout.trace_count * layout.samples_per_trace,
        );
        for record in TraceRecords::new(file, layout) {
            let record = record?;
            samples.extend(samples::decode_samples(
                record.samples,
                layout.samples_per_trace,
                layout.format,
                layout.byte_order,
            )?)?;
        }
        Self::from_samples(layout.trace_count, layout.samples_per_trace, samples)
    }

    /// Encode every row as `format`.
    ///
    /// The element type must match the format. If any IBM value is out of
    /// range, every offending trace is reported and nothing is returned.
    pub fn encode_traces(&self, format: SampleFormat, byte_order: ByteOrder) -> Result<Vec<Vec<u8>>> {
        if self.kind() != format.kind() {
            return Err(SegyError::TypeMismatch {
                expected: format.kind(),
                actual: self.kind(),
            });
        }
        let mut encoded = Vec::with_capacity(self.traces);
        let mut bad_traces = Vec::new();
        for i in 0..self.traces {
            let row = self.samples.slice(i * self.samples_per_trace, self.samples_per_trace);
            match samples::encode_samples(&row, format, byte_order) {
                Ok(bytes) => encoded.push(bytes),
                Err(SegyError::IbmRange { value }) => {
                    log::warn!("trace {i} holds {value}, outside the IBM float range");
                    bad_traces.push(i);
                }
                Err(e) => return Err(e),
            }
        }
        if !bad_traces.is_empty() {
            return Err(SegyError::IbmRangeTraces { traces: bad_traces });
        }
        Ok(encoded)
    }

    /// Read the data matrix of a file.
    pub fn load_from_file(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let (_, layout) = TraceLayout::from_file(path, options)?;
        let bytes = io::read_file(path)?;
        Self::decode_records(&bytes, &layout)
    }

    /// Overwrite the samples of an existing file in place.
    ///
    /// Shape and element type must match what the file's binary header
    /// declares; on any mismatch the file is left untouched.
    pub fn replace_in_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let (_, layout) = TraceLayout::from_file(path, &LoadOptions::default())?;
        let expected = (layout.trace_count, layout.samples_per_trace);
        if self.shape() != expected {
            return Err(SegyError::ShapeMismatch {
                expected,
                actual: self.shape(),
            });
        }
        let encoded = self.encode_traces(layout.format, layout.byte_order)?;
        let regions: Vec<(u64, &[u8])> = encoded
            .iter()
            .enumerate()
            .map(|(i, bytes)| (layout.samples_offset(i), bytes.as_slice()))
            .collect();
        io::patch_regions(path, &regions)
    }
}
