//! Pure Rust SEG-Y reader and writer.
//!
//! Zero `unsafe`, zero C dependencies. Reads and writes the EBCDIC textual
//! header, the binary file header, per-trace headers with coordinate
//! scaling, and trace samples in every standard format including IBM
//! System/360 floats. Byte order is detected from the sample format field.
//!
//! # Building and reading a file
//!
//! ```
//! use segy_rs::{ByteOrder, LoadOptions, SegyFile};
//!
//! let mut file = SegyFile::empty((10, 20), 500).unwrap();
//! file.data.set_trace(9, &[9.0f32; 20]).unwrap();
//!
//! let bytes = file.to_bytes(ByteOrder::Big).unwrap();
//! let loaded = SegyFile::from_bytes(&bytes, &LoadOptions::default()).unwrap();
//!
//! assert_eq!(loaded.binary.sample_interval(), 500);
//! assert_eq!(loaded.data.shape(), (10, 20));
//! assert_eq!(loaded.data.trace::<f32>(9).unwrap()[0], 9.0);
//! ```
//!
//! # Scaled coordinates
//!
//! Coordinates are held in real units; the COORDSC scalar is applied when
//! a file is loaded and when it is encoded.
//!
//! ```
//! use segy_rs::TraceHeader;
//!
//! let mut header = TraceHeader::new();
//! header.set_raw("COORDSC", -1000).unwrap();
//! header.set_raw("SOU_X", 57000).unwrap();
//! assert_eq!(header.get("SOU_X").unwrap(), 57.0);
//! ```
//!
//! # IBM floats
//!
//! ```
//! use segy_rs::{ByteOrder, ibm};
//!
//! let word = ibm::f64_to_ibm(-118.625).unwrap();
//! assert_eq!(word, 0xC276_A000);
//! assert_eq!(ibm::ibm_to_f64(word), -118.625);
//!
//! let (bytes, out_of_range) = ibm::encode_ibm(&[1.0, 1e80], ByteOrder::Big);
//! assert_eq!(bytes.len(), 8);
//! assert_eq!(out_of_range, vec![1]);
//! ```
//!
//! # Walking trace records
//!
//! ```
//! use segy_rs::{BinaryFileHeader, ByteOrder, SegyFile, TraceLayout, TraceRecords};
//!
//! let bytes = SegyFile::empty((3, 4), 1000).unwrap().to_bytes(ByteOrder::Big).unwrap();
//! let binary = BinaryFileHeader::from_bytes(&bytes[3200..3600], ByteOrder::Big, None).unwrap();
//! let layout = TraceLayout::from_header(&binary, ByteOrder::Big, bytes.len() as u64).unwrap();
//!
//! let records: Vec<_> = TraceRecords::new(&bytes, &layout)
//!     .collect::<Result<Vec<_>, _>>()
//!     .unwrap();
//! assert_eq!(records.len(), 3);
//! assert_eq!(records[0].samples.len(), 16);
//! ```

pub mod binary;
pub mod data;
pub mod ebcdic;
pub mod error;
pub mod ibm;
pub mod io;
pub mod probe;
pub mod reader;
pub mod samples;
pub mod schema;
pub mod segy;
pub mod textual;
pub mod time;
pub mod trace_header;
pub mod types;

pub use binary::BinaryFileHeader;
pub use data::DataMatrix;
pub use error::{Result, SegyError};
pub use probe::{FileSummary, patch_sample_format, patch_sample_interval};
pub use reader::{TraceLayout, TraceRecord, TraceRecords};
pub use samples::{Sample, Samples, decode_samples, encode_samples};
pub use schema::{BINARY_HEADER_FIELDS, FieldKind, FieldSpec, TRACE_HEADER_FIELDS};
pub use segy::{LoadOptions, Origin, SegyFile, Trace};
pub use textual::TextualHeader;
pub use time::AcquisitionTime;
pub use trace_header::{TraceHeader, TraceHeaderTable};
pub use types::{ByteOrder, SampleFormat, SampleKind};
