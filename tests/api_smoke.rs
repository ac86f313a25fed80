//! Compile-time smoke test: verify top-level re-exports work.

use std::path::Path;

use segy_rs::{
    AcquisitionTime, BINARY_HEADER_FIELDS, BinaryFileHeader, ByteOrder, DataMatrix, FieldKind,
    FileSummary, LoadOptions, Origin, Result, Sample, SampleFormat, SampleKind, Samples,
    SegyError, SegyFile, TRACE_HEADER_FIELDS, TextualHeader, TraceHeader, TraceHeaderTable,
    TraceLayout, decode_samples, encode_samples, patch_sample_format, patch_sample_interval,
};

#[test]
fn top_level_imports_compile() {
    // Just verify the types are usable from the crate root
    let _: fn(&[u8], usize, SampleFormat, ByteOrder) -> Result<Samples> = decode_samples;
    let _: fn(&Samples, SampleFormat, ByteOrder) -> Result<Vec<u8>> = encode_samples;
    let _ = |p: &Path| -> Result<()> { patch_sample_interval(p, 1000) };
    let _ = |p: &Path| -> Result<()> { patch_sample_format(p, SampleFormat::Float32) };
    let _ = |p: &Path| -> Result<FileSummary> { FileSummary::probe(p) };

    let _bo = ByteOrder::Little;
    let _s = Samples::Float32(vec![]);
    let _t = AcquisitionTime::new(2025, 1, 0, 0, 0);
    let _opts = LoadOptions::new().with_byte_order(ByteOrder::Big);

    assert_eq!(BINARY_HEADER_FIELDS[0].kind, FieldKind::I32);
    assert_eq!(TRACE_HEADER_FIELDS[0].name, "TRACENO");
    assert_eq!(<f32 as Sample>::KIND, SampleKind::Float32);
    assert_eq!(SampleFormat::Ibm32.code(), 1);

    let _th = TraceHeader::new();
    let _tt = TraceHeaderTable::new(0);
    let _tx = TextualHeader::new();
    let _bh = BinaryFileHeader::new();
    let _dm = DataMatrix::zeros(SampleKind::Int16, (0, 0));
    let _layout: Option<TraceLayout> = None;

    let file = SegyFile::empty((1, 1), 1000).unwrap();
    assert_eq!(file.origin(), &Origin::Synthesized);

    // SegyError is accessible
    let _e: Option<SegyError> = None;
}
