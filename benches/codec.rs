use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use segy_rs::{
    BinaryFileHeader, ByteOrder, DataMatrix, LoadOptions, SampleFormat, SegyFile, TraceLayout,
    TraceRecords, decode_samples, ibm,
};

/// Seismic-like samples: a decaying wavelet with a slow drift.
fn seismic_samples(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 * 0.004;
            (t * 60.0).sin() * (-t * 3.0).exp() * 1000.0 + (t * 0.5).sin() * 10.0
        })
        .collect()
}

fn make_file(traces: usize, samples: usize, format: SampleFormat) -> SegyFile {
    let mut file = SegyFile::empty_with_format((traces, samples), 4000, format).unwrap();
    let row = seismic_samples(samples);
    for i in 0..traces {
        match format {
            SampleFormat::Ibm32 => file.data.set_trace(i, &row).unwrap(),
            _ => {
                let row: Vec<f32> = row.iter().map(|&v| v as f32).collect();
                file.data.set_trace(i, &row).unwrap()
            }
        }
    }
    file
}

fn bench_ibm(c: &mut Criterion) {
    let values = seismic_samples(1000);
    let (bytes, _) = ibm::encode_ibm(&values, ByteOrder::Big);

    let mut group = c.benchmark_group("ibm");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("encode/1000samp", |b| {
        b.iter(|| ibm::encode_ibm(black_box(&values), ByteOrder::Big))
    });
    group.bench_function("decode/1000samp", |b| {
        b.iter(|| ibm::decode_ibm(black_box(&bytes), 1000, ByteOrder::Big).unwrap())
    });

    group.finish();
}

fn bench_samples(c: &mut Criterion) {
    let values: Vec<f32> = seismic_samples(1000).iter().map(|&v| v as f32).collect();
    let data = DataMatrix::from_vec(1, 1000, values).unwrap();
    let be = data.encode_traces(SampleFormat::Float32, ByteOrder::Big).unwrap();
    let le = data.encode_traces(SampleFormat::Float32, ByteOrder::Little).unwrap();

    let mut group = c.benchmark_group("samples");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("float32/be/1000samp", |b| {
        b.iter(|| decode_samples(black_box(&be[0]), 1000, SampleFormat::Float32, ByteOrder::Big).unwrap())
    });
    group.bench_function("float32/le/1000samp", |b| {
        b.iter(|| {
            decode_samples(black_box(&le[0]), 1000, SampleFormat::Float32, ByteOrder::Little)
                .unwrap()
        })
    });

    group.finish();
}

fn bench_file(c: &mut Criterion) {
    let options = LoadOptions::default();
    let mut group = c.benchmark_group("file");
    group.throughput(Throughput::Elements(100 * 500));

    for format in [SampleFormat::Float32, SampleFormat::Ibm32] {
        let file = make_file(100, 500, format);
        let bytes = file.to_bytes(ByteOrder::Big).unwrap();
        let name = if format.is_ibm() { "ibm32" } else { "float32" };

        group.bench_function(format!("encode/{name}/100x500"), |b| {
            b.iter(|| black_box(&file).to_bytes(ByteOrder::Big).unwrap())
        });
        group.bench_function(format!("decode/{name}/100x500"), |b| {
            b.iter(|| SegyFile::from_bytes(black_box(&bytes), &options).unwrap())
        });
    }

    group.finish();
}

fn bench_reader(c: &mut Criterion) {
    let bytes = make_file(100, 500, SampleFormat::Float32)
        .to_bytes(ByteOrder::Little)
        .unwrap();
    let binary = BinaryFileHeader::from_bytes(&bytes[3200..3600], ByteOrder::Little, None).unwrap();
    let layout = TraceLayout::from_header(&binary, ByteOrder::Little, bytes.len() as u64).unwrap();

    c.bench_function("reader/100rec", |b| {
        b.iter(|| {
            let records: Vec<_> = TraceRecords::new(black_box(&bytes), &layout)
                .collect::<Result<Vec<_>, _>>()
                .unwrap();
            assert_eq!(records.len(), 100);
        })
    });
}

criterion_group!(benches, bench_ibm, bench_samples, bench_file, bench_reader);
criterion_main!(benches);
