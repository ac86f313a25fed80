//! 240-byte trace headers and the per-file table of them.
//!
//! Header values are held in real units: the six coordinate fields are
//! divided or multiplied by the coordinate scalar (COORDSC) when a header is
//! decoded, and the inverse is applied to a copy when it is encoded. The
//! in-memory row is never rewritten by encoding.

use std::path::Path;

use crate::ebcdic;
use crate::reader::TraceLayout;
use crate::schema::{
    self, TRACE_HEADER_FIELDS, TRACE_HEADER_SIZE, TRACE_NAME_LEN, TRACE_NAME_OFFSET, th,
};
use crate::segy::LoadOptions;
use crate::time::AcquisitionTime;
use crate::types::ByteOrder;
use crate::{Result, SegyError, io};

/// Apply a coordinate scalar to a stored coordinate.
///
/// A negative scalar divides, a positive one multiplies, zero is treated
/// as one.
pub fn unpack_coordinate(raw: i32, scalar: i16) -> f64 {
    let raw = raw as f64;
    match scalar {
        s if s < 0 => raw / (s as f64).abs(),
        s if s > 0 => raw * s as f64,
        _ => raw,
    }
}

/// Inverse of [`unpack_coordinate`], rounding half away from zero.
///
/// Returns `None` if the scaled value does not fit the 4-byte field.
pub fn pack_coordinate(value: f64, scalar: i16) -> Option<i32> {
    let scaled = match scalar {
        s if s < 0 => value * (s as f64).abs(),
        s if s > 0 => value / s as f64,
        _ => value,
    }
    .round();
    if scaled.is_finite() && scaled >= i32::MIN as f64 && scaled <= i32::MAX as f64 {
        Some(scaled as i32)
    } else {
        None
    }
}

fn is_coordinate(index: usize) -> bool {
    th::COORDINATES.contains(&index)
}

/// One trace header row.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceHeader {
    values: Vec<f64>,
    name: [u8; TRACE_NAME_LEN],
}

impl Default for TraceHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceHeader {
    /// All fields zero except COORDSC, which is 1. The name is blank.
    pub fn new() -> Self {
        let mut values = vec![0.0; TRACE_HEADER_FIELDS.len()];
        values[th::COORDSC] = 1.0;
        TraceHeader {
            values,
            name: [ebcdic::SPACE; TRACE_NAME_LEN],
        }
    }

    /// Decode exactly 240 bytes and apply the coordinate scalar.
    ///
    /// A stored COORDSC of 0 becomes 1.
    pub fn from_bytes(bytes: &[u8], byte_order: ByteOrder) -> Result<Self> {
        if bytes.len() != TRACE_HEADER_SIZE {
            return Err(SegyError::block("trace header", TRACE_HEADER_SIZE, bytes.len()));
        }
        let raw: Vec<i64> = TRACE_HEADER_FIELDS
            .iter()
            .map(|spec| schema::read_field(bytes, spec, byte_order))
            .collect();

        let scalar = match raw[th::COORDSC] {
            0 => 1,
            s => s as i16,
        };
        let values = raw
            .iter()
            .enumerate()
            .map(|(i, &v)| match i {
                i if i == th::COORDSC => scalar as f64,
                i if is_coordinate(i) => unpack_coordinate(v as i32, scalar),
                _ => v as f64,
            })
            .collect();

        let mut name = [0u8; TRACE_NAME_LEN];
        name.copy_from_slice(&bytes[TRACE_NAME_OFFSET..TRACE_HEADER_SIZE]);
        Ok(TraceHeader { values, name })
    }

    /// Encode to 240 bytes, packing the coordinates with the row's COORDSC.
    pub fn to_bytes(&self, byte_order: ByteOrder) -> Result<Vec<u8>> {
        let mut block = vec![0u8; TRACE_HEADER_SIZE];
        let scalar = self.coordinate_scalar();
        for (i, spec) in TRACE_HEADER_FIELDS.iter().enumerate() {
            let value = if is_coordinate(i) {
                pack_coordinate(self.values[i], scalar)
                    .map(i64::from)
                    .ok_or(SegyError::FieldOverflow {
                        field: spec.name,
                        value: self.values[i] as i64,
                    })?
            } else {
                self.values[i].round() as i64
            };
            schema::write_field(&mut block, spec, value, byte_order)?;
        }
        block[TRACE_NAME_OFFSET..].copy_from_slice(&self.name);
        Ok(block)
    }

    /// Field value by name, coordinates in real units.
    pub fn get(&self, name: &str) -> Result<f64> {
        let index = schema::field_index(&TRACE_HEADER_FIELDS, name)?;
        Ok(self.values[index])
    }

    /// Set a field by name, coordinates in real units.
    ///
    /// Non-coordinate values are rounded to the nearest integer and must
    /// fit the field.
    pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        let index = schema::field_index(&TRACE_HEADER_FIELDS, name)?;
        self.set_index(index, value)
    }

    pub(crate) fn value(&self, index: usize) -> f64 {
        self.values[index]
    }

    pub(crate) fn set_index(&mut self, index: usize, value: f64) -> Result<()> {
        let spec = &TRACE_HEADER_FIELDS[index];
        if value.is_nan() {
            return Err(SegyError::FieldOverflow {
                field: spec.name,
                value: 0,
            });
        }
        if !is_coordinate(index) {
            schema::check_value(spec, value.round() as i64)?;
        }
        self.values[index] = if is_coordinate(index) {
            value
        } else {
            value.round()
        };
        Ok(())
    }

    /// The integer a field holds on disk: coordinates are packed with the
    /// current COORDSC.
    pub fn get_raw(&self, name: &str) -> Result<i64> {
        let index = schema::field_index(&TRACE_HEADER_FIELDS, name)?;
        if is_coordinate(index) {
            pack_coordinate(self.values[index], self.coordinate_scalar())
                .map(i64::from)
                .ok_or(SegyError::FieldOverflow {
                    field: TRACE_HEADER_FIELDS[index].name,
                    value: self.values[index] as i64,
                })
        } else {
            Ok(self.values[index] as i64)
        }
    }

    /// Set the integer a field holds on disk. A coordinate given this way
    /// is unpacked with the current COORDSC.
    pub fn set_raw(&mut self, name: &str, raw: i64) -> Result<()> {
        let index = schema::field_index(&TRACE_HEADER_FIELDS, name)?;
        let spec = &TRACE_HEADER_FIELDS[index];
        schema::check_value(spec, raw)?;
        self.values[index] = if is_coordinate(index) {
            unpack_coordinate(raw as i32, self.coordinate_scalar())
        } else {
            raw as f64
        };
        Ok(())
    }

    /// All fields in layout order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        TRACE_HEADER_FIELDS
            .iter()
            .zip(&self.values)
            .map(|(spec, &value)| (spec.name, value))
    }

    pub fn coordinate_scalar(&self) -> i16 {
        self.values[th::COORDSC] as i16
    }

    /// ELEVSC is carried but not applied to elevation fields.
    pub fn elevation_scalar(&self) -> i16 {
        self.values[th::ELEVSC] as i16
    }

    /// The 8-byte trace header name, trailing blanks removed.
    pub fn name(&self) -> String {
        ebcdic::decode(&self.name)
            .trim_end_matches([' ', '\0'])
            .to_string()
    }

    pub fn name_bytes(&self) -> &[u8; TRACE_NAME_LEN] {
        &self.name
    }

    /// Set the name, cropped or space-padded to 8 characters.
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        let cropped: String = name.chars().take(TRACE_NAME_LEN).collect();
        let encoded = ebcdic::encode(&cropped, "trace header name")?;
        let mut bytes = [ebcdic::SPACE; TRACE_NAME_LEN];
        bytes[..encoded.len()].copy_from_slice(&encoded);
        self.name = bytes;
        Ok(())
    }

    pub fn acquisition_time(&self) -> AcquisitionTime {
        AcquisitionTime::new(
            self.values[th::YEAR] as i16,
            self.values[th::DAY] as i16,
            self.values[th::HOUR] as i16,
            self.values[th::MINUTE] as i16,
            self.values[th::SECOND] as i16,
        )
    }

    pub fn set_acquisition_time(&mut self, time: AcquisitionTime) {
        self.values[th::YEAR] = time.year as f64;
        self.values[th::DAY] = time.day as f64;
        self.values[th::HOUR] = time.hour as f64;
        self.values[th::MINUTE] = time.minute as f64;
        self.values[th::SECOND] = time.second as f64;
    }
}

/// One [`TraceHeader`] per trace, indexed from 0.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TraceHeaderTable {
    rows: Vec<TraceHeader>,
}

impl TraceHeaderTable {
    /// `traces` default rows.
    pub fn new(traces: usize) -> Self {
        TraceHeaderTable {
            rows: vec![TraceHeader::new(); traces],
        }
    }

    pub fn from_rows(rows: Vec<TraceHeader>) -> Self {
        TraceHeaderTable { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&TraceHeader> {
        self.rows.get(index)
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut TraceHeader> {
        self.rows.get_mut(index)
    }

    pub fn rows(&self) -> &[TraceHeader] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceHeader> {
        self.rows.iter()
    }

    pub fn push(&mut self, row: TraceHeader) {
        self.rows.push(row);
    }

    /// One field across all rows.
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let index = schema::field_index(&TRACE_HEADER_FIELDS, name)?;
        Ok(self.rows.iter().map(|row| row.value(index)).collect())
    }

    /// Set one field across all rows. Nothing changes on error.
    pub fn set_column(&mut self, name: &str, values: &[f64]) -> Result<()> {
        let index = schema::field_index(&TRACE_HEADER_FIELDS, name)?;
        if values.len() != self.rows.len() {
            return Err(SegyError::ShapeMismatch {
                expected: (self.rows.len(), 1),
                actual: (values.len(), 1),
            });
        }
        let mut rows = self.rows.clone();
        for (row, &value) in rows.iter_mut().zip(values) {
            row.set_index(index, value)?;
        }
        self.rows = rows;
        Ok(())
    }

    /// Set one field to the same value in every row.
    pub fn fill(&mut self, name: &str, value: f64) -> Result<()> {
        let values = vec![value; self.rows.len()];
        self.set_column(name, &values)
    }

    /// Indices of rows where every `(field, value)` condition holds exactly.
    pub fn matching(&self, conditions: &[(&str, f64)]) -> Result<Vec<usize>> {
        let resolved = conditions
            .iter()
            .map(|&(name, value)| {
                schema::field_index(&TRACE_HEADER_FIELDS, name).map(|index| (index, value))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| resolved.iter().all(|&(i, v)| row.value(i) == v))
            .map(|(i, _)| i)
            .collect())
    }

    /// A new table of the given rows, in the given order.
    pub fn select(&self, indices: &[usize]) -> Self {
        TraceHeaderTable {
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// Read every trace header of a file, skipping over the samples.
    pub fn load_from_file(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let (_, layout) = TraceLayout::from_file(path, options)?;
        let bytes = io::read_file(path)?;
        let rows = crate::reader::TraceRecords::new(&bytes, &layout)
            .map(|record| TraceHeader::from_bytes(record?.header, layout.byte_order))
            .collect::<Result<Vec<_>>>()?;
        Ok(TraceHeaderTable { rows })
    }

    /// Overwrite every trace header of an existing file in place.
    ///
    /// The table must have exactly as many rows as the file has traces.
    /// All rows are encoded before the file is touched.
    pub fn replace_in_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let (_, layout) = TraceLayout::from_file(path, &LoadOptions::default())?;
        if layout.trace_count != self.rows.len() {
            return Err(SegyError::ShapeMismatch {
                expected: (layout.trace_count, layout.samples_per_trace),
                actual: (self.rows.len(), layout.samples_per_trace),
            });
        }
        let encoded = self
            .rows
            .iter()
            .map(|row| row.to_bytes(layout.byte_order))
            .collect::<Result<Vec<_>>>()?;
        let regions: Vec<(u64, &[u8])> = encoded
            .iter()
            .enumerate()
            .map(|(i, bytes)| (layout.record_offset(i), bytes.as_slice()))
            .collect();
        io::patch_regions(path, &regions)
    }
}

impl<'a> IntoIterator for &'a TraceHeaderTable {
    type Item = &'a TraceHeader;
    type IntoIter = std::slice::Iter<'a, TraceHeader>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_scalar_roundtrip() {
        for scalar in [-1000i16, -1, 1, 1000] {
            for raw in [0, 1, -1, 57_000, -123_456, 2_000_000, i32::MAX / 1000] {
                let real = unpack_coordinate(raw, scalar);
                assert_eq!(pack_coordinate(real, scalar), Some(raw), "{raw} @ {scalar}");
            }
        }
        assert_eq!(unpack_coordinate(57_000, -1000), 57.0);
        assert_eq!(unpack_coordinate(57, 1000), 57_000.0);
        assert_eq!(unpack_coordinate(57, 0), 57.0);
    }

    #[test]
    fn test_pack_rounds_half_away_from_zero() {
        assert_eq!(pack_coordinate(2.5, 1), Some(3));
        assert_eq!(pack_coordinate(-2.5, 1), Some(-3));
        assert_eq!(pack_coordinate(1500.0, 1000), Some(2));
        assert_eq!(pack_coordinate(1499.0, 1000), Some(1));
        assert_eq!(pack_coordinate(0.0015, -1000), Some(2));
        assert_eq!(pack_coordinate(1e10, 1), None);
        assert_eq!(pack_coordinate(f64::NAN, 1), None);
    }

    #[test]
    fn test_wrong_size_rejected() {
        let err = TraceHeader::from_bytes(&[0; 232], ByteOrder::Big).unwrap_err();
        assert!(matches!(err, SegyError::BlockSize { expected: 240, actual: 232, .. }));
    }

    #[test]
    fn test_decode_applies_scalar() {
        let mut bytes = vec![0u8; TRACE_HEADER_SIZE];
        bytes[70..72].copy_from_slice(&(-100i16).to_be_bytes());
        bytes[72..76].copy_from_slice(&12_345i32.to_be_bytes());
        bytes[184..188].copy_from_slice(&(-50i32).to_be_bytes());
        bytes[36..40].copy_from_slice(&250i32.to_be_bytes());
        let header = TraceHeader::from_bytes(&bytes, ByteOrder::Big).unwrap();
        assert_eq!(header.get("SOU_X").unwrap(), 123.45);
        assert_eq!(header.get("CDP_Y").unwrap(), -0.5);
        assert_eq!(header.get("OFFSET").unwrap(), 250.0);
        assert_eq!(header.to_bytes(ByteOrder::Big).unwrap(), bytes);
    }

    #[test]
    fn test_zero_scalar_normalized() {
        let mut bytes = vec![0u8; TRACE_HEADER_SIZE];
        bytes[80..84].copy_from_slice(&77i32.to_le_bytes());
        let header = TraceHeader::from_bytes(&bytes, ByteOrder::Little).unwrap();
        assert_eq!(header.coordinate_scalar(), 1);
        assert_eq!(header.get("REC_X").unwrap(), 77.0);
        let out = header.to_bytes(ByteOrder::Little).unwrap();
        assert_eq!(&out[70..72], &1i16.to_le_bytes());
        assert_eq!(&out[80..84], &77i32.to_le_bytes());
    }

    #[test]
    fn test_encode_does_not_touch_row() {
        let mut header = TraceHeader::new();
        header.set("COORDSC", -1000.0).unwrap();
        header.set("SOU_X", 50.0).unwrap();
        let bytes = header.to_bytes(ByteOrder::Big).unwrap();
        assert_eq!(&bytes[72..76], &50_000i32.to_be_bytes());
        assert_eq!(header.get("SOU_X").unwrap(), 50.0);
        assert_eq!(header.get_raw("SOU_X").unwrap(), 50_000);
    }

    #[test]
    fn test_raw_coordinate_access() {
        let mut header = TraceHeader::new();
        header.set("COORDSC", -1000.0).unwrap();
        header.set_raw("SOU_X", 57_000).unwrap();
        assert_eq!(header.get("SOU_X").unwrap(), 57.0);
        let bytes = header.to_bytes(ByteOrder::Big).unwrap();
        assert_eq!(&bytes[72..76], &57_000i32.to_be_bytes());
    }

    #[test]
    fn test_set_validates() {
        let mut header = TraceHeader::new();
        assert!(matches!(header.set("NOPE", 1.0), Err(SegyError::UnknownField(_))));
        assert!(matches!(
            header.set("COORDSC", 40_000.0),
            Err(SegyError::FieldOverflow { field: "COORDSC", .. })
        ));
        assert!(header.set("FFID", f64::NAN).is_err());
        header.set("FFID", 1983.6).unwrap();
        assert_eq!(header.get("FFID").unwrap(), 1984.0);
    }

    #[test]
    fn test_unpackable_coordinate_fails_encode() {
        let mut header = TraceHeader::new();
        header.set("COORDSC", -1000.0).unwrap();
        header.set("CDP_X", 1e7).unwrap();
        assert!(matches!(
            header.to_bytes(ByteOrder::Big),
            Err(SegyError::FieldOverflow { field: "CDP_X", .. })
        ));
    }

    #[test]
    fn test_name() {
        let mut header = TraceHeader::new();
        assert_eq!(header.name(), "");
        header.set_name("SHOT 12 LONG").unwrap();
        assert_eq!(header.name(), "SHOT 12");
        header.set_name("AB").unwrap();
        assert_eq!(header.name(), "AB");
        let bytes = header.to_bytes(ByteOrder::Big).unwrap();
        assert_eq!(&bytes[232..], &[0xC1, 0xC2, 0x40, 0x40, 0x40, 0x40, 0x40, 0x40]);
        assert!(matches!(header.set_name("€"), Err(SegyError::Encoding { .. })));
    }

    #[test]
    fn test_acquisition_time() {
        let mut header = TraceHeader::new();
        header.set_acquisition_time(AcquisitionTime::new(2020, 42, 21, 31, 38));
        let bytes = header.to_bytes(ByteOrder::Big).unwrap();
        assert_eq!(&bytes[156..158], &2020i16.to_be_bytes());
        let back = TraceHeader::from_bytes(&bytes, ByteOrder::Big).unwrap();
        assert_eq!(back.acquisition_time().to_string(), "2020-042 21:31:38");
    }

    #[test]
    fn test_table_columns_and_matching() {
        let mut table = TraceHeaderTable::new(4);
        table.set_column("FFID", &[1.0, 1.0, 2.0, 2.0]).unwrap();
        table.set_column("CHAN", &[1.0, 2.0, 1.0, 2.0]).unwrap();
        assert_eq!(table.column("FFID").unwrap(), vec![1.0, 1.0, 2.0, 2.0]);
        assert_eq!(table.matching(&[("FFID", 2.0)]).unwrap(), vec![2, 3]);
        assert_eq!(table.matching(&[("FFID", 2.0), ("CHAN", 1.0)]).unwrap(), vec![2]);
        assert!(table.matching(&[("FFID", 9.0)]).unwrap().is_empty());
        assert!(table.matching(&[("BAD", 1.0)]).is_err());

        let sub = table.select(&[3, 0]);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.column("CHAN").unwrap(), vec![2.0, 1.0]);
    }

    #[test]
    fn test_set_column_is_all_or_nothing() {
        let mut table = TraceHeaderTable::new(2);
        assert!(matches!(
            table.set_column("FFID", &[1.0]),
            Err(SegyError::ShapeMismatch { .. })
        ));
        assert!(table.set_column("TRACE_ID", &[1.0, 1e9]).is_err());
        assert_eq!(table.column("TRACE_ID").unwrap(), vec![0.0, 0.0]);
        table.fill("DT", 500.0).unwrap();
        assert_eq!(table.column("DT").unwrap(), vec![500.0, 500.0]);
    }
}
