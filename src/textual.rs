//! The 3200-byte textual file header: 40 lines of 80 cp500 characters.

use std::fmt;
use std::path::Path;

use crate::binary::BinaryFileHeader;
use crate::segy::LoadOptions;
use crate::{Result, SegyError, ebcdic, io};

pub const TEXTUAL_HEADER_SIZE: usize = 3200;
pub const LINE_COUNT: usize = 40;
pub const LINE_WIDTH: usize = 80;

/// Textual file header.
///
/// Every line is exactly 80 characters, every character is representable
/// in cp500. The flat text and the line view are rebuilt together on every
/// mutation. A decoded header keeps its source bytes until it is edited, so
/// bytes with no text form (NUL) are written back unchanged.
#[derive(Debug, Clone)]
pub struct TextualHeader {
    text: String,
    lines: Vec<String>,
    raw: Option<Vec<u8>>,
}

impl PartialEq for TextualHeader {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for TextualHeader {}

impl Default for TextualHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl TextualHeader {
    /// A header of 40 blank lines.
    pub fn new() -> Self {
        Self::from_lines(vec![" ".repeat(LINE_WIDTH); LINE_COUNT])
    }

    fn from_lines(lines: Vec<String>) -> Self {
        debug_assert_eq!(lines.len(), LINE_COUNT);
        TextualHeader {
            text: lines.concat(),
            lines,
            raw: None,
        }
    }

    /// Decode exactly 3200 cp500 bytes. NUL bytes are shown as spaces.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != TEXTUAL_HEADER_SIZE {
            return Err(SegyError::block("textual header", TEXTUAL_HEADER_SIZE, bytes.len()));
        }
        let lines = bytes
            .chunks_exact(LINE_WIDTH)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|&b| match ebcdic::decode_byte(b) {
                        '\0' => ' ',
                        ch => ch,
                    })
                    .collect()
            })
            .collect();
        Ok(TextualHeader {
            raw: Some(bytes.to_vec()),
            ..Self::from_lines(lines)
        })
    }

    /// Encode back to 3200 cp500 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        if let Some(raw) = &self.raw {
            return raw.clone();
        }
        self.text
            .chars()
            .map(|ch| ebcdic::encode_char(ch).unwrap_or(ebcdic::SPACE))
            .collect()
    }

    /// The 3200-character flat text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Line `number`, counted from 1.
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map(String::as_str)
    }

    /// Replace the whole content with multi-line text.
    ///
    /// Lines past the 40th are dropped, each line is cropped or space-padded
    /// to 80 characters, and missing lines are blank. Nothing changes if any
    /// kept character is outside cp500.
    pub fn set_content(&mut self, content: &str) -> Result<()> {
        let mut lines = content
            .lines()
            .take(LINE_COUNT)
            .map(fit_line)
            .collect::<Result<Vec<_>>>()?;
        lines.resize(LINE_COUNT, " ".repeat(LINE_WIDTH));
        *self = Self::from_lines(lines);
        Ok(())
    }

    /// Replace line `number` (1..=40), cropped or padded to 80 characters.
    pub fn set_line(&mut self, number: usize, content: &str) -> Result<()> {
        if !(1..=LINE_COUNT).contains(&number) {
            return Err(SegyError::InvalidLine(number));
        }
        let line = fit_line(content)?;
        let mut lines = std::mem::take(&mut self.lines);
        lines[number - 1] = line;
        *self = Self::from_lines(lines);
        Ok(())
    }

    /// Read the first 3200 bytes of a SEG-Y file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = io::read_prefix(path.as_ref(), TEXTUAL_HEADER_SIZE)?;
        Self::from_bytes(&bytes)
    }

    /// Overwrite the textual header of an existing SEG-Y file in place.
    ///
    /// The target must have a decodable binary header.
    pub fn replace_in_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        BinaryFileHeader::load_from_file(path, &LoadOptions::default())?;
        let bytes = self.to_bytes();
        io::patch_regions(path, &[(0, bytes.as_slice())])
    }

    /// Write the 40 lines to a plain text file, one per line.
    pub fn export_text(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut out = String::with_capacity(LINE_COUNT * (LINE_WIDTH + 1));
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        io::write_file_atomic(path.as_ref(), out.as_bytes())
    }

    /// Build a header from a plain text file via [`set_content`](Self::set_content).
    pub fn import_text(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SegyError::io(path, e))?;
        let mut header = Self::new();
        header.set_content(&content)?;
        Ok(header)
    }
}

fn fit_line(line: &str) -> Result<String> {
    let mut fitted = String::with_capacity(LINE_WIDTH);
    let mut width = 0;
    for ch in line.chars().take(LINE_WIDTH) {
        if ebcdic::encode_char(ch).is_none() {
            return Err(SegyError::Encoding {
                ch,
                context: "textual header",
            });
        }
        fitted.push(ch);
        width += 1;
    }
    fitted.extend(std::iter::repeat_n(' ', LINE_WIDTH - width));
    Ok(fitted)
}

impl fmt::Display for TextualHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}
