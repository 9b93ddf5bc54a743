//! Snapshot recording formats.
//!
//! Two open formats carry already-decoded match state, so the analyzer can
//! run without the proprietary demo parser.
//!
//! ## Binary (`.gwr`)
//!
//! ```text
//! "GWRC" | frame(header) | frame(event) | frame(event) | ...
//! frame = u32 little-endian payload length | bincode payload
//! ```
//!
//! The header frame is a [`RecordingHeader`]; every following frame is a
//! [`StreamEvent`]. A payload that fails to decode is skipped because its
//! length is known. A truncated frame or an absurd length ends the stream.
//!
//! ## JSON lines (`.gwj`)
//!
//! One JSON-encoded [`StreamEvent`] per line. Blank lines are ignored and a
//! line that fails to parse is skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::decoder::{BoxedDecoder, ReplayDecoder};
use crate::error::{DecodeError, GhostError, Result};
use crate::snapshot::StreamEvent;

/// Extension of binary recordings.
pub const BINARY_EXTENSION: &str = "gwr";
/// Extension of JSON-lines recordings.
pub const JSON_LINES_EXTENSION: &str = "gwj";
/// Leading bytes of a binary recording.
pub const RECORDING_MAGIC: &[u8; 4] = b"GWRC";
/// Binary recording format version.
pub const RECORDING_VERSION: u32 = 1;
/// Largest accepted frame payload.
pub const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

/// First frame of a binary recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingHeader {
    /// Format version.
    pub version: u32,
    /// Free-form label of what was recorded (match id, map, server).
    pub source: String,
}

/// Writes binary recordings.
#[derive(Debug)]
pub struct RecordingWriter<W: Write> {
    writer: W,
    frames: u64,
}

impl<W: Write> RecordingWriter<W> {
    /// Start a recording, writing the magic and header.
    pub fn new(mut writer: W, source: impl Into<String>) -> Result<Self> {
        writer.write_all(RECORDING_MAGIC).map_err(encode_err)?;
        let header = RecordingHeader {
            version: RECORDING_VERSION,
            source: source.into(),
        };
        let payload = bincode::serialize(&header).map_err(|e| GhostError::Encode(e.to_string()))?;
        let mut this = Self { writer, frames: 0 };
        this.write_frame(&payload)?;
        Ok(this)
    }

    /// Append one event.
    pub fn write_event(&mut self, event: &StreamEvent) -> Result<()> {
        let payload = bincode::serialize(event).map_err(|e| GhostError::Encode(e.to_string()))?;
        self.write_frame(&payload)
    }

    /// Append a raw frame payload.
    pub fn write_frame(&mut self, payload: &[u8]) -> Result<()> {
        let len = u32::try_from(payload.len())
            .ok()
            .filter(|len| *len <= MAX_FRAME_LEN)
            .ok_or_else(|| GhostError::Encode(format!("frame of {} bytes too large", payload.len())))?;
        self.writer.write_all(&len.to_le_bytes()).map_err(encode_err)?;
        self.writer.write_all(payload).map_err(encode_err)?;
        self.frames += 1;
        Ok(())
    }

    /// Frames written so far, header included.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Flush and return the inner writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush().map_err(encode_err)?;
        Ok(self.writer)
    }
}

fn encode_err(e: std::io::Error) -> GhostError {
    GhostError::Encode(e.to_string())
}

/// Read one length-delimited frame. `Ok(None)` on a clean end of stream.
fn read_frame<R: Read>(
    reader: &mut R,
    offset: &mut u64,
) -> std::result::Result<Option<(u64, Vec<u8>)>, DecodeError> {
    let start = *offset;
    let mut len_buf = [0u8; 4];
    let mut filled = 0;
    while filled < len_buf.len() {
        match reader.read(&mut len_buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(DecodeError::Truncated { offset: start }),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(DecodeError::Io(e)),
        }
    }

    let length = u32::from_le_bytes(len_buf);
    if length > MAX_FRAME_LEN {
        return Err(DecodeError::OversizedFrame {
            offset: start,
            length,
        });
    }

    let mut payload = vec![0u8; length as usize];
    reader.read_exact(&mut payload).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            DecodeError::Truncated { offset: start }
        } else {
            DecodeError::Io(e)
        }
    })?;
    *offset = start + 4 + u64::from(length);
    Ok(Some((start, payload)))
}

/// Decoder for binary recordings.
#[derive(Debug)]
pub struct BinaryDecoder<R: Read> {
    reader: R,
    offset: u64,
    header: RecordingHeader,
}

impl<R: Read> BinaryDecoder<R> {
    /// Read the magic and header. `label` names the source in errors.
    pub fn new(mut reader: R, label: &str) -> Result<Self> {
        let invalid = |message: String| GhostError::InvalidHeader {
            path: label.to_string(),
            message,
        };

        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|e| invalid(format!("missing magic: {e}")))?;
        if &magic != RECORDING_MAGIC {
            return Err(invalid(format!("bad magic {magic:02x?}")));
        }

        let mut offset = RECORDING_MAGIC.len() as u64;
        let (_, payload) = read_frame(&mut reader, &mut offset)
            .map_err(|e| invalid(e.to_string()))?
            .ok_or_else(|| invalid("missing header frame".to_string()))?;
        let header: RecordingHeader =
            bincode::deserialize(&payload).map_err(|e| invalid(e.to_string()))?;
        if header.version != RECORDING_VERSION {
            return Err(invalid(format!(
                "version mismatch: expected {RECORDING_VERSION}, got {}",
                header.version
            )));
        }

        Ok(Self {
            reader,
            offset,
            header,
        })
    }

    /// The recording header.
    #[must_use]
    pub fn header(&self) -> &RecordingHeader {
        &self.header
    }
}

impl<R: Read> ReplayDecoder for BinaryDecoder<R> {
    fn advance(&mut self) -> std::result::Result<Option<StreamEvent>, DecodeError> {
        let Some((start, payload)) = read_frame(&mut self.reader, &mut self.offset)? else {
            return Ok(None);
        };
        bincode::deserialize(&payload)
            .map(Some)
            .map_err(|e| DecodeError::CorruptFrame {
                offset: start,
                message: e.to_string(),
            })
    }
}

/// Decoder for JSON-lines recordings.
#[derive(Debug)]
pub struct JsonLinesDecoder<R: BufRead> {
    reader: R,
    line: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> JsonLinesDecoder<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> ReplayDecoder for JsonLinesDecoder<R> {
    fn advance(&mut self) -> std::result::Result<Option<StreamEvent>, DecodeError> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let line = self.line;

            // The bad bytes are already consumed, so the next line is still readable.
            let text = std::str::from_utf8(&self.buf)
                .map_err(|e| DecodeError::MalformedLine {
                    line,
                    message: e.to_string(),
                })?
                .trim();
            if text.is_empty() {
                continue;
            }
            return serde_json::from_str(text)
                .map(Some)
                .map_err(|e| DecodeError::MalformedLine {
                    line,
                    message: e.to_string(),
                });
        }
    }
}

fn open_file(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| GhostError::OpenFailed {
            path: path.display().to_string(),
            source,
        })
}

/// Open a binary recording.
pub fn open_binary(path: &Path) -> Result<BoxedDecoder> {
    let reader = open_file(path)?;
    Ok(Box::new(BinaryDecoder::new(reader, &path.display().to_string())?))
}

/// Open a JSON-lines recording.
pub fn open_json_lines(path: &Path) -> Result<BoxedDecoder> {
    Ok(Box::new(JsonLinesDecoder::new(open_file(path)?)))
}
