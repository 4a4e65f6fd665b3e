use std::io::{self, Write};
use std::path::Path;

use log::{debug, info};
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};

use crate::client::TranscriptionClient;
use crate::config::ConverterConfig;
use crate::dto::{OutputRecord, TranscriptionVerbose};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertState {
    Idle,
    AwaitingResponse,
    Done,
    Failed,
}

/// Reads the input audio, transcribes it and writes the segment records.
///
/// The output file is only opened once the full JSON document has been built,
/// so any failure before that leaves an existing output file untouched.
/// Returns the number of records written.
pub async fn convert<C: TranscriptionClient>(client: &C, config: &ConverterConfig) -> Result<usize> {
    let mut state = ConvertState::Idle;
    let result = run(client, config, &mut state).await;
    if result.is_err() {
        transition(&mut state, ConvertState::Failed);
    }
    result
}

async fn run<C: TranscriptionClient>(
    client: &C,
    config: &ConverterConfig,
    state: &mut ConvertState,
) -> Result<usize> {
    let audio = tokio::fs::read(&config.input_path)
        .await
        .map_err(|e| Error::io(&config.input_path, e))?;
    info!(
        "Loaded audio file: {} ({} bytes)",
        config.input_path.display(),
        audio.len()
    );

    transition(state, ConvertState::AwaitingResponse);
    let response = client
        .transcribe(&upload_name(&config.input_path), audio, &config.transcription)
        .await?;
    info!(
        "Transcription received: {:.2}s of audio, language={}",
        response.duration.unwrap_or_default(),
        response.language.as_deref().unwrap_or("unknown")
    );

    let records = project(response)?;
    let json = to_pretty_json(&records)?;
    tokio::fs::write(&config.output_path, json)
        .await
        .map_err(|e| Error::io(&config.output_path, e))?;
    transition(state, ConvertState::Done);

    info!(
        "Wrote {} segments to {}",
        records.len(),
        config.output_path.display()
    );
    Ok(records.len())
}

fn transition(state: &mut ConvertState, next: ConvertState) {
    debug!("Converter state {:?} -> {:?}", state, next);
    *state = next;
}

fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string())
}

/// Keeps `start`, `end` and `text` of every segment, in response order.
pub fn project(response: TranscriptionVerbose) -> Result<Vec<OutputRecord>> {
    let segments = response
        .segments
        .ok_or_else(|| Error::DataShape("response has no `segments` field".to_string()))?;
    Ok(segments.into_iter().map(OutputRecord::from).collect())
}

/// JSON with 4-space indentation and no trailing newline.
///
/// Characters outside printable ASCII are written as `\uXXXX` escapes
/// (surrogate pairs above U+FFFF), so the file is plain ASCII.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, AsciiPrettyFormatter::new());
    value
        .serialize(&mut ser)
        .map_err(|e| Error::DataShape(format!("failed to serialize output: {e}")))?;
    Ok(buf)
}

struct AsciiPrettyFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl AsciiPrettyFormatter<'_> {
    fn new() -> Self {
        Self {
            inner: PrettyFormatter::with_indent(b"    "),
        }
    }
}

impl Formatter for AsciiPrettyFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }

    // Quotes, backslashes and control characters never reach this; serde_json
    // escapes them itself.
    fn write_string_fragment<W: ?Sized + io::Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}
