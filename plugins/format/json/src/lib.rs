use std::io::Write;

use tabula_core::{JsonEvent, TableError};

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("table: {0}")]
    Table(#[from] TableError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected {0} event")]
    UnexpectedEvent(&'static str),
}

// ═══════════════════════════════════════════════════════════════
//  JsonWriter
// ═══════════════════════════════════════════════════════════════

/// Byte serializer for the JSON-shaped document events.
///
/// Rows are written as they are pulled; nothing beyond the current row is
/// held in memory. `pretty` puts each row-object on its own line.
pub struct JsonWriter<W: Write> {
    out: W,
    pretty: bool,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, pretty: false }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Drain `source` into the output. Returns the number of rows written.
    ///
    /// A source error is returned after flushing what was already written;
    /// the document is then left unterminated.
    pub fn write_source<I>(&mut self, source: I) -> Result<u64, FormatError>
    where
        I: IntoIterator<Item = Result<JsonEvent, TableError>>,
    {
        let mut opened = false;
        let mut rows = 0u64;

        for event in source {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    self.out.flush()?;
                    tracing::debug!(rows, "json output interrupted");
                    return Err(e.into());
                }
            };
            match event {
                JsonEvent::StartArray if !opened => {
                    opened = true;
                    self.out.write_all(b"[")?;
                }
                JsonEvent::Row(row) if opened => {
                    if rows > 0 {
                        self.out.write_all(b",")?;
                    }
                    if self.pretty {
                        self.out.write_all(b"\n  ")?;
                    }
                    serde_json::to_writer(&mut self.out, &row)?;
                    rows += 1;
                }
                JsonEvent::EndArray if opened => {
                    if self.pretty && rows > 0 {
                        self.out.write_all(b"\n")?;
                    }
                    self.out.write_all(b"]")?;
                    if self.pretty {
                        self.out.write_all(b"\n")?;
                    }
                    opened = false;
                }
                JsonEvent::StartArray => return Err(FormatError::UnexpectedEvent("StartArray")),
                JsonEvent::Row(_) => return Err(FormatError::UnexpectedEvent("Row")),
                JsonEvent::EndArray => return Err(FormatError::UnexpectedEvent("EndArray")),
            }
        }

        self.out.flush()?;
        Ok(rows)
    }
}

/// Render a whole source into a string.
pub fn to_string<I>(source: I) -> Result<String, FormatError>
where
    I: IntoIterator<Item = Result<JsonEvent, TableError>>,
{
    let mut writer = JsonWriter::new(Vec::new());
    writer.write_source(source)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}
