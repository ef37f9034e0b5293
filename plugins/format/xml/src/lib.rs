use std::io::Write;

use tabula_core::{TableError, XmlContent, XmlElement, XmlEvent};

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("table: {0}")]
    Table(#[from] TableError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid element name '{0}'")]
    InvalidName(String),

    #[error("character U+{code:04X} is not allowed in XML text of element '{element}'")]
    InvalidChar { element: String, code: u32 },

    #[error("unexpected {0} event")]
    UnexpectedEvent(&'static str),
}

// ═══════════════════════════════════════════════════════════════
//  Options
// ═══════════════════════════════════════════════════════════════

/// Output options, deserializable from the `[xml]` config section.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct XmlWriterOptions {
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` first.
    pub declaration: bool,
    /// Spaces per nesting level. `None` writes everything on one line.
    pub indent: Option<usize>,
}

// ═══════════════════════════════════════════════════════════════
//  XmlWriter
// ═══════════════════════════════════════════════════════════════

/// Byte serializer for the XML-shaped document events.
///
/// Each row element is written as soon as it is pulled. Text is escaped;
/// element names are checked and rejected rather than mangled.
pub struct XmlWriter<W: Write> {
    out: W,
    options: XmlWriterOptions,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(out: W, options: XmlWriterOptions) -> Self {
        Self { out, options }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Drain `source` into the output. Returns the number of rows written.
    pub fn write_source<I>(&mut self, source: I) -> Result<u64, FormatError>
    where
        I: IntoIterator<Item = Result<XmlEvent, TableError>>,
    {
        let mut root: Option<String> = None;
        let mut rows = 0u64;

        for event in source {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    self.out.flush()?;
                    tracing::debug!(rows, "xml output interrupted");
                    return Err(e.into());
                }
            };
            match event {
                XmlEvent::StartRoot(name) => {
                    if root.is_some() {
                        return Err(FormatError::UnexpectedEvent("StartRoot"));
                    }
                    check_name(&name)?;
                    if self.options.declaration {
                        self.out.write_all(br#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
                        self.newline()?;
                    }
                    write!(self.out, "<{name}>")?;
                    root = Some(name);
                }
                XmlEvent::Row(row) => {
                    if root.is_none() {
                        return Err(FormatError::UnexpectedEvent("Row"));
                    }
                    self.newline()?;
                    self.write_element(&row, 1)?;
                    rows += 1;
                }
                XmlEvent::EndRoot(name) => {
                    if root.as_deref() != Some(name.as_str()) {
                        return Err(FormatError::UnexpectedEvent("EndRoot"));
                    }
                    if rows > 0 {
                        self.newline()?;
                    }
                    write!(self.out, "</{name}>")?;
                    self.newline()?;
                    root = None;
                }
            }
        }

        self.out.flush()?;
        Ok(rows)
    }

    fn write_element(&mut self, element: &XmlElement, depth: usize) -> Result<(), FormatError> {
        check_name(&element.name)?;
        self.pad(depth)?;
        match &element.content {
            XmlContent::Empty => write!(self.out, "<{}/>", element.name)?,
            XmlContent::Text(text) => {
                write!(self.out, "<{}>", element.name)?;
                let escaped = escape(text).map_err(|c| FormatError::InvalidChar {
                    element: element.name.clone(),
                    code: u32::from(c),
                })?;
                self.out.write_all(escaped.as_bytes())?;
                write!(self.out, "</{}>", element.name)?;
            }
            XmlContent::Children(children) if children.is_empty() => {
                write!(self.out, "<{}/>", element.name)?;
            }
            XmlContent::Children(children) => {
                write!(self.out, "<{}>", element.name)?;
                for child in children {
                    self.newline()?;
                    self.write_element(child, depth + 1)?;
                }
                self.newline()?;
                self.pad(depth)?;
                write!(self.out, "</{}>", element.name)?;
            }
        }
        Ok(())
    }

    fn newline(&mut self) -> std::io::Result<()> {
        if self.options.indent.is_some() {
            self.out.write_all(b"\n")?;
        }
        Ok(())
    }

    fn pad(&mut self, depth: usize) -> std::io::Result<()> {
        if let Some(width) = self.options.indent {
            write!(self.out, "{:1$}", "", width * depth)?;
        }
        Ok(())
    }
}

/// Render a whole source into a string.
pub fn to_string<I>(source: I, options: XmlWriterOptions) -> Result<String, FormatError>
where
    I: IntoIterator<Item = Result<XmlEvent, TableError>>,
{
    let mut writer = XmlWriter::new(Vec::new(), options);
    writer.write_source(source)?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// XML name check: letter or `_` first, then letters, digits, `_`, `-`, `.`.
/// Namespace prefixes (`:`) are accepted as-is.
fn check_name(name: &str) -> Result<(), FormatError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_')
                && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(FormatError::InvalidName(name.to_string()))
    }
}

/// Escape markup characters. Fails with the first character XML 1.0 does not
/// allow in a document (C0 controls other than tab, LF, CR; U+FFFE; U+FFFF).
fn escape(text: &str) -> Result<String, char> {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' | '\n' | '\r' => out.push(c),
            '\u{0}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}' => return Err(c),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    Ok(out)
}
