use std::io::{BufWriter, Write};

use format_json::JsonWriter;
use format_xml::XmlWriter;

use crate::cmd::load_dataset;
use crate::config::{OutputFormat, RenderArgs, TabulaConfig};
use crate::error::CliError;

pub fn run(args: RenderArgs) -> Result<(), CliError> {
    let config = TabulaConfig::load_opt(args.config.as_deref())?;
    if let Some(path) = &args.config {
        tracing::info!(config = %path.display(), "loaded config");
    }

    let format = args.format.unwrap_or(config.format);
    let pretty = args.pretty || config.pretty;

    let table = load_dataset(&args.input)?.into_table(&config.memory)?;
    tracing::info!(
        input = %args.input.display(),
        columns = table.schema().len(),
        ?format,
        "rendering dataset"
    );

    let mut out = BufWriter::new(std::io::stdout().lock());
    let rows = match format {
        OutputFormat::Json => JsonWriter::new(&mut out)
            .pretty(pretty)
            .write_source(table.to_json())?,
        OutputFormat::Xml => {
            let root = args.root.as_deref().or(config.xml.root.as_deref());
            let row = args.row.as_deref().or(config.xml.row.as_deref());
            let mut options = config.xml.writer.clone();
            if pretty && options.indent.is_none() {
                options.indent = Some(2);
            }
            XmlWriter::new(&mut out, options).write_source(table.to_xml(root, row))?
        }
    };
    out.flush()?;

    tracing::info!(rows, "render finished");
    Ok(())
}
