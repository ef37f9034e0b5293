use std::io::Write;

use crate::cmd::load_dataset;
use crate::config::SchemaArgs;
use crate::error::CliError;

pub fn run(args: SchemaArgs) -> Result<(), CliError> {
    let dataset = load_dataset(&args.input)?;
    let description = serde_json::json!({
        "columns": dataset.schema(),
        "rows": dataset.rows.len(),
        "properties": dataset.properties,
    });

    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &description)?;
    writeln!(out)?;
    Ok(())
}
