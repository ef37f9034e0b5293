pub mod render;
pub mod schema;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use cursor_memory::Dataset;

use crate::error::CliError;

/// Read a dataset from a file, or from stdin when the path is `-`.
pub(crate) fn load_dataset(path: &Path) -> Result<Dataset, CliError> {
    if path.as_os_str() == "-" {
        return Ok(Dataset::from_reader(std::io::stdin().lock())?);
    }
    let file = File::open(path).map_err(|e| CliError::Input {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(Dataset::from_reader(BufReader::new(file))?)
}
