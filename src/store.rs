//! Table persistence
//!
//! Writes tables as delimited text files and reads them back.

use std::fs;
use std::path::Path;

use crate::error::PipelineError;
use crate::table::Table;

/// Write `table` to `path`, creating parent directories as needed
pub fn write_table(table: &Table, path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
    }

    fs::write(path, table.to_delimited()).map_err(|e| PipelineError::io(path, e))?;
    log::debug!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Read a table previously written by [`write_table`] (or any compatible tool)
pub fn read_table(path: &Path) -> Result<Table, PipelineError> {
    let text = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    let table = Table::from_delimited(&text)?;
    log::debug!(
        "Read {} rows x {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}
