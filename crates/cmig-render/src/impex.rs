//! ImpEx header for bulk data

use crate::error::RenderError;
use crate::RenderedFile;
use cmig_model::naming::type_code;
use cmig_model::{Artifact, BulkDataBody};
use std::fmt::Write;
use std::path::PathBuf;

pub(crate) fn initial_data(artifact: &Artifact, body: &BulkDataBody) -> Result<RenderedFile, RenderError> {
    let mut out = String::new();
    writeln!(out, "# Initial data for {}", body.item_type)?;
    write!(out, "INSERT_UPDATE {}", type_code(&body.item_type))?;
    for column in &body.columns {
        if body.unique_columns.contains(column) {
            write!(out, ";{column}[unique=true]")?;
        } else {
            write!(out, ";{column}")?;
        }
    }
    writeln!(out)?;

    let path = PathBuf::from("src/main/resources/impex").join(format!("{}.impex", artifact.identifier));
    Ok(RenderedFile::new(path, out))
}
