//! Manual follow-up list

use crate::error::RenderError;
use crate::RenderedFile;
use cmig_engine::UnresolvedReference;
use std::fmt::Write;

pub(crate) const FILE_NAME: &str = "UNRESOLVED.md";

pub(crate) fn unresolved(unit: &str, refs: &[UnresolvedReference]) -> Result<RenderedFile, RenderError> {
    let mut out = String::new();
    writeln!(out, "# Unresolved references: {unit}")?;
    writeln!(out)?;
    writeln!(out, "No mapping rule matched these source references.")?;
    writeln!(out, "Each one needs a manual migration decision.")?;
    writeln!(out)?;
    writeln!(out, "| kind | name | reason |")?;
    writeln!(out, "|------|------|--------|")?;
    for r in refs {
        writeln!(out, "| {} | `{}` | {} |", r.kind.as_str(), r.name, r.reason)?;
    }
    Ok(RenderedFile::new(FILE_NAME, out))
}
