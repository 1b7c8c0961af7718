//! Directory conversion
//!
//! Reads every `*.json`, `*.yaml` and `*.yml` command file of a directory,
//! converts them as one batch and writes one output directory per unit:
//!
//! ```text
//! <output>/<Unit>/<Unit>.result.json
//! <output>/<Unit>/src/main/java/...        (when rendering)
//! <output>/<Unit>/UNRESOLVED.md            (when something is unresolved)
//! ```

use crate::converter::{Conversion, Converter};
use crate::error::{BatchError, ConversionError};
use chrono::{DateTime, Utc};
use cmig_engine::RawCommand;
use cmig_render::Renderer;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use ulid::Ulid;

/// Command file extensions, lowercase
const INPUT_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Per-file status in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Converted with a `Valid` verdict
    Converted,
    /// Converted, but the verdict is `Invalid`
    Invalid,
    /// No result, see `error`
    Failed,
}

/// What happened to one input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutcome {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ConversionError>,
    /// Written files, relative to the output directory
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub written: Vec<PathBuf>,
}

impl FileOutcome {
    fn failed(file: PathBuf, error: ConversionError) -> Self {
        Self {
            file,
            status: FileStatus::Failed,
            unit: None,
            error: Some(error),
            written: Vec::new(),
        }
    }
}

/// Report of one directory conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub job_id: Ulid,
    pub generated_at: DateTime<Utc>,
    pub files: Vec<FileOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl BatchSummary {
    fn new(files: Vec<FileOutcome>) -> Self {
        Self {
            job_id: Ulid::new(),
            generated_at: Utc::now(),
            files,
            warning: None,
        }
    }

    #[must_use]
    pub fn count(&self, status: FileStatus) -> usize {
        self.files.iter().filter(|f| f.status == status).count()
    }

    #[inline]
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.count(FileStatus::Failed) > 0
    }

    #[inline]
    #[must_use]
    pub fn has_invalid(&self) -> bool {
        self.count(FileStatus::Invalid) > 0
    }
}

/// Command files of `dir`, sorted by path
///
/// # Errors
///
/// [`BatchError::Io`] if the directory cannot be listed.
pub fn command_files(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let entries = fs::read_dir(dir).map_err(|e| BatchError::io("cannot read", dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| BatchError::io("cannot read", dir, e))?
            .path();
        let wanted = path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| INPUT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if wanted {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse one command file, JSON or YAML by extension
///
/// # Errors
///
/// `MalformedInput` for unreadable or unparsable files.
pub fn read_command(path: &Path) -> Result<RawCommand, ConversionError> {
    let text = fs::read_to_string(path).map_err(|e| {
        ConversionError::malformed_input(format!("cannot read {}: {e}", path.display()))
    })?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        serde_json::from_str(&text).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&text).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| ConversionError::malformed_input(format!("{}: {e}", path.display())))
}

impl Converter {
    /// Convert a directory of command files into `output_dir`
    ///
    /// Per-file failures are recorded in the summary. An input directory
    /// without command files yields a summary with a warning.
    ///
    /// # Errors
    ///
    /// [`BatchError`] when the input cannot be listed or output cannot be
    /// written.
    pub fn convert_dir(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        renderer: Option<&Renderer>,
    ) -> Result<BatchSummary, BatchError> {
        let files = command_files(input_dir)?;
        if files.is_empty() {
            let warning = format!("no command files in {}", input_dir.display());
            tracing::warn!(dir = %input_dir.display(), "no command files");
            let mut summary = BatchSummary::new(Vec::new());
            summary.warning = Some(warning);
            return Ok(summary);
        }

        let parsed: Vec<Result<RawCommand, ConversionError>> =
            files.iter().map(|f| read_command(f)).collect();
        let raws: Vec<RawCommand> = parsed.iter().filter_map(|p| p.as_ref().ok()).cloned().collect();
        let mut converted = self.convert_batch_detailed(&raws).into_iter();

        let mut outcomes = Vec::with_capacity(files.len());
        for (file, parsed) in files.into_iter().zip(parsed) {
            let outcome = match parsed {
                Err(e) => FileOutcome::failed(file, e),
                Ok(_) => match converted.next() {
                    Some(Ok(conversion)) => write_unit(output_dir, file, &conversion, renderer)?,
                    Some(Err(e)) => FileOutcome::failed(file, e),
                    None => FileOutcome::failed(
                        file,
                        ConversionError::malformed_input("no conversion produced"),
                    ),
                },
            };
            if let Some(error) = &outcome.error {
                tracing::warn!(file = %outcome.file.display(), %error, "file failed");
            }
            outcomes.push(outcome);
        }

        let summary = BatchSummary::new(outcomes);
        tracing::info!(
            job = %summary.job_id,
            converted = summary.count(FileStatus::Converted),
            invalid = summary.count(FileStatus::Invalid),
            failed = summary.count(FileStatus::Failed),
            "batch finished"
        );
        Ok(summary)
    }
}

fn write_unit(
    output_dir: &Path,
    file: PathBuf,
    conversion: &Conversion,
    renderer: Option<&Renderer>,
) -> Result<FileOutcome, BatchError> {
    let written = write_outputs(output_dir, conversion, renderer)?;
    let status = if conversion.result.is_valid() {
        FileStatus::Converted
    } else {
        FileStatus::Invalid
    };
    Ok(FileOutcome {
        file,
        status,
        unit: Some(conversion.unit().to_string()),
        error: None,
        written,
    })
}

/// Write `<Unit>/<Unit>.result.json` and, with a renderer, the rendered
/// sources under `output_dir`
///
/// Returns the written paths relative to `output_dir`.
///
/// # Errors
///
/// [`BatchError`] when encoding, rendering or writing fails.
pub fn write_outputs(
    output_dir: &Path,
    conversion: &Conversion,
    renderer: Option<&Renderer>,
) -> Result<Vec<PathBuf>, BatchError> {
    let unit = conversion.unit();
    let mut written = Vec::new();

    let json = serde_json::to_string_pretty(&conversion.result).map_err(|source| {
        BatchError::Encode {
            unit: unit.to_string(),
            source,
        }
    })?;
    let result_path = PathBuf::from(unit).join(format!("{unit}.result.json"));
    write_file(output_dir, &result_path, &json)?;
    written.push(result_path);

    if let Some(renderer) = renderer {
        let files = renderer
            .render(&conversion.set, &conversion.plan.unresolved)
            .map_err(|source| BatchError::Render {
                unit: unit.to_string(),
                source,
            })?;
        for rendered in files {
            let path = PathBuf::from(unit).join(&rendered.path);
            write_file(output_dir, &path, &rendered.content)?;
            written.push(path);
        }
    }
    tracing::debug!(unit, dir = %output_dir.join(unit).display(), files = written.len(), "written");
    Ok(written)
}

fn write_file(root: &Path, relative: &Path, content: &str) -> Result<(), BatchError> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BatchError::io("cannot create", parent, e))?;
    }
    fs::write(&path, content).map_err(|e| BatchError::io("cannot write", &path, e))
}
