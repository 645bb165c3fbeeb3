//! Download rendering.
//!
//! Three formats, all derived from the same YAML body: the YAML itself, a
//! JSON wrapper carrying the YAML under a `yaml` key, and a zip archive
//! with a single `<title>.yaml` entry. Exploration id and version are
//! deliberately left out of the body; the version appears in the download
//! file name instead.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use quest_model::{Exploration, State};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to build zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Schema version written into every exported body.
pub const EXPORT_SCHEMA_VERSION: u32 = 1;

/// Requested download format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DownloadFormat {
    #[default]
    Zip,
    Json,
    Yaml,
}

impl DownloadFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadFormat::Zip => "zip",
            DownloadFormat::Json => "json",
            DownloadFormat::Yaml => "yaml",
        }
    }
}

impl FromStr for DownloadFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zip" => Ok(DownloadFormat::Zip),
            "json" => Ok(DownloadFormat::Json),
            "yaml" => Ok(DownloadFormat::Yaml),
            other => Err(format!("Unknown download format: {other}")),
        }
    }
}

#[derive(Serialize)]
struct ExportBody<'a> {
    objective: &'a str,
    language_code: &'a str,
    init_state_name: &'a str,
    schema_version: u32,
    states: &'a BTreeMap<String, State>,
}

/// Render the exploration body as YAML.
pub fn to_yaml(exploration: &Exploration) -> Result<String> {
    let body = ExportBody {
        objective: &exploration.objective,
        language_code: &exploration.language_code,
        init_state_name: &exploration.init_state_name,
        schema_version: EXPORT_SCHEMA_VERSION,
        states: &exploration.states,
    };
    Ok(serde_yaml::to_string(&body)?)
}

/// Render the exploration as a JSON document wrapping the YAML body.
pub fn to_json(exploration: &Exploration) -> Result<String> {
    let yaml = to_yaml(exploration)?;
    Ok(serde_json::to_string(&serde_json::json!({ "yaml": yaml }))?)
}

/// Name of the single YAML entry inside the zip archive.
pub fn yaml_entry_name(exploration: &Exploration) -> String {
    format!("{}.yaml", exploration.title)
}

/// Attachment file name for the zip download: the title with all
/// whitespace stripped, suffixed with the exploration version.
pub fn download_filename(exploration: &Exploration) -> String {
    let compact_title: String = exploration
        .title
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect();
    format!("quest-{compact_title}-v{}.zip", exploration.version)
}

/// Build a zip archive holding the YAML body as its only entry.
pub fn to_zip(exploration: &Exploration) -> Result<Vec<u8>> {
    let yaml = to_yaml(exploration)?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file(yaml_entry_name(exploration), SimpleFileOptions::default())?;
    writer.write_all(yaml.as_bytes())?;
    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}
