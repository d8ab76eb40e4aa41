//! YAML profile configuration.
//!
//! A profile bundles the ingestion settings (encoding, delimiter, null tokens,
//! inference sample), the role keyword table, and the report bounds. Every
//! field is optional in the file; omitted ones take the defaults below.

use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::{
    classify::KeywordSets,
    cli::parse_delimiter,
    ingest::{DEFAULT_INFER_ROWS, DEFAULT_NULL_TOKENS, IngestOptions, NullTokens},
    io_utils,
    report::ReportConfig,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    pub encoding: String,
    pub delimiter: Option<String>,
    pub null_tokens: Vec<String>,
    pub infer_rows: usize,
    pub allow_ragged: bool,
    pub roles: KeywordSets,
    pub report: ReportConfig,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            encoding: io_utils::DEFAULT_ENCODING_LABEL.to_string(),
            delimiter: None,
            null_tokens: DEFAULT_NULL_TOKENS.iter().map(|t| t.to_string()).collect(),
            infer_rows: DEFAULT_INFER_ROWS,
            allow_ragged: false,
            roles: KeywordSets::default(),
            report: ReportConfig::default(),
        }
    }
}

impl ProfileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: ProfileConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config YAML {path:?}"))?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Serializing config")?;
        let mut file =
            File::create(path).with_context(|| format!("Creating config file {path:?}"))?;
        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Writing config file {path:?}"))?;
        Ok(())
    }

    pub fn ingest_options(&self) -> Result<IngestOptions> {
        let encoding = io_utils::resolve_encoding(Some(&self.encoding))?;
        let delimiter = self
            .delimiter
            .as_deref()
            .map(parse_delimiter)
            .transpose()
            .map_err(|err| anyhow!("Invalid delimiter in config: {err}"))?;
        Ok(IngestOptions {
            encoding,
            delimiter,
            null_tokens: NullTokens::new(self.null_tokens.iter().cloned()),
            max_type_inference_rows: self.infer_rows,
            allow_ragged: self.allow_ragged,
        })
    }
}
