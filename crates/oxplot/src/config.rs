//! Types for the configuration file usable by oxplot
use std::{env::current_dir, fs::read_to_string, io, path::PathBuf};

use anyhow::Context;
use etcetera::{choose_base_strategy, BaseStrategy};
use oxplot_ast::serialize::WriteOptions;
use oxplot_serialize::{xmlwriter::Indent, Encoding};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// The configuration for writing documents
pub struct Output {
    /// Whether to write the XML declaration and doctype
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<bool>,
    /// The output encoding; one of `utf-8`, `us-ascii`, or `none`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// The indentation of elements; one of `none`, `tabs`, or a number of spaces
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<String>,
    /// Whether to quote attribute values with `'`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_quote: Option<bool>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
/// The config for the CLI usage of oxplot
pub struct Config {
    /// The defaults for writing documents, which flags take precedence over
    pub output: Option<Output>,
}

impl Config {
    fn load_local() -> io::Result<(String, PathBuf)> {
        let mut path = current_dir()?;
        path.push("oxplotrc.json");
        Ok((read_to_string(&path)?, path))
    }

    fn load_base() -> io::Result<(String, PathBuf)> {
        let mut path = choose_base_strategy().map_err(io::Error::other)?.config_dir();
        path.push("oxplot");
        path.push("config.json");
        Ok((read_to_string(&path)?, path))
    }

    /// Tries loading the configuration from well-known paths, using the default configuration
    /// when none is found
    ///
    /// # Errors
    /// When the config exists but cannot be parsed
    pub fn load() -> anyhow::Result<Self> {
        let Ok((file, path)) = Self::load_local().or_else(|_| Self::load_base()) else {
            log::debug!("no config found, using defaults");
            return Ok(Self::default());
        };
        log::debug!("using config at {}", path.display());
        serde_json::from_str(&file)
            .with_context(|| format!("Configuration at {} cannot be parsed", path.display()))
    }
}

impl Output {
    /// Converts the configured values into options for writing, using defaults for those not set
    ///
    /// # Errors
    /// When the encoding or indentation is not recognised
    pub fn write_options(&self) -> anyhow::Result<WriteOptions> {
        let mut options = WriteOptions::default();
        if let Some(header) = self.header {
            options.header = header;
        }
        if let Some(encoding) = &self.encoding {
            options.encoding = encoding.parse::<Encoding>()?;
        }
        if let Some(pretty) = &self.pretty {
            options.format.indent = pretty.parse::<Indent>()?;
        }
        if let Some(single_quote) = self.single_quote {
            options.format.use_single_quote = single_quote;
        }
        Ok(options)
    }
}

#[test]
fn serde() -> anyhow::Result<()> {
    let config: Config = serde_json::from_str(
        r#"{
        "output": {
            "header": false,
            "pretty": "tabs",
            "singleQuote": true
        }
    }"#,
    )?;

    assert_eq!(
        serde_json::to_string(&config)?,
        String::from(r#"{"output":{"header":false,"pretty":"tabs","singleQuote":true}}"#),
        "unset values should not be written"
    );
    Ok(())
}

#[test]
fn write_options() -> anyhow::Result<()> {
    let output = Output {
        header: Some(false),
        encoding: Some(String::from("US-ASCII")),
        pretty: Some(String::from("2")),
        single_quote: None,
    };
    let options = output.write_options()?;
    assert!(!options.header);
    assert_eq!(options.encoding, Encoding::UsAscii);
    assert_eq!(options.format.indent, Indent::Spaces(2));
    assert!(!options.format.use_single_quote);

    let defaults = Output::default().write_options()?;
    assert!(defaults.header);
    assert_eq!(defaults.encoding, Encoding::Utf8);

    let unknown = Output {
        encoding: Some(String::from("latin-1")),
        ..Output::default()
    };
    assert!(unknown.write_options().is_err());
    Ok(())
}
