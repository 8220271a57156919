use std::{
    fs::{create_dir_all, File},
    io::{self, BufWriter},
    path::PathBuf,
};

use clap::{Parser, Subcommand};
use oxplot_ast::{document::Document, serialize::WriteOptions};
use oxplot_serialize::{xmlwriter::Indent, Encoding};

use crate::{
    commands::{Build, Demo},
    config::{self, Config},
};

pub trait RunCommand {
    /// # Errors
    ///
    /// If any part of the lifecycle fails
    /// * Fails to read or parse any files
    /// * Fails to build or serialize the document
    /// * Fails to write to the output
    fn run(self, config: Config) -> anyhow::Result<()>;
}

#[derive(Parser)]
#[clap(
    bin_name = "oxplot",
    name = "oxplot",
    author,
    version,
    about = "Build SVG scenes from the command line",
    long_about = None
)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a demonstration scene
    Demo(Demo),
    /// Build a document from a JSON scene description
    Build(Build),
}

#[derive(clap::Args, Debug, Default)]
/// Flags controlling how a document is written
pub struct WriteArgs {
    /// The file to write the document to.
    /// Defaults to standard output
    #[clap(long, short)]
    pub output: Option<PathBuf>,
    /// Skip the XML declaration and doctype
    #[clap(long)]
    pub no_header: bool,
    /// The output encoding.
    ///
    /// Accepts `utf-8`, `us-ascii`, or `none`
    #[clap(long, short)]
    pub encoding: Option<Encoding>,
    /// Controls whether the output is indented with tabs or spaces.
    ///
    /// Accepts `none`, `tabs`, or a number
    #[clap(long, short)]
    pub pretty: Option<Indent>,
    /// Quote attribute values with `'` instead of `"`
    #[clap(long)]
    pub single_quote: bool,
}

impl WriteArgs {
    /// Merges the flags with the configured output options, where flags take precedence
    ///
    /// # Errors
    /// When the configured options are invalid
    pub fn options(&self, config: Option<&config::Output>) -> anyhow::Result<WriteOptions> {
        let mut options = match config {
            Some(config) => config.write_options()?,
            None => WriteOptions::default(),
        };
        if self.no_header {
            options.header = false;
        }
        if let Some(encoding) = self.encoding {
            options.encoding = encoding;
        }
        if let Some(pretty) = self.pretty {
            options.format.indent = pretty;
        }
        if self.single_quote {
            options.format.use_single_quote = true;
        }
        Ok(options)
    }

    /// Writes the document to the output file, or standard output when there's none
    ///
    /// # Errors
    /// When the file cannot be created or the document cannot be written
    pub fn write(&self, document: Document, options: &WriteOptions) -> anyhow::Result<()> {
        let Some(path) = &self.output else {
            document.write(io::stdout().lock(), options)?;
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            create_dir_all(parent)?;
        }
        document.write(BufWriter::new(File::create(path)?), options)?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}

#[test]
fn flags_override_config() -> anyhow::Result<()> {
    let config = config::Output {
        header: Some(false),
        pretty: Some(String::from("tabs")),
        ..config::Output::default()
    };
    let flags = WriteArgs {
        encoding: Some(Encoding::UsAscii),
        pretty: Some(Indent::Spaces(4)),
        single_quote: true,
        ..WriteArgs::default()
    };

    let options = flags.options(Some(&config))?;
    assert!(!options.header);
    assert_eq!(options.encoding, Encoding::UsAscii);
    assert_eq!(options.format.indent, Indent::Spaces(4));
    assert!(options.format.use_single_quote);

    let options = WriteArgs::default().options(None)?;
    assert!(options.header);
    assert_eq!(options.format.indent, Indent::None);
    Ok(())
}

#[test]
fn parse_flags() {
    let args = Args::parse_from([
        "oxplot",
        "build",
        "scene.json",
        "--no-header",
        "--encoding",
        "us-ascii",
        "--pretty",
        "2",
        "-o",
        "out.svg",
    ]);
    let Command::Build(build) = args.command else {
        panic!("expected the build command");
    };
    assert_eq!(build.scene, PathBuf::from("scene.json"));
    assert!(build.write.no_header);
    assert_eq!(build.write.encoding, Some(Encoding::UsAscii));
    assert_eq!(build.write.pretty, Some(Indent::Spaces(2)));
    assert_eq!(build.write.output, Some(PathBuf::from("out.svg")));
}
