//! The dump command
//!
//! Reads one or more TIFF files and renders their complete structure,
//! every IFD, SubIFD and tag, as text, JSON or YAML.

use std::io::{self, Write};

use clap::ArgMatches;

use crate::commands::command_traits::Command;
use crate::tiff::dump::{self, DumpFormat, DumpOptions};
use crate::tiff::errors::TiffResult;
use crate::tiff::reader::read_tiff;
use crate::utils::logger::Logger;
use crate::utils::string_utils;

/// Command to print the structure of TIFF files
pub struct DumpCommand<'a> {
    sources: Vec<String>,
    options: DumpOptions,
    logger: &'a Logger,
}

impl<'a> DumpCommand<'a> {
    /// Create a new dump command from CLI arguments
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> TiffResult<Self> {
        let sources: Vec<String> = args
            .get_many::<String>("source")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        let format = if args.get_flag("json") {
            DumpFormat::Json
        } else if args.get_flag("yaml") {
            DumpFormat::Yaml
        } else {
            DumpFormat::Text
        };
        let options = DumpOptions {
            max_items: *args.get_one::<usize>("max").unwrap_or(&20),
            max_text: args.get_one::<usize>("max-text").copied(),
            format,
        };
        Ok(DumpCommand {
            sources,
            options,
            logger,
        })
    }
}

impl<'a> Command for DumpCommand<'a> {
    fn execute(&self) -> TiffResult<()> {
        let stdout = io::stdout();
        let mut dest = stdout.lock();

        if self.options.format == DumpFormat::Json {
            if self.sources.len() == 1 {
                let info = read_tiff(&self.sources[0], self.logger)?;
                dump::dump_info(&info, &self.options, &mut dest)?;
            } else {
                let mut map = serde_json::Map::new();
                for source in &self.sources {
                    let info = read_tiff(source, self.logger)?;
                    map.insert(source.clone(), dump::to_json(&info, &self.options));
                }
                serde_json::to_writer_pretty(&mut dest, &serde_json::Value::Object(map))
                    .map_err(|e| crate::tiff::errors::TiffError::GenericError(e.to_string()))?;
                writeln!(dest)?;
            }
            return Ok(());
        }

        for (idx, source) in self.sources.iter().enumerate() {
            if self.sources.len() > 1 {
                match self.options.format {
                    DumpFormat::Yaml => {
                        writeln!(dest, "{}:", string_utils::yaml_escape(source))?
                    }
                    _ => {
                        if idx > 0 {
                            writeln!(dest)?;
                        }
                        writeln!(dest, "-- {} --", source)?
                    }
                }
            }
            let info = read_tiff(source, self.logger)?;
            dump::dump_info(&info, &self.options, &mut dest)?;
        }
        Ok(())
    }
}
