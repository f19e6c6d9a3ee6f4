//! The concat command
//!
//! Concatenates the top-level IFD chains of several TIFF files into one
//! output file. Every image-data offset is reassigned by the writer.

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::{Command, GlobalWriteFlags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::reader::read_tiff;
use crate::tiff::writer::TiffWriter;
use crate::utils::logger::Logger;

/// Command to concatenate multiple TIFF files
pub struct ConcatCommand<'a> {
    sources: Vec<String>,
    output: String,
    overwrite: bool,
    flags: GlobalWriteFlags,
    logger: &'a Logger,
}

impl<'a> ConcatCommand<'a> {
    /// Create a new concat command from CLI arguments
    ///
    /// The last positional argument is the output; everything before it is
    /// a source.
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> TiffResult<Self> {
        let mut files: Vec<String> = args
            .get_many::<String>("files")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        if files.len() < 2 {
            return Err(TiffError::UsageError(
                "concat requires at least one source and an output".to_string(),
            ));
        }
        let output = files.pop().unwrap();
        Ok(ConcatCommand {
            sources: files,
            output,
            overwrite: args.get_flag("overwrite"),
            flags: GlobalWriteFlags::from_args(args),
            logger,
        })
    }
}

impl<'a> Command for ConcatCommand<'a> {
    fn execute(&self) -> TiffResult<()> {
        let mut ifds = Vec::new();
        let mut big_endian = None;
        let mut big_tiff = false;
        for source in &self.sources {
            let info = read_tiff(source, self.logger)?;
            big_endian.get_or_insert(info.big_endian);
            big_tiff |= info.big_tiff;
            ifds.extend(info.ifds);
        }
        info!(
            "Concatenating {} IFDs from {} files into {}",
            ifds.len(),
            self.sources.len(),
            self.output
        );
        TiffWriter::write_ifds(
            &ifds,
            big_endian.unwrap_or(false),
            big_tiff,
            &self.output,
            &self.flags.write_options(self.overwrite),
        )
    }
}
