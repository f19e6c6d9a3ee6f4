//! CLI command implementations
//!
//! This module contains implementations of the subcommands supported by
//! the CLI application using the Command pattern.

pub mod command_traits;
pub mod concat_command;
pub mod dump_command;
pub mod set_command;
pub mod split_command;

pub use command_traits::{Command, CommandFactory, GlobalWriteFlags};
pub use concat_command::ConcatCommand;
pub use dump_command::DumpCommand;
pub use set_command::SetCommand;
pub use split_command::SplitCommand;

use clap::ArgMatches;

use crate::tiff::errors::{TiffError, TiffResult};
use crate::utils::logger::Logger;

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the parsed subcommand and creates the
/// appropriate command instance for execution.
pub struct TiffkitCommandFactory;

impl TiffkitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        TiffkitCommandFactory
    }
}

impl Default for TiffkitCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CommandFactory<'a> for TiffkitCommandFactory {
    fn create_command(
        &self,
        args: &ArgMatches,
        logger: &'a Logger,
    ) -> TiffResult<Box<dyn Command + 'a>> {
        match args.subcommand() {
            Some(("dump", sub)) => Ok(Box::new(DumpCommand::new(sub, logger)?)),
            Some(("split", sub)) => Ok(Box::new(SplitCommand::new(sub, logger)?)),
            Some(("concat", sub)) => Ok(Box::new(ConcatCommand::new(sub, logger)?)),
            Some(("set", sub)) => Ok(Box::new(SetCommand::new(sub, logger)?)),
            _ => Err(TiffError::UsageError(
                "No subcommand given; see --help".to_string(),
            )),
        }
    }
}
