//! Command pattern interfaces
//!
//! This module defines the core Command pattern interfaces
//! for the CLI application, enabling a clean separation of concerns.

use crate::tiff::errors::TiffResult;
use crate::utils::logger::Logger;

/// Represents an executable command in the application
///
/// Command objects encapsulate the logic for a specific CLI operation,
/// allowing for separation of concerns and better testability.
pub trait Command {
    /// Execute the command
    ///
    /// # Returns
    /// Result indicating success or an error
    fn execute(&self) -> TiffResult<()>;
}

/// Factory for creating commands from CLI arguments
///
/// This trait defines the interface for command factories
/// which can parse CLI arguments and create the appropriate Command.
pub trait CommandFactory<'a> {
    /// Create a new Command instance based on CLI arguments
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    ///
    /// # Returns
    /// A command that implements the Command trait, or an error
    fn create_command(
        &self,
        args: &clap::ArgMatches,
        logger: &'a Logger,
    ) -> TiffResult<Box<dyn Command + 'a>>;
}

/// Write-related flags shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct GlobalWriteFlags {
    /// Some(true) for --bigtiff, Some(false) for --classic
    pub big_tiff: Option<bool>,
    /// --ifds-first
    pub ifds_first: bool,
}

impl GlobalWriteFlags {
    /// Extracts the shared flags from parsed arguments
    pub fn from_args(args: &clap::ArgMatches) -> Self {
        let big_tiff = if args.get_flag("bigtiff") {
            Some(true)
        } else if args.get_flag("classic") {
            Some(false)
        } else {
            None
        };
        GlobalWriteFlags {
            big_tiff,
            ifds_first: args.get_flag("ifds-first"),
        }
    }

    /// Builds writer options, adding the overwrite decision
    pub fn write_options(&self, allow_existing: bool) -> crate::tiff::writer::WriteOptions {
        crate::tiff::writer::WriteOptions {
            big_tiff: self.big_tiff,
            ifds_first: self.ifds_first,
            allow_existing,
        }
    }
}
