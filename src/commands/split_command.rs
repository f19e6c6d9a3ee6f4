//! The split command
//!
//! Splits a multi-directory TIFF into one file per top-level IFD, and
//! optionally one file per SubIFD.

use std::path::{Path, PathBuf};

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::{Command, GlobalWriteFlags};
use crate::tiff::constants::tags;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::Ifd;
use crate::tiff::reader::read_tiff;
use crate::tiff::writer::TiffWriter;
use crate::utils::logger::Logger;

/// Command to split a TIFF into single-directory files
pub struct SplitCommand<'a> {
    source: String,
    prefix: Option<String>,
    subifds: bool,
    overwrite: bool,
    flags: GlobalWriteFlags,
    logger: &'a Logger,
}

impl<'a> SplitCommand<'a> {
    /// Create a new split command from CLI arguments
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> TiffResult<Self> {
        Ok(SplitCommand {
            source: args
                .get_one::<String>("source")
                .cloned()
                .ok_or_else(|| TiffError::UsageError("split requires a source".into()))?,
            prefix: args.get_one::<String>("prefix").cloned(),
            subifds: args.get_flag("subifds"),
            overwrite: args.get_flag("overwrite"),
            flags: GlobalWriteFlags::from_args(args),
            logger,
        })
    }

    /// Collects the IFDs that become output files, in document order
    fn collect_ifds<'b>(ifds: &'b [Ifd], subifds: bool, out: &mut Vec<&'b Ifd>) {
        for ifd in ifds {
            out.push(ifd);
            if subifds {
                if let Some(chains) = ifd.get_entry(tags::SUB_IFD).and_then(|e| e.sub_ifds()) {
                    for chain in chains {
                        Self::collect_ifds(chain, subifds, out);
                    }
                }
            }
        }
    }

    /// Performs the split; returns the number of files written
    ///
    /// Shared between the CLI command and the library facade.
    pub fn run(
        source: &Path,
        prefix: Option<&str>,
        subifds: bool,
        overwrite: bool,
        options: &crate::tiff::writer::WriteOptions,
        logger: &Logger,
    ) -> TiffResult<usize> {
        let info = read_tiff(source, logger)?;

        let mut selected = Vec::new();
        Self::collect_ifds(&info.ifds, subifds, &mut selected);
        if selected.is_empty() {
            return Err(TiffError::GenericError("No IFDs to split".to_string()));
        }

        let needed_chars = needed_name_chars(selected.len());
        if !overwrite {
            for idx in 0..selected.len() {
                let path = make_split_name(prefix, idx, needed_chars);
                if path.exists() {
                    return Err(TiffError::OutputExists(path.display().to_string()));
                }
            }
        }

        let write_options = crate::tiff::writer::WriteOptions {
            allow_existing: overwrite,
            ..options.clone()
        };
        for (idx, ifd) in selected.iter().enumerate() {
            let path = make_split_name(prefix, idx, needed_chars);
            let mut single = (*ifd).clone();
            if subifds {
                single.remove_entry(tags::SUB_IFD);
            }
            info!("Writing {}", path.display());
            TiffWriter::write_ifds(
                &[single],
                info.big_endian,
                info.big_tiff,
                &path,
                &write_options,
            )?;
        }
        Ok(selected.len())
    }
}

impl<'a> Command for SplitCommand<'a> {
    fn execute(&self) -> TiffResult<()> {
        Self::run(
            Path::new(&self.source),
            self.prefix.as_deref(),
            self.subifds,
            self.overwrite,
            &self.flags.write_options(self.overwrite),
            self.logger,
        )
        .map(|_| ())
    }
}

/// Number of base-26 characters needed to number the outputs (minimum 3)
fn needed_name_chars(outputs: usize) -> usize {
    let mut chars = 1;
    let mut capacity = 26usize;
    while capacity < outputs {
        chars += 1;
        capacity = capacity.saturating_mul(26);
    }
    chars.max(3)
}

/// Builds a split output path: prefix + base-26 index + ".tif"
fn make_split_name(prefix: Option<&str>, mut num: usize, needed_chars: usize) -> PathBuf {
    let prefix = prefix.unwrap_or("./");
    let mut suffix = String::from(".tif");
    for _ in 0..needed_chars {
        suffix.insert(0, (b'a' + (num % 26) as u8) as char);
        num /= 26;
    }
    Path::new(&format!("{}{}", prefix, suffix)).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_split_name() {
        assert_eq!(
            make_split_name(None, 0, 3),
            PathBuf::from("./aaa.tif")
        );
        assert_eq!(
            make_split_name(Some("out-"), 1, 3),
            PathBuf::from("out-aab.tif")
        );
        assert_eq!(
            make_split_name(Some("out-"), 26, 3),
            PathBuf::from("out-aba.tif")
        );
    }

    #[test]
    fn test_needed_name_chars() {
        assert_eq!(needed_name_chars(1), 3);
        assert_eq!(needed_name_chars(26), 3);
        assert_eq!(needed_name_chars(26 * 26 * 26), 3);
        assert_eq!(needed_name_chars(26 * 26 * 26 + 1), 4);
    }
}
