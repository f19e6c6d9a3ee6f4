//! Library facade
//!
//! High-level entry points mirroring the CLI: read and write whole files,
//! dump, split, concat and set. Each function owns its logging setup so
//! embedders do not need to touch the CLI layer.

use std::io::Write;
use std::path::Path;

use crate::tiff::constants::tags;
use crate::tiff::dump::{self, DumpOptions};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::reader;
use crate::tiff::types::TiffInfo;
use crate::tiff::writer::{TiffWriter, WriteOptions};
use crate::utils::logger::Logger;

/// Main interface to the tiffkit library
pub struct Tiffkit {
    logger: Logger,
}

impl Tiffkit {
    /// Create a new instance logging to the given file
    ///
    /// # Arguments
    /// * `log_file` - Optional path to log file; stderr-only when None
    pub fn new(log_file: Option<&str>) -> TiffResult<Self> {
        let logger = match log_file {
            Some(path) => Logger::new(path)?,
            None => Logger::stderr_only(),
        };
        Ok(Tiffkit { logger })
    }

    /// Reads the non-imaging structure of a TIFF file into the model
    pub fn read_tiff<P: AsRef<Path>>(&self, path: P) -> TiffResult<TiffInfo> {
        reader::read_tiff(path, &self.logger)
    }

    /// Writes a model back to disk
    pub fn write_tiff<P: AsRef<Path>>(
        &self,
        info: &TiffInfo,
        path: P,
        options: &WriteOptions,
    ) -> TiffResult<()> {
        TiffWriter::write(info, path, options)
    }

    /// Renders the structure of a file to a stream
    pub fn dump<P: AsRef<Path>>(
        &self,
        path: P,
        options: &DumpOptions,
        dest: &mut dyn Write,
    ) -> TiffResult<()> {
        let info = self.read_tiff(path)?;
        dump::dump_info(&info, options, dest)
    }

    /// Splits a file into one output per top-level IFD
    ///
    /// Returns the number of files written. Output names are the prefix
    /// followed by at least three base-26 letters and `.tif`.
    pub fn split<P: AsRef<Path>>(
        &self,
        source: P,
        prefix: Option<&str>,
        subifds: bool,
        overwrite: bool,
    ) -> TiffResult<usize> {
        use crate::commands::split_command::SplitCommand;
        SplitCommand::run(
            source.as_ref(),
            prefix,
            subifds,
            overwrite,
            &WriteOptions::default(),
            &self.logger,
        )
    }

    /// Concatenates the IFD chains of several files into one output
    pub fn concat<P: AsRef<Path>>(
        &self,
        sources: &[P],
        output: P,
        overwrite: bool,
    ) -> TiffResult<()> {
        let mut ifds = Vec::new();
        let mut big_endian = None;
        let mut big_tiff = false;
        for source in sources {
            let info = self.read_tiff(source)?;
            big_endian.get_or_insert(info.big_endian);
            big_tiff |= info.big_tiff;
            ifds.extend(info.ifds);
        }
        TiffWriter::write_ifds(
            &ifds,
            big_endian.unwrap_or(false),
            big_tiff,
            output,
            &WriteOptions {
                allow_existing: overwrite,
                ..WriteOptions::default()
            },
        )
    }

    /// Removes a tag from the first IFD and rewrites the file
    pub fn unset_tag<P: AsRef<Path>>(&self, source: P, output: P, tag: u16) -> TiffResult<()> {
        let mut info = self.read_tiff(&source)?;
        let ifd = info
            .ifds
            .first_mut()
            .ok_or_else(|| TiffError::GenericError("File has no IFDs".to_string()))?;
        ifd.remove_entry(tag);
        self.write_tiff(
            &info,
            output,
            &WriteOptions {
                allow_existing: true,
                ..WriteOptions::default()
            },
        )
    }

    /// The tag IDs the reader treats as SubIFD containers by default
    pub fn sub_ifd_tags(&self) -> Vec<u16> {
        vec![
            tags::SUB_IFD,
            tags::EXIF_IFD,
            tags::GPS_IFD,
            tags::INTEROPERABILITY_IFD,
        ]
    }
}
