//! The set command
//!
//! Inserts, replaces, removes or copies tag entries in a TIFF file, then
//! re-emits it. Tag specs take the form `TAG[:DATATYPE][,IFD-#]` with
//! case-insensitive symbolic names resolved through the registry.

use clap::ArgMatches;
use log::{info, warn};

use crate::commands::command_traits::{Command, GlobalWriteFlags};
use crate::tiff::constants::{self, TagSetId};
use crate::tiff::datatype::Datatype;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::TagEntry;
use crate::tiff::reader::read_tiff;
use crate::tiff::types::TiffInfo;
use crate::tiff::writer::TiffWriter;
use crate::utils::logger::Logger;
use crate::utils::value_utils::{self, ValueSource};

/// A parsed `TAG[:DATATYPE][,IFD-#]` directive target
struct TagSpec {
    tag: u16,
    descriptor: Option<&'static constants::TagDescriptor>,
    datatype: Option<Datatype>,
    ifd_index: usize,
}

/// Command to set or unset tags in a TIFF file
pub struct SetCommand<'a> {
    source: String,
    output: String,
    set_list: Vec<(String, String)>,
    unset_list: Vec<String>,
    setfrom_list: Vec<(String, String)>,
    overwrite: bool,
    flags: GlobalWriteFlags,
    logger: &'a Logger,
}

impl<'a> SetCommand<'a> {
    /// Create a new set command from CLI arguments
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> TiffResult<Self> {
        let source = args
            .get_one::<String>("source")
            .cloned()
            .ok_or_else(|| TiffError::UsageError("set requires a source".into()))?;
        let output = args
            .get_one::<String>("output")
            .cloned()
            .unwrap_or_else(|| source.clone());

        let pair_list = |name: &str| -> Vec<(String, String)> {
            args.get_occurrences::<String>(name)
                .map(|occurrences| {
                    occurrences
                        .map(|mut pair| {
                            let first = pair.next().cloned().unwrap_or_default();
                            let second = pair.next().cloned().unwrap_or_default();
                            (first, second)
                        })
                        .collect()
                })
                .unwrap_or_default()
        };

        Ok(SetCommand {
            source,
            output,
            set_list: pair_list("set"),
            unset_list: args
                .get_many::<String>("unset")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            setfrom_list: pair_list("setfrom"),
            overwrite: args.get_flag("overwrite"),
            flags: GlobalWriteFlags::from_args(args),
            logger,
        })
    }

    /// Parses a `TAG[:DATATYPE][,IFD-#]` spec against a model
    fn parse_tagspec(spec: &str, info: &TiffInfo) -> TiffResult<TagSpec> {
        let (tag_part, ifd_index) = match spec.split_once(',') {
            Some((tag_part, ifd_part)) => {
                let index = ifd_part.trim().parse::<usize>().map_err(|_| {
                    TiffError::UsageError(format!("Invalid IFD index in tag spec '{}'", spec))
                })?;
                (tag_part, index)
            }
            None => (spec, 0),
        };
        let (name_part, datatype) = match tag_part.split_once(':') {
            Some((name_part, datatype_part)) => {
                let datatype = Datatype::from_name(datatype_part).ok_or_else(|| {
                    TiffError::UnknownTag(format!("Unknown datatype {}", datatype_part))
                })?;
                (name_part, Some(datatype))
            }
            None => (tag_part, None),
        };
        if ifd_index >= info.ifds.len() {
            return Err(TiffError::UsageError(format!(
                "IFD {} does not exist (file has {} IFDs)",
                ifd_index,
                info.ifds.len()
            )));
        }
        let (tag, descriptor) =
            constants::resolve_tag(name_part, constants::tag_set(TagSetId::Tiff))?;
        Ok(TagSpec {
            tag,
            descriptor,
            datatype,
            ifd_index,
        })
    }
}

impl<'a> Command for SetCommand<'a> {
    fn execute(&self) -> TiffResult<()> {
        if std::path::Path::new(&self.output).exists() && !self.overwrite {
            return Err(TiffError::OutputExists(self.output.clone()));
        }

        let mut info = read_tiff(&self.source, self.logger)?;
        let handler = info.handler();

        for spec_text in &self.unset_list {
            let spec = Self::parse_tagspec(spec_text, &info)?;
            if info.ifds[spec.ifd_index].remove_entry(spec.tag).is_none() {
                info!("Tag {} is not present", spec_text);
            }
        }

        for (spec_text, value) in &self.set_list {
            let spec = Self::parse_tagspec(spec_text, &info)?;
            let source = value_utils::load_source(value)?;
            let (datatype, bytes) =
                value_utils::parse_value(&source, spec.datatype, spec.descriptor, handler.as_ref())?;
            if let (Some(desc), ValueSource::Text(_)) = (spec.descriptor, &source) {
                if !desc.enum_values.is_empty() {
                    let entry = TagEntry::new_raw(spec.tag, datatype, bytes.clone());
                    if let Some(values) = entry.decoded_u64s(handler.as_ref()) {
                        for v in values {
                            if desc.enum_name(v).is_none() {
                                warn!("Value {} is not in known values for tag {}", v, desc.name);
                            }
                        }
                    }
                }
            }
            info.ifds[spec.ifd_index].add_entry(TagEntry::new_raw(spec.tag, datatype, bytes));
        }

        for (spec_text, path) in &self.setfrom_list {
            let spec = Self::parse_tagspec(spec_text, &info)?;
            let other = read_tiff(path, self.logger)?;
            let donor = other
                .ifds
                .first()
                .and_then(|ifd| ifd.get_entry(spec.tag))
                .cloned();
            match donor {
                Some(mut entry) => {
                    if other.big_endian != info.big_endian && entry.raw().is_some() {
                        let swapped = entry.payload_in_order(other.big_endian, info.big_endian);
                        entry = TagEntry::new_raw(spec.tag, entry.datatype, swapped);
                    }
                    info.ifds[spec.ifd_index].add_entry(entry);
                }
                None => warn!("Tag {} is not in {}", spec_text, path),
            }
        }

        TiffWriter::write(
            &info,
            &self.output,
            &self.flags.write_options(self.overwrite),
        )
    }
}
