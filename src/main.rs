use clap::{Arg, ArgAction, Command as ClapCommand};
use log::{error, LevelFilter};
use std::process;

use tiffkit::commands::{CommandFactory, TiffkitCommandFactory};
use tiffkit::utils::logger::Logger;

/// Flags shared by every subcommand
fn common_args(command: ClapCommand) -> ClapCommand {
    command
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase output")
                .action(ArgAction::Count)
                .global(false),
        )
        .arg(
            Arg::new("bigtiff")
                .short('8')
                .long("bigtiff")
                .help("Output as bigtiff")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("classic")
                .short('4')
                .long("classic")
                .help("Output as classic tiff if small enough")
                .action(ArgAction::SetTrue)
                .conflicts_with("bigtiff"),
        )
        .arg(
            Arg::new("ifds-first")
                .long("ifds-first")
                .help("Store IFDs before their related data")
                .action(ArgAction::SetTrue),
        )
}

fn build_cli() -> ClapCommand {
    let dump = common_args(
        ClapCommand::new("dump")
            .visible_alias("info")
            .about("Print contents of a TIFF file")
            .arg(
                Arg::new("source")
                    .help("Source file(s)")
                    .required(true)
                    .num_args(1..),
            )
            .arg(
                Arg::new("max")
                    .short('m')
                    .long("max")
                    .help("Maximum items to display")
                    .value_parser(clap::value_parser!(usize))
                    .default_value("20"),
            )
            .arg(
                Arg::new("max-text")
                    .long("max-text")
                    .help("Maximum length of a text record to display")
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                Arg::new("json")
                    .long("json")
                    .help("Output as json")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("yaml")
                    .long("yaml")
                    .help("Output as yaml")
                    .action(ArgAction::SetTrue)
                    .conflicts_with("json"),
            ),
    );

    let split = common_args(
        ClapCommand::new("split")
            .about("Split IFDs into separate files")
            .arg(Arg::new("source").help("Source file to split").required(true))
            .arg(Arg::new("prefix").help("Prefix of split files"))
            .arg(
                Arg::new("subifds")
                    .long("subifds")
                    .help("Split each subifd to its own file")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("overwrite")
                    .short('y')
                    .long("overwrite")
                    .help("Allow overwriting an existing output file")
                    .action(ArgAction::SetTrue),
            ),
    );

    let concat = common_args(
        ClapCommand::new("concat")
            .visible_alias("merge")
            .about("Concatenate multiple files into a single TIFF")
            .arg(
                Arg::new("files")
                    .help("Source files followed by the output file")
                    .required(true)
                    .num_args(2..),
            )
            .arg(
                Arg::new("overwrite")
                    .short('y')
                    .long("overwrite")
                    .help("Allow overwriting an existing output file")
                    .action(ArgAction::SetTrue),
            ),
    );

    let set = common_args(
        ClapCommand::new("set")
            .about("Set tags in a TIFF file")
            .arg(Arg::new("source").help("Source file").required(true))
            .arg(Arg::new("output").help("Output file; the source is rewritten if omitted"))
            .arg(
                Arg::new("set")
                    .short('s')
                    .long("set")
                    .help("Set a tag: TAG[:DATATYPE][,IFD-#] VALUE")
                    .num_args(2)
                    .value_names(["TAG", "VALUE"])
                    .action(ArgAction::Append),
            )
            .arg(
                Arg::new("unset")
                    .short('u')
                    .long("unset")
                    .help("Unset a tag: TAG[,IFD-#]")
                    .action(ArgAction::Append),
            )
            .arg(
                Arg::new("setfrom")
                    .short('f')
                    .long("setfrom")
                    .alias("set-from")
                    .help("Set a tag, reading the value from another TIFF file")
                    .num_args(2)
                    .value_names(["TAG", "TIFFPATH"])
                    .action(ArgAction::Append),
            )
            .arg(
                Arg::new("overwrite")
                    .short('y')
                    .long("overwrite")
                    .help("Allow overwriting an existing output file")
                    .action(ArgAction::SetTrue),
            ),
    );

    ClapCommand::new("tiffkit")
        .version("1.0")
        .author("Maurice Schilpp")
        .about("Inspect, split, merge and edit TIFF/BigTIFF file structure")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(dump)
        .subcommand(split)
        .subcommand(concat)
        .subcommand(set)
}

fn main() {
    let matches = build_cli().get_matches();

    let verbose = matches
        .subcommand()
        .map(|(_, sub)| sub.get_count("verbose"))
        .unwrap_or(0);
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    let logger = match Logger::new("tiffkit.log") {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error initializing logger: {}", e);
            process::exit(2);
        }
    };
    if let Err(e) = Logger::init_global_logger("tiffkit-global.log", level) {
        eprintln!("Error setting up global logger: {}", e);
        process::exit(2);
    }

    let factory = TiffkitCommandFactory::new();
    let result = factory.create_command(&matches, &logger);
    match result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(e.exit_code());
            }
        }
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    };
}
