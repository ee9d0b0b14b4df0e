//! crates/cli/src/args.rs
//! Command definition and the parsed form of a command line.

use std::ffi::OsString;
use std::num::NonZeroUsize;

use clap::{Arg, ArgAction, Command, value_parser};

/// Name used in diagnostics when the command line carries none.
pub(crate) const PROGRAM_NAME: &str = "rbh-sync";

/// Parsed command produced by [`parse_args`].
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs {
    pub(crate) show_help: bool,
    pub(crate) show_version: bool,
    pub(crate) verbose: u8,
    pub(crate) quiet: bool,
    pub(crate) log: Vec<String>,
    pub(crate) one: bool,
    pub(crate) stats: bool,
    pub(crate) fields: Vec<String>,
    pub(crate) chunk_size: Option<NonZeroUsize>,
    pub(crate) source: Option<String>,
    pub(crate) dest: Option<String>,
}

/// Builds the `clap` command used for parsing.
fn clap_command() -> Command {
    Command::new(PROGRAM_NAME)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg_required_else_help(false)
        .arg(
            Arg::new("help")
                .long("help")
                .short('h')
                .help("Show this help message and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .short('V')
                .help("Output version information and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase logging verbosity; may be repeated.")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Suppress all diagnostics, including warnings.")
                .conflicts_with("verbose")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .value_name("AREA[=LEVEL]")
                .help("Set the level of one logging area.")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("one")
                .long("one")
                .short('o')
                .help("Synchronize only the entry designated by SOURCE.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .short('s')
                .help("Print a summary of the run.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("field")
                .long("field")
                .short('f')
                .value_name("[+|-]FIELD")
                .help("Add, remove or select a field to synchronize.")
                .allow_hyphen_values(true)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("chunk-size")
                .long("chunk-size")
                .short('c')
                .value_name("N")
                .help("Deliver events to DEST in batches of at most N.")
                .value_parser(value_parser!(NonZeroUsize))
                .action(ArgAction::Set),
        )
        .arg(Arg::new("source").value_name("SOURCE").action(ArgAction::Set))
        .arg(Arg::new("dest").value_name("DEST").action(ArgAction::Set))
}

/// Parses command-line arguments into a [`ParsedArgs`] structure.
pub(crate) fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();

    if args.is_empty() {
        args.push(OsString::from(PROGRAM_NAME));
    }

    let mut matches = clap_command().try_get_matches_from(args)?;

    let strings = |values: Option<clap::parser::Values<String>>| -> Vec<String> {
        values.map(Iterator::collect).unwrap_or_default()
    };

    Ok(ParsedArgs {
        show_help: matches.get_flag("help"),
        show_version: matches.get_flag("version"),
        verbose: matches.get_count("verbose"),
        quiet: matches.get_flag("quiet"),
        log: strings(matches.remove_many::<String>("log")),
        one: matches.get_flag("one"),
        stats: matches.get_flag("stats"),
        fields: strings(matches.remove_many::<String>("field")),
        chunk_size: matches.remove_one::<NonZeroUsize>("chunk-size"),
        source: matches.remove_one::<String>("source"),
        dest: matches.remove_one::<String>("dest"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_operands() {
        let parsed = parse_args(["rbh-sync", "rbh:json:a", "rbh:json:b"]).expect("parse");

        assert_eq!(parsed.source.as_deref(), Some("rbh:json:a"));
        assert_eq!(parsed.dest.as_deref(), Some("rbh:json:b"));
        assert_eq!(parsed.verbose, 0);
        assert!(!parsed.one);
        assert!(parsed.fields.is_empty());
        assert_eq!(parsed.chunk_size, None);
    }

    #[test]
    fn field_values_may_start_with_a_dash() {
        let parsed = parse_args([
            "rbh-sync",
            "-f",
            "-statx",
            "--field",
            "+xattrs.user.tag",
            "--field=-symlink",
            "a",
            "b",
        ])
        .expect("parse");

        assert_eq!(parsed.fields, ["-statx", "+xattrs.user.tag", "-symlink"]);
        assert_eq!(parsed.source.as_deref(), Some("a"));
    }

    #[test]
    fn verbosity_counts_and_log_areas() {
        let parsed = parse_args(["rbh-sync", "-vv", "--log", "convert=trace", "a", "b"]).expect("parse");

        assert_eq!(parsed.verbose, 2);
        assert_eq!(parsed.log, ["convert=trace"]);
    }

    #[test]
    fn chunk_size_must_be_positive() {
        let parsed = parse_args(["rbh-sync", "-c", "3", "a", "b"]).expect("parse");
        assert_eq!(parsed.chunk_size, NonZeroUsize::new(3));

        assert!(parse_args(["rbh-sync", "-c", "0", "a", "b"]).is_err());
        assert!(parse_args(["rbh-sync", "-c", "many", "a", "b"]).is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(parse_args(["rbh-sync", "-q", "-v", "a", "b"]).is_err());
    }

    #[test]
    fn extra_operands_are_rejected() {
        assert!(parse_args(["rbh-sync", "a", "b", "c"]).is_err());
    }

    #[test]
    fn empty_argument_list_parses() {
        let parsed = parse_args(Vec::<OsString>::new()).expect("parse");
        assert!(parsed.source.is_none());
    }
}
