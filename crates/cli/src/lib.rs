#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` implements the `rbh-sync` command line: it reads every entry of a
//! SOURCE store and upserts it into a DEST store, both named by robinhood
//! URIs. The binary in the root package wires [`run`] into `main`.
//!
//! # Design
//!
//! A [`clap`](https://docs.rs/clap/) builder command parses the flags into
//! a private `ParsedArgs` structure. [`run`] then configures logging,
//! resolves the field projection and the synchronisation mode, opens both
//! stores through [`backend::open`] and hands them to [`engine::sync`].
//!
//! Field arguments are applied in order. `+FIELD` adds to the projection,
//! `-FIELD` removes from it and a bare `FIELD` selects it; when any argument
//! is bare the projection starts empty, otherwise it starts from every field.
//!
//! # Errors
//!
//! Usage errors (bad flags, missing operands, malformed URIs or field names)
//! exit with status `64`. Store diagnostics are reported as unhandled errors
//! and every other failure as a plain diagnostic, both with status `1`.
//!
//! # Examples
//!
//! ```
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let exit_code = cli::run(["rbh-sync", "--version"], &mut stdout, &mut stderr);
//!
//! assert_eq!(exit_code, 0);
//! assert!(String::from_utf8(stdout).unwrap().starts_with("rbh-sync "));
//! ```

mod args;

use std::ffi::OsString;
use std::io::Write;

use backend::Uri;
use engine::{EXIT_OK, EXIT_USAGE, Locator, SyncError, SyncMode, SyncOptions};
use fsentry::{FieldMask, FieldParseError, Projection, parse_field};
use logging::{VerbosityConfig, init_tracing, trace_sync};

use crate::args::{PROGRAM_NAME, ParsedArgs, parse_args};

/// Maximum exit code representable by a Unix process.
const MAX_EXIT_CODE: i32 = u8::MAX as i32;

/// Help text describing the command line and the URI grammar.
const HELP_TEXT: &str = concat!(
    "usage: rbh-sync [-hVvqos] [--log AREA[=LEVEL]]... [-f [+|-]FIELD]... [-c N] SOURCE DEST\n",
    "\n",
    "Upsert SOURCE's entries into DEST.\n",
    "\n",
    "Positional arguments:\n",
    "    SOURCE  a robinhood URI\n",
    "    DEST    a robinhood URI\n",
    "\n",
    "Options:\n",
    "    -h, --help              show this help message and exit\n",
    "    -V, --version           output version information and exit\n",
    "    -v, --verbose           increase logging verbosity; may be repeated\n",
    "    -q, --quiet             suppress all diagnostics, including warnings\n",
    "        --log AREA[=LEVEL]  set the level of one logging area (source,\n",
    "                            convert, chunk, commit, sync, backend)\n",
    "    -o, --one               only synchronize the entry SOURCE designates\n",
    "    -s, --stats             print a summary of the run\n",
    "    -f, --field [+|-]FIELD  add, remove or select a field to synchronize\n",
    "    -c, --chunk-size N      deliver events to DEST in batches of at most N\n",
    "\n",
    "A robinhood URI is built as follows:\n",
    "    rbh:BACKEND:FSNAME[#{PATH|[ID]}]\n",
    "where:\n",
    "    BACKEND  is the name of a backend (memory, json)\n",
    "    FSNAME   is the name of a filesystem for BACKEND\n",
    "    PATH/ID  is the path/id of an fsentry managed by BACKEND:FSNAME (ID must\n",
    "             be enclosed in square brackets '[ID]' to distinguish it from a\n",
    "             path)\n",
    "\n",
    "FIELD is one of id, parent-id, name, statx[.ATTR], symlink, xattrs[.KEY]\n",
    "or ns-xattrs[.KEY].\n",
);

/// Converts a numeric exit code into an [`std::process::ExitCode`].
#[must_use]
pub fn exit_code_from(status: i32) -> std::process::ExitCode {
    let clamped = status.clamp(0, MAX_EXIT_CODE);
    std::process::ExitCode::from(clamped as u8)
}

/// Runs the CLI using the provided argument iterator and output handles.
///
/// Returns the process exit code: `0` on success, `1` when the run fails and
/// `64` on usage errors.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    match parse_args(arguments) {
        Ok(parsed) => execute(parsed, stdout, stderr),
        Err(error) => {
            let _ = write!(stderr, "{error}");
            EXIT_USAGE
        }
    }
}

fn execute<Out, Err>(parsed: ParsedArgs, stdout: &mut Out, stderr: &mut Err) -> i32
where
    Out: Write,
    Err: Write,
{
    if parsed.show_help {
        let _ = stdout.write_all(HELP_TEXT.as_bytes());
        return EXIT_OK;
    }
    if parsed.show_version {
        let _ = writeln!(stdout, "{PROGRAM_NAME} {}", env!("CARGO_PKG_VERSION"));
        return EXIT_OK;
    }

    let mut verbosity = if parsed.quiet {
        VerbosityConfig::quiet()
    } else {
        VerbosityConfig::from_verbose_level(parsed.verbose)
    };
    for token in &parsed.log {
        if let Err(message) = verbosity.apply_area_token(token) {
            return usage_error(stderr, &message);
        }
    }
    init_tracing(&verbosity);

    let Some(source) = parsed.source.as_deref() else {
        return usage_error(stderr, "missing SOURCE argument");
    };
    let Some(dest) = parsed.dest.as_deref() else {
        return usage_error(stderr, "missing DEST argument");
    };

    let options = match build_options(&parsed, source) {
        Ok(options) => options,
        Err(error) => return report(stderr, &error),
    };
    let dest: Uri = match dest.parse() {
        Ok(uri) => uri,
        Err(error) => return report(stderr, &SyncError::from(error)),
    };

    match synchronize(source, &dest, &options) {
        Ok(stats) => {
            trace_sync!(
                converted = stats.converted,
                skipped = stats.skipped,
                batches = stats.batches,
                applied = stats.applied,
                "{stats}"
            );
            if parsed.stats {
                let _ = writeln!(stdout, "{stats}");
            }
            EXIT_OK
        }
        Err(error) => report(stderr, &error),
    }
}

/// Opens both stores and runs the synchronisation.
fn synchronize(source: &str, dest: &Uri, options: &SyncOptions) -> Result<engine::SyncStats, SyncError> {
    let source: Uri = source.parse()?;
    let from = backend::open(&source)?;
    let mut to = backend::open(dest)?;
    trace_sync!(%source, %dest, mode = %options.mode, "starting synchronisation");
    engine::sync(from.as_source(), to.as_destination(), options)
}

/// Resolves the projection, batch size and mode from the command line.
fn build_options(parsed: &ParsedArgs, source: &str) -> Result<SyncOptions, SyncError> {
    let uri: Uri = source.parse()?;
    let projection = build_projection(&parsed.fields)
        .map_err(|error| SyncError::Usage(error.to_string()))?;

    let mode = match (parsed.one, uri.fragment) {
        (true, fragment) => SyncMode::One(fragment.unwrap_or_else(Locator::root)),
        (false, Some(fragment)) => SyncMode::Branch(fragment),
        (false, None) => SyncMode::Tree,
    };

    let mut options = SyncOptions::default().with_projection(projection).with_mode(mode);
    if let Some(chunk_size) = parsed.chunk_size {
        options = options.with_chunk_size(chunk_size);
    }
    Ok(options)
}

/// Applies `+FIELD`, `-FIELD` and bare `FIELD` arguments in order.
///
/// The identifier is always requested: an entry without one is skipped by the
/// converter.
fn build_projection(fields: &[String]) -> Result<Projection, FieldParseError> {
    let selects = fields
        .iter()
        .any(|field| !field.starts_with('+') && !field.starts_with('-'));
    let mut projection = if selects {
        Projection::none()
    } else {
        Projection::default()
    };

    for field in fields {
        if let Some(name) = field.strip_prefix('-') {
            projection.remove(&parse_field(name)?);
        } else {
            let name = field.strip_prefix('+').unwrap_or(field);
            projection.add(&parse_field(name)?);
        }
    }
    projection.fields |= FieldMask::ID;
    Ok(projection)
}

fn usage_error<Err: Write>(stderr: &mut Err, message: &str) -> i32 {
    let _ = stderr.write_all(HELP_TEXT.as_bytes());
    let _ = writeln!(stderr, "{PROGRAM_NAME}: {message}");
    EXIT_USAGE
}

fn report<Err: Write>(stderr: &mut Err, error: &SyncError) -> i32 {
    let _ = if error.is_backend() {
        writeln!(stderr, "{PROGRAM_NAME}: unhandled error: {error}")
    } else {
        writeln!(stderr, "{PROGRAM_NAME}: {error}")
    };
    error.exit_code()
}
