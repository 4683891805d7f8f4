// Command-line front end for rolldelta.
//
// Subcommands:
//   encode  : write a patch from a source and target file
//   inspect : list the records of a patch file
//   config  : print format constants and enabled features
//
// Exit status is 0 on success, 1 on I/O or usage errors and 2 when no
// patch smaller than the target could be produced (store the target as-is).

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::hash::{MAX_MATCH, WINDOW};
use crate::io::{self as file_io, FileEncodeStats, IoError};
use crate::patch::encoder::{self, EncodeOptions, EncodeStats, MIN_INPUT_LEN};
use crate::patch::format::{ByteOrder, COPY_RECORD_LEN, LITERAL_HEADER_LEN, PatchRecords, Record};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const EXIT_OK: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_NOT_WORTHWHILE: i32 = 2;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Rolling-checksum binary delta encoder.
#[derive(Parser, Debug)]
#[command(
    name = "rolldelta",
    version,
    about = "Rolling-checksum binary delta encoder",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Encode a patch turning SOURCE into the target.
    Encode(EncodeArgs),
    /// List the records of a patch.
    Inspect(InspectArgs),
    /// Print format constants and build configuration.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ByteOrderArg {
    Le,
    Be,
    Native,
}

impl From<ByteOrderArg> for ByteOrder {
    fn from(arg: ByteOrderArg) -> Self {
        match arg {
            ByteOrderArg::Le => ByteOrder::Little,
            ByteOrderArg::Be => ByteOrder::Big,
            ByteOrderArg::Native => ByteOrder::Native,
        }
    }
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Source (old) file to copy from.
    #[arg(long, short = 's', value_hint = ValueHint::FilePath)]
    source: PathBuf,

    /// Target (new) file.
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Patch output file.
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write the patch to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Byte order of record fields.
    #[arg(long = "byte-order", value_enum, default_value_t = ByteOrderArg::Le)]
    byte_order: ByteOrderArg,

    /// Target file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Patch output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Patch file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Byte order the patch was written with.
    #[arg(long = "byte-order", value_enum, default_value_t = ByteOrderArg::Le)]
    byte_order: ByteOrderArg,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Encode,
    Inspect,
    Config,
}

#[derive(Debug)]
struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    byte_order: ByteOrder,
    source_file: Option<PathBuf>,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    json_output: bool,
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Config,
        use_stdout: false,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        byte_order: ByteOrder::default(),
        source_file: None,
        input_file: None,
        output_file: None,
        json_output: cli.json_output,
    };

    match cli.command {
        Cmd::Encode(args) => {
            opts.command = Command::Encode;
            opts.use_stdout = args.stdout;
            opts.byte_order = args.byte_order.into();
            opts.source_file = Some(args.source);
            opts.input_file = args.input.or(args.input_pos);
            opts.output_file = args.output.or(args.output_pos);
        }
        Cmd::Inspect(args) => {
            opts.command = Command::Inspect;
            opts.byte_order = args.byte_order.into();
            opts.input_file = Some(args.input);
        }
        Cmd::Config => {}
    }
    opts
}

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("rolldelta version {version}");

    let file_io = cfg!(feature = "file-io") as u8;
    eprintln!("FILE_IO={file_io}");
    eprintln!("WINDOW={WINDOW}");
    eprintln!("MIN_INPUT_LEN={MIN_INPUT_LEN}");
    eprintln!("MAX_RECORD_LEN={MAX_MATCH}");
    eprintln!("LITERAL_HEADER_LEN={LITERAL_HEADER_LEN}");
    eprintln!("COPY_RECORD_LEN={COPY_RECORD_LEN}");
    eprintln!("CHECKSUM_BUCKETS={}", crate::hash::rolling::CHECKSUM_SPACE);
    eprintln!("DEFAULT_BYTE_ORDER={}", ByteOrder::default().name());

    EXIT_OK
}

// ---------------------------------------------------------------------------
// Encode command
// ---------------------------------------------------------------------------

fn encode_exit_code(e: &IoError) -> i32 {
    if e.is_not_worthwhile() {
        EXIT_NOT_WORTHWHILE
    } else {
        EXIT_ERROR
    }
}

fn cmd_encode(opts: &Options) -> i32 {
    let Some(source_path) = opts.source_file.as_deref() else {
        eprintln!("rolldelta: encode: --source is required");
        return EXIT_ERROR;
    };
    let Some(target_path) = opts.input_file.as_deref() else {
        eprintln!("rolldelta: encode: no target file given");
        return EXIT_ERROR;
    };
    let encode_opts = EncodeOptions {
        byte_order: opts.byte_order,
    };

    if opts.use_stdout {
        return encode_to_stdout(opts, source_path, target_path, &encode_opts);
    }

    let Some(patch_path) = opts.output_file.as_deref() else {
        eprintln!("rolldelta: encode: no output file given (use -c for stdout)");
        return EXIT_ERROR;
    };
    if patch_path.exists() && !opts.force {
        eprintln!(
            "rolldelta: output file exists, use -f to overwrite: {}",
            patch_path.display()
        );
        return EXIT_ERROR;
    }

    match file_io::encode_file(source_path, target_path, patch_path, &encode_opts) {
        Ok(stats) => {
            report_encode(opts, &stats);
            EXIT_OK
        }
        Err(e) => {
            if !opts.quiet {
                eprintln!("rolldelta: {e}");
            }
            encode_exit_code(&e)
        }
    }
}

// The patch is built in memory so nothing reaches stdout unless it is
// complete.
fn encode_to_stdout(
    opts: &Options,
    source_path: &Path,
    target_path: &Path,
    encode_opts: &EncodeOptions,
) -> i32 {
    let read = |path: &Path, what: &str| {
        fs::read(path).map_err(|e| eprintln!("rolldelta: {what} file: {}: {e}", path.display()))
    };
    let Ok(source) = read(source_path, "source") else {
        return EXIT_ERROR;
    };
    let Ok(target) = read(target_path, "target") else {
        return EXIT_ERROR;
    };

    let mut patch = Vec::new();
    let stats = match encoder::encode_with_options(&source, &target, &mut patch, encode_opts) {
        Ok(stats) => stats,
        Err(e) => {
            if !opts.quiet {
                eprintln!("rolldelta: encode error: {e}");
            }
            return encode_exit_code(&IoError::Encode(e));
        }
    };

    let mut out = io::stdout().lock();
    if let Err(e) = out.write_all(&patch).and_then(|()| out.flush()) {
        eprintln!("rolldelta: write error: {e}");
        return EXIT_ERROR;
    }

    report_encode(
        opts,
        &FileEncodeStats {
            source_size: source.len() as u64,
            target_size: target.len() as u64,
            patch: stats,
            source_sha256: None,
            target_sha256: None,
        },
    );
    EXIT_OK
}

fn report_encode(opts: &Options, stats: &FileEncodeStats) {
    let EncodeStats {
        patch_len,
        literal_records,
        literal_bytes,
        copy_records,
        copied_bytes,
    } = stats.patch;

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "rolldelta: encoder: source size: {}, target size: {}, patch size: {patch_len}, \
             copies: {copy_records} ({copied_bytes} bytes), literals: {literal_records} ({literal_bytes} bytes)",
            stats.source_size, stats.target_size
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "encode",
            "source_size": stats.source_size,
            "target_size": stats.target_size,
            "patch_size": patch_len,
            "copy_records": copy_records,
            "copied_bytes": copied_bytes,
            "literal_records": literal_records,
            "literal_bytes": literal_bytes,
            "byte_order": opts.byte_order.name(),
            "source_sha256": stats.source_sha256.as_ref().map(|d| file_io::hex(d)),
            "target_sha256": stats.target_sha256.as_ref().map(|d| file_io::hex(d)),
        });
        match serde_json::to_string_pretty(&json) {
            Ok(s) => eprintln!("{s}"),
            Err(e) => eprintln!("rolldelta: json error: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Inspect command
// ---------------------------------------------------------------------------

fn cmd_inspect(opts: &Options) -> i32 {
    let Some(path) = opts.input_file.as_deref() else {
        eprintln!("rolldelta: inspect: no patch file given");
        return EXIT_ERROR;
    };
    let patch = match fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("rolldelta: input file: {}: {e}", path.display());
            return EXIT_ERROR;
        }
    };

    let mut out = io::stdout().lock();
    let mut records = PatchRecords::new(&patch, opts.byte_order);
    let mut target_len = 0u64;
    let mut copies = 0u64;
    let mut literals = 0u64;

    loop {
        let at = records.position();
        let record = match records.next() {
            None => break,
            Some(Ok(r)) => r,
            Some(Err(e)) => {
                eprintln!("rolldelta: {}: {e}", path.display());
                return EXIT_ERROR;
            }
        };

        let line = match record {
            Record::Literal(data) => {
                literals += 1;
                format!("{at:>10}  LITERAL {:>5}  @target {target_len}", data.len())
            }
            Record::Copy { offset, len } => {
                copies += 1;
                format!("{at:>10}  COPY    {len:>5}  @target {target_len}  source {offset}")
            }
        };
        target_len += record.target_len() as u64;

        if !opts.quiet
            && let Err(e) = writeln!(out, "{line}")
        {
            eprintln!("rolldelta: write error: {e}");
            return EXIT_ERROR;
        }
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "rolldelta: patch size: {}, target size: {target_len}, copies: {copies}, literals: {literals}",
            patch.len()
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "inspect",
            "patch_size": patch.len(),
            "target_size": target_len,
            "copy_records": copies,
            "literal_records": literals,
        });
        match serde_json::to_string_pretty(&json) {
            Ok(s) => eprintln!("{s}"),
            Err(e) => eprintln!("rolldelta: json error: {e}"),
        }
    }

    EXIT_OK
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(opts.verbose)),
    )
    .format_timestamp(None)
    .format_target(false)
    .init();

    // Warn if -c overrides output filename.
    if opts.use_stdout
        && let Some(path) = opts.output_file.take()
        && !opts.quiet
    {
        eprintln!(
            "rolldelta: warning: -c option overrides output filename: {}",
            path.display()
        );
    }

    let exit_code = match opts.command {
        Command::Encode => cmd_encode(&opts),
        Command::Inspect => cmd_inspect(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
