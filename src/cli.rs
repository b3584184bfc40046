// Command-line front end for deltaseal.
//
// Thin wrapper over the library: reads JSON or wire bytes from a file or
// stdin, runs one pipeline direction, and writes the result to a file or
// stdout. `inspect` prints per-stage byte counts and a round-trip check.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use serde_json::Value;

use crate::compact;
use crate::compress::Codec;
use crate::pipeline::{self, PipelineOptions, PipelineStats};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Compact, compress and encrypt vessel delta records.
#[derive(Parser, Debug)]
#[command(
    name = "deltaseal",
    version,
    about = "Compact, compress and encrypt vessel delta records",
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
    /// Encode JSON delta records into a wire payload.
    Encode(PipelineArgs),
    /// Decode a wire payload back into JSON delta records.
    Decode(DecodeArgs),
    /// Compact JSON delta records (no compression or encryption).
    Compact(TransformArgs),
    /// Expand compacted JSON records.
    Expand(ExpandArgs),
    /// Print per-stage sizes for a JSON input and verify the round trip.
    Inspect(InspectArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CodecArg {
    Brotli,
    Zlib,
    Lzma,
    None,
}

#[derive(Args, Debug)]
struct KeyArgs {
    /// 32-character secret key.
    #[arg(long, required_unless_present = "key_file", conflicts_with = "key_file")]
    key: Option<String>,

    /// File holding the secret key (trailing newline ignored).
    #[arg(long = "key-file", value_hint = ValueHint::FilePath)]
    key_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TuningArgs {
    /// Codec for both compression passes.
    #[arg(long, value_enum, default_value_t = CodecArg::Brotli)]
    codec: CodecArg,

    /// Quality of the JSON text pass.
    #[arg(long = "text-quality", value_parser = clap::value_parser!(u32).range(0..=11), default_value_t = 9)]
    text_quality: u32,

    /// Quality of the envelope pass.
    #[arg(long = "generic-quality", value_parser = clap::value_parser!(u32).range(0..=11), default_value_t = 8)]
    generic_quality: u32,

    /// Pass malformed compact fields through instead of failing.
    #[arg(long)]
    lenient: bool,
}

#[derive(Args, Debug)]
struct IoArgs {
    /// Input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PipelineArgs {
    #[command(flatten)]
    key: KeyArgs,

    #[command(flatten)]
    tuning: TuningArgs,

    #[command(flatten)]
    io: IoArgs,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    #[command(flatten)]
    pipeline: PipelineArgs,

    /// Indent the decoded JSON.
    #[arg(long)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct TransformArgs {
    #[command(flatten)]
    io: IoArgs,

    /// Indent the output JSON.
    #[arg(long)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct ExpandArgs {
    #[command(flatten)]
    transform: TransformArgs,

    /// Fail on abbreviated fields of the wrong shape.
    #[arg(long)]
    strict: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[command(flatten)]
    key: KeyArgs,

    #[command(flatten)]
    tuning: TuningArgs,

    /// JSON records file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Globals {
    force: bool,
    quiet: bool,
    json_output: bool,
}

fn resolve_key(args: &KeyArgs) -> Result<String, String> {
    match (&args.key, &args.key_file) {
        (Some(key), _) => Ok(key.clone()),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map(|s| s.trim_end_matches(['\r', '\n']).to_string())
            .map_err(|e| format!("key file: {}: {e}", path.display())),
        (None, None) => Err("a key is required (--key or --key-file)".into()),
    }
}

fn build_options(tuning: &TuningArgs) -> Result<PipelineOptions, String> {
    let name = match tuning.codec {
        CodecArg::Brotli => "brotli",
        CodecArg::Zlib => "zlib",
        CodecArg::Lzma => "lzma",
        CodecArg::None => "none",
    };
    let codec = Codec::from_name(name).map_err(|e| e.to_string())?;
    Ok(PipelineOptions {
        codec,
        text_quality: tuning.text_quality,
        generic_quality: tuning.generic_quality,
        strict_schema: !tuning.lenient,
    })
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>, String> {
    let mut data = Vec::new();
    match path {
        Some(path) => {
            let mut file =
                File::open(path).map_err(|e| format!("input file: {}: {e}", path.display()))?;
            file.read_to_end(&mut data)
                .map_err(|e| format!("read error: {e}"))?;
        }
        None => {
            io::stdin()
                .lock()
                .read_to_end(&mut data)
                .map_err(|e| format!("read error: {e}"))?;
        }
    }
    Ok(data)
}

fn read_json(path: Option<&Path>) -> Result<Value, String> {
    let data = read_input(path)?;
    serde_json::from_slice(&data).map_err(|e| format!("input is not JSON: {e}"))
}

fn check_overwrite(path: &Path, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!(
            "output file exists, use -f to overwrite: {}",
            path.display()
        ));
    }
    Ok(())
}

fn write_output(path: Option<&Path>, data: &[u8], force: bool) -> Result<(), String> {
    let mut writer: Box<dyn Write> = match path {
        None => Box::new(BufWriter::with_capacity(BUF_SIZE, io::stdout().lock())),
        Some(path) => {
            check_overwrite(path, force)?;
            let file =
                File::create(path).map_err(|e| format!("output file: {}: {e}", path.display()))?;
            Box::new(BufWriter::with_capacity(BUF_SIZE, file))
        }
    };
    writer
        .write_all(data)
        .and_then(|()| writer.flush())
        .map_err(|e| format!("write error: {e}"))
}

fn to_json(value: &Value, pretty: bool) -> Result<Vec<u8>, String> {
    let result = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    };
    result.map_err(|e| format!("JSON output: {e}"))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_encode(args: &PipelineArgs, g: &Globals) -> Result<(), String> {
    let key = resolve_key(&args.key)?;
    let opts = build_options(&args.tuning)?;

    if let (Some(input), Some(output)) = (&args.io.input, &args.io.output) {
        check_overwrite(output, g.force)?;
        let stats = crate::io::encode_file(input, output, &key, &opts)
            .map_err(|e| format!("encode: {e}"))?;
        if let Some(digest) = stats.input_sha256 {
            log::info!("input sha256 {}", hex::encode(digest));
        }
        return report_encode(&stats.pipeline, &opts, g);
    }

    let records = read_json(args.io.input.as_deref())?;
    let (wire, stats) =
        pipeline::encode_with_stats(&records, &key, &opts).map_err(|e| format!("encode: {e}"))?;
    write_output(args.io.output.as_deref(), &wire, g.force)?;
    report_encode(&stats, &opts, g)
}

fn report_encode(stats: &PipelineStats, opts: &PipelineOptions, g: &Globals) -> Result<(), String> {
    log::info!(
        "encoded {} json bytes into {} wire bytes",
        stats.json_bytes,
        stats.wire_bytes()
    );
    if g.json_output {
        let json = serde_json::json!({
            "command": "encode",
            "records": stats.records,
            "json_bytes": stats.json_bytes,
            "wire_bytes": stats.wire_bytes(),
            "codec": format!("{:?}", opts.codec),
        });
        eprintln!("{json:#}");
    }
    Ok(())
}

fn cmd_decode(args: &DecodeArgs, g: &Globals) -> Result<(), String> {
    let p = &args.pipeline;
    let key = resolve_key(&p.key)?;
    let opts = build_options(&p.tuning)?;

    if let (Some(input), Some(output)) = (&p.io.input, &p.io.output) {
        check_overwrite(output, g.force)?;
        let stats = crate::io::decode_file(input, output, &key, &opts, args.pretty)
            .map_err(|e| format!("decode: {e}"))?;
        if let Some(digest) = stats.output_sha256 {
            log::info!("output sha256 {}", hex::encode(digest));
        }
        if g.json_output {
            let json = serde_json::json!({
                "command": "decode",
                "records": stats.records,
                "wire_bytes": stats.wire_size,
                "json_bytes": stats.output_size,
            });
            eprintln!("{json:#}");
        }
        return Ok(());
    }

    let wire = read_input(p.io.input.as_deref())?;

    let records =
        pipeline::decode_with_options(&wire, &key, &opts).map_err(|e| format!("decode: {e}"))?;
    let json = to_json(&records, args.pretty)?;
    write_output(p.io.output.as_deref(), &json, g.force)?;

    if g.json_output {
        let stats = serde_json::json!({
            "command": "decode",
            "records": records.as_array().map(Vec::len),
            "wire_bytes": wire.len(),
            "json_bytes": json.len(),
        });
        eprintln!("{stats:#}");
    }
    Ok(())
}

fn cmd_compact(args: &TransformArgs, g: &Globals) -> Result<(), String> {
    let records = read_json(args.io.input.as_deref())?;
    let json = to_json(&compact::compact(&records), args.pretty)?;
    write_output(args.io.output.as_deref(), &json, g.force)
}

fn cmd_expand(args: &ExpandArgs, g: &Globals) -> Result<(), String> {
    let t = &args.transform;
    let records = read_json(t.io.input.as_deref())?;
    let expanded = if args.strict {
        compact::expand_strict(&records).map_err(|e| e.to_string())?
    } else {
        compact::expand(&records)
    };
    let json = to_json(&expanded, t.pretty)?;
    write_output(t.io.output.as_deref(), &json, g.force)
}

fn cmd_inspect(args: &InspectArgs, g: &Globals) -> Result<(), String> {
    let key = resolve_key(&args.key)?;
    let opts = build_options(&args.tuning)?;
    let records = read_json(args.input.as_deref())?;

    let original = serde_json::to_vec(&records).map_err(|e| format!("JSON output: {e}"))?;
    let (wire, stats) =
        pipeline::encode_with_stats(&records, &key, &opts).map_err(|e| format!("encode: {e}"))?;
    let decoded =
        pipeline::decode_with_options(&wire, &key, &opts).map_err(|e| format!("decode: {e}"))?;
    let pass = decoded == records;

    if g.json_output {
        let stages: Vec<Value> = stats
            .stages
            .iter()
            .map(|r| {
                serde_json::json!({
                    "stage": r.stage.name(),
                    "input_bytes": r.input_bytes,
                    "output_bytes": r.output_bytes,
                })
            })
            .collect();
        let json = serde_json::json!({
            "command": "inspect",
            "records": stats.records,
            "original_bytes": original.len(),
            "compact_json_bytes": stats.json_bytes,
            "stages": stages,
            "wire_bytes": stats.wire_bytes(),
            "roundtrip": pass,
        });
        println!("{json:#}");
    } else if !g.quiet {
        println!("original json:    {:>8} bytes", original.len());
        println!("compact json:     {:>8} bytes", stats.json_bytes);
        for r in &stats.stages {
            println!("{:<17} {:>8} bytes", format!("{}:", r.stage.name()), r.output_bytes);
        }
        println!(
            "wire/original:    {:>8.1}%",
            100.0 * stats.wire_bytes() as f64 / original.len().max(1) as f64
        );
        println!("roundtrip:        {}", if pass { "PASS" } else { "FAIL" });
    }

    if pass {
        Ok(())
    } else {
        Err("decoded records differ from input".into())
    }
}

fn cmd_config() -> Result<(), String> {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("deltaseal version {version}");
    eprintln!("CODEC_BROTLI=1");
    eprintln!("CODEC_ZLIB={}", cfg!(feature = "zlib-codec") as u8);
    eprintln!("CODEC_LZMA={}", cfg!(feature = "lzma-codec") as u8);
    eprintln!("FILE_IO={}", cfg!(feature = "file-io") as u8);
    eprintln!("PARALLEL={}", cfg!(feature = "parallel") as u8);
    let defaults = PipelineOptions::default();
    eprintln!("DEFAULT_TEXT_QUALITY={}", defaults.text_quality);
    eprintln!("DEFAULT_GENERIC_QUALITY={}", defaults.generic_quality);
    eprintln!("PREFIX_TABLE={}", compact::PREFIX_TABLE.len());
    Ok(())
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("deltaseal".to_string())
        .chain(args.iter().cloned())
        .collect();
    let _ = Cli::try_parse_from(argv);
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();

    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let g = Globals {
        force: cli.force,
        quiet: cli.quiet,
        json_output: cli.json_output,
    };

    let result = match &cli.command {
        Cmd::Encode(args) => cmd_encode(args, &g),
        Cmd::Decode(args) => cmd_decode(args, &g),
        Cmd::Compact(args) => cmd_compact(args, &g),
        Cmd::Expand(args) => cmd_expand(args, &g),
        Cmd::Inspect(args) => cmd_inspect(args, &g),
        Cmd::Config => cmd_config(),
    };

    match result {
        Ok(()) => process::exit(0),
        Err(msg) => {
            eprintln!("deltaseal: {msg}");
            process::exit(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
