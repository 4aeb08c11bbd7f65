//! Filter a PNG image end to end.
//!
//! Decodes the input, pads it, convolves it with the configured filter and
//! strategy, and encodes the result. Nothing is written if any step fails.
//!
//! Configuration comes from the environment:
//! - `HALOCONV_FILTER`: `identity`, `blur` (default) or `edge`
//! - `HALOCONV_FILTER_WIDTH`: odd width, default 11
//! - `HALOCONV_STRATEGY`: `naive`, `vectorized` or `tiled` (default)
//! - `HALOCONV_WORKGROUP`: tiled workgroup shape `ROWSxCOLS`, default `16x16`
//!
//! Run with:
//! ```sh
//! RUST_LOG=debug cargo run --example convolve_image -- input.png output.png
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use haloconv::DefaultRuntime;
use haloconv::prelude::*;

fn run(input: PathBuf, output: PathBuf) -> Result<()> {
    let config = ConvConfig::from_env()?;
    let raw = PngCodec.decode(&input)?;
    log::info!(
        "{}: {}x{}, filter {} width {}, strategy {}",
        input.display(),
        raw.width,
        raw.height,
        config.filter_family,
        config.filter_width,
        config.strategy
    );

    let engine = ConvolutionEngine::<DefaultRuntime>::with_default_device(config)?;

    let start = Instant::now();
    let padded = engine.pad(&raw)?;
    let pad_time = start.elapsed();

    let start = Instant::now();
    let result = engine.run_padded(&padded)?;
    let conv_time = start.elapsed();
    log::info!(
        "{} on {}: pad {:?}, convolve {:?}",
        config.strategy,
        DefaultRuntime::name(),
        pad_time,
        conv_time
    );

    PngCodec.encode(&result.to_rgba8(), &output)?;
    log::info!("wrote {}", output.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args_os().skip(1);
    let (Some(input), Some(output)) = (args.next(), args.next()) else {
        eprintln!("usage: convolve_image <input.png> <output.png>");
        return ExitCode::from(2);
    };

    match run(PathBuf::from(input), PathBuf::from(output)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{} ({:?})", e, e.kind());
            ExitCode::FAILURE
        }
    }
}
