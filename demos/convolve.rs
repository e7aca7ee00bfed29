// Copyright 2025 Irreducible Inc.

use std::{path::PathBuf, sync::Arc};

use anyhow::{ensure, Result};
use clap::Parser;
use colconv_core::{convolve_batch, each_tile_width, FileCodec, Filter, FilterShape, Pixel};
use colconv_utils::{rayon::adjust_thread_pool, tracing::init_tracing};
use tracing::info;

#[derive(Debug, Parser)]
struct Args {
	/// Images to convolve. Output channel `i` of `dir/name.ext` is written to `dir/name_i.png`.
	#[arg(required = true)]
	paths: Vec<PathBuf>,
	/// Filter height, must be odd.
	#[arg(long, default_value_t = 1)]
	filter_height: usize,
	/// Filter width, must be odd.
	#[arg(long, default_value_t = 1)]
	filter_width: usize,
	/// Number of channels of the source images.
	#[arg(long, default_value_t = 3)]
	input_channels: usize,
	/// Number of result images per source image.
	#[arg(long, default_value_t = 3)]
	output_channels: usize,
	/// Filter weights, output channel outermost, then input channel, then row and column.
	/// Defaults to the channel identity, which needs a 1x1 filter with as many outputs as inputs.
	#[arg(long, value_delimiter = ',')]
	weights: Option<Vec<Pixel>>,
	/// Inner width of the multiplier. One of 1, 2, 4, 8, 16 or 32.
	#[arg(long, default_value_t = 8)]
	tile_width: usize,
	/// Worker threads, overrides `RAYON_NUM_THREADS`. With 1 images are processed in order on the
	/// main thread.
	#[arg(long)]
	threads: Option<usize>,
}

fn identity_weights(channels: usize) -> Vec<Pixel> {
	let mut weights = vec![0; channels * channels];
	for c in 0..channels {
		weights[c * channels + c] = 1;
	}
	weights
}

fn run<const P: usize>(shape: FilterShape, weights: &[Pixel], paths: &[PathBuf]) -> Result<usize> {
	let filter = Arc::new(Filter::<Pixel, P>::new(shape, weights)?);
	let outcomes = convolve_batch(filter, FileCodec, paths);

	let mut failed = 0;
	for outcome in outcomes {
		match outcome.result {
			Ok(written) => {
				for path in written {
					println!("{}", path.display());
				}
			}
			Err(err) => {
				eprintln!("{}: {err}", outcome.input.display());
				failed += 1;
			}
		}
	}
	Ok(failed)
}

fn main() -> Result<()> {
	let args = Args::parse();

	adjust_thread_pool(args.threads)
		.as_ref()
		.expect("failed to init thread pool");

	let _ = init_tracing();

	let shape = FilterShape::new(
		args.filter_height,
		args.filter_width,
		args.input_channels,
		args.output_channels,
	)?;
	let weights = match args.weights {
		Some(weights) => weights,
		None => {
			ensure!(
				args.filter_height == 1
					&& args.filter_width == 1
					&& args.input_channels == args.output_channels,
				"the default identity weights need a 1x1 filter with as many output channels as \
				 input channels, pass --weights otherwise"
			);
			identity_weights(args.input_channels)
		}
	};

	info!(
		n_images = args.paths.len(),
		tile_width = args.tile_width,
		"Convolving with a {}x{}x{}x{} filter",
		args.filter_height,
		args.filter_width,
		args.input_channels,
		args.output_channels
	);

	let failed = each_tile_width!(args.tile_width, run(shape, &weights, &args.paths))?;
	ensure!(failed == 0, "{failed} of {} images failed", args.paths.len());
	Ok(())
}
