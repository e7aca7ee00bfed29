// Copyright 2025 Irreducible Inc.

use std::{
	path::{Path, PathBuf},
	sync::Arc,
};

use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::{codec::ImageCodec, convolver::Convolver, error::Error, filter::Filter, Pixel};

/// Outcome of convolving one image of a batch.
#[derive(Debug)]
pub struct BatchOutcome {
	pub input: PathBuf,
	pub result: Result<Vec<PathBuf>, Error>,
}

/// Convolves every image in `inputs` with `filter`, in parallel.
///
/// Every worker thread owns a [`Convolver`], so buffers are reused across the images that thread
/// processes. A failing image is logged and reported in its outcome, the other images still run.
/// Outcomes are in input order.
#[instrument("convolve_batch", skip_all, fields(n_images = inputs.len()))]
pub fn convolve_batch<const P: usize, C>(
	filter: Arc<Filter<Pixel, P>>,
	codec: C,
	inputs: &[impl AsRef<Path> + Sync],
) -> Vec<BatchOutcome>
where
	C: ImageCodec + Clone + Send + Sync,
{
	let outcomes = inputs
		.par_iter()
		.map_init(
			|| Convolver::with_codec(filter.clone(), codec.clone()),
			|convolver, input| {
				let input = input.as_ref();
				let result = convolver.process(input);
				if let Err(err) = &result {
					warn!(path = %input.display(), %err, "Skipping image");
				}
				BatchOutcome {
					input: input.to_path_buf(),
					result,
				}
			},
		)
		.collect::<Vec<_>>();

	let failed = outcomes
		.iter()
		.filter(|outcome| outcome.result.is_err())
		.count();
	info!(processed = outcomes.len() - failed, failed, "Batch finished");
	outcomes
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;
	use crate::{
		codec::{DecodedImage, MemoryCodec},
		filter::FilterShape,
	};

	#[test]
	fn test_batch_keeps_going_after_failure() {
		let codec = MemoryCodec::new();
		for (name, value) in [("a.png", 1), ("c.png", 3)] {
			codec.insert(
				name,
				DecodedImage {
					width: 2,
					height: 2,
					channels: 1,
					planes: vec![value; 4],
				},
			);
		}
		let shape = FilterShape::new(1, 1, 1, 2).unwrap();
		let filter = Arc::new(Filter::<Pixel, 2>::new(shape, &[2, 5]).unwrap());

		let outcomes = convolve_batch(filter, codec.clone(), &["a.png", "b.png", "c.png"]);

		assert_eq!(outcomes.len(), 3);
		assert_eq!(outcomes[0].input, PathBuf::from("a.png"));
		assert_matches!(&outcomes[1].result, Err(Error::FileNotFound(_)));
		assert_eq!(
			outcomes[2].result.as_ref().unwrap(),
			&vec![PathBuf::from("c_0.png"), PathBuf::from("c_1.png")]
		);

		assert_eq!(codec.get(Path::new("a_0.png")).unwrap().planes, vec![2; 4]);
		assert_eq!(codec.get(Path::new("a_1.png")).unwrap().planes, vec![5; 4]);
		assert_eq!(codec.get(Path::new("c_1.png")).unwrap().planes, vec![15; 4]);
		assert!(!codec.contains(Path::new("b_0.png")));
	}
}
