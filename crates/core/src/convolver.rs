// Copyright 2025 Irreducible Inc.

use std::{
	path::{Path, PathBuf},
	sync::Arc,
};

use colconv_math::{ColumnMajor, Matrix, RowMajor, TiledMultiplier};
use colconv_utils::{bail, checked_arithmetics::aligned_size, ensure};
use tracing::instrument;

use crate::{
	codec::{FileCodec, ImageCodec},
	error::Error,
	filter::{Filter, FilterGeometry},
	image_buffer::Image,
	Accumulator, Pixel,
};

/// Pipeline stage a [`Convolver`] has completed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvolverState {
	#[default]
	Idle,
	Loaded,
	ColumnBuilt,
	Multiplied,
	Written,
}

/// Applies one filter to a sequence of images.
///
/// Each image goes through the stages read, column build, multiply and write. The stages can be
/// driven one at a time, each checking that the previous one completed, or all at once with
/// [`Self::process`]. The working buffers are reused across images.
#[derive(Debug)]
pub struct Convolver<const P: usize, C = FileCodec> {
	filter: Arc<Filter<Pixel, P>>,
	codec: C,
	multiplier: TiledMultiplier<P>,
	image: Image,
	source: Option<PathBuf>,
	columns: Matrix<Pixel, ColumnMajor>,
	transform: Matrix<Accumulator, RowMajor>,
	state: ConvolverState,
}

impl<const P: usize> Convolver<P> {
	pub fn new(filter: Arc<Filter<Pixel, P>>) -> Self {
		Self::with_codec(filter, FileCodec)
	}
}

impl<const P: usize, C: ImageCodec> Convolver<P, C> {
	pub fn with_codec(filter: Arc<Filter<Pixel, P>>, codec: C) -> Self {
		Self {
			filter,
			codec,
			multiplier: TiledMultiplier::new(),
			image: Image::default(),
			source: None,
			columns: Matrix::zeros(0, 0),
			transform: Matrix::zeros(0, 0),
			state: ConvolverState::Idle,
		}
	}

	pub fn state(&self) -> ConvolverState {
		self.state
	}

	pub fn filter(&self) -> &Filter<Pixel, P> {
		&self.filter
	}

	pub fn codec(&self) -> &C {
		&self.codec
	}

	pub fn image(&self) -> &Image {
		&self.image
	}

	/// The im2col matrix of the current image, `pixels x aligned(H * W * IC, P)`.
	pub fn column_buffer(&self) -> &Matrix<Pixel, ColumnMajor> {
		&self.columns
	}

	/// The convolution result of the current image, `pixels x aligned(OC, P)`.
	pub fn transform_buffer(&self) -> &Matrix<Accumulator, RowMajor> {
		&self.transform
	}

	/// Convolves the image at `path`, writing one single-channel image per output channel.
	///
	/// Returns the paths written, in output channel order. Nothing is written if any stage fails.
	#[instrument("Convolver::process", skip_all, fields(path = %path.display()))]
	pub fn process(&mut self, path: &Path) -> Result<Vec<PathBuf>, Error> {
		self.state = ConvolverState::Idle;
		self.read(path)?;
		self.build_columns()?;
		self.multiply()?;
		self.write_outputs()
	}

	/// Loads the image at `path`. Always allowed, discards the progress on the previous image.
	pub fn read(&mut self, path: &Path) -> Result<(), Error> {
		self.state = ConvolverState::Idle;
		self.source = None;

		self.image.read(&self.codec, path)?;
		self.source = Some(path.to_path_buf());
		self.state = ConvolverState::Loaded;
		Ok(())
	}

	/// Builds the im2col matrix of the loaded image.
	///
	/// ## Throws
	///
	/// * [`Error::InvalidState`] if no image is loaded
	/// * [`Error::ChannelCountMismatch`] if the image channels differ from the filter's
	pub fn build_columns(&mut self) -> Result<(), Error> {
		self.expect_state(ConvolverState::Loaded)?;
		let (expected, actual) = (self.filter.input_channels(), self.image.channels());
		ensure!(
			expected == actual,
			Error::ChannelCountMismatch { expected, actual },
			expected,
			actual,
			"Image channels do not match the filter"
		);

		self.columns = self.image.img2col(&*self.filter, P)?;
		self.state = ConvolverState::ColumnBuilt;
		Ok(())
	}

	/// Multiplies the im2col matrix with the filter column buffer.
	///
	/// ## Throws
	///
	/// * [`Error::InvalidState`] if the columns have not been built
	/// * [`Error::ArithmeticOverflow`] if an accumulator overflowed
	pub fn multiply(&mut self) -> Result<(), Error> {
		self.expect_state(ConvolverState::ColumnBuilt)?;

		let pixels = self.image.pixels();
		let mut accumulator = Matrix::<Accumulator, ColumnMajor>::zeros(
			pixels,
			aligned_size(self.filter.output_channels(), P),
		);
		match self
			.multiplier
			.checked_mult(&mut accumulator, &self.columns, self.filter.column_buffer())
		{
			Ok(()) => {}
			Err(colconv_math::Error::ArithmeticOverflow) => {
				let path = self.source.clone().unwrap_or_default();
				self.state = ConvolverState::Idle;
				bail!(
					Error::ArithmeticOverflow { path },
					path = %path.display(),
					"Accumulator overflow"
				);
			}
			Err(err) => return Err(err.into()),
		}

		self.transform = accumulator.into_transposed_order();
		self.state = ConvolverState::Multiplied;
		Ok(())
	}

	/// Writes every output channel of the current result next to the source image.
	///
	/// ## Throws
	///
	/// * [`Error::InvalidState`] if the multiplication has not run
	pub fn write_outputs(&mut self) -> Result<Vec<PathBuf>, Error> {
		self.expect_state(ConvolverState::Multiplied)?;
		let source = self.source.clone().unwrap_or_default();

		let paths = (0..self.filter.output_channels())
			.map(|oc| {
				let path = output_path(&source, oc);
				self.image
					.write(&self.codec, &path, &self.transform, oc)
					.map(|()| path)
			})
			.collect::<Result<Vec<_>, _>>()?;

		self.state = ConvolverState::Written;
		Ok(paths)
	}

	fn expect_state(&self, expected: ConvolverState) -> Result<(), Error> {
		ensure!(
			self.state == expected,
			Error::InvalidState {
				expected,
				actual: self.state,
			}
		);
		Ok(())
	}
}

/// Path of output channel `oc` for the image at `input`: `<stem>_<oc>.png` in the same directory.
pub fn output_path(input: &Path, oc: usize) -> PathBuf {
	let stem = input.file_stem().unwrap_or_default().to_string_lossy();
	input.with_file_name(format!("{stem}_{oc}.png"))
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;
	use crate::{
		codec::{DecodedImage, MemoryCodec},
		filter::FilterShape,
	};

	fn identity_filter<const P: usize>(channels: usize) -> Arc<Filter<Pixel, P>> {
		let shape = FilterShape::new(1, 1, channels, channels).unwrap();
		let mut filter = Filter::zeroed(shape);
		for c in 0..channels {
			*filter.at_mut(0, 0, c, c) = 1;
		}
		filter.filter_to_column();
		Arc::new(filter)
	}

	#[test]
	fn test_output_path() {
		assert_eq!(output_path(Path::new("dir/photo.jpg"), 2), PathBuf::from("dir/photo_2.png"));
		assert_eq!(output_path(Path::new("photo"), 0), PathBuf::from("photo_0.png"));
	}

	#[test]
	fn test_stages_require_order() {
		let mut convolver = Convolver::with_codec(identity_filter::<4>(1), MemoryCodec::new());
		assert_eq!(convolver.state(), ConvolverState::Idle);

		assert_matches!(
			convolver.build_columns(),
			Err(Error::InvalidState {
				expected: ConvolverState::Loaded,
				actual: ConvolverState::Idle
			})
		);
		assert_matches!(convolver.multiply(), Err(Error::InvalidState { .. }));
		assert_matches!(convolver.write_outputs(), Err(Error::InvalidState { .. }));
	}

	#[test]
	fn test_staged_pipeline() {
		let codec = MemoryCodec::new();
		codec.insert(
			"img.png",
			DecodedImage {
				width: 2,
				height: 1,
				channels: 2,
				planes: vec![1, 2, 3, 4],
			},
		);
		let mut convolver = Convolver::with_codec(identity_filter::<2>(2), codec.clone());

		convolver.read(Path::new("img.png")).unwrap();
		assert_eq!(convolver.state(), ConvolverState::Loaded);
		assert_matches!(convolver.multiply(), Err(Error::InvalidState { .. }));

		convolver.build_columns().unwrap();
		assert_eq!(convolver.state(), ConvolverState::ColumnBuilt);
		assert_eq!(convolver.column_buffer().dim(), (2, 2));

		convolver.multiply().unwrap();
		assert_eq!(convolver.state(), ConvolverState::Multiplied);
		assert_eq!(convolver.transform_buffer().row(0), &[1, 3]);
		assert_eq!(convolver.transform_buffer().row(1), &[2, 4]);

		let written = convolver.write_outputs().unwrap();
		assert_eq!(convolver.state(), ConvolverState::Written);
		assert_eq!(written, vec![PathBuf::from("img_0.png"), PathBuf::from("img_1.png")]);
		assert_eq!(codec.get(Path::new("img_0.png")).unwrap().planes, vec![1, 2]);
		assert_eq!(codec.get(Path::new("img_1.png")).unwrap().planes, vec![3, 4]);
	}

	#[test]
	fn test_missing_file_leaves_no_outputs() {
		let codec = MemoryCodec::new();
		let mut convolver = Convolver::with_codec(identity_filter::<1>(1), codec.clone());

		assert_matches!(
			convolver.process(Path::new("missing.png")),
			Err(Error::FileNotFound(_))
		);
		assert_eq!(convolver.state(), ConvolverState::Idle);
		assert!(codec.is_empty());
	}

	#[test]
	fn test_channel_count_mismatch() {
		let codec = MemoryCodec::new();
		codec.insert(
			"gray.png",
			DecodedImage {
				width: 1,
				height: 1,
				channels: 1,
				planes: vec![5],
			},
		);
		let mut convolver = Convolver::with_codec(identity_filter::<1>(3), codec.clone());

		assert_matches!(
			convolver.process(Path::new("gray.png")),
			Err(Error::ChannelCountMismatch {
				expected: 3,
				actual: 1
			})
		);
		assert_eq!(codec.len(), 1);
	}

	#[test]
	fn test_overflow_is_reported_with_path() {
		let codec = MemoryCodec::new();
		codec.insert(
			"bright.png",
			DecodedImage {
				width: 3,
				height: 3,
				channels: 1,
				planes: vec![255; 9],
			},
		);
		let shape = FilterShape::new(3, 3, 1, 1).unwrap();
		let filter = Filter::<Pixel, 1>::new(shape, &[255; 9]).unwrap();
		let mut convolver = Convolver::with_codec(Arc::new(filter), codec.clone());

		assert_matches!(
			convolver.process(Path::new("bright.png")),
			Err(Error::ArithmeticOverflow { path }) if path == Path::new("bright.png")
		);
		assert_eq!(convolver.state(), ConvolverState::Idle);
		assert_eq!(codec.len(), 1);
	}

	#[test]
	fn test_convolver_is_reusable() {
		let codec = MemoryCodec::new();
		for (name, value) in [("a.png", 10), ("b.png", 20)] {
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
		let mut convolver = Convolver::with_codec(identity_filter::<8>(1), codec.clone());

		convolver.process(Path::new("a.png")).unwrap();
		convolver.process(Path::new("b.png")).unwrap();

		assert_eq!(codec.get(Path::new("a_0.png")).unwrap().planes, vec![10; 4]);
		assert_eq!(codec.get(Path::new("b_0.png")).unwrap().planes, vec![20; 4]);
	}
}
