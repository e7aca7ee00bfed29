// Copyright 2025 Irreducible Inc.

use auto_impl::auto_impl;
use colconv_math::{Matrix, RowMajor, Scalar};
use colconv_utils::{checked_arithmetics::aligned_size, ensure};
use itertools::iproduct;

use crate::error::Error;

/// Dimensions of a convolution filter.
///
/// Both spatial extents are odd, so the filter has a center tap and symmetric "same" padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterShape {
	height: usize,
	width: usize,
	input_channels: usize,
	output_channels: usize,
}

impl FilterShape {
	pub fn new(
		height: usize,
		width: usize,
		input_channels: usize,
		output_channels: usize,
	) -> Result<Self, Error> {
		let invalid = |reason| Error::InvalidDimensions {
			height,
			width,
			input_channels,
			output_channels,
			reason,
		};

		ensure!(
			height != 0 && width != 0 && input_channels != 0 && output_channels != 0,
			invalid("all dimensions must be non-zero")
		);
		ensure!(height % 2 == 1 && width % 2 == 1, invalid("spatial extents must be odd"));

		Ok(Self {
			height,
			width,
			input_channels,
			output_channels,
		})
	}

	/// Total number of weights, `H * W * IC * OC`.
	pub const fn n_elements(&self) -> usize {
		self.height * self.width * self.input_channels * self.output_channels
	}
}

/// Geometry of a filter as seen by the column builder.
#[auto_impl(&, Arc)]
pub trait FilterGeometry {
	fn height(&self) -> usize;

	fn width(&self) -> usize;

	fn input_channels(&self) -> usize;

	fn output_channels(&self) -> usize;

	fn left_padding(&self) -> usize {
		(self.width() - 1) / 2
	}

	fn right_padding(&self) -> usize {
		(self.width() - 1) / 2
	}

	fn top_padding(&self) -> usize {
		(self.height() - 1) / 2
	}

	fn bottom_padding(&self) -> usize {
		(self.height() - 1) / 2
	}

	/// Number of weights contributing to one output channel, `H * W * IC`.
	fn taps(&self) -> usize {
		self.height() * self.width() * self.input_channels()
	}
}

impl FilterGeometry for FilterShape {
	fn height(&self) -> usize {
		self.height
	}

	fn width(&self) -> usize {
		self.width
	}

	fn input_channels(&self) -> usize {
		self.input_channels
	}

	fn output_channels(&self) -> usize {
		self.output_channels
	}
}

/// Convolution weights together with their GEMM-ready column buffer.
///
/// The filter buffer is planar, one `H x W` plane per `(input channel, output channel)` pair with
/// the output channel outermost. The column buffer is a row-major
/// `aligned(H * W * IC, P) x aligned(OC, P)` matrix holding one output channel per column, zero
/// outside the logical region so that it can be fed to a multiplier of width `P` as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter<T, const P: usize> {
	shape: FilterShape,
	filter_buffer: Vec<T>,
	column_buffer: Matrix<T, RowMajor>,
}

impl<T: Scalar, const P: usize> Filter<T, P> {
	const NON_ZERO_ALIGNMENT: () = assert!(P != 0, "alignment must be non-zero");

	/// A filter with all weights zero.
	pub fn zeroed(shape: FilterShape) -> Self {
		#[allow(clippy::let_unit_value)]
		let () = Self::NON_ZERO_ALIGNMENT;

		Self {
			shape,
			filter_buffer: vec![T::ZERO; shape.n_elements()],
			column_buffer: Matrix::zeros(
				aligned_size(shape.taps(), P),
				aligned_size(shape.output_channels, P),
			),
		}
	}

	/// A filter with the given planar weights, column buffer derived.
	///
	/// ## Throws
	///
	/// * [`Error::DimensionMismatch`] if `elements` does not hold exactly `H * W * IC * OC` weights
	pub fn new(shape: FilterShape, elements: &[T]) -> Result<Self, Error> {
		let (expected, actual) = (shape.n_elements(), elements.len());
		ensure!(
			expected == actual,
			Error::DimensionMismatch { expected, actual },
			expected,
			actual,
			"Filter data does not match its dimensions"
		);

		let mut filter = Self::zeroed(shape);
		filter.filter_buffer.copy_from_slice(elements);
		filter.filter_to_column();
		Ok(filter)
	}

	pub fn shape(&self) -> FilterShape {
		self.shape
	}

	/// Alignment of the column buffer, the multiplier width this filter is prepared for.
	pub const fn alignment(&self) -> usize {
		P
	}

	pub fn filter_buffer(&self) -> &[T] {
		&self.filter_buffer
	}

	pub fn column_buffer(&self) -> &Matrix<T, RowMajor> {
		&self.column_buffer
	}

	/// The single-channel `H x W` filter connecting input channel `ic` to output channel `oc`.
	///
	/// ## Throws
	///
	/// * [`Error::ChannelIndexOutOfRange`] if either index is out of range
	pub fn get(&self, ic: usize, oc: usize) -> Result<Self, Error> {
		self.check_channels(ic, oc)?;

		let plane_len = self.shape.height * self.shape.width;
		let start = self.filter_buffer_offset(0, 0, ic, oc);
		let shape = FilterShape::new(self.shape.height, self.shape.width, 1, 1)?;
		Self::new(shape, &self.filter_buffer[start..start + plane_len])
	}

	/// The weight at row `h`, column `w` of the `(ic, oc)` plane.
	pub fn at(&self, h: usize, w: usize, ic: usize, oc: usize) -> T {
		self.filter_buffer[self.filter_buffer_offset(w, h, ic, oc)]
	}

	/// Mutable access to a weight. The column buffer is not updated until
	/// [`Self::filter_to_column`] runs.
	pub fn at_mut(&mut self, h: usize, w: usize, ic: usize, oc: usize) -> &mut T {
		let offset = self.filter_buffer_offset(w, h, ic, oc);
		&mut self.filter_buffer[offset]
	}

	/// Offset of tap `(fx, fy)` of the `(ic, oc)` plane in the filter buffer.
	pub fn filter_buffer_offset(&self, fx: usize, fy: usize, ic: usize, oc: usize) -> usize {
		let FilterShape {
			height,
			width,
			input_channels,
			..
		} = self.shape;
		debug_assert!(fx < width && fy < height);
		((oc * input_channels + ic) * height + fy) * width + fx
	}

	/// Offset of tap `(fx, fy)` of the `(ic, oc)` plane in the column buffer.
	///
	/// The row is the tap index in image-column order, `(ic * H + fy) * W + fx`, the column is `oc`.
	pub fn column_buffer_offset(&self, fx: usize, fy: usize, ic: usize, oc: usize) -> usize {
		let FilterShape { height, width, .. } = self.shape;
		debug_assert!(fx < width && fy < height);
		((ic * height + fy) * width + fx) * self.column_buffer.cols() + oc
	}

	/// Rebuilds the column buffer from the filter buffer, zeroing the alignment padding.
	pub fn filter_to_column(&mut self) {
		self.column_buffer.fill(T::ZERO);

		let FilterShape {
			height,
			width,
			input_channels,
			output_channels,
		} = self.shape;
		for (oc, ic, fy, fx) in iproduct!(0..output_channels, 0..input_channels, 0..height, 0..width)
		{
			let weight = self.filter_buffer[self.filter_buffer_offset(fx, fy, ic, oc)];
			let offset = self.column_buffer_offset(fx, fy, ic, oc);
			self.column_buffer.elements_mut()[offset] = weight;
		}
	}

	fn check_channels(&self, ic: usize, oc: usize) -> Result<(), Error> {
		ensure!(
			ic < self.shape.input_channels,
			Error::ChannelIndexOutOfRange {
				kind: "input",
				index: ic,
				count: self.shape.input_channels,
			}
		);
		ensure!(
			oc < self.shape.output_channels,
			Error::ChannelIndexOutOfRange {
				kind: "output",
				index: oc,
				count: self.shape.output_channels,
			}
		);
		Ok(())
	}
}

impl<T, const P: usize> FilterGeometry for Filter<T, P> {
	fn height(&self) -> usize {
		self.shape.height
	}

	fn width(&self) -> usize {
		self.shape.width
	}

	fn input_channels(&self) -> usize {
		self.shape.input_channels
	}

	fn output_channels(&self) -> usize {
		self.shape.output_channels
	}
}
