// Copyright 2025 Irreducible Inc.

use std::path::Path;

use colconv_math::{Matrix, MatrixOrder, RowMajor};
use colconv_utils::{checked_arithmetics::aligned_size, ensure};
use getset::CopyGetters;
use tracing::{error, info, instrument};

use crate::{
	codec::{DecodedImage, ImageCodec},
	error::Error,
	filter::FilterGeometry,
	Accumulator, Pixel,
};

/// A multi-channel 8-bit image in planar layout.
///
/// Channel `c` occupies `buffer[c * width * height..(c + 1) * width * height]`, each plane
/// row-major.
#[derive(Debug, Clone, Default, PartialEq, Eq, CopyGetters)]
pub struct Image {
	#[getset(get_copy = "pub")]
	width: usize,
	#[getset(get_copy = "pub")]
	height: usize,
	#[getset(get_copy = "pub")]
	channels: usize,
	buffer: Vec<Pixel>,
}

impl Image {
	/// Wraps planar pixel data.
	///
	/// ## Throws
	///
	/// * [`Error::DimensionMismatch`] if `buffer` does not hold `width * height * channels` pixels
	pub fn from_planes(
		width: usize,
		height: usize,
		channels: usize,
		buffer: Vec<Pixel>,
	) -> Result<Self, Error> {
		ensure!(
			buffer.len() == width * height * channels,
			Error::DimensionMismatch {
				expected: width * height * channels,
				actual: buffer.len(),
			}
		);

		Ok(Self {
			width,
			height,
			channels,
			buffer,
		})
	}

	/// Replaces the contents with the image decoded from `path`.
	///
	/// On failure the image is left unchanged.
	pub fn read(&mut self, codec: &impl ImageCodec, path: &Path) -> Result<(), Error> {
		let DecodedImage {
			width,
			height,
			channels,
			planes,
		} = match codec.decode(path) {
			Ok(decoded) => decoded,
			Err(err) => {
				error!(path = %path.display(), %err, "Failed to read image");
				return Err(err);
			}
		};

		*self = Self::from_planes(width, height, channels, planes)?;
		info!(
			"Read image {} {}x{}x{} {} Byte",
			path.display(),
			width,
			height,
			channels,
			self.buffer.len()
		);
		Ok(())
	}

	/// Writes output channel `oc` of a row-major `pixels x aligned(OC)` accumulator matrix as a
	/// single-channel image of this image's size. Values above the pixel range saturate.
	///
	/// ## Throws
	///
	/// * [`Error::DimensionMismatch`] if `transform` does not have one row per pixel
	/// * [`Error::ChannelIndexOutOfRange`] if `oc` is not a column of `transform`
	pub fn write(
		&self,
		codec: &impl ImageCodec,
		path: &Path,
		transform: &Matrix<Accumulator, RowMajor>,
		oc: usize,
	) -> Result<(), Error> {
		ensure!(
			transform.rows() == self.pixels(),
			Error::DimensionMismatch {
				expected: self.pixels(),
				actual: transform.rows(),
			}
		);
		ensure!(
			oc < transform.cols(),
			Error::ChannelIndexOutOfRange {
				kind: "output",
				index: oc,
				count: transform.cols(),
			}
		);

		let plane = (0..self.pixels())
			.map(|pixel| saturate(transform.row(pixel)[oc]))
			.collect::<Vec<_>>();
		codec.encode(path, self.width, self.height, &plane)?;

		info!(
			"Write image {} {}x{}x1 {} Byte",
			path.display(),
			self.width,
			self.height,
			plane.len()
		);
		Ok(())
	}

	pub fn buffer(&self) -> &[Pixel] {
		&self.buffer
	}

	pub fn is_empty(&self) -> bool {
		self.buffer.is_empty()
	}

	/// Number of pixels per channel.
	pub fn pixels(&self) -> usize {
		self.width * self.height
	}

	/// Total number of samples across all channels.
	pub fn elements(&self) -> usize {
		self.buffer.len()
	}

	pub fn plane(&self, c: usize) -> &[Pixel] {
		&self.buffer[c * self.pixels()..(c + 1) * self.pixels()]
	}

	/// Offset of pixel `(x, y)` of channel `c` in the planar buffer.
	pub fn image_buffer_offset(&self, x: usize, y: usize, c: usize) -> usize {
		debug_assert!(x < self.width && y < self.height && c < self.channels);
		(c * self.height + y) * self.width + x
	}

	/// Offset in a row-major column buffer of the element that output pixel `(x, y)` reads through
	/// tap `(fx, fy)` of channel `c`.
	///
	/// Rows of the column buffer are output pixels, its columns the filter taps of all channels,
	/// `aligned(H * W * channels, alignment)` of them.
	#[allow(clippy::too_many_arguments)]
	pub fn column_buffer_offset(
		&self,
		filter: &impl FilterGeometry,
		alignment: usize,
		x: usize,
		y: usize,
		c: usize,
		fx: usize,
		fy: usize,
	) -> usize {
		let taps = filter.height() * filter.width();
		let row_len = aligned_size(taps * self.channels, alignment);
		(y * self.width + x) * row_len + c * taps + fy * filter.width() + fx
	}

	/// Builds the im2col matrix of this image for `filter`, stored in order `O`.
	///
	/// Row `y * width + x` holds the receptive field of output pixel `(x, y)`: for every channel `c`
	/// and tap `(fx, fy)`, column `(c * H + fy) * W + fx` holds the source pixel
	/// `(x - left_padding + fx, y - top_padding + fy)`, or zero when that pixel lies outside the
	/// image. The column count is rounded up to `alignment`, the padding columns are zero.
	///
	/// ## Throws
	///
	/// * [`Error::EmptyImage`] if no image has been loaded
	/// * [`Error::InvalidAlignment`] if `alignment` is zero
	#[instrument("Image::img2col", skip_all, level = "debug")]
	pub fn img2col<O: MatrixOrder>(
		&self,
		filter: &impl FilterGeometry,
		alignment: usize,
	) -> Result<Matrix<Pixel, O>, Error> {
		ensure!(!self.is_empty(), Error::EmptyImage, "Image buffer is empty");
		ensure!(alignment != 0, Error::InvalidAlignment);

		let (filter_width, filter_height) = (filter.width(), filter.height());
		let (left_padding, top_padding) = (filter.left_padding(), filter.top_padding());
		let row_len = aligned_size(filter_width * filter_height * self.channels, alignment);

		let mut columns = Matrix::<Pixel, RowMajor>::zeros(self.pixels(), row_len);
		// One source row with horizontal zero padding. The padding is never overwritten.
		let mut line = vec![0; self.width + filter_width - 1];

		for c in 0..self.channels {
			let plane = self.plane(c);
			for y in 0..self.height {
				line[left_padding..left_padding + self.width]
					.copy_from_slice(&plane[y * self.width..(y + 1) * self.width]);

				// Source row y is tap row fy of output row y + top_padding - fy.
				for fy in 0..filter_height {
					let Some(out_y) = (y + top_padding).checked_sub(fy) else {
						continue;
					};
					if out_y >= self.height {
						continue;
					}

					for x in 0..self.width {
						let offset = self.column_buffer_offset(filter, alignment, x, out_y, c, 0, fy);
						columns.elements_mut()[offset..offset + filter_width]
							.copy_from_slice(&line[x..x + filter_width]);
					}
				}
			}
		}

		Ok(columns.into_order())
	}
}

/// Narrows an accumulator value to a pixel, clamping at the pixel maximum.
pub fn saturate(value: Accumulator) -> Pixel {
	Pixel::try_from(value).unwrap_or(Pixel::MAX)
}
