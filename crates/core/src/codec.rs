// Copyright 2025 Irreducible Inc.

use std::{
	collections::HashMap,
	path::{Path, PathBuf},
	sync::{Arc, Mutex, PoisonError},
};

use auto_impl::auto_impl;
use bytemuck::zeroed_vec;
use colconv_math::{transpose_into, RowMajor};
use colconv_utils::{bail, ensure};
use image::{ColorType, DynamicImage};

use crate::{error::Error, Pixel};

/// A decoded image in planar layout, channel `c` occupying
/// `planes[c * width * height..(c + 1) * width * height]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedImage {
	pub width: usize,
	pub height: usize,
	pub channels: usize,
	pub planes: Vec<Pixel>,
}

/// Reads source images and writes single-channel result images.
#[auto_impl(&, Arc)]
pub trait ImageCodec {
	/// ## Throws
	///
	/// * [`Error::FileNotFound`] if there is no image at `path`
	fn decode(&self, path: &Path) -> Result<DecodedImage, Error>;

	/// Stores a single-channel `width x height` image.
	fn encode(&self, path: &Path, width: usize, height: usize, plane: &[Pixel])
		-> Result<(), Error>;
}

/// Codec backed by the file system, the format picked from the file extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileCodec;

impl ImageCodec for FileCodec {
	fn decode(&self, path: &Path) -> Result<DecodedImage, Error> {
		if !path.is_file() {
			bail!(Error::FileNotFound(path.to_path_buf()));
		}

		let image = image::open(path)?;
		let channels = usize::from(image.color().channel_count());
		let (width, height) = (image.width() as usize, image.height() as usize);
		let interleaved = into_raw_8bit(image, channels);

		let mut planes = zeroed_vec::<Pixel>(interleaved.len());
		transpose_into::<Pixel, RowMajor>(width * height, channels, &interleaved, &mut planes)?;

		Ok(DecodedImage {
			width,
			height,
			channels,
			planes,
		})
	}

	fn encode(
		&self,
		path: &Path,
		width: usize,
		height: usize,
		plane: &[Pixel],
	) -> Result<(), Error> {
		ensure!(
			plane.len() == width * height,
			Error::DimensionMismatch {
				expected: width * height,
				actual: plane.len(),
			}
		);
		let (Ok(width_u32), Ok(height_u32)) = (u32::try_from(width), u32::try_from(height)) else {
			bail!(Error::ImageTooLarge { width, height });
		};

		image::save_buffer(path, plane, width_u32, height_u32, ColorType::L8)?;
		Ok(())
	}
}

/// Interleaved 8-bit samples, wider samples narrowed by the decoder.
fn into_raw_8bit(image: DynamicImage, channels: usize) -> Vec<Pixel> {
	match channels {
		1 => image.into_luma8().into_raw(),
		2 => image.into_luma_alpha8().into_raw(),
		3 => image.into_rgb8().into_raw(),
		_ => image.into_rgba8().into_raw(),
	}
}

/// In-memory codec keyed by path.
///
/// Clones share the same store, so a codec handed to several convolvers sees all their outputs.
#[derive(Debug, Default, Clone)]
pub struct MemoryCodec {
	images: Arc<Mutex<HashMap<PathBuf, DecodedImage>>>,
}

impl MemoryCodec {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&self, path: impl Into<PathBuf>, image: DecodedImage) {
		self.lock().insert(path.into(), image);
	}

	pub fn get(&self, path: &Path) -> Option<DecodedImage> {
		self.lock().get(path).cloned()
	}

	pub fn contains(&self, path: &Path) -> bool {
		self.lock().contains_key(path)
	}

	pub fn len(&self) -> usize {
		self.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.lock().is_empty()
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, DecodedImage>> {
		self.images.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

impl ImageCodec for MemoryCodec {
	fn decode(&self, path: &Path) -> Result<DecodedImage, Error> {
		self.get(path)
			.ok_or_else(|| Error::FileNotFound(path.to_path_buf()))
	}

	fn encode(
		&self,
		path: &Path,
		width: usize,
		height: usize,
		plane: &[Pixel],
	) -> Result<(), Error> {
		ensure!(
			plane.len() == width * height,
			Error::DimensionMismatch {
				expected: width * height,
				actual: plane.len(),
			}
		);

		self.insert(
			path,
			DecodedImage {
				width,
				height,
				channels: 1,
				planes: plane.to_vec(),
			},
		);
		Ok(())
	}
}
