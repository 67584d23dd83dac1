// ============================================================
// Layer 4 — IDX Reader
// ============================================================
// MNIST ships as four IDX files. Each starts with a big-endian
// header followed by raw unsigned bytes:
//
//   labels (IDX1):  magic 0x00000801 | count                | count bytes
//   images (IDX3):  magic 0x00000803 | count | rows | cols  | count*rows*cols bytes
//
// Files may be stored gzipped (the form they are distributed in);
// anything ending in `.gz` is decompressed with flate2 first.

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use crate::data::source::Split;
use crate::domain::digit::{DigitSample, HEIGHT, NUM_CLASSES, WIDTH};
use crate::domain::traits::DigitSource;

const LABEL_MAGIC: u32 = 0x0000_0801;
const IMAGE_MAGIC: u32 = 0x0000_0803;

pub const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
pub const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
pub const TEST_IMAGES:  &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS:  &str = "t10k-labels-idx1-ubyte";

/// Read a whole file, gunzipping it when the name ends in `.gz`.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    let raw = fs::read(path)
        .with_context(|| format!("Cannot read IDX file '{}'", path.display()))?;

    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        let mut out = Vec::new();
        GzDecoder::new(raw.as_slice())
            .read_to_end(&mut out)
            .with_context(|| format!("Cannot decompress '{}'", path.display()))?;
        Ok(out)
    } else {
        Ok(raw)
    }
}

fn be_u32(bytes: &[u8], offset: usize) -> Result<u32> {
    let Some(slice) = bytes.get(offset..offset + 4) else {
        bail!("IDX header truncated at byte {offset}");
    };
    Ok(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

/// Parse an IDX3 image file into one 784-byte vector per image.
pub fn parse_images(bytes: &[u8]) -> Result<Vec<Vec<u8>>> {
    let magic = be_u32(bytes, 0)?;
    if magic != IMAGE_MAGIC {
        bail!("Bad image file magic {magic:#010x}, expected {IMAGE_MAGIC:#010x}");
    }

    let count = be_u32(bytes, 4)? as usize;
    let rows  = be_u32(bytes, 8)? as usize;
    let cols  = be_u32(bytes, 12)? as usize;
    if rows != HEIGHT || cols != WIDTH {
        bail!("Expected {HEIGHT}x{WIDTH} images, found {rows}x{cols}");
    }

    let payload  = &bytes[16..];
    let expected = count * rows * cols;
    if payload.len() < expected {
        bail!(
            "Image payload truncated: {} bytes for {count} images (need {expected})",
            payload.len()
        );
    }

    Ok(payload[..expected]
        .chunks_exact(rows * cols)
        .map(|chunk| chunk.to_vec())
        .collect())
}

/// Parse an IDX1 label file.
pub fn parse_labels(bytes: &[u8]) -> Result<Vec<u8>> {
    let magic = be_u32(bytes, 0)?;
    if magic != LABEL_MAGIC {
        bail!("Bad label file magic {magic:#010x}, expected {LABEL_MAGIC:#010x}");
    }

    let count   = be_u32(bytes, 4)? as usize;
    let payload = &bytes[8..];
    if payload.len() < count {
        bail!("Label payload truncated: {} bytes for {count} labels", payload.len());
    }

    let labels = payload[..count].to_vec();
    if let Some(bad) = labels.iter().find(|&&l| l as usize >= NUM_CLASSES) {
        bail!("Label {bad} is outside 0..{NUM_CLASSES}");
    }
    Ok(labels)
}

/// Pair parsed images with their labels.
pub fn zip_samples(images: Vec<Vec<u8>>, labels: Vec<u8>) -> Result<Vec<DigitSample>> {
    if images.len() != labels.len() {
        bail!("{} images but {} labels", images.len(), labels.len());
    }
    Ok(images
        .into_iter()
        .zip(labels)
        .map(|(pixels, label)| DigitSample::new(pixels, label))
        .collect())
}

// ─── IdxDirSource ─────────────────────────────────────────────────────────────
/// Reads one MNIST split from a directory of IDX files.
pub struct IdxDirSource {
    dir:   PathBuf,
    split: Split,
}

impl IdxDirSource {
    pub fn new(dir: impl Into<PathBuf>, split: Split) -> Self {
        Self { dir: dir.into(), split }
    }

    fn file_names(&self) -> (&'static str, &'static str) {
        match self.split {
            Split::Train => (TRAIN_IMAGES, TRAIN_LABELS),
            Split::Test  => (TEST_IMAGES, TEST_LABELS),
        }
    }

    /// Find `name` or `name.gz` inside the directory.
    fn locate(&self, name: &str) -> Option<PathBuf> {
        let plain = self.dir.join(name);
        if plain.is_file() {
            return Some(plain);
        }
        let gz = self.dir.join(format!("{name}.gz"));
        gz.is_file().then_some(gz)
    }

    /// True when both the image and label files of this split are present.
    pub fn is_available(&self) -> bool {
        let (images, labels) = self.file_names();
        self.locate(images).is_some() && self.locate(labels).is_some()
    }
}

impl DigitSource for IdxDirSource {
    fn load_all(&self) -> Result<Vec<DigitSample>> {
        let (image_name, label_name) = self.file_names();

        let image_path = self.locate(image_name).with_context(|| {
            format!("'{image_name}' not found in '{}'", self.dir.display())
        })?;
        let label_path = self.locate(label_name).with_context(|| {
            format!("'{label_name}' not found in '{}'", self.dir.display())
        })?;

        let images = parse_images(&read_file(&image_path)?)
            .with_context(|| format!("Invalid image file '{}'", image_path.display()))?;
        let labels = parse_labels(&read_file(&label_path)?)
            .with_context(|| format!("Invalid label file '{}'", label_path.display()))?;

        tracing::debug!(
            "Read {} images and {} labels from '{}'",
            images.len(),
            labels.len(),
            self.dir.display()
        );

        zip_samples(images, labels)
    }

    fn describe(&self) -> String {
        format!("IDX files in '{}' ({})", self.dir.display(), self.split)
    }
}
