//! Label images stored as single-channel integer TIFF.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder};

use crate::common::{Buffer2, LabelImage};
use crate::error::LoadError;

/// Load an 8, 16 or 32-bit integer grayscale TIFF as a label image.
///
/// Signed samples are accepted as long as no label is negative.
pub fn load_label_tiff(path: &Path) -> Result<LabelImage, LoadError> {
    let tiff_err = |source| LoadError::Tiff {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut decoder = Decoder::new(file).map_err(tiff_err)?.with_limits(Limits::unlimited());

    let color = decoder.colortype().map_err(tiff_err)?;
    if !matches!(color, tiff::ColorType::Gray(_)) {
        return Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: format!("expected single-channel grayscale, got {color:?}"),
        });
    }

    let (width, height) = decoder.dimensions().map_err(tiff_err)?;
    let (width, height) = (width as usize, height as usize);

    let pixels: Vec<u32> = match decoder.read_image().map_err(tiff_err)? {
        DecodingResult::U8(buf) => buf.into_iter().map(u32::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(u32::from).collect(),
        DecodingResult::U32(buf) => buf,
        DecodingResult::I8(buf) => non_negative(path, width, buf)?,
        DecodingResult::I16(buf) => non_negative(path, width, buf)?,
        DecodingResult::I32(buf) => non_negative(path, width, buf)?,
        other => {
            return Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
                reason: format!("sample type {} is not an integer of 8-32 bits", sample_kind(&other)),
            });
        }
    };

    if pixels.len() != width * height {
        return Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: format!("{} samples for a {width}x{height} image", pixels.len()),
        });
    }

    Ok(Buffer2::new(width, height, pixels))
}

/// Write a label image as a 32-bit grayscale TIFF.
pub fn save_label_tiff(path: &Path, labels: &LabelImage) -> Result<(), LoadError> {
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let tiff_err = |source| LoadError::Tiff {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file)).map_err(tiff_err)?;
    encoder
        .write_image::<colortype::Gray32>(labels.width() as u32, labels.height() as u32, labels.pixels())
        .map_err(tiff_err)?;
    Ok(())
}

/// Convert signed samples, failing on the first negative one.
fn non_negative<T>(path: &Path, width: usize, samples: Vec<T>) -> Result<Vec<u32>, LoadError>
where
    T: Copy + Into<i64>,
{
    samples
        .into_iter()
        .enumerate()
        .map(|(i, sample)| {
            let value: i64 = sample.into();
            u32::try_from(value).map_err(|_| LoadError::NegativeLabel {
                path: path.to_path_buf(),
                value,
                x: i % width.max(1),
                y: i / width.max(1),
            })
        })
        .collect()
}

fn sample_kind(result: &DecodingResult) -> &'static str {
    match result {
        DecodingResult::U8(_) => "u8",
        DecodingResult::U16(_) => "u16",
        DecodingResult::U32(_) => "u32",
        DecodingResult::U64(_) => "u64",
        DecodingResult::I8(_) => "i8",
        DecodingResult::I16(_) => "i16",
        DecodingResult::I32(_) => "i32",
        DecodingResult::I64(_) => "i64",
        DecodingResult::F32(_) => "f32",
        DecodingResult::F64(_) => "f64",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join("coloc_test_label_tiff/labels.tif");
        let labels = Buffer2::new(3, 2, vec![0, 1, 70_000, 2, 0, 1]);

        save_label_tiff(&path, &labels).unwrap();
        let loaded = load_label_tiff(&path).unwrap();
        assert_eq!(loaded, labels);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_u16() {
        let path = std::env::temp_dir().join("coloc_test_label_tiff_u16.tif");
        {
            let file = File::create(&path).unwrap();
            let mut encoder = TiffEncoder::new(BufWriter::new(file)).unwrap();
            encoder
                .write_image::<colortype::Gray16>(2, 2, &[0u16, 5, 5, 300])
                .unwrap();
        }
        let loaded = load_label_tiff(&path).unwrap();
        assert_eq!(loaded.pixels(), &[0, 5, 5, 300]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_signed_labels() {
        let path = std::env::temp_dir().join("coloc_test_label_tiff_i32.tif");
        {
            let file = File::create(&path).unwrap();
            let mut encoder = TiffEncoder::new(BufWriter::new(file)).unwrap();
            encoder
                .write_image::<colortype::GrayI32>(2, 2, &[0i32, 1, 1, 2])
                .unwrap();
        }
        let loaded = load_label_tiff(&path).unwrap();
        assert_eq!(loaded.pixels(), &[0, 1, 1, 2]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_negative_label_rejected() {
        let path = std::env::temp_dir().join("coloc_test_label_tiff_negative.tif");
        {
            let file = File::create(&path).unwrap();
            let mut encoder = TiffEncoder::new(BufWriter::new(file)).unwrap();
            encoder
                .write_image::<colortype::GrayI16>(2, 2, &[0i16, 3, -1, 3])
                .unwrap();
        }
        match load_label_tiff(&path).unwrap_err() {
            LoadError::NegativeLabel { value, x, y, .. } => assert_eq!((value, x, y), (-1, 0, 1)),
            other => panic!("unexpected error: {other}"),
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_rgb_rejected() {
        let path = std::env::temp_dir().join("coloc_test_label_tiff_rgb.tif");
        {
            let file = File::create(&path).unwrap();
            let mut encoder = TiffEncoder::new(BufWriter::new(file)).unwrap();
            encoder
                .write_image::<colortype::RGB8>(1, 1, &[1u8, 2, 3])
                .unwrap();
        }
        let err = load_label_tiff(&path).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { .. }));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("coloc_test_no_such_labels.tif");
        let err = load_label_tiff(&path).unwrap_err();
        match err {
            LoadError::Io { source, .. } => assert_eq!(source.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }
}
