use crate::utils::error::RecognitionError;
use crate::Result;
use image::{DynamicImage, GenericImageView, ImageError, ImageReader};
use std::fs;
use std::path::{Path, PathBuf};

/// 支持的图像扩展名（不区分大小写）
pub const SUPPORTED_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "webp", "bmp", "tiff", "tif"];

pub struct ImageLoader;

impl ImageLoader {
    /// 列出目录下所有支持的图像文件，去重并按路径字符串排序。
    ///
    /// 目录不存在或没有匹配文件时返回空列表，不视为错误。
    pub fn find_images(folder: &Path) -> Vec<PathBuf> {
        let entries = match fs::read_dir(folder) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Cannot read images folder {}: {}", folder.display(), e);
                return Vec::new();
            }
        };

        let mut images: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && Self::is_supported_path(path))
            .collect();

        images.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
        images.dedup_by(|a, b| a.to_string_lossy() == b.to_string_lossy());

        tracing::debug!("Found {} image(s) in {}", images.len(), folder.display());
        images
    }

    /// 扩展名是否在白名单内
    pub fn is_supported_path(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                SUPPORTED_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }

    /// 从文件路径加载图像，格式按文件内容识别而不是扩展名
    pub fn from_path(path: &Path) -> Result<DynamicImage> {
        let load_error = |source: ImageError| RecognitionError::ImageLoad {
            path: path.to_path_buf(),
            source,
        };

        let image = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| load_error(ImageError::IoError(e)))?
            .decode()
            .map_err(load_error)?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(RecognitionError::ImageProcessing(format!(
                "Image {} has zero size: {}x{}",
                path.display(),
                width,
                height
            )));
        }

        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn finds_only_supported_files_sorted() {
        let dir = tempdir().unwrap();
        for name in ["b.png", "a.JPG", "c.Tif", "d.webp", "notes.txt", "archive.zip", "noext"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("folder.jpg")).unwrap();

        let found = ImageLoader::find_images(dir.path());
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.JPG", "b.png", "c.Tif", "d.webp"]);
    }

    #[test]
    fn missing_folder_is_empty() {
        let dir = tempdir().unwrap();
        assert!(ImageLoader::find_images(&dir.path().join("nope")).is_empty());
    }

    #[test]
    fn empty_folder_is_empty() {
        let dir = tempdir().unwrap();
        assert!(ImageLoader::find_images(dir.path()).is_empty());
    }

    #[test]
    fn extension_check_ignores_case() {
        assert!(ImageLoader::is_supported_path(Path::new("x.JpEg")));
        assert!(ImageLoader::is_supported_path(Path::new("x.BMP")));
        assert!(!ImageLoader::is_supported_path(Path::new("x.gif")));
        assert!(!ImageLoader::is_supported_path(Path::new("jpg")));
    }

    #[test]
    fn corrupted_file_is_load_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"definitely not a png").unwrap();

        let err = ImageLoader::from_path(&path).unwrap_err();
        assert_eq!(err.error_code(), "IMAGE_LOAD_ERROR");
        assert!(err.to_string().contains("broken.png"));
    }

    #[test]
    fn format_comes_from_content_not_extension() {
        let dir = tempdir().unwrap();
        let png = dir.path().join("source.png");
        RgbImage::from_pixel(20, 20, Rgb([40, 80, 120])).save(&png).unwrap();

        let renamed = dir.path().join("photo.jpg");
        fs::copy(&png, &renamed).unwrap();

        let image = ImageLoader::from_path(&renamed).unwrap();
        assert_eq!(image.dimensions(), (20, 20));
    }

    #[test]
    fn missing_file_is_load_error() {
        let dir = tempdir().unwrap();
        let err = ImageLoader::from_path(&dir.path().join("gone.png")).unwrap_err();
        assert_eq!(err.error_code(), "IMAGE_LOAD_ERROR");
        assert!(err.to_string().contains("gone.png"));
    }

    #[test]
    fn loads_valid_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ok.png");
        RgbImage::from_pixel(10, 7, Rgb([1, 2, 3])).save(&path).unwrap();

        let image = ImageLoader::from_path(&path).unwrap();
        assert_eq!(image.dimensions(), (10, 7));
    }
}
