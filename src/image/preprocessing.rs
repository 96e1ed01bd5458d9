use crate::config::{Normalization, PreprocessConfig, TensorLayout};
use crate::image::ImageLoader;
use crate::Result;
use image::{imageops::FilterType, DynamicImage};
use ndarray::Array4;
use std::path::Path;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// 将原始图像转换为模型输入张量
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    config: PreprocessConfig,
}

impl ImagePreprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// 模型要求的输入形状（含batch维度）
    pub fn input_shape(&self) -> [usize; 4] {
        let (w, h) = self.config.input_size;
        let (w, h) = (w as usize, h as usize);
        match self.config.layout {
            TensorLayout::Nhwc => [1, h, w, 3],
            TensorLayout::Nchw => [1, 3, h, w],
        }
    }

    /// 从文件加载并预处理
    pub fn preprocess_path(&self, path: &Path) -> Result<Array4<f32>> {
        let image = ImageLoader::from_path(path)?;
        self.preprocess(&image)
    }

    /// 缩放到固定尺寸（不保持宽高比）、归一化并添加batch维度
    pub fn preprocess(&self, image: &DynamicImage) -> Result<Array4<f32>> {
        let (target_w, target_h) = self.config.input_size;
        let resized = image::imageops::resize(
            &image.to_rgb8(),
            target_w,
            target_h,
            FilterType::Triangle,
        );

        let mut tensor = Array4::<f32>::zeros(self.input_shape());
        for (x, y, pixel) in resized.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for c in 0..3 {
                let value = self.normalize(pixel[c], c);
                match self.config.layout {
                    TensorLayout::Nhwc => tensor[[0, y, x, c]] = value,
                    TensorLayout::Nchw => tensor[[0, c, y, x]] = value,
                }
            }
        }

        Ok(tensor)
    }

    fn normalize(&self, value: u8, channel: usize) -> f32 {
        let value = value as f32;
        match self.config.normalization {
            Normalization::Tf => value / 127.5 - 1.0,
            Normalization::Torch => (value / 255.0 - IMAGENET_MEAN[channel]) / IMAGENET_STD[channel],
        }
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new(PreprocessConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb, RgbImage, Rgba};

    #[test]
    fn any_size_becomes_fixed_shape() {
        let preprocessor = ImagePreprocessor::default();
        for (w, h) in [(1, 1), (224, 224), (640, 97), (31, 1200)] {
            let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([10, 20, 30])));
            let tensor = preprocessor.preprocess(&image).unwrap();
            assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        }
    }

    #[test]
    fn grayscale_and_alpha_are_converted_to_rgb() {
        let preprocessor = ImagePreprocessor::default();

        let gray: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_pixel(50, 40, Luma([255]));
        let tensor = preprocessor.preprocess(&DynamicImage::ImageLuma8(gray)).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);

        let rgba: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(8, 8, Rgba([0, 0, 0, 128]));
        let tensor = preprocessor.preprocess(&DynamicImage::ImageRgba8(rgba)).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
    }

    #[test]
    fn tf_normalization_maps_to_unit_range() {
        let preprocessor = ImagePreprocessor::default();
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 255, 0])));
        let tensor = preprocessor.preprocess(&image).unwrap();

        assert!((tensor[[0, 0, 0, 0]] + 1.0).abs() < 1e-6);
        assert!((tensor[[0, 100, 100, 1]] - 1.0).abs() < 1e-6);
        assert!(tensor.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn keeps_rgb_channel_order() {
        let preprocessor = ImagePreprocessor::default();
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 0, 0])));
        let tensor = preprocessor.preprocess(&image).unwrap();

        assert!((tensor[[0, 5, 5, 0]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 5, 5, 2]] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn nchw_layout_with_imagenet_stats() {
        let preprocessor = ImagePreprocessor::new(PreprocessConfig {
            layout: TensorLayout::Nchw,
            normalization: Normalization::Torch,
            ..PreprocessConfig::default()
        });
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 200, Rgb([255, 255, 255])));
        let tensor = preprocessor.preprocess(&image).unwrap();

        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
        let expected = (1.0 - IMAGENET_MEAN[0]) / IMAGENET_STD[0];
        assert!((tensor[[0, 0, 10, 10]] - expected).abs() < 1e-4);
    }

    #[test]
    fn missing_file_fails_before_tensor() {
        let preprocessor = ImagePreprocessor::default();
        let err = preprocessor
            .preprocess_path(Path::new("/definitely/not/here.jpg"))
            .unwrap_err();
        assert!(err.is_per_image());
    }
}
