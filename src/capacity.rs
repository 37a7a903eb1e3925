//! # 容量与校验模块
//!
//! 计算载体能容纳的载荷字节数，并在分配任何与不可信输入成比例的缓冲区之前
//! 校验图像尺寸与位深。

use crate::config::CodecConfig;
use crate::constants::MAX_BIT_DEPTH;
use crate::error::{Result, StegoError};
use crate::jpeg::CoefficientSet;

/// 每个 RGB 通道字节承载的载荷位数，取值范围为闭区间 [1, 4]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitDepth(u8);

impl BitDepth {
    pub const ONE: BitDepth = BitDepth(1);

    /// 越界的位深在 API 边界直接报错，不做静默截断。
    pub fn new(depth: u8) -> Result<Self> {
        if (1..=MAX_BIT_DEPTH).contains(&depth) {
            Ok(Self(depth))
        } else {
            Err(StegoError::InvalidParameter(format!(
                "bit depth must be between 1 and {MAX_BIT_DEPTH}, got {depth}"
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// 清除低 `depth` 位的掩码，即 `0xFF << depth`。
    pub fn clear_mask(self) -> u8 {
        0xFF << self.0
    }
}

impl Default for BitDepth {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = StegoError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

/// 校验图像尺寸：宽高为正，单边与像素总数都不超过配置上限。
pub fn validate_dimensions(width: u32, height: u32, config: &CodecConfig) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(StegoError::InvalidParameter(format!(
            "image dimensions must be positive, got {width}x{height}"
        )));
    }

    if width > config.max_image_dimension || height > config.max_image_dimension {
        return Err(StegoError::InvalidParameter(format!(
            "image dimensions {width}x{height} exceed the maximum of {} per axis",
            config.max_image_dimension
        )));
    }

    let pixels = u64::from(width) * u64::from(height);
    if pixels > config.max_pixel_count {
        return Err(StegoError::InvalidParameter(format!(
            "image has {pixels} pixels, the maximum is {}",
            config.max_pixel_count
        )));
    }

    Ok(())
}

/// 像素载体可承载的载荷位数：`width * height * 3 * depth` (不含 alpha 通道)。
pub fn pixel_capacity_bits(
    width: u32,
    height: u32,
    depth: BitDepth,
    config: &CodecConfig,
) -> Result<usize> {
    validate_dimensions(width, height, config)?;
    Ok(width as usize * height as usize * 3 * depth.get() as usize)
}

/// 像素载体可承载的载荷字节数：`floor(width * height * 3 * depth / 8)`。
pub fn calculate_pixel_capacity(
    width: u32,
    height: u32,
    depth: BitDepth,
    config: &CodecConfig,
) -> Result<usize> {
    Ok(pixel_capacity_bits(width, height, depth, config)? / 8)
}

/// JPEG 载体可承载的载荷字节数：可用系数的个数除以 8。
///
/// `use_chroma` 为 `false` 时只统计亮度分量。
pub fn calculate_jpeg_capacity(coefficients: &CoefficientSet, use_chroma: bool) -> usize {
    coefficients.usable_count(use_chroma) / 8
}
