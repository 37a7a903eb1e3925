//! # 配置模块
//!
//! 所有尺寸上限与协议常量集中在一个不可变的 [`CodecConfig`] 值中，
//! 由调用方显式传给每个编解码入口，不存在进程级的可变全局状态。

use crate::constants::{
    FILE_HEADER_MAGIC, MAX_EMBED_FILE_SIZE, MAX_FILENAME_LENGTH, MAX_IMAGE_DIMENSION,
    MAX_IMAGE_FILE_SIZE, MAX_MESSAGE_LENGTH, MAX_PIXEL_COUNT, MAX_SANITIZED_FILENAME_LENGTH,
    MAX_SECRET_LENGTH, PBKDF2_ITERATIONS,
};

/// 各编解码器共享的上限与协议参数。
///
/// 通过 [`CodecConfig::default`] 构造，再用 `with_*` 方法调整。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    pub magic: u8,
    pub max_filename_length: usize,
    pub max_sanitized_filename_length: usize,
    pub max_embed_file_size: usize,
    pub max_message_length: usize,
    pub max_secret_length: usize,
    pub max_image_dimension: u32,
    pub max_pixel_count: u64,
    pub max_image_file_size: usize,
    pub pbkdf2_iterations: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            magic: FILE_HEADER_MAGIC,
            max_filename_length: MAX_FILENAME_LENGTH,
            max_sanitized_filename_length: MAX_SANITIZED_FILENAME_LENGTH,
            max_embed_file_size: MAX_EMBED_FILE_SIZE,
            max_message_length: MAX_MESSAGE_LENGTH,
            max_secret_length: MAX_SECRET_LENGTH,
            max_image_dimension: MAX_IMAGE_DIMENSION,
            max_pixel_count: MAX_PIXEL_COUNT,
            max_image_file_size: MAX_IMAGE_FILE_SIZE,
            pbkdf2_iterations: PBKDF2_ITERATIONS,
        }
    }
}

impl CodecConfig {
    /// 文件名长度字段只有 1 个字节，超过 255 的值会被截到 255。
    pub fn with_max_filename_length(mut self, value: usize) -> Self {
        self.max_filename_length = value.min(MAX_FILENAME_LENGTH);
        self
    }

    pub fn with_max_sanitized_filename_length(mut self, value: usize) -> Self {
        self.max_sanitized_filename_length = value.max(1);
        self
    }

    pub fn with_max_embed_file_size(mut self, value: usize) -> Self {
        self.max_embed_file_size = value.min(u32::MAX as usize);
        self
    }

    pub fn with_max_message_length(mut self, value: usize) -> Self {
        self.max_message_length = value.min(u32::MAX as usize);
        self
    }

    pub fn with_max_secret_length(mut self, value: usize) -> Self {
        self.max_secret_length = value;
        self
    }

    pub fn with_max_image_dimension(mut self, value: u32) -> Self {
        self.max_image_dimension = value;
        self
    }

    pub fn with_max_pixel_count(mut self, value: u64) -> Self {
        self.max_pixel_count = value;
        self
    }

    pub fn with_max_image_file_size(mut self, value: usize) -> Self {
        self.max_image_file_size = value;
        self
    }

    /// 较小的迭代次数只应在测试中使用。
    pub fn with_pbkdf2_iterations(mut self, value: u32) -> Self {
        self.pbkdf2_iterations = value.max(1);
        self
    }
}
