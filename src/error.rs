//! # 错误模块
//!
//! 编解码引擎的错误分类。预期中的"未命中" (找不到文件头、文本中没有隐藏数据)
//! 不属于错误，由各函数以 `Option` 形式返回。

use thiserror::Error;

/// 编解码引擎中所有真正的失败。
#[derive(Error, Debug)]
pub enum StegoError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Not enough space in the image pixels. Required: {needed} bits, Available: {available} bits")]
    PixelCapacityExceeded { needed: usize, available: usize },

    #[error("Not enough usable JPEG coefficients. Required: {needed} bits, Available: {available} bits")]
    CoefficientCapacityExceeded { needed: usize, available: usize },

    #[error("Unsupported carrier: {0}")]
    UnsupportedCarrier(String),

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Decode failure: {0}")]
    DecodeFailure(String),

    #[error("Crypto failure: {0}. Check your password.")]
    CryptoFailure(String),

    #[error("Image codec error: {0}")]
    ImageCodec(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, StegoError>;
