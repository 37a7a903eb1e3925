//! # veilcodec 库
//!
//! 本库包含隐写编解码引擎的核心逻辑：
//!
//! * [`steganography`]：RGBA 像素的 RGB 低位嵌入，位深 1-4。
//! * [`jpeg`]：JPEG 量化 DCT 交流系数的幅值低位嵌入，可经受重新编码。
//! * [`zwc`]：在普通文本中用零宽字符隐藏压缩 (可选加密) 后的秘密消息。
//! * [`header`]、[`cipher`]、[`bits`]：载荷帧、异或掩码与比特流。
//! * [`carrier`]：与图像编解码库的衔接以及端到端的隐藏 / 恢复流程。
//! * [`stats`]：只读的可视化与统计。

// 声明库包含的所有模块。

pub mod bits;
pub mod capacity;
pub mod carrier;
pub mod cipher;
pub mod cli;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod handler;
pub mod header;
pub mod jpeg;
pub mod stats;
pub mod steganography;
pub mod zwc;

pub use capacity::BitDepth;
pub use config::CodecConfig;
pub use error::{Result, StegoError};
pub use header::Payload;
