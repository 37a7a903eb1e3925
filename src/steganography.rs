//! # 像素 LSB 隐写模块
//!
//! 在 RGBA 像素缓冲区的 RGB 通道低位中写入或读取载荷比特，alpha 字节永远不动。
//! 嵌入与提取必须使用相同的位深，否则读出的只是乱码，这一点无法自动检测。

use crate::capacity::BitDepth;
use crate::error::{Result, StegoError};

/// RGBA 中每个像素占用的字节数。
const BYTES_PER_PIXEL: usize = 4;

/// alpha 通道在像素内的偏移。
const ALPHA_OFFSET: usize = 3;

fn check_rgba_len(pixels: &[u8]) -> Result<()> {
    if pixels.len() % BYTES_PER_PIXEL != 0 {
        return Err(StegoError::InvalidParameter(format!(
            "pixel buffer length {} is not a multiple of 4 (RGBA)",
            pixels.len()
        )));
    }
    Ok(())
}

/// 给定 RGBA 缓冲区在指定位深下可承载的比特数。
pub fn capacity_bits(pixels: &[u8], depth: BitDepth) -> usize {
    pixels.len() / BYTES_PER_PIXEL * 3 * depth.get() as usize
}

fn color_bytes_mut(pixels: &mut [u8]) -> impl Iterator<Item = &mut u8> {
    pixels
        .iter_mut()
        .enumerate()
        .filter(|(i, _)| i % BYTES_PER_PIXEL != ALPHA_OFFSET)
        .map(|(_, byte)| byte)
}

fn color_bytes(pixels: &[u8]) -> impl Iterator<Item = u8> + '_ {
    pixels
        .iter()
        .enumerate()
        .filter(|(i, _)| i % BYTES_PER_PIXEL != ALPHA_OFFSET)
        .map(|(_, &byte)| byte)
}

/// 将比特写入像素的 RGB 低位，每个通道字节写入最多 `depth` 位。
///
/// # Errors
///
/// 缓冲区长度不是 4 的倍数，或比特数超过容量时返回错误，此时缓冲区未被修改。
pub fn embed(pixels: &mut [u8], bits: &[u8], depth: BitDepth) -> Result<()> {
    check_rgba_len(pixels)?;

    let available = capacity_bits(pixels, depth);
    if bits.len() > available {
        return Err(StegoError::PixelCapacityExceeded {
            needed: bits.len(),
            available,
        });
    }

    let mask = depth.clear_mask();
    for (byte, chunk) in color_bytes_mut(pixels).zip(bits.chunks(depth.get() as usize)) {
        let value = chunk
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &bit)| acc | ((bit & 1) << i));
        *byte = (*byte & mask) | value;
    }

    log::debug!(
        "embedded {} bits into {} pixels at depth {}",
        bits.len(),
        pixels.len() / BYTES_PER_PIXEL,
        depth.get()
    );

    Ok(())
}

/// 按与 [`embed`] 相同的顺序读取 `bit_count` 个比特，超出容量的部分被截断。
pub fn extract(pixels: &[u8], bit_count: usize, depth: BitDepth) -> Result<Vec<u8>> {
    check_rgba_len(pixels)?;

    let bit_count = bit_count.min(capacity_bits(pixels, depth));
    let depth = depth.get() as usize;

    let bits = color_bytes(pixels)
        .flat_map(|byte| (0..depth).map(move |i| (byte >> i) & 1))
        .take(bit_count)
        .collect();

    Ok(bits)
}
