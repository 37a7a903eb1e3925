//! # 诊断模块
//!
//! 只读的可视化与统计，仅用于展示，不影响嵌入与提取的正确性。

use crate::error::{Result, StegoError};
use crate::jpeg::{CoefficientSet, ComponentKind, is_usable};

/// 某一位平面上 1 与 0 的计数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitCounts {
    pub ones: usize,
    pub zeros: usize,
}

impl BitCounts {
    fn record(&mut self, bit: u8) {
        if bit & 1 == 1 {
            self.ones += 1;
        } else {
            self.zeros += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.ones + self.zeros
    }

    /// 1 所占的比例，没有样本时为 0。
    pub fn ones_ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.ones as f64 / total as f64,
        }
    }
}

/// RGB 三个通道最低位的计数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub red: BitCounts,
    pub green: BitCounts,
    pub blue: BitCounts,
}

/// 单个 JPEG 分量中可用系数最低位的计数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentStats {
    pub kind: ComponentKind,
    pub counts: BitCounts,
}

/// 统计结果。提供原始载体时附带与原始载体不同的位数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report<S, D> {
    Stats(S),
    StatsWithDelta { stats: S, changed: D },
}

impl<S, D> Report<S, D> {
    pub fn stats(&self) -> &S {
        match self {
            Report::Stats(stats) | Report::StatsWithDelta { stats, .. } => stats,
        }
    }

    pub fn changed(&self) -> Option<&D> {
        match self {
            Report::Stats(_) => None,
            Report::StatsWithDelta { changed, .. } => Some(changed),
        }
    }
}

/// 像素 LSB 统计，`changed` 依次为 R、G、B 通道中最低位改变的字节数。
pub type LsbReport = Report<ChannelStats, [usize; 3]>;

/// JPEG 系数统计，`changed` 为每个分量中最低位改变的交流系数个数。
pub type CoefficientReport = Report<Vec<ComponentStats>, Vec<usize>>;

fn check_rgba(pixels: &[u8], width: u32, height: u32) -> Result<()> {
    let expected = width as usize * height as usize * 4;
    if pixels.len() != expected {
        return Err(StegoError::InvalidParameter(format!(
            "expected {expected} RGBA bytes for {width}x{height}, got {}",
            pixels.len()
        )));
    }
    Ok(())
}

/// 生成 RGB 最低位的棋盘放大图 (RGBA)。
///
/// 每个通道最低位为 1 时输出亮值，为 0 时输出暗值，并按像素坐标的奇偶略微调制，
/// 便于肉眼分辨相邻像素。alpha 恒为 255。
pub fn generate_bit_sieve(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    check_rgba(pixels, width, height)?;

    let width = width as usize;
    let mut out = Vec::with_capacity(pixels.len());

    for (index, pixel) in pixels.chunks_exact(4).enumerate() {
        let (x, y) = (index % width, index / width);
        let even = (x + y) % 2 == 0;

        for &channel in &pixel[..3] {
            let value = match (channel & 1 == 1, even) {
                (true, true) => 255,
                (true, false) => 200,
                (false, true) => 0,
                (false, false) => 55,
            };
            out.push(value);
        }
        out.push(255);
    }

    Ok(out)
}

/// 统计 RGB 通道最低位；提供 `original` 时同时统计改变的位数。
pub fn generate_lsb_stats(pixels: &[u8], original: Option<&[u8]>) -> Result<LsbReport> {
    if pixels.len() % 4 != 0 {
        return Err(StegoError::InvalidParameter(format!(
            "pixel buffer length {} is not a multiple of 4 (RGBA)",
            pixels.len()
        )));
    }

    let mut stats = ChannelStats::default();
    for pixel in pixels.chunks_exact(4) {
        stats.red.record(pixel[0]);
        stats.green.record(pixel[1]);
        stats.blue.record(pixel[2]);
    }

    let Some(original) = original else {
        return Ok(Report::Stats(stats));
    };

    if original.len() != pixels.len() {
        return Err(StegoError::InvalidParameter(format!(
            "original buffer is {} bytes, modified buffer is {}",
            original.len(),
            pixels.len()
        )));
    }

    let mut changed = [0usize; 3];
    for (now, before) in pixels.chunks_exact(4).zip(original.chunks_exact(4)) {
        for channel in 0..3 {
            if (now[channel] ^ before[channel]) & 1 == 1 {
                changed[channel] += 1;
            }
        }
    }

    Ok(Report::StatsWithDelta { stats, changed })
}

/// 统计每个分量中可用交流系数的最低位；提供 `original` 时同时统计改变的系数个数。
///
/// `original` 必须与 `coefficients` 具有相同的分量与块结构。
pub fn generate_jpeg_coefficient_stats(
    coefficients: &CoefficientSet,
    original: Option<&CoefficientSet>,
) -> Result<CoefficientReport> {
    let stats: Vec<ComponentStats> = coefficients
        .components
        .iter()
        .map(|component| {
            let mut counts = BitCounts::default();
            component
                .blocks
                .iter()
                .flat_map(|block| block[1..].iter().copied())
                .filter(|&v| is_usable(v))
                .for_each(|v| counts.record((v.unsigned_abs() & 1) as u8));
            ComponentStats {
                kind: component.kind,
                counts,
            }
        })
        .collect();

    let Some(original) = original else {
        return Ok(Report::Stats(stats));
    };

    let same_shape = original.components.len() == coefficients.components.len()
        && original
            .components
            .iter()
            .zip(&coefficients.components)
            .all(|(a, b)| a.kind == b.kind && a.blocks.len() == b.blocks.len());
    if !same_shape {
        return Err(StegoError::InvalidParameter(
            "original coefficient set has a different component or block layout".into(),
        ));
    }

    let changed = coefficients
        .components
        .iter()
        .zip(&original.components)
        .map(|(now, before)| {
            now.blocks
                .iter()
                .zip(&before.blocks)
                .flat_map(|(a, b)| a[1..].iter().zip(&b[1..]))
                .filter(|&(&a, &b)| (a.unsigned_abs() ^ b.unsigned_abs()) & 1 == 1)
                .count()
        })
        .collect();

    Ok(Report::StatsWithDelta { stats, changed })
}
