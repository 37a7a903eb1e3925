//! # JPEG 系数隐写模块
//!
//! 在量化后的 DCT 交流系数的幅值最低位中嵌入载荷。系数本身就是 JPEG 重新编码后
//! 保存的表示，因此这条路径能经受住重新编码，而像素 LSB 不能。
//!
//! 系数的解析与重新编码由外部的 [`CoefficientCodec`] 提供，本模块只处理系数集合。

use crate::error::{Result, StegoError};

/// 每个 8×8 块中的系数个数。
pub const BLOCK_LEN: usize = 64;

/// 一个 8×8 系数块，下标 0 为直流 (DC) 系数。
pub type Block = [i16; BLOCK_LEN];

/// 颜色分量的种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Luma,
    ChromaBlue,
    ChromaRed,
}

impl ComponentKind {
    pub fn is_chroma(self) -> bool {
        !matches!(self, ComponentKind::Luma)
    }
}

/// 单个分量的全部系数块。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub kind: ComponentKind,
    pub blocks: Vec<Block>,
}

impl Component {
    pub fn new(kind: ComponentKind, blocks: Vec<Block>) -> Self {
        Self { kind, blocks }
    }
}

/// 一张 JPEG 图像的 Y/Cb/Cr 系数集合。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoefficientSet {
    pub components: Vec<Component>,
}

/// 系数幅值不为 0 或 1 时才可用于嵌入。
pub fn is_usable(coefficient: i16) -> bool {
    coefficient.unsigned_abs() > 1
}

/// 翻转幅值最低位后的新幅值，输入幅值至少为 2。
///
/// 幅值 2 向零收缩会坍缩为 1，因此升到 3；其余幅值向零收缩 1。
/// 结果永远不会落到 0 或 1，嵌入前后的可用系数集合保持一致。
fn toggled_magnitude(magnitude: u16) -> u16 {
    if magnitude == 2 { 3 } else { magnitude - 1 }
}

impl CoefficientSet {
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }

    /// 参与嵌入的分量：不使用色度时只保留亮度分量。
    pub fn selected(&self, use_chroma: bool) -> impl Iterator<Item = &Component> {
        self.components
            .iter()
            .filter(move |c| use_chroma || !c.kind.is_chroma())
    }

    fn selected_mut(&mut self, use_chroma: bool) -> impl Iterator<Item = &mut Component> {
        self.components
            .iter_mut()
            .filter(move |c| use_chroma || !c.kind.is_chroma())
    }

    /// 按嵌入顺序遍历所有可用的交流系数。
    pub fn usable_coefficients(&self, use_chroma: bool) -> impl Iterator<Item = i16> + '_ {
        self.selected(use_chroma)
            .flat_map(|c| c.blocks.iter())
            .flat_map(|block| block[1..].iter().copied())
            .filter(|&v| is_usable(v))
    }

    pub fn usable_count(&self, use_chroma: bool) -> usize {
        self.usable_coefficients(use_chroma).count()
    }
}

/// 将比特嵌入系数集合。函数取得集合的所有权，并返回修改后的集合。
///
/// 遍历顺序为分量、块、交流下标 1..63。可用系数的幅值最低位已等于载荷位时不做修改；
/// 否则幅值加减 1 并保留符号。
///
/// 会坍缩为 1 的翻转 (幅值 2) 不跳过该系数，而是把幅值升为 3 并消耗该载荷位，
/// 而不是跳过该系数且不消耗载荷位。
/// 每个可用系数恰好消耗一个载荷位，因此
/// [`calculate_jpeg_capacity`](crate::capacity::calculate_jpeg_capacity) 给出的容量是精确的。
///
/// # Errors
///
/// 载荷比特数超过可用系数个数时返回
/// [`StegoError::CoefficientCapacityExceeded`]，此时不做任何修改。
pub fn embed(
    mut coefficients: CoefficientSet,
    bits: &[u8],
    use_chroma: bool,
) -> Result<CoefficientSet> {
    let available = coefficients.usable_count(use_chroma);
    if bits.len() > available {
        return Err(StegoError::CoefficientCapacityExceeded {
            needed: bits.len(),
            available,
        });
    }

    let mut pending = bits.iter().map(|&bit| bit & 1).peekable();
    let mut changed = 0usize;

    'outer: for component in coefficients.selected_mut(use_chroma) {
        for block in component.blocks.iter_mut() {
            for coefficient in block[1..].iter_mut() {
                if !is_usable(*coefficient) {
                    continue;
                }
                let Some(&bit) = pending.peek() else {
                    break 'outer;
                };

                let magnitude = coefficient.unsigned_abs();
                if (magnitude & 1) as u8 != bit {
                    let next = toggled_magnitude(magnitude) as i16;
                    *coefficient = if *coefficient < 0 { -next } else { next };
                    changed += 1;
                }
                pending.next();
            }
        }
    }

    log::debug!(
        "embedded {} bits into JPEG coefficients, {changed} coefficients changed",
        bits.len()
    );

    Ok(coefficients)
}

/// 按与 [`embed`] 相同的遍历读取 `|系数| & 1`，最多 `bit_count` 个比特。
pub fn extract(coefficients: &CoefficientSet, bit_count: usize, use_chroma: bool) -> Vec<u8> {
    coefficients
        .usable_coefficients(use_chroma)
        .map(|v| (v.unsigned_abs() & 1) as u8)
        .take(bit_count)
        .collect()
}

/// 外部 JPEG 系数编解码器。
///
/// 负责从 JPEG 字节流中取出量化系数，以及在修改后重新编码。
pub trait CoefficientCodec {
    /// 不是 JPEG 或无法解析时返回 `None`。
    fn extract_coefficients(&self, bytes: &[u8]) -> Option<CoefficientSet>;

    fn encode_from_coefficients(&self, coefficients: &CoefficientSet) -> Result<Vec<u8>>;
}
