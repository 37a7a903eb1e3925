use rand::{Rng, RngCore};
use std::cell::RefCell;
use veilcodec::bits::bytes_to_bits;
use veilcodec::capacity::calculate_jpeg_capacity;
use veilcodec::carrier::{
    hide_in_coefficients, hide_in_jpeg, reveal_from_coefficients, reveal_from_jpeg,
};
use veilcodec::jpeg::{
    Block, CoefficientCodec, CoefficientSet, Component, ComponentKind, embed, extract, is_usable,
};
use veilcodec::stats::{Report, generate_jpeg_coefficient_stats};
use veilcodec::{CodecConfig, Payload, StegoError};

/// 生成一个带有典型分布的系数块：大量 0 与 ±1，夹杂较大的幅值
fn random_block(rng: &mut impl Rng) -> Block {
    let mut block = [0i16; 64];
    block[0] = rng.random_range(-512..512);
    for coefficient in block[1..].iter_mut() {
        *coefficient = match rng.random_range(0..10) {
            0..=3 => 0,
            4..=5 => if rng.random_bool(0.5) { 1 } else { -1 },
            _ => rng.random_range(2..40) * if rng.random_bool(0.5) { 1 } else { -1 },
        };
    }
    block
}

fn random_set(blocks_per_component: usize) -> CoefficientSet {
    let mut rng = rand::rng();
    let kinds = [ComponentKind::Luma, ComponentKind::ChromaBlue, ComponentKind::ChromaRed];
    CoefficientSet::new(
        kinds
            .iter()
            .map(|&kind| {
                let blocks = (0..blocks_per_component).map(|_| random_block(&mut rng)).collect();
                Component::new(kind, blocks)
            })
            .collect(),
    )
}

fn random_bits(count: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    (0..count).map(|_| rng.random_range(0..=1)).collect()
}

/// 嵌入后提取的比特与载荷一致，且可用系数不会坍缩
#[test]
fn test_roundtrip_luma_and_chroma() {
    for use_chroma in [false, true] {
        let original = random_set(20);
        let capacity_bits = original.usable_count(use_chroma);
        let bits = random_bits(capacity_bits);

        let doctored = embed(original.clone(), &bits, use_chroma).unwrap();
        assert_eq!(extract(&doctored, bits.len(), use_chroma), bits);

        for (before, after) in original.components.iter().zip(&doctored.components) {
            for (a, b) in before.blocks.iter().zip(&after.blocks) {
                assert_eq!(a[0], b[0], "DC coefficients are never touched");
                for (&x, &y) in a[1..].iter().zip(&b[1..]) {
                    if is_usable(x) {
                        assert!(is_usable(y), "usable coefficient {x} collapsed to {y}");
                        assert_eq!(x.signum(), y.signum(), "sign must be preserved");
                        assert!((x - y).abs() <= 1);
                    } else {
                        assert_eq!(x, y, "unusable coefficients are never touched");
                    }
                }
            }
        }
    }
}

/// 不使用色度时，色度分量保持原样
#[test]
fn test_luma_only_leaves_chroma_untouched() {
    let original = random_set(10);
    let bits = random_bits(original.usable_count(false));
    let doctored = embed(original.clone(), &bits, false).unwrap();

    assert_eq!(doctored.components[1], original.components[1]);
    assert_eq!(doctored.components[2], original.components[2]);
}

/// 幅值为 2 且需要翻转时升为 3，而不是坍缩为 1
#[test]
fn test_magnitude_two_moves_away_from_collapse() {
    let mut block = [0i16; 64];
    block[1] = 2;
    block[2] = -2;
    block[3] = 5;
    block[4] = -4;
    let set = CoefficientSet::new(vec![Component::new(ComponentKind::Luma, vec![block])]);

    let doctored = embed(set, &[1, 1, 0, 1], false).unwrap();
    assert_eq!(&doctored.components[0].blocks[0][1..5], &[3, -3, 4, -3]);
}

/// 容量按可用系数个数计算，超出 1 字节时失败且不修改
#[test]
fn test_capacity_and_over_budget() {
    let original = random_set(8);
    let capacity = calculate_jpeg_capacity(&original, true);
    assert_eq!(capacity, original.usable_count(true) / 8);

    let mut bytes = vec![0u8; capacity + 1];
    rand::rng().fill_bytes(&mut bytes);
    let result = embed(original.clone(), &bytes_to_bits(&bytes), true);
    assert!(matches!(
        result,
        Err(StegoError::CoefficientCapacityExceeded { .. })
    ));

    let fits = embed(original.clone(), &bytes_to_bits(&bytes[..capacity]), true);
    assert!(fits.is_ok());
}

/// 经过帧头与口令掩码的完整往返
#[test]
fn test_payload_pipeline_roundtrip() {
    let config = CodecConfig::default();
    let original = random_set(40);

    let text = Payload::Text("coefficients survive recompression".to_string());
    let doctored = hide_in_coefficients(original.clone(), &text, "pw", true, &config).unwrap();
    assert_eq!(reveal_from_coefficients(&doctored, "pw", true, &config).unwrap(), text);

    let file = Payload::File {
        name: "key.txt".to_string(),
        data: b"ssh-ed25519 AAAA".to_vec(),
    };
    let doctored = hide_in_coefficients(original, &file, "", false, &config).unwrap();
    assert_eq!(reveal_from_coefficients(&doctored, "", false, &config).unwrap(), file);
}

/// 统计报告在提供原始系数时附带改变的个数
#[test]
fn test_coefficient_stats_delta() {
    let original = random_set(6);
    let bits = random_bits(original.usable_count(true));
    let doctored = embed(original.clone(), &bits, true).unwrap();

    let plain = generate_jpeg_coefficient_stats(&doctored, None).unwrap();
    assert!(plain.changed().is_none());
    let total: usize = plain.stats().iter().map(|s| s.counts.total()).sum();
    assert_eq!(total, original.usable_count(true));

    let with_delta = generate_jpeg_coefficient_stats(&doctored, Some(&original)).unwrap();
    let Report::StatsWithDelta { changed, .. } = with_delta else {
        panic!("expected a delta report");
    };

    let expected: usize = original
        .usable_coefficients(true)
        .zip(&bits)
        .filter(|&(v, &bit)| (v.unsigned_abs() & 1) as u8 != bit)
        .count();
    assert_eq!(changed.iter().sum::<usize>(), expected);
}

/// 用内存中的假编解码器模拟外部 JPEG 系数库
struct FakeJpegCodec {
    stored: RefCell<Option<CoefficientSet>>,
}

impl CoefficientCodec for FakeJpegCodec {
    fn extract_coefficients(&self, bytes: &[u8]) -> Option<CoefficientSet> {
        if bytes.starts_with(&[0xFF, 0xD8]) {
            self.stored.borrow().clone()
        } else {
            None
        }
    }

    fn encode_from_coefficients(
        &self,
        coefficients: &CoefficientSet,
    ) -> veilcodec::Result<Vec<u8>> {
        *self.stored.borrow_mut() = Some(coefficients.clone());
        Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
    }
}

#[test]
fn test_collaborator_roundtrip_and_rejection() {
    let config = CodecConfig::default();
    let codec = FakeJpegCodec {
        stored: RefCell::new(Some(random_set(30))),
    };
    let payload = Payload::Text("via the codec trait".to_string());

    let jpeg = hide_in_jpeg(&codec, &[0xFF, 0xD8], &payload, "", false, &config).unwrap();
    assert_eq!(reveal_from_jpeg(&codec, &jpeg, "", false, &config).unwrap(), payload);

    let result = hide_in_jpeg(&codec, b"GIF89a", &payload, "", false, &config);
    assert!(matches!(result, Err(StegoError::UnsupportedCarrier(_))));
}
