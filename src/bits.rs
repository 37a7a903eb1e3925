//! # 位流模块
//!
//! 字节与单个比特之间的转换。每个字节按最低位优先展开为 8 个比特，
//! 比特以取值 0 或 1 的 `u8` 表示。

/// 将字节序列展开为比特序列，每个字节最低位在前。
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).map(move |i| (byte >> i) & 1))
        .collect()
}

/// 每 8 个比特合成一个字节，末尾不足 8 位的部分被丢弃。
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, &bit)| byte | ((bit & 1) << i))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_bits_is_lsb_first() {
        assert_eq!(bytes_to_bits(&[0b0000_0101]), vec![1, 0, 1, 0, 0, 0, 0, 0]);
        assert_eq!(bytes_to_bits(&[0x80, 0x01]).len(), 16);
    }

    #[test]
    fn test_roundtrip_all_byte_values() {
        let bytes: Vec<u8> = (0..=255).collect();
        assert_eq!(bits_to_bytes(&bytes_to_bits(&bytes)), bytes);
    }

    #[test]
    fn test_trailing_partial_group_is_dropped() {
        let mut bits = bytes_to_bits(b"ok");
        bits.extend_from_slice(&[1, 1, 1]);
        assert_eq!(bits_to_bytes(&bits), b"ok");
        assert!(bits_to_bytes(&[1, 0, 1]).is_empty());
    }
}
