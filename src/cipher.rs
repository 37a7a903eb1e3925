//! # 异或掩码模块
//!
//! 图像载荷使用的对称混淆层：按密码字节循环异或。
//! 它只是混淆，不提供完整性或保密性保证；错误的密码不会报错，只会得到乱码。
//! 需要真正加密时应使用文本编解码器中的 AES-CTR 流程 (见 [`crate::crypto`])。

/// 用密码对数据做循环异或。密码为空时原样返回。
///
/// 该操作是自逆的：对结果再次调用即可还原。
pub fn apply(data: &[u8], password: &str) -> Vec<u8> {
    let mut out = data.to_vec();
    apply_in_place(&mut out, password);
    out
}

/// [`apply`] 的原地版本。
pub fn apply_in_place(data: &mut [u8], password: &str) {
    let key = password.as_bytes();
    if key.is_empty() {
        return;
    }

    data.iter_mut()
        .zip(key.iter().cycle())
        .for_each(|(byte, k)| *byte ^= k);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_password_is_passthrough() {
        assert_eq!(apply(b"plain", ""), b"plain");
    }

    #[test]
    fn test_apply_is_self_inverse() {
        let data = b"attack at dawn, bring snacks";
        let masked = apply(data, "k3y");
        assert_ne!(masked.as_slice(), data.as_slice());
        assert_eq!(apply(&masked, "k3y"), data);
    }

    #[test]
    fn test_key_repeats_over_data() {
        let masked = apply(&[0, 0, 0, 0], "ab");
        assert_eq!(masked, vec![b'a', b'b', b'a', b'b']);
    }
}
