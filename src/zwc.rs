//! # 零宽字符文本隐写模块
//!
//! 把秘密文本藏进普通文本中。编码流程：
//!
//! 秘密文本 → DEFLATE 压缩 → (设置口令时) AES-256-CTR 加密 → 前置 4 字节小端长度
//! → 每字节 4 位六进制数字 → 映射为零宽字符 → 用起始 / 结束哨兵包裹 → 插入封面文本。
//!
//! 解码时只看零宽字符子序列，可见字符被忽略，因此载荷是追加在末尾还是分散在
//! 封面文本中都能被同样扫描到。

use crate::config::CodecConfig;
use crate::constants::{
    LENGTH_PREFIX_BYTES, ZWC_DIGITS, ZWC_DIGITS_PER_BYTE, ZWC_END_SENTINEL, ZWC_START_SENTINEL,
    ZWC_STRAY,
};
use crate::crypto;
use crate::error::{Result, StegoError};

/// 长度前缀占用的零宽字符数。
const LENGTH_PREFIX_CHARS: usize = LENGTH_PREFIX_BYTES * ZWC_DIGITS_PER_BYTE;

/// 文本编码选项。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextOptions {
    /// 为空或 `None` 时不加密。
    pub password: Option<String>,
    /// 把零宽字符分散到封面文本的字符之间，而不是追加在末尾。
    pub distribute: bool,
}

impl TextOptions {
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn distributed(mut self) -> Self {
        self.distribute = true;
        self
    }
}

/// 解码结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    /// 去掉所有零宽字符后的可见文本。
    pub visible_text: String,
    /// 文本中没有起始哨兵时为 `None`。
    pub secret_message: Option<String>,
}

fn digit_of(c: char) -> Option<u8> {
    ZWC_DIGITS.iter().position(|&d| d == c).map(|i| i as u8)
}

fn is_zero_width(c: char) -> bool {
    ZWC_DIGITS.contains(&c) || ZWC_STRAY.contains(&c)
}

fn effective_password(password: Option<&str>) -> Option<&str> {
    password.filter(|p| !p.is_empty())
}

/// 去掉文本中所有已知的零宽字符。
pub fn strip_zero_width(text: &str) -> String {
    text.chars().filter(|&c| !is_zero_width(c)).collect()
}

/// 把一个字节映射为 4 位六进制数字，高位在前。
pub fn byte_to_digits(value: u8) -> [u8; ZWC_DIGITS_PER_BYTE] {
    let v = value as u16;
    [
        (v / 216) as u8,
        (v / 36 % 6) as u8,
        (v / 6 % 6) as u8,
        (v % 6) as u8,
    ]
}

/// [`byte_to_digits`] 的逆运算。结果超过 255 时返回 [`StegoError::DecodeFailure`]。
pub fn digits_to_byte(digits: &[u8]) -> Result<u8> {
    if digits.len() != ZWC_DIGITS_PER_BYTE {
        return Err(StegoError::DecodeFailure(format!(
            "a byte needs {ZWC_DIGITS_PER_BYTE} base-6 digits, got {}",
            digits.len()
        )));
    }

    let value = digits
        .iter()
        .fold(0u16, |acc, &d| acc * 6 + d as u16);
    u8::try_from(value)
        .map_err(|_| StegoError::DecodeFailure(format!("digit group encodes {value}, not a byte")))
}

fn digits_to_bytes(digits: &[u8]) -> Result<Vec<u8>> {
    digits
        .chunks(ZWC_DIGITS_PER_BYTE)
        .map(digits_to_byte)
        .collect()
}

/// `data_len` 字节的数据编码后产生的零宽字符总数 (含长度前缀与两个哨兵)。
pub fn zwc_overhead(data_len: usize) -> usize {
    ZWC_START_SENTINEL.len()
        + LENGTH_PREFIX_CHARS
        + data_len * ZWC_DIGITS_PER_BYTE
        + ZWC_END_SENTINEL.len()
}

/// 把数据编码为带哨兵的零宽字符序列。
fn encode_zero_width(data: &[u8]) -> String {
    let mut framed = Vec::with_capacity(LENGTH_PREFIX_BYTES + data.len());
    framed.extend_from_slice(&(data.len() as u32).to_le_bytes());
    framed.extend_from_slice(data);

    let mut out = String::with_capacity(zwc_overhead(data.len()) * 3);
    out.extend(ZWC_START_SENTINEL);
    for &byte in &framed {
        out.extend(byte_to_digits(byte).iter().map(|&d| ZWC_DIGITS[d as usize]));
    }
    out.extend(ZWC_END_SENTINEL);
    out
}

/// 把零宽序列均匀地插入封面文本相邻字符之间，剩余部分追加到末尾。
fn distribute(cover: &str, hidden: &str) -> String {
    let cover_chars: Vec<char> = cover.chars().collect();
    let hidden_chars: Vec<char> = hidden.chars().collect();

    if cover_chars.len() < 2 {
        return format!("{cover}{hidden}");
    }

    let gaps = cover_chars.len() - 1;
    let per_gap = hidden_chars.len().div_ceil(gaps);
    let mut chunks = hidden_chars.chunks(per_gap.max(1));

    let mut out = String::with_capacity(cover.len() + hidden.len());
    for (i, &c) in cover_chars.iter().enumerate() {
        out.push(c);
        if i < gaps {
            if let Some(chunk) = chunks.next() {
                out.extend(chunk);
            }
        }
    }
    for chunk in chunks {
        out.extend(chunk);
    }
    out
}

/// 把秘密文本藏进封面文本。
///
/// 封面中原有的零宽字符会先被去掉，避免干扰之后的扫描。
///
/// # Errors
///
/// 秘密文本超过字符数上限时返回 [`StegoError::InvalidParameter`]。
pub fn encode_text(
    cover: &str,
    secret: &str,
    options: &TextOptions,
    config: &CodecConfig,
) -> Result<String> {
    let secret_len = secret.chars().count();
    if secret_len > config.max_secret_length {
        return Err(StegoError::InvalidParameter(format!(
            "secret message is {secret_len} characters, the maximum is {}",
            config.max_secret_length
        )));
    }

    let mut data = crypto::compress(secret.as_bytes())?;
    if let Some(password) = effective_password(options.password.as_deref()) {
        data = crypto::encrypt(&data, password, config.pbkdf2_iterations)?;
    }

    let hidden = encode_zero_width(&data);
    let cover = strip_zero_width(cover);

    log::info!(
        "hid {} secret bytes as {} zero-width characters",
        secret.len(),
        hidden.chars().count()
    );

    Ok(if options.distribute {
        distribute(&cover, &hidden)
    } else {
        cover + &hidden
    })
}

/// 秘密文本解压后允许的最大字节数，每个字符最多 4 个 UTF-8 字节。
fn secret_byte_limit(config: &CodecConfig) -> usize {
    config.max_secret_length.saturating_mul(4)
}

/// 零宽数字子序列中起始哨兵之后的位置。
fn find_start(digits: &[char]) -> Option<usize> {
    digits
        .windows(ZWC_START_SENTINEL.len())
        .position(|w| w == ZWC_START_SENTINEL)
        .map(|p| p + ZWC_START_SENTINEL.len())
}

/// 文本中是否带有起始哨兵。
///
/// 扫描不按字节组对齐，字节组内部也可能出现同样的三位数字 (例如 207 编码为
/// 0-5-4-3)，所以丢失了真实起始哨兵的片段仍可能返回 `true`，此时
/// [`decode_text`] 会报告解码失败。
pub fn contains_hidden_data(text: &str) -> bool {
    let digits: Vec<char> = text.chars().filter(|&c| digit_of(c).is_some()).collect();
    find_start(&digits).is_some()
}

/// 从文本中取出秘密文本。
///
/// 没有起始哨兵不是错误，`secret_message` 为 `None`。
///
/// # Errors
///
/// 找到哨兵但零宽字符不足、结束哨兵位置不符、数字组不合法、解压结果超过上限
/// 或 UTF-8 解码失败时返回 [`StegoError::DecodeFailure`]；设置口令时，
/// 解密之后的解压或 UTF-8 失败一律返回 [`StegoError::CryptoFailure`]。
pub fn decode_text(
    text: &str,
    password: Option<&str>,
    config: &CodecConfig,
) -> Result<DecodedText> {
    let visible_text = strip_zero_width(text);

    let glyphs: Vec<char> = text.chars().filter(|&c| digit_of(c).is_some()).collect();
    let Some(start) = find_start(&glyphs) else {
        return Ok(DecodedText {
            visible_text,
            secret_message: None,
        });
    };

    let digits: Vec<u8> = glyphs[start..].iter().filter_map(|&c| digit_of(c)).collect();
    if digits.len() < LENGTH_PREFIX_CHARS {
        return Err(StegoError::DecodeFailure(format!(
            "found the start marker but only {} zero-width characters follow it",
            digits.len()
        )));
    }

    let prefix = digits_to_bytes(&digits[..LENGTH_PREFIX_CHARS])?;
    let length_bytes: [u8; LENGTH_PREFIX_BYTES] = prefix
        .as_slice()
        .try_into()
        .map_err(|_| StegoError::DecodeFailure("invalid length prefix".into()))?;
    let length = u32::from_le_bytes(length_bytes) as usize;

    let needed = length
        .checked_mul(ZWC_DIGITS_PER_BYTE)
        .and_then(|n| n.checked_add(LENGTH_PREFIX_CHARS))
        .ok_or_else(|| {
            StegoError::DecodeFailure(format!("declared length {length} is too large"))
        })?;
    if digits.len() < needed {
        return Err(StegoError::DecodeFailure(format!(
            "hidden payload is truncated: {needed} zero-width characters required, {} found",
            digits.len()
        )));
    }

    // 结束哨兵可以缺失，但出现时必须紧跟在数据之后
    let tail = &glyphs[start + needed..];
    let expected_end = &ZWC_END_SENTINEL[..tail.len().min(ZWC_END_SENTINEL.len())];
    if !tail.starts_with(expected_end) {
        return Err(StegoError::DecodeFailure(
            "end marker does not follow the declared payload".into(),
        ));
    }

    let mut data = digits_to_bytes(&digits[LENGTH_PREFIX_CHARS..needed])?;

    let password = effective_password(password);
    if let Some(password) = password {
        data = crypto::decrypt(&data, password, config.pbkdf2_iterations)?;
    }

    // 设置口令时，解密之后的任何失败都归咎于口令
    let blame_password = |e: StegoError| match password {
        Some(_) => StegoError::CryptoFailure(format!("decrypted data is unreadable ({e})")),
        None => e,
    };

    let plain = crypto::decompress(&data, secret_byte_limit(config)).map_err(blame_password)?;
    let secret = String::from_utf8(plain)
        .map_err(|e| StegoError::DecodeFailure(format!("hidden text is not valid UTF-8: {e}")))
        .map_err(blame_password)?;

    let chars = secret.chars().count();
    if chars > config.max_secret_length {
        return Err(StegoError::DecodeFailure(format!(
            "hidden text has {chars} characters, the maximum is {}",
            config.max_secret_length
        )));
    }

    log::info!("recovered a {} byte secret message", secret.len());

    Ok(DecodedText {
        visible_text,
        secret_message: Some(secret),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_mapping_roundtrip() {
        for value in 0..=255u8 {
            let digits = byte_to_digits(value);
            assert!(digits[0] <= 1);
            assert_eq!(digits_to_byte(&digits).unwrap(), value);
        }
        assert_eq!(byte_to_digits(255), [1, 1, 0, 3]);
    }

    #[test]
    fn test_digit_group_out_of_byte_range() {
        assert!(digits_to_byte(&[5, 5, 5, 5]).is_err());
        assert!(digits_to_byte(&[0, 1]).is_err());
    }

    #[test]
    fn test_overhead_matches_encoding() {
        let hidden = encode_zero_width(b"abc");
        assert_eq!(hidden.chars().count(), zwc_overhead(3));
    }

    #[test]
    fn test_distribute_keeps_order() {
        let spread = distribute("abcd", "123456789");
        let visible: String = spread.chars().filter(|c| c.is_alphabetic()).collect();
        let hidden: String = spread.chars().filter(|c| c.is_numeric()).collect();
        assert_eq!(visible, "abcd");
        assert_eq!(hidden, "123456789");
        assert!(spread.starts_with("a123"));
    }
}
