//! # 压缩与加密模块
//!
//! 零宽字符文本编解码器使用的 DEFLATE 压缩与口令加密。
//!
//! 加密数据块格式：`[16 字节随机盐][16 字节随机计数器][密文]`。
//! 密钥由 PBKDF2-HMAC-SHA256 从口令与盐派生，算法为 AES-256-CTR。
//! CTR 模式本身没有完整性校验，口令错误时解密不会失败，只会得到乱码。

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use flate2::Compression;
use flate2::read::{DeflateDecoder, DeflateEncoder};
use rand::RngCore;
use sha2::Sha256;
use std::io::Read;

use crate::error::{Result, StegoError};

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

pub const SALT_LEN: usize = 16;
pub const COUNTER_LEN: usize = 16;
pub const KEY_LEN: usize = 32;

/// 加密数据块的最小长度：盐、计数器，外加至少 1 字节密文。
pub const MIN_ENCRYPTED_LEN: usize = SALT_LEN + COUNTER_LEN + 1;

/// DEFLATE 压缩。
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(data, Compression::best());
    let mut compressed = Vec::new();
    encoder
        .read_to_end(&mut compressed)
        .map_err(|e| StegoError::DecodeFailure(format!("compression failed: {e}")))?;
    Ok(compressed)
}

/// DEFLATE 解压，输出最多 `limit` 字节。
///
/// # Errors
///
/// 数据损坏，或解压结果超过 `limit` 时返回 [`StegoError::DecodeFailure`]。
pub fn decompress(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data).take((limit as u64).saturating_add(1));
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| StegoError::DecodeFailure(format!("decompression failed: {e}")))?;

    if decompressed.len() > limit {
        return Err(StegoError::DecodeFailure(format!(
            "decompressed data exceeds the {limit} byte limit"
        )));
    }
    Ok(decompressed)
}

/// 由口令和盐派生 256 位密钥。
pub fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

/// 用口令加密，输出带随机盐与计数器的数据块。
pub fn encrypt(plaintext: &[u8], password: &str, iterations: u32) -> Result<Vec<u8>> {
    if plaintext.is_empty() {
        return Err(StegoError::CryptoFailure("refusing to encrypt empty data".into()));
    }

    let mut salt = [0u8; SALT_LEN];
    let mut counter = [0u8; COUNTER_LEN];
    let mut rng = rand::rng();
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut counter);

    let key = derive_key(password, &salt, iterations);

    let mut blob = Vec::with_capacity(SALT_LEN + COUNTER_LEN + plaintext.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&counter);
    blob.extend_from_slice(plaintext);

    let mut cipher = Aes256Ctr::new(&key.into(), &counter.into());
    cipher.apply_keystream(&mut blob[SALT_LEN + COUNTER_LEN..]);

    Ok(blob)
}

/// 解密 [`encrypt`] 生成的数据块。
///
/// # Errors
///
/// 数据块短于 [`MIN_ENCRYPTED_LEN`] 时返回 [`StegoError::CryptoFailure`]。
pub fn decrypt(blob: &[u8], password: &str, iterations: u32) -> Result<Vec<u8>> {
    if blob.len() < MIN_ENCRYPTED_LEN {
        return Err(StegoError::CryptoFailure(format!(
            "encrypted data is {} bytes, at least {MIN_ENCRYPTED_LEN} are required",
            blob.len()
        )));
    }

    let (salt, rest) = blob.split_at(SALT_LEN);
    let (counter, ciphertext) = rest.split_at(COUNTER_LEN);
    let counter: [u8; COUNTER_LEN] = counter
        .try_into()
        .map_err(|_| StegoError::CryptoFailure("invalid counter block".into()))?;

    let key = derive_key(password, salt, iterations);

    let mut plaintext = ciphertext.to_vec();
    let mut cipher = Aes256Ctr::new(&key.into(), &counter.into());
    cipher.apply_keystream(&mut plaintext);

    Ok(plaintext)
}
