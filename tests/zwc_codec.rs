use veilcodec::constants::{ZWC_DIGITS, ZWC_END_SENTINEL, ZWC_START_SENTINEL};
use veilcodec::crypto::compress;
use veilcodec::zwc::{
    TextOptions, byte_to_digits, contains_hidden_data, decode_text, encode_text, strip_zero_width,
};
use veilcodec::{CodecConfig, StegoError};

/// 测试中使用较少的 PBKDF2 迭代次数
fn fast_config() -> CodecConfig {
    CodecConfig::default().with_pbkdf2_iterations(1_000)
}

/// "hello" + "hi" 的具体场景
#[test]
fn test_hello_hi_scenario() {
    let config = fast_config();
    let encoded = encode_text("hello", "hi", &TextOptions::default(), &config).unwrap();

    assert!(encoded.starts_with("hello"));
    let after: Vec<char> = encoded["hello".len()..].chars().take(3).collect();
    assert_eq!(after, ZWC_START_SENTINEL);

    let decoded = decode_text(&encoded, None, &config).unwrap();
    assert_eq!(decoded.secret_message.as_deref(), Some("hi"));
    assert_eq!(decoded.visible_text, "hello");
}

/// 有无口令、追加或分散，各组合都能往返
#[test]
fn test_roundtrip_matrix() {
    let config = fast_config();
    let cover = "The weather report says rain later, bring an umbrella. 明天见。";
    let secret = "the package is under the bench ☂ 第三排";

    for password in [None, Some("correct horse")] {
        for distribute in [false, true] {
            let options = TextOptions {
                password: password.map(str::to_string),
                distribute,
            };
            let encoded = encode_text(cover, secret, &options, &config).unwrap();
            assert_eq!(strip_zero_width(&encoded), cover);

            let decoded = decode_text(&encoded, password, &config).unwrap();
            assert_eq!(decoded.secret_message.as_deref(), Some(secret));
            assert_eq!(decoded.visible_text, cover);
        }
    }
}

/// 秘密文本达到长度上限时仍能往返，超过则被拒绝
#[test]
fn test_secret_length_limit() {
    let config = fast_config().with_max_secret_length(500);
    let secret: String = (0..500).map(|i| char::from(b'a' + (i % 26) as u8)).collect();

    let options = TextOptions::default().distributed();
    let encoded = encode_text("cover", &secret, &options, &config).unwrap();
    let decoded = decode_text(&encoded, None, &config).unwrap();
    assert_eq!(decoded.secret_message, Some(secret.clone()));

    let too_long = format!("{secret}z");
    assert!(matches!(
        encode_text("cover", &too_long, &TextOptions::default(), &config),
        Err(StegoError::InvalidParameter(_))
    ));
}

/// 没有哨兵时返回 None，并剔除游离的零宽字符
#[test]
fn test_no_sentinel_returns_none_and_strips() {
    let config = fast_config();
    let text = format!("plain{}text{}\u{FEFF}", ZWC_DIGITS[0], ZWC_DIGITS[2]);

    assert!(!contains_hidden_data(&text));
    let decoded = decode_text(&text, None, &config).unwrap();
    assert_eq!(decoded.secret_message, None);
    assert_eq!(decoded.visible_text, "plaintext");
}

/// 封面中原有的零宽字符在编码前被剔除
#[test]
fn test_cover_noise_is_removed_before_encoding() {
    let config = fast_config();
    let noisy = format!("no{}isy", ZWC_DIGITS[5]);
    let encoded = encode_text(&noisy, "s", &TextOptions::default(), &config).unwrap();

    assert!(encoded.starts_with("noisy"));
    assert_eq!(decode_text(&encoded, None, &config).unwrap().secret_message.as_deref(), Some("s"));
}

/// 截断的载荷报告解码失败
#[test]
fn test_truncated_payload_is_a_decode_failure() {
    let config = fast_config();
    let secret = "a longer secret message";
    let encoded = encode_text("cover", secret, &TextOptions::default(), &config).unwrap();

    let chars: Vec<char> = encoded.chars().collect();
    let truncated: String = chars[..chars.len() - 12].iter().collect();

    assert!(contains_hidden_data(&truncated));
    assert!(matches!(
        decode_text(&truncated, None, &config),
        Err(StegoError::DecodeFailure(_))
    ));

    let only_sentinel: String = std::iter::once("x".to_string())
        .chain(ZWC_START_SENTINEL.iter().map(|c| c.to_string()))
        .collect();
    assert!(matches!(
        decode_text(&only_sentinel, None, &config),
        Err(StegoError::DecodeFailure(_))
    ));
}

/// 错误的口令被报告为加密失败
#[test]
fn test_wrong_password_is_a_crypto_failure() {
    let config = fast_config();
    let options = TextOptions::default().with_password("right");
    let encoded = encode_text("cover", "classified", &options, &config).unwrap();

    let mut failures = 0;
    for wrong in ["wrong", "Right", "right ", "hunter2", "letmein"] {
        match decode_text(&encoded, Some(wrong), &config) {
            Err(e) => {
                assert!(matches!(e, StegoError::CryptoFailure(_)), "unexpected error: {e}");
                assert!(e.to_string().contains("Check your password"));
                failures += 1;
            }
            Ok(decoded) => assert_ne!(decoded.secret_message.as_deref(), Some("classified")),
        }
    }
    assert!(failures > 0);
}

/// 把原始字节按线格式包装成零宽序列 (不含结束哨兵)
fn wrap_raw(cover: &str, data: &[u8]) -> String {
    let mut framed = (data.len() as u32).to_le_bytes().to_vec();
    framed.extend_from_slice(data);

    let mut out = String::from(cover);
    out.extend(ZWC_START_SENTINEL);
    for byte in framed {
        out.extend(byte_to_digits(byte).iter().map(|&d| ZWC_DIGITS[d as usize]));
    }
    out
}

/// 高压缩比的超大载荷在解压阶段就被拒绝
#[test]
fn test_oversized_decompression_is_rejected() {
    let config = fast_config();
    let bomb = compress(&vec![b'a'; 1 << 20]).unwrap();
    let text = wrap_raw("cover", &bomb);

    assert!(matches!(
        decode_text(&text, None, &config),
        Err(StegoError::DecodeFailure(_))
    ));

    // 未超过字节上限但字符数超过上限
    let strict = fast_config().with_max_secret_length(100);
    let text = wrap_raw("cover", &compress(&[b'a'; 150]).unwrap());
    assert!(matches!(
        decode_text(&text, None, &strict),
        Err(StegoError::DecodeFailure(_))
    ));
    assert!(decode_text(&text, None, &config).is_ok());
}

/// 结束哨兵必须紧跟在声明长度的数据之后
#[test]
fn test_misplaced_end_marker_is_rejected() {
    let config = fast_config();
    let encoded = encode_text("cover", "payload", &TextOptions::default(), &config).unwrap();

    let mut chars: Vec<char> = encoded.chars().collect();
    chars.insert(chars.len() - ZWC_END_SENTINEL.len(), ZWC_DIGITS[0]);
    let shifted: String = chars.into_iter().collect();
    assert!(matches!(
        decode_text(&shifted, None, &config),
        Err(StegoError::DecodeFailure(_))
    ));

    // 缺少结束哨兵仍然可以解码
    let chars: Vec<char> = encoded.chars().collect();
    let no_end: String = chars[..chars.len() - ZWC_END_SENTINEL.len()].iter().collect();
    assert_eq!(
        decode_text(&no_end, None, &config).unwrap().secret_message.as_deref(),
        Some("payload")
    );
}

/// 字节组内部的数字序列可能与起始哨兵相同，此时解码报告失败而不是返回垃圾
#[test]
fn test_sentinel_lookalike_inside_a_byte_group() {
    let config = fast_config();
    let fragment: String = std::iter::once("cover".to_string())
        .chain(byte_to_digits(207).iter().map(|&d| ZWC_DIGITS[d as usize].to_string()))
        .collect();

    assert!(contains_hidden_data(&fragment));
    assert!(matches!(
        decode_text(&fragment, None, &config),
        Err(StegoError::DecodeFailure(_))
    ));
}

/// 空口令等同于不加密
#[test]
fn test_empty_password_means_no_encryption() {
    let config = fast_config();
    let options = TextOptions::default().with_password("");
    let encoded = encode_text("c", "open", &options, &config).unwrap();
    let decoded = decode_text(&encoded, None, &config).unwrap();
    assert_eq!(decoded.secret_message.as_deref(), Some("open"));
}
