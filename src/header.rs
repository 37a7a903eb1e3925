//! # 载荷帧模块
//!
//! 图像载荷有两种帧格式，每次嵌入只使用其中一种：
//!
//! * 文件：`[0x55][1 字节文件名长度 N][N 字节 UTF-8 文件名][4 字节小端文件大小][文件内容]`
//! * 文本：`[4 字节小端文本长度][UTF-8 文本]`
//!
//! 解码时先尝试解析文件头，只有解析失败才回退到文本帧。文件头解析失败是预期中的分支，
//! 以 `None` 表示，而不是错误。

use crate::config::CodecConfig;
use crate::constants::LENGTH_PREFIX_BYTES;
use crate::error::{Result, StegoError};

/// 文件名中会被剔除的路径分隔符以及 shell / HTML 危险字符。
const FORBIDDEN_FILENAME_CHARS: &[char] = &[
    '/', '\\', ':', '*', '?', '"', '<', '>', '|', '\'', '`', '$', '&', ';', '%',
];

/// 清洗后为空时使用的文件名。
const FALLBACK_FILENAME: &str = "unnamed_file";

/// 已解析的文件头。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// 清洗后的文件名。
    pub file_name: String,
    pub file_size: usize,
    /// 文件内容在载荷中的起始偏移。
    pub payload_offset: usize,
}

impl FileHeader {
    /// 文件头加文件内容的总字节数。
    pub fn total_len(&self) -> usize {
        self.payload_offset + self.file_size
    }

    /// 生成文件头字节。
    ///
    /// # Errors
    ///
    /// 文件名为空或超过长度上限、文件大小为 0 或超过上限时返回
    /// [`StegoError::InvalidParameter`]。
    pub fn prepare(file_name: &str, file_size: usize, config: &CodecConfig) -> Result<Vec<u8>> {
        let name = file_name.as_bytes();
        if name.is_empty() || name.len() > config.max_filename_length {
            return Err(StegoError::InvalidParameter(format!(
                "file name must be 1 to {} bytes long, got {}",
                config.max_filename_length,
                name.len()
            )));
        }

        if file_size == 0 || file_size > config.max_embed_file_size {
            return Err(StegoError::InvalidParameter(format!(
                "file size must be between 1 and {} bytes, got {file_size}",
                config.max_embed_file_size
            )));
        }

        let mut header = Vec::with_capacity(2 + name.len() + LENGTH_PREFIX_BYTES);
        header.push(config.magic);
        header.push(name.len() as u8);
        header.extend_from_slice(name);
        header.extend_from_slice(&(file_size as u32).to_le_bytes());
        Ok(header)
    }

    /// 从完整的载荷字节中解析文件头。
    pub fn parse(bytes: &[u8], config: &CodecConfig) -> Option<FileHeader> {
        Self::parse_prefix(bytes, bytes.len(), config)
    }

    /// 从载荷的前缀中解析文件头，`available` 为整个载荷可用的字节数。
    ///
    /// 标记不符、文件名或大小越界、声明的总长度超过 `available` 时返回 `None`。
    pub fn parse_prefix(
        prefix: &[u8],
        available: usize,
        config: &CodecConfig,
    ) -> Option<FileHeader> {
        let (&magic, rest) = prefix.split_first()?;
        if magic != config.magic {
            return None;
        }

        let (&name_len, rest) = rest.split_first()?;
        let name_len = name_len as usize;
        if name_len == 0 || name_len > config.max_filename_length {
            return None;
        }

        let name = rest.get(..name_len)?;
        let size_bytes = rest.get(name_len..name_len + LENGTH_PREFIX_BYTES)?;
        let file_size = u32::from_le_bytes(size_bytes.try_into().ok()?) as usize;
        if file_size == 0 || file_size > config.max_embed_file_size {
            return None;
        }

        let payload_offset = 2 + name_len + LENGTH_PREFIX_BYTES;
        if payload_offset.checked_add(file_size)? > available {
            return None;
        }

        let file_name = sanitize_filename(&String::from_utf8_lossy(name), config);

        Some(FileHeader {
            file_name,
            file_size,
            payload_offset,
        })
    }
}

/// 清洗文件名：剔除路径分隔符、危险字符与控制字符，去掉开头的点，
/// 超长时截断并保留扩展名。
pub fn sanitize_filename(name: &str, config: &CodecConfig) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && !FORBIDDEN_FILENAME_CHARS.contains(c))
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.');

    if cleaned.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }

    let limit = config.max_sanitized_filename_length;
    if cleaned.chars().count() <= limit {
        return cleaned.to_string();
    }

    let (stem, extension) = match cleaned.rfind('.') {
        Some(dot) if dot > 0 => (&cleaned[..dot], &cleaned[dot..]),
        _ => (cleaned, ""),
    };

    let extension_len = extension.chars().count();
    if extension_len >= limit {
        return cleaned.chars().take(limit).collect();
    }

    let mut clamped: String = stem.chars().take(limit - extension_len).collect();
    clamped.push_str(extension);
    clamped
}

/// 图像中隐藏的载荷。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    File { name: String, data: Vec<u8> },
}

/// 为载荷加上对应的帧头。
pub fn frame_payload(payload: &Payload, config: &CodecConfig) -> Result<Vec<u8>> {
    match payload {
        Payload::Text(text) => {
            let bytes = text.as_bytes();
            if bytes.len() > config.max_message_length {
                return Err(StegoError::InvalidParameter(format!(
                    "text message is {} bytes, the maximum is {}",
                    bytes.len(),
                    config.max_message_length
                )));
            }
            let mut framed = Vec::with_capacity(LENGTH_PREFIX_BYTES + bytes.len());
            framed.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            framed.extend_from_slice(bytes);
            Ok(framed)
        }
        Payload::File { name, data } => {
            let mut framed = FileHeader::prepare(name, data.len(), config)?;
            framed.extend_from_slice(data);
            Ok(framed)
        }
    }
}

/// 从文本帧的长度前缀读出的文本字节数，并做边界校验。
pub fn text_length(prefix: &[u8], available: usize, config: &CodecConfig) -> Result<usize> {
    let length_bytes: [u8; LENGTH_PREFIX_BYTES] = prefix
        .get(..LENGTH_PREFIX_BYTES)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| {
            StegoError::MalformedHeader("payload is shorter than its length prefix".into())
        })?;
    let length = u32::from_le_bytes(length_bytes) as usize;

    if length > config.max_message_length {
        return Err(StegoError::MalformedHeader(format!(
            "declared text length {length} exceeds the maximum of {}. \nThe carrier may not contain a hidden message",
            config.max_message_length
        )));
    }

    if LENGTH_PREFIX_BYTES + length > available {
        return Err(StegoError::MalformedHeader(format!(
            "declared text length {length} exceeds the {} bytes available in the carrier",
            available.saturating_sub(LENGTH_PREFIX_BYTES)
        )));
    }

    Ok(length)
}

/// 解析完整的载荷字节：先尝试文件头，失败后回退到文本帧。
pub fn unframe_payload(bytes: &[u8], config: &CodecConfig) -> Result<Payload> {
    if let Some(header) = FileHeader::parse(bytes, config) {
        let data = bytes[header.payload_offset..header.total_len()].to_vec();
        return Ok(Payload::File {
            name: header.file_name,
            data,
        });
    }

    log::debug!("no file header found, falling back to text framing");

    let length = text_length(bytes, bytes.len(), config)?;
    decode_text_bytes(&bytes[LENGTH_PREFIX_BYTES..LENGTH_PREFIX_BYTES + length])
}

/// 严格按 UTF-8 解码文本载荷。
pub fn decode_text_bytes(bytes: &[u8]) -> Result<Payload> {
    String::from_utf8(bytes.to_vec())
        .map(Payload::Text)
        .map_err(|e| StegoError::DecodeFailure(format!("hidden text is not valid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_paths_and_hazards() {
        let config = CodecConfig::default();
        assert_eq!(sanitize_filename("../../etc/passwd", &config), "etcpasswd");
        assert_eq!(sanitize_filename("..hidden.txt", &config), "hidden.txt");
        assert_eq!(sanitize_filename("<script>a.html", &config), "scripta.html");
        assert_eq!(sanitize_filename("///", &config), FALLBACK_FILENAME);
    }

    #[test]
    fn test_sanitize_clamps_and_keeps_extension() {
        let config = CodecConfig::default().with_max_sanitized_filename_length(10);
        let name = format!("{}.tar", "x".repeat(40));
        assert_eq!(sanitize_filename(&name, &config), "xxxxxx.tar");
    }

    #[test]
    fn test_header_length() {
        let config = CodecConfig::default();
        let header = FileHeader::prepare("a.bin", 9, &config).unwrap();
        assert_eq!(header.len(), 2 + 5 + 4);
        assert_eq!(header[0], 0x55);
        assert_eq!(header[1], 5);
        assert_eq!(&header[7..], &9u32.to_le_bytes());
    }
}
