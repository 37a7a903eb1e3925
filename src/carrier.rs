//! # 载体模块
//!
//! 连接外部图像编解码库与隐写核心，并提供端到端的隐藏 / 恢复流程：
//!
//! 载荷 → 帧头 → 异或掩码 → 比特流 → 像素 LSB 或 JPEG 系数，提取时反向进行。
//!
//! 提取分阶段读取：先读可能的文件头前缀，再按声明的长度读取，
//! 分配的内存与声明的载荷大小成正比，而不是与载体容量成正比。

use image::{DynamicImage, ImageFormat, ImageReader, Limits, RgbaImage};
use std::io::Cursor;

use crate::bits::{bits_to_bytes, bytes_to_bits};
use crate::capacity::{BitDepth, pixel_capacity_bits, validate_dimensions};
use crate::cipher;
use crate::config::CodecConfig;
use crate::constants::LENGTH_PREFIX_BYTES;
use crate::error::{Result, StegoError};
use crate::header::{FileHeader, Payload, decode_text_bytes, frame_payload, text_length};
use crate::jpeg::{self, CoefficientCodec, CoefficientSet};
use crate::steganography;

/// 解码后的 RGBA 载体图像。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaCarrier {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaCarrier {
    /// 校验像素缓冲区长度与宽高一致。
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(StegoError::InvalidParameter(format!(
                "expected {expected} RGBA bytes for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }
}

/// 根据文件头部魔数识别图像格式。
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// 像素 LSB 载荷只能保存在无损格式中。
pub fn is_lossless(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png
            | ImageFormat::Bmp
            | ImageFormat::Tiff
            | ImageFormat::WebP
            | ImageFormat::Qoi
    )
}

fn reader_for(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| StegoError::ImageCodec(image::ImageError::IoError(e)))
}

/// 把图像字节解码为 RGBA 像素。
///
/// 在分配像素缓冲区之前先校验文件大小与图像尺寸。
pub fn decode_rgba(bytes: &[u8], config: &CodecConfig) -> Result<RgbaCarrier> {
    if bytes.len() > config.max_image_file_size {
        return Err(StegoError::InvalidParameter(format!(
            "image file is {} bytes, the maximum is {}",
            bytes.len(),
            config.max_image_file_size
        )));
    }

    if detect_format(bytes).is_none() {
        return Err(StegoError::UnsupportedCarrier("unrecognized image format".into()));
    }

    let (width, height) = reader_for(bytes)?.into_dimensions()?;
    validate_dimensions(width, height, config)?;

    let mut limits = Limits::default();
    limits.max_image_width = Some(config.max_image_dimension);
    limits.max_image_height = Some(config.max_image_dimension);

    let mut reader = reader_for(bytes)?;
    reader.limits(limits);
    let pixels = reader.decode()?.to_rgba8().into_raw();

    log::debug!("decoded {width}x{height} carrier image");

    RgbaCarrier::new(width, height, pixels)
}

/// 把 RGBA 载体编码为指定的无损格式。
///
/// # Errors
///
/// 目标格式有损 (例如 JPEG) 时返回 [`StegoError::UnsupportedCarrier`]。
pub fn encode_rgba(carrier: &RgbaCarrier, format: ImageFormat) -> Result<Vec<u8>> {
    if !is_lossless(format) {
        return Err(StegoError::UnsupportedCarrier(format!(
            "{format:?} is lossy and would destroy pixel-level payloads"
        )));
    }

    let image = RgbaImage::from_raw(carrier.width, carrier.height, carrier.pixels.clone())
        .ok_or_else(|| {
            StegoError::InvalidParameter("pixel buffer does not match dimensions".into())
        })?;

    let mut out = Vec::new();
    DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut out), format)?;
    Ok(out)
}

/// 分阶段读出载荷。`read(n)` 返回载体中前 `n` 个 (掩码前的) 字节。
fn reveal_staged<F>(
    available: usize,
    password: &str,
    config: &CodecConfig,
    read: F,
) -> Result<Payload>
where
    F: Fn(usize) -> Result<Vec<u8>>,
{
    let read_plain = |n: usize| -> Result<Vec<u8>> {
        let mut bytes = read(n.min(available))?;
        cipher::apply_in_place(&mut bytes, password);
        Ok(bytes)
    };

    let prefix = read_plain(2 + config.max_filename_length + LENGTH_PREFIX_BYTES)?;

    if let Some(header) = FileHeader::parse_prefix(&prefix, available, config) {
        let bytes = read_plain(header.total_len())?;
        log::info!("recovered embedded file {:?} ({} bytes)", header.file_name, header.file_size);
        return Ok(Payload::File {
            data: bytes[header.payload_offset..header.total_len()].to_vec(),
            name: header.file_name,
        });
    }

    log::debug!("no file header in carrier, trying text framing");

    let length = text_length(&prefix, available, config)?;
    let end = LENGTH_PREFIX_BYTES + length;
    let bytes = if end <= prefix.len() {
        prefix
    } else {
        read_plain(end)?
    };

    let payload = decode_text_bytes(&bytes[LENGTH_PREFIX_BYTES..end])?;
    log::info!("recovered a {length} byte text message");
    Ok(payload)
}

/// 把载荷藏入 RGBA 载体的像素中。
///
/// # Errors
///
/// 位深或尺寸非法、载荷超过上限或容量时返回错误，此时载体未被修改。
pub fn hide_in_pixels(
    carrier: &mut RgbaCarrier,
    payload: &Payload,
    password: &str,
    depth: BitDepth,
    config: &CodecConfig,
) -> Result<()> {
    let available = pixel_capacity_bits(carrier.width, carrier.height, depth, config)?;

    let mut framed = frame_payload(payload, config)?;
    cipher::apply_in_place(&mut framed, password);
    let bits = bytes_to_bits(&framed);

    if bits.len() > available {
        return Err(StegoError::PixelCapacityExceeded {
            needed: bits.len(),
            available,
        });
    }

    steganography::embed(&mut carrier.pixels, &bits, depth)?;

    log::info!(
        "hid {} payload bytes in a {}x{} image ({} of {available} bits used)",
        framed.len(),
        carrier.width,
        carrier.height,
        bits.len()
    );

    Ok(())
}

/// 从 RGBA 载体中恢复载荷。位深与口令必须与隐藏时一致。
pub fn reveal_from_pixels(
    carrier: &RgbaCarrier,
    password: &str,
    depth: BitDepth,
    config: &CodecConfig,
) -> Result<Payload> {
    let available = pixel_capacity_bits(carrier.width, carrier.height, depth, config)? / 8;

    reveal_staged(available, password, config, |n| {
        Ok(bits_to_bytes(&steganography::extract(&carrier.pixels, n * 8, depth)?))
    })
}

/// 解码图像、藏入载荷并重新编码为 `format`。
pub fn hide_in_image(
    image_bytes: &[u8],
    payload: &Payload,
    password: &str,
    depth: BitDepth,
    format: ImageFormat,
    config: &CodecConfig,
) -> Result<Vec<u8>> {
    if !is_lossless(format) {
        return Err(StegoError::UnsupportedCarrier(format!(
            "{format:?} is lossy and would destroy pixel-level payloads"
        )));
    }

    let mut carrier = decode_rgba(image_bytes, config)?;
    hide_in_pixels(&mut carrier, payload, password, depth, config)?;
    encode_rgba(&carrier, format)
}

/// 解码图像并恢复载荷。
pub fn reveal_from_image(
    image_bytes: &[u8],
    password: &str,
    depth: BitDepth,
    config: &CodecConfig,
) -> Result<Payload> {
    let carrier = decode_rgba(image_bytes, config)?;
    reveal_from_pixels(&carrier, password, depth, config)
}

/// 把载荷藏入 JPEG 系数集合，取得集合所有权并返回修改后的集合。
pub fn hide_in_coefficients(
    coefficients: CoefficientSet,
    payload: &Payload,
    password: &str,
    use_chroma: bool,
    config: &CodecConfig,
) -> Result<CoefficientSet> {
    let mut framed = frame_payload(payload, config)?;
    cipher::apply_in_place(&mut framed, password);
    let bits = bytes_to_bits(&framed);

    let coefficients = jpeg::embed(coefficients, &bits, use_chroma)?;
    log::info!("hid {} payload bytes in JPEG coefficients", framed.len());
    Ok(coefficients)
}

/// 从 JPEG 系数集合中恢复载荷。
pub fn reveal_from_coefficients(
    coefficients: &CoefficientSet,
    password: &str,
    use_chroma: bool,
    config: &CodecConfig,
) -> Result<Payload> {
    let available = coefficients.usable_count(use_chroma) / 8;

    reveal_staged(available, password, config, |n| {
        Ok(bits_to_bytes(&jpeg::extract(coefficients, n * 8, use_chroma)))
    })
}

/// 借助外部系数编解码器，把载荷藏入 JPEG 字节流。
pub fn hide_in_jpeg<C: CoefficientCodec>(
    codec: &C,
    jpeg_bytes: &[u8],
    payload: &Payload,
    password: &str,
    use_chroma: bool,
    config: &CodecConfig,
) -> Result<Vec<u8>> {
    let coefficients = codec
        .extract_coefficients(jpeg_bytes)
        .ok_or_else(|| StegoError::UnsupportedCarrier("carrier is not a readable JPEG".into()))?;
    let coefficients = hide_in_coefficients(coefficients, payload, password, use_chroma, config)?;
    codec.encode_from_coefficients(&coefficients)
}

/// 借助外部系数编解码器，从 JPEG 字节流中恢复载荷。
pub fn reveal_from_jpeg<C: CoefficientCodec>(
    codec: &C,
    jpeg_bytes: &[u8],
    password: &str,
    use_chroma: bool,
    config: &CodecConfig,
) -> Result<Payload> {
    let coefficients = codec
        .extract_coefficients(jpeg_bytes)
        .ok_or_else(|| StegoError::UnsupportedCarrier("carrier is not a readable JPEG".into()))?;
    reveal_from_coefficients(&coefficients, password, use_chroma, config)
}
