//! # 常量模块
//!
//! 协议中固定的值以及各项尺寸上限的默认值。
//! 各入口函数实际读取的是 [`CodecConfig`](crate::config::CodecConfig)，其默认值来自这里。

/// 图像载荷中文件头的起始标记字节。
pub const FILE_HEADER_MAGIC: u8 = 0x55;

/// 文件头中 UTF-8 文件名的最大字节数。
/// 长度字段只有 1 个字节，因此不可能超过 255。
pub const MAX_FILENAME_LENGTH: usize = 255;

/// 清洗后的文件名最多保留的字符数 (保留扩展名)。
pub const MAX_SANITIZED_FILENAME_LENGTH: usize = 128;

/// 可嵌入图像的文件大小上限 (16 MiB)。
pub const MAX_EMBED_FILE_SIZE: usize = 16 * 1024 * 1024;

/// 可嵌入图像的文本消息字节数上限 (1 MiB)。
pub const MAX_MESSAGE_LENGTH: usize = 1024 * 1024;

/// 零宽字符文本编解码器可接受的秘密文本字符数上限。
pub const MAX_SECRET_LENGTH: usize = 10_000;

/// 载体图像单边的最大像素数。
pub const MAX_IMAGE_DIMENSION: u32 = 16_384;

/// 载体图像的最大像素总数。
pub const MAX_PIXEL_COUNT: u64 = 40_000_000;

/// 可接受解码的载体图像文件大小上限 (64 MiB)。
pub const MAX_IMAGE_FILE_SIZE: usize = 64 * 1024 * 1024;

/// 文本编解码器派生 AES 密钥时 PBKDF2-HMAC-SHA256 的迭代次数。
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// 所有帧格式中小端 `u32` 长度前缀的字节数。
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// 每个载体字节最多承载的载荷位数。
pub const MAX_BIT_DEPTH: u8 = 4;

/// 作为六进制数字使用的 6 个零宽字符，下标即数字值。
pub const ZWC_DIGITS: [char; 6] = [
    '\u{200B}', // zero width space
    '\u{200C}', // zero width non-joiner
    '\u{200D}', // zero width joiner
    '\u{2060}', // word joiner
    '\u{2061}', // function application
    '\u{2062}', // invisible times
];

/// 起始哨兵，数字 5-4-3。
/// 每个字节组的首位只可能是 0 或 1，所以哨兵不会与对齐的字节组重合；
/// 但跨越字节组或位于组内 (例如 207 = 0-5-4-3) 的同样数字序列仍然存在，
/// 解码时以第一个起始哨兵为准，并校验结束哨兵紧跟在声明长度的数据之后。
pub const ZWC_START_SENTINEL: [char; 3] = [ZWC_DIGITS[5], ZWC_DIGITS[4], ZWC_DIGITS[3]];

/// 结束哨兵，数字 3-4-5。
pub const ZWC_END_SENTINEL: [char; 3] = [ZWC_DIGITS[3], ZWC_DIGITS[4], ZWC_DIGITS[5]];

/// 除数字字符以外，从可见文本中一并剔除的不可见码点。
pub const ZWC_STRAY: [char; 4] = ['\u{FEFF}', '\u{2063}', '\u{2064}', '\u{180E}'];

/// 每个载荷字节对应的六进制位数。
pub const ZWC_DIGITS_PER_BYTE: usize = 4;
