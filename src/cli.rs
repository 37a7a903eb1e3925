//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::{ArgGroup, Parser, ValueEnum};
use image::ImageFormat;
use std::path::PathBuf;

/// 一款隐写命令行工具：在无损图像的像素低位或普通文本的零宽字符中隐藏文本与文件。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款隐写命令行工具：在无损图像 (如 PNG, BMP) 的像素低位中隐藏文本或文件，或在普通文本中用零宽字符隐藏秘密消息。"
)]
pub struct Cli {
    /// 输出调试日志。
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 在无损格式图像 (如 PNG, BMP) 中隐藏文本或文件。
    Hide(HideArgs),

    /// 从经过隐写的图像中恢复隐藏的文本或文件。
    Recover(RecoverArgs),

    /// 用零宽字符把秘密消息藏进一段普通文本。
    TextHide(TextHideArgs),

    /// 从带有零宽字符的文本中恢复秘密消息。
    TextReveal(TextRevealArgs),

    /// 显示图像在各个位深下的隐写容量。
    Capacity(CapacityArgs),

    /// 生成 RGB 最低位的棋盘可视化图像。
    Sieve(SieveArgs),

    /// 统计图像 RGB 通道最低位的分布。
    Stats(StatsArgs),
}

/// 隐写结果图像的输出格式，只允许无损格式。
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Png,
    Bmp,
    Tiff,
    Webp,
    Qoi,
}

impl OutputFormat {
    pub fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Tiff => ImageFormat::Tiff,
            OutputFormat::Webp => ImageFormat::WebP,
            OutputFormat::Qoi => ImageFormat::Qoi,
        }
    }
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("payload").required(true).args(["text", "file"])))]
pub struct HideArgs {
    /// 用于隐写的输入图像文件路径 (如 PNG, BMP)。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的文本内容的文件路径。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 要原样隐藏的任意文件 (连同文件名一起隐藏)。
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// 隐写完成后，保存结果图像的输出路径。默认为 `doctored_<原文件名>`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 异或混淆口令，留空则不混淆。
    #[arg(short, long, default_value = "")]
    pub password: String,

    /// 每个颜色通道使用的低位数 (1-4)。
    #[arg(short = 'b', long, default_value_t = 1)]
    pub depth: u8,

    /// 输出图像格式。编码失败时回退到 PNG。
    #[arg(long, value_enum, default_value_t = OutputFormat::Png)]
    pub format: OutputFormat,

    /// 允许覆盖已存在的输出文件。
    #[arg(long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复内容的输出路径。默认文本为 `recovered_<图像名>.txt`，文件使用其隐藏的文件名。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 隐藏时使用的口令。
    #[arg(short, long, default_value = "")]
    pub password: String,

    /// 隐藏时使用的位深 (1-4)。
    #[arg(short = 'b', long, default_value_t = 1)]
    pub depth: u8,

    /// 允许覆盖已存在的输出文件。
    #[arg(long)]
    pub force: bool,
}

/// 'text-hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct TextHideArgs {
    /// 封面文本文件路径。
    #[arg(short, long)]
    pub cover: PathBuf,

    /// 秘密消息文件路径。
    #[arg(short, long)]
    pub secret: PathBuf,

    /// 输出文本路径。默认为 `doctored_<封面文件名>`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 加密口令，留空则只压缩不加密。
    #[arg(short, long)]
    pub password: Option<String>,

    /// 把零宽字符分散到封面文本之中，而不是追加在末尾。
    #[arg(long)]
    pub distribute: bool,

    /// 允许覆盖已存在的输出文件。
    #[arg(long)]
    pub force: bool,
}

/// 'text-reveal' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct TextRevealArgs {
    /// 带有隐藏消息的文本文件路径。
    #[arg(short, long)]
    pub input: PathBuf,

    /// 保存秘密消息的路径，省略时直接打印。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 加密口令。
    #[arg(short, long)]
    pub password: Option<String>,

    /// 允许覆盖已存在的输出文件。
    #[arg(long)]
    pub force: bool,
}

/// 'capacity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CapacityArgs {
    /// 载体图像路径。
    #[arg(short, long)]
    pub image: PathBuf,
}

/// 'sieve' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct SieveArgs {
    /// 要可视化的图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 输出 PNG 路径。默认为 `sieve_<图像名>.png`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 允许覆盖已存在的输出文件。
    #[arg(long)]
    pub force: bool,
}

/// 'stats' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// 要统计的图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 可选的原始图像，用于统计改变的位数。
    #[arg(long)]
    pub original: Option<PathBuf>,
}
