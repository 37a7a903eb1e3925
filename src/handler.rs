//! # 命令处理逻辑模块
//!
//! 包含各个子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用隐写核心以及向用户报告结果。

use crate::capacity::{BitDepth, calculate_pixel_capacity};
use crate::carrier::{RgbaCarrier, decode_rgba, encode_rgba, hide_in_pixels, reveal_from_pixels};
use crate::cli::{
    CapacityArgs, HideArgs, RecoverArgs, SieveArgs, StatsArgs, TextHideArgs, TextRevealArgs,
};
use crate::config::CodecConfig;
use crate::header::{Payload, sanitize_filename};
use crate::stats::{BitCounts, Report, generate_bit_sieve, generate_lsb_stats};
use crate::zwc::{TextOptions, decode_text, encode_text};
use anyhow::{Context, Result};
use colored::Colorize;
use image::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};

fn read_input(path: &Path, what: &str) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| {
        format!(
            "Unable to read {} file: {}",
            what,
            path.to_string_lossy().red().bold()
        )
    })
}

fn write_output(path: &Path, contents: &[u8], force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );

    fs::write(path, contents).with_context(|| {
        format!(
            "Unable to write to target file: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

/// 在输入文件所在目录下生成 `<prefix><文件名主干>.<扩展名>` 形式的路径。
fn sibling_path(input: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{prefix}{stem}.{extension}"))
}

fn extension_of(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("png")
}

/// 依次尝试候选格式进行编码，返回第一个成功的结果。
fn encode_with_fallback(
    carrier: &RgbaCarrier,
    candidates: &[ImageFormat],
) -> Result<(Vec<u8>, ImageFormat)> {
    let mut last_error = None;
    for &format in candidates {
        match encode_rgba(carrier, format) {
            Ok(bytes) => return Ok((bytes, format)),
            Err(e) => {
                log::warn!("encoding as {format:?} failed: {e}, trying the next format");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) => Err(e).context("Unable to encode the doctored image in any lossless format"),
        None => anyhow::bail!("No output format candidates were given"),
    }
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像与载荷、隐藏载荷、按候选格式编码，最后写入目标图像文件。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像、文本或文件。
/// * 位深非法，或图像没有足够的空间来隐藏载荷。
/// * 目标文件已存在且未指定 `--force`，或无法写入。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let config = CodecConfig::default();
    let depth = BitDepth::new(args.depth)?;

    let payload = match (&args.text, &args.file) {
        (Some(text), None) => {
            let bytes = read_input(text, "text")?;
            let text = String::from_utf8(bytes).context("The text file is not valid UTF-8")?;
            Payload::Text(text)
        }
        (None, Some(file)) => {
            let data = read_input(file, "payload")?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .context("The payload path has no file name")?;
            Payload::File { name, data }
        }
        _ => anyhow::bail!("Exactly one of --text or --file must be given"),
    };

    let picture = read_input(&args.image, "image")?;
    let mut carrier = decode_rgba(&picture, &config)?;
    hide_in_pixels(&mut carrier, &payload, &args.password, depth, &config)?;

    let requested = args.format.image_format();
    let mut candidates = vec![requested];
    if requested != ImageFormat::Png {
        candidates.push(ImageFormat::Png);
    }
    let (encoded, format) = encode_with_fallback(&carrier, &candidates)?;

    let dest = match args.dest {
        Some(dest) if format == requested => dest,
        Some(dest) => dest.with_extension(extension_of(format)),
        None => sibling_path(&args.image, "doctored_", extension_of(format)),
    };
    write_output(&dest, &encoded, args.force)?;

    println!(
        "The payload has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像、恢复载荷，并把文本或文件写入目标路径。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件。
/// * 图像中没有可识别的载荷，或载荷已损坏。
/// * 目标文件已存在且未指定 `--force`，或无法写入。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let config = CodecConfig::default();
    let depth = BitDepth::new(args.depth)?;

    let picture = read_input(&args.image, "image")?;
    let carrier = decode_rgba(&picture, &config)?;

    let payload = reveal_from_pixels(&carrier, &args.password, depth, &config).with_context(|| {
        format!(
            "Failed to recover a payload from '{}'. \nThe image may not contain a hidden message, or the depth or password is wrong.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let (dest, contents, kind) = match payload {
        Payload::Text(text) => {
            let dest = args
                .output
                .unwrap_or_else(|| sibling_path(&args.image, "recovered_", "txt"));
            (dest, text.into_bytes(), "text")
        }
        Payload::File { name, data } => {
            let dest = args
                .output
                .unwrap_or_else(|| args.image.with_file_name(sanitize_filename(&name, &config)));
            (dest, data, "file")
        }
    };
    write_output(&dest, &contents, args.force)?;

    println!(
        "The {} has been successfully recovered and saved: {}",
        kind,
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'TextHide' 命令的执行逻辑。
pub fn handle_text_hide(args: TextHideArgs) -> Result<()> {
    let config = CodecConfig::default();

    let cover = fs::read_to_string(&args.cover).with_context(|| {
        format!(
            "Unable to read cover text file: {}",
            args.cover.to_string_lossy().red().bold()
        )
    })?;
    let secret = fs::read_to_string(&args.secret).with_context(|| {
        format!(
            "Unable to read secret text file: {}",
            args.secret.to_string_lossy().red().bold()
        )
    })?;

    let options = TextOptions {
        password: args.password,
        distribute: args.distribute,
    };
    let doctored = encode_text(&cover, &secret, &options, &config)?;

    let dest = args.dest.unwrap_or_else(|| {
        let name = args
            .cover
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cover.txt".to_string());
        args.cover.with_file_name(format!("doctored_{name}"))
    });
    write_output(&dest, doctored.as_bytes(), args.force)?;

    println!(
        "The secret has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'TextReveal' 命令的执行逻辑。
pub fn handle_text_reveal(args: TextRevealArgs) -> Result<()> {
    let config = CodecConfig::default();

    let text = fs::read_to_string(&args.input).with_context(|| {
        format!(
            "Unable to read text file: {}",
            args.input.to_string_lossy().red().bold()
        )
    })?;

    let decoded = decode_text(&text, args.password.as_deref(), &config)?;
    let Some(secret) = decoded.secret_message else {
        println!("{}", "No hidden message was found in the text.".yellow().bold());
        return Ok(());
    };

    match args.output {
        Some(dest) => {
            write_output(&dest, secret.as_bytes(), args.force)?;
            println!(
                "The secret has been successfully recovered and saved: {}",
                dest.to_string_lossy().green().bold()
            );
        }
        None => println!("{secret}"),
    }

    Ok(())
}

/// 处理 'Capacity' 命令的执行逻辑。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let config = CodecConfig::default();
    let picture = read_input(&args.image, "image")?;
    let carrier = decode_rgba(&picture, &config)?;

    println!(
        "Image: {}x{}",
        carrier.width.to_string().green().bold(),
        carrier.height.to_string().green().bold()
    );
    for depth in 1..=4 {
        let depth = BitDepth::new(depth)?;
        let bytes = calculate_pixel_capacity(carrier.width, carrier.height, depth, &config)?;
        println!("  depth {}: {} bytes", depth.get(), bytes.to_string().green().bold());
    }

    Ok(())
}

/// 处理 'Sieve' 命令的执行逻辑。
pub fn handle_sieve(args: SieveArgs) -> Result<()> {
    let config = CodecConfig::default();
    let picture = read_input(&args.image, "image")?;
    let carrier = decode_rgba(&picture, &config)?;

    let sieve = generate_bit_sieve(&carrier.pixels, carrier.width, carrier.height)?;
    let sieve = RgbaCarrier::new(carrier.width, carrier.height, sieve)?;
    let encoded = encode_rgba(&sieve, ImageFormat::Png)?;

    let dest = args
        .dest
        .unwrap_or_else(|| sibling_path(&args.image, "sieve_", "png"));
    write_output(&dest, &encoded, args.force)?;

    println!(
        "The bit sieve has been saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

fn format_counts(label: &str, counts: &BitCounts) -> String {
    format!(
        "  {}: ones {} / zeros {} ({:.2}% ones)",
        label,
        counts.ones.to_string().green(),
        counts.zeros.to_string().green(),
        counts.ones_ratio() * 100.0
    )
}

/// 处理 'Stats' 命令的执行逻辑。
pub fn handle_stats(args: StatsArgs) -> Result<()> {
    let config = CodecConfig::default();
    let picture = read_input(&args.image, "image")?;
    let carrier = decode_rgba(&picture, &config)?;

    let original = match &args.original {
        Some(path) => {
            let bytes = read_input(path, "original image")?;
            Some(decode_rgba(&bytes, &config)?)
        }
        None => None,
    };

    let original_pixels = original.as_ref().map(|o| o.pixels.as_slice());
    let report = generate_lsb_stats(&carrier.pixels, original_pixels)?;
    let stats = report.stats();

    println!("LSB statistics for {}", args.image.to_string_lossy().green().bold());
    println!("{}", format_counts("R", &stats.red));
    println!("{}", format_counts("G", &stats.green));
    println!("{}", format_counts("B", &stats.blue));

    if let Report::StatsWithDelta { changed, .. } = &report {
        println!(
            "  changed vs original: R {} / G {} / B {}",
            changed[0].to_string().yellow().bold(),
            changed[1].to_string().yellow().bold(),
            changed[2].to_string().yellow().bold()
        );
    }

    Ok(())
}
