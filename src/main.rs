use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use veilcodec::{
    cli::{Cli, Commands},
    handler::{
        handle_capacity, handle_hide, handle_recover, handle_sieve, handle_stats,
        handle_text_hide, handle_text_reveal,
    },
};

/// 程序的主入口点
///
/// 负责解析命令行参数、初始化日志，并根据指定的子命令
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    SimpleLogger::new().with_level(level).init()?;

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Hide(args) => handle_hide(args),
        Commands::Recover(args) => handle_recover(args),
        Commands::TextHide(args) => handle_text_hide(args),
        Commands::TextReveal(args) => handle_text_reveal(args),
        Commands::Capacity(args) => handle_capacity(args),
        Commands::Sieve(args) => handle_sieve(args),
        Commands::Stats(args) => handle_stats(args),
    }
}
