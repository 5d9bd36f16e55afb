//! rsdrivedb 命令行：按型号查询 SMART 属性规则

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use rsdrivedb::config::{DEFAULT_ADDITIONAL_RULE_PATHS, DEFAULT_RULE_PATHS};
use rsdrivedb::utils::vendor_attribute;
use rsdrivedb::{ConfigManager, DriveDb, GlobalConfig};

/// 硬盘型号数据库查询工具
#[derive(Parser, Debug)]
#[command(name = "rsdrivedb", version, about)]
struct Cli {
    /// 输出调试日志（也可通过 RUST_LOG 控制）
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 按型号字符串查询合并后的属性规则
    Lookup {
        /// ATA IDENTIFY 返回的型号字符串
        ident: String,

        /// 附加属性描述，格式 ID,FORMAT[:BYTEORDER][,NAME[,(HDD|SSD)]]（同 smartctl -v）
        #[arg(short = 'v', long = "vendorattribute", value_name = "ATTR")]
        attributes: Vec<String>,

        /// 以 JSON 输出
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        db: DbArgs,
    },
    /// 按优先级列出数据库中的型号条目
    List {
        #[command(flatten)]
        db: DbArgs,
    },
}

#[derive(Args, Debug)]
struct DbArgs {
    /// 规则文件：'FILE' 为主文件（取第一个可用的），'+FILE' 为附加文件（全部加载，优先匹配）
    #[arg(short = 'B', long = "drivedb", value_name = "[+]FILE")]
    drivedb: Vec<String>,

    /// 不合入内置 DEFAULT 规则
    #[arg(long)]
    no_builtin_default: bool,

    /// 遇到无效型号正则时报错退出
    #[arg(long)]
    strict: bool,

    /// MessagePack 缓存文件路径
    #[arg(long, value_name = "FILE")]
    cache: Option<PathBuf>,
}

impl DbArgs {
    fn to_config(&self) -> GlobalConfig {
        let (additional, main): (Vec<&str>, Vec<&str>) = self
            .drivedb
            .iter()
            .map(String::as_str)
            .partition(|path| path.starts_with('+'));
        let additional: Vec<PathBuf> = additional.iter().map(|path| PathBuf::from(&path[1..])).collect();
        let main: Vec<PathBuf> = main.iter().map(PathBuf::from).collect();

        // 未指定主文件时使用系统默认位置；此时未指定附加文件也使用默认附加文件
        let (main, additional) = if main.is_empty() {
            let main = DEFAULT_RULE_PATHS.iter().map(PathBuf::from).collect();
            let additional = if additional.is_empty() {
                DEFAULT_ADDITIONAL_RULE_PATHS.iter().map(PathBuf::from).collect()
            } else {
                additional
            };
            (main, additional)
        } else {
            (main, additional)
        };

        let mut builder = ConfigManager::custom()
            .rule_paths(main)
            .additional_rule_paths(additional)
            .use_builtin_default(!self.no_builtin_default)
            .strict_patterns(self.strict);
        if let Some(cache) = &self.cache {
            builder = builder.cache_path(cache.clone());
        }
        builder.build()
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// 无效条目已由编译阶段以 warn 日志报告
async fn open_db(args: &DbArgs) -> Result<DriveDb> {
    let config = args.to_config();
    debug!("规则配置：{:?}", config);

    DriveDb::open_async(&config).await.context("加载型号数据库失败")
}

/// list 子命令输出：按优先级列出 family，随后列出被丢弃的条目
fn list_lines(db: &DriveDb) -> Vec<String> {
    let mut lines: Vec<String> = db
        .families()
        .enumerate()
        .map(|(index, family)| format!("{:>5}  {}", index, family))
        .collect();
    for skipped in &db.report().skipped {
        lines.push(format!("skipped #{} ({}): {}", skipped.position, skipped.family, skipped.error));
    }
    lines
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Lookup { ident, attributes, json, db } => {
            let attributes = vendor_attribute::parse_all(attributes.iter().map(String::as_str))
                .context("无效的 -v 属性描述")?;
            let db = open_db(&db).await?;

            let mut resolved = db.lookup_drive(ident.as_bytes());
            resolved.apply_vendor_attributes(&attributes);

            if json {
                println!("{}", serde_json::to_string_pretty(&resolved)?);
                return Ok(());
            }

            if resolved.is_matched() {
                println!("Model family: {}", resolved.family);
            } else {
                println!("Model family: <not in database>");
            }
            if let Some(warning) = resolved.warning() {
                println!("WARNING: {}", warning);
            }
            println!("{:>4}  {:<28} {}", "ID", "NAME", "CONV");
            for (id, conv) in resolved.sorted_presets() {
                println!("{:>4}  {:<28} {}", id, conv.name, conv.conv);
            }
        }
        Command::List { db } => {
            let db = open_db(&db).await?;
            for line in list_lines(&db) {
                println!("{}", line);
            }
        }
    }

    Ok(())
}
