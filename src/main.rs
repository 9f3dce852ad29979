//! 命令行入口

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use widget_translate::config::{RelayConfig, WidgetConfig};
use widget_translate::dom::{html_to_dom, serialize_dom};
use widget_translate::engine::PageTranslator;
use widget_translate::error::{EngineError, EngineResult};
use widget_translate::provider::{HttpProvider, TranslationProvider};
use widget_translate::relay;

#[derive(Parser)]
#[command(name = "widget-translate", version, about = "网页翻译引擎命令行工具")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 翻译一个HTML文件并输出结果
    Translate {
        /// 输入HTML文件路径
        input: PathBuf,

        /// 目标语言代码
        #[arg(short, long)]
        lang: String,

        /// 翻译服务地址，覆盖配置文件
        #[arg(long)]
        api: Option<String>,

        /// 输出文件路径，缺省写到标准输出
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 列出可用目标语言
    Languages {
        /// 翻译服务地址，覆盖配置文件
        #[arg(long)]
        api: Option<String>,
    },

    /// 启动翻译中继服务
    Serve {
        /// 监听地址，覆盖配置文件
        #[arg(short, long)]
        bind: Option<String>,

        /// 上游翻译服务地址
        #[arg(long)]
        upstream: Option<String>,
    },
}

#[tokio::main]
async fn main() -> EngineResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "widget_translate=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Translate {
            input,
            lang,
            api,
            output,
        } => translate_file(input, &lang, api, output).await,
        Command::Languages { api } => list_languages(api).await,
        Command::Serve { bind, upstream } => serve_relay(bind, upstream).await,
    }
}

async fn translate_file(
    input: PathBuf,
    lang: &str,
    api: Option<String>,
    output: Option<PathBuf>,
) -> EngineResult<()> {
    let mut config = WidgetConfig::load()?;
    if let Some(api) = api {
        config.api_base = api;
    }

    let data = fs::read(&input)?;
    let dom = html_to_dom(&data, "UTF-8")?;

    let provider = Arc::new(HttpProvider::new(config.api_base.clone())?);
    let engine = PageTranslator::new(&dom, config, provider)?;

    let outcome = engine.select_language(lang).await?;
    tracing::info!("翻译结果: {:?}", outcome);

    // 销毁后控件容器从文档中移除，输出即干净的翻译页面
    engine.destroy();

    let html = serialize_dom(&dom, "UTF-8")?;
    match output {
        Some(path) => fs::write(path, html)?,
        None => std::io::stdout()
            .write_all(&html)
            .map_err(EngineError::from)?,
    }

    Ok(())
}

async fn list_languages(api: Option<String>) -> EngineResult<()> {
    let mut config = WidgetConfig::load()?;
    if let Some(api) = api {
        config.api_base = api;
    }

    let provider = HttpProvider::new(config.api_base)?;
    let languages = provider.list_languages().await?;

    for language in languages {
        println!("{:<8} {}", language.code, language.name);
    }

    Ok(())
}

async fn serve_relay(bind: Option<String>, upstream: Option<String>) -> EngineResult<()> {
    let mut config = RelayConfig::load()?;
    if let Some(bind) = bind {
        config.bind = bind;
    }
    if let Some(upstream) = upstream {
        config.upstream_api_base = Some(upstream);
    }

    let upstream_base = config
        .upstream_api_base
        .clone()
        .ok_or_else(|| EngineError::Config("未配置上游翻译服务地址".to_string()))?;

    let provider = Arc::new(HttpProvider::new(upstream_base)?);
    relay::serve(config, provider).await
}
