use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use job_config_editor::io::{FsJobBackend, HttpJobBackend, JobBackend};
use job_config_editor::{
    init_logging, CommitOutcome, EditTracker, EditorConfig, InputDisplay, JobSession, JobType,
    ViewState,
};

#[derive(Parser)]
#[command(name = "job_config_editor")]
#[command(about = "加载作业配置、编辑字段并输出已提交的变更")]
#[command(version = "0.1.0")]
struct Cli {
    /// 作业类型（Data Extract / Data Load / File Delivery）
    #[arg(short = 't', long)]
    job_type: Option<String>,

    /// 作业名称
    #[arg(short, long)]
    job: Option<String>,

    /// 后端服务地址（覆盖配置文件，默认 http://127.0.0.1:8000）
    #[arg(long, env = "JOB_EDITOR_SERVER_URL")]
    server: Option<String>,

    /// JSON 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 从本地目录读取设置文件（代替后端服务）
    #[arg(long)]
    dir: Option<PathBuf>,

    /// 直接打开本地配置文件
    #[arg(long, conflicts_with_all = ["job_type", "job", "dir"])]
    file: Option<PathBuf>,

    /// 修改字段：name=value（可重复）
    #[arg(long = "set", value_name = "NAME=VALUE")]
    sets: Vec<String>,

    /// 只列出可用的作业名称
    #[arg(long)]
    list_names: bool,

    /// 静默模式(仅输出导出结果)
    #[arg(long)]
    quiet: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("加载配置文件失败: {:?}", path))?,
        None => EditorConfig::default(),
    };
    if let Some(server) = &cli.server {
        config = config.with_server_url(server.clone());
    }
    let backend = build_backend(&cli, &config);
    let mut session = JobSession::new(backend, config);

    if let Some(file) = &cli.file {
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("读取配置文件失败: {:?}", file))?;
        session.open_content(content);
    } else {
        load_from_backend(&cli, &mut session)?;
        if cli.list_names {
            return Ok(());
        }
    }

    if session.view_state() == ViewState::NoFields {
        println!("No Variables Found");
        return Ok(());
    }

    let tracker = session
        .tracker_mut()
        .ok_or_else(|| anyhow!("没有已加载的内容"))?;

    if !cli.quiet {
        print_fields(tracker);
    }

    apply_edits(tracker, &cli.sets)?;

    if !cli.sets.is_empty() {
        handle_commit(tracker, cli.quiet)?;
    }

    Ok(())
}

/// 根据参数选择后端
fn build_backend(cli: &Cli, config: &EditorConfig) -> Box<dyn JobBackend> {
    match &cli.dir {
        Some(dir) => Box::new(FsJobBackend::new(dir.clone())),
        None => Box::new(HttpJobBackend::from_config(config)),
    }
}

/// 通过后端选择作业类型并加载作业
fn load_from_backend(cli: &Cli, session: &mut JobSession<Box<dyn JobBackend>>) -> Result<()> {
    let label = cli
        .job_type
        .as_deref()
        .ok_or_else(|| anyhow!("需要 --job-type 或 --file"))?;

    if session.select_job_type(label).is_none() {
        let labels: Vec<&str> = JobType::ALL.iter().map(|t| t.label()).collect();
        bail!("未知的作业类型: {}（可选: {}）", label, labels.join(", "));
    }

    if cli.list_names {
        for name in session.available_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    session.set_job_name(cli.job.clone().unwrap_or_default());
    session.load_task().map_err(|e| anyhow!(e))?;

    if !cli.quiet {
        println!("已加载作业: {} ({})", session.job_name(), session.file_name());
    }

    Ok(())
}

/// 应用 --set 参数
fn apply_edits(tracker: &mut EditTracker, sets: &[String]) -> Result<()> {
    for set in sets {
        let (name, value) = set
            .split_once('=')
            .ok_or_else(|| anyhow!("--set 参数格式应为 name=value: {}", set))?;
        tracker.set_working_text(name.trim(), value)?;
    }
    Ok(())
}

/// 提交并输出结果
fn handle_commit(tracker: &mut EditTracker, quiet: bool) -> Result<()> {
    match tracker.commit() {
        CommitOutcome::NothingToUpdate => {
            println!("No changes to update!");
            return Ok(());
        }
        CommitOutcome::Committed { updated, reverted } => {
            if !quiet {
                println!("\n已更新: {}", updated.join(", "));
                if !reverted.is_empty() {
                    println!("已恢复为原始值: {}", reverted.join(", "));
                }
                println!("{}", tracker.summary());
            }
        }
    }

    if tracker.can_export() {
        let exported = serde_json::to_string_pretty(&tracker.export_values())?;
        println!("{}", exported);
    }

    Ok(())
}

/// 打印字段列表
fn print_fields(tracker: &EditTracker) {
    println!("{}", tracker.summary());

    for (name, field) in tracker.fields() {
        let display = match tracker.display_value(name) {
            Some(InputDisplay::Toggle(checked)) => (if checked { "[x]" } else { "[ ]" }).to_string(),
            Some(InputDisplay::Text(text)) => text,
            None => String::new(),
        };

        println!(
            "  {} ({}) = {}    原始: {}{}",
            name,
            field.value.type_name(),
            display,
            field.original_line.trim(),
            if field.comment.is_empty() {
                String::new()
            } else {
                format!("  {}", field.comment)
            }
        );
    }
}
