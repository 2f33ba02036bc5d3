// ==========================================
// ERP 报表核心 - 命令行入口
// ==========================================
// 用法:
//   erp-reporting report <report_id> [选项]
//   erp-reporting export-report <report_id> [选项]
//   erp-reporting forecast [选项]
//   erp-reporting export-forecast [选项]
//   erp-reporting list-reports [--dept <department_id>]
//   erp-reporting recent-logs [limit]
//
// 选项:
//   --from <YYYY-MM-DD[ HH:MM:SS]>  --to <YYYY-MM-DD[ HH:MM:SS]>
//   --user <user_id>  --dept <department_id>  --ip <address>  --out <dir>
//
// 路径: ERP_REPORTING_DB_PATH / ERP_REPORTING_ERP_DB_PATH
// ==========================================

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use erp_reporting::api::ExportFile;
use erp_reporting::app::AppState;
use erp_reporting::config::AppConfig;
use erp_reporting::domain::CallerContext;
use erp_reporting::logging;

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().cloned() else {
        bail!("缺少命令: report | export-report | forecast | export-forecast | list-reports | recent-logs");
    };
    let (positional, options) = split_args(&args[1..])?;

    let config = AppConfig::from_env();
    tracing::info!("ERP 报表核心 v{}", erp_reporting::VERSION);
    let state = AppState::new(config).map_err(|e| anyhow!(e))?;

    let caller = CallerContext::new(
        parse_i64_option(&options, "user")?.unwrap_or(1),
        parse_i64_option(&options, "dept")?.unwrap_or(1),
        options.get("ip").cloned().unwrap_or_else(|| "127.0.0.1".to_string()),
    );
    let from = parse_date_option(&options, "from", false)?;
    let to = parse_date_option(&options, "to", true)?;

    match command.as_str() {
        "report" => {
            let report_id = parse_report_id(&positional)?;
            let result = state.report_api.get_report(report_id, from, to, &caller)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        "export-report" => {
            let report_id = parse_report_id(&positional)?;
            let file = state.report_api.export_report(report_id, from, to, &caller)?;
            write_export(&file, options.get("out"))?;
        }
        "forecast" => {
            let groups = state.forecast_api.get_forecast(from, to, &caller)?;
            println!("{}", serde_json::to_string_pretty(&groups)?);
        }
        "export-forecast" => {
            let file = state.forecast_api.export_forecast(from, to, &caller)?;
            write_export(&file, options.get("out"))?;
        }
        "list-reports" => {
            let reports = state
                .report_api
                .list_report_definitions(options.get("dept").map(String::as_str))?;
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        "recent-logs" => {
            let limit = match positional.first() {
                Some(v) => v.parse::<i64>().with_context(|| format!("无效的 limit: {}", v))?,
                None => 20,
            };
            let logs = state.audit_api.recent_logs(limit)?;
            println!("{}", serde_json::to_string_pretty(&logs)?);
        }
        other => bail!("未知命令: {}", other),
    }

    Ok(())
}

/// 拆分位置参数与 --key value 选项
fn split_args(args: &[String]) -> Result<(Vec<String>, HashMap<String, String>)> {
    let mut positional = Vec::new();
    let mut options = HashMap::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if let Some(key) = arg.strip_prefix("--") {
            let value = iter
                .next()
                .ok_or_else(|| anyhow!("选项 --{} 缺少取值", key))?;
            options.insert(key.to_string(), value.clone());
        } else {
            positional.push(arg.clone());
        }
    }

    Ok((positional, options))
}

fn parse_report_id(positional: &[String]) -> Result<i64> {
    let raw = positional.first().ok_or_else(|| anyhow!("缺少 report_id"))?;
    raw.parse::<i64>()
        .with_context(|| format!("无效的 report_id: {}", raw))
}

fn parse_i64_option(options: &HashMap<String, String>, key: &str) -> Result<Option<i64>> {
    options
        .get(key)
        .map(|v| {
            v.parse::<i64>()
                .with_context(|| format!("--{} 需要整数: {}", key, v))
        })
        .transpose()
}

/// 解析日期选项（仅日期时, from 取当天 00:00:00, to 取当天 23:59:59）
fn parse_date_option(
    options: &HashMap<String, String>,
    key: &str,
    end_of_day: bool,
) -> Result<Option<NaiveDateTime>> {
    let Some(raw) = options.get(key) else {
        return Ok(None);
    };
    let raw = raw.trim();

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(Some(dt));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("--{} 日期格式无效: {}", key, raw))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(Some)
        .ok_or_else(|| anyhow!("--{} 日期无效: {}", key, raw))
}

fn write_export(file: &ExportFile, out_dir: Option<&String>) -> Result<()> {
    let dir = out_dir.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir).with_context(|| format!("无法创建目录: {}", dir.display()))?;

    let path = dir.join(&file.file_name);
    std::fs::write(&path, &file.content).with_context(|| format!("无法写入文件: {}", path.display()))?;

    println!("{} ({} bytes)", path.display(), file.size_bytes);
    Ok(())
}
