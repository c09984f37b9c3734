use anyhow::Context;
use clap::Parser;
use swiss_reframe::adapters::csv_io;
use swiss_reframe::config::cli::{Cli, Command};
use swiss_reframe::utils::{logger, validation::Validate};
use swiss_reframe::{Converter, ConverterConfig, DiscrepancySummary, ReframeError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting swiss-reframe");

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let exit_code = match e.downcast_ref::<ReframeError>() {
                Some(err) => {
                    tracing::error!("❌ {} failed: {}", err.stage(), err);
                    eprintln!("❌ {}", err.user_friendly_message());
                    eprintln!("💡 Suggestion: {}", err.recovery_suggestion());
                    // 根據錯誤類型決定退出碼
                    match err {
                        ReframeError::ResourceUnavailable { .. } => 3,
                        err if err.is_config_error() => 2,
                        _ => 1,
                    }
                }
                None => {
                    tracing::error!("❌ {:#}", e);
                    eprintln!("❌ {:#}", e);
                    1
                }
            };
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    // 載入配置
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            ConverterConfig::from_file(path)?
        }
        None => ConverterConfig::default(),
    };
    config.validate()?;
    if cli.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    match cli.command {
        Command::Convert {
            points,
            backend,
            mode,
            input,
            output,
        } => {
            let backend = backend.unwrap_or(config.conversion.backend);
            let mode = mode.unwrap_or(config.conversion.direction_mode);

            let mut points = points;
            if let Some(path) = &input {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("cannot open input {}", path.display()))?;
                points.extend(csv_io::read_points(file)?);
            }
            if points.is_empty() {
                anyhow::bail!("no points given, pass x,y arguments or --input");
            }

            let converter = Converter::from_config(&config, mode)?;
            let results = converter.convert(&points, backend).await?;
            tracing::info!("✅ Converted {} point(s) with the {} backend", results.len(), backend);

            match &output {
                Some(path) => {
                    let file = std::fs::File::create(path)
                        .with_context(|| format!("cannot create output {}", path.display()))?;
                    csv_io::write_conversions(file, &points, &results)?;
                    println!("📁 Output saved to: {}", path.display());
                }
                None => {
                    for (input, result) in points.iter().zip(&results) {
                        println!("{} -> {:.6},{:.6}", input, result.x, result.y);
                    }
                }
            }
            Ok(0)
        }

        Command::Check {
            count,
            tolerance,
            output,
        } => {
            let converter = Converter::from_config(&config, config.conversion.direction_mode)?;
            let reports = converter.check_conversion(count).await;
            let summary = DiscrepancySummary::from_reports(count, &reports);

            if let Some(path) = &output {
                let file = std::fs::File::create(path)
                    .with_context(|| format!("cannot create output {}", path.display()))?;
                csv_io::write_reports(file, &reports)?;
                println!("📁 Reports saved to: {}", path.display());
            }

            println!(
                "Checked {}/{} point(s) ({} skipped) at {}",
                summary.completed,
                summary.requested,
                summary.skipped,
                summary.generated_at.to_rfc3339()
            );
            println!(
                "Local vs REST discrepancy: max {:.4} m, mean {:.4} m",
                summary.max_m, summary.mean_m
            );

            if summary.completed == 0 && count > 0 {
                eprintln!("❌ Every point failed, see the log for details");
                return Ok(1);
            }
            if !summary.within_tolerance(tolerance) {
                eprintln!("❌ Discrepancy exceeds tolerance of {} m", tolerance);
                return Ok(1);
            }
            println!("✅ Backends agree within {} m", tolerance);
            Ok(0)
        }
    }
}
