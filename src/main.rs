use clap::Parser;
use nyc_heat_index::core::{ConfigProvider, Pipeline};
use nyc_heat_index::utils::error::{ErrorSeverity, HeatError};
use nyc_heat_index::utils::{logger, validation::Validate};
use nyc_heat_index::{
    CliArgs, EtlEngine, HtmlRenderer, HttpFetcher, IssuePipeline, LocalStorage, TomlConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting nyc-heat-index");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    args.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    if args.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    display_config_summary(&config, &args);

    let result = if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - Nothing will be written");
        perform_dry_run(config).await
    } else {
        run(config).await
    };

    if let Err(e) = result {
        report_failure(&e);
    }

    Ok(())
}

type CliPipeline = IssuePipeline<HttpFetcher, HtmlRenderer, LocalStorage, TomlConfig>;

fn build_pipeline(config: TomlConfig) -> nyc_heat_index::Result<CliPipeline> {
    let fetcher = HttpFetcher::new(&config.fetch)?;
    let renderer = HtmlRenderer::new()?.with_timezone(config.timezone());
    let storage = LocalStorage::new(config.output_path().to_string());
    Ok(IssuePipeline::new(fetcher, renderer, storage, config))
}

async fn run(config: TomlConfig) -> nyc_heat_index::Result<()> {
    let pipeline = build_pipeline(config)?;

    let engine = EtlEngine::new(pipeline);
    let output_path = engine.run().await?;

    tracing::info!("✅ Heat index completed successfully!");
    println!("✅ Heat index completed successfully!");
    println!("📁 Issue saved to: {}", output_path);
    Ok(())
}

/// Fetch and score, then print the ranking instead of writing the issue.
async fn perform_dry_run(config: TomlConfig) -> nyc_heat_index::Result<()> {
    let pipeline = build_pipeline(config)?;

    let extracted = pipeline.extract().await?;
    let issue = pipeline.transform(extracted).await?;

    println!("🔍 Dry Run Analysis:");
    println!(
        "  {} restaurants from {} mentions",
        issue.stats.total_entities, issue.stats.total_mentions
    );
    for (rank, entity) in issue.entities.iter().enumerate() {
        println!(
            "  {:>2}. {:<40} heat {:>3}  {:<9}  {}",
            rank + 1,
            entity.display_name,
            entity.heat_score,
            entity.difficulty_tier.label(),
            entity.sources.join(", ")
        );
    }
    for warning in &issue.stats.warnings {
        println!("  ⚠️ {}", warning);
    }

    println!();
    println!("✅ Dry run analysis complete. Nothing was written.");
    Ok(())
}

fn report_failure(e: &HeatError) {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Heat index run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}

fn display_config_summary(config: &TomlConfig, args: &CliArgs) {
    let settings = config.settings();

    println!("📋 Configuration Summary:");
    println!("  Issue: {}", config.issue.title);
    for source in &config.sources {
        println!(
            "  Source: {} (weight {:.2}, {}, {:?})",
            source.name,
            source.trust_weight,
            if source.ranked { "ranked" } else { "unranked" },
            source.rule
        );
    }
    println!("  Output: {}", config.output_path());
    println!(
        "  Similarity threshold: {:.2}",
        settings.resolution.similarity_threshold
    );
    if let Some(max) = settings.max_entities {
        println!("  Max Entities: {}", max);
    }
    println!("  JSON payload: {}", config.write_json());
    println!("  Timezone: {}", config.timezone());
    println!("  Issue history: {}", config.state_file());
    println!("  og:image fallback: {}", config.og_image_fallback());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
