use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "nyc-heat-index")]
#[command(about = "Builds the monthly NYC restaurant heat index from hit-list pages")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "heat-index.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Override the output directory from config
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override issue.max_entities from config
    #[arg(long)]
    pub max_entities: Option<usize>,

    /// Dry run - fetch and score, print the ranking, write nothing
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// 將命令列覆蓋設定套用到載入的配置
    pub fn apply_overrides(&self, config: &mut crate::config::toml_config::TomlConfig) {
        if let Some(output) = &self.output {
            config.load.output_path = output.clone();
            tracing::info!("🔧 Output path overridden to: {}", output);
        }
        if let Some(max) = self.max_entities {
            config.issue.max_entities = Some(max);
            tracing::info!("🔧 max_entities overridden to: {}", max);
        }
    }
}
