mod commands;
mod logging;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use modernizer_core::Config;
use modernizer_pipeline::StageId;

use commands::{Context, ShowTarget, StageAction};

#[derive(Parser, Debug)]
#[command(name = "cobol-modernizer")]
#[command(about = "Turn COBOL source into a BRD and Java code with an LLM")]
#[command(version)]
struct Cli {
    /// Session to work on
    #[arg(long, global = true, default_value = "default", env = "MODERNIZER_SESSION")]
    session: String,

    /// Directory for sessions and exports (default: ~/.cobol-modernizer)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true, default_value = "false")]
    debug: bool,

    /// LLM provider (openai, anthropic)
    #[arg(long, global = true)]
    provider: Option<String>,

    #[arg(long, global = true)]
    model: Option<String>,

    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze COBOL source and generate a BRD
    Brd {
        /// COBOL source file
        #[arg(long)]
        cobol: PathBuf,
        /// Business glossary file
        #[arg(long)]
        glossary: Option<PathBuf>,
    },
    /// Generate Java code from the COBOL source and the BRD
    Java,
    /// Evaluate the Java code and optimize it
    Optimize,
    /// Apply enterprise refinements to the optimized Java code
    Refine,
    /// Run every stage from BRD generation up to --until
    Run {
        #[arg(long)]
        cobol: PathBuf,
        #[arg(long)]
        glossary: Option<PathBuf>,
        /// Last stage to run (brd, java, optimize, refine)
        #[arg(long, default_value = "refine")]
        until: StageId,
    },
    /// Print stored session content
    Show {
        #[arg(value_enum)]
        what: ShowTarget,
    },
    /// Write the BRD document and Java file to a directory
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List stages and whether they can run now
    Stages,
    /// List stored sessions
    Sessions,
}

impl Cli {
    /// Command line flags take precedence over file and environment config.
    ///
    /// The API key is looked up through `lookup` only after the provider is
    /// final; `--api-key` beats any variable.
    fn apply_overrides<F>(&self, config: &mut Config, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = &self.provider {
            config.provider = provider.trim().to_ascii_lowercase();
        }
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if let Some(base_url) = &self.base_url {
            config.api_base = Some(base_url.clone());
        }
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = Some(data_dir.clone());
        }

        config.resolve_api_key(lookup);
        if let Some(api_key) = &self.api_key {
            config.api_key = Some(api_key.clone());
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.debug);

    let mut config = Config::new();
    cli.apply_overrides(&mut config, |key| std::env::var(key).ok());
    log::debug!(
        "Provider: {}, model: {}, data dir: {}",
        config.provider,
        config.model_name(),
        config.data_dir().display()
    );

    let ctx = Context::open(config, cli.session.clone()).await?;

    match cli.command {
        Commands::Brd { cobol, glossary } => {
            let cobol_source = commands::read_input(&cobol).await?;
            let glossary = commands::read_optional_input(glossary.as_deref()).await?;
            let action = StageAction::Single(StageId::GenerateBrd);
            commands::run_pipeline(&ctx, action, &cobol_source, &glossary).await
        }
        Commands::Java => {
            let action = StageAction::Single(StageId::GenerateJava);
            commands::run_pipeline(&ctx, action, "", "").await
        }
        Commands::Optimize => {
            let action = StageAction::Single(StageId::EvaluateAndOptimize);
            commands::run_pipeline(&ctx, action, "", "").await
        }
        Commands::Refine => {
            let action = StageAction::Single(StageId::RefineEnterprise);
            commands::run_pipeline(&ctx, action, "", "").await
        }
        Commands::Run {
            cobol,
            glossary,
            until,
        } => {
            let cobol_source = commands::read_input(&cobol).await?;
            let glossary = commands::read_optional_input(glossary.as_deref()).await?;
            commands::run_pipeline(&ctx, StageAction::Through(until), &cobol_source, &glossary)
                .await
        }
        Commands::Show { what } => commands::show(&ctx, what).await,
        Commands::Export { out } => commands::export(&ctx, out).await.map(|_| ()),
        Commands::Stages => commands::stages(&ctx).await,
        Commands::Sessions => commands::sessions(&ctx).await,
    }
}
