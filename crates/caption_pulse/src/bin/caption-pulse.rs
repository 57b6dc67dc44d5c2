use std::{path::PathBuf, time::Duration};

use caption_pulse::{
    config::{ChunkingConfig, ExtractorConfig, MapReduceConfig},
    openai::ChatClient,
    tracing::init_tracing_subscriber,
    types::{SummaryRequest, SummaryStrategy, VideoReference},
    web::loader::WebPageLoader,
    yt::{captions::YtDlpCaptions, locator::ExecutableLocator},
    fetch_transcript, SummaryPipelineBuilder,
};
use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "caption-pulse", about = "Summarize YouTube videos and web pages")]
struct Cli {
    /// Explicit yt-dlp executable, tried before the usual install locations
    #[arg(long, env = "YTDLP_PATH", global = true)]
    ytdlp_path: Option<PathBuf>,

    /// Subtitle language to request from yt-dlp
    #[arg(long, env = "SUB_LANG", default_value = "en", global = true)]
    sub_lang: String,

    /// Seconds to wait for yt-dlp before giving up (0 waits forever)
    #[arg(long, env = "EXTRACTION_TIMEOUT_SECS", default_value = "300", global = true)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize a YouTube video or a web page
    Summarize {
        url: String,

        /// API key for the chat completions endpoint
        #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
        api_key: String,

        /// OpenAI-compatible base URL
        #[arg(long, env = "LLM_BASE_URL", default_value = ChatClient::DEFAULT_BASE_URL)]
        base_url: String,

        #[arg(long, env = "LLM_MODEL", default_value = ChatClient::DEFAULT_MODEL)]
        model: String,

        /// System message sent ahead of every prompt
        #[arg(long, env = "LLM_SYSTEM_PROMPT")]
        system_prompt: Option<String>,

        /// Sampling temperature; the provider default when unset
        #[arg(long, env = "LLM_TEMPERATURE")]
        temperature: Option<f32>,

        /// Maximum characters per chunk
        #[arg(long, env = "MAX_CHUNK_SIZE", default_value = "3000")]
        max_chunk_size: usize,

        /// Characters shared between neighbouring chunks
        #[arg(long, env = "CHUNK_OVERLAP", default_value = "300")]
        chunk_overlap: usize,

        #[arg(long, value_enum, default_value_t = Strategy::MapReduce)]
        strategy: Strategy,

        /// Chunk summaries requested concurrently during the map stage
        #[arg(long, env = "MAP_CONCURRENCY", default_value = "4")]
        map_concurrency: usize,

        /// Accept invalid TLS certificates when loading web pages
        #[arg(long)]
        insecure: bool,
    },
    /// Print the normalized captions of a video
    Transcript { url: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    MapReduce,
    Stuff,
}

impl From<Strategy> for SummaryStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::MapReduce => SummaryStrategy::MapReduce,
            Strategy::Stuff => SummaryStrategy::Stuff,
        }
    }
}

/// yt-dlp is only looked up once a video URL needs it.
fn caption_source(cli: &Cli) -> YtDlpCaptions {
    let mut locator = ExecutableLocator::default();
    if let Some(path) = &cli.ytdlp_path {
        locator = locator.prefer(path);
    }

    let config = ExtractorConfig {
        language: cli.sub_lang.clone(),
        timeout: (cli.timeout_secs > 0).then(|| Duration::from_secs(cli.timeout_secs)),
        ..Default::default()
    };

    YtDlpCaptions::deferred(locator, config)
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling...");
            token.cancel();
        }
    });

    cancel
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    let captions = caption_source(&cli);
    let cancel = cancel_on_ctrl_c();

    match cli.command {
        Command::Summarize {
            url,
            api_key,
            base_url,
            model,
            system_prompt,
            temperature,
            max_chunk_size,
            chunk_overlap,
            strategy,
            map_concurrency,
            insecure,
        } => {
            let mut chat = ChatClient::new(api_key)
                .with_base_url(base_url)
                .with_model(model);
            if let Some(prompt) = system_prompt {
                chat = chat.with_system_prompt(prompt);
            }
            if let Some(temperature) = temperature {
                chat = chat.with_temperature(temperature);
            }

            let pipeline = SummaryPipelineBuilder::new()
                .caption_source(captions)
                .page_loader(WebPageLoader::new(insecure)?)
                .summarizer(chat)
                .map_reduce(MapReduceConfig {
                    map_concurrency,
                    ..Default::default()
                })
                .cancellation_token(cancel)
                .build()?;

            let request = SummaryRequest::new(url)
                .with_chunking(ChunkingConfig::new(max_chunk_size, chunk_overlap))
                .with_strategy(strategy.into());

            let summary = pipeline.run(request).await?;
            tracing::info!(source = ?summary.source, chunks = summary.chunk_count, "Done");
            println!("{}", summary.text);
        }
        Command::Transcript { url } => {
            let video = VideoReference::parse(&url)?;
            let transcript = fetch_transcript(&captions, &video, &cancel).await?;
            println!("{}", &*transcript);
        }
    }

    Ok(())
}
