use clap::{Args, Parser, Subcommand};
use sheet2json::api::{run_api_server, server::ApiConfig};
use sheet2json::cli;
use sheet2json::config::{
    ConvertConfig, GenerationConfig, API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL,
    DEFAULT_TIMEOUT_SECS, DEFAULT_UPLOAD_DIR,
};
use sheet2json::llm::OpenAiClient;
use sheet2json::pipeline::Converter;
use sheet2json::recovery::RecoveryStrategy;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "sheet2json")]
#[command(about = "Describe a spreadsheet's structure as normalized JSON.")]
#[command(long_about = "sheet2json - spreadsheet structure to normalized JSON

Reads every sheet of a workbook (xlsx, xlsm, xlsb, xls, ods), collects the
column headers, and asks a chat-completion service to produce a normalized
JSON layout. The JSON is recovered from the reply and written to
uploads/output.json (4-space indentation, UTF-8).

COMMANDS:
  serve     - HTTP upload form and POST /upload endpoint
  convert   - Run the full conversion for a local file
  extract   - Print the extracted structure (no network)
  prompt    - Print the prompt that would be sent (no network)
  validate  - Check a JSON file against the target schema

ENVIRONMENT:
  OPENAI_KEY   API key for the generation service (required by serve/convert)
  A .env file in the working directory is loaded if present.

EXAMPLES:
  sheet2json extract ventas.xlsx
  sheet2json convert ventas.xlsx -o ventas.json
  sheet2json serve --port 5000 --validate")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Generation service options
#[derive(Args, Debug)]
struct GenerationArgs {
    /// API key for the generation service
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "SHEET2JSON_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Chat model name
    #[arg(long, env = "SHEET2JSON_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

/// Pipeline options
#[derive(Args, Debug)]
struct PipelineArgs {
    /// Directory for uploads and output.json
    #[arg(long, env = "SHEET2JSON_UPLOAD_DIR", default_value = DEFAULT_UPLOAD_DIR)]
    upload_dir: PathBuf,

    /// Validate the generated JSON against the target schema
    #[arg(long)]
    validate: bool,

    /// Custom JSON Schema file (implies --validate)
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Recover the first balanced JSON object instead of the first-to-last brace span
    #[arg(long)]
    balanced: bool,

    /// Write output-<uuid>.json per request instead of overwriting output.json
    #[arg(long)]
    per_request_output: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server with the upload form
    Serve {
        /// Host address to bind to (use 0.0.0.0 for all interfaces)
        #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SHEET2JSON_HOST")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "5000", env = "SHEET2JSON_PORT")]
        port: u16,

        /// Largest accepted upload, in megabytes (1-4096)
        #[arg(long, default_value = "25", value_parser = clap::value_parser!(u64).range(1..=4096))]
        max_upload_mb: u64,

        #[command(flatten)]
        generation: GenerationArgs,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Convert a workbook through the generation service
    Convert {
        /// Path to the workbook
        input: PathBuf,

        /// Output JSON path (defaults to <upload-dir>/output.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        generation: GenerationArgs,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Print the extracted workbook structure
    Extract {
        /// Path to the workbook
        input: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// List sheets and inferred column kinds on stderr
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the prompt that would be sent for a workbook
    Prompt {
        /// Path to the workbook
        input: PathBuf,
    },

    /// Validate a JSON file against the target schema
    Validate {
        /// JSON file to check
        file: PathBuf,

        /// Custom JSON Schema file
        #[arg(long)]
        schema: Option<PathBuf>,
    },
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn build_converter(generation: GenerationArgs, pipeline: PipelineArgs) -> anyhow::Result<Converter> {
    let generation_config = GenerationConfig::new(generation.api_key.unwrap_or_default())?
        .with_base_url(generation.base_url)
        .with_model(generation.model)
        .with_timeout(Duration::from_secs(generation.timeout_secs));

    let config = ConvertConfig {
        upload_dir: pipeline.upload_dir,
        recovery: if pipeline.balanced {
            RecoveryStrategy::Balanced
        } else {
            RecoveryStrategy::Greedy
        },
        validate_schema: pipeline.validate || pipeline.schema.is_some(),
        schema_path: pipeline.schema,
        per_request_output: pipeline.per_request_output,
    };

    let client = OpenAiClient::new(generation_config)?;
    Ok(Converter::new(config, Arc::new(client))?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            max_upload_mb,
            generation,
            pipeline,
        } => {
            init_tracing("sheet2json=info,tower_http=info");
            let converter = build_converter(generation, pipeline)?;
            let config = ApiConfig {
                host,
                port,
                max_upload_bytes: ApiConfig::upload_limit_from_mb(max_upload_mb),
            };
            run_api_server(config, converter).await
        }

        Commands::Convert {
            input,
            output,
            generation,
            pipeline,
        } => {
            init_tracing("sheet2json=warn");
            let converter = build_converter(generation, pipeline)?;
            Ok(cli::convert(&converter, input, output).await?)
        }

        Commands::Extract {
            input,
            output,
            verbose,
        } => {
            init_tracing("sheet2json=warn");
            Ok(cli::extract(input, output, verbose)?)
        }

        Commands::Prompt { input } => {
            init_tracing("sheet2json=warn");
            Ok(cli::prompt(input)?)
        }

        Commands::Validate { file, schema } => Ok(cli::validate(file, schema)?),
    }
}
