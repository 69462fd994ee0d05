//! CLI command implementations.

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::feeds::FeedManager;
use crate::index::LogIndex;
use crate::observability::{Logger, Severity};
use crate::rpc::{Dispatcher, RpcServer};
use crate::schema::{self, FeedSchema, TypeRegistry};
use crate::store::MemoryStore;

use super::args::{Cli, Command};
use super::errors::CliResult;

/// Parses arguments and runs the selected command.
pub fn run() -> CliResult<()> {
    match Cli::parse_args().command {
        Command::Init { config } => init(&config),
        Command::Schema { config } => generate_schema(&config).map(|_| ()),
        Command::Start { config } => start(&config),
    }
}

fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    if !config_path.exists() {
        let content = serde_json::to_string_pretty(&config)
            .expect("default config serializes");
        std::fs::write(config_path, content)?;
    }
    std::fs::create_dir_all(&config.data_dir)?;
    Logger::log(
        Severity::Info,
        "initialized",
        &[("config", &config_path.display().to_string())],
    );
    Ok(())
}

/// Loads the schema config, generates the canonical schema and persists it
/// to its well-known location.
fn generate_schema(config_path: &Path) -> CliResult<FeedSchema> {
    let config = Config::load(config_path)?;
    let registry = TypeRegistry::with_builtin();

    let schema_config = schema::load_config(&config.schema_config)?;
    let generated = schema::SchemaValidator::new(&registry).generate(&schema_config)?;
    schema::persist_schema(&generated, &config.schema_output_path())?;

    Logger::log(
        Severity::Info,
        "schema_persisted",
        &[
            ("schema", &generated.name),
            ("path", &config.schema_output_path().display().to_string()),
        ],
    );
    Ok(generated)
}

fn start(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let generated = generate_schema(config_path)?;
    let registry = TypeRegistry::with_builtin();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let index = Arc::new(LogIndex::new(config.index_log_path()));
        // In-process store; a networked DistributedStore implementation
        // plugs in here without touching the manager.
        let store = Arc::new(MemoryStore::new());

        let manager = Arc::new(FeedManager::new(generated, &registry, index, store)?);
        manager.start().await?;

        // Re-announce previously created feeds after restart.
        if let Err(err) = manager.start_broadcast().await {
            Logger::error("startup_broadcast_failed", &err, &[]);
        }

        let dispatcher = Arc::new(Dispatcher::new(manager));
        let server = RpcServer::new(config.http.clone(), dispatcher);
        server.start().await?;
        Ok(())
    })
}
