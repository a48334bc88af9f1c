use anyhow::{bail, Context};
use clap::Parser;
use small_fdw::config::TableConfig;
use small_fdw::utils::{logger, validation::Validate};
use small_fdw::{
    AdapterError, AdapterRegistry, CliCommand, CliConfig, ErrorCategory, FdwConfig, ForeignScan,
    ImportRequest, ScanError, ScanSummary,
};
use std::path::Path;
use std::time::Duration;

/// Consecutive failed pulls tolerated by `--keep-going` before giving up.
const MAX_CONSECUTIVE_FAILURES: usize = 3;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(cli).await {
        let adapter_error = e
            .downcast_ref::<ScanError>()
            .map(|scan| &scan.error)
            .or_else(|| e.downcast_ref::<AdapterError>());

        tracing::error!("❌ {:#}", e);
        eprintln!("❌ {:#}", e);

        let exit_code = match adapter_error {
            Some(err) => {
                eprintln!("💡 {}", err.recovery_suggestion());
                match err.category() {
                    ErrorCategory::Configuration => 1,
                    ErrorCategory::Source => 2,
                    ErrorCategory::Parse => 3,
                }
            }
            None => 1,
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: CliConfig) -> anyhow::Result<()> {
    let config = load_config(&cli.config)?;

    match cli.command {
        CliCommand::Scan {
            table,
            no_header,
            keep_going,
        } => {
            let config = config.with_context(|| {
                format!("scan needs a configuration file ({} not found)", cli.config)
            })?;
            let table_config = config.table(&table)?.clone();

            let task =
                tokio::task::spawn_blocking(move || run_scan(&table_config, no_header, keep_going));

            let summary = match cli.timeout_secs {
                Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), task).await {
                    Ok(joined) => joined??,
                    Err(_) => {
                        // The blocking pull cannot be interrupted; leave it behind.
                        tracing::error!("⏱️ Scan of '{}' timed out after {}s", table, secs);
                        eprintln!("⏱️ Scan of '{}' timed out after {}s", table, secs);
                        std::process::exit(124);
                    }
                },
                None => task.await??,
            };

            tracing::info!(
                "✅ Scanned '{}' ({}): {} rows",
                table,
                summary.class,
                summary.rows
            );
        }

        CliCommand::ImportSchema {
            table,
            class,
            schema,
            prefix,
            server,
            options,
        } => {
            let registry = AdapterRegistry::with_builtins();

            if let Some(class) = class {
                let server_name = server
                    .or_else(|| config.as_ref().map(|c| c.server.name.clone()))
                    .context("--server is required without a configuration file")?;
                let request = ImportRequest {
                    local_schema: schema
                        .or_else(|| config.as_ref().map(|c| c.default_schema().to_string()))
                        .unwrap_or_else(|| "public".to_string()),
                    prefix,
                    server_name,
                    options: options.into_iter().collect(),
                };
                println!("{}", registry.import_schema(&class, &request)?);
                return Ok(());
            }

            let config = config.with_context(|| {
                format!(
                    "import-schema needs --class or a configuration file ({} not found)",
                    cli.config
                )
            })?;
            let tables: Vec<&TableConfig> = match &table {
                Some(name) => vec![config.table(name)?],
                None => config.tables.iter().collect(),
            };

            for table in tables {
                let (class, mut request) = config.import_request(table)?;
                if let Some(schema) = &schema {
                    request.local_schema = schema.clone();
                }
                if prefix.is_some() {
                    request.prefix = prefix.clone();
                }
                if let Some(server) = &server {
                    request.server_name = server.clone();
                }
                println!("{}", registry.import_schema(&class, &request)?);
            }
        }

        CliCommand::List => {
            let registry = AdapterRegistry::with_builtins();
            println!("Adapter classes:");
            for class in registry.classes() {
                println!("  {}", class);
            }

            if let Some(config) = config {
                println!("Tables on server '{}':", config.server.name);
                for table in &config.tables {
                    println!(
                        "  {} ({})",
                        table.name,
                        table.options.get("wrapper_class").unwrap_or("?")
                    );
                }
            }
        }
    }

    Ok(())
}

fn load_config(path: &str) -> anyhow::Result<Option<FdwConfig>> {
    if !Path::new(path).exists() {
        tracing::debug!("No configuration file at {}", path);
        return Ok(None);
    }

    let config = FdwConfig::from_file(path)
        .with_context(|| format!("Failed to load config file '{}'", path))?;
    config.validate()?;
    tracing::info!(
        "📁 Loaded {} table(s) for server '{}' from {}",
        config.tables.len(),
        config.server.name,
        path
    );
    Ok(Some(config))
}

fn run_scan(table: &TableConfig, no_header: bool, keep_going: bool) -> anyhow::Result<ScanSummary> {
    let registry = AdapterRegistry::with_builtins();
    let mut scan = ForeignScan::begin(&registry, &table.foreign_table_options()?)?;

    let stdout = std::io::stdout();
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(stdout.lock());

    if !no_header && !scan.columns().is_empty() {
        writer.write_record(scan.columns().iter().map(|c| c.name.as_str()))?;
    }

    let mut consecutive_failures = 0;
    loop {
        match scan.next_row() {
            Ok(Some(row)) => {
                consecutive_failures = 0;
                writer.write_record(row.cells())?;
            }
            Ok(None) => break,
            Err(e) if keep_going && e.error.is_source() => {
                consecutive_failures += 1;
                tracing::warn!("⚠️ {}", e);
                if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                    bail!(
                        "giving up on '{}' after {} consecutive failed pulls",
                        table.name,
                        consecutive_failures
                    );
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    writer.flush()?;
    Ok(scan.finish()?)
}
