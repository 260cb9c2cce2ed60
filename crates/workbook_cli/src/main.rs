//! CLI smoke entry point.
//!
//! # Responsibility
//! - Exercise one create/read cycle against a real store.
//! - Print projections as JSON for quick local sanity checks.
//!
//! Usage: `workbook_cli [config.json] [db-path]`. Without a db path the store
//! is in-memory.

use log::info;
use std::process::ExitCode;
use workbook_core::{
    core_version, init_logging, CoreConfig, CreateCollectionArgs, CreateWorkbookArgs,
    LoadOptions, MutationCoordinator, NoopAccessService, ParentScope, ReadLayer,
    RequestContext, Storage,
};

const SMOKE_TENANT: &str = "smoke-tenant";
const SMOKE_USER: &str = "smoke-user";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("workbook_cli error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => CoreConfig::from_file(path).map_err(|err| err.to_string())?,
        None => CoreConfig::default(),
    };
    if config.logging.dir.is_some() {
        init_logging(&config.logging)?;
    }

    let storage = match args.next() {
        Some(path) => Storage::open(path, &config.storage),
        None => Storage::open_in_memory(&config.storage),
    }
    .map_err(|err| err.to_string())?;

    println!("workbook_core version={}", core_version());
    info!("event=cli_smoke module=cli status=start");

    let ctx = RequestContext::new(SMOKE_TENANT, SMOKE_USER).with_features(config.features);
    let coordinator = MutationCoordinator::new(&storage, NoopAccessService);
    let collection = coordinator
        .create_collection(&ctx, CreateCollectionArgs::new(None, "Smoke"))
        .map_err(|err| format!("{}: {err}", err.code()))?
        .entity;
    let workbook = coordinator
        .create_workbook(
            &ctx,
            CreateWorkbookArgs::new(Some(collection.collection_id), "Smoke workbook"),
        )
        .map_err(|err| format!("{}: {err}", err.code()))?
        .entity;

    let reads = ReadLayer::new(&storage);
    let loaded = reads
        .load_workbook(&ctx, workbook.workbook_id, LoadOptions::with_entries())
        .map_err(|err| format!("{}: {err}", err.code()))?;
    let content = reads
        .list_collection_content(&ctx, ParentScope::Collection(collection.collection_id))
        .map_err(|err| format!("{}: {err}", err.code()))?;

    let output = serde_json::json!({
        "workbook": loaded,
        "collectionContent": content,
    });
    let rendered = serde_json::to_string_pretty(&output).map_err(|err| err.to_string())?;
    println!("{rendered}");
    info!("event=cli_smoke module=cli status=ok");
    Ok(())
}
