mod cli;
mod repl;

use cliploop::{
    backend::HttpBackend,
    config::{self, Config},
    playback::{
        AdvanceOutcome, ControllerHandle, ControllerOptions, LogSurface, PlaybackController,
    },
    session::PlaybackSession,
    sync::{annotate_upcoming, CacheStatusSync},
};
use cliploop_common::{NodeType, TreeNode};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use repl::ReplCommand;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "cliploop=debug,cliploop_common=debug".to_string()
        } else {
            "cliploop=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Play {
            folder,
            file,
            duration,
            backend,
        } => {
            let mut config = load(cli.config.as_deref(), backend)?;
            if duration.is_some() {
                config.playback.preferred_duration_secs = duration;
            }
            config::validate_config(&config)?;

            // One thread: the controller is a single-writer aggregate anyway.
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(play(config, folder, file))
        }
        Commands::Tree { json, backend } => {
            let config = load(cli.config.as_deref(), backend)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(print_tree(&config, json))
        }
        Commands::Status { json, backend } => {
            let config = load(cli.config.as_deref(), backend)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(print_status(&config, json))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("cliploop {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Load config and apply the `--backend` override.
fn load(config_path: Option<&Path>, backend: Option<String>) -> Result<Config> {
    let mut config = config::load_config_or_default(config_path)?;
    if let Some(url) = backend {
        config.backend.url = url;
        config::validate_config(&config)?;
    }
    Ok(config)
}

async fn play(config: Config, folder: Option<String>, file: Option<String>) -> Result<()> {
    let backend = HttpBackend::new(&config.backend);
    tracing::info!("Playing from {}", backend.base_url());

    let sync = config.status.enabled.then(|| {
        CacheStatusSync::new(Arc::new(backend.clone()), config.status.poll_interval())
    });
    let session = PlaybackSession::begin(backend.clone(), sync);

    let controller = PlaybackController::new(
        Arc::new(backend),
        LogSurface::new(),
        ControllerOptions::from(&config.playback),
    );
    let (handle, task) = controller.spawn();

    let first = match (folder, file) {
        (Some(path), _) => handle.enter_folder(path).await?,
        (None, Some(path)) => handle.enter_file(path).await?,
        (None, None) => handle.advance().await?,
    };
    report(&first);
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<ReplCommand>() {
            Ok(ReplCommand::Quit) => break,
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        if let Err(e) = run_command(&handle, &session, command).await {
            println!("{}", e);
        }
    }

    handle.shutdown().await;
    let _ = task.await;
    session.end().await;
    Ok(())
}

async fn run_command(
    handle: &ControllerHandle,
    session: &PlaybackSession,
    command: ReplCommand,
) -> Result<()> {
    match command {
        ReplCommand::Next => report(&handle.advance().await?),
        ReplCommand::Back => match handle.step_back().await? {
            Some(clip) => println!("back to {}", clip),
            None => println!("already at the first clip"),
        },
        ReplCommand::Hold => println!("holding {}", handle.hold_current().await?),
        ReplCommand::Release => report(&handle.release().await?),
        ReplCommand::Whole => println!("playing whole file {}", handle.play_whole_file().await?.file),
        ReplCommand::Pause => handle.pause().await?,
        ReplCommand::Resume => handle.resume().await?,
        ReplCommand::Folder(path) => report(&handle.enter_folder(path).await?),
        ReplCommand::File(path) => report(&handle.enter_file(path).await?),
        ReplCommand::Root => report(&handle.reset_to_root().await?),
        ReplCommand::Duration(duration) => {
            handle.set_preferred_duration(duration).await?;
            match duration {
                Some(secs) => println!("clips will be {}s long", secs),
                None => println!("clip length left to the backend"),
            }
        }
        ReplCommand::Queue => {
            let snapshot = handle.snapshot().await?;
            let status = session.status();
            let upcoming = annotate_upcoming(snapshot.queue.iter(), status.as_ref());
            if upcoming.is_empty() {
                println!("queue is empty");
            }
            for (i, entry) in upcoming.iter().enumerate() {
                let marker = if entry.caching {
                    " [caching]"
                } else if entry.known {
                    " [cached]"
                } else {
                    ""
                };
                println!("  {}. {}{}", i + 1, entry.clip, marker);
            }
        }
        ReplCommand::History => {
            let snapshot = handle.snapshot().await?;
            for (i, clip) in snapshot.history.iter().enumerate() {
                let cursor = if Some(i) == snapshot.history_index { ">" } else { " " };
                println!("{} {}. {}", cursor, i + 1, clip);
            }
        }
        ReplCommand::Status => {
            let snapshot = handle.snapshot().await?;
            println!("scope: {}  mode: {}", snapshot.scope, snapshot.mode);
            if let Some(clip) = &snapshot.current {
                println!("current: {}", clip);
            }
            if let Some(secs) = snapshot.next_advance_secs {
                println!("next clip in {:.1}s", secs);
            }
            if let Some(reason) = &snapshot.status {
                println!("last error: {}", reason);
            }
            match session.status() {
                Some(cache) => println!(
                    "cache: {}/{} ({:.0}%){}",
                    cache.cached,
                    cache.total,
                    cache.progress() * 100.0,
                    cache
                        .caching
                        .as_deref()
                        .map(|f| format!(", caching {}", f))
                        .unwrap_or_default()
                ),
                None => println!("cache: unknown"),
            }
        }
        ReplCommand::Help => println!("{}", repl::HELP),
        ReplCommand::Quit => {}
    }
    Ok(())
}

fn report(outcome: &AdvanceOutcome) {
    match outcome {
        AdvanceOutcome::Presented(clip) => println!("now playing {}", clip),
        AdvanceOutcome::Replayed(clip) => println!("replaying {}", clip),
        AdvanceOutcome::Unavailable(e) => println!("{}", e),
        AdvanceOutcome::Ignored => println!("playing whole file; use 'release' to resume clips"),
    }
}

async fn print_tree(config: &Config, json: bool) -> Result<()> {
    let backend = HttpBackend::new(&config.backend);
    let tree = backend.tree().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    fn print_node(node: &TreeNode, depth: usize) {
        let indent = "  ".repeat(depth);
        if node.node_type == NodeType::File {
            println!("{}{}", indent, node.name);
        } else {
            println!("{}{}/ ({} files)", indent, node.name, node.file_count());
        }
        for child in &node.children {
            print_node(child, depth + 1);
        }
    }

    for node in &tree {
        print_node(node, 0);
    }
    Ok(())
}

async fn print_status(config: &Config, json: bool) -> Result<()> {
    let backend = HttpBackend::new(&config.backend);
    let status = backend.cache_status().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("Cached: {}/{} ({:.0}%)", status.cached, status.total, status.progress() * 100.0);
        if let Some(ref file) = status.caching {
            println!("Caching: {}", file);
        }
        println!("Known videos: {}", status.videos.len());
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_config(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            print_config(&Config::default());
        }
    }

    Ok(())
}

fn print_config(config: &Config) {
    println!("  Backend: {}", config.backend.url);
    println!("  Queue capacity: {}", config.playback.queue_capacity);
    match config.playback.preferred_duration_secs {
        Some(secs) => println!("  Clip length: {}s", secs),
        None => println!("  Clip length: chosen by backend"),
    }
    println!(
        "  Status polling: {}",
        if config.status.enabled {
            format!("every {}ms", config.status.poll_interval_ms)
        } else {
            "disabled".to_string()
        }
    );
}
