use std::thread;

use anyhow::{Context, Result};
use folder_monitor::tracking::{EventRecord, Severity};
use folder_monitor::{Config, FolderWatcher, StopReason, TrackingHandler, WatchOptions};
use tracing::{debug, error, info, warn};

use crate::cli::WatchTarget;

/// Watch every target on its own thread until Ctrl+C or until all stop
///
/// Returns the process exit code: 1 if any watcher failed to start.
pub fn cmd_watch(targets: Vec<WatchTarget>, config: &Config) -> Result<i32> {
    let json = config.output.json;
    let mut stoppers = Vec::new();
    let mut threads = Vec::new();
    let mut failed = false;

    for target in targets {
        let options = WatchOptions {
            recursive: target.recursive,
            verbose: target.verbose,
            extensions: config.watch.property_extensions.clone(),
        };
        let handler = TrackingHandler::new(move |record: EventRecord| emit(&record, json));

        let mut watcher = match FolderWatcher::new(&target.path, options, handler) {
            Ok(watcher) => watcher,
            Err(e) => {
                error!("Unable to watch: {}: {e}", target.path.display());
                failed = true;
                continue;
            }
        };
        stoppers.push(watcher.stopper());

        let name = format!("watch:{}", target.path.display());
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || {
                let count = watcher.load()?;
                info!(
                    "Start watching: {}, path.count={count}",
                    watcher.root().display()
                );
                Ok::<_, folder_monitor::WatchError>(watcher.run())
            })
            .context("Failed to spawn watcher thread")?;
        threads.push((target.path, handle));
    }

    ctrlc::set_handler(move || {
        for stopper in &stoppers {
            stopper.stop();
        }
    })
    .context("Error setting Ctrl+C handler")?;

    for (path, handle) in threads {
        match handle.join() {
            Ok(Ok(StopReason::Failed(message))) => {
                warn!("Watcher for {} failed: {message}", path.display())
            }
            Ok(Ok(reason)) => debug!("Watcher for {} ended: {reason:?}", path.display()),
            Ok(Err(e)) => {
                error!("Unable to watch: {}: {e}", path.display());
                failed = true;
            }
            Err(_) => {
                error!("Watcher thread for {} panicked", path.display());
                failed = true;
            }
        }
    }

    Ok(i32::from(failed))
}

fn emit(record: &EventRecord, json: bool) {
    if json {
        println!("{}", record.to_json());
        return;
    }

    match record.severity {
        Severity::Info => info!(target: "folder_monitor::events", "{}: {}", record.name, record.message),
        Severity::Warning => warn!(target: "folder_monitor::events", "{}: {}", record.name, record.message),
    }
    for (name, properties) in &record.snapshots {
        for (key, value) in properties {
            info!(target: "folder_monitor::events", "  {name}: {key}={value}");
        }
    }
}
