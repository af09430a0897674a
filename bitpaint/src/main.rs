#![warn(clippy::pedantic)]

pub mod export;
pub mod global;
pub mod storage;

use anyhow::Result as AnyResult;
use bitpaint_core::commands::{PNG_EXTENSION, PNG_TYPE};
use bitpaint_core::queue::History;
use bitpaint_core::state::editor::EditorConfig;

/// Replay the document at `path` and export it as a PNG beside it, returning the PNG's path.
fn export_document(
    path: &std::path::Path,
    config: &EditorConfig,
) -> AnyResult<std::path::PathBuf> {
    let storage = storage::FsStorage::new(path);
    let target = storage.sibling(PNG_EXTENSION);
    let mut history = History::new(storage, export::PngEncoder).with_editor_config(config.clone());
    history.open()?;
    history.handle_changes()?;
    log::debug!(
        "Replayed {} changes of {path:?}",
        history.applied().len()
    );
    history.export(PNG_TYPE, PNG_EXTENSION)?;
    Ok(target)
}

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    let config = global::config::GlobalConfig::get();
    if config.did_fail_to_load() {
        // Leave a documented default file for the user to edit.
        if let Err(e) = config.save() {
            log::warn!("Failed to save settings:\n{e:?}");
        }
    }

    let export_succeeded = {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
        // Args are a simple list of documents to export.
        // Paths are OSStrings, let the system handle character encoding restrictions.
        let paths: Vec<std::path::PathBuf> = std::env::args_os().skip(1).map(Into::into).collect();
        // Did we have at least one success? No paths is a success.
        let had_success: std::sync::atomic::AtomicBool = paths.is_empty().into();
        paths.into_par_iter().for_each(|path| {
            match export_document(&path, config.editor()) {
                Err(e) => {
                    log::error!("failed to export file {path:?}: {e:#}");
                }
                Ok(target) => {
                    log::info!("exported {path:?} to {target:?}");
                    // We don't care when it's stored, so long as it gets there eventually.
                    had_success.store(true, std::sync::atomic::Ordering::Relaxed);
                }
            }
        });

        had_success.into_inner()
    };
    // False if every file failed.
    if !export_succeeded {
        anyhow::bail!("Failed to export any provided document.");
    }
    Ok(())
}
