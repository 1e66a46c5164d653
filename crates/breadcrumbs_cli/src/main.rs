//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `breadcrumbs_core` linkage.
//! - With a workspace path argument, refresh that workspace's index and print
//!   a deterministic summary.

use breadcrumbs_core::NotebookIndexManager;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    println!(
        "breadcrumbs_core version={}",
        breadcrumbs_core::core_version()
    );

    let Some(workspace) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let mut manager = NotebookIndexManager::for_workspace(workspace);
    match manager.refresh(false).await {
        Ok(index) => {
            println!(
                "notes={} chains={} checksum={}",
                index.notes.len(),
                index.chains.len(),
                index.checksum
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("index refresh failed: {err}");
            ExitCode::FAILURE
        }
    }
}
