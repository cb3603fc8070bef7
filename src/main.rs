//! kodegen_bundler_playstore - publish an APK or AAB to a Google Play track.
//!
//! One invocation opens an edit, uploads the binary, assigns it to the track
//! and commits. The edit is deleted if any step after its creation fails.

use kodegen_bundler_playstore::cli;
use kodegen_bundler_playstore::cli::OutputManager;
use kodegen_bundler_playstore::error::FAILURE_EXIT_CODE;
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            let output = OutputManager::new();
            output.error(&format!("Fatal error: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                let _ = output.eprintln("\nRecovery suggestions:");
                for suggestion in suggestions {
                    let _ = output.eprintln(&format!("    {suggestion}"));
                }
            }

            process::exit(FAILURE_EXIT_CODE);
        }
    }
}
