//! Command execution.
//!
//! There is a single command: publish one binary to one track.

mod publish;

pub use publish::execute_publish;

use crate::cli::{Args, RuntimeConfig};
use crate::config::PublishConfig;
use crate::error::Result;

/// Execute the publish command for parsed arguments, returning the exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    let config = RuntimeConfig::new();

    let result = match PublishConfig::resolve(&args) {
        Ok(publish_config) => execute_publish(&publish_config, &config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => {
            log::info!(
                "Published version {} to {} (edit {})",
                outcome.version_code,
                outcome.track,
                outcome.edit_id
            );
            Ok(0)
        }
        Err(e) => {
            config.error_println(&format!("ERROR: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                config.hint("Recovery suggestions:");
                for suggestion in suggestions {
                    config.hint(&suggestion);
                }
            }

            Ok(e.exit_code())
        }
    }
}
