//! Backend connectivity check.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the check command.
///
/// Prints whether the configured backend answers; unreachable backends are
/// reported, not treated as an error.
pub async fn execute_check(config: &Config, formatter: &Formatter) -> Result<bool> {
    let provider = config.provider.build(config.extractor.timeout())?;
    let target = format!(
        "{} model '{}' at {}",
        config.provider.kind,
        config.provider.model(),
        config.provider.endpoint()
    );

    let available = provider.is_available().await;
    if available {
        println!("{}", formatter.success(&format!("Reachable: {}", target)));
    } else {
        println!("{}", formatter.error(&format!("Unreachable: {}", target)));
    }
    Ok(available)
}
