//! One-shot extraction of a text file.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use literate_domain::{now_millis, reconcile, ExtractionClient, ObjectCollection};
use literate_extractor::Extractor;
use tracing::info;

/// Execute the extract command.
pub async fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let text = std::fs::read_to_string(&args.file)?;
    if text.trim().is_empty() {
        return Err(CliError::InvalidInput(format!(
            "{} contains no text",
            args.file.display()
        )));
    }

    let provider = config.provider.build(config.extractor.timeout())?;
    let extractor = Extractor::new(provider, config.extractor.clone());

    info!(file = %args.file.display(), len = text.len(), "Extracting from file");
    let objects = extract_text(&extractor, &text).await?;

    println!("{}", formatter.format_objects(&objects)?);
    Ok(())
}

/// Run one extraction and merge it into an empty collection.
pub async fn extract_text<C>(client: &C, text: &str) -> Result<ObjectCollection>
where
    C: ExtractionClient + ?Sized,
{
    let result = client.extract(text).await?;
    Ok(reconcile(&ObjectCollection::new(), &result, now_millis()).collection)
}
