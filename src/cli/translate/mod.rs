//! Translate command - one-shot translation through the configured cache and upstream

use clap::Args;
use tracing::warn;

use crate::api::types::TranslateResponse;

#[derive(Args, Debug)]
pub struct TranslateArgs {
    /// Page URL used to select prompt rules
    #[arg(long, default_value = "")]
    pub url: String,

    /// Segments to translate, in order
    #[arg(required = true)]
    pub segments: Vec<String>,
}

/// Translate the given segments and print `{"translations": [...]}` to stdout
pub async fn run(args: TranslateArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;
    super::init_logging(&config);

    let service = crate::create_translation_service(&config).await?;
    let result = service.translate(args.segments, &args.url).await;

    if let Err(e) = service.cache().close().await {
        warn!(error = %e, "Failed to close cache");
    }

    let response = TranslateResponse {
        translations: result?,
    };
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
