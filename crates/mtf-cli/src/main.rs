use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = mtf_cli::Cli::parse();
    let _guard = mtf_cli::app_init().await?;
    mtf_cli::run(cli).await
}
