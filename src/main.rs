use anyhow::Result;
use wayfarer::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
