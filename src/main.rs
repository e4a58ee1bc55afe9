use anyhow::Result;

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    ghsearch::cli::run().await
}
