use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    gridterm::cli::run_cli().await
}
