#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = code_coach::run().await {
        eprintln!("code-coach fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
