#[tokio::main]
async fn main() -> anyhow::Result<()> {
    kycocr_server::start().await
}
