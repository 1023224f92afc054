#[tokio::main]
async fn main() -> anyhow::Result<()> {
    relation_card::run_server().await
}
