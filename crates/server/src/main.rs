#[tokio::main]
async fn main() -> anyhow::Result<()> {
    voxtutor_server::start().await
}
