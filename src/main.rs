use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    jwt_experience::app::run().await
}
