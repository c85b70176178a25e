#[tokio::main]
async fn main() -> anyhow::Result<()> {
    arcade_lender_lib::run().await
}
