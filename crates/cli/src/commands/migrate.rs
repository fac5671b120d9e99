//! Applies the Postgres schema. Connecting runs every idempotent migration,
//! so this is safe to repeat.

use pmos_storage::StorageBackend;

pub(crate) async fn run(database_url: &str) -> anyhow::Result<()> {
    let storage = StorageBackend::new_postgres(database_url).await?;
    println!("Schema up to date ({} backend)", storage.backend_name());
    Ok(())
}
