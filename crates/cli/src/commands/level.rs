use pmos_core::level_progress;

pub(crate) fn run(xp: i64) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&level_progress(xp))?);
    Ok(())
}
