//! Structured logging setup. Independent of `-v`, which only controls
//! response rendering, not diagnostic verbosity.

pub fn init(level: log::Level) -> anyhow::Result<()> {
    simple_logger::init_with_level(level)?;
    Ok(())
}
