use anyhow::Result;

fn main() -> Result<()> {
    loom_config::cli::run()
}
