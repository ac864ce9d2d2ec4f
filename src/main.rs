use anyhow::Result;

fn main() -> Result<()> {
    larder::cli::run()
}
