fn main() -> anyhow::Result<()> {
    cinder::cli::run::<String>(None)
}
