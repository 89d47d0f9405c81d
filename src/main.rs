fn main() -> anyhow::Result<()> {
    abtool::tracing::init();
    abtool::app::run()
}
