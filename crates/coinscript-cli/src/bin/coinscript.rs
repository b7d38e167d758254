fn main() -> coinscript_cli::Result<()> {
    coinscript_cli::run()
}
