fn main() {
    #[cfg(feature = "cli")]
    rolldelta::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("rolldelta: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
