fn main() {
    #[cfg(feature = "cli")]
    deltaseal::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("deltaseal: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
