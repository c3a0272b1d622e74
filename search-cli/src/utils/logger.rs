/// Log records go to stderr, keeping stdout for the compiled query.
pub fn init_logger(verbose: bool) {
    if std::env::var("RUST_LOG").is_err() {
        let filter = if verbose {
            "sq=debug,search_cli=debug,search_query=debug"
        } else {
            "info"
        };
        std::env::set_var("RUST_LOG", filter);
    }
    pretty_env_logger::init();
}
