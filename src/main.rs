use std::io;

use plum_search::uci::uci_top::run_stdio_loop;

fn main() -> io::Result<()> {
    // stdout carries the protocol; everything else goes to stderr.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .write_style(env_logger::WriteStyle::Never)
        .init();

    log::info!("plum_search {} starting", env!("CARGO_PKG_VERSION"));
    run_stdio_loop()
}
