//! `apisurf` binary.

fn main() {
    apisurf_cli::init_tracing();
    std::process::exit(apisurf_cli::run_cli(std::env::args().collect()));
}
