use clap::Parser;
use st_core::cli::{run, Cli};
use st_core::logging::init_logging;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);
    let code = run(&cli);
    std::process::exit(code.as_i32());
}
