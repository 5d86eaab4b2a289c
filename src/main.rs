use clap::Parser;
use kurl::cli::{self, Cli};
use kurl::config::Config;
use kurl::io::render;
use kurl::orchestrator;

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    if let Err(e) = kurl::logger::init(config.log_level()) {
        eprintln!("kurl: could not initialize logging: {e}");
    }

    let options = match cli::into_options(cli, &config) {
        Ok(options) => options,
        Err(e) => fail(&e),
    };

    let verbose = options.verbose;

    match orchestrator::run(&options) {
        Ok((response, raw_text)) => {
            print!("{}", render(&response, &raw_text, verbose));
        }
        Err(e) => fail(&e),
    }
}

fn fail(e: &dyn std::fmt::Display) -> ! {
    eprintln!("kurl: {e}");
    std::process::exit(1);
}
