use std::io;
use std::process::ExitCode;

use clap::Parser;
use sift::{CliConfig, batch, run};
use sift_jsonpath::JsonPathServices;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> ExitCode {
    let config = CliConfig::parse();
    env_logger::Builder::new()
        .filter_level(config.log_filter())
        .parse_default_env()
        .init();
    batch::configure_thread_pool(config.threads);

    let services = JsonPathServices::new();
    let stdout = io::stdout();
    let mut output = stdout.lock();
    let result = config
        .open_input()
        .and_then(|input| run(&config, &services, input, &mut output));
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("sift: {e}");
            ExitCode::from(2)
        }
    }
}
