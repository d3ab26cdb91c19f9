use std::process;

mod headless;
mod logging;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let parsed = match headless::parse_args(&args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    };

    logging::setup_tracing(parsed.log_level);
    tracing::info!("Edgeweave starting");

    if let Err(err) = headless::run(&parsed) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}
