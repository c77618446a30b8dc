use bambam_pattern::app::PatternApp;
use clap::Parser;

fn main() {
    env_logger::init();
    let args = PatternApp::parse();
    if let Err(e) = args.op.run() {
        log::error!("{e}");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}
