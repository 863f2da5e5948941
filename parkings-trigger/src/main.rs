fn main() {
    if let Err(err) = parkings_mel::app::run_trigger() {
        eprintln!("trigger startup failed: {err}");
        std::process::exit(1);
    }
}
