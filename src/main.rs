fn main() {
    let mut args = std::env::args().skip(1);
    let event = args.next().unwrap_or_else(|| "data".to_string());
    let context = args.next().unwrap_or_else(|| "context".to_string());

    if let Err(err) = parkings_mel::app::run(&event, &context) {
        eprintln!("invocation failed: {err}");
        std::process::exit(1);
    }
}
