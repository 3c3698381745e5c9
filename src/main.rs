fn main() {
    if let Err(err) = connection_router::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
