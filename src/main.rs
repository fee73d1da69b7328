fn main() {
    if let Err(err) = price_catalog::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
