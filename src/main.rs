fn main() {
    if let Err(err) = sruja_quality::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
