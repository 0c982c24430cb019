fn main() {
    if let Err(err) = csv_melter::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
