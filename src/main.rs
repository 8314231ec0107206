fn main() {
    if let Err(err) = elk_svg::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
