fn main() {
    if let Err(err) = alluvial_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
