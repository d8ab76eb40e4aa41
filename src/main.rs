fn main() {
    if let Err(err) = registry_profiler::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
