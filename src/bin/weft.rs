// Weft command-line entry point.
// Usage: weft <parse|eval|scan|rules|list-builtins> [args]

fn main() {
    weft::cli::run();
}
