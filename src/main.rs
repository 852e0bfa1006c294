fn main() {
    if let Err(err) = instanced_cubes::run() {
        eprintln!("Application error: {err}");
    }
}
