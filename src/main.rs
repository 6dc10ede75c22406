//! # Voxel Streaming Entry Point
//!
//! Runs the headless streaming demo.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- [config.json]
//! ```

fn main() {
    if let Err(err) = voxel_streaming::run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
