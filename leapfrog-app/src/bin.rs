//! # Leapfrog Wave Application (Binary)
//!
//! Main executable entry point.

fn main() -> anyhow::Result<()> {
    leapfrog_app::main()
}
