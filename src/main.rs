mod app;
mod audio;
mod config;
mod error;
mod logging;
mod mpris;
mod playlist;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
