mod app;
mod config;
mod library;
mod mpris;
mod player;
mod runtime;
mod store;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
