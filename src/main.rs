use log::{error, info};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("XR demo starting...");

    if let Err(e) = xr_demo::app::run() {
        error!("Event loop failed: {}", e);
        std::process::exit(1);
    }
}
