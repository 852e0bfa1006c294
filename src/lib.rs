pub mod app;
pub mod renderer;
pub mod scene;
pub mod settings;

use app::App;
use settings::RenderSettings;
use winit::event_loop::EventLoop;

pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

pub fn run() -> Result<(), winit::error::EventLoopError> {
    init_logging();

    log::info!("Starting instanced cube renderer");

    let settings = RenderSettings::load();
    let event_loop = EventLoop::new()?;
    let mut app = App::new(settings);

    let result = event_loop.run_app(&mut app);

    if let Err(ref err) = result {
        log::error!("Application error: {}", err);
    }

    log::info!("Application shutdown complete");

    result
}
