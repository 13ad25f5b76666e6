use std::path::Path;

use log::LevelFilter;
use sdl2::messagebox::{
    ButtonData, ClickedButton, MessageBoxButtonFlag, MessageBoxColorScheme, MessageBoxFlag,
    show_message_box, show_simple_message_box,
};

use orbitcube::{
    assets::{self, Assets},
    config::Config,
    error::StartupError,
    viewer::Viewer,
};

const LOG_FILE_NAME: &str = "orbitcube.log";

fn main() {
    let exe_dir = assets::exe_dir();

    let config = Config::load(&exe_dir);
    let level = config
        .as_ref()
        .map(Config::log_level_filter)
        .unwrap_or(LevelFilter::Info);
    if let Err(e) = setup_logger(level, &exe_dir.join(LOG_FILE_NAME)) {
        eprintln!("could not set up logging: {e}");
    }

    let result = config
        .map_err(StartupError::from)
        .and_then(|config| run(&config, &exe_dir));

    if let Err(e) = result {
        log::error!("{e}");
        if let Err(e) = show_simple_message_box(
            MessageBoxFlag::ERROR,
            "Error",
            &e.to_string(),
            None::<&sdl2::video::Window>,
        ) {
            log::error!("could not show error dialog: {e}");
        }
        std::process::exit(1);
    }
}

fn run(config: &Config, exe_dir: &Path) -> Result<(), StartupError> {
    let fullscreen = config.fullscreen.unwrap_or_else(ask_fullscreen);

    let assets = Assets::locate(exe_dir);
    log::info!("loading assets from {:?}", assets.root());

    let mut viewer = Viewer::new(&config.window_config(fullscreen), &assets)?;
    viewer.show(false);
    viewer.run();
    Ok(())
}

fn ask_fullscreen() -> bool {
    let buttons = [
        ButtonData {
            flags: MessageBoxButtonFlag::RETURNKEY_DEFAULT,
            button_id: 1,
            text: "Yes",
        },
        ButtonData {
            flags: MessageBoxButtonFlag::ESCAPEKEY_DEFAULT,
            button_id: 0,
            text: "No",
        },
    ];

    match show_message_box(
        MessageBoxFlag::INFORMATION,
        &buttons,
        "Question",
        "Would you like to run in fullscreen mode?",
        None::<&sdl2::video::Window>,
        None::<MessageBoxColorScheme>,
    ) {
        Ok(ClickedButton::CustomButton(button)) => button.button_id == 1,
        Ok(ClickedButton::CloseButton) => false,
        Err(e) => {
            log::warn!("could not ask for fullscreen, running windowed: {e}");
            false
        }
    }
}

fn setup_logger(level: LevelFilter, log_path: &Path) -> Result<(), fern::InitError> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout());

    match fern::log_file(log_path) {
        Ok(file) => dispatch = dispatch.chain(file),
        Err(e) => eprintln!("not logging to {}: {e}", log_path.display()),
    }

    dispatch.apply()?;
    Ok(())
}
