use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

/// Initializes the console logger at the given level. A repeated
/// initialization is ignored, so tests and examples may call this freely.
pub fn init_console_logging(level: LevelFilter) {
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
}

/// Debug-level initialization, shows the intermediate matrices and vectors
/// of the balancing pipeline.
pub fn init_debug_logging() {
    init_console_logging(LevelFilter::Debug);
}
