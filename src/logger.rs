use simplelog::{ConfigBuilder, LevelFilter, SimpleLogger};

/// HTTP stack crates that are only interesting when debugging the transport.
const QUIET_TARGETS: [&str; 3] = ["hyper", "h2", "reqwest"];

fn level_for(verbose: bool) -> LevelFilter {
    if verbose { LevelFilter::Info } else { LevelFilter::Warn }
}

/// Install the process-wide logger. Later calls are ignored.
pub fn init(verbose: bool) {
    let mut config = ConfigBuilder::new();
    for target in QUIET_TARGETS {
        config.add_filter_ignore_str(target);
    }
    let _ = SimpleLogger::init(level_for(verbose), config.build());
}
