use clap::Parser;
use indicatif::ProgressDrawTarget;
use midibridge::{
    cli::{validate_interval, Args},
    create_bridge, handle_device_list, logging,
    monitor::Monitor,
    Settings,
};
use std::error::Error;
use std::io;
use std::time::Duration;

fn main() {
    let args = parse_command_line_arguments();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn parse_command_line_arguments() -> Args {
    Args::parse()
}

fn load_settings(args: &Args) -> Result<Settings, Box<dyn Error>> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(interval_ms) = args.interval_ms {
        settings.poll_interval_ms = validate_interval(interval_ms)?;
    }
    Ok(settings)
}

fn initialize_logging(settings: &Settings, verbose: bool) -> Result<(), Box<dyn Error>> {
    let log_path = logging::init_logger(settings, verbose)?;
    log::info!("Application starting, logging to {}", log_path.display());
    Ok(())
}

fn list_available_devices(devices: &[String]) {
    println!("Available MIDI inputs:");
    for device in devices {
        println!("  - {}", device);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let settings = load_settings(&args)?;
    initialize_logging(&settings, args.verbose)?;

    if args.list {
        list_available_devices(&handle_device_list(&settings)?);
        return Ok(());
    }

    let mut bridge = create_bridge(&settings)?;
    let mut monitor = Monitor::new(ProgressDrawTarget::stderr());
    let interval = Duration::from_millis(settings.poll_interval_ms);

    println!("Listening for MIDI input. Press Ctrl+C to exit...");
    monitor.run(&mut bridge, interval, args.ticks, &mut io::stdout())?;
    bridge.shutdown();
    log::info!("Monitor stopped after {} events", monitor.events_seen());
    Ok(())
}
