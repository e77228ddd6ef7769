//! Tracker VMAC provisioning tool
//!
//! Finds the tracker's USB serial port, walks the operator through MAC
//! configuration mode and writes the `AAAAAAAA` + 4-hex-digit VMAC.

mod settings;
mod terminal;

use std::process::ExitCode;

use settings::Settings;
use terminal::TerminalConsole;
use tracing::{info, warn};
use vmac_detect::PortLocator;
use vmac_session::{Console, InterruptFlag, Provisioner, SerialConnector, SessionError};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "set_vmac=warn,vmac_session=warn,vmac_detect=warn,vmac_protocol=warn,vmac_sim=warn"
                    .into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load();

    let interrupt = InterruptFlag::new();
    let handler_flag = interrupt.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.trigger()) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }

    let mut console = TerminalConsole::new(interrupt.clone());
    console.plain("=======================================");
    console.plain(" Tracker VMAC provisioning");
    console.plain("=======================================");

    let locator = PortLocator::new();
    info!("Host class {:?}", locator.host());
    let mut connector = SerialConnector::new(locator)
        .with_pinned_port(settings.port)
        .with_simulator(settings.simulator);

    let mut provisioner = Provisioner::new(console, settings.timing, interrupt);
    let outcome = provisioner.run(&mut connector);
    let mut console = provisioner.into_console();

    match outcome {
        Ok(report) => {
            console.success(&format!("VMAC {} written on {}", report.vmac, report.port));
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_failure(&mut console, &e);
            // exit_code() is always 1
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn report_failure(console: &mut impl Console, error: &SessionError) {
    match error {
        SessionError::UserInterrupted => {
            console.plain("");
            console.warning("Interrupted by the operator.");
        }
        SessionError::UserCancelled => console.plain("Provisioning cancelled."),
        SessionError::DependencyMissing(_) => {
            console.plain("  Check that the USB serial driver is installed.");
        }
        // Already reported by the sequencer with the port list
        SessionError::PortNotFound { .. } | SessionError::Connect { .. } => {}
        SessionError::Unexpected(reason) => {
            console.error(&format!("Unexpected error: {reason}"));
        }
    }
}
