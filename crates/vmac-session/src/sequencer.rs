//! Provisioning sequencer
//!
//! Drives one run from port discovery to link closure. The steps are
//! strictly linear; any failure, cancellation or interrupt ends the run,
//! and the link is closed exactly once whenever it was opened.

use vmac_detect::DiscoveredPort;
use vmac_protocol::{AtCommand, SuffixError, VmacAddress};

use tracing::{info, warn};

use crate::collector::ResponseCollector;
use crate::connector::Connector;
use crate::console::Console;
use crate::dispatch::{CommandDispatcher, CommandResult};
use crate::error::SessionError;
use crate::interrupt::InterruptFlag;
use crate::link::{DeviceLink, OpenLink};
use crate::timing::SessionTiming;
use crate::transport::LinkSettings;

/// Number of bare CRLF probes sent while diagnosing
const PROBE_COUNT: usize = 3;

/// Log markers showing the firmware's internal subsystems are running
const INTERNAL_LOG_MARKERS: [&str; 3] = ["LED", "Button", "Mode"];

/// Steps of a provisioning run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Locate,
    Connect,
    Diagnose,
    AcquireTarget,
    AwaitModeEntry,
    ReadBefore,
    Set,
    ReadAfter,
    FullDump,
    Reboot,
    Finalize,
}

impl Step {
    /// 1-based step number shown to the operator
    pub fn number(&self) -> u8 {
        *self as u8 + 1
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::Locate => "USB serial port discovery",
            Step::Connect => "Serial port connection",
            Step::Diagnose => "Connection diagnosis",
            Step::AcquireTarget => "VMAC preparation",
            Step::AwaitModeEntry => "MAC configuration mode",
            Step::ReadBefore => "Current VMAC (before)",
            Step::Set => "Set VMAC",
            Step::ReadAfter => "Verify VMAC (after)",
            Step::FullDump => "Full configuration",
            Step::Reboot => "Reboot",
            Step::Finalize => "Done",
        }
    }
}

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Port the tracker was reached on
    pub port: String,
    /// VMAC written
    pub vmac: VmacAddress,
    /// Every command exchange, in order
    pub exchanges: Vec<CommandResult>,
    /// Read-back comparison: `None` if the device echoed no VMAC value
    pub verified: Option<bool>,
    /// Whether a reboot was issued
    pub rebooted: bool,
}

/// Runs the provisioning sequence against one device
pub struct Provisioner<C: Console> {
    console: C,
    timing: SessionTiming,
    interrupt: InterruptFlag,
}

impl<C: Console> Provisioner<C> {
    pub fn new(console: C, timing: SessionTiming, interrupt: InterruptFlag) -> Self {
        Self {
            console,
            timing,
            interrupt,
        }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn into_console(self) -> C {
        self.console
    }

    /// Run every step; the link, once opened, is always closed before returning
    pub fn run(&mut self, connector: &mut dyn Connector) -> Result<ProvisionReport, SessionError> {
        self.interrupt.check()?;
        let port = self.locate(connector)?;

        self.interrupt.check()?;
        let mut link = self.connect(connector, &port)?;

        let outcome = self.drive(&mut link, &port);
        if outcome.is_ok() {
            self.console.step(Step::Finalize);
        }
        if link.close() {
            self.console.plain(&format!("Serial link to {} closed", port.device));
        }

        match &outcome {
            Ok(report) => info!("Provisioned {} on {}", report.vmac, report.port),
            Err(e) => warn!("Provisioning ended: {}", e),
        }
        outcome
    }

    fn locate(&mut self, connector: &mut dyn Connector) -> Result<DiscoveredPort, SessionError> {
        self.console.step(Step::Locate);
        match connector.locate() {
            Ok(port) => {
                self.console
                    .success(&format!("Tracker port found: {}", port.device));
                let mut detail = format!("  Description: {}", port.description);
                if let Some(id) = port.usb_id() {
                    detail.push_str(&format!(" [{id}]"));
                }
                self.console.plain(&detail);
                Ok(port)
            }
            Err(SessionError::PortNotFound { available }) => {
                self.console.error("Tracker port not found.");
                self.console.plain("  Check the USB cable and the adapter driver.");
                self.console.plain("Available ports:");
                if available.is_empty() {
                    self.console.plain("  (none)");
                }
                for p in &available {
                    self.console
                        .plain(&format!("  - {}: {}", p.device, p.description));
                }
                Err(SessionError::PortNotFound { available })
            }
            Err(e) => {
                self.console.error(&format!("Cannot enumerate serial ports: {e}"));
                Err(e)
            }
        }
    }

    fn connect(
        &mut self,
        connector: &mut dyn Connector,
        port: &DiscoveredPort,
    ) -> Result<OpenLink, SessionError> {
        self.console.step(Step::Connect);
        let settings = LinkSettings::default();
        self.console.plain(&format!(
            "Framing: {} baud, 8 data bits, no parity, 1 stop bit, no flow control",
            settings.baud_rate
        ));

        match connector.open(port) {
            Ok(link) => {
                self.console.success("Serial port connected");
                self.console.plain(&format!("  Port: {}", link.name()));
                self.console.plain(&format!("  Settings: {settings}"));
                Ok(OpenLink::new(link))
            }
            Err(e) => {
                self.console.error(&format!("Serial connection failed: {e}"));
                Err(e)
            }
        }
    }

    /// Steps 3 through 10, run while the link is open
    fn drive(
        &mut self,
        link: &mut OpenLink,
        port: &DiscoveredPort,
    ) -> Result<ProvisionReport, SessionError> {
        let link = link.link_mut();

        self.diagnose(link)?;
        let vmac = self.acquire_target()?;
        self.await_mode_entry()?;

        let mut exchanges = Vec::new();

        self.begin(Step::ReadBefore)?;
        exchanges.push(self.exchange(link, AtCommand::QueryVmac)?);

        self.begin(Step::Set)?;
        self.console
            .info("Writing the VMAC while in MAC configuration mode.");
        exchanges.push(self.exchange(link, AtCommand::SetVmac(vmac.clone()))?);

        self.begin(Step::ReadAfter)?;
        let read_after = self.exchange(link, AtCommand::QueryVmac)?;
        let verified = self.verify(&read_after, &vmac);
        exchanges.push(read_after);

        self.begin(Step::FullDump)?;
        exchanges.push(self.exchange(link, AtCommand::DumpConfig)?);

        let rebooted = self.offer_reboot(link, &mut exchanges)?;

        self.console.success("All steps completed!");
        Ok(ProvisionReport {
            port: port.device.clone(),
            vmac,
            exchanges,
            verified,
            rebooted,
        })
    }

    fn diagnose(&mut self, link: &mut dyn DeviceLink) -> Result<(), SessionError> {
        self.begin(Step::Diagnose)?;
        self.console
            .info("The tracker does not always print logs.");
        self.console
            .plain("  It still answers AT commands in MAC configuration mode even when silent.");
        self.console
            .plain("Sending Enter to the tracker to check for a response...");

        for _ in 0..PROBE_COUNT {
            link.write_all(b"\r\n")?;
            link.flush()?;
            self.interrupt.sleep(self.timing.probe_interval())?;
        }

        let window = self.timing.diagnose_window();
        self.console.plain(&format!(
            "Collecting tracker logs ({}s)...",
            window.as_secs()
        ));
        let collector = self.collector();
        let console = &mut self.console;
        let lines = collector.monitor_lines(link, window, |line| console.device_line(line))?;

        if lines.is_empty() {
            self.console.warning("No response from the tracker (0 log lines)");
            self.console.plain("  Possible reasons:");
            self.console.plain("  1. The tracker is idle (can be normal)");
            self.console.plain("  2. The tracker is in a mode that prints no logs");
            self.console.plain("  3. Communication problem or wrong port");
            self.console
                .info("In MAC configuration mode the tracker answers AT commands.");
        } else {
            self.console.success("The tracker is responding.");
            let internal = lines
                .iter()
                .any(|l| INTERNAL_LOG_MARKERS.iter().any(|m| l.contains(m)));
            if internal {
                self.console.plain("  (internal LED/Button logs seen)");
            }
        }

        let answer = self.console.ask("Continue to the next step? (y/n): ")?;
        if is_no(&answer) {
            self.console.error("Cancelled by the operator.");
            return Err(SessionError::UserCancelled);
        }
        Ok(())
    }

    fn acquire_target(&mut self) -> Result<VmacAddress, SessionError> {
        self.begin(Step::AcquireTarget)?;

        loop {
            let input = self
                .console
                .ask("Last 4 characters of the watch MAC to set (e.g. B2C3): ")?;
            match VmacAddress::from_suffix(&input) {
                Ok(vmac) => {
                    self.console
                        .success(&format!("Full MAC address to set: {vmac}"));
                    return Ok(vmac);
                }
                Err(SuffixError::NotAlphanumeric { input }) => {
                    self.console
                        .error("Invalid format: only letters and digits are allowed.");
                    self.console.plain(&format!("  Entered: {input}"));
                }
                Err(SuffixError::NotFourHexDigits { input, len }) => {
                    self.console
                        .error("Invalid format: enter exactly 4 hex digits (0-9, A-F).");
                    self.console
                        .plain(&format!("  Entered: {input} (length {len})"));
                }
            }
        }
    }

    fn await_mode_entry(&mut self) -> Result<(), SessionError> {
        self.begin(Step::AwaitModeEntry)?;
        self.console
            .warning("AT+VMAC only works after entering MAC configuration mode!");
        self.console.plain("Button sequence:");
        self.console
            .plain("  [short press once] + [long press 3s once], repeat this 3 times");
        self.console.info("Once in MAC configuration mode the tracker:");
        self.console.plain("  - shows a dedicated LED pattern");
        self.console.plain("  - answers AT+VMAC commands");
        self.console.plain("  - reboots automatically after 30 seconds");

        self.console
            .ask("Press Enter after entering MAC configuration mode: ")?;
        self.console
            .success("MAC configuration mode entered. Starting VMAC setup.");
        self.interrupt.sleep(self.timing.mode_entry_settle())
    }

    fn offer_reboot(
        &mut self,
        link: &mut dyn DeviceLink,
        exchanges: &mut Vec<CommandResult>,
    ) -> Result<bool, SessionError> {
        self.begin(Step::Reboot)?;
        let answer = self
            .console
            .ask(&format!("Reboot the tracker ({})? (y/n): ", AtCommand::Reboot))?;
        if !is_yes(&answer) {
            self.console.plain("Reboot skipped.");
            info!("Reboot skipped");
            return Ok(false);
        }

        let result = self.exchange(link, AtCommand::Reboot)?;
        exchanges.push(result);
        Ok(true)
    }

    /// Announce a step, unless an interrupt is pending
    fn begin(&mut self, step: Step) -> Result<(), SessionError> {
        self.interrupt.check()?;
        self.console.step(step);
        Ok(())
    }

    fn exchange(
        &mut self,
        link: &mut dyn DeviceLink,
        command: AtCommand,
    ) -> Result<CommandResult, SessionError> {
        let settle = self.timing.settle_for(&command);
        self.console.command_sent(&command, settle);
        let result = self.dispatcher().send(link, &command, settle)?;
        self.console.command_result(&result);
        Ok(result)
    }

    fn verify(&mut self, result: &CommandResult, target: &VmacAddress) -> Option<bool> {
        match result.reported_vmac() {
            Some(reported) if &reported == target => {
                self.console
                    .success(&format!("Tracker reports VMAC {reported}"));
                Some(true)
            }
            Some(reported) => {
                self.console.warning(&format!(
                    "Tracker reports VMAC {reported}, expected {target}"
                ));
                Some(false)
            }
            None => {
                self.console
                    .info("No VMAC value in the response; check the output above.");
                None
            }
        }
    }

    fn collector(&self) -> ResponseCollector {
        ResponseCollector::new(self.timing.poll_interval(), self.interrupt.clone())
    }

    fn dispatcher(&self) -> CommandDispatcher {
        CommandDispatcher::new(
            self.collector(),
            self.interrupt.clone(),
            self.timing.collect_window(),
        )
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn is_no(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "n" | "no")
}
