//! Integration tests for the provisioning sequence
//!
//! Every run goes through the public [`Provisioner`] against a simulated
//! tracker, checking:
//! - The fixed command order and composed VMAC
//! - Link closure on success, cancellation, interrupt and faults
//! - Operator input validation and the reboot prompt
//! - Discovery failures

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use vmac_detect::DiscoveredPort;
use vmac_protocol::AtCommand;
use vmac_session::{
    CommandResult, Connector, Console, DeviceLink, InterruptFlag, Provisioner, ScriptedConsole,
    SessionError, SessionTiming, Step, Tone, VirtualLink,
};
use vmac_sim::{VirtualTracker, VirtualTrackerConfig};

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    /// Connector handing out a link to a shared simulated tracker
    pub struct SimConnector {
        pub tracker: Rc<RefCell<VirtualTracker>>,
        pub ports: Result<DiscoveredPort, Vec<DiscoveredPort>>,
        pub refuse_open: bool,
        pub opened: usize,
        pub fault: Option<LinkFault>,
    }

    /// Misbehavior injected into the opened link
    #[derive(Clone)]
    pub enum LinkFault {
        /// Raise the flag once an AT command has been written
        InterruptAfterCommand(InterruptFlag),
        /// Every write fails
        WriteFails,
    }

    /// Link wrapper applying a [`LinkFault`] on top of a [`VirtualLink`]
    pub struct FaultyLink {
        inner: VirtualLink,
        fault: LinkFault,
    }

    impl DeviceLink for FaultyLink {
        fn name(&self) -> &str {
            self.inner.name()
        }

        fn is_open(&self) -> bool {
            self.inner.is_open()
        }

        fn bytes_to_read(&mut self) -> std::io::Result<usize> {
            self.inner.bytes_to_read()
        }

        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.inner.read(buf)
        }

        fn write_all(&mut self, data: &[u8]) -> std::io::Result<()> {
            match &self.fault {
                LinkFault::WriteFails => Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "adapter unplugged",
                )),
                LinkFault::InterruptAfterCommand(flag) => {
                    self.inner.write_all(data)?;
                    if data.starts_with(b"AT") {
                        flag.trigger();
                    }
                    Ok(())
                }
            }
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.inner.flush()
        }

        fn clear_input(&mut self) -> std::io::Result<()> {
            self.inner.clear_input()
        }

        fn close(&mut self) {
            self.inner.close();
        }
    }

    impl SimConnector {
        pub fn new(tracker: VirtualTracker) -> Self {
            Self {
                tracker: Rc::new(RefCell::new(tracker)),
                ports: Ok(DiscoveredPort::new("/dev/ttyUSB0", "FT232R USB UART")),
                refuse_open: false,
                opened: 0,
                fault: None,
            }
        }

        pub fn link_closes(&self) -> usize {
            self.tracker.borrow().link_closes()
        }

        pub fn sent(&self) -> Vec<String> {
            self.tracker.borrow().received_commands().to_vec()
        }
    }

    impl Connector for SimConnector {
        fn locate(&mut self) -> Result<DiscoveredPort, SessionError> {
            self.ports
                .clone()
                .map_err(|available| SessionError::PortNotFound { available })
        }

        fn open(&mut self, port: &DiscoveredPort) -> Result<Box<dyn DeviceLink>, SessionError> {
            if self.refuse_open {
                return Err(SessionError::Connect {
                    port: port.device.clone(),
                    reason: "Permission denied".to_string(),
                });
            }
            self.opened += 1;
            let inner = VirtualLink::new(port.device.clone(), Rc::clone(&self.tracker));
            match self.fault.clone() {
                Some(fault) => Ok(Box::new(FaultyLink { inner, fault })),
                None => Ok(Box::new(inner)),
            }
        }
    }

    /// Console that raises the interrupt flag when a prompt containing
    /// `trigger_on` is asked
    pub struct InterruptingConsole {
        pub inner: ScriptedConsole,
        pub flag: InterruptFlag,
        pub trigger_on: &'static str,
    }

    impl Console for InterruptingConsole {
        fn step(&mut self, step: Step) {
            self.inner.step(step);
        }

        fn say(&mut self, tone: Tone, text: &str) {
            self.inner.say(tone, text);
        }

        fn device_line(&mut self, line: &str) {
            self.inner.device_line(line);
        }

        fn command_sent(&mut self, command: &AtCommand, settle: Duration) {
            self.inner.command_sent(command, settle);
        }

        fn command_result(&mut self, result: &CommandResult) {
            self.inner.command_result(result);
        }

        fn ask(&mut self, prompt: &str) -> Result<String, SessionError> {
            if prompt.contains(self.trigger_on) {
                self.flag.trigger();
            }
            self.inner.ask(prompt)
        }
    }

    pub fn provisioner<I, S>(answers: I) -> Provisioner<ScriptedConsole>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Provisioner::new(
            ScriptedConsole::new(answers),
            SessionTiming::immediate(),
            InterruptFlag::new(),
        )
    }
}

use helpers::*;

// ============================================================================
// Successful Runs
// ============================================================================

#[test]
fn test_echo_device_full_sequence() {
    let mut connector = SimConnector::new(VirtualTracker::echo_ok("echo"));
    let mut provisioner = provisioner(["y", "FFFF", "", "n"]);

    let report = provisioner.run(&mut connector).unwrap();

    assert_eq!(report.vmac.as_str(), "AAAAAAAAFFFF");
    assert_eq!(
        connector.sent(),
        ["AT+VMAC", "AT+VMAC=AAAAAAAAFFFF", "AT+VMAC", "AT+SCFG"]
    );
    assert_eq!(report.exchanges.len(), 4);
    assert!(report.exchanges.iter().all(|r| r.at_lines() == ["OK"]));
    assert_eq!(report.verified, None);
    assert!(!report.rebooted);
    assert_eq!(connector.link_closes(), 1);
    assert!(provisioner.console().shows("== 11. Done"));
}

#[test]
fn test_stateful_device_verifies_read_back() {
    let mut connector = SimConnector::new(VirtualTracker::new("stateful"));
    let mut provisioner = provisioner(["y", "b2c3", "", "n"]);

    let report = provisioner.run(&mut connector).unwrap();

    assert_eq!(report.verified, Some(true));
    assert_eq!(
        report.exchanges[0].reported_vmac().unwrap().as_str(),
        "000000000000"
    );
    assert_eq!(
        connector.tracker.borrow().vmac().unwrap().as_str(),
        "AAAAAAAAB2C3"
    );
    let dump = &report.exchanges[3];
    assert!(dump.at_lines().contains(&"+SCFG:VMAC=AAAAAAAAB2C3".to_string()));
}

#[test]
fn test_rejected_write_reports_mismatch() {
    let tracker = VirtualTracker::from_config(VirtualTrackerConfig {
        start_in_mac_mode: false,
        ..Default::default()
    });
    let mut connector = SimConnector::new(tracker);
    let mut provisioner = provisioner(["y", "1234", "", "n"]);

    let report = provisioner.run(&mut connector).unwrap();

    assert_eq!(report.exchanges[1].at_lines(), ["ERROR"]);
    assert_eq!(report.verified, Some(false));
    assert!(provisioner.console().shows("expected AAAAAAAA1234"));
}

#[test]
fn test_reboot_confirmed() {
    let mut connector = SimConnector::new(VirtualTracker::new("t"));
    let mut provisioner = provisioner(["y", "abcd", "", "yes"]);

    let report = provisioner.run(&mut connector).unwrap();

    assert!(report.rebooted);
    assert_eq!(report.exchanges.len(), 5);
    assert_eq!(connector.sent().last().map(String::as_str), Some("AT+RBOT"));
    assert_eq!(connector.tracker.borrow().reboots(), 1);
    assert_eq!(connector.link_closes(), 1);
}

#[test]
fn test_reboot_declined_by_any_other_answer() {
    let mut connector = SimConnector::new(VirtualTracker::new("t"));
    let mut provisioner = provisioner(["y", "abcd", "", "sure"]);

    let report = provisioner.run(&mut connector).unwrap();

    assert!(!report.rebooted);
    assert_eq!(connector.tracker.borrow().reboots(), 0);
}

#[test]
fn test_silent_diagnosis_still_proceeds() {
    let tracker = VirtualTracker::from_config(VirtualTrackerConfig {
        chatter: Vec::new(),
        ..Default::default()
    });
    let mut connector = SimConnector::new(tracker);
    let mut provisioner = provisioner(["", "ffff", "", "n"]);

    assert!(provisioner.run(&mut connector).is_ok());
    let console = provisioner.console();
    assert!(console.shows("No response from the tracker (0 log lines)"));
}

#[test]
fn test_diagnosis_shows_device_chatter() {
    let mut connector = SimConnector::new(VirtualTracker::new("t"));
    let mut provisioner = provisioner(["y", "ffff", "", "n"]);

    provisioner.run(&mut connector).unwrap();

    let console = provisioner.console();
    assert!(console.shows("<< [LED] pattern=idle"));
    assert!(console.shows("internal LED/Button logs seen"));
    assert!(connector.sent().iter().all(|c| c.starts_with("AT+")));
}

// ============================================================================
// Operator Input
// ============================================================================

#[test]
fn test_invalid_suffix_reprompts() {
    let mut connector = SimConnector::new(VirtualTracker::echo_ok("t"));
    let mut provisioner = provisioner(["y", "zz!!", "12345", "b2 c3", "", "n"]);

    let report = provisioner.run(&mut connector).unwrap();

    assert_eq!(report.vmac.as_str(), "AAAAAAAAB2C3");
    let console = provisioner.console();
    assert!(console.shows("only letters and digits"));
    assert!(console.shows("exactly 4 hex digits"));
    let suffix_prompts = console
        .prompts()
        .iter()
        .filter(|p| p.contains("Last 4 characters"))
        .count();
    assert_eq!(suffix_prompts, 3);
}

#[test]
fn test_prompt_order() {
    let mut connector = SimConnector::new(VirtualTracker::echo_ok("t"));
    let mut provisioner = provisioner(["y", "0000", "", "n"]);

    provisioner.run(&mut connector).unwrap();

    let prompts = provisioner.console().prompts();
    assert_eq!(prompts.len(), 4);
    assert!(prompts[0].starts_with("Continue"));
    assert!(prompts[1].starts_with("Last 4 characters"));
    assert!(prompts[2].contains("MAC configuration mode"));
    assert!(prompts[3].starts_with("Reboot"));
}

// ============================================================================
// Failure Paths
// ============================================================================

#[test]
fn test_cancel_after_diagnosis_closes_link() {
    let mut connector = SimConnector::new(VirtualTracker::echo_ok("t"));
    let mut provisioner = provisioner(["No"]);

    let result = provisioner.run(&mut connector);

    assert!(matches!(result, Err(SessionError::UserCancelled)));
    assert!(connector.sent().is_empty());
    assert_eq!(connector.link_closes(), 1);
    assert!(!provisioner.console().shows("== 11. Done"));
}

#[test]
fn test_interrupt_during_mode_entry_closes_link() {
    let mut connector = SimConnector::new(VirtualTracker::echo_ok("t"));
    let flag = InterruptFlag::new();
    let console = InterruptingConsole {
        inner: ScriptedConsole::new(["y", "ffff", "", "n"]),
        flag: flag.clone(),
        trigger_on: "Press Enter",
    };
    let mut provisioner = Provisioner::new(console, SessionTiming::immediate(), flag);

    let result = provisioner.run(&mut connector);

    assert!(matches!(result, Err(SessionError::UserInterrupted)));
    assert!(connector.sent().is_empty());
    assert_eq!(connector.link_closes(), 1);
}

#[test]
fn test_interrupt_during_command_settle_closes_link() {
    let mut connector = SimConnector::new(VirtualTracker::new("t"));
    let flag = InterruptFlag::new();
    connector.fault = Some(LinkFault::InterruptAfterCommand(flag.clone()));
    let mut provisioner = Provisioner::new(
        ScriptedConsole::new(["y", "ffff", "", "n"]),
        SessionTiming::immediate(),
        flag,
    );

    let result = provisioner.run(&mut connector);

    assert!(matches!(result, Err(SessionError::UserInterrupted)));
    assert_eq!(connector.sent(), ["AT+VMAC"]);
    assert_eq!(connector.link_closes(), 1);
    assert!(!provisioner.console().shows("== 7. Set VMAC"));
}

#[test]
fn test_write_fault_closes_link() {
    let mut connector = SimConnector::new(VirtualTracker::new("t"));
    connector.fault = Some(LinkFault::WriteFails);
    let mut provisioner = provisioner(["y", "ffff", "", "n"]);

    let result = provisioner.run(&mut connector);

    match result {
        Err(SessionError::Unexpected(reason)) => assert!(reason.contains("adapter unplugged")),
        other => panic!("expected Unexpected, got {other:?}"),
    }
    assert!(connector.sent().is_empty());
    assert_eq!(connector.link_closes(), 1);
}

#[test]
fn test_interrupt_before_start_opens_nothing() {
    let mut connector = SimConnector::new(VirtualTracker::echo_ok("t"));
    let flag = InterruptFlag::new();
    flag.trigger();
    let mut provisioner = Provisioner::new(
        ScriptedConsole::default(),
        SessionTiming::immediate(),
        flag,
    );

    assert!(matches!(
        provisioner.run(&mut connector),
        Err(SessionError::UserInterrupted)
    ));
    assert_eq!(connector.opened, 0);
    assert_eq!(connector.link_closes(), 0);
}

#[test]
fn test_input_closed_mid_run_closes_link() {
    let mut connector = SimConnector::new(VirtualTracker::echo_ok("t"));
    let mut provisioner = provisioner(["y", "ffff"]);

    let result = provisioner.run(&mut connector);

    assert!(matches!(result, Err(SessionError::Unexpected(_))));
    assert_eq!(connector.link_closes(), 1);
}

#[test]
fn test_connect_failure_never_closes() {
    let mut connector = SimConnector::new(VirtualTracker::echo_ok("t"));
    connector.refuse_open = true;
    let mut provisioner = provisioner(["y"]);

    let result = provisioner.run(&mut connector);

    assert!(matches!(result, Err(SessionError::Connect { .. })));
    assert_eq!(connector.link_closes(), 0);
    assert!(provisioner.console().prompts().is_empty());
    assert!(provisioner.console().shows("Serial connection failed"));
}

#[test]
fn test_port_not_found_lists_candidates() {
    let mut connector = SimConnector::new(VirtualTracker::echo_ok("t"));
    connector.ports = Err(vec![
        DiscoveredPort::new("/dev/ttyS0", "n/a"),
        DiscoveredPort::new("/dev/ttyACM0", "Arduino Uno"),
    ]);
    let mut provisioner = provisioner(Vec::<String>::new());

    match provisioner.run(&mut connector) {
        Err(SessionError::PortNotFound { available }) => assert_eq!(available.len(), 2),
        other => panic!("expected PortNotFound, got {other:?}"),
    }
    let console = provisioner.console();
    assert!(console.shows("/dev/ttyACM0: Arduino Uno"));
    assert_eq!(connector.opened, 0);
    assert_eq!(connector.link_closes(), 0);
}

#[test]
fn test_every_failure_exits_one() {
    let errors = [
        SessionError::DependencyMissing("no backend".into()),
        SessionError::PortNotFound { available: vec![] },
        SessionError::UserCancelled,
        SessionError::UserInterrupted,
        SessionError::Unexpected("boom".into()),
    ];
    assert!(errors.iter().all(|e| e.exit_code() == 1));
}
