//! Emergency lighting self-test server.
//!
//! Handles the EL (inhibit / rest / state / operation time) and ELT
//! (functional / duration test) command families. Self-tests are simulated:
//! they finish after a fixed time, and completion is only noticed on a poll
//! or a query.

mod battery;
mod wire;

use embassy_time::Duration;
use embedded_hal::digital::InputPin;

pub use battery::{
    ANALOG_DEAD_RANGE, ANALOG_MAX_READOUT, AnalogInput, BATTERY_LEVEL_CRITICALLY_LOW,
    BATTERY_LEVEL_LOW, BATTERY_LEVEL_MAX, BATTERY_TIME_UNKNOWN, BatteryCharging, BatteryFlags,
    BatteryIndicator, BatteryPresence, BatteryServiceability, BatteryStatus,
    battery_level_percent,
};
pub use wire::{
    DurationTestStatus, EL_OPCODE, ELT_OPCODE, ElRequest, ElState, ElSubOpcode, EltRequest,
    EltSubOpcode, FunctionalTestStatus, OperationTimeStatus, PropertyId, PropertyStatus,
    StateStatus, TEST_LENGTH_UNKNOWN, TestFaults, TestStatus,
};

use crate::log::log_info;
use crate::mesh::{MeshTransport, MessageHeader, Request1Message};
use crate::timestamp::Timestamp;

/// Timing configuration of the emergency server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmergencyConfig {
    /// Time after which a functional test finishes
    pub functional_test_time: Duration,
    /// Time after which a duration test finishes
    pub duration_test_time: Duration,
    /// Battery sampling period
    pub battery_period: Duration,
    /// Emergency time reported until the first clear
    ///
    /// Reported in Lamp Operation Time Status only; no emergency operation
    /// counts it down, a clear resets it to zero.
    pub emergency_time: Duration,
}

impl EmergencyConfig {
    pub const DEFAULT: Self = Self {
        functional_test_time: Duration::from_secs(1),
        duration_test_time: Duration::from_secs(60),
        battery_period: Duration::from_secs(60),
        emergency_time: Duration::from_secs(10),
    };
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Cached result of one kind of self-test
#[derive(Debug, Clone, Copy, Default)]
struct TestRun {
    status: TestStatus,
    faults: TestFaults,
    started_at: Timestamp,
}

impl TestRun {
    fn start(&mut self, now: Timestamp) {
        self.started_at = now;
        self.status = TestStatus::Unknown;
    }
}

/// Emergency lighting server
///
/// `A` is the battery sense input, `S` the active-low switch emulating a
/// mains failure. The server is inactive until an instance index is set.
pub struct EmergencyLightingServer<A, S> {
    config: EmergencyConfig,
    instance_index: Option<u8>,
    state: ElState,

    operation_time_offset: Timestamp,
    emergency_time: Duration,

    functional: TestRun,
    duration: TestRun,

    battery: A,
    emergency_switch: S,
    last_battery_sample: Option<Timestamp>,
    battery_level: Option<u8>,
}

impl<A: AnalogInput, S: InputPin> EmergencyLightingServer<A, S> {
    /// Create a new inactive server
    pub fn new(config: EmergencyConfig, battery: A, emergency_switch: S) -> Self {
        Self {
            config,
            instance_index: None,
            state: ElState::Normal,
            operation_time_offset: Timestamp::ZERO,
            emergency_time: config.emergency_time,
            functional: TestRun::default(),
            duration: TestRun::default(),
            battery,
            emergency_switch,
            last_battery_sample: None,
            battery_level: None,
        }
    }

    /// Register the EL/ELT server instance, activating the server
    pub fn set_instance_index(&mut self, index: u8) {
        self.instance_index = Some(index);
    }

    pub const fn instance_index(&self) -> Option<u8> {
        self.instance_index
    }

    pub const fn state(&self) -> ElState {
        self.state
    }

    pub const fn functional_test_status(&self) -> TestStatus {
        self.functional.status
    }

    pub const fn duration_test_status(&self) -> TestStatus {
        self.duration.status
    }

    /// Battery level of the last periodic sample
    pub const fn battery_level(&self) -> Option<u8> {
        self.battery_level
    }

    /// Periodic work: battery sampling and self-test completion
    pub fn poll<T: MeshTransport>(&mut self, now: Timestamp, transport: &mut T) {
        let Some(instance_index) = self.instance_index else {
            return;
        };

        self.check_test_completion(now);

        let due = self
            .last_battery_sample
            .is_none_or(|last| now.duration_since(last) > self.config.battery_period);
        if !due {
            return;
        }
        self.last_battery_sample = Some(now);

        let level = battery_level_percent(self.battery.read());
        log_info!("[Emergency] battery level: {}%", level);
        self.battery_level = Some(level);

        if level == 0 {
            self.state = ElState::BatteryDischarged;
        } else if self.state == ElState::BatteryDischarged {
            self.state = ElState::Normal;
        }

        transport.send_battery_status(&BatteryStatus::emergency(instance_index, level));
    }

    /// Handle an EL message, `payload` starting with the subopcode
    ///
    /// Malformed messages are dropped without a response.
    pub fn handle_el_message<T: MeshTransport>(
        &mut self,
        header: MessageHeader,
        payload: &[u8],
        now: Timestamp,
        transport: &mut T,
    ) {
        if self.instance_index.is_none() {
            return;
        }
        let request = match ElRequest::decode(payload) {
            Ok(request) => request,
            Err(err) => {
                log_info!("[Emergency] EL message dropped: {}", err);
                return;
            }
        };
        log_info!("[Emergency] EL request: {:?}", request);

        match request {
            ElRequest::InhibitEnter => {
                self.state = ElState::Inhibit;
                respond_state(transport, header, self.state);
            }
            ElRequest::InhibitExit => {
                self.state = ElState::Normal;
                respond_state(transport, header, self.state);
            }
            ElRequest::RestExit => {
                self.state = ElState::Normal;
                let reported = if self.is_emergency_switch_active() {
                    ElState::Emergency
                } else {
                    self.state
                };
                respond_state(transport, header, reported);
            }
            ElRequest::StateGet => {
                self.check_test_completion(now);
                let reported = if self.state != ElState::Rest && self.is_emergency_switch_active() {
                    ElState::Emergency
                } else {
                    self.state
                };
                respond_state(transport, header, reported);
            }
            ElRequest::PropertyStatus(property) => match PropertyId::try_from(property.property_id) {
                Ok(id) => log_info!("[Emergency] property {:?}: 0x{:04X}", id, property.value),
                Err(err) => log_info!("[Emergency] property status: {}", err),
            },
            ElRequest::LampOperationTimeGet => {
                self.check_test_completion(now);
                let status = OperationTimeStatus {
                    total_operation_time: now.millis_since(self.operation_time_offset) / 1000,
                    emergency_time: duration_secs(self.emergency_time),
                };
                respond(transport, header, ElSubOpcode::LampOperationTimeStatus as u8, &status.encode());
            }
            ElRequest::LampOperationTimeClear => {
                self.operation_time_offset = now;
                self.emergency_time = Duration::from_millis(0);
                let status = OperationTimeStatus::default();
                respond(transport, header, ElSubOpcode::LampOperationTimeStatus as u8, &status.encode());
            }
            ElRequest::RestEnter => {
                self.state = ElState::Rest;
                respond_state(transport, header, self.state);
            }
        }
    }

    /// Handle an ELT message, `payload` starting with the subopcode
    ///
    /// Malformed messages are dropped without a response. Start and stop
    /// requests are answered with an EL State Status.
    pub fn handle_elt_message<T: MeshTransport>(
        &mut self,
        header: MessageHeader,
        payload: &[u8],
        now: Timestamp,
        transport: &mut T,
    ) {
        if self.instance_index.is_none() {
            return;
        }
        let request = match EltRequest::decode(payload) {
            Ok(request) => request,
            Err(err) => {
                log_info!("[Emergency] ELT message dropped: {}", err);
                return;
            }
        };
        log_info!("[Emergency] ELT request: {:?}", request);

        let el_header = header.with_opcode(EL_OPCODE);
        match request {
            EltRequest::FunctionalTestGet => {
                self.check_test_completion(now);
                let status = FunctionalTestStatus {
                    status: self.functional.status,
                    faults: self.functional.faults,
                };
                respond(transport, header, EltSubOpcode::FunctionalTestStatus as u8, &status.encode());
            }
            EltRequest::FunctionalTestStart => {
                if self.state == ElState::Normal {
                    self.state = ElState::FunctionalTestInProgress;
                    self.functional.start(now);
                }
                respond_state(transport, el_header, self.state);
            }
            EltRequest::FunctionalTestStop => {
                self.state = ElState::Normal;
                self.functional.status = TestStatus::Unknown;
                respond_state(transport, el_header, self.state);
            }
            EltRequest::DurationTestGet => {
                self.check_test_completion(now);
                let test_length = match self.duration.status {
                    TestStatus::Finished => {
                        u16::try_from(self.config.duration_test_time.as_secs()).unwrap_or(TEST_LENGTH_UNKNOWN)
                    }
                    TestStatus::Unknown => TEST_LENGTH_UNKNOWN,
                };
                let status = DurationTestStatus {
                    status: self.duration.status,
                    faults: self.duration.faults,
                    test_length,
                };
                respond(transport, header, EltSubOpcode::DurationTestStatus as u8, &status.encode());
            }
            EltRequest::DurationTestStart => {
                if self.state == ElState::Normal
                    && battery_level_percent(self.battery.read()) == BATTERY_LEVEL_MAX
                {
                    self.state = ElState::DurationTestInProgress;
                    self.duration.start(now);
                }
                respond_state(transport, el_header, self.state);
            }
            EltRequest::DurationTestStop => {
                self.state = ElState::Normal;
                self.duration.status = TestStatus::Unknown;
                respond_state(transport, el_header, self.state);
            }
        }
    }

    /// Finish a running self-test whose time is up
    fn check_test_completion(&mut self, now: Timestamp) {
        let (run, limit) = match self.state {
            ElState::FunctionalTestInProgress => (&mut self.functional, self.config.functional_test_time),
            ElState::DurationTestInProgress => (&mut self.duration, self.config.duration_test_time),
            _ => return,
        };
        if now.duration_since(run.started_at) > limit {
            run.status = TestStatus::Finished;
            self.state = ElState::Normal;
        }
    }

    fn is_emergency_switch_active(&mut self) -> bool {
        self.emergency_switch.is_low().unwrap_or(false)
    }
}

fn respond_state<T: MeshTransport>(transport: &mut T, header: MessageHeader, state: ElState) {
    let status = StateStatus { state };
    respond(transport, header, ElSubOpcode::StateStatus as u8, &status.encode());
}

fn respond<T: MeshTransport>(transport: &mut T, header: MessageHeader, subopcode: u8, payload: &[u8]) {
    if let Some(message) = Request1Message::new(header, subopcode, payload) {
        transport.send_request1(&message);
    }
}

#[allow(clippy::cast_possible_truncation)]
fn duration_secs(duration: Duration) -> u32 {
    duration.as_secs().min(u64::from(u32::MAX)) as u32
}
