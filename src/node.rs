//! Node composition.
//!
//! Wires the poll-side state machines to the shared dimmer and the inbound
//! request queue.

use embedded_hal::digital::InputPin;

use crate::button::ButtonPanel;
use crate::dimmer::Dimmer;
use crate::emergency::{AnalogInput, EmergencyLightingServer};
use crate::mesh::MeshTransport;
use crate::request::{NodeRequest, RequestReceiver};
use crate::startup::StartupSequence;
use crate::timestamp::Timestamp;

/// Lighting node - the poll loop orchestrator
///
/// The dimmer is borrowed because the dimming interrupt shares it; every
/// other part is owned by the poll loop.
pub struct LightingNode<'a, A, S, const QUEUE_SIZE: usize> {
    // External dependencies
    requests: RequestReceiver<'a, QUEUE_SIZE>,
    dimmer: &'a Dimmer,

    // Poll-side state machines
    startup: StartupSequence,
    buttons: ButtonPanel<'a>,
    emergency: EmergencyLightingServer<A, S>,
}

impl<'a, A: AnalogInput, S: InputPin, const QUEUE_SIZE: usize> LightingNode<'a, A, S, QUEUE_SIZE> {
    pub fn new(
        requests: RequestReceiver<'a, QUEUE_SIZE>,
        dimmer: &'a Dimmer,
        buttons: ButtonPanel<'a>,
        emergency: EmergencyLightingServer<A, S>,
    ) -> Self {
        Self {
            requests,
            dimmer,
            startup: StartupSequence::new(),
            buttons,
            emergency,
        }
    }

    /// Run one poll loop iteration
    ///
    /// Call this continuously from the main loop.
    pub fn poll<T: MeshTransport>(&mut self, now: Timestamp, transport: &mut T) {
        self.process_requests(now, transport);

        self.startup.poll(now, self.dimmer);
        self.buttons.poll(now, transport);
        self.emergency.poll(now, transport);
    }

    pub const fn dimmer(&self) -> &'a Dimmer {
        self.dimmer
    }

    pub const fn startup(&self) -> &StartupSequence {
        &self.startup
    }

    pub const fn buttons(&self) -> &ButtonPanel<'a> {
        &self.buttons
    }

    pub const fn emergency(&self) -> &EmergencyLightingServer<A, S> {
        &self.emergency
    }

    pub fn emergency_mut(&mut self) -> &mut EmergencyLightingServer<A, S> {
        &mut self.emergency
    }

    /// Drain all pending requests (non-blocking)
    fn process_requests<T: MeshTransport>(&mut self, now: Timestamp, transport: &mut T) {
        while let Ok(request) = self.requests.try_receive() {
            self.process_request(request, now, transport);
        }
    }

    fn process_request<T: MeshTransport>(&mut self, request: NodeRequest, now: Timestamp, transport: &mut T) {
        match request {
            NodeRequest::Lightness {
                present,
                target,
                transition,
            } => {
                self.dimmer
                    .process_target_lightness(present, target, transition, now);
            }
            NodeRequest::Temperature {
                present,
                target,
                transition,
            } => {
                self.dimmer
                    .process_target_temperature(present, target, transition, now);
            }
            NodeRequest::EnableStartupSequence => {
                if self.dimmer.is_enabled() {
                    self.startup.enable();
                }
            }
            NodeRequest::Attention { active, led_on } => {
                self.dimmer.indicate_attention(active, led_on);
            }
            NodeRequest::Synchronize => self.dimmer.synchronize(transport),
            NodeRequest::EmergencyLighting { header, payload } => {
                self.emergency
                    .handle_el_message(header, &payload, now, transport);
            }
            NodeRequest::EmergencyLightingTest { header, payload } => {
                self.emergency
                    .handle_elt_message(header, &payload, now, transport);
            }
        }
    }
}
