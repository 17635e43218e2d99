//! Inbound requests from the mesh stack.
//!
//! The UART receive path decodes mesh messages into [`NodeRequest`]s and
//! queues them; the poll loop drains the queue. The queue is a bounded
//! `heapless::Deque` guarded by a critical section, so the sender side may
//! run in interrupt context.

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_time::Duration;
use heapless::{Deque, Vec};

use crate::mesh::MessageHeader;

/// Largest EL/ELT payload accepted, subopcode included
pub const MAX_INBOUND_PAYLOAD: usize = 8;

/// Raw EL/ELT payload, subopcode first
pub type InboundPayload = Vec<u8, MAX_INBOUND_PAYLOAD>;

/// Request addressed to the node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRequest {
    /// New Light Lightness target
    Lightness {
        present: u16,
        target: u16,
        transition: Duration,
    },
    /// New Light CTL temperature target
    Temperature {
        present: u16,
        target: u16,
        transition: Duration,
    },
    /// Play the startup sequence
    EnableStartupSequence,
    /// Attention timer state and blink phase
    Attention { active: bool, led_on: bool },
    /// Re-read the lightness state from the mesh
    Synchronize,
    /// Emergency Lighting server message
    EmergencyLighting {
        header: MessageHeader,
        payload: InboundPayload,
    },
    /// Emergency Lighting Test server message
    EmergencyLightingTest {
        header: MessageHeader,
        payload: InboundPayload,
    },
}

impl NodeRequest {
    /// Wrap an EL message, `None` if the payload is oversized
    pub fn emergency_lighting(header: MessageHeader, payload: &[u8]) -> Option<Self> {
        Some(Self::EmergencyLighting {
            header,
            payload: Vec::from_slice(payload).ok()?,
        })
    }

    /// Wrap an ELT message, `None` if the payload is oversized
    pub fn emergency_lighting_test(header: MessageHeader, payload: &[u8]) -> Option<Self> {
        Some(Self::EmergencyLightingTest {
            header,
            payload: Vec::from_slice(payload).ok()?,
        })
    }
}

/// Error returned when the request queue is full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrySendError(pub NodeRequest);

/// Error returned when the request queue is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TryReceiveError;

/// Bounded queue of node requests.
pub struct RequestQueue<const SIZE: usize> {
    inner: Mutex<RefCell<Deque<NodeRequest, SIZE>>>,
}

impl<const SIZE: usize> RequestQueue<SIZE> {
    /// Create a new empty queue.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Get a sender handle, for the UART receive path.
    pub const fn sender(&self) -> RequestSender<'_, SIZE> {
        RequestSender { queue: self }
    }

    /// Get a receiver handle, for the poll loop.
    pub const fn receiver(&self) -> RequestReceiver<'_, SIZE> {
        RequestReceiver { queue: self }
    }

    /// Queue a request.
    ///
    /// Returns the request back if the queue is full.
    pub fn try_send(&self, request: NodeRequest) -> Result<(), TrySendError> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.push_back(request).map_err(TrySendError)
        })
    }

    /// Take the oldest request.
    pub fn try_receive(&self) -> Result<NodeRequest, TryReceiveError> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.pop_front().ok_or(TryReceiveError)
        })
    }

    /// Number of queued requests.
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const SIZE: usize> Default for RequestQueue<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sending half of a [`RequestQueue`].
#[derive(Clone, Copy)]
pub struct RequestSender<'a, const SIZE: usize> {
    queue: &'a RequestQueue<SIZE>,
}

impl<const SIZE: usize> RequestSender<'_, SIZE> {
    /// Queue a request, see [`RequestQueue::try_send`].
    pub fn try_send(&self, request: NodeRequest) -> Result<(), TrySendError> {
        self.queue.try_send(request)
    }
}

/// Receiving half of a [`RequestQueue`].
#[derive(Clone, Copy)]
pub struct RequestReceiver<'a, const SIZE: usize> {
    queue: &'a RequestQueue<SIZE>,
}

impl<const SIZE: usize> RequestReceiver<'_, SIZE> {
    /// Take the oldest request, see [`RequestQueue::try_receive`].
    pub fn try_receive(&self) -> Result<NodeRequest, TryReceiveError> {
        self.queue.try_receive()
    }
}
