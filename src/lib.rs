#![no_std]

pub mod button;
pub mod dimmer;
pub mod dimming_scheduler;
pub mod emergency;
pub mod error;
mod log;
pub mod mesh;
pub mod node;
pub mod output;
pub mod request;
pub mod startup;
pub mod timestamp;
pub mod transition;

pub use button::{Button, ButtonInput, ButtonKind, ButtonPanel, ButtonTimings, GestureState, Rocker};
pub use dimmer::{Dimmer, DimmerChannel, DimmerConfig};
pub use dimming_scheduler::DimmingScheduler;
pub use emergency::{AnalogInput, ElState, EmergencyConfig, EmergencyLightingServer, TestStatus};
pub use error::DecodeError;
pub use mesh::{GenericDeltaSet, GenericOnOffSet, MeshTransport, MessageHeader, Request1Message};
pub use node::LightingNode;
pub use output::{ChannelLevels, OutputMapper, PwmOutput, TemperatureRange};
pub use request::{NodeRequest, RequestQueue, RequestReceiver, RequestSender};
pub use startup::{StartupSequence, StartupStage};
pub use timestamp::{Clock, EmbassyClock, Timestamp};
pub use transition::Transition;

pub use embassy_time::{Duration, Instant};

/// Abstract light output trait
///
/// Implement this trait to support different hardware platforms.
/// The dimmer is generic over this trait.
pub trait OutputDriver {
    /// Write levels to the warm and cold channels
    fn write(&mut self, levels: ChannelLevels);
}
