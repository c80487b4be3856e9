//! Game-specific datagram decoders for F1 Lap Telemetry

pub mod demo;
pub mod f1_2020;

pub use demo::DemoSession;
pub use f1_2020::F12020Decoder;
