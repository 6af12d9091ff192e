// neohub-api: Async Rust client for the NeoHub's line-oriented TCP protocol

pub mod error;
pub mod exchange;
pub mod requests;
pub mod responses;
pub mod socket;

pub use error::Error;
pub use exchange::HubExchange;
pub use responses::{DcbResponse, DeviceRecord, InfoResponse};
pub use socket::HubSocket;
