//! FFR Service Access Points
//! 
//! This crate defines the interfaces between the frequency reuse algorithm,
//! the MAC scheduler and the RRC, plus the messages exchanged over them.

pub mod ffr_sap;
pub mod ffr_rrc_sap;
pub mod message_types;

pub use ffr_sap::{FfrSchedulerInterface, RbgMap, DlCqiInfo, DlCqiReport, UlCqiInfo};
pub use ffr_rrc_sap::{FfrRrcInterface, RrcFfrInterface};
pub use message_types::*;
