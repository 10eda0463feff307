//! # Ports Layer (Middle Hexagon)
//!
//! - **Driving Port (Inbound)**: `StudentLoanApi`
//! - **Driven Port (Outbound)**: `ChainProvider`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
