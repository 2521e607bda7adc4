//! SMS channel: inbound webhook decoding and the outbound transport.
//!
//! Inbound payloads are decoded into an [`InboundMessage`]; outbound messages go through a
//! [`Transport`] ([`TwilioTransport`] in production).

mod field;
mod inbound;
mod transport;
mod twilio;

pub use field::{Field, FIELDS};
pub use inbound::{Decoded, InboundMessage, SegmentSkip, SkippedSegment};
pub use transport::{Transport, TransportError};
pub use twilio::TwilioTransport;
