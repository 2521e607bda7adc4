//! Gateway: HTTP surface of the relay.
//!
//! Single port. `POST /sms` is the provider webhook, `POST /notifications/{kind}` triggers an
//! outbound notification, `GET /` is the health probe.

mod server;

pub use server::{build_dispatcher, router, run_gateway, serve, GatewayState, NotifyRequest};
