//! SMS relay core library: inbound webhook decoding, phone normalization, templated
//! outbound dispatch, and the HTTP gateway used by the CLI.

pub mod channels;
pub mod config;
pub mod directory;
pub mod dispatch;
pub mod domain;
pub mod gateway;
pub mod init;
pub mod phone;
pub mod responses;
pub mod template;
pub mod validation;
