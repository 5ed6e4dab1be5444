//! Core traits for ipsync
//!
//! This module defines the collaborator interfaces the reconciler is built on.
//!
//! - [`IpSource`]: Resolve the current public IP
//! - [`DnsProvider`]: List zones and records, patch record content
//! - [`NotificationSink`]: Deliver human-readable messages

pub mod ip_source;
pub mod dns_provider;
pub mod notification_sink;

pub use ip_source::IpSource;
pub use dns_provider::DnsProvider;
pub use notification_sink::NotificationSink;
