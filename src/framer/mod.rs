//! Protocol framers: the only non-trivial engineering in the proxy.
//!
//! Each framer's `relay_cycle` reads one protocol-level request unit from
//! the client, forwards it verbatim to the backend, reads one response
//! unit from the backend, and forwards it verbatim to the client. Neither
//! framer interprets keys or values, only header/line fields needed to
//! find the unit boundary.
pub mod binary;
pub mod text;
