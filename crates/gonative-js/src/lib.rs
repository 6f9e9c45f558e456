//! JS-like host environment for translated WASM modules.
//!
//! A module compiled against a JS/WASM host routes every host interaction —
//! I/O, randomness, property access, calls — through a dynamically-typed
//! value layer. This crate re-implements that layer natively:
//!
//! - [`Value`]: the tagged, cheaply-clonable dynamic value
//! - [`JsObject`]: named, property-bearing, callable entities
//! - [`reflect`]: property get/set/delete and call/construct dispatch
//! - [`global`]: the singleton host-global graph (`console`, `crypto`,
//!   `fs`, `process`, ...)
//! - [`Writer`]: the line-buffering sink behind `fs.write`
//!
//! The contract-violation policy is two-tiered: bridge misuse traps the
//! process (see `gonative-trap`), while expected capability gaps surface as
//! ENOSYS error objects ([`enosys`]) through the ordinary value channel.

mod global;
mod object;
pub mod reflect;
mod value;
mod writer;

pub use global::{enosys, global};
pub use object::{DictProperties, JsFunc, JsObject, Properties};
pub use value::{Kind, Value};
pub use writer::Writer;
