//! Fatal diagnostics for host-bridge contract violations.
//!
//! The bridge distinguishes two error tiers. Expected host-capability gaps
//! (unsupported `fs.write` shapes, the `fetch` stub) are reported to the
//! translated code as ENOSYS error objects and never reach this crate.
//! Everything here is tier one: bridge misuse that correctly translated code
//! cannot produce — a payload accessor on the wrong value kind, reflection on
//! null/undefined, an `apply` on a constructor. Those are not recoverable and
//! must not be caught; [`trap`] reports the violation and terminates.
//!
//! Under the release profile the workspace sets `panic = "abort"`, so a trap
//! ends the process immediately. Under the dev profile it surfaces as an
//! ordinary panic, which is what the test suites assert with
//! `#[should_panic]`.

use thiserror::Error;

/// A tier-one bridge contract violation.
///
/// Each variant carries the fully formatted diagnostic; the variant itself
/// records which contract was broken.
#[derive(Debug, Error)]
pub enum Violation {
    /// Reflection (get/set/delete/construct/apply) on a null or undefined
    /// target.
    #[error("{0}")]
    Forbidden(String),

    /// Property lookup on a shape that cannot carry the requested property.
    #[error("{0}")]
    NotFound(String),

    /// Property write or delete on a shape that is not an object entity.
    #[error("{0}")]
    NotWritable(String),

    /// Call-convention mismatch: `construct` on a non-constructor, `apply`
    /// on a constructor, or a call on something that is not a function.
    #[error("{0}")]
    NotCallable(String),

    /// Payload accessor used on the wrong value kind.
    #[error("{0}")]
    KindMismatch(String),

    /// A host operation the bridge deliberately does not implement
    /// (e.g. the unsupported `Uint8Array` overloads).
    #[error("{0}")]
    Unimplemented(String),

    /// Linear memory request past the 4 GiB ceiling.
    #[error("{0}")]
    MemoryExhausted(String),

    /// The host's entropy source failed.
    #[error("{0}")]
    EntropySource(String),
}

/// Report a contract violation and terminate.
///
/// Never returns. The diagnostic reaches stderr through the panic channel;
/// with the release profile's `panic = "abort"` the process dies on the
/// spot, which is the required behavior for bridge misuse.
#[cold]
pub fn trap(violation: Violation) -> ! {
    panic!("{violation}");
}
