//! Error types for builder configuration and enrichment
//!
//! All errors surface synchronously to the caller of the offending
//! operation. They indicate malformed configuration, never a transient
//! condition, so there is no retry surface. Concurrency corruption has no
//! variant here: the builder's guard makes it structurally impossible.

use crate::registry::BuilderVariant;

/// Configuration error raised by builder operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuilderError {
    /// A slot mutator was invoked on a variant that does not carry the slot.
    #[error("slot `{slot}` is not available on the {variant:?} builder variant")]
    SlotUnavailable {
        /// Name of the unavailable slot.
        slot: &'static str,
        /// Variant of the builder the mutator was called on.
        variant: BuilderVariant,
    },

    /// The registry's variant disagrees with the builder's slot storage.
    ///
    /// Enrichment fails atomically on this inconsistency; no partially
    /// enriched builder is ever produced.
    #[error("registry variant {expected:?} does not match slot storage variant {found:?}")]
    RegistryMismatch {
        /// Variant the registry was resolved for.
        expected: BuilderVariant,
        /// Variant recorded by the slot storage.
        found: BuilderVariant,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_unavailable_display() {
        let err = BuilderError::SlotUnavailable {
            slot: "context_supplier",
            variant: BuilderVariant::Blocking,
        };
        assert_eq!(
            err.to_string(),
            "slot `context_supplier` is not available on the Blocking builder variant"
        );
    }

    #[test]
    fn registry_mismatch_display() {
        let err = BuilderError::RegistryMismatch {
            expected: BuilderVariant::Async,
            found: BuilderVariant::Blocking,
        };
        assert!(err.to_string().contains("does not match"));
    }
}
