//! Extension registry: static per-variant slot descriptor tables
//!
//! Replaces runtime structural discovery of enrichable configuration with a
//! closed, enumerable contract: each builder variant owns a fixed, ordered
//! table of [`SlotDescriptor`]s, each carrying plain `fn` pointers into the
//! enrichment engine. Two queries for the same variant always return the
//! same table.

use crate::enrich::{self, ApplyFn, PopulatedFn};
use serde::{Deserialize, Serialize};

/// Builder flavor, differing in the count and identity of enrichable slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuilderVariant {
    /// Baseline variant: 12 enrichable slots.
    Blocking,
    /// Extended variant: the baseline slots plus two asynchronous-specific
    /// extension points, 14 in total.
    Async,
}

/// Whether a slot holds one value or an ordered sequence of values.
///
/// Cardinality is fixed per slot name and per variant; it never changes at
/// runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotCardinality {
    /// Zero or one value.
    Single,
    /// Ordered, possibly empty sequence of values.
    Sequence,
}

/// Descriptor for one enrichable configuration slot.
pub struct SlotDescriptor {
    /// Stable slot name.
    pub name: &'static str,
    /// Single value or ordered sequence.
    pub cardinality: SlotCardinality,
    pub(crate) populated: PopulatedFn,
    pub(crate) apply: ApplyFn,
}

impl std::fmt::Debug for SlotDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotDescriptor")
            .field("name", &self.name)
            .field("cardinality", &self.cardinality)
            .finish_non_exhaustive()
    }
}

/// Serializable summary of a slot descriptor, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotInfo {
    /// Stable slot name.
    pub name: &'static str,
    /// Single value or ordered sequence.
    pub cardinality: SlotCardinality,
}

/// Number of enrichable slots on the `Blocking` variant.
pub const BLOCKING_SLOT_COUNT: usize = 12;

/// Number of enrichable slots on the `Async` variant.
pub const ASYNC_SLOT_COUNT: usize = 14;

const REQUEST_INTERCEPTORS: SlotDescriptor = SlotDescriptor {
    name: "request_interceptors",
    cardinality: SlotCardinality::Sequence,
    populated: enrich::count_request_interceptors,
    apply: enrich::apply_request_interceptors,
};

const RESPONSE_INTERCEPTORS: SlotDescriptor = SlotDescriptor {
    name: "response_interceptors",
    cardinality: SlotCardinality::Sequence,
    populated: enrich::count_response_interceptors,
    apply: enrich::apply_response_interceptors,
};

const ENCODER: SlotDescriptor = SlotDescriptor {
    name: "encoder",
    cardinality: SlotCardinality::Single,
    populated: enrich::count_encoder,
    apply: enrich::apply_encoder,
};

const DECODER: SlotDescriptor = SlotDescriptor {
    name: "decoder",
    cardinality: SlotCardinality::Single,
    populated: enrich::count_decoder,
    apply: enrich::apply_decoder,
};

const ERROR_DECODER: SlotDescriptor = SlotDescriptor {
    name: "error_decoder",
    cardinality: SlotCardinality::Single,
    populated: enrich::count_error_decoder,
    apply: enrich::apply_error_decoder,
};

const RETRY_POLICY: SlotDescriptor = SlotDescriptor {
    name: "retry_policy",
    cardinality: SlotCardinality::Single,
    populated: enrich::count_retry_policy,
    apply: enrich::apply_retry_policy,
};

const REQUEST_LOGGER: SlotDescriptor = SlotDescriptor {
    name: "request_logger",
    cardinality: SlotCardinality::Single,
    populated: enrich::count_request_logger,
    apply: enrich::apply_request_logger,
};

const CONTRACT: SlotDescriptor = SlotDescriptor {
    name: "contract",
    cardinality: SlotCardinality::Single,
    populated: enrich::count_contract,
    apply: enrich::apply_contract,
};

const QUERY_ENCODER: SlotDescriptor = SlotDescriptor {
    name: "query_encoder",
    cardinality: SlotCardinality::Single,
    populated: enrich::count_query_encoder,
    apply: enrich::apply_query_encoder,
};

const TARGET_RESOLVER: SlotDescriptor = SlotDescriptor {
    name: "target_resolver",
    cardinality: SlotCardinality::Single,
    populated: enrich::count_target_resolver,
    apply: enrich::apply_target_resolver,
};

const HEADER_PROVIDER: SlotDescriptor = SlotDescriptor {
    name: "header_provider",
    cardinality: SlotCardinality::Single,
    populated: enrich::count_header_provider,
    apply: enrich::apply_header_provider,
};

const TRANSPORT: SlotDescriptor = SlotDescriptor {
    name: "transport",
    cardinality: SlotCardinality::Single,
    populated: enrich::count_transport,
    apply: enrich::apply_transport,
};

const CONTEXT_SUPPLIER: SlotDescriptor = SlotDescriptor {
    name: "context_supplier",
    cardinality: SlotCardinality::Single,
    populated: enrich::count_context_supplier,
    apply: enrich::apply_context_supplier,
};

const COMPLETION_ADAPTER: SlotDescriptor = SlotDescriptor {
    name: "completion_adapter",
    cardinality: SlotCardinality::Single,
    populated: enrich::count_completion_adapter,
    apply: enrich::apply_completion_adapter,
};

static BLOCKING_SLOTS: [SlotDescriptor; BLOCKING_SLOT_COUNT] = [
    REQUEST_INTERCEPTORS,
    RESPONSE_INTERCEPTORS,
    ENCODER,
    DECODER,
    ERROR_DECODER,
    RETRY_POLICY,
    REQUEST_LOGGER,
    CONTRACT,
    QUERY_ENCODER,
    TARGET_RESOLVER,
    HEADER_PROVIDER,
    TRANSPORT,
];

static ASYNC_SLOTS: [SlotDescriptor; ASYNC_SLOT_COUNT] = [
    REQUEST_INTERCEPTORS,
    RESPONSE_INTERCEPTORS,
    ENCODER,
    DECODER,
    ERROR_DECODER,
    RETRY_POLICY,
    REQUEST_LOGGER,
    CONTRACT,
    QUERY_ENCODER,
    TARGET_RESOLVER,
    HEADER_PROVIDER,
    TRANSPORT,
    CONTEXT_SUPPLIER,
    COMPLETION_ADAPTER,
];

/// The ordered slot descriptor table for `variant`.
///
/// Deterministic: repeated calls return the same `'static` table, so length
/// and slot identities are stable across queries.
#[inline]
#[must_use]
pub fn slots_to_enrich(variant: BuilderVariant) -> &'static [SlotDescriptor] {
    match variant {
        BuilderVariant::Blocking => &BLOCKING_SLOTS,
        BuilderVariant::Async => &ASYNC_SLOTS,
    }
}

/// Serializable summary of the registry for `variant`.
#[must_use]
pub fn slot_manifest(variant: BuilderVariant) -> Vec<SlotInfo> {
    slots_to_enrich(variant)
        .iter()
        .map(|descriptor| SlotInfo {
            name: descriptor.name,
            cardinality: descriptor.cardinality,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn blocking_registry_cardinality() {
        assert_eq!(slots_to_enrich(BuilderVariant::Blocking).len(), 12);
    }

    #[test]
    fn async_registry_cardinality() {
        assert_eq!(slots_to_enrich(BuilderVariant::Async).len(), 14);
    }

    #[test]
    fn registry_is_stable_across_queries() {
        let first = slots_to_enrich(BuilderVariant::Async);
        let second = slots_to_enrich(BuilderVariant::Async);

        assert!(std::ptr::eq(first.as_ptr(), second.as_ptr()));
        let names: Vec<_> = first.iter().map(|d| d.name).collect();
        let again: Vec<_> = second.iter().map(|d| d.name).collect();
        assert_eq!(names, again);
    }

    #[test]
    fn async_extends_blocking_with_same_prefix() {
        let blocking: Vec<_> = slots_to_enrich(BuilderVariant::Blocking)
            .iter()
            .map(|d| d.name)
            .collect();
        let extended: Vec<_> = slots_to_enrich(BuilderVariant::Async)
            .iter()
            .map(|d| d.name)
            .collect();

        assert_eq!(&extended[..blocking.len()], blocking.as_slice());
        assert_eq!(
            &extended[blocking.len()..],
            &["context_supplier", "completion_adapter"]
        );
    }

    #[test]
    fn slot_names_are_unique() {
        let names: HashSet<_> = slots_to_enrich(BuilderVariant::Async)
            .iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names.len(), ASYNC_SLOT_COUNT);
    }

    #[test]
    fn sequence_slots_are_the_interceptor_slots() {
        for descriptor in slots_to_enrich(BuilderVariant::Async) {
            let expected = matches!(
                descriptor.name,
                "request_interceptors" | "response_interceptors"
            );
            assert_eq!(
                descriptor.cardinality == SlotCardinality::Sequence,
                expected,
                "unexpected cardinality for {}",
                descriptor.name
            );
        }
    }

    #[test]
    fn manifest_matches_registry_order() {
        let manifest = slot_manifest(BuilderVariant::Blocking);
        assert_eq!(manifest.len(), BLOCKING_SLOT_COUNT);
        assert_eq!(manifest[0].name, "request_interceptors");
        assert_eq!(manifest[0].cardinality, SlotCardinality::Sequence);
        assert_eq!(manifest[11].name, "transport");
    }
}
