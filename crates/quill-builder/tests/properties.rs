//! Property tests over capability counts and sequence lengths.

use proptest::prelude::*;
use quill_builder::extension::Encoder;
use quill_builder::{BuilderVariant, ClientBuilder};
use quill_test_utils::{
    IdentityEncoder, InstrumentingCapability, NoopRequestInterceptor, NoopResponseInterceptor,
    SpyEncoder, SpyRequestInterceptor,
};

proptest! {
    /// Enrichment preserves sequence lengths exactly, for any capability
    /// count, and wraps elements exactly when at least one capability is
    /// registered.
    #[test]
    fn sequence_lengths_are_preserved(
        requests in 0usize..8,
        responses in 0usize..8,
        capabilities in 0usize..4,
    ) {
        let builder = ClientBuilder::blocking();
        for _ in 0..requests {
            builder.request_interceptor(NoopRequestInterceptor);
        }
        for _ in 0..responses {
            builder.response_interceptor(NoopResponseInterceptor);
        }
        for index in 0..capabilities {
            builder.add_capability(InstrumentingCapability::new(format!("cap-{index}")));
        }

        let enriched = builder.enrich().unwrap();

        prop_assert_eq!(enriched.request_interceptors().len(), requests);
        prop_assert_eq!(enriched.response_interceptors().len(), responses);

        for interceptor in enriched.request_interceptors() {
            let wrapped = interceptor
                .as_ref()
                .as_any()
                .downcast_ref::<SpyRequestInterceptor>()
                .is_some();
            prop_assert_eq!(wrapped, capabilities > 0);
        }
    }

    /// A single-valued slot ends up wrapped exactly once per registered
    /// capability, innermost-first, with the original value at the center.
    #[test]
    fn wrap_depth_matches_capability_count(capabilities in 0usize..4) {
        let builder = ClientBuilder::asynchronous();
        builder.encoder(IdentityEncoder);
        for index in 0..capabilities {
            builder.add_capability(InstrumentingCapability::new(format!("cap-{index}")));
        }

        let enriched = builder.enrich().unwrap();

        let mut depth = 0;
        let mut current: &dyn Encoder = enriched.encoder().unwrap().as_ref();
        while let Some(spy) = current.as_any().downcast_ref::<SpyEncoder>() {
            prop_assert_eq!(spy.label.as_str(), format!("cap-{}", capabilities - 1 - depth));
            current = spy.inner.as_ref();
            depth += 1;
        }

        prop_assert_eq!(depth, capabilities);
        prop_assert!(current.as_any().downcast_ref::<IdentityEncoder>().is_some());
    }

    /// The registry is total: every slot reported by `slots_to_enrich` is
    /// reachable through `slot_population`, for both variants.
    #[test]
    fn population_always_covers_the_registry(extended in any::<bool>()) {
        let variant = if extended {
            BuilderVariant::Async
        } else {
            BuilderVariant::Blocking
        };
        let builder = ClientBuilder::new(variant);

        let population = builder.slot_population();
        prop_assert_eq!(population.len(), builder.slots_to_enrich().len());
        prop_assert!(population.iter().all(|(_, count)| *count == 0));
    }
}
