//! Version-gated primop registration

use crate::capability::Capability;
use crate::engine::DocEngine;
use crate::primops::{prim_get_doc, prim_print_doc, prim_unsafe_get_lambda_pos};
use lambdoc_host::{Layout, RegisterPrimOp};
use tracing::{debug, warn};

/// Primop names, in registration order
pub const PRIMOPS: [&str; 3] = ["__getDoc", "__doc", "__unsafeGetLambdaPos"];

/// Host version the plugin was built against.
///
/// `LAMBDOC_BUILD_HOST_VERSION` at build time overrides the version declared
/// by the capability.
pub fn built_against<C: Capability>() -> &'static str {
    option_env!("LAMBDOC_BUILD_HOST_VERSION").unwrap_or(C::HOST_VERSION)
}

/// Exact match between the build-time and the live host version
pub fn host_version_matches<C: Capability>(live: &str) -> bool {
    built_against::<C>() == live
}

/// Build the primop descriptors for a host reporting version `live`.
///
/// On a version mismatch nothing is registered and a single warning is
/// emitted.
pub fn register_primops<C: Capability, E: DocEngine>(live: &str) -> Vec<RegisterPrimOp<C::Layout>> {
    if !host_version_matches::<C>(live) {
        warn!(
            built = built_against::<C>(),
            host = live,
            "mismatched host version, not loading"
        );
        return Vec::new();
    }

    let ops = vec![
        C::register_primitive(
            PRIMOPS[0],
            &["func"],
            "Get the textual docs for a function",
            prim_get_doc::<C, E>,
        ),
        C::register_primitive(
            PRIMOPS[1],
            &["func"],
            "Print the docs for a function",
            prim_print_doc::<C, E>,
        ),
        C::register_primitive(
            PRIMOPS[2],
            &["func"],
            "Get the position of some lambda",
            prim_unsafe_get_lambda_pos::<C>,
        ),
    ];
    debug!(
        host = live,
        layout = <C::Layout as Layout>::NAME,
        count = ops.len(),
        "registered primops"
    );
    ops
}
