//! End-to-end tests for the factory, advance and share token contracts.
//!
//! The factory deploys advances from uploaded wasm, so these tests need the
//! advance contract built first (`stellar contract build`). A missing build
//! fails the tests.

use std::path::PathBuf;

pub use advance;
pub use advance_common;
pub use advance_factory;
pub use share_token;

const WASM_TARGETS: [&str; 2] = ["wasm32v1-none", "wasm32-unknown-unknown"];

/// Build output of the advance contract
///
/// # Panics
/// When no wasm target directory holds `advance.wasm`.
pub fn advance_wasm() -> Vec<u8> {
    let target_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target");

    WASM_TARGETS
        .iter()
        .map(|target| target_dir.join(target).join("release/advance.wasm"))
        .find_map(|path| std::fs::read(path).ok())
        .unwrap_or_else(|| {
            panic!(
                "advance.wasm not found under {}; run `stellar contract build` first",
                target_dir.display()
            )
        })
}
