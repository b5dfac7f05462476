//! Binary entrypoint for the browser-hosted gadget demo.

#[cfg(all(target_arch = "wasm32", feature = "csr"))]
fn main() {
    gadget_demo::mount();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!(
        "This binary is intended for the browser/WASM workflow. Build `gadget_demo_app` for wasm32 with the `csr` feature and load it inside a player or standalone for preview mode."
    );
}
