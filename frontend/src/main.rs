//! Entry point for the WASM application

pub fn main() {
    upscale_frontend::start();
}
