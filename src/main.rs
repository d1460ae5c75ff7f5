#[cfg(not(target_arch = "wasm32"))]
fn load_dotenv() {
    // A local .env wins over the bundled config (desktop dev)
    if let Err(err) = dotenvy::dotenv() {
        tracing::debug!("no .env loaded: {}", err);
    }
}

#[cfg(target_arch = "wasm32")]
fn load_dotenv() {}

fn main() {
    twin::logging::init_tracing();
    load_dotenv();
    dioxus::launch(twin::ui::App);
}
