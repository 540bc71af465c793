//! Persist a preferences struct to a JSON file and watch it change.
//!
//! Run twice to see the saved values come back:
//!
//! ```sh
//! RUST_LOG=keepsake=debug cargo run --example preferences
//! ```

use keepsake::{FileStore, Persisted};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Preferences {
    theme: String,
    font_size: u32,
    launches: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            font_size: 14,
            launches: 0,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::temp_dir().join("keepsake-demo").join("preferences.json");
    println!("=== Preferences stored in {} ===\n", path.display());

    let prefs = Persisted::new(FileStore::new(&path), "preferences", Preferences::default());
    println!("Loaded: {:?}", prefs.get());

    let _sub = prefs.subscribe(|p| {
        println!("  -> changed: theme={}, font_size={}", p.theme, p.font_size);
    });

    prefs.modify(|p| p.launches += 1);
    prefs.modify(|p| {
        p.theme = if p.theme == "light" { "dark" } else { "light" }.to_string();
    });

    println!("\nSaved: {:?}", prefs.get());
    println!("Run again to see launches = {}", prefs.with(|p| p.launches + 1));
}
