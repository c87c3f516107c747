//! Writes the frontend TypeScript bindings.
//!
//! Usage: generate-bindings [output path]

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "../src/lib/bindings.ts".to_string());
    questrunner_lib::export_bindings(&path)?;
    println!("Wrote bindings to {}", path);
    Ok(())
}
