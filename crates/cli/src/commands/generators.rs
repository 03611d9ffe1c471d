//! `apisurf generators`: list the registry.

use apisurf_core::GeneratorRegistry;
use console::style;

/// Print every registered generator with its formats and versions.
pub fn run(registry: &GeneratorRegistry) -> i32 {
    for name in registry.names() {
        let Ok(generator) = registry.get(name) else {
            continue;
        };
        let formats: Vec<&str> = generator.formats().iter().map(|f| f.as_str()).collect();
        println!(
            "{:<12} {}",
            style(name).bold(),
            generator.description()
        );
        println!(
            "{:<12} versions: {}; formats: {}",
            "",
            generator.versions().join(", "),
            formats.join(", ")
        );
    }
    0
}
