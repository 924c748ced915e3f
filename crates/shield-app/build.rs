//! Embeds the workspace `VERSION` file as `SHIELD_VERSION`.

use std::path::Path;

fn main() {
    let version_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("crate lives two levels below the workspace root")
        .join("VERSION");
    println!("cargo:rerun-if-changed={}", version_path.display());

    let raw = std::fs::read_to_string(&version_path)
        .unwrap_or_else(|error| panic!("cannot read {}: {error}", version_path.display()));
    let version = raw.trim();
    assert!(
        !version.is_empty()
            && version
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '+')),
        "VERSION must hold a single non-empty version string, found {version:?}"
    );

    println!("cargo:rustc-env=SHIELD_VERSION={version}");
}
