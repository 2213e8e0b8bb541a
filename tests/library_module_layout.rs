use std::fs;
use std::path::Path;

#[test]
fn lib_root_exports_flow_orchestration_modules() {
    let lib_rs = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/lib.rs");
    let source = fs::read_to_string(&lib_rs).expect("read src/lib.rs");

    for module in [
        "config",
        "events",
        "flow",
        "navigation",
        "pager",
        "registry",
        "shared",
    ] {
        assert!(
            source.contains(&format!("pub mod {module};")),
            "src/lib.rs is missing `pub mod {module};`"
        );
    }
}

#[test]
fn library_modules_do_not_panic_on_missing_values() {
    let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut pending = vec![src];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).expect("read src dir") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            let source = fs::read_to_string(&path).expect("read source");
            let library_part = source.split("#[cfg(test)]").next().unwrap_or_default();
            assert!(
                !library_part.contains(".unwrap()") && !library_part.contains(".expect("),
                "{} unwraps outside tests",
                path.display()
            );
        }
    }
}
