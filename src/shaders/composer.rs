// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::{HashMap, HashSet};

use crate::error::AccumError;

/// Modules compiled into the binary, keyed by import name.
const EMBEDDED_MODULES: &[(&str, &str)] = &[
    ("bindings", include_str!("wgsl/bindings.wgsl")),
    ("prng", include_str!("wgsl/prng.wgsl")),
    ("scene", include_str!("wgsl/scene.wgsl")),
    ("accumulate", include_str!("wgsl/accumulate.wgsl")),
];

pub const ACCUMULATE_ENTRY: &str = "accumulate";

/// WGSL composer that resolves `// #import module_name` directives.
///
/// Imports are emitted before the importing module, each module at most once.
#[derive(Default)]
pub struct ShaderComposer {
    modules: HashMap<String, String>,
}

impl ShaderComposer {
    pub fn embedded() -> Self {
        let mut composer = Self::default();
        for &(name, source) in EMBEDDED_MODULES {
            composer.register(name, source);
        }
        composer
    }

    pub fn register(&mut self, name: &str, source: &str) {
        self.modules.insert(name.to_string(), source.to_string());
    }

    /// Compose a shader by resolving all imports recursively.
    pub fn compose(&self, entry_module: &str) -> Result<String, AccumError> {
        let mut output = String::new();
        let mut visited = HashSet::new();
        self.resolve(entry_module, &mut output, &mut visited)?;
        Ok(output)
    }

    fn resolve(
        &self,
        module_name: &str,
        output: &mut String,
        visited: &mut HashSet<String>,
    ) -> Result<(), AccumError> {
        if !visited.insert(module_name.to_string()) {
            return Ok(());
        }

        let source = self.modules.get(module_name).ok_or_else(|| {
            AccumError::MissingResource(format!("shader module not found: {module_name}"))
        })?;

        let mut body = String::new();
        for line in source.lines() {
            if let Some(import_name) = line.trim().strip_prefix("// #import ") {
                self.resolve(import_name.trim(), output, visited)?;
            } else {
                body.push_str(line);
                body.push('\n');
            }
        }
        output.push_str(&body);
        output.push('\n');

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_composer(entries: &[(&str, &str)]) -> ShaderComposer {
        let mut composer = ShaderComposer::default();
        for &(name, src) in entries {
            composer.register(name, src);
        }
        composer
    }

    #[test]
    fn test_import_resolution() {
        let composer = make_composer(&[
            ("prng", "fn next() -> u32 { return 1u; }"),
            ("main", "// #import prng\nfn main() { let x = next(); }"),
        ]);

        let result = composer.compose("main").unwrap();
        assert!(result.find("fn next()").unwrap() < result.find("fn main()").unwrap());
        assert!(!result.contains("#import"));
    }

    #[test]
    fn test_deduplication() {
        let composer = make_composer(&[
            ("base", "fn base_fn() {}"),
            ("a", "// #import base\nfn a_fn() {}"),
            ("b", "// #import base\nfn b_fn() {}"),
            ("main", "// #import a\n// #import b\nfn main_fn() {}"),
        ]);

        let result = composer.compose("main").unwrap();
        assert_eq!(result.matches("fn base_fn()").count(), 1);
    }

    #[test]
    fn test_missing_module_is_missing_resource() {
        let composer = make_composer(&[("main", "// #import nowhere\nfn main() {}")]);
        assert!(matches!(
            composer.compose("main"),
            Err(AccumError::MissingResource(_))
        ));
    }

    #[test]
    fn test_embedded_entry_composes() {
        let source = ShaderComposer::embedded().compose(ACCUMULATE_ENTRY).unwrap();
        assert!(source.contains("fn prng_next"));
        assert!(source.contains("@compute"));
        assert_eq!(source.matches("struct FrameParams").count(), 1);
    }
}
