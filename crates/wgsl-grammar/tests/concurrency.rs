//! Parses many sources concurrently.
//!
//! Each parse owns all of its state; the only shared state is the read-only
//! reserved word table, so parallel parses must agree with sequential ones.

use pretty_assertions::assert_eq;
use rayon::prelude::*;
use wgsl_grammar::parse;
use wgsl_grammar::sexpr;

/// Parses a source into its tree and diagnostic messages.
fn render(source: &str) -> (String, Vec<String>) {
    let (unit, diagnostics) = parse(source);
    (
        unit.as_ref()
            .map(sexpr::translation_unit)
            .unwrap_or_default(),
        diagnostics.iter().map(ToString::to_string).collect(),
    )
}

#[test]
fn parallel_parses_match_sequential_parses() {
    let sources: Vec<String> = (0..512)
        .map(|i| {
            let mut source = format!(
                "const c{i} = vec{n}<f32>({i}.0);\nfn f{i}(x: i32) -> i32 {{ return x << {i}u; }}\n",
                n = 2 + i % 3
            );

            // Every third source has errors
            if i % 3 == 0 {
                source.push_str("var impl: i32;\nconst d = a < b;\nconst e = x < y\n");
            }

            source
        })
        .collect();

    let sequential: Vec<_> = sources.iter().map(|s| render(s)).collect();
    let parallel: Vec<_> = sources.par_iter().map(|s| render(s)).collect();
    assert_eq!(sequential, parallel);

    let (tree, diagnostics) = &parallel[1];
    assert!(diagnostics.is_empty());
    assert_eq!(
        tree,
        "(const c1 (init (call (vec3 (template f32)) 1.0)))\n(fn f1 (param x i32) (returns i32) \
         (block (return (<< x 1u))))\n"
    );

    let (_, diagnostics) = &parallel[0];
    assert_eq!(
        diagnostics,
        &[
            "3:5: `impl` is a reserved word and cannot be used as an identifier",
            "5:13: unable to determine whether `<` starts a template list before the end of input",
        ]
    );
}
