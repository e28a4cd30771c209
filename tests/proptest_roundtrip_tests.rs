//! Property-based tests for chain conversions
//!
//! These tests use proptest to generate random argument lists and verify that:
//! 1. Converting a chain to closures and back reproduces it exactly
//! 2. Name vectors are absent exactly when no argument is named
//! 3. Concatenation preserves length, order and the shared tail
//! 4. Injecting bindings and extracting them again is lossless
//! 5. The reader never panics on arbitrary input

use lazydots::{
    cells_to_chain, chain_to_cells, chain_to_closures, closures_to_chain, concat,
    extract_from_scope, inject_into_scope, names_of, read, read_all, Chain, ChainKind,
    Environment, Error, ExtractOptions, Promise, ScopeId, Slot, Symbol, Value, MAX_READ_DEPTH,
};
use proptest::prelude::*;

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

/// Shape of a generated argument slot
#[derive(Debug, Clone)]
enum ArgSpec {
    Unforced(i64),
    Forced(i64, i64),
    Detached(i64),
    Missing,
}

fn arg_spec() -> impl Strategy<Value = ArgSpec> {
    prop_oneof![
        (-100i64..100).prop_map(ArgSpec::Unforced),
        (-100i64..100, -100i64..100).prop_map(|(e, v)| ArgSpec::Forced(e, v)),
        (-100i64..100).prop_map(ArgSpec::Detached),
        Just(ArgSpec::Missing),
    ]
}

fn arg_name() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        "[a-z][a-z0-9_]{0,6}".prop_map(Some),
    ]
}

/// A blank name leaves the argument unnamed
fn is_named(name: &Option<String>) -> bool {
    name.as_deref().map_or(false, |n| !n.is_empty())
}

fn arg_list() -> impl Strategy<Value = Vec<(Option<String>, ArgSpec)>> {
    prop::collection::vec((arg_name(), arg_spec()), 0..20)
}

fn expr_for(n: i64) -> Value {
    Value::call(Value::symbol("f"), vec![Value::symbol("x"), Value::Int(n)])
}

fn slot_for(spec: &ArgSpec, scope: ScopeId) -> Slot {
    match spec {
        ArgSpec::Unforced(e) => Slot::Deferred(Promise::new(expr_for(*e), scope)),
        ArgSpec::Forced(e, v) => {
            Slot::Deferred(Promise::forced(expr_for(*e), Some(scope), Value::Int(*v)))
        }
        ArgSpec::Detached(v) => Slot::Deferred(Promise::detach(Value::Int(*v))),
        ArgSpec::Missing => Slot::Missing,
    }
}

fn build_chain(args: &[(Option<String>, ArgSpec)], scope: ScopeId) -> Chain {
    Chain::from_entries(
        ChainKind::Dots,
        args.iter()
            .map(|(name, spec)| (name.as_deref().map(Symbol::new), slot_for(spec, scope)))
            .collect::<Vec<_>>(),
    )
}

// =============================================================================
// CONVERSION PROPERTIES
// =============================================================================

proptest! {
    /// Closure list conversion reproduces the chain
    #[test]
    fn closure_round_trip_is_identity(args in arg_list()) {
        let env = Environment::new();
        let chain = build_chain(&args, env.global());

        let back = closures_to_chain(&chain_to_closures(&chain));
        prop_assert_eq!(back.len(), args.len());
        prop_assert_eq!(names_of(&back), names_of(&chain));
        prop_assert_eq!(back, chain);
    }

    /// The cell view shares every cell with the chain
    #[test]
    fn cell_round_trip_shares_cells(args in arg_list()) {
        let env = Environment::new();
        let chain = build_chain(&args, env.global());

        let back = cells_to_chain(&chain_to_cells(&chain));
        for ((_, a), (_, b)) in chain.iter().zip(back.iter()) {
            match (a, b) {
                (Slot::Deferred(x), Slot::Deferred(y)) => prop_assert!(x.ptr_eq(y)),
                (Slot::Missing, Slot::Missing) => {}
                _ => prop_assert!(false, "slot shape changed"),
            }
        }
    }

    /// Names are absent exactly when nothing is named
    #[test]
    fn names_absent_iff_unnamed(args in arg_list()) {
        let env = Environment::new();
        let chain = build_chain(&args, env.global());

        match names_of(&chain) {
            None => prop_assert!(args.iter().all(|(name, _)| !is_named(name))),
            Some(names) => {
                prop_assert!(args.iter().any(|(name, _)| is_named(name)));
                let expected: Vec<String> = args
                    .iter()
                    .map(|(name, _)| name.clone().unwrap_or_default())
                    .collect();
                prop_assert_eq!(names, expected);
            }
        }
    }

    /// Concatenation keeps order and shares the second operand
    #[test]
    fn concat_preserves_order(a in arg_list(), b in arg_list()) {
        let env = Environment::new();
        let x = build_chain(&a, env.global());
        let y = build_chain(&b, env.global());

        let joined = concat(&x, &y).unwrap();
        prop_assert_eq!(joined.len(), a.len() + b.len());
        prop_assert!(joined.nth_tail(a.len()).ptr_eq(&y));
        prop_assert_eq!(joined.nth_tail(a.len()), y.clone());

        let prefix: Vec<_> = joined.iter().take(a.len()).collect();
        let original: Vec<_> = x.iter().collect();
        prop_assert_eq!(prefix, original);
    }
}

// =============================================================================
// SCOPE PROPERTIES
// =============================================================================

proptest! {
    /// Bindings injected into a scope can be extracted unchanged
    #[test]
    fn inject_then_extract_is_lossless(values in prop::collection::vec(-1000i64..1000, 1..15)) {
        let mut env = Environment::new();
        let scope = env.new_scope(env.global()).unwrap();
        let names: Vec<String> = (0..values.len()).map(|i| format!("v{}", i)).collect();

        let chain = Chain::from_entries(
            ChainKind::Dots,
            names
                .iter()
                .zip(&values)
                .map(|(name, v)| {
                    (Some(Symbol::new(name)), Slot::Deferred(Promise::detach(Value::Int(*v))))
                })
                .collect::<Vec<_>>(),
        );
        inject_into_scope(&mut env, Some(&chain), scope, None).unwrap();

        let closures = extract_from_scope(&env, scope, &names, &ExtractOptions::default()).unwrap();
        prop_assert_eq!(closures.names().unwrap(), &names[..]);
        let extracted: Vec<i64> = closures
            .values()
            .iter()
            .map(|c| match c.value() {
                Some(Value::Int(n)) => *n,
                _ => i64::MIN,
            })
            .collect();
        prop_assert_eq!(extracted, values);
    }
}

// =============================================================================
// READER
// =============================================================================

proptest! {
    /// The reader returns a result for arbitrary input
    #[test]
    fn reader_never_panics(source in "[ -~\n]{0,200}") {
        let _ = read_all(&source);
    }

    /// Nesting past the limit is an error, never a crash
    #[test]
    fn reader_rejects_excessive_nesting(
        extra in 0usize..2000,
        open in prop::sample::select(vec!["(", "[", "'"]),
    ) {
        let source = open.repeat(MAX_READ_DEPTH + 1 + extra);
        prop_assert!(matches!(read(&source), Err(Error::ParseError(_))));
    }

    /// Nested calls read back with the same depth
    #[test]
    fn reader_handles_deep_nesting(depth in 1usize..MAX_READ_DEPTH) {
        let source = format!("{}x{}", "(f ".repeat(depth), ")".repeat(depth));
        let exprs = read_all(&source).unwrap();
        prop_assert_eq!(exprs.len(), 1);

        let mut current = &exprs[0];
        let mut seen = 0;
        while let Value::Call(items) = current {
            seen += 1;
            current = &items[1];
        }
        prop_assert_eq!(seen, depth);
    }
}

#[test]
fn regression_empty_chain_round_trip() {
    let empty = Chain::empty_dots();
    let back = closures_to_chain(&chain_to_closures(&empty));
    assert!(back.is_dots());
    assert!(back.is_empty());
    assert_eq!(names_of(&back), None);
}

#[test]
fn regression_very_deep_nesting() {
    let result = read_all(&"(".repeat(200_000));
    assert!(matches!(result, Err(Error::ParseError(_))));
}
