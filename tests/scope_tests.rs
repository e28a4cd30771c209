//! Tests for moving bindings between scopes and variadic chains

use lazydots::{
    closures_to_chain, extract_from_scope, get_dots, inject_into_scope, literals_to_chain,
    Chain, ChainBuilder, Closure, Environment, Error, ExtractOptions, IndexedSequence, Promise,
    ScopeId, Slot, Symbol, Value,
};

/// Scope with `a = 1` (forced literal), `... = (x = 10, y = 20)`, and `b` missing
fn example_scope() -> (Environment, ScopeId) {
    let mut env = Environment::new();
    let global = env.global();
    let scope = env.new_scope(global).unwrap();

    env.define(scope, "a", Value::Promise(Promise::detach(Value::Int(1)))).unwrap();

    let mut dots = ChainBuilder::dots();
    dots.append(
        Some(Symbol::new("x")),
        Slot::Deferred(Promise::detach(Value::Int(10))),
    )
    .append(
        Some(Symbol::new("y")),
        Slot::Deferred(Promise::detach(Value::Int(20))),
    );
    env.define(scope, "...", Value::Pairlist(dots.finish())).unwrap();
    env.define(scope, "b", Value::Missing).unwrap();

    (env, scope)
}

#[test]
fn test_extract_skips_missing() {
    let (env, scope) = example_scope();
    let options = ExtractOptions {
        include_missing: false,
        expand_variadic: true,
        ..ExtractOptions::default()
    };

    let closures = extract_from_scope(&env, scope, &["a", "...", "b"], &options).unwrap();
    assert_eq!(closures.names().unwrap(), &["a", "x", "y"]);
    assert_eq!(
        closures.values(),
        &[
            Closure::literal(Value::Int(1)),
            Closure::literal(Value::Int(10)),
            Closure::literal(Value::Int(20)),
        ]
    );
}

#[test]
fn test_extract_includes_missing() {
    let (env, scope) = example_scope();
    let options = ExtractOptions {
        include_missing: true,
        expand_variadic: true,
        ..ExtractOptions::default()
    };

    let closures = extract_from_scope(&env, scope, &["a", "...", "b"], &options).unwrap();
    assert_eq!(closures.names().unwrap(), &["a", "x", "y", "b"]);
    assert!(closures.get(3).unwrap().is_empty());

    let chain = closures_to_chain(&closures);
    assert!(chain.iter().nth(3).unwrap().1.is_missing());
}

#[test]
fn test_extract_searches_enclosing_scopes() {
    let (mut env, scope) = example_scope();
    let inner = env.new_scope(scope).unwrap();

    let closures = extract_from_scope(&env, inner, &["a"], &ExtractOptions::default()).unwrap();
    assert_eq!(closures.len(), 1);
}

#[test]
fn test_extract_missing_dots_contributes_nothing() {
    let mut env = Environment::new();
    let global = env.global();
    env.define(global, "...", Value::Missing).unwrap();
    let options = ExtractOptions {
        include_missing: true,
        ..ExtractOptions::default()
    };

    let closures = extract_from_scope(&env, global, &["..."], &options).unwrap();
    assert!(closures.is_empty());
}

#[test]
fn test_extract_from_released_scope_fails() {
    let (mut env, scope) = example_scope();
    env.release(scope).unwrap();
    let err = extract_from_scope(&env, scope, &["a"], &ExtractOptions::default()).unwrap_err();
    assert_eq!(err, Error::type_error("scope", "released scope"));
}

#[test]
fn test_extract_then_inject_moves_bindings() {
    let (mut env, scope) = example_scope();
    let closures =
        extract_from_scope(&env, scope, &["a", "..."], &ExtractOptions::default()).unwrap();
    let chain = closures_to_chain(&closures);

    let target = env.new_scope(env.global()).unwrap();
    inject_into_scope(&mut env, Some(&chain), target, None).unwrap();

    assert_eq!(env.local_names(target).unwrap(), vec!["a", "x", "y"]);
    match env.get(target, "y").unwrap() {
        Value::Promise(p) => assert_eq!(p.value().unwrap(), Value::Int(20)),
        other => panic!("expected a promise, got {}", other),
    }
}

#[test]
fn test_inject_failure_leaves_no_partial_bindings() {
    let mut env = Environment::new();
    let global = env.global();
    let chain = literals_to_chain(&IndexedSequence::from_pairs(vec![
        (Some("first".to_string()), Value::Int(1)),
        (None, Value::Int(2)),
    ]));
    let extra = literals_to_chain(&IndexedSequence::new(vec![Value::Int(3)]));

    let err = inject_into_scope(&mut env, Some(&chain), global, Some(&extra)).unwrap_err();
    assert_eq!(err, Error::UnnamedBinding { position: 1 });
    assert!(env.local_names(global).unwrap().is_empty());
}

#[test]
fn test_inject_appends_extra_to_existing_dots() {
    let (mut env, scope) = example_scope();
    let extra = literals_to_chain(&IndexedSequence::new(vec![Value::Int(30)]));
    let bindings = literals_to_chain(&IndexedSequence::from_pairs(vec![(
        Some("a".to_string()),
        Value::Int(2),
    )]));

    inject_into_scope(&mut env, Some(&bindings), scope, Some(&extra)).unwrap();

    let dots = get_dots(&env, scope).unwrap().unwrap();
    assert_eq!(dots.len(), 3);
    assert!(dots.nth_tail(2).ptr_eq(&extra));
    assert_eq!(
        env.get(scope, "a").unwrap(),
        Value::Promise(Promise::detach(Value::Int(2)))
    );
}

#[test]
fn test_inject_nothing_is_a_no_op() {
    let mut env = Environment::new();
    let global = env.global();
    inject_into_scope(&mut env, None, global, None).unwrap();
    inject_into_scope(&mut env, Some(&Chain::empty_dots()), global, None).unwrap();
    assert!(env.local_names(global).unwrap().is_empty());
}
