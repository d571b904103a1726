//! End-to-end `case/in` behavior, driven through `ExprTable`.
//!
//! Each test builds the pattern tree a parser would produce for the Ruby
//! snippet in its doc comment.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use casein_eval::{
    ArrayPattern, CaseArm, CaseEvaluator, CaseExpr, CaseHost, EvalErrorKind, EvalResult,
    Environment, ExprTable, Guard, HashPattern, HashRest, KeysCachePolicy, MatchPattern,
    OneLineMatch, Splat, Value, ValueRef,
};
use casein_ir::{ExprId, ExternalRef, Name, SharedInterner, StringInterner};
use casein_patterns::{
    BuiltinClass, ClassRef, Deconstructed, EvalError, HashValue, Heap, ObjectValue, RangeValue,
};
use pretty_assertions::assert_eq;

fn lit(n: i64) -> MatchPattern {
    MatchPattern::Literal(Value::int(n))
}

fn ints(items: &[i64]) -> Value {
    items.iter().copied().map(Value::int).collect()
}

fn class(builtin: BuiltinClass) -> Value {
    Value::class(builtin)
}

/// `case <scrutinee> in <arm> then true ... else false end`
fn matches_any(table: &mut ExprTable<'_>, scrutinee: Value, patterns: Vec<MatchPattern>) -> bool {
    let interner = table.interner().clone();
    let scrutinee = table.value(scrutinee);
    let yes = table.value(Value::Bool(true));
    let no = table.value(Value::Bool(false));
    let arms = patterns.into_iter().map(|p| CaseArm::new(p, yes)).collect();
    let case = CaseExpr::new(scrutinee, arms).with_else(no);
    CaseEvaluator::new(&interner, &*table)
        .eval_case(&case, &mut Environment::new())
        .unwrap()
        .is_truthy()
}

// Basic dispatch

/// ```ruby
/// case [0, 1]
/// in [a, 2] then :first
/// in [0, b] then b
/// end
/// ```
#[test]
fn binds_variables_and_keeps_them_after_case() {
    let interner = SharedInterner::default();
    let (a, b) = (interner.intern("a"), interner.intern("b"));
    let mut table = ExprTable::new(interner.clone());
    let scrutinee = table.value(ints(&[0, 1]));
    let first = table.value(Value::symbol(interner.intern("first")));
    let read_b = table.variable(b);
    let case = CaseExpr::new(
        scrutinee,
        vec![
            CaseArm::new(
                ArrayPattern::exact(vec![MatchPattern::binding(a), lit(2)]).into(),
                first,
            ),
            CaseArm::new(
                ArrayPattern::exact(vec![lit(0), MatchPattern::binding(b)]).into(),
                read_b,
            ),
        ],
    );

    let mut env = Environment::new();
    let result = CaseEvaluator::new(&interner, &table).eval_case(&case, &mut env);
    assert_eq!(result, Ok(Value::int(1)));
    assert_eq!(env.lookup(b), Some(Value::int(1)));
    // `a` exists even though its arm failed.
    assert_eq!(env.lookup(a), Some(Value::Nil));
}

/// ```ruby
/// case {k: "v"}
/// in 1 then nil
/// end  # => NoMatchingPatternError ({k: "v"})
/// ```
#[test]
fn raises_no_matching_pattern_with_inspected_value() {
    let interner = SharedInterner::default();
    let k = interner.intern("k");
    let mut table = ExprTable::new(interner.clone());
    let scrutinee = table.value(Value::symbol_hash([(k, Value::string("v"))]));
    let body = table.value(Value::Nil);
    let case = CaseExpr::new(scrutinee, vec![CaseArm::new(lit(1), body)]);

    let err = CaseEvaluator::new(&interner, &table)
        .eval_case(&case, &mut Environment::new())
        .unwrap_err();
    assert_eq!(err.kind.name(), "NoMatchingPatternError");
    assert_eq!(err.message, "{k: \"v\"}");
}

/// ```ruby
/// case 0
/// in 0 if false then :guarded
/// in 0 unless false then :negated
/// end
/// ```
#[test]
fn takes_guards_into_account_across_matching_arms() {
    let guard_calls = Cell::new(0);
    let interner = SharedInterner::default();
    let mut table = ExprTable::new(interner.clone());
    let scrutinee = table.value(Value::int(0));
    let falsy = table.register(|_| {
        guard_calls.set(guard_calls.get() + 1);
        Ok(Value::Bool(false))
    });
    let guarded = table.value(Value::string("guarded"));
    let negated = table.value(Value::string("negated"));
    let case = CaseExpr::new(
        scrutinee,
        vec![
            CaseArm::new(lit(1), guarded).with_guard(Guard::when(falsy)),
            CaseArm::new(lit(0), guarded).with_guard(Guard::when(falsy)),
            CaseArm::new(lit(0), negated).with_guard(Guard::unless(falsy)),
        ],
    );

    let result = CaseEvaluator::new(&interner, &table).eval_case(&case, &mut Environment::new());
    assert_eq!(result, Ok(Value::string("negated")));
    // The first arm's pattern never matched, so its guard never ran.
    assert_eq!(guard_calls.get(), 2);
}

/// ```ruby
/// case 0
/// in Integer | String then true
/// in 0..1 then true
/// in ->(x) { x.zero? } then true
/// end
/// ```
#[test]
fn matches_by_case_equality() {
    let interner = SharedInterner::default();
    let mut table = ExprTable::new(interner.clone());

    let either = MatchPattern::Or(vec![
        MatchPattern::Literal(class(BuiltinClass::Integer)),
        MatchPattern::Literal(class(BuiltinClass::String)),
    ]);
    assert!(matches_any(&mut table, Value::string("s"), vec![either]));

    let range = MatchPattern::Literal(Value::range(RangeValue::inclusive(
        Value::int(0),
        Value::int(1),
    )));
    assert!(matches_any(&mut table, Value::int(1), vec![range.clone()]));
    assert!(!matches_any(&mut table, Value::int(2), vec![range]));

    let zero = MatchPattern::Literal(Value::predicate(|v| v.as_int() == Some(0)));
    assert!(matches_any(&mut table, Value::int(0), vec![zero]));

    let regex = MatchPattern::Literal(Value::try_regex("^ab").unwrap());
    assert!(matches_any(&mut table, Value::string("abc"), vec![regex.clone()]));
    let sym = Value::symbol(interner.intern("abc"));
    assert!(matches_any(&mut table, sym, vec![regex]));
}

// Pins

/// ```ruby
/// @a = 0; @@b = 1; $c = 2
/// case [0, 1, 2]
/// in [^@a, ^@@b, ^$c] then true
/// end
/// ```
#[test]
fn pins_instance_class_and_global_variables() {
    let interner = SharedInterner::default();
    let (a, b, c) = (
        ExternalRef::instance(interner.intern("a")),
        ExternalRef::class(interner.intern("b")),
        ExternalRef::global(interner.intern("c")),
    );
    let mut table = ExprTable::new(interner);
    table.define_external(a, Value::int(0));
    table.define_external(b, Value::int(1));
    table.define_external(c, Value::int(2));
    let pattern: MatchPattern = ArrayPattern::exact(vec![
        MatchPattern::Pin(ValueRef::External(a)),
        MatchPattern::Pin(ValueRef::External(b)),
        MatchPattern::Pin(ValueRef::External(c)),
    ])
    .into();

    assert!(matches_any(&mut table, ints(&[0, 1, 2]), vec![pattern.clone()]));
    assert!(!matches_any(&mut table, ints(&[0, 1, 3]), vec![pattern]));
}

/// ```ruby
/// case [1, 2]
/// in [a, ^(a + 1)] then true
/// end
/// ```
#[test]
fn pins_expressions_with_earlier_bindings() {
    let interner = SharedInterner::default();
    let a = interner.intern("a");
    let mut table = ExprTable::new(interner);
    let succ = table.register(move |env| {
        let n = env.lookup(a).and_then(|v| v.as_int()).unwrap_or_default();
        Ok(Value::int(n + 1))
    });
    let pattern: MatchPattern = ArrayPattern::exact(vec![
        MatchPattern::binding(a),
        MatchPattern::Pin(ValueRef::Expr(succ)),
    ])
    .into();

    assert!(matches_any(&mut table, ints(&[1, 2]), vec![pattern.clone()]));
    assert!(!matches_any(&mut table, ints(&[1, 1]), vec![pattern]));
}

/// ```ruby
/// a = 1
/// case [1, [1]]
/// in [^a, [^a]] then true
/// end
/// ```
#[test]
fn pins_outer_local_variable() {
    let interner = SharedInterner::default();
    let a = interner.intern("a");
    let mut table = ExprTable::new(interner.clone());
    let scrutinee = table.value(Value::array(vec![Value::int(1), ints(&[1])]));
    let yes = table.value(Value::Bool(true));
    let pattern: MatchPattern = ArrayPattern::exact(vec![
        MatchPattern::pin(a),
        ArrayPattern::exact(vec![MatchPattern::pin(a)]).into(),
    ])
    .into();
    let case = CaseExpr::new(scrutinee, vec![CaseArm::new(pattern, yes)]);

    let mut env = Environment::new();
    env.define(a, Value::int(1));
    let result = CaseEvaluator::new(&interner, &table).eval_case(&case, &mut env);
    assert_eq!(result, Ok(Value::Bool(true)));
}

// Constant forms

/// ```ruby
/// case [0, 1]
/// in Array(0, x) then x
/// end
/// case {a: 0}
/// in Hash[a: 0] then true
/// end
/// ```
#[test]
fn constant_with_array_and_hash_forms() {
    let interner = SharedInterner::default();
    let key = interner.intern("a");
    let mut table = ExprTable::new(interner);

    let array_form = MatchPattern::constant(
        class(BuiltinClass::Array),
        Some(ArrayPattern::exact(vec![lit(0), MatchPattern::Wildcard]).into()),
    );
    assert!(matches_any(&mut table, ints(&[0, 1]), vec![array_form.clone()]));
    assert!(!matches_any(&mut table, ints(&[0]), vec![array_form]));

    let hash_form = MatchPattern::constant(
        class(BuiltinClass::Hash),
        Some(HashPattern::new(vec![(key, lit(0))], HashRest::None).into()),
    );
    let hash = Value::symbol_hash([(key, Value::int(0))]);
    assert!(matches_any(&mut table, hash, vec![hash_form.clone()]));

    let string_form = MatchPattern::constant(
        class(BuiltinClass::String),
        Some(ArrayPattern::exact(vec![lit(0), lit(1), lit(2)]).into()),
    );
    assert!(!matches_any(&mut table, ints(&[0, 1, 2]), vec![string_form]));
}

/// ```ruby
/// case [0, {a: [1, "x"]}]
/// in Array[_, Hash[a: [Integer, String => s]]] => whole then s
/// end
/// ```
#[test]
fn nested_constants_with_at_binding() {
    let interner = SharedInterner::default();
    let (a, s, whole) = (interner.intern("a"), interner.intern("s"), interner.intern("whole"));
    let mut table = ExprTable::new(interner.clone());
    let inner = Value::array(vec![Value::int(1), Value::string("x")]);
    let value = Value::array(vec![Value::int(0), Value::symbol_hash([(a, inner)])]);
    let scrutinee = table.value(value.clone());
    let read_s = table.variable(s);

    let pattern = MatchPattern::at(
        MatchPattern::constant(
            class(BuiltinClass::Array),
            Some(
                ArrayPattern::exact(vec![
                    MatchPattern::Wildcard,
                    MatchPattern::constant(
                        class(BuiltinClass::Hash),
                        Some(
                            HashPattern::new(
                                vec![(
                                    a,
                                    ArrayPattern::exact(vec![
                                        MatchPattern::Literal(class(BuiltinClass::Integer)),
                                        MatchPattern::at(
                                            MatchPattern::Literal(class(BuiltinClass::String)),
                                            s,
                                        ),
                                    ])
                                    .into(),
                                )],
                                HashRest::None,
                            )
                            .into(),
                        ),
                    ),
                ])
                .into(),
            ),
        ),
        whole,
    );
    let case = CaseExpr::new(scrutinee, vec![CaseArm::new(pattern, read_s)]);

    let mut env = Environment::new();
    let result = CaseEvaluator::new(&interner, &table).eval_case(&case, &mut env);
    assert_eq!(result, Ok(Value::string("x")));
    assert_eq!(env.lookup(whole), Some(value));
}

// Find pattern

/// ```ruby
/// case [1, 42, "x", :y]
/// in [*pre, String => x, *post] then [pre, x, post]
/// end
/// ```
#[test]
fn find_pattern_captures_both_sides() {
    let interner = SharedInterner::default();
    let (pre, x, post) = (interner.intern("pre"), interner.intern("x"), interner.intern("post"));
    let y = Value::symbol(interner.intern("y"));
    let mut table = ExprTable::new(interner.clone());
    let scrutinee = table.value(Value::array(vec![
        Value::int(1),
        Value::int(42),
        Value::string("x"),
        y.clone(),
    ]));
    let body = table.register(move |env| {
        Ok(Value::array(vec![
            env.lookup(pre).unwrap_or(Value::Nil),
            env.lookup(x).unwrap_or(Value::Nil),
            env.lookup(post).unwrap_or(Value::Nil),
        ]))
    });
    let pattern: MatchPattern = ArrayPattern::find(
        Splat::Named(pre.into()),
        vec![MatchPattern::at(
            MatchPattern::Literal(class(BuiltinClass::String)),
            x,
        )],
        Splat::Named(post.into()),
    )
    .into();
    let case = CaseExpr::new(scrutinee, vec![CaseArm::new(pattern, body)]);

    let result = CaseEvaluator::new(&interner, &table).eval_case(&case, &mut Environment::new());
    assert_eq!(
        result,
        Ok(Value::array(vec![
            ints(&[1, 42]),
            Value::string("x"),
            Value::array(vec![y]),
        ]))
    );
}

/// ```ruby
/// case [1, [2, 3]]
/// in [*, [*, 3, *], *] then true
/// end
/// ```
#[test]
fn find_patterns_nest() {
    let interner = SharedInterner::default();
    let mut table = ExprTable::new(interner);
    let inner: MatchPattern =
        ArrayPattern::find(Splat::Anonymous, vec![lit(3)], Splat::Anonymous).into();
    let outer: MatchPattern =
        ArrayPattern::find(Splat::Anonymous, vec![inner], Splat::Anonymous).into();

    let value = Value::array(vec![Value::int(1), ints(&[2, 3])]);
    assert!(matches_any(&mut table, value, vec![outer.clone()]));
    let value = Value::array(vec![Value::int(1), ints(&[2, 4])]);
    assert!(!matches_any(&mut table, value, vec![outer]));
}

// Hash patterns

/// ```ruby
/// case {a: 0, b: 1}
/// in {a: 0, **nil} then false
/// in {a: 0, b: 1, **nil} then true
/// end
/// ```
#[test]
fn double_splat_nil_rejects_extra_keys() {
    let interner = SharedInterner::default();
    let (a, b) = (interner.intern("a"), interner.intern("b"));
    let mut table = ExprTable::new(interner);
    let value = Value::symbol_hash([(a, Value::int(0)), (b, Value::int(1))]);

    let only_a: MatchPattern = HashPattern::new(vec![(a, lit(0))], HashRest::Closed).into();
    let both: MatchPattern =
        HashPattern::new(vec![(a, lit(0)), (b, lit(1))], HashRest::Closed).into();
    assert!(!matches_any(&mut table, value.clone(), vec![only_a]));
    assert!(matches_any(&mut table, value, vec![both]));
}

/// ```ruby
/// case {a: 1, b: 2, c: 3}
/// in {a: 1, **rest} then rest
/// end
/// ```
#[test]
fn double_splat_rest_binds_remaining_pairs() {
    let interner = SharedInterner::default();
    let (a, b, c, rest) = (
        interner.intern("a"),
        interner.intern("b"),
        interner.intern("c"),
        interner.intern("rest"),
    );
    let mut table = ExprTable::new(interner.clone());
    let scrutinee = table.value(Value::symbol_hash([
        (a, Value::int(1)),
        (b, Value::int(2)),
        (c, Value::int(3)),
    ]));
    let read_rest = table.variable(rest);
    let pattern: MatchPattern =
        HashPattern::new(vec![(a, lit(1))], HashRest::Named(rest.into())).into();
    let case = CaseExpr::new(scrutinee, vec![CaseArm::new(pattern, read_rest)]);

    let result = CaseEvaluator::new(&interner, &table).eval_case(&case, &mut Environment::new());
    let rendered = result.map(|v| v.display(&interner).to_string());
    assert_eq!(rendered, Ok("{b: 2, c: 3}".to_string()));
}

// Deconstruction protocol

/// ```ruby
/// def obj.deconstruct = (ScratchPad << :deconstruct; [0, 1])
/// case obj
/// in [1, 2] then false
/// in [0, 1] then true
/// end
/// ```
#[test]
fn deconstruct_runs_once_across_arms() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    let interner = SharedInterner::default();
    let object = Value::object(ObjectValue::new(interner.intern("Obj")).with_deconstruct(|| {
        CALLS.fetch_add(1, Ordering::SeqCst);
        ints(&[0, 1])
    }));
    let mut table = ExprTable::new(interner);
    let patterns = vec![
        ArrayPattern::exact(vec![lit(1), lit(2)]).into(),
        ArrayPattern::find(Splat::Anonymous, vec![lit(9)], Splat::Anonymous).into(),
        MatchPattern::Or(vec![
            ArrayPattern::exact(vec![lit(5)]).into(),
            ArrayPattern::exact(vec![lit(0), lit(1)]).into(),
        ]),
    ];

    assert!(matches_any(&mut table, object, patterns));
    assert_eq!(CALLS.load(Ordering::SeqCst), 1);
}

/// One `deconstruct_keys` call serves every hash arm. The hook sees the
/// keys requested by the first arm that reaches the value.
///
/// ```ruby
/// case obj
/// in {b: 1} then false  # keys: [:b]
/// in {a: 1} then true   # cached answer
/// end
/// ```
#[test]
fn deconstruct_keys_runs_once_across_hash_arms() {
    let interner = SharedInterner::default();
    let (a, b) = (interner.intern("a"), interner.intern("b"));
    static SEEN: Mutex<Vec<Option<Vec<Name>>>> = Mutex::new(Vec::new());
    let object = Value::object(ObjectValue::new(interner.intern("Obj")).with_deconstruct_keys(
        move |keys| {
            if let Ok(mut log) = SEEN.lock() {
                log.push(keys.map(<[Name]>::to_vec));
            }
            Value::symbol_hash([(a, Value::int(1)), (b, Value::int(2))])
        },
    ));
    let mut table = ExprTable::new(interner);
    let patterns = vec![
        HashPattern::new(vec![(b, lit(1))], HashRest::None).into(),
        HashPattern::new(vec![(a, lit(1))], HashRest::None).into(),
    ];

    assert!(matches_any(&mut table, object, patterns));
    assert_eq!(*SEEN.lock().unwrap(), vec![Some(vec![b])]);
}

/// With the per-key-set policy, each distinct key request reaches the hook.
///
/// ```ruby
/// def obj.deconstruct_keys(keys) = (ScratchPad << keys; {a: 1, b: 2})
/// case obj
/// in {a: 1, b: 2, c: 3} then false
/// in {a: 1, **} then false  # keys: [:a]
/// in {b: 2, **rest} then true  # keys: nil
/// end
/// ```
#[test]
fn per_key_set_policy_passes_each_requested_key_set() {
    let interner = SharedInterner::default();
    let (a, b, c, rest) = (
        interner.intern("a"),
        interner.intern("b"),
        interner.intern("c"),
        interner.intern("rest"),
    );
    static SEEN: Mutex<Vec<Option<Vec<Name>>>> = Mutex::new(Vec::new());
    let object = Value::object(ObjectValue::new(interner.intern("Obj")).with_deconstruct_keys(
        move |keys| {
            if let Ok(mut log) = SEEN.lock() {
                log.push(keys.map(<[Name]>::to_vec));
            }
            Value::symbol_hash([(a, Value::int(1)), (b, Value::int(2))])
        },
    ));
    let mut table = ExprTable::new(interner.clone());
    let scrutinee = table.value(object);
    let yes = table.value(Value::Bool(true));
    let no = table.value(Value::Bool(false));
    let patterns: Vec<MatchPattern> = vec![
        HashPattern::new(vec![(a, lit(1)), (b, lit(2)), (c, lit(3))], HashRest::None).into(),
        HashPattern::new(vec![(a, lit(0))], HashRest::Open).into(),
        HashPattern::new(vec![(b, lit(2))], HashRest::Named(rest.into())).into(),
    ];
    let arms = patterns.into_iter().map(|p| CaseArm::new(p, yes)).collect();
    let case = CaseExpr::new(scrutinee, arms).with_else(no);

    let evaluator = CaseEvaluator::builder(&interner, &table)
        .keys_cache(KeysCachePolicy::PerKeySet)
        .build();
    assert_eq!(
        evaluator.eval_case(&case, &mut Environment::new()),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        *SEEN.lock().unwrap(),
        vec![Some(vec![a, b, c]), Some(vec![a]), None]
    );
}

/// Without a cache, the hook runs once per hash pattern.
#[test]
fn uncached_keys_policy_calls_hook_per_arm() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    let interner = SharedInterner::default();
    let a = interner.intern("a");
    let object = Value::object(ObjectValue::new(interner.intern("Obj")).with_deconstruct_keys(
        move |_| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Value::symbol_hash([(a, Value::int(1))])
        },
    ));
    let mut table = ExprTable::new(interner.clone());
    let scrutinee = table.value(object);
    let body = table.value(Value::Nil);
    let arms = (2..5)
        .map(|n| CaseArm::new(HashPattern::new(vec![(a, lit(n))], HashRest::None).into(), body))
        .collect();
    let case = CaseExpr::new(scrutinee, arms).with_else(body);

    let evaluator = CaseEvaluator::builder(&interner, &table)
        .keys_cache(KeysCachePolicy::Uncached)
        .build();
    evaluator.eval_case(&case, &mut Environment::new()).unwrap();
    assert_eq!(CALLS.load(Ordering::SeqCst), 3);
}

/// ```ruby
/// case Object.new
/// in [] then true
/// in {} then true
/// else false
/// end
/// ```
#[test]
fn object_without_hooks_falls_through() {
    let interner = SharedInterner::default();
    let object = Value::object(ObjectValue::new(interner.intern("Obj")));
    let mut table = ExprTable::new(interner);
    let patterns = vec![
        ArrayPattern::exact(vec![]).into(),
        HashPattern::default().into(),
    ];
    assert!(!matches_any(&mut table, object, patterns));
}

/// ```ruby
/// def obj.deconstruct_keys(*) = ""
/// case obj
/// in Object[a: 1] then true
/// end  # => TypeError
/// ```
#[test]
fn deconstruct_keys_returning_non_hash_is_type_error() {
    let interner = SharedInterner::default();
    let a = interner.intern("a");
    let object = Value::object(
        ObjectValue::new(interner.intern("Obj")).with_deconstruct_keys(|_| Value::string("")),
    );
    let mut table = ExprTable::new(interner.clone());
    let scrutinee = table.value(object);
    let body = table.value(Value::Bool(true));
    let pattern = MatchPattern::constant(
        class(BuiltinClass::Object),
        Some(HashPattern::new(vec![(a, lit(1))], HashRest::None).into()),
    );
    let case = CaseExpr::new(
        scrutinee,
        vec![
            CaseArm::new(pattern, body),
            CaseArm::new(MatchPattern::Wildcard, body),
        ],
    );

    let err = CaseEvaluator::new(&interner, &table)
        .eval_case(&case, &mut Environment::new())
        .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::TypeError {
            message: "deconstruct_keys must return Hash".to_string()
        }
    );
}

/// ```ruby
/// def obj.deconstruct_keys(*) = {"a" => 1}
/// case obj
/// in Object[a: 1] then true
/// else false
/// end
/// ```
#[test]
fn string_keys_from_hook_depend_on_strictness() {
    let interner = SharedInterner::default();
    let a = interner.intern("a");
    let object = Value::object(ObjectValue::new(interner.intern("Obj")).with_deconstruct_keys(
        |_| {
            let mut hash = HashValue::new();
            hash.insert(Value::string("a"), Value::int(1));
            Value::hash(hash)
        },
    ));
    let mut table = ExprTable::new(interner.clone());
    let scrutinee = table.value(object);
    let yes = table.value(Value::Bool(true));
    let no = table.value(Value::Bool(false));
    let pattern: MatchPattern = HashPattern::new(vec![(a, lit(1))], HashRest::None).into();
    let case = CaseExpr::new(scrutinee, vec![CaseArm::new(pattern, yes)]).with_else(no);

    let strict = CaseEvaluator::new(&interner, &table).eval_case(&case, &mut Environment::new());
    assert!(strict.is_err_and(|e| e.is_type_error()));

    let lenient = CaseEvaluator::builder(&interner, &table)
        .strict_key_shape(false)
        .build()
        .eval_case(&case, &mut Environment::new());
    assert_eq!(lenient, Ok(Value::Bool(false)));
}

/// User classes match by ancestry and expose their own hooks.
///
/// ```ruby
/// class Point < Struct; def deconstruct = [x, y]; end
/// case Point.new(1, 2)
/// in Shape(x, y) then x + y
/// end
/// ```
#[test]
fn user_class_constant_with_deconstruct() {
    let interner = SharedInterner::default();
    let (shape, point) = (interner.intern("Shape"), interner.intern("Point"));
    let (x, y) = (interner.intern("x"), interner.intern("y"));
    let object = Value::object(
        ObjectValue::new(point)
            .with_ancestor(shape)
            .with_deconstruct(|| ints(&[1, 2])),
    );
    let mut table = ExprTable::new(interner.clone());
    table.define_external(ExternalRef::constant(shape), Value::class(ClassRef::User(shape)));
    let scrutinee = table.value(object);
    let sum = table.register(move |env| {
        let get = |n| env.lookup(n).and_then(|v| v.as_int()).unwrap_or_default();
        Ok(Value::int(get(x) + get(y)))
    });
    let pattern = MatchPattern::Const {
        constant: ValueRef::External(ExternalRef::constant(shape)),
        inner: Some(Box::new(
            ArrayPattern::exact(vec![MatchPattern::binding(x), MatchPattern::binding(y)]).into(),
        )),
    };
    let case = CaseExpr::new(scrutinee, vec![CaseArm::new(pattern, sum)]);

    let result = CaseEvaluator::new(&interner, &table).eval_case(&case, &mut Environment::new());
    assert_eq!(result, Ok(Value::int(3)));
}

// Host overrides

/// A host that refines `Array#deconstruct`, `Hash#deconstruct_keys` and
/// `Array.===`, the way a `using` block would.
struct RefinedHost<'f> {
    table: ExprTable<'f>,
    deconstruct_calls: RefCell<usize>,
}

impl CaseHost for RefinedHost<'_> {
    fn eval(&self, expr: ExprId, env: &mut Environment) -> EvalResult {
        self.table.eval(expr, env)
    }

    fn resolve_external(&self, reference: ExternalRef) -> EvalResult {
        self.table.resolve_external(reference)
    }

    fn assign_external(&self, reference: ExternalRef, value: Value) -> Result<(), EvalError> {
        self.table.assign_external(reference, value)
    }

    fn case_eq(&self, pattern: &Value, target: &Value) -> Result<bool, EvalError> {
        if *pattern == class(BuiltinClass::Array) {
            return Ok(target.as_hash().is_some());
        }
        self.table.case_eq(pattern, target)
    }

    fn deconstruct(&self, value: &Value) -> Result<Deconstructed<Heap<Vec<Value>>>, EvalError> {
        *self.deconstruct_calls.borrow_mut() += 1;
        if value.as_array().is_some() {
            return Ok(ints(&[0]).deconstruct());
        }
        Ok(value.deconstruct())
    }

    fn deconstruct_keys(
        &self,
        value: &Value,
        keys: Option<&[Name]>,
    ) -> Result<Deconstructed<Heap<HashValue>>, EvalError> {
        if value.as_hash().is_some() {
            let a = self.table.interner().intern("a");
            return Ok(Value::symbol_hash([(a, Value::int(0))]).deconstruct_keys(keys));
        }
        Ok(value.deconstruct_keys(keys))
    }

    fn render(&self, value: &Value, interner: &StringInterner) -> String {
        format!("refined {}", value.display(interner))
    }
}

#[test]
fn host_overrides_model_refinements() {
    let interner = SharedInterner::default();
    let a = interner.intern("a");
    let mut table = ExprTable::new(interner.clone());
    let empty_array = table.value(ints(&[]));
    let empty_hash = table.value(Value::hash(HashValue::new()));
    let yes = table.value(Value::Bool(true));
    let host = RefinedHost {
        table,
        deconstruct_calls: RefCell::new(0),
    };
    let evaluator = CaseEvaluator::new(&interner, &host);
    let mut env = Environment::new();

    let array_case = CaseExpr::new(
        empty_array,
        vec![CaseArm::new(ArrayPattern::exact(vec![lit(0)]).into(), yes)],
    );
    assert_eq!(evaluator.eval_case(&array_case, &mut env), Ok(Value::Bool(true)));
    assert_eq!(*host.deconstruct_calls.borrow(), 1);

    let hash_case = CaseExpr::new(
        empty_hash,
        vec![CaseArm::new(
            HashPattern::new(vec![(a, lit(0))], HashRest::None).into(),
            yes,
        )],
    );
    assert_eq!(evaluator.eval_case(&hash_case, &mut env), Ok(Value::Bool(true)));

    let const_case = CaseExpr::new(
        empty_hash,
        vec![CaseArm::new(
            MatchPattern::Literal(class(BuiltinClass::Array)),
            yes,
        )],
    );
    assert_eq!(evaluator.eval_case(&const_case, &mut env), Ok(Value::Bool(true)));

    let miss = CaseExpr::new(empty_hash, vec![CaseArm::new(lit(1), yes)]);
    let err = evaluator.eval_case(&miss, &mut env).unwrap_err();
    assert_eq!(err.message, "refined {}");
}

// Non-local binding targets

/// ```ruby
/// case %w[a b c]
/// in [@a, @b, *] then true
/// end
/// %w[foo bar] => [@a, @b]
/// 42 in Integer => @a
/// ```
#[test]
fn binds_instance_variables() {
    let interner = SharedInterner::default();
    let a = ExternalRef::instance(interner.intern("a"));
    let b = ExternalRef::instance(interner.intern("b"));
    let mut table = ExprTable::new(interner.clone());
    let letters = table.value(Value::array(vec![
        Value::string("a"),
        Value::string("b"),
        Value::string("c"),
    ]));
    let words = table.value(Value::array(vec![Value::string("foo"), Value::string("bar")]));
    let answer = table.value(Value::int(42));
    let yes = table.value(Value::Bool(true));
    let case = CaseExpr::new(
        letters,
        vec![CaseArm::new(
            ArrayPattern::with_rest(
                vec![MatchPattern::binding(a), MatchPattern::binding(b)],
                Splat::Anonymous,
                vec![],
            )
            .into(),
            yes,
        )],
    );
    let pair: MatchPattern =
        ArrayPattern::exact(vec![MatchPattern::binding(a), MatchPattern::binding(b)]).into();
    let integer = MatchPattern::at(MatchPattern::Literal(class(BuiltinClass::Integer)), a);

    let evaluator = CaseEvaluator::new(&interner, &table);
    let mut env = Environment::new();
    assert_eq!(evaluator.eval_case(&case, &mut env), Ok(Value::Bool(true)));
    assert_eq!(table.resolve_external(a), Ok(Value::string("a")));
    assert_eq!(table.resolve_external(b), Ok(Value::string("b")));

    let rightward = OneLineMatch::assert(words, pair);
    assert_eq!(evaluator.eval_one_line(&rightward, &mut env), Ok(Value::Nil));
    assert_eq!(table.resolve_external(a), Ok(Value::string("foo")));
    assert_eq!(table.resolve_external(b), Ok(Value::string("bar")));

    let test = OneLineMatch::test(answer, integer);
    assert_eq!(evaluator.eval_one_line(&test, &mut env), Ok(Value::Bool(true)));
    assert_eq!(table.resolve_external(a), Ok(Value::int(42)));
}

/// ```ruby
/// @@a = 0
/// case 2
/// in @@a then true
/// end
/// @@a  # => 2
/// ```
#[test]
fn binds_class_variables() {
    let interner = SharedInterner::default();
    let a = ExternalRef::class(interner.intern("a"));
    let mut table = ExprTable::new(interner.clone());
    table.define_external(a, Value::int(0));
    let scrutinee = table.value(Value::int(2));
    let yes = table.value(Value::Bool(true));
    let case = CaseExpr::new(scrutinee, vec![CaseArm::new(MatchPattern::binding(a), yes)]);

    let result = CaseEvaluator::new(&interner, &table).eval_case(&case, &mut Environment::new());
    assert_eq!(result, Ok(Value::Bool(true)));
    assert_eq!(table.resolve_external(a), Ok(Value::int(2)));
}

/// ```ruby
/// $a = 0
/// case {a: 1, b: 2022}
/// in {a: $a, **$b} then true
/// end
/// 42 => $a
/// ```
#[test]
fn binds_global_variables_including_hash_rest() {
    let interner = SharedInterner::default();
    let (a_key, b_key) = (interner.intern("a"), interner.intern("b"));
    let a = ExternalRef::global(a_key);
    let b = ExternalRef::global(b_key);
    let mut table = ExprTable::new(interner.clone());
    table.define_external(a, Value::int(0));
    let scrutinee = table.value(Value::symbol_hash([
        (a_key, Value::int(1)),
        (b_key, Value::int(2022)),
    ]));
    let answer = table.value(Value::int(42));
    let yes = table.value(Value::Bool(true));
    let pattern: MatchPattern = HashPattern::new(
        vec![(a_key, MatchPattern::binding(a))],
        HashRest::Named(b.into()),
    )
    .into();
    let case = CaseExpr::new(scrutinee, vec![CaseArm::new(pattern, yes)]);

    let evaluator = CaseEvaluator::new(&interner, &table);
    let mut env = Environment::new();
    assert_eq!(evaluator.eval_case(&case, &mut env), Ok(Value::Bool(true)));
    assert_eq!(table.resolve_external(a), Ok(Value::int(1)));
    assert_eq!(
        table.resolve_external(b),
        Ok(Value::symbol_hash([(b_key, Value::int(2022))]))
    );

    let rightward = OneLineMatch::assert(answer, MatchPattern::binding(a));
    assert_eq!(evaluator.eval_one_line(&rightward, &mut env), Ok(Value::Nil));
    assert_eq!(table.resolve_external(a), Ok(Value::int(42)));
}

/// A rejected guard leaves external targets untouched.
#[test]
fn failed_guard_does_not_assign_externals() {
    let interner = SharedInterner::default();
    let a = ExternalRef::instance(interner.intern("a"));
    let mut table = ExprTable::new(interner.clone());
    table.define_external(a, Value::int(0));
    let scrutinee = table.value(Value::int(5));
    let falsy = table.value(Value::Bool(false));
    let no = table.value(Value::Bool(false));
    let case = CaseExpr::new(
        scrutinee,
        vec![CaseArm::new(MatchPattern::binding(a), no).with_guard(Guard::when(falsy))],
    )
    .with_else(no);

    let result = CaseEvaluator::new(&interner, &table).eval_case(&case, &mut Environment::new());
    assert_eq!(result, Ok(Value::Bool(false)));
    assert_eq!(table.resolve_external(a), Ok(Value::int(0)));
}

// One-line forms

/// ```ruby
/// {a: 1} in {a: Integer => n}   # => true, n == 1
/// {a: 1} => {a: String}         # => NoMatchingPatternError
/// ```
#[test]
fn one_line_in_and_rightward_assignment() {
    let interner = SharedInterner::default();
    let (a, n) = (interner.intern("a"), interner.intern("n"));
    let mut table = ExprTable::new(interner.clone());
    let value = table.value(Value::symbol_hash([(a, Value::int(1))]));
    let integer: MatchPattern = HashPattern::new(
        vec![(
            a,
            MatchPattern::at(MatchPattern::Literal(class(BuiltinClass::Integer)), n),
        )],
        HashRest::None,
    )
    .into();
    let string: MatchPattern = HashPattern::new(
        vec![(a, MatchPattern::Literal(class(BuiltinClass::String)))],
        HashRest::None,
    )
    .into();

    let evaluator = CaseEvaluator::new(&interner, &table);
    let mut env = Environment::new();
    assert_eq!(
        evaluator.eval_one_line(&OneLineMatch::test(value, integer), &mut env),
        Ok(Value::Bool(true))
    );
    assert_eq!(env.lookup(n), Some(Value::int(1)));
    assert_eq!(
        evaluator.eval_one_line(&OneLineMatch::test(value, string.clone()), &mut env),
        Ok(Value::Bool(false))
    );

    let err = evaluator
        .eval_one_line(&OneLineMatch::assert(value, string), &mut env)
        .unwrap_err();
    assert!(err.is_no_match());
    assert_eq!(err.message, "{a: 1}");
}

/// Host failures surface unchanged.
#[test]
fn host_errors_propagate() {
    let interner = SharedInterner::default();
    let mut table = ExprTable::new(interner.clone());
    let boom = table.register(|_| Err(casein_patterns::errors::host_error("boom")));
    let body = table.value(Value::Nil);
    let case = CaseExpr::new(boom, vec![CaseArm::new(MatchPattern::Wildcard, body)]);

    let err = CaseEvaluator::new(&interner, &table)
        .eval_case(&case, &mut Environment::new())
        .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::Host {
            message: "boom".to_string()
        }
    );
    assert_eq!(casein_eval::classify(&err), casein_eval::ErrorClass::Fatal);
}
