//! Behaviour of declared struct kinds and their instances

mod common;

use common::{init_logging, instance_of, ints};
use struct_rs::{
    Condition, Kind,
    exceptions::OffsetBound,
    factory::{Binding, declare, declare_named, declare_named_with, declare_with},
    namespace::Namespace,
    records::{ArityPolicy, KindOptions},
    symbols::Symbol,
    value::Value,
};

fn abcd() -> Kind {
    declare(["a", "b", "c", "d"]).unwrap()
}

#[test]
fn to_a_has_one_value_per_member() {
    init_logging();
    let kind = abcd();
    for args in [&[][..], &[1][..], &[1, 2, 3, 4][..]] {
        assert_eq!(instance_of(&kind, args).to_a().len(), 4);
    }
}

#[test]
fn missing_arguments_are_nil() {
    let s = instance_of(&abcd(), &[1, 2]);
    assert_eq!(s.to_a(), [Value::from(1), Value::from(2), Value::Nil, Value::Nil]);
}

#[test]
fn to_h_round_trip() {
    let kind = abcd();
    let s = instance_of(&kind, &[1, 2, 3, 4]);
    let h = s.to_h();
    assert_eq!(h.keys().copied().collect::<Vec<_>>(), s.members());
    let rebuilt = kind.new_instance(h.values().cloned().collect::<Vec<_>>()).unwrap();
    assert!(rebuilt.eql(&s));
    assert_eq!(rebuilt, s);
}

#[test]
fn values_at_range() {
    let s = instance_of(&abcd(), &[1, 2, 3, 4]);
    assert_eq!(s.values_at(&[Value::from(0..=2)]).unwrap(), ints(&[1, 2, 3]));
}

#[test]
fn negative_offset() {
    let s = instance_of(&abcd(), &[1, 2, 3, 4]);
    assert_eq!(s.get(&Value::from(-1)).unwrap(), Value::from(4));
}

#[test]
fn offsets_out_of_range() {
    let s = instance_of(&abcd(), &[1, 2, 3, 4]);

    let err = s.get(&Value::from(4)).unwrap_err();
    assert_eq!(
        err,
        Condition::Index {
            offset: 4,
            size: 4,
            bound: OffsetBound::TooLarge
        }
    );
    let message = err.to_string();
    assert!(message.contains('4') && message.contains("too large"));

    let err = s.get(&Value::from(-5)).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("-5") && message.contains("size:4") && message.contains("too small"));
    assert_eq!(err.class_name(), "IndexError");
}

#[test]
fn undeclared_member() {
    let s = instance_of(&abcd(), &[1, 2, 3, 4]);
    let err = s.get(&Value::from(Symbol::intern("e"))).unwrap_err();
    assert_eq!(err.class_name(), "NameError");
    assert_eq!(err.to_string(), "no member 'e' in struct");
    assert!(s.set(&Value::from("e"), Value::Nil).is_err());
}

#[test]
fn each_without_consumer() {
    let s = instance_of(&abcd(), &[1, 2, 3, 4]);
    let values = s.each_enum();
    assert_eq!(values.size(), 4);
    assert_eq!(values.iter().collect::<Vec<_>>(), ints(&[1, 2, 3, 4]));
    assert_eq!(values.iter().collect::<Vec<_>>(), ints(&[1, 2, 3, 4]));
}

#[test]
fn enumerator_drives_iterator_adapters() {
    let s = instance_of(&abcd(), &[1, 2, 3, 4]);
    let sum: i64 = s
        .each_enum()
        .iter()
        .filter_map(|v| match v {
            Value::Integer(i) => Some(i),
            _ => None,
        })
        .sum();
    assert_eq!(sum, 10);

    let names = s
        .each_pair_enum()
        .iter()
        .map(|(member, _)| member.to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, ["a", "b", "c", "d"]);
}

#[test]
fn derived_schema_is_a_snapshot() {
    init_logging();
    let k1 = declare(["x", "y"]).unwrap();
    let k2 = k1.derive(None);
    k1.define_member("z").unwrap();

    assert_eq!(k2.members().unwrap(), ["x", "y"].map(Symbol::intern));
    assert_eq!(k1.members().unwrap(), ["x", "y", "z"].map(Symbol::intern));
    let instance = k2.new_instance(ints(&[1, 2])).unwrap();
    assert_eq!(instance.members(), ["x", "y"].map(Symbol::intern));

    k2.define_member("w").unwrap();
    assert_eq!(k1.members().unwrap(), ["x", "y", "z"].map(Symbol::intern));
}

#[test]
fn derived_instances_use_inherited_accessors() {
    let k1 = declare(["x", "y"]).unwrap();
    let k2 = k1.derive(None);
    k2.define_member("w").unwrap();
    k1.define_member("z").unwrap();

    // `z` lives in slot 2 of k1, `w` in slot 2 of k2.
    let z = k1.accessor("z").unwrap();
    let y = k1.accessor("y").unwrap();
    let child = instance_of(&k2, &[1, 2, 3]);
    assert_eq!(y.get(&child).unwrap(), Value::from(2));
    assert!(matches!(z.get(&child), Err(Condition::Name { .. })));

    let unrelated = instance_of(&declare(["x", "y"]).unwrap(), &[1, 2]);
    assert!(matches!(y.get(&unrelated), Err(Condition::NoMethod { .. })));
}

#[test]
fn eql_is_structural() {
    let kind = abcd();
    let a = instance_of(&kind, &[1, 2, 3, 4]);
    let b = instance_of(&kind, &[1, 2, 3, 4]);
    assert!(a.eql(&b));

    b.set(&Value::from(2), Value::from(30)).unwrap();
    assert!(!a.eql(&b));

    // Same values, different kinds.
    let other = instance_of(&abcd(), &[1, 2, 3, 4]);
    assert!(!a.eql(&other));
}

#[test]
fn eql_instances_hash_equal() {
    use std::collections::HashSet;

    let kind = abcd();
    let mut set = HashSet::new();
    set.insert(instance_of(&kind, &[1, 2, 3, 4]));
    assert!(set.contains(&instance_of(&kind, &[1, 2, 3, 4])));
    assert!(!set.contains(&instance_of(&kind, &[1, 2, 3, 5])));
}

#[test]
fn generated_accessors_match_indexing() {
    let kind = abcd();
    let s = instance_of(&kind, &[1, 2, 3, 4]);
    let c = kind.accessor("c").unwrap();

    c.set(&s, Value::from("via accessor")).unwrap();
    assert_eq!(s.get(&Value::from(2)).unwrap(), Value::from("via accessor"));
    assert_eq!(s.get(&Value::from(-2)).unwrap(), Value::from("via accessor"));

    s.set(&Value::from("c"), Value::from("via index")).unwrap();
    assert_eq!(c.get(&s).unwrap(), Value::from("via index"));
    assert_eq!(s.call("c", &[]).unwrap(), Value::from("via index"));
}

#[test]
fn named_declaration_registers() {
    let ns = Namespace::default();
    let point = declare_named(&ns, "Point", ["x", "y"], Binding::Register).unwrap();
    assert_eq!(point.name(), Some("Struct::Point"));
    assert_eq!(ns.get("Point"), Some(point.clone()));

    let p = instance_of(&point, &[1, 2]);
    assert_eq!(p.inspect(), "#<struct Struct::Point x=1, y=2>");
    assert_eq!(p.to_string(), p.inspect());
}

#[test]
fn inferred_binding() {
    let ns = Namespace::top();
    let named = declare_named(&ns, "Pair", ["l", "r"], Binding::infer("Pair")).unwrap();
    assert_eq!(named.name(), Some("Pair"));
    let anonymous = declare_named(&ns, "l", ["r"], Binding::infer("l")).unwrap();
    assert_eq!(anonymous.name(), None);
    assert_eq!(anonymous.members().unwrap(), ["l", "r"].map(Symbol::intern));
    assert_eq!(ns.constants(), [Symbol::intern("Pair")]);
}

#[test]
fn declaration_body_adds_members_and_methods() {
    let ns = Namespace::default();
    let account = declare_named_with(
        &ns,
        "Account",
        ["owner"],
        Binding::Register,
        KindOptions::default(),
        |decl| {
            decl.member("balance")?.method("deposit", |this, args| {
                let [Value::Integer(amount)] = args else {
                    return Err(Condition::argument("deposit takes an integer"));
                };
                let Value::Integer(balance) = this.get_member("balance")? else {
                    return Err(Condition::argument("balance is not an integer"));
                };
                let balance = Value::from(balance + amount);
                this.set_member("balance", balance.clone())?;
                Ok(balance)
            });
            Ok(())
        },
    )
    .unwrap();

    assert_eq!(account.members().unwrap(), ["owner", "balance"].map(Symbol::intern));
    let acct = account
        .new_instance(vec![Value::from("ann"), Value::from(10)])
        .unwrap();
    assert_eq!(acct.call("deposit", &[Value::from(5)]).unwrap(), Value::from(15));
    assert_eq!(acct.call("balance", &[]).unwrap(), Value::from(15));

    // Methods are inherited by derived kinds.
    let savings = account.derive(Some("Savings"));
    let s = savings
        .new_instance(vec![Value::from("bob"), Value::from(1)])
        .unwrap();
    assert_eq!(s.call("deposit", &[Value::from(1)]).unwrap(), Value::from(2));
    assert_eq!(s.inspect(), "#<struct Savings owner=\"bob\", balance=2>");
}

#[test]
fn base_kind_is_abstract() {
    let base = Kind::base();
    assert_eq!(base.to_string(), "Struct");
    let err = base.members().unwrap_err();
    assert_eq!(err.to_string(), "the Struct class has no members");
    assert_eq!(err.class_name(), "ArgumentError");
    let err = base.define_member("x").unwrap_err();
    assert_eq!(err.to_string(), "you cannot define attributes to the Struct class");
}

#[test]
fn arity_policies() {
    let strict = declare(["a", "b"]).unwrap();
    let err = strict.new_instance(ints(&[1, 2, 3])).unwrap_err();
    assert!(err.to_string().starts_with("struct size differs"));

    let exact = declare_with(
        ["a", "b"],
        KindOptions {
            arity: ArityPolicy::Exact,
        },
        |_| Ok(()),
    )
    .unwrap();
    assert!(exact.new_instance(ints(&[1])).is_err());
    assert!(exact.new_instance(ints(&[1, 2])).is_ok());

    let lenient = declare_with(
        ["a", "b"],
        KindOptions {
            arity: ArityPolicy::Lenient,
        },
        |_| Ok(()),
    )
    .unwrap();
    let s = lenient.new_instance(ints(&[1, 2, 3])).unwrap();
    assert_eq!(s.to_a(), ints(&[1, 2]));
    // Derived kinds keep the policy.
    assert!(lenient.derive(None).new_instance(ints(&[1, 2, 3])).is_ok());
}

#[test]
fn rejected_construction_leaves_kind_open() {
    let kind = declare(["a"]).unwrap();
    assert!(kind.new_instance(ints(&[1, 2])).is_err());
    assert!(!kind.is_sealed());
    kind.define_member("b").unwrap();
    assert_eq!(instance_of(&kind, &[1, 2]).to_a(), ints(&[1, 2]));
}

#[test]
fn self_referencing_instances_compare() {
    let kind = declare(["me"]).unwrap();
    let make = || {
        let s = instance_of(&kind, &[]);
        s.set_member("me", Value::Struct(s.clone())).unwrap();
        s
    };
    let (s1, s2) = (make(), make());
    assert_eq!(s1, s2);
    assert_eq!(Value::Struct(s1.clone()), Value::Struct(s2.clone()));

    let mut set = std::collections::HashSet::new();
    set.insert(s1);
    assert!(set.contains(&s2));
}

#[test]
fn nested_inspect() {
    let ns = Namespace::top();
    let inner = declare_named(&ns, "Inner", ["v"], Binding::Register).unwrap();
    let outer = declare(["inner", "tag"]).unwrap();
    let o = outer
        .new_instance(vec![
            Value::Struct(instance_of(&inner, &[7])),
            Value::from(Symbol::intern("t")),
        ])
        .unwrap();
    assert_eq!(o.inspect(), "#<struct inner=#<struct Inner v=7>, tag=:t>");
}
