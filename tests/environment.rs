use rox::environment::{EnvRef, Environment};
use rox::value::Value;

fn chain(depth: usize) -> Vec<EnvRef> {
    let mut scopes: Vec<EnvRef> = vec![Environment::new().into_ref()];
    for _ in 0..depth {
        let inner = Environment::with_enclosing(scopes[scopes.len() - 1].clone()).into_ref();
        scopes.push(inner);
    }
    scopes
}

#[test]
fn get_searches_outward() {
    let scopes = chain(2);
    scopes[0].borrow_mut().define("a", Value::Number(1.0));

    assert_eq!(scopes[2].borrow().get("a", 1).unwrap(), Value::Number(1.0));
}

#[test]
fn get_at_agrees_with_search_for_the_nearest_binding() {
    let scopes = chain(3);
    scopes[0].borrow_mut().define("x", Value::String("global".into()));
    scopes[1].borrow_mut().define("x", Value::String("middle".into()));

    let innermost: &EnvRef = &scopes[3];
    let searched: Value = innermost.borrow().get("x", 1).unwrap();
    let direct: Value = Environment::get_at(innermost, 2, "x", 1).unwrap();

    assert_eq!(searched, direct);
    assert_eq!(direct, Value::String("middle".into()));
}

#[test]
fn get_at_does_not_search() {
    let scopes = chain(1);
    scopes[0].borrow_mut().define("a", Value::Nil);

    let err = Environment::get_at(&scopes[1], 0, "a", 7).unwrap_err();
    assert_eq!(err.to_string(), "Undefined variable 'a'.\n[line 7]");
}

#[test]
fn ancestor_walks_exact_distance() {
    let scopes = chain(2);

    let found = Environment::ancestor(&scopes[2], 2).unwrap();
    assert!(std::rc::Rc::ptr_eq(&found, &scopes[0]));
    assert!(Environment::ancestor(&scopes[2], 3).is_none());
}

#[test]
fn assign_updates_enclosing_binding() {
    let scopes = chain(1);
    scopes[0].borrow_mut().define("a", Value::Number(1.0));

    scopes[1]
        .borrow_mut()
        .assign("a", Value::Number(2.0), 1)
        .unwrap();

    assert_eq!(scopes[0].borrow().get("a", 1).unwrap(), Value::Number(2.0));
}

#[test]
fn assign_never_creates_a_binding() {
    let scopes = chain(1);

    let err = scopes[1]
        .borrow_mut()
        .assign("missing", Value::Nil, 3)
        .unwrap_err();

    assert!(err.is_runtime());
    assert!(scopes[0].borrow().get("missing", 3).is_err());
    assert!(scopes[1].borrow().get("missing", 3).is_err());
}

#[test]
fn assign_at_targets_one_scope() {
    let scopes = chain(1);
    scopes[0].borrow_mut().define("a", Value::Number(1.0));
    scopes[1].borrow_mut().define("a", Value::Number(10.0));

    Environment::assign_at(&scopes[1], 1, "a", Value::Number(2.0), 1).unwrap();

    assert_eq!(Environment::get_at(&scopes[1], 0, "a", 1).unwrap(), Value::Number(10.0));
    assert_eq!(Environment::get_at(&scopes[1], 1, "a", 1).unwrap(), Value::Number(2.0));
}

#[test]
fn define_overwrites_in_the_same_scope() {
    let scopes = chain(0);
    scopes[0].borrow_mut().define("a", Value::Number(1.0));
    scopes[0].borrow_mut().define("a", Value::Bool(true));

    assert_eq!(scopes[0].borrow().get("a", 1).unwrap(), Value::Bool(true));
}
