#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::error::LoxError;
use rox::value::Value;
use rox::Lox;

/// In‑memory output sink that stays readable after being handed to the
/// interpreter.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `source` in a fresh session, returning the session, its captured
/// output and the run's result.
pub fn run(source: &str) -> (Lox, SharedBuffer, Result<(), Vec<LoxError>>) {
    let out = SharedBuffer::default();
    let mut lox = Lox::with_output(out.clone());
    let result = lox.run(source);
    (lox, out, result)
}

/// Run `source`, asserting success, and return the printed lines.
pub fn output_of(source: &str) -> Vec<String> {
    let (_, out, result) = run(source);
    if let Err(errors) = result {
        panic!("unexpected errors: {:?}", errors);
    }
    out.lines()
}

/// Run `source` expecting failure and return the errors.
pub fn errors_of(source: &str) -> Vec<LoxError> {
    let (_, _, result) = run(source);
    match result {
        Ok(()) => panic!("expected errors for {:?}", source),
        Err(errors) => errors,
    }
}

pub fn global(lox: &Lox, name: &str) -> Value {
    lox.interpreter()
        .globals()
        .borrow()
        .get(name, 0)
        .unwrap_or_else(|e| panic!("global '{}' missing: {}", name, e))
}
