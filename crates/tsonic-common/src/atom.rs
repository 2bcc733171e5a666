//! String interning for type names, member names and stable ids.
//!
//! Mirrors `tsz-common::interner`: identifiers are deduplicated once so
//! that every later comparison is a pointer/index compare rather than a
//! string compare, which matters once the catalog is doing thousands of
//! `lookupMember` calls per compilation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(u32);

#[derive(Default)]
pub struct Interner {
    strings: RefCell<Vec<Rc<str>>>,
    lookup: RefCell<HashMap<Rc<str>, Atom>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, s: &str) -> Atom {
        if let Some(atom) = self.lookup.borrow().get(s) {
            return *atom;
        }
        let rc: Rc<str> = Rc::from(s);
        let mut strings = self.strings.borrow_mut();
        let atom = Atom(strings.len() as u32);
        strings.push(rc.clone());
        self.lookup.borrow_mut().insert(rc, atom);
        atom
    }

    pub fn resolve(&self, atom: Atom) -> Rc<str> {
        self.strings.borrow()[atom.0 as usize].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_deduplicates() {
        let interner = Interner::new();
        let a = interner.intern("selectMany");
        let b = interner.intern("selectMany");
        let c = interner.intern("select");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(&*interner.resolve(a), "selectMany");
    }
}
