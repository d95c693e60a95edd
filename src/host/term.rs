//! Host term representation
//!
//! A deliberately small model of the values a logic-programming host passes
//! across the foreign boundary: atoms, numbers, strings, compounds, lists,
//! unbound variables and blobs.

use super::blob::Blob;
use std::fmt;
use std::sync::Arc;

/// An interned-by-value host symbol
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(Arc<str>);

impl Atom {
    /// Create an atom with the given name
    pub fn new(name: &str) -> Self {
        Atom(Arc::from(name))
    }

    /// The atom's text
    pub fn name(&self) -> &str {
        &self.0
    }

    fn needs_quotes(&self) -> bool {
        let name = self.name();
        let mut chars = name.chars();
        let solo = match chars.next() {
            Some(c) if c.is_ascii_lowercase() => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            Some(_) => name.chars().all(|c| "+-*/\\^<>=~:.?@#&$".contains(c)),
            None => false,
        };
        !solo && name != "[]"
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.needs_quotes() {
            write!(f, "'{}'", self.name().replace('\'', "\\'"))
        } else {
            f.write_str(self.name())
        }
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({})", self.name())
    }
}

impl serde::Serialize for Atom {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Name and arity of a compound term
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Functor {
    name: Atom,
    arity: usize,
}

impl Functor {
    /// Create a functor
    pub fn new(name: &str, arity: usize) -> Self {
        Functor {
            name: Atom::new(name),
            arity,
        }
    }

    /// Functor name
    pub fn name(&self) -> &Atom {
        &self.name
    }

    /// Number of arguments
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Build a compound term with this functor
    ///
    /// Returns `None` if the argument count does not match the arity.
    pub fn apply(&self, args: Vec<Term>) -> Option<Term> {
        (args.len() == self.arity).then(|| Term::Compound {
            name: self.name.clone(),
            args,
        })
    }
}

impl fmt::Display for Functor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// A host value
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Unbound variable, used for output arguments
    Var,
    /// Atom
    Atom(Atom),
    /// Integer
    Integer(i64),
    /// Float
    Float(f64),
    /// String object
    String(String),
    /// Compound term `name(args...)`
    Compound {
        /// Functor name
        name: Atom,
        /// Arguments, length is the arity
        args: Vec<Term>,
    },
    /// Proper list
    List(Vec<Term>),
    /// Opaque host-managed value
    Blob(Blob),
}

impl Term {
    /// Atom term from a name
    pub fn atom(name: &str) -> Self {
        Term::Atom(Atom::new(name))
    }

    /// Compound term from a name and arguments
    pub fn compound(name: &str, args: Vec<Term>) -> Self {
        Term::Compound {
            name: Atom::new(name),
            args,
        }
    }

    /// The functor of a compound term
    pub fn functor(&self) -> Option<Functor> {
        match self {
            Term::Compound { name, args } => Some(Functor {
                name: name.clone(),
                arity: args.len(),
            }),
            _ => None,
        }
    }

    /// Arguments if this is a compound with the given functor
    pub fn args_of(&self, functor: &Functor) -> Option<&[Term]> {
        match self {
            Term::Compound { name, args } if *name == functor.name && args.len() == functor.arity => {
                Some(args)
            }
            _ => None,
        }
    }

    /// Integer value, if this is an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Term::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Atom, if this is an atom
    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Term::Atom(a) => Some(a),
            _ => None,
        }
    }

    /// Text of an atom or string
    pub fn text(&self) -> Option<&str> {
        match self {
            Term::Atom(a) => Some(a.name()),
            Term::String(s) => Some(s),
            _ => None,
        }
    }

    /// Blob, if this is one
    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Term::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// List elements, if this is a list
    pub fn as_list(&self) -> Option<&[Term]> {
        match self {
            Term::List(items) => Some(items),
            _ => None,
        }
    }

    /// True for an unbound variable
    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var => f.write_str("_"),
            Term::Atom(a) => write!(f, "{}", a),
            Term::Integer(i) => write!(f, "{}", i),
            Term::Float(x) => write!(f, "{:?}", x),
            Term::String(s) => write!(f, "{:?}", s),
            Term::Compound { name, args } if name.name() == "-" && args.len() == 2 => {
                write!(f, "{}-{}", args[0], args[1])
            }
            Term::Compound { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Term::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Term::Blob(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for Term {
    fn from(i: i64) -> Self {
        Term::Integer(i)
    }
}

impl From<f64> for Term {
    fn from(x: f64) -> Self {
        Term::Float(x)
    }
}

impl From<Atom> for Term {
    fn from(a: Atom) -> Self {
        Term::Atom(a)
    }
}

impl From<Blob> for Term {
    fn from(b: Blob) -> Self {
        Term::Blob(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_compound_and_pairs() {
        let ip = Term::compound("ip", vec![Term::Integer(8); 4]);
        assert_eq!(ip.to_string(), "ip(8,8,8,8)");

        let pair = Term::compound("-", vec![Term::atom("city"), Term::String("Oslo".into())]);
        assert_eq!(pair.to_string(), "city-\"Oslo\"");

        let list = Term::List(vec![pair, Term::compound("-", vec![Term::atom("latitude"), Term::Float(0.0)])]);
        assert_eq!(list.to_string(), "[city-\"Oslo\",latitude-0.0]");
    }

    #[test]
    fn test_atom_quoting() {
        assert_eq!(Atom::new("standard").to_string(), "standard");
        assert_eq!(Atom::new("Turbo").to_string(), "'Turbo'");
        assert_eq!(Atom::new("two words").to_string(), "'two words'");
        assert_eq!(Atom::new("-").to_string(), "-");
        assert_eq!(Atom::new("[]").to_string(), "[]");
    }

    #[test]
    fn test_functor_apply_checks_arity() {
        let ip4 = Functor::new("ip", 4);
        assert!(ip4.apply(vec![Term::Integer(1)]).is_none());
        let args = (1..=4).map(Term::Integer).collect();
        let term = ip4.apply(args).unwrap();
        assert_eq!(term.functor(), Some(ip4.clone()));
        assert_eq!(term.args_of(&ip4).map(|a| a.len()), Some(4));
        assert!(term.args_of(&Functor::new("ip", 3)).is_none());
    }

    #[test]
    fn test_text_accepts_atoms_and_strings() {
        assert_eq!(Term::atom("a.mmdb").text(), Some("a.mmdb"));
        assert_eq!(Term::String("b.mmdb".into()).text(), Some("b.mmdb"));
        assert_eq!(Term::Integer(1).text(), None);
    }
}
