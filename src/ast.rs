//! The slice of the syntax tree a function expression carries into
//! instantiation.

use std::rc::Rc;

#[derive(Clone, Debug)]
pub enum Statement {
    Empty,
    Expression(Expression),
    Return(Option<Expression>),
    Block(Vec<Statement>),
}

#[derive(Clone, Debug)]
pub enum Expression {
    Literal(Literal),
    Identifier(String),
    Function(Rc<FunctionDefinition>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

#[derive(Clone, Debug)]
pub enum Pattern {
    Identifier(String),
    Array(Vec<Option<Pattern>>),
    Object(Vec<ObjectPatternProperty>),
    Assign(Box<Pattern>, Box<Expression>),
    Rest(Box<Pattern>),
}

#[derive(Clone, Debug)]
pub enum ObjectPatternProperty {
    KeyValue(String, Pattern),
    Shorthand(String),
    Rest(Pattern),
}

impl Pattern {
    /// §8.2.1 BoundNames
    pub fn bound_names(&self, out: &mut Vec<String>) {
        match self {
            Pattern::Identifier(name) => out.push(name.clone()),
            Pattern::Array(elements) => {
                for element in elements.iter().flatten() {
                    element.bound_names(out);
                }
            }
            Pattern::Object(props) => {
                for prop in props {
                    match prop {
                        ObjectPatternProperty::KeyValue(_, pat) | ObjectPatternProperty::Rest(pat) => {
                            pat.bound_names(out)
                        }
                        ObjectPatternProperty::Shorthand(name) => out.push(name.clone()),
                    }
                }
            }
            Pattern::Assign(target, _) | Pattern::Rest(target) => target.bound_names(out),
        }
    }
}

/// Function species, fixed by the parser from the `async` and `*` markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Species {
    Ordinary,
    Async,
    Generator,
    AsyncGenerator,
}

impl Species {
    pub fn from_flags(is_async: bool, is_generator: bool) -> Self {
        match (is_async, is_generator) {
            (false, false) => Species::Ordinary,
            (true, false) => Species::Async,
            (false, true) => Species::Generator,
            (true, true) => Species::AsyncGenerator,
        }
    }

    pub fn is_async(self) -> bool {
        matches!(self, Species::Async | Species::AsyncGenerator)
    }

    pub fn is_generator(self) -> bool {
        matches!(self, Species::Generator | Species::AsyncGenerator)
    }

    /// Internal class name used for the function object itself.
    pub fn class_name(self) -> &'static str {
        match self {
            Species::Ordinary => "Function",
            Species::Async => "AsyncFunction",
            Species::Generator => "GeneratorFunction",
            Species::AsyncGenerator => "AsyncGeneratorFunction",
        }
    }
}

/// Immutable blueprint shared by every closure created from one syntactic
/// site.
#[derive(Clone, Debug)]
pub struct FunctionDefinition {
    pub name: Option<String>,
    pub params: Vec<Pattern>,
    pub body: Vec<Statement>,
    pub species: Species,
    pub strict: bool,
    pub source_text: Option<String>,
}

impl FunctionDefinition {
    pub fn new(
        name: Option<String>,
        params: Vec<Pattern>,
        body: Vec<Statement>,
        is_async: bool,
        is_generator: bool,
    ) -> Self {
        let strict = is_strict_mode_body(&body);
        Self {
            name,
            params,
            body,
            species: Species::from_flags(is_async, is_generator),
            strict,
            source_text: None,
        }
    }

    /// Marks the definition strict because the code around it is strict.
    pub fn with_enclosing_strict(mut self, enclosing_strict: bool) -> Self {
        self.strict |= enclosing_strict;
        self
    }

    pub fn with_source_text(mut self, source_text: impl Into<String>) -> Self {
        self.source_text = Some(source_text.into());
        self
    }

    /// Binding name for the self-reference, empty for anonymous functions.
    pub fn binding_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// §15.1.5 ExpectedArgumentCount: formals before the first default or rest
    /// parameter.
    pub fn expected_argument_count(&self) -> usize {
        self.params
            .iter()
            .take_while(|p| !matches!(p, Pattern::Assign(..) | Pattern::Rest(_)))
            .count()
    }

    pub fn parameter_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for param in &self.params {
            param.bound_names(&mut names);
        }
        names
    }
}

/// Directive prologue check: any leading string-literal statement equal to
/// `"use strict"`.
pub fn is_strict_mode_body(body: &[Statement]) -> bool {
    for stmt in body {
        if let Statement::Expression(Expression::Literal(Literal::String(s))) = stmt {
            if s == "use strict" {
                return true;
            }
        } else {
            break;
        }
    }
    false
}

pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let start = first == '_' || first == '$' || first.is_ascii_alphabetic() || unicode_id_start(first);
    start
        && chars.all(|ch| {
            ch == '_' || ch == '$' || ch.is_ascii_alphanumeric() || unicode_id_continue(ch)
        })
}

fn unicode_id_start(ch: char) -> bool {
    !ch.is_ascii() && unicode_ident::is_xid_start(ch)
}

fn unicode_id_continue(ch: char) -> bool {
    // ZWNJ and ZWJ are allowed in IdentifierPart
    !ch.is_ascii()
        && (unicode_ident::is_xid_continue(ch) || ch == '\u{200C}' || ch == '\u{200D}')
}
