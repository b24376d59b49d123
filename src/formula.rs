//! Channel formulas for [`ColorType::Functions`](crate::ColorType::Functions)
//! palettes.
//!
//! A palette stores one expression per channel, verbatim, and asks a
//! [`FormulaEvaluator`] for its value at `x`.  The evaluator is
//! injected when the palette is built so that the expression language
//! stays out of the palette engine:
//!
//! - [`NativeEvaluator`] (the default) understands arithmetic in the
//!   style of Tcl's `expr`: `+ - * / % **`, comparisons, `&& || !`,
//!   `c ? a : b`, the constants `pi` and `e`, the variable `x` (or
//!   `$x`) and the usual math functions;
//! - [`DisabledEvaluator`] rejects every expression;
//! - `LuaEvaluator` (cargo feature `lua`) runs each expression as a
//!   Lua chunk with the `math` library in scope.

use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts::{E, PI};
use std::rc::Rc;

use lazy_static::lazy_static;
use thiserror::Error;

/// Errors reported by formula evaluators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("syntax error at offset {pos}: {message}")]
    Syntax { pos: usize, message: String },

    #[error("unknown variable “{0}”")]
    UnknownVariable(String),

    #[error("unknown function “{0}”")]
    UnknownFunction(String),

    #[error("function “{name}” expects {expected} argument(s), got {found}")]
    Arity { name: String, expected: usize, found: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number ({0})")]
    NonFinite(f64),

    /// Error raised by an embedded script engine.
    #[error("script error: {0}")]
    Script(String),

    #[error("formula evaluation is disabled")]
    Disabled,
}

/// Evaluates a channel expression at `x`.
pub trait FormulaEvaluator {
    /// Value of `expression` for the input `x`.
    fn evaluate(&self, expression: &str, x: f64) -> Result<f64, EvalError>;

    /// Check that `expression` can be evaluated.  The default
    /// evaluates it at `x = 0.5`.
    fn check(&self, expression: &str) -> Result<(), EvalError> {
        self.evaluate(expression, 0.5).map(|_| ())
    }
}

/// Evaluator refusing every expression.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledEvaluator;

impl FormulaEvaluator for DisabledEvaluator {
    fn evaluate(&self, _: &str, _: f64) -> Result<f64, EvalError> {
        Err(EvalError::Disabled)
    }
}

fn finite(v: f64) -> Result<f64, EvalError> {
    if v.is_finite() { Ok(v) } else { Err(EvalError::NonFinite(v)) }
}

// ---------------------------------------------------------------------
// Native expression language

#[derive(Clone, Copy)]
enum Function {
    Unary(fn(f64) -> f64),
    Binary(fn(f64, f64) -> f64),
}

impl Function {
    fn arity(&self) -> usize {
        match self { Function::Unary(_) => 1, Function::Binary(_) => 2 }
    }
}

lazy_static! {
    static ref FUNCTIONS: HashMap<&'static str, Function> = {
        use Function::*;
        let mut m = HashMap::new();
        m.insert("sin", Unary(f64::sin));
        m.insert("cos", Unary(f64::cos));
        m.insert("tan", Unary(f64::tan));
        m.insert("asin", Unary(f64::asin));
        m.insert("acos", Unary(f64::acos));
        m.insert("atan", Unary(f64::atan));
        m.insert("sinh", Unary(f64::sinh));
        m.insert("cosh", Unary(f64::cosh));
        m.insert("tanh", Unary(f64::tanh));
        m.insert("sqrt", Unary(f64::sqrt));
        m.insert("abs", Unary(f64::abs));
        m.insert("exp", Unary(f64::exp));
        m.insert("log", Unary(f64::ln));
        m.insert("log10", Unary(f64::log10));
        m.insert("floor", Unary(f64::floor));
        m.insert("ceil", Unary(f64::ceil));
        m.insert("round", Unary(f64::round));
        m.insert("int", Unary(f64::trunc));
        m.insert("double", Unary(|v| v));
        m.insert("pow", Binary(f64::powf));
        m.insert("atan2", Binary(f64::atan2));
        m.insert("hypot", Binary(f64::hypot));
        m.insert("min", Binary(f64::min));
        m.insert("max", Binary(f64::max));
        m.insert("fmod", Binary(|a, b| a % b));
        m
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Add, Sub, Mul, Div, Rem, Pow,
    Lt, Le, Gt, Ge, Eq, Ne, And, Or,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Op(Op),
    Not,
    LParen,
    RParen,
    Comma,
    Question,
    Colon,
}

/// Parsed expression.
#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Num(f64),
    X,
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Binary(Op, Box<Expr>, Box<Expr>),
    Call(&'static str, Function, Vec<Expr>),
    Cond(Box<Expr>, Box<Expr>, Box<Expr>),
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Function/{}", self.arity())
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool { self.arity() == other.arity() }
}

fn syntax(pos: usize, message: impl Into<String>) -> EvalError {
    EvalError::Syntax { pos, message: message.into() }
}

fn tokenize(s: &str) -> Result<Vec<(usize, Token)>, EvalError> {
    let bytes = s.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        let next = bytes.get(i + 1).copied();
        let tok = match c {
            b' ' | b'\t' | b'\r' | b'\n' => { i += 1; continue }
            b'0' ..= b'9' | b'.' => {
                while i < bytes.len()
                    && (bytes[i].is_ascii_digit() || bytes[i] == b'.') { i += 1 }
                if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                    let mut j = i + 1;
                    if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') { j += 1 }
                    if j < bytes.len() && bytes[j].is_ascii_digit() {
                        i = j;
                        while i < bytes.len() && bytes[i].is_ascii_digit() { i += 1 }
                    }
                }
                let text = &s[start .. i];
                let v = text.parse::<f64>()
                    .map_err(|_| syntax(start, format!("bad number “{text}”")))?;
                tokens.push((start, Token::Num(v)));
                continue
            }
            b'$' | b'a' ..= b'z' | b'A' ..= b'Z' | b'_' => {
                if c == b'$' { i += 1 }
                let name_start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') { i += 1 }
                if name_start == i { return Err(syntax(start, "expected a name after “$”")) }
                tokens.push((start, Token::Ident(s[name_start .. i].to_string())));
                continue
            }
            b'+' => Token::Op(Op::Add),
            b'-' => Token::Op(Op::Sub),
            b'*' if next == Some(b'*') => { i += 1; Token::Op(Op::Pow) }
            b'*' => Token::Op(Op::Mul),
            b'/' => Token::Op(Op::Div),
            b'%' => Token::Op(Op::Rem),
            b'^' => Token::Op(Op::Pow),
            b'<' if next == Some(b'=') => { i += 1; Token::Op(Op::Le) }
            b'<' => Token::Op(Op::Lt),
            b'>' if next == Some(b'=') => { i += 1; Token::Op(Op::Ge) }
            b'>' => Token::Op(Op::Gt),
            b'=' if next == Some(b'=') => { i += 1; Token::Op(Op::Eq) }
            b'!' if next == Some(b'=') => { i += 1; Token::Op(Op::Ne) }
            b'!' => Token::Not,
            b'&' if next == Some(b'&') => { i += 1; Token::Op(Op::And) }
            b'|' if next == Some(b'|') => { i += 1; Token::Op(Op::Or) }
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b',' => Token::Comma,
            b'?' => Token::Question,
            b':' => Token::Colon,
            _ => {
                let ch = s[i ..].chars().next().unwrap_or('?');
                return Err(syntax(i, format!("unexpected character “{ch}”")))
            }
        };
        i += 1;
        tokens.push((start, tok));
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    len: usize, // length of the source, for end-of-input positions
}

impl Parser {
    fn peek(&self) -> Option<&Token> { self.tokens.get(self.pos).map(|(_, t)| t) }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|(p, _)| *p).unwrap_or(self.len)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        self.pos += 1;
        t
    }

    fn expect(&mut self, tok: Token, what: &str) -> Result<(), EvalError> {
        let pos = self.offset();
        match self.next() {
            Some(t) if t == tok => Ok(()),
            _ => Err(syntax(pos, format!("expected {what}"))),
        }
    }

    fn expr(&mut self) -> Result<Expr, EvalError> {
        let cond = self.binary(0)?;
        if self.peek() == Some(&Token::Question) {
            self.next();
            let a = self.expr()?;
            self.expect(Token::Colon, "“:”")?;
            let b = self.expr()?;
            return Ok(Expr::Cond(Box::new(cond), Box::new(a), Box::new(b)))
        }
        Ok(cond)
    }

    /// Binding power of the binary operators (`**` is handled by
    /// [`Parser::power`]).
    fn precedence(op: Op) -> u8 {
        match op {
            Op::Or => 1,
            Op::And => 2,
            Op::Eq | Op::Ne => 3,
            Op::Lt | Op::Le | Op::Gt | Op::Ge => 4,
            Op::Add | Op::Sub => 5,
            Op::Mul | Op::Div | Op::Rem => 6,
            Op::Pow => 8,
        }
    }

    fn binary(&mut self, min: u8) -> Result<Expr, EvalError> {
        let mut lhs = self.unary()?;
        while let Some(Token::Op(op)) = self.peek() {
            let op = *op;
            let prec = Self::precedence(op);
            if op == Op::Pow || prec <= min { break }
            self.next();
            let rhs = self.binary(prec)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        match self.peek() {
            Some(Token::Op(Op::Sub)) => { self.next(); Ok(Expr::Neg(Box::new(self.unary()?))) }
            Some(Token::Op(Op::Add)) => { self.next(); self.unary() }
            Some(Token::Not) => { self.next(); Ok(Expr::Not(Box::new(self.unary()?))) }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, EvalError> {
        let base = self.primary()?;
        if self.peek() == Some(&Token::Op(Op::Pow)) {
            self.next();
            // right associative, and binds tighter than a unary minus on its left
            let exp = self.unary()?;
            return Ok(Expr::Binary(Op::Pow, Box::new(base), Box::new(exp)))
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        let pos = self.offset();
        match self.next() {
            Some(Token::Num(v)) => Ok(Expr::Num(v)),
            Some(Token::LParen) => {
                let e = self.expr()?;
                self.expect(Token::RParen, "“)”")?;
                Ok(e)
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.next();
                    self.call(name)
                } else {
                    match name.as_str() {
                        "x" => Ok(Expr::X),
                        "pi" => Ok(Expr::Num(PI)),
                        "e" => Ok(Expr::Num(E)),
                        _ => Err(EvalError::UnknownVariable(name)),
                    }
                }
            }
            Some(_) => Err(syntax(pos, "unexpected token")),
            None => Err(syntax(pos, "unexpected end of expression")),
        }
    }

    fn call(&mut self, name: String) -> Result<Expr, EvalError> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.next();
        } else {
            loop {
                args.push(self.expr()?);
                let pos = self.offset();
                match self.next() {
                    Some(Token::Comma) => continue,
                    Some(Token::RParen) => break,
                    _ => return Err(syntax(pos, "expected “,” or “)”")),
                }
            }
        }
        let (&key, &f) = FUNCTIONS.get_key_value(name.as_str())
            .ok_or_else(|| EvalError::UnknownFunction(name.clone()))?;
        if f.arity() != args.len() {
            return Err(EvalError::Arity { name, expected: f.arity(),
                                          found: args.len() })
        }
        Ok(Expr::Call(key, f, args))
    }
}

fn parse(s: &str) -> Result<Expr, EvalError> {
    let tokens = tokenize(s)?;
    let mut p = Parser { tokens, pos: 0, len: s.len() };
    let e = p.expr()?;
    if p.pos < p.tokens.len() {
        return Err(syntax(p.offset(), "unexpected trailing input"))
    }
    Ok(e)
}

#[inline]
fn flag(b: bool) -> f64 { if b { 1. } else { 0. } }

impl Expr {
    fn eval(&self, x: f64) -> Result<f64, EvalError> {
        let v = match self {
            Expr::Num(v) => *v,
            Expr::X => x,
            Expr::Neg(e) => -e.eval(x)?,
            Expr::Not(e) => flag(e.eval(x)? == 0.),
            Expr::Cond(c, a, b) => {
                return if c.eval(x)? != 0. { a.eval(x) } else { b.eval(x) }
            }
            Expr::Call(_, f, args) => match f {
                Function::Unary(f) => f(args[0].eval(x)?),
                Function::Binary(f) => f(args[0].eval(x)?, args[1].eval(x)?),
            },
            Expr::Binary(op, a, b) => {
                let a = a.eval(x)?;
                match op {
                    Op::And if a == 0. => return Ok(0.),
                    Op::Or if a != 0. => return Ok(1.),
                    _ => (),
                }
                let b = b.eval(x)?;
                match op {
                    Op::Add => a + b,
                    Op::Sub => a - b,
                    Op::Mul => a * b,
                    Op::Div | Op::Rem if b == 0. => return Err(EvalError::DivisionByZero),
                    Op::Div => a / b,
                    Op::Rem => a % b,
                    Op::Pow => a.powf(b),
                    Op::Lt => flag(a < b),
                    Op::Le => flag(a <= b),
                    Op::Gt => flag(a > b),
                    Op::Ge => flag(a >= b),
                    Op::Eq => flag(a == b),
                    Op::Ne => flag(a != b),
                    Op::And | Op::Or => flag(b != 0.),
                }
            }
        };
        finite(v)
    }
}

/// Built-in evaluator for Tcl-like arithmetic expressions.
///
/// Parsed expressions are cached, so sampling a gradient parses each
/// channel once.
///
/// ```
/// use gradient_palette::formula::{FormulaEvaluator, NativeEvaluator};
/// let ev = NativeEvaluator::new();
/// assert_eq!(ev.evaluate("2*x**2 - 0.5", 0.5).unwrap(), 0.);
/// assert_eq!(ev.evaluate("x < 0.5 ? 0 : 1", 0.7).unwrap(), 1.);
/// assert!(ev.evaluate("1/(x-x)", 0.3).is_err());
/// ```
#[derive(Debug, Default)]
pub struct NativeEvaluator {
    cache: RefCell<HashMap<String, Rc<Expr>>>,
}

impl NativeEvaluator {
    pub fn new() -> Self { Self::default() }

    fn compiled(&self, expression: &str) -> Result<Rc<Expr>, EvalError> {
        if let Some(e) = self.cache.borrow().get(expression) {
            return Ok(Rc::clone(e))
        }
        let e = Rc::new(parse(expression)?);
        self.cache.borrow_mut().insert(expression.to_string(), Rc::clone(&e));
        Ok(e)
    }
}

impl FormulaEvaluator for NativeEvaluator {
    fn evaluate(&self, expression: &str, x: f64) -> Result<f64, EvalError> {
        self.compiled(expression)?.eval(x)
    }

    /// Only parses: a formula like `1/x` is accepted even though it
    /// fails at `x = 0`.
    fn check(&self, expression: &str) -> Result<(), EvalError> {
        self.compiled(expression).map(|_| ())
    }
}

// ---------------------------------------------------------------------
// Lua

#[cfg(feature = "lua")]
pub use lua::LuaEvaluator;

#[cfg(feature = "lua")]
mod lua {
    use mlua::Lua;

    use super::{finite, EvalError, FormulaEvaluator};

    fn script(e: mlua::Error) -> EvalError { EvalError::Script(e.to_string()) }

    /// Evaluates channel expressions with an embedded Lua interpreter.
    ///
    /// The interpreter is created once and reused; every `math`
    /// function is visible unqualified (`sin(x)` as well as
    /// `math.sin(x)`).
    pub struct LuaEvaluator {
        lua: Lua,
    }

    impl LuaEvaluator {
        pub fn new() -> Result<Self, EvalError> {
            let lua = Lua::new();
            lua.load("for k, v in pairs(math) do _G[k] = v end")
                .exec().map_err(script)?;
            Ok(LuaEvaluator { lua })
        }
    }

    impl FormulaEvaluator for LuaEvaluator {
        fn evaluate(&self, expression: &str, x: f64) -> Result<f64, EvalError> {
            self.lua.globals().set("x", x).map_err(script)?;
            let v: f64 = self.lua.load(format!("return {expression}"))
                .eval().map_err(script)?;
            finite(v)
        }

        fn check(&self, expression: &str) -> Result<(), EvalError> {
            self.lua.load(format!("return {expression}"))
                .into_function().map(|_| ()).map_err(script)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn eval(s: &str, x: f64) -> Result<f64, EvalError> {
        NativeEvaluator::new().evaluate(s, x)
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval("1 + 2 * 3", 0.).unwrap(), 7.);
        assert_eq!(eval("(1 + 2) * 3", 0.).unwrap(), 9.);
        assert_eq!(eval("2 ** 3 ** 2", 0.).unwrap(), 512.);
        assert_eq!(eval("-2 ** 2", 0.).unwrap(), -4.);
        assert_eq!(eval("2^-1", 0.).unwrap(), 0.5);
        assert_eq!(eval("7 % 4", 0.).unwrap(), 3.);
        assert_eq!(eval("10 - 4 - 3", 0.).unwrap(), 3.);
        assert_eq!(eval("1.5e1 / 3", 0.).unwrap(), 5.);
    }

    #[test]
    fn variables_and_functions() {
        assert_eq!(eval("$x * 2", 0.25).unwrap(), 0.5);
        assert!((eval("sin(pi * x)", 0.5).unwrap() - 1.).abs() < 1e-15);
        assert_eq!(eval("max(x, 0.3)", 0.1).unwrap(), 0.3);
        assert_eq!(eval("pow(x, 2)", 0.5).unwrap(), 0.25);
        assert_eq!(eval("abs(x - 1)", 0.25).unwrap(), 0.75);
    }

    #[test]
    fn logic() {
        assert_eq!(eval("x > 0.5 && x < 0.8", 0.6).unwrap(), 1.);
        assert_eq!(eval("x > 0.5 || !(x == 0.2)", 0.2).unwrap(), 0.);
        assert_eq!(eval("x < 0.5 ? 2*x : 2 - 2*x", 0.75).unwrap(), 0.5);
        // the branch not taken is not evaluated
        assert_eq!(eval("x == 0 ? 0 : 1/x", 0.).unwrap(), 0.);
    }

    #[test]
    fn errors() {
        assert_eq!(eval("y + 1", 0.), Err(EvalError::UnknownVariable("y".into())));
        assert_eq!(eval("foo(x)", 0.), Err(EvalError::UnknownFunction("foo".into())));
        assert!(matches!(eval("pow(x)", 0.), Err(EvalError::Arity { .. })));
        assert_eq!(eval("1 / x", 0.), Err(EvalError::DivisionByZero));
        assert!(matches!(eval("sqrt(x)", -1.), Err(EvalError::NonFinite(_))));
        assert!(matches!(eval("(1 + ", 0.), Err(EvalError::Syntax { .. })));
        assert!(matches!(eval("1 2", 0.), Err(EvalError::Syntax { .. })));
        assert!(matches!(eval("x # 2", 0.), Err(EvalError::Syntax { .. })));
        assert!(matches!(eval("", 0.), Err(EvalError::Syntax { .. })));
    }

    #[test]
    fn check_only_parses() {
        let ev = NativeEvaluator::new();
        assert!(ev.check("1 / x").is_ok());
        assert!(ev.check("1 / ").is_err());
        assert_eq!(DisabledEvaluator.evaluate("x", 0.5), Err(EvalError::Disabled));
    }
}
