//! The `parse_csv` built-in: a constructor-based function that splits a
//! delimiter-separated message into a list, or into a dict when column
//! names are supplied.
//!
//! `parse_csv` is the canonical example of the constructor calling
//! convention: it pulls its expressions and literal options out of the
//! argument container at construction time, validates consumption with
//! `check()` before the call site is accepted, and keeps only its own
//! compact state for per-message evaluation.
//!
//! ```text
//! parse_csv($msg)
//! parse_csv($msg, delimiter=";", strip_whitespace=true)
//! parse_csv($msg, columns=["host", "program", "message"], greedy=true)
//! ```

use std::rc::Rc;

use crate::Error;
use crate::args::FunctionArgs;
use crate::expr::{EvalContext, Expr, ExprRef};
use crate::value::{Value, val};

const USAGE: &str = "Usage: parse_csv(msg_str, columns=[...], delimiter=\",\", \
                     greedy=false, strip_whitespace=false)";

/// Quote pairs recognized by the column scanner
const QUOTE_CHARS: [char; 2] = ['"', '\''];

pub struct ParseCsv {
    function_name: String,
    msg: ExprRef,
    columns: Option<ExprRef>,
    delimiters: String,
    greedy: bool,
    strip_whitespace: bool,
}

fn ctor_error(message: impl std::fmt::Display) -> Error {
    Error::CtorError(format!("{message}. {USAGE}"))
}

/// Builds a `parse_csv` call site from its argument container
pub fn parse_csv_ctor(function_name: &str, args: FunctionArgs) -> Result<ExprRef, Error> {
    if args.len() != 1 {
        return Err(ctor_error("invalid number of arguments"));
    }
    let msg = match args.get_expr(0) {
        Some(expr) => expr,
        None => return Err(ctor_error("argument must be set: msg_str")),
    };

    let columns = args.get_named_expr("columns");

    let delimiters = match args.get_named_literal_string("delimiter") {
        Ok(Some(d)) if d.is_empty() => return Err(ctor_error("delimiter can not be empty")),
        Ok(Some(d)) => d,
        Ok(None) => ",".to_owned(),
        Err(e) => return Err(ctor_error(e)),
    };

    let greedy = args
        .get_named_literal_boolean("greedy")
        .map_err(ctor_error)?
        .unwrap_or(false);

    let strip_whitespace = args
        .get_named_literal_boolean("strip_whitespace")
        .map_err(ctor_error)?
        .unwrap_or(false);

    args.check()?;

    Ok(Rc::new(ParseCsv {
        function_name: format!("{function_name}()"),
        msg,
        columns,
        delimiters,
        greedy,
        strip_whitespace,
    }))
}

/// Splits an input line into columns: a column either runs to the next
/// delimiter character or, when it opens with a quote, to the matching
/// closing quote.
struct ColumnScanner<'a> {
    /// None once the input is exhausted; Some("") still owes one (empty)
    /// column, which is how trailing delimiters are represented
    rest: Option<&'a str>,
    delimiters: &'a str,
    strip_whitespace: bool,
}

impl<'a> ColumnScanner<'a> {
    fn new(input: &'a str, delimiters: &'a str, strip_whitespace: bool) -> Self {
        ColumnScanner {
            rest: Some(input),
            delimiters,
            strip_whitespace,
        }
    }

    /// Hand out everything not yet scanned; used for greedy last columns
    fn take_rest(&mut self) -> Option<String> {
        let rest = self.rest.take()?;
        Some(self.finish(rest))
    }

    fn finish(&self, column: &str) -> String {
        if self.strip_whitespace {
            column.trim().to_owned()
        } else {
            column.to_owned()
        }
    }
}

impl Iterator for ColumnScanner<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let rest = self.rest.take()?;

        let (column, after) = if let Some(quote) = rest.chars().next().filter(|c| QUOTE_CHARS.contains(c)) {
            let body = &rest[quote.len_utf8()..];
            match body.find(quote) {
                Some(close) => {
                    // Everything between the delimiter after the closing
                    // quote and the quote itself is dropped
                    let tail = &body[close + quote.len_utf8()..];
                    (&body[..close], tail.find(|c| self.delimiters.contains(c)).map(|i| {
                        let delim_len = tail[i..].chars().next().map_or(0, char::len_utf8);
                        &tail[i + delim_len..]
                    }))
                }
                // Unterminated quote: the column runs to the end of input
                None => (body, None),
            }
        } else {
            match rest.find(|c| self.delimiters.contains(c)) {
                Some(i) => {
                    let delim_len = rest[i..].chars().next().map_or(0, char::len_utf8);
                    (&rest[..i], Some(&rest[i + delim_len..]))
                }
                None => (rest, None),
            }
        };

        self.rest = after;
        Some(self.finish(column))
    }
}

impl ParseCsv {
    fn eval_columns(&self, ctx: &EvalContext) -> Result<Option<Vec<String>>, Error> {
        let Some(columns_expr) = &self.columns else {
            return Ok(None);
        };

        let value = columns_expr.eval(ctx)?;
        let Value::List(items) = value else {
            return Err(Error::argument_error(
                &self.function_name,
                "columns must be a list",
            ));
        };

        let mut names = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(name) => names.push(name),
                _ => {
                    return Err(Error::argument_error(
                        &self.function_name,
                        "column names must be strings",
                    ));
                }
            }
        }
        Ok(Some(names))
    }
}

impl Expr for ParseCsv {
    fn eval(&self, ctx: &EvalContext) -> Result<Value, Error> {
        let msg = self.msg.eval(ctx)?;
        let input = msg.as_str().ok_or_else(|| {
            Error::argument_error(&self.function_name, "msg_str must be a string")
        })?;

        let columns = self.eval_columns(ctx)?;
        let mut scanner = ColumnScanner::new(input, &self.delimiters, self.strip_whitespace);

        match columns {
            Some(names) => {
                let mut entries = Vec::with_capacity(names.len());
                let last = names.len().checked_sub(1);
                for (i, name) in names.into_iter().enumerate() {
                    // A greedy last column swallows the rest of the line,
                    // delimiters included
                    let column = if self.greedy && Some(i) == last {
                        scanner.take_rest()
                    } else {
                        scanner.next()
                    };
                    match column {
                        Some(column) => entries.push((name, val(column))),
                        // Fewer columns than names: stop, keep what we have
                        None => break,
                    }
                }
                Ok(Value::Dict(entries))
            }
            None => Ok(Value::List(scanner.map(val).collect())),
        }
    }
}
