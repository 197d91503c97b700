//! Message templates: `"connected from ${client} port $port"`.
//!
//! A template is an expression that renders interleaved text and field
//! references against the current message. Field syntax is `$name` or
//! `${name}`; `$$` renders a literal dollar sign. Templates are forgiving
//! where field expressions are not: a referenced field the message does not
//! carry renders as the empty string instead of failing the evaluation.
//!
//! A template without any field reference is a compile-time constant and
//! reports itself as a literal, so the argument container's literal
//! getters accept such trivial templates.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::char,
    combinator::value,
    multi::many0,
};

use crate::Error;
use crate::expr::{EvalContext, Expr};
use crate::value::Value;

/// One segment of a compiled template
#[derive(Debug, Clone, PartialEq)]
enum TemplatePart {
    Text(String),
    Field(String),
}

/// A compiled message template
pub struct Template {
    parts: Vec<TemplatePart>,
}

fn is_field_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `$$` renders one literal dollar sign
fn parse_dollar_escape(input: &str) -> IResult<&str, TemplatePart> {
    value(TemplatePart::Text("$".to_owned()), tag("$$")).parse(input)
}

/// `${name}` - braced reference, name may contain anything but the brace
fn parse_braced_field(input: &str) -> IResult<&str, TemplatePart> {
    let (input, _) = tag("${").parse(input)?;
    let (input, name) = take_while1(|c: char| c != '}').parse(input)?;
    let (input, _) = char('}').parse(input)?;
    Ok((input, TemplatePart::Field(name.to_owned())))
}

/// `$name` - bare reference, name is alphanumeric plus underscore
fn parse_bare_field(input: &str) -> IResult<&str, TemplatePart> {
    let (input, _) = char('$').parse(input)?;
    let (input, name) = take_while1(is_field_name_char).parse(input)?;
    Ok((input, TemplatePart::Field(name.to_owned())))
}

/// Plain text runs to the next dollar sign
fn parse_text(input: &str) -> IResult<&str, TemplatePart> {
    let (input, text) = take_while1(|c: char| c != '$').parse(input)?;
    Ok((input, TemplatePart::Text(text.to_owned())))
}

fn parse_part(input: &str) -> IResult<&str, TemplatePart> {
    alt((
        parse_dollar_escape,
        parse_braced_field,
        parse_bare_field,
        parse_text,
    ))
    .parse(input)
}

impl Template {
    /// Compile a template string. Fails on a dangling `$` or an unclosed
    /// `${` reference.
    pub fn new(source: &str) -> Result<Self, Error> {
        let (rest, raw_parts) = many0(parse_part)
            .parse(source)
            .map_err(|_| Error::CtorError(format!("invalid template: \"{source}\"")))?;

        if !rest.is_empty() {
            let position = source.len() - rest.len();
            return Err(Error::CtorError(format!(
                "invalid template: stray '$' at position {position} in \"{source}\""
            )));
        }

        // Coalesce adjacent text runs (produced by $$ escapes) so is_literal
        // and rendering work on minimal parts
        let mut parts: Vec<TemplatePart> = Vec::with_capacity(raw_parts.len());
        for part in raw_parts {
            match (parts.last_mut(), &part) {
                (Some(TemplatePart::Text(prev)), TemplatePart::Text(next)) => {
                    prev.push_str(next);
                }
                _ => parts.push(part),
            }
        }

        Ok(Template { parts })
    }

    /// Render the template against a message
    pub fn format(&self, ctx: &EvalContext) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Text(text) => out.push_str(text),
                TemplatePart::Field(name) => {
                    if let Some(value) = ctx.field(name) {
                        out.push_str(&value.to_text());
                    }
                }
            }
        }
        out
    }
}

impl Expr for Template {
    fn eval(&self, ctx: &EvalContext) -> Result<Value, Error> {
        Ok(Value::String(self.format(ctx)))
    }

    /// A template with no field reference never depends on message state
    fn is_literal(&self) -> bool {
        !self
            .parts
            .iter()
            .any(|part| matches!(part, TemplatePart::Field(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::extract_literal_string;
    use crate::value::val;

    #[test]
    fn test_rendering() {
        let ctx = EvalContext::new()
            .with_field("client", "10.0.0.1")
            .with_field("port", 2222);

        let template = Template::new("connected from ${client} port $port").unwrap();
        assert_eq!(template.format(&ctx), "connected from 10.0.0.1 port 2222");
        assert_eq!(
            template.eval(&ctx).unwrap(),
            val("connected from 10.0.0.1 port 2222")
        );
    }

    #[test]
    fn test_unknown_field_renders_empty() {
        let ctx = EvalContext::new();
        let template = Template::new("[$missing]").unwrap();
        assert_eq!(template.format(&ctx), "[]");
    }

    #[test]
    fn test_dollar_escape() {
        let ctx = EvalContext::new().with_field("amount", 5);
        let template = Template::new("$$$amount total: $$5").unwrap();
        assert_eq!(template.format(&ctx), "$5 total: $5");
    }

    #[test]
    fn test_trivial_template_is_literal() {
        let trivial = Template::new("static text, $$ included").unwrap();
        assert!(trivial.is_literal());
        assert_eq!(
            extract_literal_string(&trivial),
            Some("static text, $ included".to_owned())
        );

        let dynamic = Template::new("host=$host").unwrap();
        assert!(!dynamic.is_literal());
        assert_eq!(extract_literal_string(&dynamic), None);
    }

    #[test]
    fn test_invalid_templates() {
        assert!(matches!(Template::new("dangling $"), Err(Error::CtorError(_))));
        assert!(matches!(Template::new("${unclosed"), Err(Error::CtorError(_))));
        assert!(Template::new("").unwrap().is_literal());
    }
}
