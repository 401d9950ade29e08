//! Command templating
//!
//! A deliberately small template language. Text between `{` and `}` is a
//! field path rooted at one of four variables:
//!
//! - `repo`: the repository the command runs against, with workspace-aware
//!   remotes (`{repo.remotes.origin.remote_path}`)
//! - `user`: the repository's owner (absent for ownerless bare repositories)
//! - `repos`: every repository by id (`{repos.upstream.path}`)
//! - `users`: every user by id (`{users.bob.email}`)
//!
//! Path segments are `.field`, `[key]` or `["key"]`. `{{` and `}}` produce
//! literal braces. Nothing is ever evaluated.

use serde_json::{Map, Value};
use std::iter::Peekable;
use std::str::Chars;

use crate::domain::ExecutionContext;
use crate::error::TemplateError;
use crate::view::{RepositoryView, repository_value, user_value};

/// Values the four template variables are bound to
#[derive(Debug, Clone)]
pub struct TemplateScope {
    repo: Value,
    user: Value,
    repos: Value,
    users: Value,
}

impl TemplateScope {
    /// Binds the variables for commands running against `view`
    pub fn new(context: &ExecutionContext, view: &RepositoryView<'_>) -> Self {
        let repos: Map<String, Value> = context
            .repos
            .iter()
            .map(|(id, repository)| (id.clone(), repository_value(repository)))
            .collect();
        let users: Map<String, Value> = context
            .users
            .iter()
            .map(|(id, user)| (id.clone(), user_value(user)))
            .collect();

        Self {
            repo: view.to_value(),
            user: view.owner().map(user_value).unwrap_or(Value::Null),
            repos: Value::Object(repos),
            users: Value::Object(users),
        }
    }

    fn variable(&self, name: &str) -> Option<&Value> {
        match name {
            "repo" => Some(&self.repo),
            "user" => Some(&self.user),
            "repos" => Some(&self.repos),
            "users" => Some(&self.users),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Expression {
    source: String,
    variable: String,
    fields: Vec<String>,
}

/// A parsed command template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parses template text, rejecting malformed expressions
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.char_indices().peekable();

        while let Some((position, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut source = String::new();
                    let mut closed = false;
                    while let Some((inner, c)) = chars.next() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => {
                                return Err(TemplateError::Malformed {
                                    position: inner,
                                    reason: "nested '{' inside expression".to_string(),
                                });
                            }
                            c => source.push(c),
                        }
                    }
                    if !closed {
                        return Err(TemplateError::Malformed {
                            position,
                            reason: "unterminated expression".to_string(),
                        });
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Expression(Expression::parse(
                        source.trim(),
                        position,
                    )?));
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '}' => {
                    return Err(TemplateError::Malformed {
                        position,
                        reason: "unmatched '}'".to_string(),
                    });
                }
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Renders the template against `scope`
    pub fn render(&self, scope: &TemplateScope) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Expression(expression) => out.push_str(&expression.evaluate(scope)?),
            }
        }
        Ok(out)
    }
}

impl Expression {
    fn parse(source: &str, position: usize) -> Result<Self, TemplateError> {
        let malformed = |reason: String| TemplateError::Malformed {
            position,
            reason: format!("{reason} in '{{{source}}}'"),
        };

        let mut chars = source.chars().peekable();
        let variable =
            read_identifier(&mut chars).ok_or_else(|| malformed("expected a variable".into()))?;

        let mut fields = Vec::new();
        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    let field = read_identifier(&mut chars)
                        .ok_or_else(|| malformed("expected a field after '.'".into()))?;
                    fields.push(field);
                }
                '[' => {
                    let mut key = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        key.push(c);
                    }
                    if !closed {
                        return Err(malformed("unterminated '['".into()));
                    }
                    let key = unquote(key.trim());
                    if key.is_empty() {
                        return Err(malformed("empty key".into()));
                    }
                    fields.push(key.to_string());
                }
                other => return Err(malformed(format!("unexpected character '{other}'"))),
            }
        }

        Ok(Self {
            source: source.to_string(),
            variable,
            fields,
        })
    }

    fn evaluate(&self, scope: &TemplateScope) -> Result<String, TemplateError> {
        let mut current =
            scope
                .variable(&self.variable)
                .ok_or_else(|| TemplateError::UndefinedVariable {
                    expression: self.source.clone(),
                    variable: self.variable.clone(),
                })?;

        for field in &self.fields {
            current = match current {
                Value::Object(map) => map.get(field).ok_or_else(|| TemplateError::UnknownField {
                    expression: self.source.clone(),
                    field: field.clone(),
                })?,
                Value::Null => return Err(self.absent()),
                _ => {
                    return Err(TemplateError::UnknownField {
                        expression: self.source.clone(),
                        field: field.clone(),
                    });
                }
            };
        }

        match current {
            Value::String(s) => Ok(s.clone()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Null => Err(self.absent()),
            Value::Array(_) | Value::Object(_) => Err(TemplateError::NotScalar {
                expression: self.source.clone(),
            }),
        }
    }

    fn absent(&self) -> TemplateError {
        TemplateError::Absent {
            expression: self.source.clone(),
        }
    }
}

fn read_identifier(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let mut identifier = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '_' || c == '-' {
            identifier.push(c);
            chars.next();
        } else {
            break;
        }
    }
    (!identifier.is_empty()).then_some(identifier)
}

fn unquote(key: &str) -> &str {
    for quote in ['"', '\''] {
        if key.len() >= 2 && key.starts_with(quote) && key.ends_with(quote) {
            return &key[1..key.len() - 1];
        }
    }
    key
}
