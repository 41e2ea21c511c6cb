//! Tag tree to backend output.
//!
//! [`compile_part`] is the one place that decides which [`Syntax`] operation
//! each tag kind becomes.

use crate::error::CompileError;
use crate::syntax::Syntax;
use suit_parser::{Tag, TagKind, TemplatePart, Variable};
use suit_runtime::Filter;

/// Compiles a parsed part of the template `template` with `syntax`.
pub fn compile_part<S: Syntax>(
    syntax: &S,
    template: &str,
    part: &TemplatePart,
) -> Result<S::Output, CompileError> {
    Codegen { syntax, template }.part(part)
}

struct Codegen<'a, S> {
    syntax: &'a S,
    template: &'a str,
}

impl<S: Syntax> Codegen<'_, S> {
    fn part(&self, part: &TemplatePart) -> Result<S::Output, CompileError> {
        let children = part
            .children()
            .iter()
            .map(|tag| self.tag(tag))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.syntax.literal(part.pieces(), children))
    }

    /// Condition text is evaluated later, so its literal text is respelled
    /// for the backend.
    fn condition_part(&self, part: &TemplatePart) -> Result<S::Output, CompileError> {
        let pieces = self.syntax.spell_condition(part.pieces());
        let children = part
            .children()
            .iter()
            .map(|tag| self.tag(tag))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.syntax.literal(&pieces, children))
    }

    /// Include overlays are JSON text; every embedded tag contributes a JSON value.
    fn overlay_part(&self, part: &TemplatePart) -> Result<S::Output, CompileError> {
        let children = part
            .children()
            .iter()
            .map(|tag| {
                let value = match &tag.kind {
                    TagKind::Var(var) | TagKind::IterationVar(var) => {
                        self.variable(tag, var, false)?
                    }
                    _ => self.tag(tag)?,
                };
                Ok(self.syntax.json(value))
            })
            .collect::<Result<Vec<_>, CompileError>>()?;
        Ok(self.syntax.literal(part.pieces(), children))
    }

    fn tag(&self, tag: &Tag) -> Result<S::Output, CompileError> {
        let syntax = self.syntax;
        match &tag.kind {
            TagKind::IterationKey(key) => Ok(syntax.loop_key(&key.name, key.modifier.as_deref())),
            TagKind::IterationVar(var) => self.variable(tag, var, false),
            TagKind::Var(var) => self.variable(tag, var, true),
            TagKind::Condition(condition) => Ok(syntax.condition(
                self.condition_part(&condition.condition)?,
                self.part(&condition.on_true)?,
                self.part(&condition.on_false)?,
            )),
            TagKind::List(list) => {
                let body = self.part(&list.body)?;
                let iterable = self.variable(tag, &list.iterable, false)?;
                Ok(syntax.list(body, &list.key_var, iterable))
            }
            TagKind::Expression(expression) => Ok(syntax.expression(self.part(&expression.body)?)),
            TagKind::Breakpoint(breakpoint) => {
                if let Some(target) = &breakpoint.include {
                    return Err(self.unsupported(
                        tag,
                        format!("include of `{target}` was not resolved"),
                    ));
                }
                let body = self.part(&breakpoint.body)?;
                match &breakpoint.data {
                    Some(overlay) => Ok(syntax.scope(self.overlay_part(overlay)?, body)),
                    None => Ok(body),
                }
            }
            TagKind::Generic => Err(self.unsupported(
                tag,
                format!("`<{}>` is only allowed inside its enclosing tag", tag.name),
            )),
        }
    }

    fn variable(
        &self,
        tag: &Tag,
        var: &Variable,
        stringify: bool,
    ) -> Result<S::Output, CompileError> {
        let default = var
            .default
            .as_ref()
            .map(|default| self.part(default))
            .transpose()?;
        let mut value = self.syntax.var(&var.path, default);

        for call in &var.filters {
            let filter = Filter::from_name(&call.name).ok_or_else(|| {
                self.unsupported(tag, format!("unknown filter `{}`", call.name))
            })?;
            let argument = call
                .argument
                .as_ref()
                .map(|argument| self.part(argument))
                .transpose()?;
            if filter.takes_argument() && argument.is_none() {
                return Err(self.unsupported(
                    tag,
                    format!("filter `{filter}` requires a `{filter}-data` attribute"),
                ));
            }
            value = self.syntax.filter(filter, value, argument);
        }

        Ok(if stringify {
            self.syntax.stringify(value)
        } else {
            value
        })
    }

    fn unsupported(&self, tag: &Tag, message: String) -> CompileError {
        CompileError::Unsupported {
            template: self.template.to_string(),
            tag: tag.name.to_string(),
            message,
        }
    }
}
