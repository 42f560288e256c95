use super::*;
use ::regex::{Captures, Regex};

lazy_static::lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\$\{(.+?)\}").expect("valid placeholder pattern");
}

/// [`VariableResolver`] matching placeholders with a regular expression.
///
/// Placeholders do not nest, `${a-${b}}` looks up the key `a-${b`. Empty keys are not
/// placeholders. Use [`StandardVariableResolver`](crate::StandardVariableResolver)
/// for nested keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexVariableResolver;

impl RegexVariableResolver {
    fn expand(&self, template: &str, lookup: &dyn Lookup, active: &mut Vec<String>) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| {
                let key = &caps[1];
                if active.iter().any(|k| k == key) {
                    return caps[0].to_owned();
                }
                match lookup.lookup(key) {
                    Some(v) => {
                        active.push(key.to_owned());
                        let v = self.expand(&v, lookup, active);
                        active.pop();
                        v
                    }
                    None => caps[0].to_owned(),
                }
            })
            .into_owned()
    }
}

impl VariableResolver for RegexVariableResolver {
    fn resolve_str(&self, template: &str, lookup: Option<&dyn Lookup>) -> String {
        match lookup {
            Some(l) => self.expand(template, l, &mut vec![]),
            None => template.to_owned(),
        }
    }
}
