use super::*;

/// [`VariableResolver`] scanning templates for balanced `${...}` placeholders.
///
/// * Placeholders nest, `${key-${suffix}}` resolves `suffix` first and then looks up
///   the resulting key.
/// * Looked up values are resolved again, so values may contain placeholders.
/// * Missing keys keep their placeholder, `${missing}` stays `${missing}`.
/// * A key which recurs while its own value is being expanded counts as missing.
/// * An unterminated `${` and all text after it are kept literally.
///
/// ```
/// use propconf::*;
/// let lookup = |key: &str| match key {
///     "suffix" => Some("abc".to_owned()),
///     "key-abc" => Some("xyz".to_owned()),
///     _ => None,
/// };
/// let resolver = StandardVariableResolver;
/// assert_eq!("xyz", resolver.resolve_str("${key-${suffix}}", Some(&lookup)));
/// assert_eq!("${foo}", resolver.resolve_str("${foo}", Some(&lookup)));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardVariableResolver;

/// Byte length of a placeholder body, the text between `${` and its closing `}`.
fn body_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                depth += 1;
                i += 2;
                continue;
            }
            b'}' if depth == 0 => return Some(i),
            b'}' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    None
}

impl StandardVariableResolver {
    fn expand(
        &self,
        template: &str,
        lookup: Option<&dyn Lookup>,
        active: &mut Vec<String>,
    ) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(pos) = rest.find(START) {
            out.push_str(&rest[..pos]);
            let body = &rest[pos + START.len()..];
            match body_len(body) {
                Some(len) => {
                    out.push_str(&self.substitute(&body[..len], lookup, active));
                    rest = &body[len + 1..];
                }
                None => {
                    out.push_str(&rest[pos..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    fn substitute(
        &self,
        body: &str,
        lookup: Option<&dyn Lookup>,
        active: &mut Vec<String>,
    ) -> String {
        let key = if body.contains(START) {
            self.expand(body, lookup, active)
        } else {
            body.to_owned()
        };
        let value = match lookup {
            Some(l) if !active.contains(&key) => l.lookup(&key),
            _ => None,
        };
        match value {
            Some(v) => {
                active.push(key);
                let v = self.expand(&v, lookup, active);
                active.pop();
                v
            }
            None => unresolved(&key),
        }
    }
}

impl VariableResolver for StandardVariableResolver {
    fn resolve_str(&self, template: &str, lookup: Option<&dyn Lookup>) -> String {
        self.expand(template, lookup, &mut vec![])
    }
}
