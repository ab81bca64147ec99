//! Literal template substitution.
//!
//! Tokens are delimiter-wrapped keys, whitespace-tolerant around the key:
//! `{{ name }}`, `{{name}}` and `{{  name  }}` all name the same token.
//! Keys are substituted sequentially in record order, so a later key can
//! match text introduced by an earlier substitution. Values are inserted
//! verbatim, and tokens without a record entry stay untouched.

use std::fmt::Display;

/// Delimiter pair for template tokens.
#[derive(Debug, Clone)]
pub struct Template {
    open: String,
    close: String,
}

impl Default for Template {
    fn default() -> Self {
        Self::new("{{", "}}")
    }
}

impl Template {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    pub fn render<K, V>(&self, template: &str, record: &[(K, V)]) -> String
    where
        K: AsRef<str>,
        V: Display,
    {
        let mut out = template.to_string();
        for (key, value) in record {
            out = self.replace_token(&out, key.as_ref(), &value.to_string());
        }
        out
    }

    /// Replaces every occurrence of one key's token in a single pass.
    fn replace_token(&self, input: &str, key: &str, value: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(start) = rest.find(self.open.as_str()) {
            let after_open = &rest[start + self.open.len()..];
            match token_length(after_open, key, &self.close) {
                Some(consumed) => {
                    out.push_str(&rest[..start]);
                    out.push_str(value);
                    rest = &after_open[consumed..];
                }
                None => {
                    // Not this key's token; keep the delimiter and move on.
                    out.push_str(&rest[..start + self.open.len()]);
                    rest = after_open;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Length of `ws key ws close` at the start of `s`, if present.
fn token_length(s: &str, key: &str, close: &str) -> Option<usize> {
    let after_ws = s.trim_start();
    let mut consumed = s.len() - after_ws.len();
    let after_key = after_ws.strip_prefix(key)?;
    consumed += key.len();
    let after_inner_ws = after_key.trim_start();
    consumed += after_key.len() - after_inner_ws.len();
    after_inner_ws.strip_prefix(close)?;
    Some(consumed + close.len())
}

/// Substitution with the default `{{` / `}}` delimiters.
pub fn render_template<K, V>(template: &str, record: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: Display,
{
    Template::default().render(template, record)
}
