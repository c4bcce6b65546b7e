use oxc_syntax::identifier::is_identifier_name;

use crate::types::NamedBinding;

/// Produces the import statements the rewrite emits.
///
/// The engine only decides which bindings go to which module; implementors
/// decide what an import statement is (source text, syntax nodes, …).
pub trait ImportBuilder {
    type Output;

    /// `import local from 'source'`
    fn default_import(&mut self, local: &str, source: &str) -> Self::Output;

    /// `import { imported as local, … } from 'source'`
    fn named_import(&mut self, bindings: &[NamedBinding], source: &str) -> Self::Output;
}

/// Renders imports as source text.
#[derive(Debug, Clone, Copy)]
pub struct SourceTextBuilder {
    quote: char,
}

impl Default for SourceTextBuilder {
    fn default() -> Self {
        SourceTextBuilder { quote: '\'' }
    }
}

impl SourceTextBuilder {
    pub fn with_quote(quote: char) -> Self {
        SourceTextBuilder { quote }
    }

    fn string_literal(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len() + 2);
        out.push(self.quote);
        for c in value.chars() {
            if c == self.quote || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push(self.quote);
        out
    }

    fn export_name(&self, name: &str) -> String {
        if is_identifier_name(name) { name.to_string() } else { self.string_literal(name) }
    }

    fn binding(&self, binding: &NamedBinding) -> String {
        let mut out = String::new();
        if binding.is_type {
            out.push_str("type ");
        }
        out.push_str(&self.export_name(&binding.imported));
        if binding.imported != binding.local {
            out.push_str(" as ");
            out.push_str(&binding.local);
        }
        out
    }
}

impl ImportBuilder for SourceTextBuilder {
    type Output = String;

    fn default_import(&mut self, local: &str, source: &str) -> String {
        format!("import {} from {};", local, self.string_literal(source))
    }

    fn named_import(&mut self, bindings: &[NamedBinding], source: &str) -> String {
        let clause = bindings.iter().map(|b| self.binding(b)).collect::<Vec<_>>().join(", ");
        format!("import {{ {} }} from {};", clause, self.string_literal(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_import() {
        let mut builder = SourceTextBuilder::default();
        assert_eq!(builder.default_import("Button", "./Button"), "import Button from './Button';");
    }

    #[test]
    fn test_named_import_aliases() {
        let mut builder = SourceTextBuilder::with_quote('"');
        let bindings = vec![
            NamedBinding::new("a", "a"),
            NamedBinding::new("b", "c"),
            NamedBinding { imported: "Props".to_string(), local: "Props".to_string(), is_type: true },
        ];
        assert_eq!(
            builder.named_import(&bindings, "../ui/a"),
            r#"import { a, b as c, type Props } from "../ui/a";"#
        );
    }

    #[test]
    fn test_non_identifier_export_name() {
        let mut builder = SourceTextBuilder::default();
        let bindings = vec![NamedBinding::new("my-name", "myName")];
        assert_eq!(
            builder.named_import(&bindings, "./it's"),
            r"import { 'my-name' as myName } from './it\'s';"
        );
    }
}
