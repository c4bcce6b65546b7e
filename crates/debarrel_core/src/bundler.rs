//! Bundler configuration loading.
//!
//! Only the module-resolution part of a webpack-style configuration is read
//! (`resolve.alias`, `resolve.extensions`, `resolve.modules`,
//! `resolve.mainFields`, `resolve.mainFiles`). JSON configs are deserialized
//! directly. JavaScript/TypeScript configs are parsed and their exported value
//! is evaluated statically: literals, `__dirname`, `path.resolve(...)`,
//! `path.join(...)` and references to top-level `const` bindings. Anything
//! else (function configs, computed values) is skipped or rejected.

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, trace, warn};
use oxc_ast::ast::*;
use path_clean::clean;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    parser::parse_source,
    types::{Alias, AliasTarget},
};

/// Guards against `const a = b; const b = a;` style loops
const MAX_EVAL_DEPTH: usize = 32;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BundlerConfig {
    pub resolve: ResolveSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolveSection {
    pub alias: AliasSpec,
    pub extensions: Option<Vec<String>>,
    pub modules: Option<Vec<String>>,
    pub main_fields: Option<Vec<String>>,
    pub main_files: Option<Vec<String>>,
}

/// webpack accepts both `{ key: target }` and `[{ name, alias, onlyModule }]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AliasSpec {
    Map(Map<String, Value>),
    List(Vec<AliasItem>),
}

impl Default for AliasSpec {
    fn default() -> Self {
        AliasSpec::Map(Map::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasItem {
    pub name: String,
    pub alias: Value,
    #[serde(default)]
    pub only_module: bool,
}

impl BundlerConfig {
    /// Converts `resolve.alias` into resolver aliases. Relative targets are
    /// taken relative to `config_dir`.
    pub fn aliases(&self, config_dir: &Path) -> Vec<Alias> {
        let entries: Vec<(String, bool, &Value)> = match &self.resolve.alias {
            AliasSpec::Map(map) => map
                .iter()
                .map(|(key, value)| match key.strip_suffix('$') {
                    Some(exact_key) => (exact_key.to_string(), true, value),
                    None => (key.clone(), false, value),
                })
                .collect(),
            AliasSpec::List(items) => {
                items.iter().map(|item| (item.name.clone(), item.only_module, &item.alias)).collect()
            }
        };

        entries
            .into_iter()
            .filter_map(|(key, exact, value)| {
                let targets = alias_targets(value, config_dir);
                if targets.is_empty() {
                    trace!("Skipping alias '{}' with unsupported target {:?}", key, value);
                    return None;
                }
                Some(Alias { key, exact, targets })
            })
            .collect()
    }
}

fn alias_targets(value: &Value, config_dir: &Path) -> Vec<AliasTarget> {
    match value {
        Value::Bool(false) => vec![AliasTarget::Ignore],
        Value::String(s) => vec![alias_target(s, config_dir)],
        Value::Array(items) => {
            items.iter().filter_map(|v| v.as_str()).map(|s| alias_target(s, config_dir)).collect()
        }
        _ => Vec::new(),
    }
}

fn alias_target(target: &str, config_dir: &Path) -> AliasTarget {
    if Path::new(target).is_absolute() {
        AliasTarget::Path(clean(target))
    } else if target.starts_with("./") || target.starts_with("../") {
        AliasTarget::Path(clean(config_dir.join(target)))
    } else {
        AliasTarget::Request(target.to_string())
    }
}

/// Loads entry `index` of the bundler configuration at `path`.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_bundler_config(path: &Path, index: usize) -> Result<Option<BundlerConfig>> {
    if !path.is_file() {
        warn!("Bundler config {} not found, using default resolution", path.display());
        return Ok(None);
    }
    debug!("Loading bundler config entry {} from {}", index, path.display());

    let src = fs::read_to_string(path)
        .with_context(|| format!("Failed to read bundler config {}", path.display()))?;
    let config_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let value = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str::<Value>(&src)
            .with_context(|| format!("Failed to parse bundler config {}", path.display()))?,
        _ => evaluate_config_source(path, &src, config_dir)?,
    };

    let entry = match value {
        Value::Array(mut entries) => {
            let count = entries.len();
            if index >= count {
                bail!(
                    "Bundler config {} has {} entries, index {} is out of range",
                    path.display(),
                    count,
                    index
                );
            }
            entries.swap_remove(index)
        }
        other if index == 0 => other,
        _ => bail!(
            "Bundler config {} exports a single configuration, index {} is out of range",
            path.display(),
            index
        ),
    };

    let config: BundlerConfig = serde_json::from_value(entry)
        .with_context(|| format!("Unsupported resolve options in {}", path.display()))?;
    debug!(
        "Bundler config: {} aliases, extensions={:?}, modules={:?}",
        config.aliases(config_dir).len(),
        config.resolve.extensions,
        config.resolve.modules
    );
    Ok(Some(config))
}

fn evaluate_config_source(path: &Path, src: &str, config_dir: &Path) -> Result<Value> {
    parse_source(path, src, |program| {
        let scope = Scope::from_program(program, config_dir);
        let exported = exported_expression(program)
            .ok_or_else(|| anyhow!("{} has no `module.exports` or `export default`", path.display()))?;
        scope
            .eval(exported, 0)
            .ok_or_else(|| anyhow!("Could not statically evaluate the config in {}", path.display()))
    })?
}

fn exported_expression<'p, 'a>(program: &'p Program<'a>) -> Option<&'p Expression<'a>> {
    let mut exported = None;
    for stmt in &program.body {
        match stmt {
            Statement::ExpressionStatement(es) => {
                if let Expression::AssignmentExpression(ae) = &es.expression
                    && let AssignmentTarget::StaticMemberExpression(member) = &ae.left
                    && let Expression::Identifier(object) = &member.object
                    && object.name.as_str() == "module"
                    && member.property.name.as_str() == "exports"
                {
                    exported = Some(&ae.right);
                }
            }
            Statement::ExportDefaultDeclaration(decl) => {
                if let Some(expr) = decl.declaration.as_expression() {
                    exported = Some(expr);
                }
            }
            _ => {}
        }
    }
    exported
}

/// Top-level `const`/`let`/`var` initializers plus `__dirname`.
struct Scope<'p, 'a> {
    dirname: PathBuf,
    bindings: HashMap<String, &'p Expression<'a>>,
}

impl<'p, 'a> Scope<'p, 'a> {
    fn from_program(program: &'p Program<'a>, config_dir: &Path) -> Self {
        let mut bindings = HashMap::new();
        for stmt in &program.body {
            if let Statement::VariableDeclaration(vd) = stmt {
                for decl in &vd.declarations {
                    if let (Some(name), Some(init)) = (decl.id.get_identifier_name(), &decl.init) {
                        bindings.insert(name.to_string(), init);
                    }
                }
            }
        }
        Scope { dirname: config_dir.to_path_buf(), bindings }
    }

    fn eval(&self, expr: &Expression<'a>, depth: usize) -> Option<Value> {
        if depth > MAX_EVAL_DEPTH {
            return None;
        }
        match expr {
            Expression::StringLiteral(s) => Some(Value::String(s.value.to_string())),
            Expression::NumericLiteral(n) => serde_json::Number::from_f64(n.value).map(Value::Number),
            Expression::BooleanLiteral(b) => Some(Value::Bool(b.value)),
            Expression::NullLiteral(_) => Some(Value::Null),
            Expression::TemplateLiteral(t) if t.expressions.is_empty() && t.quasis.len() == 1 => {
                t.quasis[0].value.cooked.as_ref().map(|c| Value::String(c.to_string()))
            }
            Expression::Identifier(ident) if ident.name.as_str() == "__dirname" => {
                Some(Value::String(self.dirname.to_string_lossy().to_string()))
            }
            Expression::Identifier(ident) => {
                let init = self.bindings.get(ident.name.as_str())?;
                self.eval(init, depth + 1)
            }
            Expression::ArrayExpression(array) => {
                let items = array
                    .elements
                    .iter()
                    .filter_map(|el| el.as_expression())
                    .filter_map(|el| self.eval(el, depth + 1))
                    .collect();
                Some(Value::Array(items))
            }
            Expression::ObjectExpression(object) => {
                let mut map = Map::new();
                for prop in &object.properties {
                    match prop {
                        ObjectPropertyKind::ObjectProperty(p) => {
                            let key = match &p.key {
                                PropertyKey::StaticIdentifier(ident) => ident.name.to_string(),
                                PropertyKey::StringLiteral(lit) => lit.value.to_string(),
                                _ => continue,
                            };
                            match self.eval(&p.value, depth + 1) {
                                Some(value) => {
                                    map.insert(key, value);
                                }
                                None => trace!("Skipping non-static config property '{}'", key),
                            }
                        }
                        ObjectPropertyKind::SpreadProperty(spread) => {
                            if let Some(Value::Object(inner)) = self.eval(&spread.argument, depth + 1)
                            {
                                map.extend(inner);
                            }
                        }
                    }
                }
                Some(Value::Object(map))
            }
            Expression::CallExpression(call) => self.eval_path_call(call, depth),
            Expression::ParenthesizedExpression(p) => self.eval(&p.expression, depth + 1),
            Expression::TSAsExpression(e) => self.eval(&e.expression, depth + 1),
            Expression::TSSatisfiesExpression(e) => self.eval(&e.expression, depth + 1),
            _ => None,
        }
    }

    /// `path.resolve(...)`, `path.join(...)` and their destructured forms.
    fn eval_path_call(&self, call: &CallExpression<'a>, depth: usize) -> Option<Value> {
        let function = match &call.callee {
            Expression::StaticMemberExpression(member) => member.property.name.as_str(),
            Expression::Identifier(ident) => ident.name.as_str(),
            _ => return None,
        };

        let mut parts = Vec::with_capacity(call.arguments.len());
        for arg in &call.arguments {
            match self.eval(arg.as_expression()?, depth + 1)? {
                Value::String(s) => parts.push(s),
                _ => return None,
            }
        }

        let joined = match function {
            "resolve" => parts.iter().fold(self.dirname.clone(), |acc, part| acc.join(part)),
            "join" => parts.iter().collect::<PathBuf>(),
            _ => return None,
        };
        Some(Value::String(clean(joined).to_string_lossy().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    #[test]
    fn test_missing_config_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_bundler_config(&temp_dir.path().join("webpack.config.js"), 0).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn test_commonjs_config_with_path_resolve() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let path = create_test_file(
            root,
            "webpack.config.js",
            r#"
const path = require('path');

module.exports = {
  entry: './src/index.js',
  resolve: {
    extensions: ['.js', '.jsx'],
    alias: {
      '@': path.resolve(__dirname, 'src'),
      'lodash$': 'lodash-es',
      'fs': false,
    },
    modules: [path.join(__dirname, 'src'), 'node_modules'],
  },
  plugins: [new SomePlugin()],
};
"#,
        );

        let config = load_bundler_config(&path, 0).unwrap().unwrap();
        assert_eq!(config.resolve.extensions, Some(vec![".js".to_string(), ".jsx".to_string()]));
        assert_eq!(
            config.resolve.modules,
            Some(vec![root.join("src").to_string_lossy().to_string(), "node_modules".to_string()])
        );

        let aliases = config.aliases(root);
        assert_eq!(aliases.len(), 3);
        let at = aliases.iter().find(|a| a.key == "@").unwrap();
        assert_eq!(at.targets, vec![AliasTarget::Path(root.join("src"))]);
        assert!(!at.exact);
        let lodash = aliases.iter().find(|a| a.key == "lodash").unwrap();
        assert!(lodash.exact);
        assert_eq!(lodash.targets, vec![AliasTarget::Request("lodash-es".to_string())]);
        let fs_alias = aliases.iter().find(|a| a.key == "fs").unwrap();
        assert_eq!(fs_alias.targets, vec![AliasTarget::Ignore]);
    }

    #[test]
    fn test_config_through_const_binding_and_array_index() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let path = create_test_file(
            root,
            "webpack.config.js",
            r#"
const shared = { extensions: ['.ts', '.js'] };
const client = { resolve: { ...shared, mainFields: ['browser', 'module', 'main'] } };
const server = { resolve: { ...shared, alias: { '~': './server' } } };
module.exports = [client, server];
"#,
        );

        let client = load_bundler_config(&path, 0).unwrap().unwrap();
        assert_eq!(
            client.resolve.main_fields,
            Some(vec!["browser".to_string(), "module".to_string(), "main".to_string()])
        );
        assert!(client.aliases(root).is_empty());

        let server = load_bundler_config(&path, 1).unwrap().unwrap();
        assert_eq!(server.resolve.extensions, Some(vec![".ts".to_string(), ".js".to_string()]));
        assert_eq!(
            server.aliases(root)[0].targets,
            vec![AliasTarget::Path(root.join("server"))]
        );

        assert!(load_bundler_config(&path, 2).is_err());
    }

    #[test]
    fn test_esm_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_test_file(
            temp_dir.path(),
            "webpack.config.mjs",
            "export default { resolve: { mainFiles: ['index', 'main'] } };",
        );

        let config = load_bundler_config(&path, 0).unwrap().unwrap();
        assert_eq!(config.resolve.main_files, Some(vec!["index".to_string(), "main".to_string()]));
    }

    #[test]
    fn test_json_config_with_alias_list() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let path = create_test_file(
            root,
            "bundler.json",
            r#"{ "resolve": { "alias": [ { "name": "ui", "alias": "./packages/ui", "onlyModule": true } ] } }"#,
        );

        let config = load_bundler_config(&path, 0).unwrap().unwrap();
        let aliases = config.aliases(root);
        assert_eq!(aliases.len(), 1);
        assert!(aliases[0].exact);
        assert_eq!(aliases[0].targets, vec![AliasTarget::Path(root.join("packages/ui"))]);

        assert!(load_bundler_config(&path, 1).is_err());
    }

    #[test]
    fn test_function_config_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_test_file(
            temp_dir.path(),
            "webpack.config.js",
            "module.exports = (env) => ({ resolve: {} });",
        );

        assert!(load_bundler_config(&path, 0).is_err());
    }
}
