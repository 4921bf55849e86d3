//! Schema derivation for tool signatures
//!
//! A tool declares its signature explicitly: a name, a rustdoc-style doc
//! comment, and an ordered list of parameters with their declared Rust types.
//! [`derive_schema`] turns that declaration into the JSON schema the model
//! sees. It is a pure function, so the same signature always yields the same
//! bytes.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::core::{DelegatorError, Result, ToolDefinition};

/// Semantic parameter types representable in a tool schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    /// Map a declared type to its schema type.
    ///
    /// Generic arguments are ignored (`Vec<String>` is an array), as are
    /// references and module paths.
    pub fn from_declared(declared: &str) -> Option<Self> {
        let trimmed = declared.trim().trim_start_matches('&').trim();
        let trimmed = match trimmed.strip_prefix('\'') {
            Some(lifetime) => lifetime
                .split_once(char::is_whitespace)
                .map(|(_, rest)| rest.trim())
                .unwrap_or(""),
            None => trimmed,
        };
        let trimmed = trimmed.strip_prefix("mut ").unwrap_or(trimmed).trim();

        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            return Some(ParamType::Array);
        }

        let base = trimmed.split('<').next().unwrap_or(trimmed).trim();
        let base = base.rsplit("::").next().unwrap_or(base);

        let ty = match base {
            "String" | "str" | "char" | "string" => ParamType::String,
            "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
            | "u128" | "usize" | "integer" => ParamType::Integer,
            "f32" | "f64" | "number" => ParamType::Number,
            "bool" | "boolean" => ParamType::Boolean,
            "Vec" | "VecDeque" | "HashSet" | "BTreeSet" | "list" | "array" => ParamType::Array,
            "HashMap" | "BTreeMap" | "Map" | "Value" | "dict" | "object" => ParamType::Object,
            _ => return None,
        };
        Some(ty)
    }

    /// Name used in the JSON schema
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
        }
    }

    /// Whether a JSON value is acceptable for this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => {
                value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Array => value.is_array(),
            ParamType::Object => value.is_object(),
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared parameter of a tool signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: String,
    pub declared_type: Option<String>,
}

/// Declared signature of a tool: name, doc comment, and parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSignature {
    pub name: String,
    pub doc: String,
    pub params: Vec<ParamDecl>,
}

impl ToolSignature {
    /// Start a signature for the tool with the given identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            params: Vec::new(),
        }
    }

    /// Attach the doc comment
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Declare a typed parameter
    pub fn param(mut self, name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        self.params.push(ParamDecl {
            name: name.into(),
            declared_type: Some(declared_type.into()),
        });
        self
    }

    /// Declare a parameter with no type annotation. Derivation rejects it.
    pub fn untyped_param(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamDecl {
            name: name.into(),
            declared_type: None,
        });
        self
    }
}

/// A parameter after derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
}

/// Output of schema derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedSchema {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
}

impl DerivedSchema {
    /// Names of required parameters. Every declared parameter is required.
    pub fn required(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    /// The `parameters` object of the function schema
    pub fn parameters_json(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.params {
            properties.insert(
                param.name.clone(),
                json!({
                    "type": param.param_type.as_str(),
                    "description": param.description,
                }),
            );
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required(),
        })
    }

    /// Full function tool definition
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(&self.name, &self.description, self.parameters_json())
    }
}

/// Parsed doc comment
#[derive(Debug, Default, PartialEq, Eq)]
struct DocComment {
    description: String,
    params: Vec<(String, String)>,
}

impl DocComment {
    fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.as_str())
    }
}

/// Parse a doc comment: first non-empty line is the description, parameter
/// lines are ``* `name` - text`` or `:param name: text`.
fn parse_doc(doc: &str) -> DocComment {
    let mut parsed = DocComment::default();

    for line in doc.lines() {
        let line = line.trim().trim_start_matches("///").trim();
        if line.is_empty() {
            continue;
        }

        if let Some(param) = parse_param_line(line) {
            parsed.params.push(param);
            continue;
        }

        if parsed.description.is_empty() && !line.starts_with('#') && !line.starts_with(':') {
            parsed.description = line.to_string();
        }
    }

    parsed
}

fn parse_param_line(line: &str) -> Option<(String, String)> {
    if let Some(rest) = line.strip_prefix(":param ") {
        let (name, desc) = rest.split_once(':')?;
        return Some((name.trim().to_string(), desc.trim().to_string()));
    }

    let rest = line
        .strip_prefix("* `")
        .or_else(|| line.strip_prefix("- `"))?;
    let (name, desc) = rest.split_once('`')?;
    let desc = desc.trim_start();
    let desc = desc
        .strip_prefix('-')
        .or_else(|| desc.strip_prefix(':'))
        .unwrap_or(desc);
    Some((name.trim().to_string(), desc.trim().to_string()))
}

/// Derive the schema for a signature.
///
/// Fails with [`DelegatorError::DuplicateParameter`],
/// [`DelegatorError::MissingParameterType`] or
/// [`DelegatorError::UnsupportedParameterType`]; all are registration-time
/// errors.
pub fn derive_schema(signature: &ToolSignature) -> Result<DerivedSchema> {
    let doc = parse_doc(&signature.doc);
    let mut params: Vec<ParamSpec> = Vec::with_capacity(signature.params.len());

    for decl in &signature.params {
        if params.iter().any(|p| p.name == decl.name) {
            return Err(DelegatorError::DuplicateParameter {
                tool: signature.name.clone(),
                param: decl.name.clone(),
            });
        }

        let declared =
            decl.declared_type
                .as_deref()
                .ok_or_else(|| DelegatorError::MissingParameterType {
                    tool: signature.name.clone(),
                    param: decl.name.clone(),
                })?;

        let param_type = ParamType::from_declared(declared).ok_or_else(|| {
            DelegatorError::UnsupportedParameterType {
                tool: signature.name.clone(),
                param: decl.name.clone(),
                declared: declared.to_string(),
            }
        })?;

        params.push(ParamSpec {
            name: decl.name.clone(),
            param_type,
            description: doc.param(&decl.name).unwrap_or_default().to_string(),
        });
    }

    Ok(DerivedSchema {
        name: signature.name.clone(),
        description: doc.description,
        params,
    })
}
