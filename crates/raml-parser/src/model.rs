//! Typed accessors over a resolved document

use crate::{Error, Result};
use raml_ir::{Node, Scalar, for_each_leaf};
use std::fmt;
use std::str::FromStr;

/// HTTP methods recognized as resource operations
pub const HTTP_METHODS: [&str; 9] = [
    "get", "post", "put", "patch", "delete", "head", "options", "trace", "connect",
];

/// A fully resolved API definition
#[derive(Debug, Clone, PartialEq)]
pub struct ApiDefinition {
    root: Node,
}

impl ApiDefinition {
    /// Wrap a resolved tree
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    pub fn title(&self) -> Option<&str> {
        self.root.get("title").and_then(Node::as_str)
    }

    /// `version` as text (`v1` and `1.0` are both common)
    pub fn version(&self) -> Option<String> {
        self.root
            .get("version")
            .and_then(Node::as_scalar)
            .map(Scalar::as_text)
    }

    pub fn base_uri(&self) -> Option<&str> {
        self.root.get("baseUri").and_then(Node::as_str)
    }

    /// Raw `traits` collection
    pub fn traits(&self) -> Option<&Node> {
        self.root.get("traits")
    }

    /// Raw `resourceTypes` collection
    pub fn resource_types(&self) -> Option<&Node> {
        self.root.get("resourceTypes")
    }

    /// Top-level resources in document order
    pub fn resources(&self) -> Vec<Resource<'_>> {
        child_resources("", &self.root)
    }

    /// Every resource, depth first, nested resources after their parent
    pub fn all_resources(&self) -> Vec<Resource<'_>> {
        let mut out = Vec::new();
        let mut pending = self.resources();
        pending.reverse();
        while let Some(resource) = pending.pop() {
            let mut nested = resource.resources();
            nested.reverse();
            pending.extend(nested);
            out.push(resource);
        }
        out
    }

    /// Includes that could not be read, as `(location, file name)` pairs in
    /// document order. The location joins the key path with `.`.
    pub fn unresolved_includes(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for_each_leaf(&self.root, &mut |path, leaf| {
            if let Node::Absent(file_name) = leaf {
                out.push((path.join("."), file_name.clone()));
            }
        });
        out
    }

    /// Look up a resource by its full path, e.g. `/widgets/{id}`
    pub fn resource(&self, path: &str) -> Option<Resource<'_>> {
        find_resource(self.resources(), path)
    }
}

fn find_resource<'a>(candidates: Vec<Resource<'a>>, path: &str) -> Option<Resource<'a>> {
    for candidate in candidates {
        if candidate.path == path {
            return Some(candidate);
        }
        if path.starts_with(candidate.path.as_str()) {
            if let Some(found) = find_resource(candidate.resources(), path) {
                return Some(found);
            }
        }
    }
    None
}

fn child_resources<'a>(parent_path: &str, node: &'a Node) -> Vec<Resource<'a>> {
    node.as_map()
        .map(|map| {
            map.iter()
                .filter(|(key, _)| key.starts_with('/'))
                .map(|(key, body)| Resource {
                    path: format!("{}{}", parent_path, key),
                    key,
                    body,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// A resource (path segment) of the API
#[derive(Debug, Clone, PartialEq)]
pub struct Resource<'a> {
    path: String,
    key: &'a str,
    body: &'a Node,
}

impl<'a> Resource<'a> {
    /// Full path from the API root
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path relative to the parent resource (the map key)
    pub fn relative_path(&self) -> &'a str {
        self.key
    }

    pub fn body(&self) -> &'a Node {
        self.body
    }

    pub fn display_name(&self) -> Option<&'a str> {
        self.body.get("displayName").and_then(Node::as_str)
    }

    pub fn description(&self) -> Option<&'a str> {
        self.body.get("description").and_then(Node::as_str)
    }

    /// Body of an HTTP method, if the resource defines it
    pub fn method(&self, name: &str) -> Option<&'a Node> {
        self.body.get(&name.to_ascii_lowercase())
    }

    /// HTTP methods present on this resource, in document order
    pub fn methods(&self) -> Vec<&'a str> {
        self.body
            .as_map()
            .map(|map| {
                map.keys()
                    .filter(|key| HTTP_METHODS.contains(key))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Nested resources
    pub fn resources(&self) -> Vec<Resource<'a>> {
        child_resources(&self.path, self.body)
    }

    /// Query parameters declared on a method, in document order
    pub fn query_parameters(&self, method: &str) -> Result<Vec<(String, QueryParameter)>> {
        let Some(params) = self
            .method(method)
            .and_then(|body| body.get("queryParameters"))
            .and_then(Node::as_map)
        else {
            return Ok(Vec::new());
        };

        params
            .iter()
            .map(|(name, node)| Ok((name.to_string(), QueryParameter::from_node(node)?)))
            .collect()
    }
}

/// Allowed query parameter types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterType {
    #[default]
    String,
    Number,
    Integer,
    Date,
    Boolean,
    File,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Number => "number",
            ParameterType::Integer => "integer",
            ParameterType::Date => "date",
            ParameterType::Boolean => "boolean",
            ParameterType::File => "file",
        }
    }
}

impl FromStr for ParameterType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "string" => Ok(ParameterType::String),
            "number" => Ok(ParameterType::Number),
            "integer" => Ok(ParameterType::Integer),
            "date" => Ok(ParameterType::Date),
            "boolean" => Ok(ParameterType::Boolean),
            "file" => Ok(ParameterType::File),
            other => Err(Error::invalid_type(other)),
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named query parameter of a method
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameter {
    display_name: Option<String>,
    description: Option<String>,
    param_type: ParameterType,
    example: Option<String>,
    required: bool,
}

impl QueryParameter {
    /// Build a parameter; `param_type` must be one of the [`ParameterType`] names
    pub fn new(
        display_name: Option<String>,
        description: Option<String>,
        param_type: &str,
        example: Option<String>,
        required: bool,
    ) -> Result<Self> {
        Ok(Self {
            display_name,
            description,
            param_type: param_type.parse()?,
            example,
            required,
        })
    }

    /// Build a parameter from its declaration; a missing `type` means `string`
    pub fn from_node(node: &Node) -> Result<Self> {
        let text = |key: &str| node.get(key).and_then(Node::as_scalar).map(Scalar::as_text);

        let param_type = match node.get("type") {
            None => ParameterType::default(),
            Some(Node::Scalar(scalar)) => scalar.as_text().parse()?,
            Some(other) => return Err(Error::invalid_type(other.kind())),
        };

        let required = node
            .get("required")
            .and_then(Node::as_scalar)
            .is_some_and(truthy);

        Ok(Self {
            display_name: text("displayName"),
            description: text("description"),
            param_type,
            example: text("example"),
            required,
        })
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn param_type(&self) -> ParameterType {
        self.param_type
    }

    pub fn example(&self) -> Option<&str> {
        self.example.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

fn truthy(scalar: &Scalar) -> bool {
    match scalar {
        Scalar::Bool(b) => *b,
        Scalar::Integer(i) => *i != 0,
        Scalar::Float(f) => f.value() != 0.0,
        Scalar::String(s) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
        Scalar::Null => false,
    }
}
