//! End-to-end resolution of documents laid out on disk

use raml_ir::{Cursor, FileSystem, Node, SchemaFragment};
use raml_parser::{DocumentDecoder, Error, ParameterType, Parser, ParserConfig, YamlDecoder};
use raml_schema::SchemaParser;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("fixture directory");
    }
    fs::write(&path, content).expect("fixture file");
    path
}

/// Decoder that counts how many documents it decoded
#[derive(Clone, Default)]
struct CountingDecoder {
    calls: Arc<AtomicUsize>,
}

impl DocumentDecoder for CountingDecoder {
    fn decode(&self, text: &str, origin: &Path) -> raml_parser::Result<Node> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        YamlDecoder::new().decode(text, origin)
    }
}

/// Schema parser claiming every `.xsd` file and every `<schema` inline value
struct TaggingParser {
    name: &'static str,
}

impl SchemaParser for TaggingParser {
    fn name(&self) -> &str {
        self.name
    }

    fn can_parse_file(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "xsd")
    }

    fn can_parse_inline(&self, value: &Node) -> bool {
        value.as_str().is_some_and(|text| text.starts_with("<schema"))
    }

    fn parse_file(
        &self,
        path: &Path,
        _fs: &dyn FileSystem,
    ) -> raml_schema::Result<SchemaFragment> {
        Ok(SchemaFragment::new(
            self.name,
            serde_json::json!({ "file": path.file_name().map(|n| n.to_string_lossy().into_owned()) }),
        ))
    }

    fn parse_inline(
        &self,
        text: &str,
        _base_dir: &Path,
        _fs: &dyn FileSystem,
    ) -> raml_schema::Result<SchemaFragment> {
        Ok(SchemaFragment::new(self.name, serde_json::json!({ "inline": text })))
    }
}

fn library_fixture() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    write(
        dir.path(),
        "traits/secured.raml",
        "headers:\n  Authorization:\n    description: Token for <<resourcePathName>>\n",
    );
    write(
        dir.path(),
        "traits/paged.raml",
        "queryParameters:\n  page:\n    type: integer\n    example: <<defaultPage>>\n",
    );
    write(
        dir.path(),
        "types/collection.raml",
        "get:\n  description: List <<resourcePathName>>\npost:\n  description: Create in <<resourcePath>>\n",
    );
    write(
        dir.path(),
        "schemas/widget.json",
        r##"{"definitions": {"id": {"type": "integer"}}, "properties": {"id": {"$ref": "#/definitions/id"}}}"##,
    );
    let root = write(
        dir.path(),
        "api.raml",
        r#"#%RAML 0.8
title: Widgets
version: v1
traits:
  - secured: !include traits/secured.raml
  - paged: !include traits/paged.raml
resourceTypes:
  - collection: !include types/collection.raml
/widgets:
  type: collection
  get:
    is: [ secured, paged: { defaultPage: 1 } ]
    responses:
      200:
        body:
          application/json:
            schema: !include schemas/widget.json
  /{id}:
    get:
      is: [secured]
"#,
    );
    (dir, root)
}

#[test]
fn test_full_pipeline_on_disk() {
    let (_dir, root) = library_fixture();
    let api = Parser::new().parse(&root).unwrap();

    assert_eq!(api.title(), Some("Widgets"));
    assert_eq!(api.version().as_deref(), Some("v1"));

    let widgets = api.resource("/widgets").unwrap();
    let get = widgets.method("get").unwrap();
    assert_eq!(get.get("description"), Some(&Node::from("List widgets")));
    assert!(get.get("is").is_none());
    assert!(widgets.body().get("type").is_none());

    let auth = Cursor::new(get)
        .navigate(&["headers", "Authorization", "description"])
        .unwrap();
    assert_eq!(auth.node().as_str(), Some("Token for widgets"));

    let params = widgets.query_parameters("get").unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].0, "page");
    assert_eq!(params[0].1.param_type(), ParameterType::Integer);
    assert_eq!(params[0].1.example(), Some("1"));

    let post = widgets.method("post").unwrap();
    assert_eq!(post.get("description"), Some(&Node::from("Create in /widgets")));

    let item = api.resource("/widgets/{id}").unwrap();
    let description = Cursor::new(item.body())
        .navigate(&["get", "headers", "Authorization", "description"])
        .unwrap();
    assert_eq!(description.node().as_str(), Some("Token for widgets"));
}

#[test]
fn test_included_json_schema_is_dereferenced() {
    let (_dir, root) = library_fixture();
    let api = Parser::new().parse(&root).unwrap();

    let schema = Cursor::new(api.root())
        .navigate(&[
            "/widgets",
            "get",
            "responses",
            "200",
            "body",
            "application/json",
            "schema",
        ])
        .unwrap();
    let fragment = schema.node().as_schema().unwrap();
    assert_eq!(fragment.value["properties"]["id"]["type"], "integer");
}

#[test]
fn test_each_include_decoded_once() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "shared/error.raml", "description: Failure\n");
    let root = write(
        dir.path(),
        "api.raml",
        "title: T\n/a:\n  get:\n    responses:\n      500: !include shared/error.raml\n/b:\n  get:\n    responses:\n      500: !include shared/error.raml\n",
    );

    let decoder = CountingDecoder::default();
    let calls = Arc::clone(&decoder.calls);
    let mut parser = Parser::new().with_decoder(decoder);
    let api = parser.parse(&root).unwrap();

    // root plus one decode of the shared file
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(parser.cache().hits(), 1);

    let a = Cursor::new(api.root())
        .navigate(&["/a", "get", "responses", "500"])
        .unwrap();
    let b = Cursor::new(api.root())
        .navigate(&["/b", "get", "responses", "500"])
        .unwrap();
    assert_eq!(a.node(), b.node());
}

#[test]
fn test_first_matching_schema_parser_wins() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "order.xsd", "<schema/>");
    let root = write(
        dir.path(),
        "api.raml",
        "title: T\nfile: !include order.xsd\ninline: '<schema name=\"x\"/>'\n",
    );

    let mut parser = Parser::new();
    parser
        .register_schema_parser(TaggingParser { name: "first" })
        .register_schema_parser(TaggingParser { name: "second" });
    let api = parser.parse(&root).unwrap();

    let file = api.root().get("file").and_then(Node::as_schema).unwrap();
    assert_eq!(file.format, "first");
    assert_eq!(file.value["file"], "order.xsd");

    let inline = api.root().get("inline").and_then(Node::as_schema).unwrap();
    assert_eq!(inline.format, "first");
    assert_eq!(inline.value["inline"], "<schema name=\"x\"/>");
}

#[test]
fn test_unsupported_include_extension() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "order.xsd", "<schema/>");
    let root = write(dir.path(), "api.raml", "title: T\nfile: !include order.xsd\n");

    let err = Parser::new().parse(&root).unwrap_err();
    assert!(matches!(err, Error::UnsupportedExtension { extension } if extension == "xsd"));

    let api = Parser::new()
        .with_config(ParserConfig::new().parse_schemas(false))
        .parse(&root)
        .unwrap();
    assert_eq!(api.root().get("file"), Some(&Node::from("<schema/>")));
}

#[test]
fn test_missing_include_does_not_abort() {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = write(
        dir.path(),
        "api.raml",
        "title: T\ndocumentation: !include docs/missing.raml\n",
    );

    let api = Parser::new().parse(&root).unwrap();
    let documentation = api.root().get("documentation").unwrap();
    assert!(documentation.is_absent());
    assert_eq!(
        api.unresolved_includes(),
        vec![("documentation".to_string(), "docs/missing.raml".to_string())]
    );
}

#[test]
fn test_document_without_includes_round_trips() {
    let dir = tempfile::tempdir().expect("temp dir");
    let text = "title: Plain\nversion: 2\nflags: [true, false]\nratio: 0.5\nmissing: null\n/x:\n  get:\n    description: Nothing special\n";
    let root = write(dir.path(), "api.raml", text);

    let api = Parser::new().parse(&root).unwrap();
    let expected = YamlDecoder::new().decode(text, &root).unwrap();
    assert_eq!(api.root(), &expected);
}

#[test]
fn test_untouched_scalars_serialize_byte_identical() {
    let dir = tempfile::tempdir().expect("temp dir");
    let text = "title: Plain\nversion: 1.0\nratio: 0.25\ncount: 3\nbeta: true\n/x:\n  get:\n    description: Nothing special\n";
    let root = write(dir.path(), "api.raml", text);

    let api = Parser::new().parse(&root).unwrap();
    assert_eq!(api.version().as_deref(), Some("1.0"));
    assert_eq!(serde_yaml::to_string(api.root()).unwrap(), text);
}

#[test]
fn test_float_binding_substituted_with_fraction() {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = write(
        dir.path(),
        "api.raml",
        "traits:\n  - versioned: {description: v<<v>>}\n/a:\n  get:\n    is: [versioned: {v: 2.0}]\n",
    );

    let api = Parser::new().parse(&root).unwrap();
    let get = api.resource("/a").and_then(|a| a.method("get")).unwrap();
    assert_eq!(get.get("description"), Some(&Node::from("v2.0")));
}

#[test]
fn test_parsing_twice_gives_same_tree() {
    let (_dir, root) = library_fixture();
    let mut parser = Parser::new();

    let first = parser.parse(&root).unwrap();
    let second = parser.parse(&root).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_relative_includes_follow_including_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "a/b/leaf.yaml", "value: deep\n");
    write(dir.path(), "a/mid.raml", "leaf: !include b/leaf.yaml\n");
    let root = write(dir.path(), "api.raml", "title: T\nmid: !include a/mid.raml\n");

    let api = Parser::new().parse(&root).unwrap();
    let value = Cursor::new(api.root())
        .navigate(&["mid", "leaf", "value"])
        .unwrap();
    assert_eq!(value.node().as_str(), Some("deep"));
}

#[test]
fn test_empty_root_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = write(dir.path(), "api.raml", "");

    let err = Parser::new().parse(&root).unwrap_err();
    assert!(matches!(err, Error::EmptyDocument { .. }));
}
