use abbrev_resolve::errors::ResolveError;
use abbrev_resolve::fragments::PreparsedAbbreviations;
use abbrev_resolve::resolution::{AbbreviationParser, ResourceResolver, TreeResolver};
use abbrev_resolve::resources::*;
use abbrev_resolve::types::*;
use serde_json::json;
use tempfile::TempDir;

const TABLE: &str = r#"{
    "html": {
        "snippets": { "cc:ie": "<!--[if IE]>|<![endif]-->" },
        "references": { "ol+": "ol>li", "link:css": "link[rel=stylesheet]" },
        "elements": { "img": { "name": "img", "empty": true } }
    },
    "xsl": {
        "extends": "html",
        "snippets": { "cc:ie": "xsl-override" }
    }
}"#;

const FRAGMENTS: &str = r#"{
    "ol>li": { "children": [ { "name": "ol", "children": [ { "name": "li", "has_implicit_repeat": true } ] } ] },
    "link[rel=stylesheet]": { "children": [ { "name": "link", "attributes": [ { "name": "rel", "value": "stylesheet" }, { "name": "href", "value": "" } ] } ] }
}"#;

#[test]
fn test_lookup_prefers_snippets_then_references_then_elements() {
    let table = ResourceTable::from_json_str(TABLE).unwrap();
    assert_eq!(
        table.lookup("cc:ie", "html").unwrap(),
        Some(Resource::Snippet("<!--[if IE]>|<![endif]-->".to_string()))
    );
    assert_eq!(
        table.lookup("ol+", "html").unwrap(),
        Some(Resource::Reference("ol>li".to_string()))
    );
    assert_eq!(
        table.lookup("img", "html").unwrap(),
        Some(Resource::Element(json!({ "name": "img", "empty": true })))
    );
    assert_eq!(table.lookup("section", "html").unwrap(), None);
}

#[test]
fn test_extends_falls_back_to_parent_syntax() {
    let table = ResourceTable::from_json_str(TABLE).unwrap();
    assert_eq!(
        table.lookup("cc:ie", "xsl").unwrap(),
        Some(Resource::Snippet("xsl-override".to_string()))
    );
    assert_eq!(
        table.lookup("ol+", "xsl").unwrap(),
        Some(Resource::Reference("ol>li".to_string()))
    );
}

#[test]
fn test_unknown_syntax_is_a_lookup_error() {
    let table = ResourceTable::from_json_str(TABLE).unwrap();
    let err = table
        .resolve_resource(&AbbreviationNode::new("div"), "haml")
        .unwrap_err();
    assert!(matches!(err, ResolveError::Lookup { .. }));
}

#[test]
fn test_cyclic_extends_is_a_lookup_error() {
    let mut table = ResourceTable::new();
    table.insert_syntax(
        "a",
        SyntaxResources {
            extends: Some("b".to_string()),
            ..SyntaxResources::default()
        },
    );
    table.insert_syntax(
        "b",
        SyntaxResources {
            extends: Some("a".to_string()),
            ..SyntaxResources::default()
        },
    );
    assert!(table.has_syntax("a"));
    assert!(matches!(table.lookup("x", "a"), Err(ResolveError::Lookup { .. })));
}

#[test]
fn test_unnamed_node_is_absent() {
    let table = ResourceTable::from_json_str(TABLE).unwrap();
    assert_eq!(
        table.resolve_resource(&AbbreviationNode::root(), "html").unwrap(),
        Resource::Absent
    );
}

#[test]
fn test_preparsed_parser_returns_fresh_copies() {
    let parser = PreparsedAbbreviations::from_json_str(FRAGMENTS).unwrap();
    assert_eq!(parser.len(), 2);

    let mut first = parser.parse("ol>li", "html").unwrap();
    first.children[0].set_attribute("start", "3");
    let second = parser.parse("ol>li", "html").unwrap();
    assert_eq!(second.children[0].attribute("start"), None);

    let err = parser.parse("dl>dt", "html").unwrap_err();
    assert!(matches!(err, ResolveError::Parse { .. }));
}

#[test]
fn test_table_and_fragments_resolve_a_tree() {
    let table = ResourceTable::from_json_str(TABLE).unwrap();
    let parser = PreparsedAbbreviations::from_json_str(FRAGMENTS).unwrap();
    let resolver = TreeResolver::new(&table, &parser);

    let mut tree = AbbreviationNode::root()
        .with_child(AbbreviationNode::new("ol+").with_repeat(4, false))
        .with_child(AbbreviationNode::new("link:css").with_attribute("href", "style.css"))
        .with_child(AbbreviationNode::new("img"));
    resolver.resolve(&mut tree, "html").unwrap();

    let names: Vec<&str> = tree
        .children
        .iter()
        .filter_map(|n| n.name.as_deref())
        .collect();
    assert_eq!(names, vec!["ol", "link", "img"]);
    assert_eq!(tree.children[0].children[0].repeat_count, 4);
    assert_eq!(tree.children[1].attribute("href"), Some("style.css"));
    assert_eq!(tree.children[1].attribute("rel"), Some("stylesheet"));
    assert!(matches!(tree.children[2].resource, Some(NodeResource::Element(_))));
}

#[test]
fn test_load_from_files() {
    let dir = TempDir::new().unwrap();
    let table_path = dir.path().join("resources.json");
    let fragments_path = dir.path().join("fragments.json");
    std::fs::write(&table_path, TABLE).unwrap();
    std::fs::write(&fragments_path, FRAGMENTS).unwrap();

    let table = ResourceTable::load(&table_path).unwrap();
    assert!(table.has_syntax("xsl"));
    let parser = PreparsedAbbreviations::load(&fragments_path).unwrap();
    assert!(!parser.is_empty());

    let missing = ResourceTable::load(&dir.path().join("missing.json"));
    assert!(matches!(missing, Err(ResolveError::Io(_))));
}
