//! Unit tests for the source buffer and template catalog.

use super::*;
use std::io::Write;

fn template(id: &str) -> Template {
    Template {
        id: id.into(),
        name: format!("Template {}", id),
        html: format!("<p>{}</p>", id),
        css: format!(".{} {{}}", id),
        js: format!("console.log('{}');", id),
    }
}

#[test]
fn builtin_catalog_starts_with_welcome() {
    let catalog = TemplateCatalog::builtin().unwrap();
    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.default_template().id, "welcome");
    assert_eq!(catalog.default_template().name, "Plantilla: Bienvenida");
    assert!(catalog.default_template().html.contains("myButton"));

    let ids: Vec<_> = catalog.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["welcome", "portfolio", "blank"]);
}

#[test]
fn find_by_id_reports_unknown_templates() {
    let catalog = TemplateCatalog::builtin().unwrap();
    assert_eq!(catalog.find_by_id("blank").unwrap().name, "Plantilla: En Blanco");
    assert!(matches!(
        catalog.find_by_id("nope"),
        Err(CatalogError::UnknownTemplate(id)) if id == "nope"
    ));
}

#[test]
fn catalog_rejects_duplicates_and_empty_lists() {
    assert!(matches!(TemplateCatalog::new(vec![]), Err(CatalogError::Empty)));
    assert!(matches!(
        TemplateCatalog::new(vec![template("a"), template("a")]),
        Err(CatalogError::DuplicateId(id)) if id == "a"
    ));
    assert!(matches!(
        TemplateCatalog::new(vec![template(" ")]),
        Err(CatalogError::EmptyId)
    ));
}

#[test]
fn catalog_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[templates]]
id = "card"
name = "Card"
html = "<div class='card'></div>"
css = ".card {{ padding: 1rem; }}"
js = ""
"#
    )
    .unwrap();

    let catalog = TemplateCatalog::from_path(file.path()).unwrap();
    assert_eq!(catalog.summaries(), vec![TemplateSummary { id: "card".into(), name: "Card".into() }]);
    assert_eq!(catalog.default_template().css, ".card { padding: 1rem; }");
}

#[test]
fn catalog_parse_errors_surface() {
    assert!(matches!(
        TemplateCatalog::from_toml_str("[[templates]]\nid = 3"),
        Err(CatalogError::Parse(_))
    ));
    assert!(matches!(
        TemplateCatalog::from_path("/definitely/not/here.toml"),
        Err(CatalogError::Io(_))
    ));
}

#[test]
fn loading_a_template_overwrites_everything() {
    let mut buffer = SourceBuffer::from_template(&template("first"));
    buffer.set(FileKind::Css, "body { color: red; }");
    assert!(buffer.is_edited());

    let second = template("second");
    buffer.load_template(&second);

    assert_eq!(buffer.markup(), second.html);
    assert_eq!(buffer.style(), second.css);
    assert_eq!(buffer.script(), second.js);
    assert_eq!(buffer.active_template_id(), "second");
    assert!(!buffer.is_edited());
}

#[test]
fn set_touches_one_field_and_keeps_template_id() {
    let mut buffer = SourceBuffer::from_template(&template("base"));
    buffer.set(FileKind::JavaScript, "let x = 1;");

    assert_eq!(buffer.get(FileKind::JavaScript), "let x = 1;");
    assert_eq!(buffer.markup(), "<p>base</p>");
    assert_eq!(buffer.style(), ".base {}");
    assert_eq!(buffer.active_template_id(), "base");
}

#[test]
fn file_kind_parsing() {
    assert_eq!("HTML".parse::<FileKind>().unwrap(), FileKind::Html);
    assert_eq!("css".parse::<FileKind>().unwrap(), FileKind::Css);
    assert_eq!("js".parse::<FileKind>().unwrap(), FileKind::JavaScript);
    assert_eq!("JavaScript".parse::<FileKind>().unwrap(), FileKind::JavaScript);
    assert!("Error".parse::<FileKind>().is_err());
    assert_eq!(FileKind::JavaScript.to_string(), "JavaScript");
}
