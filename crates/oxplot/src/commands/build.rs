use std::{fs::read_to_string, path::PathBuf};

use anyhow::{anyhow, Context};
use oxplot_ast::{
    arena::Arena,
    attribute::{Options, Value},
    container::Container,
    document::Document,
    node::Ref,
};
use serde::Deserialize;

use crate::{
    args::{RunCommand, WriteArgs},
    config::Config,
};

#[derive(clap::Args, Debug)]
/// Builds a document from a JSON scene description.
pub struct Build {
    /// The scene to build
    #[clap(value_parser)]
    pub scene: PathBuf,
    #[clap(flatten)]
    pub write: WriteArgs,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
/// The description of a document
pub struct Scene {
    /// Attributes of the `<svg>` element, in addition to its namespaces
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
    /// Elements attached to the `<svg>` element, after its `<defs>`
    #[serde(default)]
    pub children: Vec<SceneElement>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
/// The description of an element
pub struct SceneElement {
    /// The tag of the element
    pub element: String,
    /// Attributes of the element, where `_` in a key is written as `-`
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
    /// Text before the first child
    pub text: Option<String>,
    /// Text after the closing tag
    pub tail: Option<String>,
    /// Elements attached to this element
    #[serde(default)]
    pub children: Vec<SceneElement>,
}

impl RunCommand for Build {
    fn run(self, config: Config) -> anyhow::Result<()> {
        let options = self.write.options(config.output.as_ref())?;
        let source = read_to_string(&self.scene)
            .with_context(|| format!("Failed to read {}", self.scene.display()))?;
        let scene: Scene = serde_json::from_str(&source)
            .with_context(|| format!("Scene at {} cannot be parsed", self.scene.display()))?;

        let arena = Arena::new();
        let document = scene.build(&arena)?;
        self.write.write(document, &options)
    }
}

impl Scene {
    /// Creates a document with the scene's elements attached in order
    ///
    /// # Errors
    /// When an attribute cannot be converted, or an element cannot be created
    pub fn build<'arena>(&self, arena: &'arena Arena<'arena>) -> anyhow::Result<Document<'arena>> {
        let document = Document::new(arena, options(&self.attributes)?)?;
        for child in &self.children {
            child.build(document, document.root())?;
        }
        Ok(document)
    }
}

impl SceneElement {
    fn build<'arena>(&self, document: Document<'arena>, parent: Ref<'arena>) -> anyhow::Result<()> {
        let node = document
            .element(&self.element, options(&self.attributes)?.parent(parent))
            .with_context(|| format!("Failed to create <{}>", self.element))?;
        if let Some(text) = &self.text {
            node.set_text(text.as_str());
        }
        if let Some(tail) = &self.tail {
            node.set_tail(tail.as_str());
        }
        for child in &self.children {
            child.build(document, node)?;
        }
        Ok(())
    }
}

fn options<'arena>(
    attributes: &serde_json::Map<String, serde_json::Value>,
) -> anyhow::Result<Options<'arena>> {
    attributes
        .iter()
        .map(|(key, value)| -> anyhow::Result<(String, Value)> {
            let value = to_value(value).with_context(|| format!("Invalid value for `{key}`"))?;
            Ok((key.clone(), value))
        })
        .collect()
}

fn to_value(value: &serde_json::Value) -> anyhow::Result<Value> {
    use serde_json::Value as Json;

    Ok(match value {
        Json::String(s) => Value::Text(s.clone()),
        Json::Bool(b) => Value::Text(b.to_string()),
        Json::Number(n) => match n.as_i64() {
            Some(n) => Value::Integer(n),
            None => Value::Number(
                n.as_f64()
                    .ok_or_else(|| anyhow!("{n} cannot be represented as a number"))?,
            ),
        },
        Json::Array(items) => Value::List(
            items
                .iter()
                .map(to_value)
                .collect::<anyhow::Result<_>>()?,
        ),
        Json::Null | Json::Object(_) => {
            return Err(anyhow!("expected text, a number, or a list, found {value}"))
        }
    })
}

#[test]
fn build_scene() -> anyhow::Result<()> {
    use oxplot_ast::serialize::WriteOptions;

    let scene: Scene = serde_json::from_str(
        r##"{
        "attributes": { "width": 100, "height": 50, "viewBox": [0, 0, 100, 50] },
        "children": [
            {
                "element": "g",
                "attributes": { "stroke": "black", "stroke_width": 1.5 },
                "children": [
                    { "element": "line", "attributes": { "x2": 100, "y2": 50 } },
                    { "element": "text", "text": "origin", "tail": "" }
                ]
            },
            { "element": "use", "attributes": { "xlink:href": "#mark", "visible": true } }
        ]
    }"##,
    )?;

    let arena = Arena::new();
    let document = scene.build(&arena)?;
    let markup = document.to_string_with(&WriteOptions {
        header: false,
        ..WriteOptions::default()
    })?;
    insta::assert_snapshot!(markup, @r##"<svg version="1.1" xmlns="http://www.w3.org/2000/svg" xmlns:svg="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="100" height="50" viewBox="0, 0, 100, 50"><defs/><g stroke="black" stroke-width="1.5"><line x2="100" y2="50"/><text>origin</text></g><use xlink:href="#mark" visible="true"/></svg>"##);
    Ok(())
}

#[test]
fn build_rejects_invalid_scenes() -> anyhow::Result<()> {
    let scene: Scene = serde_json::from_str(
        r#"{ "children": [{ "element": "rect", "attributes": { "fill": { "r": 1 } } }] }"#,
    )?;
    let arena = Arena::new();
    let err = scene.build(&arena).expect_err("objects are not attribute values");
    assert_eq!(err.to_string(), "Invalid value for `fill`");

    let scene: Scene =
        serde_json::from_str(r#"{ "children": [{ "element": "not a tag" }] }"#)?;
    let err = scene.build(&arena).expect_err("tags must be valid names");
    assert_eq!(err.to_string(), "Failed to create <not a tag>");

    assert!(serde_json::from_str::<Scene>(r#"{ "child": [] }"#).is_err());
    Ok(())
}
