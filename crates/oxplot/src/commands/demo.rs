use oxplot_ast::{
    arena::Arena,
    attrs,
    container::Shapes,
    document::Document,
    error::Error,
};

use crate::{
    args::{RunCommand, WriteArgs},
    config::Config,
};

#[derive(clap::Args, Debug)]
/// Writes a scene of spokes over a gradient-filled square
pub struct Demo {
    #[clap(flatten)]
    pub write: WriteArgs,
}

impl RunCommand for Demo {
    fn run(self, config: Config) -> anyhow::Result<()> {
        let options = self.write.options(config.output.as_ref())?;
        let arena = Arena::new();
        let document = Demo::scene(&arena)?;
        self.write.write(document, &options)
    }
}

impl Demo {
    /// The distance between spokes, in degrees
    const SPOKE_ANGLE: usize = 30;
    /// The length of each spoke
    const SPOKE_LENGTH: f64 = 70.0;

    /// Builds the demonstration scene
    ///
    /// # Errors
    /// If an element cannot be created
    pub fn scene<'arena>(arena: &'arena Arena<'arena>) -> Result<Document<'arena>, Error> {
        let document = Document::new(arena, attrs! { width: "150", height: "150" })?;

        let spokes = document.group(attrs! { stroke: "black", transform: "translate(75,75)" })?;
        for angle in (0_u32..=360).step_by(Self::SPOKE_ANGLE) {
            let radians = f64::from(angle).to_radians();
            spokes.line(attrs! {
                x1: 0,
                y1: 0,
                x2: Self::SPOKE_LENGTH * radians.sin(),
                y2: Self::SPOKE_LENGTH * radians.cos(),
            })?;
        }

        let gradient = document
            .defs()
            .linear_gradient(attrs! {}.with("id", "MyGradient"))?;
        gradient.stop(attrs! { offset: "5%", stop_color: "#F60" })?;
        gradient.stop(attrs! { offset: "95%", stop_color: "#FF6" })?;

        document.rect(attrs! {
            fill: "url(#MyGradient)",
            stroke: "black",
            stroke_width: 5,
            x: 0,
            y: 0,
            width: 150,
            height: 150,
        })?;
        log::debug!(
            "built demo with {} elements",
            document.root().descendants().count()
        );
        Ok(document)
    }
}

#[test]
fn demo_scene() -> anyhow::Result<()> {
    use oxplot_ast::{container::Container, serialize::WriteOptions};
    use oxplot_serialize::xmlwriter::{self, Indent};

    let arena = Arena::new();
    let document = Demo::scene(&arena)?;
    assert_eq!(document.width()?, 150);
    assert_eq!(document.height()?, 150);

    let spokes = document
        .root()
        .children()
        .nth(1)
        .ok_or(anyhow::anyhow!("missing spokes"))?;
    assert_eq!(spokes.child_count(), 13);
    assert_eq!(
        document.defs().node().first_child().map(|n| n.tag().to_string()),
        Some(String::from("linearGradient"))
    );

    let markup = document.to_string_with(&WriteOptions {
        header: false,
        format: xmlwriter::Options {
            indent: Indent::Spaces(2),
            ..xmlwriter::Options::default()
        },
        ..WriteOptions::default()
    })?;
    let lines: Vec<_> = markup.lines().collect();
    assert_eq!(lines[1], "  <defs>");
    assert_eq!(
        lines[2],
        r#"    <linearGradient id="MyGradient">"#
    );
    assert_eq!(
        lines[3],
        r##"      <stop offset="5%" stop-color="#F60"/>"##
    );
    assert_eq!(
        lines[7],
        r#"  <g stroke="black" transform="translate(75,75)">"#
    );
    assert_eq!(
        lines[8],
        r#"    <line x1="0" y1="0" x2="0" y2="70"/>"#
    );
    assert_eq!(
        lines[lines.len() - 2],
        r#"  <rect fill="url(#MyGradient)" stroke="black" stroke-width="5" x="0" y="0" width="150" height="150"/>"#
    );
    Ok(())
}
