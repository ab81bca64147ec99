//! Small tour of the chainable surface: select, mutate, template, encode.

use sprig::{render_template, wrap, Document, EventHandler, Target};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let doc = Document::parse(
        "<div id=\"feed\"><article class=\"post\">first</article></div>",
    )?;

    // Chained mutation over every match.
    wrap(&doc, ".post")?
        .set_attribute("data-seen", "true")
        .set_value("cached");

    // Template a new entry and append it.
    let entry = render_template(
        "<article class=\"post\">{{ title }} by {{ author }}</article>",
        &[("title", "Second post"), ("author", "sam")],
    );
    wrap(&doc, "#feed")?.append(entry.as_str())?;

    // React to a dispatched event.
    let posts = doc.select("article.post")?;
    posts.on(
        "select",
        &EventHandler::new(|_, event| {
            println!("selected node {}", event.target);
        }),
        false,
    );
    posts.trigger("select")?;

    wrap(&doc, Target::Root)?.ready(&EventHandler::new(|document, _| {
        println!("document ready: {} posts", document.select("article.post").map(|s| s.len()).unwrap_or(0));
    }));
    doc.signal_ready()?;

    println!("{}", doc.outer_html()?);
    Ok(())
}
