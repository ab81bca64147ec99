use std::cell::RefCell;
use std::rc::Rc;

use sprig::{encode_query, render_template, wrap, Document, EventHandler, Target};

#[test]
fn selection_matches_document_order() {
    let doc = Document::parse(
        "<section><p id=one></p></section><p id=two></p><div><p id=three></p></div>",
    )
    .unwrap();
    let ids: Vec<String> = wrap(&doc, "p")
        .unwrap()
        .nodes()
        .iter()
        .map(|&id| doc.arena().get(id).unwrap().attr("id").unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["one", "two", "three"]);
}

#[test]
fn find_equals_direct_scoped_query() {
    let doc = Document::parse("<div id=box><span></span><span></span></div><span></span>").unwrap();
    let boxed = wrap(&doc, "#box").unwrap();
    let via_find = boxed.find("span").unwrap();
    let direct = doc.wrap_within("span", boxed.first().unwrap()).unwrap();
    assert_eq!(via_find.nodes(), direct.nodes());
}

#[test]
fn setters_cover_every_member_getters_read_first() {
    let doc = Document::parse("<input><input><input>").unwrap();
    let inputs = wrap(&doc, "input").unwrap();
    inputs.set_value("shared").set_attribute("data-n", "3");

    for &node in inputs.nodes() {
        assert_eq!(doc.arena().get(node).unwrap().value, "shared");
        assert_eq!(doc.arena().get(node).unwrap().attr("data-n"), Some("3"));
    }
    assert_eq!(inputs.value().unwrap(), "shared");
}

#[test]
fn append_text_extends_prior_html() {
    let doc = Document::parse("<div><b>keep</b></div>").unwrap();
    let div = wrap(&doc, "div").unwrap();
    let before = div.html().unwrap();
    div.append("X").unwrap();
    assert_eq!(div.html().unwrap(), format!("{before}X"));
}

#[test]
fn template_and_query_encoding_round() {
    assert_eq!(encode_query(&[("a", 1), ("b", 2)]), "a=1&b=2");
    assert_eq!(
        render_template("hi {{ name }}", &[("name", "Sam")]),
        "hi Sam"
    );
    assert_eq!(
        render_template("untouched {{ missing }}", &[("name", "Sam")]),
        "untouched {{ missing }}"
    );
}

#[test]
fn templated_markup_feeds_the_tree() {
    let doc = Document::parse("<ul id=list></ul>").unwrap();
    let row = render_template("<li data-user=\"{{ user }}\">{{ user }}</li>", &[("user", "ada")]);
    wrap(&doc, "#list").unwrap().append(row.as_str()).unwrap();

    let added = wrap(&doc, "li[data-user=ada]").unwrap();
    assert_eq!(added.len(), 1);
    assert_eq!(added.html().unwrap(), "ada");
}

#[test]
fn events_flow_through_the_facade() {
    let doc = Document::parse("<button id=go></button>").unwrap();
    let clicks = Rc::new(RefCell::new(0));
    let clicks_in = Rc::clone(&clicks);

    let button = wrap(&doc, "#go").unwrap();
    button.on(
        "click",
        &EventHandler::new(move |_, _| {
            *clicks_in.borrow_mut() += 1;
        }),
        false,
    );
    button.trigger("click").unwrap();
    button.trigger("click").unwrap();
    assert_eq!(*clicks.borrow(), 2);
}

#[test]
fn document_target_wraps_the_root() {
    let doc = Document::parse("<p></p>").unwrap();
    let root = wrap(&doc, Target::Root).unwrap();
    assert_eq!(root.nodes(), &[doc.root()]);

    let fired = Rc::new(RefCell::new(false));
    let fired_in = Rc::clone(&fired);
    root.ready(&EventHandler::new(move |_, _| {
        *fired_in.borrow_mut() = true;
    }));
    doc.signal_ready().unwrap();
    assert!(*fired.borrow());
}
