use super::*;

fn list_fixture(harness: &mut Harness) -> Result<NodeId> {
    let handle = harness.mount(
        h("ul")
            .attr("id", "items")
            .child(
                h("li")
                    .attr("class", "item first")
                    .attr("data-role", "primary")
                    .text("one"),
            )
            .child(
                h("li")
                    .attr("class", "item")
                    .attr("data-role", "secondary")
                    .text("two"),
            )
            .child(
                h("li")
                    .attr("class", "item last")
                    .attr("lang", "en-US")
                    .text("three"),
            ),
    )?;
    Ok(handle.node().expect("list root"))
}

fn texts(harness: &Harness, nodes: &[NodeId]) -> Vec<String> {
    nodes.iter().map(|node| harness.text_content(*node)).collect()
}

#[test]
fn selector_matching_covers_attributes_and_combinators() -> Result<()> {
    let mut harness = Harness::new();
    let ul = list_fixture(&mut harness)?;

    let cases: &[(&str, &[&str])] = &[
        ("li.item", &["one", "two", "three"]),
        ("li:first-child", &["one"]),
        ("li:last-child", &["three"]),
        ("[data-role^=pri]", &["one"]),
        ("[data-role$=ary]", &["one", "two"]),
        ("[data-role*=cond]", &["two"]),
        ("[class~=last]", &["three"]),
        ("[lang|=en]", &["three"]),
        ("[data-role='secondary']", &["two"]),
        ("li + li", &["two", "three"]),
        ("li.first ~ li", &["two", "three"]),
        ("ul > li:not(.first)", &["two", "three"]),
        ("#items li.item.last", &["three"]),
        (".last, .first", &["one", "three"]),
        ("li:not(.first, .last)", &["two"]),
        ("[data-role=\"x, y\"], .last", &["three"]),
        ("ul li:first-child + li", &["two"]),
        ("li:only-child", &[]),
    ];
    for (selector, expected) in cases {
        let matched = harness.query_selector_all(ul, selector)?;
        assert_eq!(texts(&harness, &matched), *expected, "selector {selector}");
    }
    Ok(())
}

#[test]
fn query_selector_excludes_root_but_select_one_includes_it() -> Result<()> {
    let mut harness = Harness::new();
    let ul = list_fixture(&mut harness)?;

    assert_eq!(harness.query_selector(ul, "#items")?, None);
    assert_eq!(harness.select_one(ul, "#items")?, ul);
    assert_eq!(
        harness.select_one(ul, "#nope"),
        Err(Error::NodeNotFound("#nope".into()))
    );

    let body = harness.document_body();
    assert_eq!(harness.query_selector(body, "#items")?, Some(ul));
    Ok(())
}

#[test]
fn unsupported_selectors_are_rejected() -> Result<()> {
    let mut harness = Harness::new();
    let ul = list_fixture(&mut harness)?;
    for selector in ["li:hover", "li::before", "", "[data-role", "li > "] {
        assert!(
            matches!(
                harness.query_selector_all(ul, selector),
                Err(Error::UnsupportedSelector(_))
            ),
            "selector {selector:?} should be rejected"
        );
    }
    Ok(())
}

#[test]
fn form_state_pseudo_classes_follow_properties() -> Result<()> {
    let mut harness = Harness::new();
    let handle = harness.mount(
        h("form")
            .child(h("input").attr("type", "checkbox").attr("id", "on").checked(true))
            .child(h("input").attr("type", "text").attr("id", "off").disabled(true))
            .child(h("div").attr("id", "blank")),
    )?;
    let form = handle.node().expect("form");

    let ids = |harness: &Harness, selector: &str| -> Result<Vec<String>> {
        Ok(harness
            .query_selector_all(form, selector)?
            .into_iter()
            .filter_map(|node| harness.attr(node, "id"))
            .collect())
    };
    assert_eq!(ids(&harness, "input:checked")?, ["on"]);
    assert_eq!(ids(&harness, "input:disabled")?, ["off"]);
    assert_eq!(ids(&harness, "input:enabled")?, ["on"]);
    assert_eq!(ids(&harness, "div:empty")?, ["blank"]);
    assert_eq!(ids(&harness, "div:only-child")?, Vec::<String>::new());

    let off = harness.select_one(form, "#off")?;
    harness.set_checked(off, true)?;
    assert_eq!(ids(&harness, "input:checked")?, ["on", "off"]);
    Ok(())
}

#[test]
fn serialization_is_compact_and_pretty() -> Result<()> {
    let mut harness = Harness::new();
    let handle = harness.mount(
        h("div")
            .attr("title", "a \"quoted\" <title>")
            .child(h("h1").text("Title"))
            .child(h("p").text("1 < 2 & 3"))
            .child(h("br"))
            .child(ignore()),
    )?;
    let div = handle.node().expect("div");

    assert_eq!(
        harness.outer_html(div)?,
        "<div title=\"a &quot;quoted&quot; &lt;title&gt;\"><h1>Title</h1><p>1 &lt; 2 &amp; 3</p><br><!-- ignore --></div>"
    );
    assert_eq!(
        harness.pretty_html(div)?,
        "<div title=\"a &quot;quoted&quot; &lt;title&gt;\">\n  <h1>Title</h1>\n  <p>1 &lt; 2 &amp; 3</p>\n  <br>\n  <!-- ignore -->\n</div>"
    );
    Ok(())
}

#[test]
fn rerender_patches_nodes_in_place() -> Result<()> {
    fn toggler(cx: &mut Hooks<'_>) -> VNode {
        let open = cx.use_state(|| false);
        let flip = open.clone();
        let mut panel = h("section")
            .child(h("button").attr("id", "flip").on_click(move |_| flip.update(|o| *o = !*o)))
            .child(h("h2").text(if open.get() { "Open" } else { "Closed" }));
        if open.get() {
            panel = panel.child(h("p").attr("class", "body").text("details"));
        } else {
            panel = panel.child(h("span").text("hidden"));
        }
        panel.into()
    }

    let mut harness = Harness::new();
    let handle = harness.mount(component(toggler))?;
    let section = handle.node().expect("section");
    let heading = harness.select_one(section, "h2")?;
    let hidden = harness.select_one(section, "span")?;

    harness.simulate(section).click_with("#flip")?;

    assert_eq!(harness.select_one(section, "h2")?, heading);
    assert_eq!(harness.text_content(heading), "Open");
    assert_eq!(harness.parent(hidden), None);
    harness.assert_text(section, "p.body", "details")?;
    assert_eq!(harness.children(section).len(), 3);

    harness.simulate(section).click_with("#flip")?;
    assert_eq!(harness.select_one(section, "h2")?, heading);
    assert!(harness.query_selector(section, "p")?.is_none());
    Ok(())
}

#[test]
fn dom_rejects_cycles_and_text_parents() {
    let mut dom = Dom::new();
    let outer = dom.create_element(None, "div".into(), BTreeMap::new());
    let inner = dom.create_element(Some(outer), "span".into(), BTreeMap::new());
    let leaf = dom.create_text(Some(inner), "x".into());

    assert!(matches!(
        dom.append_child(inner, outer),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        dom.append_child(leaf, outer),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(dom.children(outer), &[inner]);
}

#[test]
fn deep_clone_copies_subtree_detached() -> Result<()> {
    let mut dom = Dom::new();
    let mut attrs = BTreeMap::new();
    attrs.insert("id".to_string(), "src".to_string());
    let original = dom.create_element(Some(dom.body), "div".into(), attrs);
    let child = dom.create_element(Some(original), "b".into(), BTreeMap::new());
    dom.create_text(Some(child), "bold".into());
    dom.set_value(original, "v")?;

    let copy = dom.deep_clone(original);

    assert_ne!(copy, original);
    assert_eq!(dom.parent(copy), None);
    assert_eq!(dom.dump_node(copy), dom.dump_node(original));
    assert_eq!(dom.value(copy), Some("v"));
    assert_ne!(dom.children(copy), dom.children(original));
    Ok(())
}
