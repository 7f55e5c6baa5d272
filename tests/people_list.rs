use component_tester::{
    EventData, EventDescriptor, Events, Harness, Hooks, SimulateArg, VNode, component, h,
    simulate_args,
};

fn people_list(cx: &mut Hooks<'_>) -> VNode {
    let draft = cx.use_state(String::new);
    let people = cx.use_state(Vec::<String>::new);

    let (set_draft, read_draft, add_person) = (draft.clone(), draft.clone(), people.clone());
    h("div")
        .attr("class", "people")
        .child(
            h("input")
                .attr("data-test", "name-input")
                .on_change(move |event| set_draft.set(event.target_value().to_string())),
        )
        .child(
            h("button")
                .attr("data-test", "add-person")
                .on_click(move |_| {
                    let name = read_draft.get();
                    if !name.trim().is_empty() {
                        add_person.update(|people| people.push(name));
                    }
                })
                .text("Add"),
        )
        .child(
            h("ul")
                .attr("data-test", "people")
                .children(people.get().into_iter().map(|name| h("li").text(name))),
        )
        .into()
}

fn add_both() -> Vec<EventDescriptor> {
    vec![
        EventDescriptor::new("change")
            .target("[data-test=name-input]")
            .value("Jane Doe"),
        EventDescriptor::new("click").target("[data-test=add-person]"),
        EventDescriptor::new("change")
            .target("[data-test=name-input]")
            .value("John Doe"),
        EventDescriptor::new("click").target("[data-test=add-person]"),
    ]
}

#[test]
fn descriptor_sequence_builds_the_list() -> component_tester::Result<()> {
    let mut harness = Harness::new();
    let handle = harness.mount(component(people_list))?;
    let root = handle.node().expect("people list renders one root");

    harness.simulate_events(root, add_both())?;

    let list = harness.query_selector(root, "ul")?.expect("list");
    assert_eq!(
        harness.inner_html(list)?,
        "<li>Jane Doe</li><li>John Doe</li>"
    );
    harness.assert_value(root, "[data-test=name-input]", "John Doe")?;
    Ok(())
}

#[test]
fn fluent_chain_builds_the_list() -> component_tester::Result<()> {
    let mut harness = Harness::new();
    let handle = harness.mount(component(people_list))?;
    let root = handle.node().expect("people list renders one root");

    harness
        .simulate(root)
        .change_with((
            "[data-test=name-input]",
            EventData::new().with_value("Jane Doe"),
        ))?
        .click_with("[data-test=add-person]")?
        .change_with((
            "[data-test=name-input]",
            EventData::new().with_value("John Doe"),
        ))?
        .click_with("[data-test=add-person]")?;

    let items: Vec<String> = harness
        .query_selector_all(root, "li")?
        .into_iter()
        .map(|node| harness.text_content(node))
        .collect();
    assert_eq!(items, ["Jane Doe", "John Doe"]);
    Ok(())
}

#[test]
fn positional_form_builds_the_list() -> component_tester::Result<()> {
    let mut harness = Harness::new();
    let handle = harness.mount(component(people_list))?;
    let root = handle.node().expect("people list renders one root");

    let outcome = simulate_args(
        &mut harness,
        vec![
            SimulateArg::from(root),
            SimulateArg::from(Events::from(add_both())),
        ],
    )?;
    assert!(outcome.is_none());

    harness.assert_text(root, "ul", "Jane DoeJohn Doe")?;
    Ok(())
}

#[test]
fn empty_draft_is_not_added() -> component_tester::Result<()> {
    let mut harness = Harness::new();
    let handle = harness.mount(component(people_list))?;
    let root = handle.node().expect("people list renders one root");

    harness.simulate(root).click_with("[data-test=add-person]")?;

    let list = harness.select_one(root, "[data-test=people]")?;
    assert!(harness.children(list).is_empty());
    Ok(())
}

#[test]
fn missing_add_button_reports_the_rendered_tree() {
    let mut harness = Harness::new();
    let handle = harness
        .mount(component(people_list))
        .expect("mount people list");
    let root = handle.node().expect("people list renders one root");

    let err = harness
        .simulate_events(
            root,
            EventDescriptor::new("click").target("[data-test=remove-person]"),
        )
        .expect_err("no remove button is rendered");
    let message = err.to_string();
    assert!(message.contains("Could not trigger click on '[data-test=remove-person]' in"));
    assert!(message.contains("<button data-test=\"add-person\">Add</button>"));
    assert!(message.contains("<ul data-test=\"people\"></ul>"));
}

#[test]
fn unmount_removes_the_list_from_the_document() -> component_tester::Result<()> {
    let mut harness = Harness::new();
    let handle = harness.mount(component(people_list))?;
    let root = handle.node().expect("people list renders one root");
    harness.simulate_events(root, add_both())?;

    harness.unmount(Some(&handle))?;

    assert!(!harness.is_connected(root));
    assert!(
        harness
            .query_selector(harness.document_body(), "li")?
            .is_none()
    );
    Ok(())
}
