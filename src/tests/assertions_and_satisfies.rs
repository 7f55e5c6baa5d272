use super::*;

fn card(title: &str, extra_class: &str) -> VNode {
    h("div")
        .class("card")
        .class(extra_class)
        .attr("id", "card")
        .child(h("h2").text(title))
        .child(h("p").text("  Body text  "))
        .child(h("footer").child(h("button").text("Close")))
        .into()
}

#[test]
fn assert_satisfies_accepts_subset_classes_and_ignored_nodes() -> Result<()> {
    let mut harness = Harness::new();
    let actual = harness.mount(card("Title", "primary"))?.node().expect("card");
    let expected = harness
        .mount(
            h("div")
                .class("card")
                .child(h("h2").text("Title"))
                .child(h("p").text("Body text"))
                .child(ignore()),
        )?
        .node()
        .expect("expected card");

    harness.assert_satisfies(actual, expected)?;
    Ok(())
}

#[test]
fn assert_satisfies_reports_the_first_difference() -> Result<()> {
    let mut harness = Harness::new();
    let actual = harness.mount(card("Title", "primary"))?.node().expect("card");

    let wrong_text = harness
        .mount(
            h("div")
                .child(h("h2").text("Other"))
                .child(ignore())
                .child(ignore()),
        )?
        .node()
        .expect("expected card");
    match harness.assert_satisfies(actual, wrong_text) {
        Err(Error::AssertionFailed {
            expected, actual, ..
        }) => {
            assert_eq!(expected, "text \"Other\"");
            assert_eq!(actual, "text \"Title\"");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let wrong_class = harness
        .mount(h("div").class("secondary").child(ignore()).child(ignore()).child(ignore()))?
        .node()
        .expect("expected card");
    assert!(matches!(
        harness.assert_satisfies(actual, wrong_class),
        Err(Error::AssertionFailed { .. })
    ));

    let wrong_count = harness
        .mount(h("div").child(ignore()))?
        .node()
        .expect("expected card");
    match harness.assert_satisfies(actual, wrong_count) {
        Err(Error::AssertionFailed {
            expected, actual, ..
        }) => {
            assert_eq!(expected, "1 child nodes");
            assert_eq!(actual, "3 child nodes");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let wrong_tag = harness.mount(h("section"))?.node().expect("section");
    assert!(harness.assert_satisfies(actual, wrong_tag).is_err());
    Ok(())
}

#[test]
fn ignore_at_the_top_matches_anything() -> Result<()> {
    let mut harness = Harness::new();
    let actual = harness.mount(card("Title", "primary"))?.node().expect("card");
    let expected = harness.mount(ignore())?.node().expect("ignore comment");
    harness.assert_satisfies(actual, expected)?;
    Ok(())
}

#[test]
fn text_assertions_report_snippets() -> Result<()> {
    let mut harness = Harness::new();
    let root = harness.mount(card("Weekly report", "primary"))?.node().expect("card");

    harness.assert_text(root, "h2", "Weekly report")?;
    harness.assert_text_matches(root, "h2", r"^Week\w+ rep")?;
    harness.assert_exists(root, "footer > button")?;

    match harness.assert_text(root, "h2", "Daily report") {
        Err(Error::AssertionFailed {
            selector,
            expected,
            actual,
            dom_snippet,
        }) => {
            assert_eq!(selector, "h2");
            assert_eq!(expected, "Daily report");
            assert_eq!(actual, "Weekly report");
            assert_eq!(dom_snippet, "<h2>Weekly report</h2>");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    assert!(matches!(
        harness.assert_text_matches(root, "h2", r"^Daily"),
        Err(Error::AssertionFailed { .. })
    ));
    assert!(matches!(
        harness.assert_text_matches(root, "h2", "("),
        Err(Error::InvalidPattern(_))
    ));
    assert_eq!(
        harness.assert_exists(root, "table"),
        Err(Error::NodeNotFound("table".into()))
    );
    Ok(())
}

#[test]
fn value_and_checked_assertions_read_properties() -> Result<()> {
    let mut harness = Harness::new();
    let root = harness
        .mount(
            h("form")
                .child(h("input").attr("id", "name").value("Taro"))
                .child(h("input").attr("id", "agree").attr("type", "checkbox")),
        )?
        .node()
        .expect("form");

    harness.assert_value(root, "#name", "Taro")?;
    harness.assert_checked(root, "#agree", false)?;
    assert!(harness.assert_value(root, "#name", "Jiro").is_err());

    let agree = harness.select_one(root, "#agree")?;
    harness.set_checked(agree, true)?;
    harness.assert_checked(root, "#agree", true)?;
    Ok(())
}

#[test]
fn long_snippets_are_truncated() -> Result<()> {
    let mut harness = Harness::new();
    let long = "x".repeat(500);
    let root = harness.mount(h("p").text(long))?.node().expect("p");
    match harness.assert_text(root, "p", "short") {
        Err(Error::AssertionFailed { dom_snippet, .. }) => {
            assert!(dom_snippet.ends_with("..."));
            assert_eq!(dom_snippet.chars().count(), 203);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}
