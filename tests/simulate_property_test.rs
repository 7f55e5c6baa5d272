use component_tester::{EventDescriptor, Harness, Hooks, NodeId, VNode, component, h};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseError, TestCaseResult};

const SIMULATE_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/simulate_property_test.txt";
const DEFAULT_SIMULATE_PROPTEST_CASES: u32 = 128;

#[derive(Debug, Clone)]
enum UiAction {
    Change(String),
    Add,
    Toggle,
    Unknown(String),
    MissingTarget,
}

fn env_proptest_cases(var_name: &str, default_cases: u32) -> u32 {
    std::env::var(var_name)
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default_cases)
}

fn simulate_proptest_cases() -> u32 {
    std::env::var("COMPONENT_TESTER_SIMULATE_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or_else(|| {
            env_proptest_cases(
                "COMPONENT_TESTER_PROPTEST_CASES",
                DEFAULT_SIMULATE_PROPTEST_CASES,
            )
        })
}

fn roster(cx: &mut Hooks<'_>) -> VNode {
    let draft = cx.use_state(String::new);
    let names = cx.use_state(Vec::<String>::new);
    let active = cx.use_state(|| false);

    let (set_draft, read_draft, push_name, flip) =
        (draft.clone(), draft.clone(), names.clone(), active.clone());
    h("div")
        .attr("id", "roster")
        .child(
            h("input")
                .attr("id", "name")
                .on_change(move |event| set_draft.set(event.target_value().to_string())),
        )
        .child(
            h("input")
                .attr("id", "active")
                .attr("type", "checkbox")
                .checked(active.get())
                .on_change(move |_| flip.update(|on| *on = !*on)),
        )
        .child(h("button").attr("id", "add").on_click(move |_| {
            let name = read_draft.get();
            if !name.trim().is_empty() {
                push_name.update(|names| names.push(name));
            }
        }))
        .child(
            h("ol")
                .attr("id", "names")
                .children(names.get().into_iter().map(|name| h("li").text(name))),
        )
        .into()
}

fn name_strategy() -> BoxedStrategy<String> {
    vec(
        prop_oneof![
            Just('a'),
            Just('b'),
            Just('z'),
            Just('J'),
            Just('0'),
            Just(' '),
            Just('-'),
            Just('<'),
            Just('&'),
        ],
        0..=8,
    )
    .prop_map(|chars| chars.into_iter().collect())
    .boxed()
}

fn ui_action_strategy() -> BoxedStrategy<UiAction> {
    prop_oneof![
        5 => name_strategy().prop_map(UiAction::Change),
        4 => Just(UiAction::Add),
        2 => Just(UiAction::Toggle),
        1 => prop_oneof![Just("frobnicate"), Just("hover"), Just("Click")]
            .prop_map(|name| UiAction::Unknown(name.to_string())),
        1 => Just(UiAction::MissingTarget),
    ]
    .boxed()
}

fn ui_action_sequence_strategy() -> BoxedStrategy<Vec<UiAction>> {
    vec(ui_action_strategy(), 1..=24).boxed()
}

#[derive(Debug, Default)]
struct Model {
    draft: String,
    names: Vec<String>,
    active: bool,
}

fn fail(err: component_tester::Error) -> TestCaseError {
    TestCaseError::fail(format!("{err:?}"))
}

fn assert_roster_matches_model(actions: &[UiAction]) -> TestCaseResult {
    let mut harness = Harness::new();
    let root = harness
        .mount(component(roster))
        .map_err(fail)?
        .node()
        .ok_or_else(|| TestCaseError::fail("roster should render one root"))?;
    let list: NodeId = harness
        .select_one(root, "#names")
        .map_err(fail)?;
    let mut model = Model::default();

    for (step, action) in actions.iter().enumerate() {
        match action {
            UiAction::Change(value) => {
                harness
                    .simulate_events(
                        root,
                        EventDescriptor::new("change").target("#name").value(value.clone()),
                    )
                    .map_err(fail)?;
                model.draft = value.clone();
            }
            UiAction::Add => {
                harness
                    .simulate_events(root, EventDescriptor::new("click").target("#add"))
                    .map_err(fail)?;
                if !model.draft.trim().is_empty() {
                    model.names.push(model.draft.clone());
                }
            }
            UiAction::Toggle => {
                harness
                    .simulate_events(root, EventDescriptor::new("change").target("#active"))
                    .map_err(fail)?;
                model.active = !model.active;
            }
            UiAction::Unknown(name) => {
                let err = harness.simulate_events(root, name.as_str());
                prop_assert!(
                    matches!(&err, Err(e) if e.to_string().contains(name.as_str())),
                    "unknown event {name} at step {step} gave {err:?}"
                );
            }
            UiAction::MissingTarget => {
                let err = harness
                    .simulate_events(root, EventDescriptor::new("click").target("#missing"));
                prop_assert!(
                    matches!(&err, Err(e) if e.to_string().contains("'#missing'")),
                    "missing target at step {step} gave {err:?}"
                );
            }
        }

        prop_assert!(!harness.has_pending_work(), "work left after step {step}");
        prop_assert_eq!(
            harness.select_one(root, "#names").map_err(fail)?,
            list,
            "list node replaced at step {}",
            step
        );
        let rendered: Vec<String> = harness
            .query_selector_all(list, "li")
            .map_err(fail)?
            .into_iter()
            .map(|node| harness.text_content(node))
            .collect();
        prop_assert_eq!(&rendered, &model.names, "list mismatch at step {}", step);
        prop_assert_eq!(
            harness.checked(harness.select_one(root, "#active").map_err(fail)?),
            Some(model.active)
        );
    }

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: simulate_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(SIMULATE_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn simulated_ui_sequences_match_the_model(actions in ui_action_sequence_strategy()) {
        assert_roster_matches_model(&actions)?;
    }
}
