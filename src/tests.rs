use super::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

mod assertions_and_satisfies;
mod selector_and_dom;

fn counter(cx: &mut Hooks<'_>) -> VNode {
    let count = cx.use_state(|| 0u32);
    let bump = count.clone();
    h("button")
        .attr("id", "counter")
        .on_click(move |_| bump.update(|n| *n += 1))
        .text(count.get().to_string())
        .into()
}

fn call_log() -> Rc<RefCell<Vec<String>>> {
    Rc::new(RefCell::new(Vec::new()))
}
