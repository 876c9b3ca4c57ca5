//! Headless todo-list demo.
//!
//! Builds the classic todo UI against the in-memory document, drives it
//! with synthetic events, and prints serialized snapshots after each step.
//!
//! ```text
//! cargo run -p weft-core --example todo
//! ```

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use weft_core::{
    args, attrs, button, div, document, h1, input, keyed, li, span, ul, AttrValue, Element, Key,
    State, Value,
};

#[derive(Clone)]
struct Todo {
    id: i64,
    text: String,
}

fn render_todo(todo: &Todo, todos: &State<Vec<Todo>>) -> Element {
    let id = todo.id;
    let todos = todos.clone();
    li(args![
        span(args![todo.text.clone()]),
        button(args![
            attrs! {
                "onclick" => AttrValue::handler(move |_| {
                    todos.update(|items| {
                        items.iter().filter(|item| item.id != id).cloned().collect()
                    });
                })
            },
            "remove",
        ]),
    ])
}

fn main() {
    let todos = State::new(vec![
        Todo { id: 0, text: "buy milk".into() },
        Todo { id: 1, text: "buy eggs".into() },
        Todo { id: 2, text: "buy bread".into() },
    ]);
    let draft = State::new(String::new());
    let serial = Arc::new(AtomicI64::new(3));

    let draft_for_input = draft.clone();
    let draft_for_add = draft.clone();
    let todos_for_add = todos.clone();
    let todos_for_list = todos.clone();

    let view = div(args![
        h1(args!["Todo list"]),
        input(attrs! {
            "value" => AttrValue::Live(draft.derive(|text| Value::from(text.clone()))),
            "onkeyup" => AttrValue::handler(move |event| {
                if let Some(text) = &event.detail {
                    draft_for_input.set(text.clone());
                }
            }),
        }),
        button(args![
            attrs! {
                "onclick" => AttrValue::handler(move |_| {
                    let text = draft_for_add.get();
                    if text.is_empty() {
                        return;
                    }
                    let id = serial.fetch_add(1, Ordering::SeqCst);
                    todos_for_add.update(|items| {
                        let mut items = items.clone();
                        items.push(Todo { id, text: text.clone() });
                        items
                    });
                    draft_for_add.set(String::new());
                })
            },
            "Add todo",
        ]),
        ul(args![keyed(
            &todos,
            |todo| Key::from(todo.id),
            move |todo| Value::from(render_todo(todo, &todos_for_list)),
        )]),
    ]);

    let doc = document();
    println!("initial:\n{}\n", view.html().unwrap());

    // Type into the input and click "Add todo".
    let children = doc.children(view.node());
    let (field, add) = (children[1], children[2]);
    doc.dispatch_with(field, "keyup", Some("water the plants".to_string()))
        .unwrap();
    doc.dispatch(add, "click").unwrap();
    println!("after add:\n{}\n", view.html().unwrap());

    // Remove "buy eggs" via its own remove button.
    let list = doc.children(view.node())[3];
    let second_item = doc.children(list)[1];
    let remove = doc.children(second_item)[1];
    doc.dispatch(remove, "click").unwrap();
    println!("after remove:\n{}\n", view.html().unwrap());

    view.teardown();
}
