use std::path::Path;

use pith::{
    ErrorKind, Event, FileSystem, MemoryFileSystem, PithError, Runtime, RuntimeConfig, Value,
    ViewKind, ViewRef,
};
use pretty_assertions::assert_eq;

fn loaded(src: &str) -> Runtime {
    let mut runtime = Runtime::new(MemoryFileSystem::new());
    runtime.load(src).unwrap();
    runtime
}

fn text_of(view: &ViewRef) -> String {
    match &view.borrow().kind {
        ViewKind::Text(text) => text.clone(),
        other => panic!("expected text view, got {other:?}"),
    }
}

// ═══════════════════════════════════════════════════════════════
// Loading and running slots
// ═══════════════════════════════════════════════════════════════

#[test]
fn slot_reads_another_slot() {
    let mut rt = loaded("x: 5 end\ny: x 2 + end");
    assert!(rt.run_named_slot("y").unwrap());
    assert_eq!(rt.stack(), &[Value::Number(7.0)]);
}

#[test]
fn missing_slot_is_not_an_error() {
    let mut rt = loaded("x: 5 end");
    assert!(!rt.run_named_slot("init").unwrap());
    assert!(rt.stack().is_empty());
}

#[test]
fn counter_signal_marks_the_runtime_dirty() {
    let mut rt = loaded("counter: 0 signal end\ninc: counter counter + 1 + counter! end");
    assert!(!rt.has_dirty_signals());

    rt.run_named_slot("inc").unwrap();
    assert!(rt.stack().is_empty());
    assert!(rt.has_dirty_signals());

    rt.run_named_slot("counter").unwrap();
    assert_eq!(rt.stack(), &[Value::Number(1.0)]);

    rt.clear_dirty();
    assert!(!rt.has_dirty_signals());
}

#[test]
fn unterminated_if_fails_the_load_and_sticks() {
    let mut rt = Runtime::new(MemoryFileSystem::new());
    let err = rt.load("ok: 1 end\nbroken:\n  x if 1\nend").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(rt.error(), Some(&err));

    assert_eq!(rt.run_named_slot("ok").unwrap_err(), err);
    assert!(rt.stack().is_empty());

    rt.clear_error();
    assert!(!rt.run_named_slot("ok").unwrap());
    assert!(rt.root().borrow().slots().is_empty());
}

#[test]
fn later_loads_add_and_replace_slots() {
    let mut rt = loaded("x: 1 end\ny: x 10 * end");
    rt.load("x: 2 end").unwrap();
    rt.run_named_slot("y").unwrap();
    assert_eq!(rt.stack(), &[Value::Number(20.0)]);
    assert_eq!(rt.root().borrow().slots().len(), 2);
}

#[test]
fn array_literal() {
    let mut rt = loaded("main: [1 2 3] end");
    rt.run_named_slot("main").unwrap();
    assert_eq!(
        rt.stack(),
        &[Value::Array(vec![1.0.into(), 2.0.into(), 3.0.into()])]
    );
}

#[test]
fn runtime_failure_resets_to_the_root() {
    let mut rt = loaded("main: 1 nope end\nother: 2 end");
    assert_eq!(
        rt.run_named_slot("main").unwrap_err(),
        PithError::UnknownWord("nope".into())
    );
    rt.clear_error();
    rt.run_named_slot("other").unwrap();
    assert_eq!(rt.stack(), &[1.0.into(), 2.0.into()]);
}

#[test]
fn stack_capacity_is_configurable() {
    let config = RuntimeConfig {
        stack_size: 4,
        ..RuntimeConfig::default()
    };
    let mut rt = Runtime::with_config(MemoryFileSystem::new(), config);
    rt.load("main: 1 2 3 4 5 end").unwrap();
    assert_eq!(
        rt.run_named_slot("main").unwrap_err(),
        PithError::StackOverflow { capacity: 4 }
    );
}

#[test]
fn lex_errors_are_recorded_not_fatal() {
    let mut rt = loaded("x: 5 @ end");
    assert_eq!(rt.lex_errors().len(), 1);
    assert_eq!(rt.lex_errors()[0].ch, '@');
    rt.run_named_slot("x").unwrap();
    assert_eq!(rt.stack(), &[Value::Number(5.0)]);
}

#[test]
fn deeply_nested_source_fails_instead_of_crashing() {
    let depth = 20_000;
    let src = format!("main: {} 1 {} end", "[ ".repeat(depth), "] ".repeat(depth));
    let mut rt = loaded(&src);
    let err = rt.run_named_slot("main").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Stack);
    assert_eq!(rt.error(), Some(&err));
    assert_eq!(rt.run_named_slot("main").unwrap_err(), err);

    let mut rt = loaded(&format!(
        "main: {} 1 {} end",
        "1 if ".repeat(depth),
        "end ".repeat(depth)
    ));
    assert_eq!(
        rt.run_named_slot("main").unwrap_err(),
        PithError::DepthExceeded {
            limit: RuntimeConfig::default().max_call_depth
        }
    );
}

#[test]
fn control_flow_inside_a_multi_line_array_slot() {
    let mut rt = loaded(
        r#"app:
  items:
    [
      1 if 10 else 20 end
      0 if 5 end
      3
    ] do
      2 *
    end map
  end
  n: 4
end
main: app.items app.n end"#,
    );
    rt.run_named_slot("main").unwrap();
    assert_eq!(
        rt.stack(),
        &[Value::Array(vec![20.0.into(), 6.0.into()]), 4.0.into()]
    );
}

// ═══════════════════════════════════════════════════════════════
// Dictionaries
// ═══════════════════════════════════════════════════════════════

#[test]
fn children_inherit_and_shadow() {
    let mut rt = loaded(
        "base:\n  size: 1\n  greeting: \"hi\"\nend\n\
         mid:\n  parent: base\nend\n\
         leaf:\n  parent: mid\n  size: 3\nend\n\
         main: leaf.greeting leaf.size mid.size end",
    );
    rt.run_named_slot("main").unwrap();
    assert_eq!(rt.stack(), &["hi".into(), 3.0.into(), 1.0.into()]);
}

#[test]
fn bare_dictionary_name_pushes_the_dictionary() {
    let mut rt = loaded("cfg:\n  a: 1\nend\nmain: cfg type end");
    rt.run_named_slot("main").unwrap();
    assert_eq!(rt.stack(), &["dict".into()]);
}

#[test]
fn component_ui_is_styled_from_its_dictionary() {
    let mut rt = loaded(
        "theme:\n  padding: 4\nend\n\
         card:\n  parent: theme\n  color: \"red\"\n  ui: \"hello\" text\nend\n\
         ui: card end",
    );
    let view = rt.mount_ui().unwrap().unwrap();
    assert_eq!(text_of(&view), "hello");
    let style = view.borrow().style.clone();
    assert_eq!(style.color.as_deref(), Some("red"));
    assert_eq!(style.padding, Some(4));
    assert!(rt.stack().is_empty());
}

// ═══════════════════════════════════════════════════════════════
// Host entry points
// ═══════════════════════════════════════════════════════════════

#[test]
fn rerender_only_when_signals_change() {
    let mut rt = loaded(
        "count: 0 signal end\n\
         ui: count to-string text end\n\
         bump: count 1 + count! end",
    );
    let first = rt.mount_ui().unwrap().unwrap();
    assert_eq!(text_of(&first), "0");
    assert!(rt.rerender_if_dirty().unwrap().is_none());

    rt.run_named_slot("bump").unwrap();
    let second = rt.rerender_if_dirty().unwrap().unwrap();
    assert_eq!(text_of(&second), "1");
    assert!(!rt.has_dirty_signals());
    assert_eq!(text_of(rt.current_view().unwrap()), "1");
}

#[test]
fn mount_without_a_view_keeps_nothing() {
    let mut rt = loaded("ui: 42 end");
    assert!(rt.mount_ui().unwrap().is_none());
    assert!(rt.current_view().is_none());
    assert_eq!(rt.stack(), &[Value::Number(42.0)]);
}

#[test]
fn events_reach_their_handlers() {
    let mut rt = loaded("on-key: 2 * end\non-file-change: length end");
    rt.handle_event(Event::Key { code: 21 }).unwrap();
    rt.handle_event(Event::FileChange {
        path: "/a/b.pith".into(),
    })
    .unwrap();
    rt.handle_event(Event::Click { x: 1, y: 2 }).unwrap();
    rt.handle_event(Event::TextInput("q".into())).unwrap();
    rt.handle_event(Event::Tick).unwrap();
    assert_eq!(rt.stack(), &[42.0.into(), 9.0.into()]);
}

#[test]
fn button_handler_runs_as_a_block() {
    let mut rt = loaded("ui: \"go\" do 1 + end button end");
    let view = rt.mount_ui().unwrap().unwrap();
    let block = match &view.borrow().kind {
        ViewKind::Button { on_click, .. } => on_click.unwrap(),
        other => panic!("expected button, got {other:?}"),
    };
    rt.push(41.0.into()).unwrap();
    rt.execute_block(block).unwrap();
    assert_eq!(rt.stack(), &[Value::Number(42.0)]);
}

#[test]
fn debug_state_lists_slots() {
    let rt = loaded("x: 5 end\ncard:\n  color: \"red\"\nend");
    let dump = rt.debug_state();
    assert!(dump.contains("root slots: 2"), "{dump}");
    assert!(dump.contains("[0] x = 5"), "{dump}");
    assert!(dump.contains("[1] card (dictionary)"), "{dump}");
    assert!(dump.contains("color = red"), "{dump}");
}

// ═══════════════════════════════════════════════════════════════
// Projects
// ═══════════════════════════════════════════════════════════════

#[test]
fn empty_project_gets_the_default_runtime() {
    let fs = MemoryFileSystem::new();
    let mut rt = Runtime::new(fs.clone());
    rt.load_project("/proj").unwrap();

    assert_eq!(rt.project_path(), Some(Path::new("/proj")));
    assert_eq!(fs.file_count(), 1);
    assert_eq!(
        fs.read_file(Path::new("/proj/pith/runtime.pith")).unwrap(),
        pith::DEFAULT_RUNTIME
    );

    let view = rt.mount_ui().unwrap().unwrap();
    assert_eq!(
        view.borrow().describe(),
        "VSTACK (1 children)\n  TEXT: \"Welcome to Pith\"\n"
    );
}

#[test]
fn existing_project_runtime_is_loaded() {
    let fs = MemoryFileSystem::with_files([("/proj/pith/runtime.pith", "main: 3 end")]);
    let mut rt = Runtime::new(fs.clone());
    rt.load_project("/proj").unwrap();
    rt.run_named_slot("main").unwrap();
    assert_eq!(rt.stack(), &[Value::Number(3.0)]);
    assert_eq!(fs.file_count(), 1);
}

#[test]
fn pith_file_sets_its_directory_as_the_project() {
    let fs = MemoryFileSystem::with_files([("/p/app.pith", "main: 1 2 + end")]);
    let mut rt = Runtime::new(fs);
    rt.load_project("/p/app.pith").unwrap();
    assert_eq!(rt.project_path(), Some(Path::new("/p")));
    rt.run_named_slot("main").unwrap();
    assert_eq!(rt.stack(), &[Value::Number(3.0)]);
}

#[test]
fn missing_file_is_a_file_system_error() {
    let mut rt = Runtime::new(MemoryFileSystem::new());
    let err = rt.load_file("/nope.pith").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn sticky_error_blocks_project_loading() {
    let fs = MemoryFileSystem::new();
    let mut rt = Runtime::new(fs.clone());
    let err = rt.load("broken:\n  1 if 2\nend").unwrap_err();

    assert_eq!(rt.load_project("/proj").unwrap_err(), err);
    assert_eq!(fs.file_count(), 0);
    assert_eq!(rt.project_path(), None);
}
