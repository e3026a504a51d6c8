//! End-to-end translation: rule text in, stroke operations out.

use shuttlepro::{
    compile, Compiled, DebugFlags, Direction, Dispatcher, FocusedWindow, RawEvent, Slot,
    StrokeOp, Symbol, WindowFocus,
};
use std::time::{Duration, Instant};

const RULES: &str = r#"
# Sample rules
[Firefox] Mozilla Firefox
K1 "ab"
K2 Control_L/D t
K3 Alt_L/D Right RELEASE Left
JL XK_Left
JR XK_Right

[Editor] foo
K4 "f"

[Other] bar
K4 "o"

[Default]
K4 "d"
K5 XK_Home
S0 space
S3 XK_F3
IR XK_Up
IL XK_Down
"#;

/// Window whose title can be changed between events.
#[derive(Default)]
struct Focus(Option<String>);

impl WindowFocus for Focus {
    fn focused_window(&mut self) -> Option<FocusedWindow> {
        self.0.as_ref().map(|title| FocusedWindow {
            title: title.clone(),
            class: Some("test".to_string()),
        })
    }
}

fn setup() -> Dispatcher<Compiled, Focus, Vec<StrokeOp>> {
    let compiled = compile(RULES, DebugFlags::default());
    assert!(compiled.diagnostics.is_empty(), "{:?}", compiled.diagnostics);
    Dispatcher::new(compiled, Focus::default(), Vec::new())
}

fn named(name: &str) -> Symbol {
    Symbol::from_name(name).unwrap()
}

fn press(name: &str) -> StrokeOp {
    StrokeOp::press(named(name))
}

fn release(name: &str) -> StrokeOp {
    StrokeOp::release(named(name))
}

fn tap(name: &str) -> [StrokeOp; 2] {
    [press(name), release(name)]
}

/// Run events against a window title and return what was emitted.
fn run(
    d: &mut Dispatcher<Compiled, Focus, Vec<StrokeOp>>,
    title: &str,
    events: &[RawEvent],
) -> Vec<StrokeOp> {
    d.output_mut().clear();
    set_title(d, title);
    let now = Instant::now();
    for &event in events {
        d.handle_event(event, now).unwrap();
    }
    d.output().clone()
}

fn set_title(d: &mut Dispatcher<Compiled, Focus, Vec<StrokeOp>>, title: &str) {
    d.window_mut().0 = Some(title.to_string());
}

#[test]
fn test_string_taps_each_character() {
    let mut d = setup();
    let out = run(
        &mut d,
        "Home - Mozilla Firefox",
        &[RawEvent::key(1, true), RawEvent::key(1, false)],
    );
    // The last character stays down until the key is released.
    assert_eq!(out, vec![press("a"), release("a"), press("b"), release("b")]);
}

#[test]
fn test_modifier_chord() {
    let mut d = setup();
    let down = run(&mut d, "Mozilla Firefox", &[RawEvent::key(2, true)]);
    assert_eq!(down, vec![press("Control_L"), press("t"), release("Control_L")]);
    let up = run(&mut d, "Mozilla Firefox", &[RawEvent::key(2, false)]);
    assert_eq!(up, vec![release("t")]);
}

#[test]
fn test_explicit_release_half() {
    let mut d = setup();
    let down = run(&mut d, "Mozilla Firefox", &[RawEvent::key(3, true)]);
    assert_eq!(down, vec![press("Alt_L"), press("Right"), release("Alt_L")]);
    let up = run(&mut d, "Mozilla Firefox", &[RawEvent::key(3, false)]);
    assert_eq!(
        up,
        vec![
            release("Right"),
            press("Alt_L"),
            press("Left"),
            release("Alt_L"),
            release("Left"),
        ]
    );
}

#[test]
fn test_pattern_precedence_and_default() {
    let mut d = setup();
    assert_eq!(run(&mut d, "foobar", &[RawEvent::key(4, true)]), vec![press("f")]);
    assert_eq!(run(&mut d, "a bar", &[RawEvent::key(4, true)]), vec![press("o")]);
    assert_eq!(run(&mut d, "xterm", &[RawEvent::key(4, true)]), vec![press("d")]);
}

#[test]
fn test_unbound_slot_falls_back_to_default() {
    let mut d = setup();
    assert_eq!(
        run(&mut d, "Mozilla Firefox", &[RawEvent::key(5, true)]),
        vec![press("Home")]
    );
    // Unbound everywhere: nothing, and no error.
    assert!(run(&mut d, "Mozilla Firefox", &[RawEvent::key(9, true)]).is_empty());
}

#[test]
fn test_jog_wraparound_through_dispatch() {
    let mut d = setup();
    let out = run(&mut d, "Mozilla Firefox", &[RawEvent::jog(250), RawEvent::jog(2)]);
    assert_eq!(out, tap("Right").repeat(7));

    let back = run(&mut d, "Mozilla Firefox", &[RawEvent::jog(0)]);
    // 2 -> 1 emits, the step from 1 lands on 0.
    assert_eq!(back, tap("Left").repeat(2));
}

#[test]
fn test_shuttle_level_then_ratchet() {
    let mut d = setup();
    let out = run(&mut d, "xterm", &[RawEvent::shuttle(3)]);
    let mut expected = tap("F3").to_vec();
    expected.extend(tap("Up").repeat(3));
    assert_eq!(out, expected);
}

#[test]
fn test_shuttle_center_inferred_from_jog() {
    let mut d = setup();
    let start = Instant::now();
    set_title(&mut d, "xterm");
    d.handle_event(RawEvent::jog(10), start).unwrap();
    d.handle_event(RawEvent::shuttle(1), start).unwrap();
    d.output_mut().clear();

    d.handle_event(RawEvent::jog(11), start + Duration::from_millis(2)).unwrap();
    assert!(d.output().is_empty(), "within the threshold nothing is synthesized");

    d.handle_event(RawEvent::jog(12), start + Duration::from_millis(50)).unwrap();
    let mut expected = tap("space").to_vec();
    expected.extend(tap("Down"));
    assert_eq!(d.output(), &expected);
}

#[test]
fn test_compile_is_deterministic() {
    let a = compile(RULES, DebugFlags::default());
    let b = compile(RULES, DebugFlags::default());
    for slot in [
        Slot::KeyDown(1),
        Slot::KeyUp(3),
        Slot::Jog(Direction::Left),
        Slot::ShuttleIncrement(Direction::Right),
    ] {
        assert_eq!(
            a.table.resolve("Mozilla Firefox", slot),
            b.table.resolve("Mozilla Firefox", slot)
        );
    }
}
