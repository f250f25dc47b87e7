pub mod fixtures;

use fixtures::*;
use parking_lot::RwLock;
use std::sync::Arc;
use tweaker_core::{
    AutoScan, InvokableManager, InvokableProcessor, InvokableMarker, MANUAL_MODULE, Range, Registry, SearchOptions,
    TweakableManager, TweakableMarker, TweakerObject,
};
use tweaker_reflect::{AnyMarker, BoundInstance, Value, ValueKind};
use tweaker_scanner::{BindingFilter, ScanOptions, Scanner, Scope};

fn attached() -> (Arc<Scanner>, Arc<InvokableManager>, Arc<TweakableManager>) {
    let scanner = Arc::new(Scanner::new());
    let invokables = Arc::new(InvokableManager::new().attach(&scanner).unwrap());
    let tweakables = Arc::new(TweakableManager::new().attach(&scanner).unwrap());
    (scanner, invokables, tweakables)
}

fn keys<O>(objects: &std::collections::BTreeMap<String, O>) -> Vec<&str> {
    objects.keys().map(String::as_str).collect()
}

#[test]
fn test_static_method_and_event_are_registered() {
    let (scanner, invokables, _) = attached();

    scanner.scan_module(&scenario_module(), &ScanOptions::default()).unwrap();

    let all = invokables.get_invokables(None);
    assert_eq!(keys(&all), vec!["TestEventStaticVoidVoid", "TestMethodStaticVoidVoid"]);
    assert!(invokables.get_invokable("TestMethodStaticVoidVoid").is_some());
    assert!(all["TestEventStaticVoidVoid"].is_event());
    assert!(!all["TestMethodStaticVoidVoid"].is_event());
}

#[test]
fn test_type_marker_expansion_skips_explicit_markers() {
    let (scanner, invokables, _) = attached();

    scanner.scan_module(&console_module(), &ScanOptions::default()).unwrap();

    let all = invokables.get_invokables(None);
    assert_eq!(keys(&all), vec!["console.add", "console.clear", "console.debug", "console.print-explicit"]);

    let add = &all["console.add"];
    assert_eq!(add.parameter_kinds(), vec![ValueKind::I32, ValueKind::I32]);
    assert_eq!(add.arg_descriptions(), vec!["left operand", ""]);
    assert_eq!(add.return_kind(), ValueKind::I32);
    assert_eq!(add.return_description(), "the sum");
    assert_eq!(add.module(), "console");
    assert_eq!(all["console.print-explicit"].description(), Some("Prints one line"));
    assert!(!all["console.debug"].is_public());
}

#[test]
fn test_rescan_registers_each_object_once() {
    let (scanner, invokables, _) = attached();
    let module = console_module();

    scanner.scan_module(&module, &ScanOptions::default()).unwrap();
    scanner.scan_module(&module, &ScanOptions::default()).unwrap();

    assert_eq!(invokables.get_invokables(None).len(), 4);
}

#[test]
fn test_detached_manager_stops_receiving() {
    let scanner = Arc::new(Scanner::new());
    let invokables = InvokableManager::new().attach(&scanner).unwrap();
    assert!(invokables.is_attached());
    assert_eq!(scanner.processor_count(), 1);

    drop(invokables);
    assert_eq!(scanner.processor_count(), 0);

    let fresh = InvokableManager::new();
    scanner.scan_module(&scenario_module(), &ScanOptions::default()).unwrap();
    assert!(fresh.get_invokables(None).is_empty());
    assert!(!fresh.is_attached());
}

#[test]
fn test_name_conflicts_and_missing_names() {
    let invokables = InvokableManager::new();
    invokables.register_delegate("ping", || {}, None).unwrap();

    let err = invokables.register_delegate("ping", |x: i32| x, None).unwrap_err();
    assert_eq!(err.kind(), "name_already_registered");

    let err = invokables.unregister("pong").unwrap_err();
    assert_eq!(err.kind(), "not_found");
    assert_eq!(err.to_string(), "The name 'pong' is not currently in use");

    assert!(invokables.unregister("ping").is_ok());
    assert!(invokables.get_invokable("ping").is_none());
}

#[test]
fn test_scan_conflict_surfaces_from_the_scan() {
    let (scanner, invokables, _) = attached();
    invokables.register_delegate("TestMethodStaticVoidVoid", || {}, None).unwrap();

    assert!(scanner.scan_module(&scenario_module(), &ScanOptions::default()).is_err());
    let kept = invokables.get_invokable("TestMethodStaticVoidVoid").unwrap();
    assert_eq!(kept.module(), MANUAL_MODULE);
}

#[test]
fn test_dropped_instances_are_pruned_and_statics_kept() {
    let (scanner, invokables, tweakables) = attached();
    scanner.scan_module(&scenario_module(), &ScanOptions::default()).unwrap();
    let player = Player::new();
    let handle = scanner.scan_instance(&player, &ScanOptions::default()).unwrap();

    assert_eq!(invokables.get_invokables(None).len(), 5);
    assert_eq!(tweakables.get_tweakables(None).len(), 3);
    assert!(tweakables.get_tweakable(&bound("player.health", handle.id())).is_some());

    drop(player);
    assert!(!handle.is_alive());

    // Direct lookups do not prune.
    assert!(invokables.get_invokable(&bound("player.heal", handle.id())).is_some());
    assert_eq!(tweakables.prune_dead_instances(), 3);
    assert_eq!(tweakables.prune_dead_instances(), 0);
    assert_eq!(keys(&invokables.get_invokables(None)), vec!["TestEventStaticVoidVoid", "TestMethodStaticVoidVoid"]);
}

#[test]
fn test_distinct_instances_get_distinct_names() {
    let (scanner, invokables, _) = attached();
    let first = Player::new();
    let second = Player::new();

    let a = scanner.scan_instance(&first, &ScanOptions::default()).unwrap();
    let b = scanner.scan_instance(&second, &ScanOptions::default()).unwrap();
    scanner.scan_instance(&first, &ScanOptions::default()).unwrap();

    assert_ne!(a.id(), b.id());
    assert_eq!(invokables.get_invokables(None).len(), 6);
    assert!(invokables.get_invokable(&bound("player.heal", a.id())).is_some());
    assert!(invokables.get_invokable(&bound("player.heal", b.id())).is_some());
}

#[test]
fn test_unique_instances_is_opt_in() {
    let target = Arc::new(7_u8);
    let shared = BoundInstance::bind(&target);

    let lenient = InvokableManager::new();
    lenient.register_delegate("first", || {}, Some(shared.clone())).unwrap();
    lenient.register_delegate("second", || {}, Some(shared.clone())).unwrap();
    assert_eq!(lenient.get_invokables(None).len(), 2);

    let strict = InvokableManager::with_registry(Registry::new().with_unique_instances());
    strict.register_delegate("first", || {}, Some(shared.clone())).unwrap();
    let err = strict.register_delegate("second", || {}, Some(shared.clone())).unwrap_err();
    assert_eq!(err.kind(), "instance_already_registered");
    assert!(err.to_string().contains(&bound("first", shared.id())));
}

#[test]
fn test_search_filters() {
    let (scanner, invokables, _) = attached();
    scanner.scan_module(&console_module(), &ScanOptions::default()).unwrap();
    let player = Player::new();
    scanner.scan_instance(&player, &ScanOptions::default()).unwrap();
    invokables.register_delegate("manual.ping", || {}, None).unwrap();

    let by_name = SearchOptions::new().with_name_pattern(r"^console\.(add|clear)$").unwrap();
    assert_eq!(keys(&invokables.get_invokables(Some(&by_name))), vec!["console.add", "console.clear"]);

    let by_module = SearchOptions::new().with_module_pattern(&format!("^{MANUAL_MODULE}$")).unwrap();
    assert_eq!(keys(&invokables.get_invokables(Some(&by_module))), vec!["manual.ping"]);

    let hidden = SearchOptions::new().with_scope(Scope::NON_PUBLIC);
    assert_eq!(keys(&invokables.get_invokables(Some(&hidden))), vec!["console.debug"]);

    let instance = SearchOptions::new().with_binding(BindingFilter::INSTANCE);
    assert_eq!(invokables.get_invokables(Some(&instance)).len(), 3);

    let first = invokables.get_object(Some(&SearchOptions::new().with_name_pattern("^player").unwrap())).unwrap();
    assert!(first.name().starts_with("player.heal#"));
    assert!(invokables.get_object(Some(&SearchOptions::new().with_name_pattern("^nothing").unwrap())).is_none());

    let err = SearchOptions::new().with_name_pattern("(").unwrap_err();
    assert_eq!(err.kind(), "invalid_pattern");
}

#[test]
fn test_manual_field_and_property() {
    let tweakables = TweakableManager::new();
    let level = Arc::new(RwLock::new(3_i32));
    tweakables
        .register_field(&TweakableMarker::new("manual.level"), Arc::clone(&level), &[AnyMarker::new(Range::new(0, 10))])
        .unwrap();

    tweakables.set_value("manual.level", Value::I32(42)).unwrap();
    assert_eq!(*level.read(), 10);
    assert_eq!(tweakables.get_value("manual.level").unwrap(), Value::I32(10));

    let title = Arc::new(RwLock::new(String::from("none")));
    let (read, write) = (Arc::clone(&title), Arc::clone(&title));
    let property = tweakables
        .register_property(
            &TweakableMarker::new("manual.title").with_description("Window title"),
            move || read.read().clone(),
            move |value: String| *write.write() = value,
            &[],
        )
        .unwrap();

    tweakables.set_value("manual.title", Value::from("tweaked")).unwrap();
    assert_eq!(*title.read(), "tweaked");
    assert_eq!(property.module(), MANUAL_MODULE);
    assert_eq!(property.description(), Some("Window title"));

    let err = tweakables.get_value("manual.missing").unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[test]
fn test_auto_scan_unregisters_on_drop() {
    let (scanner, invokables, tweakables) = attached();
    let player = Player::new();

    let guard = AutoScan::scan(
        &scanner,
        &player,
        Some(Arc::clone(&invokables)),
        Some(Arc::clone(&tweakables)),
        &ScanOptions::default(),
    )
    .unwrap();

    let id = guard.bound().id();
    let mut names = guard.invokable_names().to_vec();
    names.sort();
    assert_eq!(names, vec![bound("player.heal", id), bound("player.hit", id), bound("player.refuse", id)]);
    assert_eq!(guard.tweakable_names().len(), 3);
    assert_eq!(invokables.get_invokables(None).len(), 3);

    drop(guard);
    assert!(invokables.get_invokables(None).is_empty());
    assert!(tweakables.get_tweakables(None).is_empty());
    assert_eq!(Arc::strong_count(&player), 1);
}

#[test]
fn test_auto_scan_registers_with_detached_managers() {
    let scanner = Arc::new(Scanner::new());
    scanner
        .add_attribute_processor::<InvokableMarker, _>(Arc::new(InvokableProcessor::default()))
        .unwrap();
    let invokables = Arc::new(InvokableManager::new());
    let player = Player::new();

    let guard =
        AutoScan::scan(&scanner, &player, Some(Arc::clone(&invokables)), None, &ScanOptions::default()).unwrap();
    assert_eq!(invokables.get_invokables(None).len(), 3);
    assert!(guard.tweakable_names().is_empty());

    invokables.unregister(&guard.invokable_names()[0]).unwrap();
    drop(guard);
    assert!(invokables.get_invokables(None).is_empty());
}

#[test]
fn test_type_marker_expansion_isolates_failing_members() {
    let (scanner, invokables, _) = attached();
    let module = group_module();
    let isolated = ScanOptions::new().isolate_failures(true);

    let summary = scanner.scan_module(&module, &isolated).unwrap();
    assert_eq!(summary.failures, 1);
    assert_eq!(keys(&invokables.get_invokables(None)), vec!["group.b_fine"]);
    assert_eq!(invokables.invoke("group.b_fine", &[]).unwrap(), Value::I32(7));

    let summary = scanner.scan_module(&module, &isolated).unwrap();
    assert_eq!(summary.failures, 0);
    assert_eq!(invokables.get_invokables(None).len(), 1);
}

#[test]
fn test_type_marker_expansion_stops_without_isolation() {
    let (scanner, invokables, _) = attached();

    let err = scanner.scan_module(&group_module(), &ScanOptions::default()).unwrap_err();
    assert_eq!(err.kind(), "processor");
    assert!(invokables.get_invokables(None).is_empty());
}
