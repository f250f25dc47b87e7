pub mod fixtures;

use fixtures::*;
use std::sync::Arc;
use tweaker::config::TweakerConfig;
use tweaker::{BindingFilter, ScanOptions, Scanner, SearchOptions, Tweaker, TweakerOptions, Value};

fn shop_scan() -> ScanOptions {
    ScanOptions::new().with_module_pattern("^linked-shop$").unwrap()
}

#[test]
fn test_scan_of_linked_modules_registers_statics() {
    let tweaker = Tweaker::new(TweakerOptions::ALL).unwrap();

    tweaker.scan(&shop_scan()).unwrap();

    let names: Vec<String> = tweaker.invokables().get_invokables(None).into_keys().collect();
    assert_eq!(names, vec!["shop.restock", "shop.restocked"]);
    assert_eq!(tweaker.invoke("shop.restock", &[Value::U32(3)]).unwrap(), Value::U32(3));
    assert!(tweaker.tweakables().get_tweakables(None).is_empty());
}

#[test]
fn test_auto_scan_binds_instance_members() {
    let tweaker = Tweaker::new(TweakerOptions::ALL).unwrap();
    let shop = Shop::new();

    let guard = tweaker.auto_scan(&shop, &ScanOptions::default()).unwrap();
    let id = guard.bound().id();

    tweaker.invoke(&format!("shop.close#{id}"), &[]).unwrap();
    assert!(!*shop.open.read());

    let price = format!("shop.price#{id}");
    tweaker.set_value(&price, Value::U32(500)).unwrap();
    assert_eq!(tweaker.get_value(&price).unwrap(), Value::U32(99));

    let discount = tweaker.tweakables().get_tweakable(&format!("shop.discount#{id}")).unwrap();
    assert_eq!(discount.next_value().unwrap(), Value::I32(0));
    assert_eq!(discount.value_name(), "0");
    assert_eq!(discount.previous_value().unwrap(), Value::I32(50));
    assert_eq!(discount.value_name(), "half");

    let instance_only = SearchOptions::new().with_binding(BindingFilter::INSTANCE);
    assert_eq!(tweaker.invokables().get_invokables(Some(&instance_only)).len(), 1);

    drop(guard);
    assert!(tweaker.invokables().get_invokables(None).is_empty());
    assert!(tweaker.tweakables().get_tweakables(None).is_empty());
}

#[test]
fn test_options_decide_which_managers_listen() {
    let tweaker = Tweaker::new(TweakerOptions::SCAN_FOR_TWEAKABLES).unwrap();
    assert!(!tweaker.invokables().is_attached());
    assert!(tweaker.tweakables().is_attached());

    let shop = Shop::new();
    let guard = tweaker.auto_scan(&shop, &ScanOptions::default()).unwrap();
    assert!(guard.invokable_names().is_empty());
    assert_eq!(guard.tweakable_names().len(), 2);
    assert!(tweaker.invokables().get_invokables(None).is_empty());
}

#[test]
fn test_shared_scanner_feeds_both_tweakers() {
    let scanner = Arc::new(Scanner::new());
    let commands = Tweaker::with_scanner(Arc::clone(&scanner), TweakerOptions::SCAN_FOR_INVOKABLES).unwrap();
    let values = Tweaker::with_scanner(Arc::clone(&scanner), TweakerOptions::SCAN_FOR_TWEAKABLES).unwrap();

    let shop = Shop::new();
    scanner.scan_instance(&shop, &ScanOptions::default()).unwrap();

    assert_eq!(commands.invokables().get_invokables(None).len(), 1);
    assert!(commands.tweakables().get_tweakables(None).is_empty());
    assert_eq!(values.tweakables().get_tweakables(None).len(), 2);
    assert!(values.invokables().get_invokables(None).is_empty());
}

#[test]
fn test_from_config() {
    let config = TweakerConfig { scan_tweakables: false, ..TweakerConfig::default() };
    let tweaker = Tweaker::from_config(&config).unwrap();
    assert_eq!(tweaker.options(), TweakerOptions::SCAN_FOR_INVOKABLES);

    let options: TweakerOptions = serde_json::from_str("3").unwrap();
    assert_eq!(options, TweakerOptions::ALL);
}
