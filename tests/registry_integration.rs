/*
 *  tests/registry_integration.rs
 *
 *  Integration tests for the dynamic features registry and loader
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 */

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::thread;

use ddcio::features::{
    DefinitionErrorKind, FeatureDefinitionLoader, FeatureFlags, FeatureRegistry, MccsVersion,
    RecordStatus,
};
use ddcio::model_key::MonitorModelKey;

const DELL_DEFINITION: &str = "\
* Dell U2415 local overrides
MFG_ID        DEL
MODEL         DELL U2415
PRODUCT_CODE  41060
MCCS_VERSION  2.1

FEATURE_CODE  DC  Display Mode
   ATTRS      RW NC
   VALUE      00  Standard
   VALUE      02  Multimedia
   VALUE      03  Movie

FEATURE_CODE  E0  Input Lock
   DESC       Locks the on screen display buttons
   ATTRS      RW NC
   VALUE      01  Locked
   VALUE      02  Unlocked
";

fn dell() -> MonitorModelKey {
    MonitorModelKey::new("DEL", "DELL U2415", 41060).unwrap()
}

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ddcio-registry-{}-{}", tag, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_load_full_definition_from_directory() {
    let dir = scratch_dir("full");
    fs::write(dir.join("DEL-DELL_U2415-41060.mccs"), DELL_DEFINITION).unwrap();

    let loader = FeatureDefinitionLoader::new(vec![dir.clone()]);
    let mut registry = FeatureRegistry::new();
    let created = loader.load_into(&mut registry, &dell()).unwrap();

    assert!(created.created);
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    let record = created.record;
    assert_eq!(record.status(), RecordStatus::Populated);
    assert_eq!(record.vspec(), MccsVersion::V21);
    assert_eq!(record.feature_count(), 2);

    let mode = record.lookup_feature(0xdc).unwrap();
    assert_eq!(mode.name, "Display Mode");
    assert!(mode.flags.contains(FeatureFlags::RW | FeatureFlags::SIMPLE_NC));
    assert_eq!(mode.value_name(0x03), Some("Movie"));

    let lock = registry.lookup_feature(&dell(), 0xe0).unwrap();
    assert_eq!(lock.description.as_deref(), Some("Locks the on screen display buttons"));
    assert!(registry.lookup_feature(&dell(), 0x10).is_none());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_first_directory_wins() {
    let first = scratch_dir("first");
    let second = scratch_dir("second");
    fs::write(first.join("DEL-DELL_U2415-41060.mccs"), "FEATURE_CODE 10 Luminance\n").unwrap();
    fs::write(second.join("DEL-DELL_U2415-41060.mccs"), "FEATURE_CODE 10 Brightness\n").unwrap();

    let loader = FeatureDefinitionLoader::new(vec![first.clone(), second.clone()]);
    let mut registry = FeatureRegistry::new();
    let created = loader.load_into(&mut registry, &dell()).unwrap();
    assert_eq!(created.record.lookup_feature(0x10).unwrap().name, "Luminance");

    fs::remove_dir_all(&first).ok();
    fs::remove_dir_all(&second).ok();
}

#[test]
fn test_mismatched_header_is_reported() {
    let lines = ["MFG_ID ACI", "FEATURE_CODE 10 Brightness"];
    let mut registry = FeatureRegistry::new();
    let created = registry.get_or_create(&dell(), Some(&lines[..]), None).unwrap();

    assert!(created
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, DefinitionErrorKind::KeyMismatch { .. })));
}

#[test]
fn test_shared_registry_creates_once() {
    let registry = Arc::new(Mutex::new(FeatureRegistry::new()));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let lines = ["FEATURE_CODE 10 Brightness"];
                let mut reg = registry.lock().unwrap();
                reg.get_or_create(&dell(), Some(&lines[..]), None).unwrap().created
            })
        })
        .collect();

    let created: usize = handles.into_iter().map(|h| h.join().unwrap() as usize).sum();
    assert_eq!(created, 1);
    assert_eq!(registry.lock().unwrap().len(), 1);
}

#[test]
fn test_concurrent_readers_share_records() {
    let mut registry = FeatureRegistry::new();
    let lines = ["FEATURE_CODE 10 Brightness", "FEATURE_CODE 12 Contrast"];
    registry.get_or_create(&dell(), Some(&lines[..]), None).unwrap();
    let registry = Arc::new(RwLock::new(registry));

    let handles: Vec<_> = [0x10u8, 0x12, 0x14]
        .into_iter()
        .map(|code| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let reg = registry.read().unwrap();
                reg.lookup_feature(&dell(), code).map(|m| m.name.clone())
            })
        })
        .collect();

    let names: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(names, vec![Some("Brightness".to_string()), Some("Contrast".to_string()), None]);
}
