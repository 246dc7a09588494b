use std::path::{Path, PathBuf};

use crate::config::RegistryConfig;
use crate::kernel::constants::{
    DOCUMENT_VIEWER_MIME_TYPE, DOCUMENT_VIEWER_NAME, EXTRA_MODULE_NAME, LOOPBACK_FEATURE,
    LOOPBACK_MODULE_PATH, NATIVE_CLIENT_NAME,
};
use crate::plugin_system::candidates::{compute_candidate_list_with, AvailabilityCache};
use crate::plugin_system::host::BuiltinModule;
use crate::plugin_system::tests::mock_host::MockHost;

const VIEWER: &str = "/usr/lib/plume/libplume_document_viewer.so";
const NACL: &str = "/usr/lib/plume/libplume_native_client.so";

fn paths(host: &MockHost, config: &RegistryConfig, cache: &AvailabilityCache) -> Vec<PathBuf> {
    compute_candidate_list_with(config, host, cache)
        .into_iter()
        .map(|p| p.path)
        .collect()
}

#[test]
fn test_empty_configuration_yields_no_candidates() {
    let host = MockHost::new();
    let cache = AvailabilityCache::new();
    assert!(compute_candidate_list_with(&RegistryConfig::default(), &host, &cache).is_empty());
}

#[test]
fn test_candidate_order() {
    let host = MockHost::new()
        .with_builtin(BuiltinModule::DocumentViewer, VIEWER, true)
        .with_builtin(BuiltinModule::NativeClient, NACL, true)
        .with_feature(LOOPBACK_FEATURE);
    let config = RegistryConfig {
        register_plugins: "/opt/a.so;text/a,/opt/b.so;text/b".to_string(),
        extra_module_path: "/opt/flash.so".to_string(),
        extra_module_version: "11.1".to_string(),
        out_of_process: false,
    };
    let cache = AvailabilityCache::new();

    let plugins = compute_candidate_list_with(&config, &host, &cache);
    let names: Vec<&str> = plugins.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names[0], DOCUMENT_VIEWER_NAME);
    assert_eq!(names[1], NATIVE_CLIENT_NAME);
    assert_eq!(plugins[2].path, Path::new(LOOPBACK_MODULE_PATH));
    assert!(plugins[2].is_internal());
    assert_eq!(names[3], EXTRA_MODULE_NAME);
    assert_eq!(plugins[4].path, Path::new("/opt/a.so"));
    assert_eq!(plugins[5].path, Path::new("/opt/b.so"));
    assert_eq!(plugins.len(), 6);
    assert!(plugins[0].handles_mime_type(DOCUMENT_VIEWER_MIME_TYPE));

    // Same inputs, same answer.
    let again: Vec<PathBuf> = compute_candidate_list_with(&config, &host, &cache)
        .into_iter()
        .map(|p| p.path)
        .collect();
    let first: Vec<PathBuf> = plugins.into_iter().map(|p| p.path).collect();
    assert_eq!(first, again);
}

#[test]
fn test_missing_builtin_is_skipped() {
    let host = MockHost::new()
        .with_builtin(BuiltinModule::DocumentViewer, VIEWER, false)
        .with_builtin(BuiltinModule::NativeClient, NACL, true);
    let cache = AvailabilityCache::new();
    assert_eq!(paths(&host, &RegistryConfig::default(), &cache), vec![PathBuf::from(NACL)]);
}

#[test]
fn test_internal_module_requires_feature() {
    let cache = AvailabilityCache::new();
    let without = MockHost::new();
    assert!(paths(&without, &RegistryConfig::default(), &cache).is_empty());

    let with = MockHost::new().with_feature(LOOPBACK_FEATURE);
    assert_eq!(
        paths(&with, &RegistryConfig::default(), &cache),
        vec![PathBuf::from(LOOPBACK_MODULE_PATH)]
    );
}

#[test]
fn test_confirmed_builtin_is_not_rechecked() {
    let host = MockHost::new().with_builtin(BuiltinModule::DocumentViewer, VIEWER, true);
    let cache = AvailabilityCache::new();
    let config = RegistryConfig::default();

    assert_eq!(paths(&host, &config, &cache), vec![PathBuf::from(VIEWER)]);
    assert_eq!(host.exists_checks(), 1);
    assert!(cache.is_confirmed(BuiltinModule::DocumentViewer, Path::new(VIEWER)));

    // The file disappears, but the cache keeps listing it.
    host.remove_file(VIEWER);
    assert_eq!(paths(&host, &config, &cache), vec![PathBuf::from(VIEWER)]);
    assert_eq!(host.exists_checks(), 1);

    // A fresh cache checks again.
    let fresh = AvailabilityCache::new();
    assert!(paths(&host, &config, &fresh).is_empty());
    assert_eq!(host.exists_checks(), 2);
}

#[test]
fn test_confirmation_is_per_path() {
    let cache = AvailabilityCache::new();
    let config = RegistryConfig::default();
    let first = MockHost::new().with_builtin(BuiltinModule::DocumentViewer, "/host-a/viewer.so", true);
    assert_eq!(paths(&first, &config, &cache), vec![PathBuf::from("/host-a/viewer.so")]);

    // Another host keeps its viewer elsewhere and the file is not there.
    let second = MockHost::new().with_builtin(BuiltinModule::DocumentViewer, "/host-b/viewer.so", false);
    assert!(paths(&second, &config, &cache).is_empty());
    assert_eq!(second.exists_checks(), 1);
    assert!(cache.is_confirmed(BuiltinModule::DocumentViewer, Path::new("/host-a/viewer.so")));
    assert!(!cache.is_confirmed(BuiltinModule::DocumentViewer, Path::new("/host-b/viewer.so")));

    // The same path under the other built-in is not confirmed either.
    assert!(!cache.is_confirmed(BuiltinModule::NativeClient, Path::new("/host-a/viewer.so")));
}

#[test]
fn test_absent_builtin_is_rechecked() {
    let host = MockHost::new().with_builtin(BuiltinModule::NativeClient, NACL, false);
    let cache = AvailabilityCache::new();
    let config = RegistryConfig::default();

    assert!(paths(&host, &config, &cache).is_empty());
    assert!(!cache.is_confirmed(BuiltinModule::NativeClient, Path::new(NACL)));
    host.add_file(NACL);
    assert_eq!(paths(&host, &config, &cache), vec![PathBuf::from(NACL)]);
    assert_eq!(host.exists_checks(), 2);
}

#[test]
fn test_configured_candidates_are_not_deduplicated() {
    let host = MockHost::new();
    let cache = AvailabilityCache::new();
    let config = RegistryConfig {
        register_plugins: "/opt/a.so;text/a,/opt/a.so;text/b".to_string(),
        ..RegistryConfig::default()
    };
    assert_eq!(
        paths(&host, &config, &cache),
        vec![PathBuf::from("/opt/a.so"), PathBuf::from("/opt/a.so")]
    );
}

#[test]
fn test_out_of_process_applies_to_configured_candidates_only() {
    let host = MockHost::new().with_feature(LOOPBACK_FEATURE);
    let cache = AvailabilityCache::new();
    let config = RegistryConfig {
        register_plugins: "/opt/a.so;text/a".to_string(),
        extra_module_path: "/opt/flash.so".to_string(),
        out_of_process: true,
        ..RegistryConfig::default()
    };
    let plugins = compute_candidate_list_with(&config, &host, &cache);
    assert_eq!(plugins.len(), 3);
    assert!(!plugins[0].is_out_of_process());
    assert!(plugins[1].is_out_of_process());
    assert!(plugins[2].is_out_of_process());
}
