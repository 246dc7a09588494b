use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::kernel::constants::{LOOPBACK_FEATURE, LOOPBACK_MODULE_PATH};
use crate::plugin_system::candidates::{compute_candidate_list, AvailabilityCache};
use crate::plugin_system::host::BuiltinModule;
use crate::plugin_system::module::PluginModule;
use crate::plugin_system::registry::{install_global_context, PluginRegistry, RegistryContext};
use crate::plugin_system::tests::mock_host::{counting_module, MockHost, RecordingLifetime};

fn config(register_plugins: &str) -> RegistryConfig {
    RegistryConfig {
        register_plugins: register_plugins.to_string(),
        ..RegistryConfig::default()
    }
}

fn registry(config: RegistryConfig, host: MockHost) -> PluginRegistry {
    let context = RegistryContext::new(config, Arc::new(host)).with_cache(Arc::new(AvailabilityCache::new()));
    PluginRegistry::new(context)
}

#[test]
fn test_construction_preloads_in_process_candidates() {
    counting_module!(counting);
    let host = MockHost::new()
        .with_library("/opt/a.so", counting::entry_points())
        .with_library("/opt/b.so", counting::entry_points());
    let registry = registry(
        config("/opt/a.so#A;text/a,/opt/missing.so;text/m,/opt/b.so#B;text/b"),
        host,
    );

    let paths: Vec<&Path> = registry.plugins().iter().map(|p| p.path()).collect();
    assert_eq!(
        paths,
        vec![Path::new("/opt/a.so"), Path::new("/opt/missing.so"), Path::new("/opt/b.so")]
    );
    assert_eq!(registry.preloaded_modules().count(), 2);
    assert_eq!(registry.live_module_count(), 2);
    assert_eq!(counting::initialized(), 2);

    let a = registry.find_live_module(Path::new("/opt/a.so")).expect("a is live");
    assert_eq!(a.name(), "A");
    assert!(registry.find_live_module(Path::new("/opt/missing.so")).is_none());
}

#[test]
fn test_out_of_process_candidates_are_listed_not_loaded() {
    counting_module!(counting);
    let host = MockHost::new().with_library("/opt/a.so", counting::entry_points());
    let registry = registry(
        RegistryConfig {
            out_of_process: true,
            ..config("/opt/a.so;text/a")
        },
        host,
    );

    assert_eq!(registry.plugins().len(), 1);
    assert!(registry.plugins()[0].is_out_of_process());
    assert_eq!(registry.live_module_count(), 0);
    assert!(registry.find_live_module(Path::new("/opt/a.so")).is_none());
    assert_eq!(counting::initialized(), 0);
}

#[test]
fn test_find_descriptor_returns_first_match() {
    let registry = registry(config("/opt/a.so#First;text/a,/opt/a.so#Second;text/b"), MockHost::new());

    let found = registry.find_descriptor(Path::new("/opt/a.so")).expect("descriptor exists");
    assert_eq!(found.name, "First");
    assert!(registry.find_descriptor(Path::new("/opt/other.so")).is_none());
}

#[test]
fn test_register_and_lookup_external_module() {
    let registry = registry(RegistryConfig::default(), MockHost::new());
    let module = registry.new_module("Remote", Path::new("/opt/remote.so"));
    registry.register_live_module(Path::new("/opt/remote.so"), &module);

    let found = registry
        .find_live_module(Path::new("/opt/remote.so"))
        .expect("registered module is live");
    assert!(Arc::ptr_eq(&found, &module));
    drop(found);

    // Dropping the module reports its own termination.
    drop(module);
    assert!(registry.find_live_module(Path::new("/opt/remote.so")).is_none());
    assert_eq!(registry.live_module_count(), 0);
}

#[test]
fn test_notify_module_terminated() {
    let registry = registry(RegistryConfig::default(), MockHost::new());
    let module = PluginModule::new("Remote", "/opt/remote.so", RecordingLifetime::new());
    registry.register_live_module(Path::new("/opt/remote.so"), &module);

    registry.notify_module_terminated(module.identity());
    assert!(registry.find_live_module(Path::new("/opt/remote.so")).is_none());
}

#[test]
#[should_panic(expected = "Live module already registered for path '/opt/a.so'")]
fn test_registering_over_a_preloaded_module_is_fatal() {
    counting_module!(counting);
    let host = MockHost::new().with_library("/opt/a.so", counting::entry_points());
    let registry = registry(config("/opt/a.so;text/a"), host);

    let module = PluginModule::new("Imposter", "/opt/a.so", RecordingLifetime::new());
    registry.register_live_module(Path::new("/opt/a.so"), &module);
}

#[test]
#[should_panic(expected = "was never registered as live")]
fn test_notifying_unknown_module_is_fatal() {
    let registry = registry(RegistryConfig::default(), MockHost::new());
    let module = PluginModule::new("Stranger", "/opt/stranger.so", RecordingLifetime::new());
    registry.notify_module_terminated(module.identity());
}

#[test]
fn test_drop_releases_preloaded_modules() {
    counting_module!(counting);
    let host = MockHost::new()
        .with_library("/opt/a.so", counting::entry_points())
        .with_library("/opt/b.so", counting::entry_points());
    let registry = registry(config("/opt/a.so;text/a,/opt/b.so;text/b"), host);
    let live = registry.live_module_table();
    assert_eq!(live.len(), 2);

    drop(registry);
    assert!(live.is_empty());
    assert_eq!(counting::shut_down(), 2);
}

#[test]
#[should_panic(expected = "Live modules outlived the plugin registry")]
fn test_drop_with_held_handle_is_fatal() {
    counting_module!(counting);
    let host = MockHost::new().with_library("/opt/a.so", counting::entry_points());
    let registry = registry(config("/opt/a.so;text/a"), host);
    let _held = registry.find_live_module(Path::new("/opt/a.so")).expect("a is live");

    drop(registry);
}

#[test]
fn test_preloaded_modules_are_released_in_path_order() {
    counting_module!(counting);
    let host = Arc::new(
        MockHost::new()
            .with_library("/opt/c.so", counting::entry_points())
            .with_library("/opt/a.so", counting::entry_points())
            .with_library("/opt/b.so", counting::entry_points()),
    );
    let context = RegistryContext::new(config("/opt/c.so;text/c,/opt/a.so;text/a,/opt/b.so;text/b"), host.clone())
        .with_cache(Arc::new(AvailabilityCache::new()));
    let registry = PluginRegistry::new(context);

    let preloaded: Vec<&Path> = registry.preloaded_modules().map(|(path, _)| path).collect();
    assert_eq!(
        preloaded,
        vec![Path::new("/opt/a.so"), Path::new("/opt/b.so"), Path::new("/opt/c.so")]
    );

    drop(registry);
    assert_eq!(
        host.events(),
        vec![
            "load /opt/c.so",
            "load /opt/a.so",
            "load /opt/b.so",
            "unload /opt/a.so",
            "unload /opt/b.so",
            "unload /opt/c.so",
        ]
    );
}

#[test]
fn test_shared_cache_checks_each_host_path() {
    let cache = Arc::new(AvailabilityCache::new());
    let present = MockHost::new().with_builtin(BuiltinModule::DocumentViewer, "/host-a/viewer.so", true);
    let first = PluginRegistry::new(
        RegistryContext::new(RegistryConfig::default(), Arc::new(present)).with_cache(Arc::clone(&cache)),
    );
    assert_eq!(first.plugins().len(), 1);

    let absent = Arc::new(MockHost::new().with_builtin(BuiltinModule::DocumentViewer, "/host-c/absent.so", false));
    let second = PluginRegistry::new(
        RegistryContext::new(RegistryConfig::default(), absent.clone()).with_cache(Arc::clone(&cache)),
    );
    assert!(second.plugins().is_empty());
    assert_eq!(absent.exists_checks(), 1);
}

#[test]
fn test_compute_candidate_list_matches_free_function() {
    let host = MockHost::new();
    let config = config("/opt/a.so;text/a,/opt/b.so;text/b");
    let from_registry: Vec<PathBuf> = PluginRegistry::compute_candidate_list(&config, &host)
        .into_iter()
        .map(|p| p.path)
        .collect();
    let direct: Vec<PathBuf> = compute_candidate_list(&config, &host)
        .into_iter()
        .map(|p| p.path)
        .collect();
    assert_eq!(from_registry, direct);
}

#[test]
fn test_preload_all_loads_external_in_process_libraries() {
    counting_module!(counting);
    let host = MockHost::new()
        .with_library("/opt/a.so", counting::entry_points())
        .with_feature(LOOPBACK_FEATURE);

    let loaded = PluginRegistry::preload_all(&config("/opt/a.so;text/a,/opt/missing.so;text/m"), &host);
    assert_eq!(loaded, 1);
    assert_eq!(
        host.load_attempts(),
        vec![PathBuf::from("/opt/a.so"), PathBuf::from("/opt/missing.so")]
    );
    assert!(!host.load_attempts().contains(&PathBuf::from(LOOPBACK_MODULE_PATH)));
    // Nothing is initialized and nothing is unloaded.
    assert_eq!(counting::initialized(), 0);
    assert_eq!(host.events(), vec!["load /opt/a.so"]);
}

#[test]
fn test_preload_all_keeps_one_library_per_path() {
    counting_module!(counting);
    let host = MockHost::new().with_library("/opt/kept-alive.so", counting::entry_points());
    let config = config("/opt/kept-alive.so;text/k");

    assert_eq!(PluginRegistry::preload_all(&config, &host), 1);
    assert_eq!(PluginRegistry::preload_all(&config, &host), 0);
    assert_eq!(host.load_attempts(), vec![PathBuf::from("/opt/kept-alive.so")]);
    assert_eq!(host.events(), vec!["load /opt/kept-alive.so"]);
}

#[test]
fn test_preload_all_skips_out_of_process() {
    let host = MockHost::new();
    let config = RegistryConfig {
        out_of_process: true,
        extra_module_path: "/opt/flash.so".to_string(),
        ..config("/opt/a.so;text/a")
    };
    assert_eq!(PluginRegistry::preload_all(&config, &host), 0);
    assert!(host.load_attempts().is_empty());
}

#[test]
fn test_global_instance() {
    counting_module!(counting);
    let host = MockHost::new().with_library("/opt/global.so", counting::entry_points());
    install_global_context(RegistryContext::new(config("/opt/global.so#Global;text/g"), Arc::new(host)))
        .expect("first installation succeeds");

    let registry = PluginRegistry::get_instance();
    assert!(std::ptr::eq(registry, PluginRegistry::get_instance()));
    assert_eq!(registry.plugins().len(), 1);
    assert!(registry.find_live_module(Path::new("/opt/global.so")).is_some());

    let late = install_global_context(RegistryContext::default());
    assert!(late.is_err(), "the context cannot change once the registry exists");
}
