pub mod builtin;

use crate::engine::plugins::PluginRegistry;

/// Registry pre-populated with the bundled plugins.
pub fn default_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    register_defaults(&mut registry);
    registry
}

/// Register the bundled plugins under their public names.
pub fn register_defaults(registry: &mut PluginRegistry) {
    registry
        .register_action(builtin::SELECT_WORD, builtin::select_word)
        .register_validation(builtin::TEXT_NODES, builtin::text_nodes);
}
