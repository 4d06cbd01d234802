//! Handler registry and plugin loader: collects handler definitions at startup, assigns
//! evaluation groups in load order, validates the configuration, and freezes into an
//! immutable [`Registry`] shared behind `Arc`.
//!
//! No filesystem scanning or reflection: plugins are loaded through an explicit
//! `RegistryBuilder::load` list, and every validation failure aborts startup.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use promobot_core::Keyboard;

use crate::context::CommandContext;
use crate::menu::{Menu, MAIN};
use crate::predicate::{command_in, Predicate};

/// Boxed future returned by bound actions.
pub type ActionFuture = Pin<Box<dyn Future<Output = promobot_core::Result<()>> + Send>>;

/// A handler action bound to its plugin instance. Cloning shares the binding, so identity
/// comparisons (`Arc::ptr_eq`) recognize one action registered under several predicates.
pub type ActionFn = Arc<dyn Fn(Arc<CommandContext>) -> ActionFuture + Send + Sync>;

/// Binds a plugin method to an [`ActionFn`], capturing the plugin behind `Arc`.
pub fn bind<P, F, Fut>(plugin: &Arc<P>, f: F) -> ActionFn
where
    P: Send + Sync + 'static,
    F: Fn(Arc<P>, Arc<CommandContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = promobot_core::Result<()>> + Send + 'static,
{
    let plugin = Arc::clone(plugin);
    Arc::new(move |ctx| Box::pin(f(Arc::clone(&plugin), ctx)))
}

/// A handler registration under construction: name, predicate, bound action, optional
/// explicit group override, background flag.
pub struct HandlerDef {
    name: &'static str,
    predicate: Predicate,
    action: ActionFn,
    group: Option<usize>,
    background: bool,
}

impl HandlerDef {
    /// Predicate-matched registration.
    pub fn new(name: &'static str, predicate: Predicate, action: ActionFn) -> Self {
        Self {
            name,
            predicate,
            action,
            group: None,
            background: false,
        }
    }

    /// Slash-command registration: matches when the first token is one of `names`.
    pub fn commands<I, S>(name: &'static str, names: I, action: ActionFn) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, command_in(names), action)
    }

    /// Overrides the plugin's assigned group index.
    pub fn group(mut self, group: usize) -> Self {
        self.group = Some(group);
        self
    }

    /// Runs the handler on the worker pool instead of inline.
    pub fn background(mut self) -> Self {
        self.background = true;
        self
    }
}

/// A frozen handler registration.
#[derive(Clone)]
pub struct HandlerDescriptor {
    pub name: &'static str,
    pub plugin: &'static str,
    pub group: usize,
    pub predicate: Predicate,
    pub background: bool,
    pub action: ActionFn,
}

/// Start-keyboard placement for a plugin-registered button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Header,
    Main,
    Footer,
}

/// Labels registered by plugins for the home keyboard, by placement row.
#[derive(Debug, Clone, Default)]
pub struct StartButtons {
    header: Vec<String>,
    main: Vec<String>,
    footer: Vec<String>,
}

impl StartButtons {
    fn add(&mut self, label: &str, placement: Placement) {
        let row = match placement {
            Placement::Header => &mut self.header,
            Placement::Main => &mut self.main,
            Placement::Footer => &mut self.footer,
        };
        row.push(label.to_string());
    }

    /// Renders the home keyboard: main buttons chunked two per row, header and footer as
    /// single rows.
    pub fn keyboard(&self) -> Keyboard {
        Keyboard::build(self.main.iter().cloned())
            .header_row(self.header.iter().cloned())
            .footer_row(self.footer.iter().cloned())
    }
}

/// A module of handlers loaded at startup. `setup` registers menus, start buttons and
/// handlers against the plugin's assigned group.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;
    fn setup(self: Arc<Self>, handle: &mut PluginHandle<'_>);
}

/// Registration surface handed to a plugin during load. Registrations land in the
/// plugin's assigned group unless the def overrides it.
pub struct PluginHandle<'a> {
    builder: &'a mut RegistryBuilder,
    plugin: &'static str,
    group: usize,
}

impl PluginHandle<'_> {
    /// Declares a menu value this plugin parks users in.
    pub fn declare_menu(&mut self, menu: Menu) {
        debug!(plugin = self.plugin, menu = %menu, "step: menu declared");
        self.builder.declared.insert(menu);
    }

    /// Registers a label for the home keyboard.
    pub fn add_start_button(&mut self, label: &str, placement: Placement) {
        debug!(
            plugin = self.plugin,
            label,
            placement = ?placement,
            "step: start button registered"
        );
        self.builder.buttons.add(label, placement);
    }

    /// Registers a handler.
    pub fn register(&mut self, def: HandlerDef) {
        let group = def.group.unwrap_or(self.group);
        debug!(
            plugin = self.plugin,
            handler = def.name,
            group,
            background = def.background,
            "step: handler registered"
        );
        self.builder.descriptors.push(HandlerDescriptor {
            name: def.name,
            plugin: self.plugin,
            group,
            predicate: def.predicate,
            background: def.background,
            action: def.action,
        });
    }

    /// Registers the home action. Exactly one registration across all plugins.
    pub fn register_home(&mut self, action: ActionFn) {
        debug!(plugin = self.plugin, "step: home registered");
        self.builder.homes.push(action);
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No home action registered")]
    MissingHome,

    #[error("Home action registered more than once")]
    DuplicateHome,

    #[error("Duplicate registration of handler '{name}' in group {group}")]
    DuplicateHandler { name: &'static str, group: usize },

    #[error("Handler name '{name}' is bound to more than one action")]
    NameCollision { name: &'static str },

    #[error("Menu '{menu}' is referenced by a predicate but never declared")]
    UndeclaredMenu { menu: &'static str },

    #[error("Menu '{menu}' is declared but handled by no predicate")]
    UnhandledMenu { menu: &'static str },
}

/// Collects plugins and their registrations, then validates into a [`Registry`].
pub struct RegistryBuilder {
    descriptors: Vec<HandlerDescriptor>,
    homes: Vec<ActionFn>,
    declared: HashSet<Menu>,
    buttons: StartButtons,
    next_group: usize,
    loaded: Vec<&'static str>,
}

impl RegistryBuilder {
    /// Creates an empty builder. MAIN is declared by the registry itself.
    pub fn new() -> Self {
        let mut declared = HashSet::new();
        declared.insert(MAIN);
        Self {
            descriptors: Vec::new(),
            homes: Vec::new(),
            declared,
            buttons: StartButtons::default(),
            next_group: 0,
            loaded: Vec::new(),
        }
    }

    /// Loads a plugin, assigning it the next group index in load order (first plugin = 1).
    pub fn load(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.next_group += 1;
        let group = self.next_group;
        let name = plugin.name();
        info!(plugin = name, group, "step: loading plugin");
        {
            let mut handle = PluginHandle {
                builder: &mut self,
                plugin: name,
                group,
            };
            plugin.setup(&mut handle);
        }
        self.loaded.push(name);
        self
    }

    /// Validates the collected configuration and freezes it. Every failure is fatal;
    /// the process must not serve traffic on error.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let RegistryBuilder {
            descriptors,
            mut homes,
            declared,
            buttons,
            loaded,
            ..
        } = self;

        let home = match homes.len() {
            0 => return Err(RegistryError::MissingHome),
            1 => homes.remove(0),
            _ => return Err(RegistryError::DuplicateHome),
        };

        // One name, one action. Several registrations may share a name only when they
        // share the bound action (e.g. command alias + text + callback triggers).
        let mut actions: HashMap<&'static str, ActionFn> = HashMap::new();
        for descriptor in &descriptors {
            match actions.get(descriptor.name) {
                Some(existing) if !Arc::ptr_eq(existing, &descriptor.action) => {
                    return Err(RegistryError::NameCollision {
                        name: descriptor.name,
                    });
                }
                Some(_) => {}
                None => {
                    actions.insert(descriptor.name, Arc::clone(&descriptor.action));
                }
            }
        }

        for (i, a) in descriptors.iter().enumerate() {
            for b in &descriptors[i + 1..] {
                if a.group == b.group
                    && a.predicate == b.predicate
                    && Arc::ptr_eq(&a.action, &b.action)
                {
                    return Err(RegistryError::DuplicateHandler {
                        name: b.name,
                        group: b.group,
                    });
                }
            }
        }

        let mut referenced = Vec::new();
        for descriptor in &descriptors {
            descriptor.predicate.referenced_menus(&mut referenced);
        }
        for menu in &referenced {
            if !declared.contains(menu) {
                return Err(RegistryError::UndeclaredMenu {
                    menu: menu.as_str(),
                });
            }
        }
        // A declared menu no predicate covers would park users with no way out.
        for menu in &declared {
            if *menu == MAIN {
                continue;
            }
            if !referenced.contains(menu) {
                return Err(RegistryError::UnhandledMenu {
                    menu: menu.as_str(),
                });
            }
        }

        let handler_count = descriptors.len();
        let mut groups: BTreeMap<usize, Vec<HandlerDescriptor>> = BTreeMap::new();
        for descriptor in descriptors {
            groups.entry(descriptor.group).or_default().push(descriptor);
        }
        let groups: Vec<(usize, Vec<HandlerDescriptor>)> = groups.into_iter().collect();

        info!(
            plugins = loaded.len(),
            handlers = handler_count,
            groups = groups.len(),
            menus = declared.len(),
            "step: registry built"
        );

        Ok(Registry {
            groups,
            actions,
            home,
            declared,
            buttons,
            plugins: loaded,
        })
    }
}

/// Immutable handler registry: group-ordered descriptors, actions by name, the home
/// action, declared menus and the start-button rows. Built once at startup, then read
/// lock-free during dispatch.
pub struct Registry {
    groups: Vec<(usize, Vec<HandlerDescriptor>)>,
    actions: HashMap<&'static str, ActionFn>,
    home: ActionFn,
    declared: HashSet<Menu>,
    buttons: StartButtons,
    plugins: Vec<&'static str>,
}

impl Registry {
    /// Handler groups in ascending index order; within a group, declaration order.
    pub fn groups(&self) -> &[(usize, Vec<HandlerDescriptor>)] {
        &self.groups
    }

    /// Looks up an action by handler name, for programmatic re-entry.
    pub fn action(&self, name: &str) -> Option<ActionFn> {
        self.actions.get(name).cloned()
    }

    /// The designated default/reset action.
    pub fn home(&self) -> ActionFn {
        Arc::clone(&self.home)
    }

    /// Whether a menu value was declared by some plugin (MAIN always is).
    pub fn is_declared(&self, menu: Menu) -> bool {
        self.declared.contains(&menu)
    }

    /// Renders the home keyboard from the registered start buttons.
    pub fn start_keyboard(&self) -> Keyboard {
        self.buttons.keyboard()
    }

    /// Loaded plugin names in group order.
    pub fn plugins(&self) -> &[&'static str] {
        &self.plugins
    }

    /// Total number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.groups.iter().map(|(_, v)| v.len()).sum()
    }

    /// Declared menu values, sorted for stable output.
    pub fn declared_menus(&self) -> Vec<Menu> {
        let mut menus: Vec<Menu> = self.declared.iter().copied().collect();
        menus.sort_by_key(|m| m.as_str());
        menus
    }
}
