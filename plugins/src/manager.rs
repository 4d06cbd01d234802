//! Group creation and listing.
//!
//! Declares NEW_GROUP_NAME_PROMPT and MANAGE_GROUPS and contributes the
//! "New Group" and "My Groups" start buttons. `mygroups` is the listing every
//! sub-flow returns to.

use std::sync::Arc;

use dispatch::{
    bind, command, is_media, menu, text_is, CommandContext, HandlerDef, Menu, Placement, Plugin,
    PluginHandle, MAIN,
};
use promobot_core::{Keyboard, Reply};
use storage::GroupRepository;

use crate::{is_cancel_word, is_reserved};

/// Waiting for the name of the group being created.
pub const NEW_GROUP_NAME_PROMPT: Menu = Menu::new("new group name prompt");

/// Choosing a group from the listing.
pub const MANAGE_GROUPS: Menu = Menu::new("manage groups");

pub struct GroupManager {
    groups: GroupRepository,
}

impl GroupManager {
    pub fn new(groups: GroupRepository) -> Self {
        Self { groups }
    }

    async fn new_group(self: Arc<Self>, ctx: Arc<CommandContext>) -> promobot_core::Result<()> {
        ctx.reply("What is the name of the Promotion Group?").await?;
        ctx.set_menu(NEW_GROUP_NAME_PROMPT).await
    }

    /// Media sent where a name is expected; the prompt state stays.
    async fn create_group_media(
        self: Arc<Self>,
        ctx: Arc<CommandContext>,
    ) -> promobot_core::Result<()> {
        ctx.reply("The name has to be plain text. What should the group be called?")
            .await
    }

    async fn create_group(self: Arc<Self>, ctx: Arc<CommandContext>) -> promobot_core::Result<()> {
        let Some(name) = ctx.text().map(str::to_string) else {
            return Ok(());
        };

        // Cancel words and slash commands belong to handlers in other groups.
        if is_cancel_word(&name) || ctx.event().command().is_some() {
            return Ok(());
        }
        if is_reserved(&name) {
            ctx.reply(&format!("You can't name your group \"{}\"", name))
                .await?;
            return Ok(());
        }

        let admin_id = ctx.user().id;
        if self.groups.find_for_admin(admin_id, &name).await?.is_some() {
            ctx.reply(&format!(
                "A group with the name \"{}\" does already exist",
                name
            ))
            .await?;
            return Ok(());
        }

        self.groups.create(&name, admin_id).await?;

        ctx.reply("Okay got it. I have created a new Promotion Group.")
            .await?;
        ctx.set_menu(MAIN).await?;
        self.mygroups(ctx).await
    }

    /// Lists the sender's groups as a keyboard and parks the user in
    /// MANAGE_GROUPS. Also the return point for every editor sub-flow.
    async fn mygroups(self: Arc<Self>, ctx: Arc<CommandContext>) -> promobot_core::Result<()> {
        let groups = self.groups.list_for_admin(ctx.user().id).await?;
        let names = groups.into_iter().map(|group| group.name);

        ctx.reply_with(Reply::text("Promotion Groups:").keyboard(Keyboard::build(names)))
            .await?;
        ctx.set_scratch("").await?;
        ctx.set_menu(MANAGE_GROUPS).await
    }
}

impl Plugin for GroupManager {
    fn name(&self) -> &'static str {
        "manager"
    }

    fn setup(self: Arc<Self>, handle: &mut PluginHandle<'_>) {
        handle.declare_menu(NEW_GROUP_NAME_PROMPT);
        handle.declare_menu(MANAGE_GROUPS);
        handle.add_start_button("New Group", Placement::Main);
        handle.add_start_button("My Groups", Placement::Main);

        handle.register(HandlerDef::new(
            "new",
            command("new") | text_is(["New Group"]),
            bind(&self, GroupManager::new_group),
        ));
        // Declaration order matters: the media case wins over the free-text
        // case, and the reserved-word check in create_group fields the rest.
        handle.register(HandlerDef::new(
            "create_group_media",
            menu(NEW_GROUP_NAME_PROMPT) & is_media(),
            bind(&self, GroupManager::create_group_media),
        ));
        handle.register(HandlerDef::new(
            "create_group",
            menu(NEW_GROUP_NAME_PROMPT) & !is_media(),
            bind(&self, GroupManager::create_group),
        ));
        handle.register(HandlerDef::new(
            "mygroups",
            command("mygroups") | text_is(["My Groups", "Back to list"]),
            bind(&self, GroupManager::mygroups),
        ));
    }
}
