//! Per-group management flows: rename, enable/disable, delete, participants.
//!
//! Declares MANAGE_GROUP, EDIT_NAME, DELETE_CONFIRM and ADD_PARTICIPANT_WAIT.
//! `manage_group` doubles as the direct re-entry point (`open_group`) the
//! sub-flows return through; `delete_yes` re-enters the listing through
//! `run_command` instead, because `mygroups` belongs to another plugin.

use std::sync::Arc;

use tracing::warn;

use dispatch::{
    bind, forwarded_from_channel, menu, text_is, CommandContext, HandlerDef, Menu, Plugin,
    PluginHandle,
};
use promobot_core::{Keyboard, Reply};
use storage::{ChannelRepository, GroupRepository, ParticipantRepository, PromoGroup, StorageError};

use crate::manager::MANAGE_GROUPS;
use crate::{is_cancel_word, is_reserved};

/// Managing one selected group.
pub const MANAGE_GROUP: Menu = Menu::new("manage group");

/// Waiting for the group's new name.
pub const EDIT_NAME: Menu = Menu::new("edit name");

/// Waiting for Yes/No on a pending deletion.
pub const DELETE_CONFIRM: Menu = Menu::new("delete confirm");

/// Waiting for a forwarded channel post to add as a participant.
pub const ADD_PARTICIPANT_WAIT: Menu = Menu::new("add participant wait");

pub struct GroupEditor {
    groups: GroupRepository,
    channels: ChannelRepository,
    participants: ParticipantRepository,
}

impl GroupEditor {
    pub fn new(
        groups: GroupRepository,
        channels: ChannelRepository,
        participants: ParticipantRepository,
    ) -> Self {
        Self {
            groups,
            channels,
            participants,
        }
    }

    /// The group currently selected in the conversation, if it still exists
    /// and the sender still administers it.
    async fn current_group(
        &self,
        ctx: &Arc<CommandContext>,
    ) -> promobot_core::Result<Option<PromoGroup>> {
        let Some(group_id) = ctx.current_group_id().await else {
            return Ok(None);
        };
        Ok(self
            .groups
            .find_by_id_for_admin(ctx.user().id, group_id)
            .await?)
    }

    /// Recovery when the selected group vanished underneath a sub-flow: clear
    /// the selection and fall back to the listing.
    async fn lost_selection(&self, ctx: &Arc<CommandContext>) -> promobot_core::Result<()> {
        warn!(
            user_id = ctx.user().id,
            "step: selected group no longer available"
        );
        ctx.set_current_group(None).await?;
        ctx.run_command("mygroups").await
    }

    /// Direct re-entry point: stores the selection, renders the manage view
    /// and parks the user in MANAGE_GROUP.
    async fn open_group(
        &self,
        ctx: &Arc<CommandContext>,
        group: &PromoGroup,
    ) -> promobot_core::Result<()> {
        let toggle = if group.active { "Disable" } else { "Enable" };
        let keyboard = Keyboard::build(["Edit Name", "Add Participant", toggle, "Delete"])
            .footer_row(["Back to list"]);

        ctx.set_current_group(Some(group.id)).await?;
        ctx.set_scratch(&group.name).await?;
        ctx.reply_with(Reply::text(format!("Manage \"{}\":", group.name)).keyboard(keyboard))
            .await?;
        ctx.set_menu(MANAGE_GROUP).await
    }

    /// Free text in MANAGE_GROUPS: resolve the named group and open it.
    /// Reserved words pass through silently; they belong to other handlers.
    async fn manage_group(self: Arc<Self>, ctx: Arc<CommandContext>) -> promobot_core::Result<()> {
        let Some(name) = ctx.text().map(str::to_string) else {
            return Ok(());
        };
        if is_reserved(&name) || ctx.event().command().is_some() {
            return Ok(());
        }

        let Some(group) = self.groups.find_for_admin(ctx.user().id, &name).await? else {
            ctx.reply(&format!("You don't have a group named \"{}\"", name))
                .await?;
            return Ok(());
        };

        self.open_group(&ctx, &group).await
    }

    async fn edit_name_prompt(
        self: Arc<Self>,
        ctx: Arc<CommandContext>,
    ) -> promobot_core::Result<()> {
        let Some(group) = self.current_group(&ctx).await? else {
            return self.lost_selection(&ctx).await;
        };

        ctx.reply_with(
            Reply::text(format!(
                "Send me the new name for the group \"{}\"",
                group.name
            ))
            .keyboard(Keyboard::build(["Cancel"])),
        )
        .await?;
        ctx.set_menu(EDIT_NAME).await
    }

    async fn edit_name_cancel(
        self: Arc<Self>,
        ctx: Arc<CommandContext>,
    ) -> promobot_core::Result<()> {
        let Some(group) = self.current_group(&ctx).await? else {
            return self.lost_selection(&ctx).await;
        };
        self.open_group(&ctx, &group).await
    }

    async fn edit_name(self: Arc<Self>, ctx: Arc<CommandContext>) -> promobot_core::Result<()> {
        let Some(name) = ctx.text().map(str::to_string) else {
            return Ok(());
        };
        // Cancel words and slash commands belong to handlers in other groups.
        if is_cancel_word(&name) || ctx.event().command().is_some() {
            return Ok(());
        }
        let Some(group) = self.current_group(&ctx).await? else {
            return self.lost_selection(&ctx).await;
        };

        if is_reserved(&name) {
            ctx.reply(&format!("You can't name your group \"{}\"", name))
                .await?;
            return Ok(());
        }
        if name == group.name {
            ctx.reply("The name is the same as before").await?;
            return Ok(());
        }
        if self.groups.find_for_admin(ctx.user().id, &name).await?.is_some() {
            ctx.reply("A group with that name already exists").await?;
            return Ok(());
        }

        self.groups.rename(group.id, &name).await?;
        ctx.reply(&format!(
            "Name changed from \"{}\" to \"{}\"",
            group.name, name
        ))
        .await?;

        self.open_group(&ctx, &PromoGroup { name, ..group }).await
    }

    async fn toggle_active(self: Arc<Self>, ctx: Arc<CommandContext>) -> promobot_core::Result<()> {
        let Some(group) = self.current_group(&ctx).await? else {
            return self.lost_selection(&ctx).await;
        };

        let active = !group.active;
        self.groups.set_active(group.id, active).await?;
        ctx.reply(&format!(
            "Group \"{}\" was {}",
            group.name,
            if active { "Enabled" } else { "Disabled" }
        ))
        .await?;

        self.open_group(&ctx, &PromoGroup { active, ..group }).await
    }

    async fn delete_prompt(self: Arc<Self>, ctx: Arc<CommandContext>) -> promobot_core::Result<()> {
        ctx.reply_with(Reply::text("Are you sure?").keyboard(Keyboard::build(["Yes", "No"])))
            .await?;
        ctx.set_menu(DELETE_CONFIRM).await
    }

    async fn delete_yes(self: Arc<Self>, ctx: Arc<CommandContext>) -> promobot_core::Result<()> {
        let Some(group) = self.current_group(&ctx).await? else {
            return self.lost_selection(&ctx).await;
        };

        let name = ctx.scratch().await;
        self.groups.delete(group.id).await?;
        ctx.set_current_group(None).await?;
        ctx.reply(&format!("Group \"{}\" has been deleted.", name))
            .await?;
        ctx.run_command("mygroups").await
    }

    async fn delete_no(self: Arc<Self>, ctx: Arc<CommandContext>) -> promobot_core::Result<()> {
        ctx.reply("Cancelled").await?;
        let Some(group) = self.current_group(&ctx).await? else {
            return self.lost_selection(&ctx).await;
        };
        self.open_group(&ctx, &group).await
    }

    async fn add_participant_prompt(
        self: Arc<Self>,
        ctx: Arc<CommandContext>,
    ) -> promobot_core::Result<()> {
        let Some(group) = self.current_group(&ctx).await? else {
            return self.lost_selection(&ctx).await;
        };

        ctx.reply_with(
            Reply::text(format!(
                "Forward me a message from the channel you want to add to \"{}\"",
                group.name
            ))
            .keyboard(Keyboard::build(["Cancel"])),
        )
        .await?;
        ctx.set_menu(ADD_PARTICIPANT_WAIT).await
    }

    async fn add_participant_cancel(
        self: Arc<Self>,
        ctx: Arc<CommandContext>,
    ) -> promobot_core::Result<()> {
        let Some(group) = self.current_group(&ctx).await? else {
            return self.lost_selection(&ctx).await;
        };
        self.open_group(&ctx, &group).await
    }

    /// A forwarded channel post: record the channel, add it to the current
    /// group, report duplicates without duplicating.
    async fn add_participant(
        self: Arc<Self>,
        ctx: Arc<CommandContext>,
    ) -> promobot_core::Result<()> {
        let Some(channel) = ctx.event().forwarded_from.clone() else {
            return Ok(());
        };
        let Some(group) = self.current_group(&ctx).await? else {
            return self.lost_selection(&ctx).await;
        };

        let stored = self.channels.upsert(&channel).await?;
        let label = stored
            .title
            .or(stored.username)
            .unwrap_or_else(|| stored.id.to_string());

        match self.participants.add(stored.id, group.id).await {
            Ok(_) => {
                ctx.reply(&format!("Added \"{}\" to \"{}\"", label, group.name))
                    .await?;
            }
            Err(StorageError::AlreadyExists(_)) => {
                ctx.reply(&format!(
                    "\"{}\" is already a participant of \"{}\"",
                    label, group.name
                ))
                .await?;
            }
            Err(err) => return Err(err.into()),
        }

        self.open_group(&ctx, &group).await
    }

    /// Anything else in ADD_PARTICIPANT_WAIT. Reserved words and commands are
    /// other handlers' business and pass through silently.
    async fn add_participant_invalid(
        self: Arc<Self>,
        ctx: Arc<CommandContext>,
    ) -> promobot_core::Result<()> {
        if let Some(text) = ctx.text() {
            if is_reserved(text) || ctx.event().command().is_some() {
                return Ok(());
            }
        }
        ctx.reply(
            "That doesn't look like a channel post. Forward me a message straight from the channel, or press Cancel.",
        )
        .await
    }
}

impl Plugin for GroupEditor {
    fn name(&self) -> &'static str {
        "editor"
    }

    fn setup(self: Arc<Self>, handle: &mut PluginHandle<'_>) {
        handle.declare_menu(MANAGE_GROUP);
        handle.declare_menu(EDIT_NAME);
        handle.declare_menu(DELETE_CONFIRM);
        handle.declare_menu(ADD_PARTICIPANT_WAIT);

        handle.register(HandlerDef::new(
            "manage_group",
            menu(MANAGE_GROUPS),
            bind(&self, GroupEditor::manage_group),
        ));
        handle.register(HandlerDef::new(
            "edit_name_prompt",
            text_is(["Edit Name"]) & menu(MANAGE_GROUP),
            bind(&self, GroupEditor::edit_name_prompt),
        ));
        handle.register(HandlerDef::new(
            "add_participant_prompt",
            text_is(["Add Participant"]) & menu(MANAGE_GROUP),
            bind(&self, GroupEditor::add_participant_prompt),
        ));
        handle.register(HandlerDef::new(
            "toggle_active",
            text_is(["Enable", "Disable"]) & menu(MANAGE_GROUP),
            bind(&self, GroupEditor::toggle_active),
        ));
        handle.register(HandlerDef::new(
            "delete_prompt",
            text_is(["Delete"]) & menu(MANAGE_GROUP),
            bind(&self, GroupEditor::delete_prompt),
        ));
        // The cancel branch must come before the free-text branch.
        handle.register(HandlerDef::new(
            "edit_name_cancel",
            text_is(["Cancel"]) & menu(EDIT_NAME),
            bind(&self, GroupEditor::edit_name_cancel),
        ));
        handle.register(HandlerDef::new(
            "edit_name",
            menu(EDIT_NAME),
            bind(&self, GroupEditor::edit_name),
        ));
        handle.register(HandlerDef::new(
            "delete_yes",
            text_is(["Yes"]) & menu(DELETE_CONFIRM),
            bind(&self, GroupEditor::delete_yes),
        ));
        handle.register(HandlerDef::new(
            "delete_no",
            text_is(["No"]) & menu(DELETE_CONFIRM),
            bind(&self, GroupEditor::delete_no),
        ));
        handle.register(HandlerDef::new(
            "add_participant_cancel",
            text_is(["Cancel"]) & menu(ADD_PARTICIPANT_WAIT),
            bind(&self, GroupEditor::add_participant_cancel),
        ));
        handle.register(HandlerDef::new(
            "add_participant",
            forwarded_from_channel() & menu(ADD_PARTICIPANT_WAIT),
            bind(&self, GroupEditor::add_participant),
        ));
        handle.register(HandlerDef::new(
            "add_participant_invalid",
            menu(ADD_PARTICIPANT_WAIT),
            bind(&self, GroupEditor::add_participant_invalid),
        ));
    }
}
