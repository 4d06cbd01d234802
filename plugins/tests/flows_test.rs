//! End-to-end conversation flow tests for the built-in plugin set.
//!
//! Every test drives the real dispatcher with the full plugin stack (builtins,
//! manager, editor) over in-memory SQLite, and asserts on the replies that
//! were sent plus the state left behind in storage.

mod common;

use common::{callback_event, channel_post, forwarded_event, media_event, test_channel, TestBot};
use dispatch::{DispatchOutcome, MAIN};
use plugins::editor::{ADD_PARTICIPANT_WAIT, DELETE_CONFIRM, EDIT_NAME, MANAGE_GROUP};
use plugins::manager::{MANAGE_GROUPS, NEW_GROUP_NAME_PROMPT};
use plugins::texts::{HELP_HTML, WELCOME_HTML};
use storage::PromoGroup;

const ADMIN: i64 = 7;

/// A bot where ADMIN has created one group and sits in the listing.
async fn bot_with_group(name: &str) -> TestBot {
    let bot = TestBot::new().await;
    bot.say(ADMIN, "/new").await;
    bot.say(ADMIN, name).await;
    bot.transport.clear();
    bot
}

/// A bot where ADMIN has opened the manage view for the named group.
async fn bot_managing_group(name: &str) -> TestBot {
    let bot = bot_with_group(name).await;
    bot.say(ADMIN, name).await;
    bot.transport.clear();
    bot
}

async fn group_of(bot: &TestBot, name: &str) -> PromoGroup {
    bot.groups
        .find_for_admin(ADMIN, name)
        .await
        .expect("Failed to query group")
        .expect("Group not found")
}

/// **Test: /start greets a new user and parks them in MAIN.**
///
/// **Expected:** HTML welcome, then the start keyboard with the Help header
/// row and the manager's two buttons; menu is MAIN.
#[tokio::test]
async fn test_start_shows_welcome_and_start_keyboard() {
    let bot = TestBot::new().await;

    bot.say(ADMIN, "/start").await;

    let replies = bot.transport.replies();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0].text, WELCOME_HTML);
    assert!(replies[0].html);
    assert_eq!(replies[1].text, "What do you want to do?");
    assert_eq!(
        bot.transport.last_keyboard(),
        Some(vec![
            vec!["Help".to_string()],
            vec!["New Group".to_string(), "My Groups".to_string()],
        ])
    );
    assert_eq!(bot.menu(ADMIN).await, MAIN.as_str());
}

/// **Test: /help and the Help button send the same HTML help text.**
#[tokio::test]
async fn test_help_command_and_button() {
    let bot = TestBot::new().await;

    bot.say(ADMIN, "/help").await;
    bot.say(ADMIN, "Help").await;

    let replies = bot.transport.replies();
    assert_eq!(replies.len(), 2);
    assert!(replies.iter().all(|r| r.text == HELP_HTML && r.html));
}

/// **Test: /new prompts for a name and advances the menu.**
#[tokio::test]
async fn test_new_group_prompts_for_name() {
    let bot = TestBot::new().await;

    bot.say(ADMIN, "/new").await;

    assert_eq!(
        bot.transport.texts(),
        vec!["What is the name of the Promotion Group?"]
    );
    assert_eq!(bot.menu(ADMIN).await, NEW_GROUP_NAME_PROMPT.as_str());
}

/// **Test: naming the group creates it and falls through to the listing.**
///
/// **Setup:** A fresh user runs /new.
/// **Action:** Send "Promo A".
/// **Expected:** The group exists with the sender as its sole admin and
/// inactive by default, the confirmation and the listing are sent, and the
/// user ends up choosing from MANAGE_GROUPS.
#[tokio::test]
async fn test_create_group_and_list() {
    let bot = TestBot::new().await;
    bot.say(ADMIN, "/new").await;
    bot.transport.clear();

    bot.say(ADMIN, "Promo A").await;

    assert_eq!(
        bot.transport.texts(),
        vec![
            "Okay got it. I have created a new Promotion Group.",
            "Promotion Groups:",
        ]
    );
    assert_eq!(
        bot.transport.last_keyboard(),
        Some(vec![vec!["Promo A".to_string()]])
    );
    assert_eq!(bot.menu(ADMIN).await, MANAGE_GROUPS.as_str());

    let group = group_of(&bot, "Promo A").await;
    assert!(!group.active);

    let mine = bot
        .groups
        .list_for_admin(ADMIN)
        .await
        .expect("Failed to list groups");
    assert_eq!(mine.len(), 1);
    let theirs = bot
        .groups
        .list_for_admin(ADMIN + 1)
        .await
        .expect("Failed to list groups");
    assert!(theirs.is_empty());
}

/// **Test: a reserved word is refused as a group name.**
///
/// **Expected:** Explicit error reply, the prompt state stays, nothing is
/// created.
#[tokio::test]
async fn test_reserved_word_rejected_as_group_name() {
    let bot = TestBot::new().await;
    bot.say(ADMIN, "/new").await;
    bot.transport.clear();

    bot.say(ADMIN, "Delete").await;

    assert_eq!(
        bot.transport.texts(),
        vec!["You can't name your group \"Delete\""]
    );
    assert_eq!(bot.menu(ADMIN).await, NEW_GROUP_NAME_PROMPT.as_str());
    assert!(bot
        .groups
        .list_for_admin(ADMIN)
        .await
        .expect("Failed to list groups")
        .is_empty());
}

/// **Test: a cancel word inside the name prompt aborts to home.**
///
/// **Expected:** The start action claims the word; no group is created, no
/// name rejection is sent, the menu resets to MAIN.
#[tokio::test]
async fn test_cancel_word_in_name_prompt_goes_home() {
    let bot = TestBot::new().await;
    bot.say(ADMIN, "/new").await;
    bot.transport.clear();

    bot.say(ADMIN, "cancel").await;

    assert_eq!(
        bot.transport.texts(),
        vec!["Current action was cancelled", "What do you want to do?"]
    );
    assert_eq!(bot.menu(ADMIN).await, MAIN.as_str());
    assert!(bot
        .groups
        .list_for_admin(ADMIN)
        .await
        .expect("Failed to list groups")
        .is_empty());
}

/// **Test: the home callback resets the menu without the cancel notice.**
#[tokio::test]
async fn test_home_callback_resets_menu() {
    let bot = TestBot::new().await;
    bot.say(ADMIN, "/new").await;
    bot.transport.clear();

    bot.send(callback_event(ADMIN, "home")).await;

    assert_eq!(bot.transport.texts(), vec!["What do you want to do?"]);
    assert_eq!(bot.menu(ADMIN).await, MAIN.as_str());
}

/// **Test: a duplicate group name for the same admin is refused.**
#[tokio::test]
async fn test_duplicate_group_name_rejected() {
    let bot = bot_with_group("Promo A").await;
    bot.say(ADMIN, "/new").await;
    bot.transport.clear();

    bot.say(ADMIN, "Promo A").await;

    assert_eq!(
        bot.transport.texts(),
        vec!["A group with the name \"Promo A\" does already exist"]
    );
    assert_eq!(bot.menu(ADMIN).await, NEW_GROUP_NAME_PROMPT.as_str());
    assert_eq!(
        bot.groups
            .list_for_admin(ADMIN)
            .await
            .expect("Failed to list groups")
            .len(),
        1
    );
}

/// **Test: media sent where a name is expected is explained, state kept.**
#[tokio::test]
async fn test_media_in_name_prompt_rejected() {
    let bot = TestBot::new().await;
    bot.say(ADMIN, "/new").await;
    bot.transport.clear();

    bot.send(media_event(ADMIN)).await;

    assert_eq!(
        bot.transport.texts(),
        vec!["The name has to be plain text. What should the group be called?"]
    );
    assert_eq!(bot.menu(ADMIN).await, NEW_GROUP_NAME_PROMPT.as_str());
}

/// **Test: picking a group from the listing opens the manage view.**
///
/// **Expected:** Selection and name are remembered, the manage keyboard shows
/// Enable for an inactive group, menu is MANAGE_GROUP.
#[tokio::test]
async fn test_select_group_opens_manage_view() {
    let bot = bot_with_group("Crypto News").await;

    bot.say(ADMIN, "Crypto News").await;

    assert_eq!(bot.transport.texts(), vec!["Manage \"Crypto News\":"]);
    assert_eq!(
        bot.transport.last_keyboard(),
        Some(vec![
            vec!["Edit Name".to_string(), "Add Participant".to_string()],
            vec!["Enable".to_string(), "Delete".to_string()],
            vec!["Back to list".to_string()],
        ])
    );
    assert_eq!(bot.menu(ADMIN).await, MANAGE_GROUP.as_str());

    let group = group_of(&bot, "Crypto News").await;
    let record = bot.record(ADMIN).await;
    assert_eq!(record.current_group_id, Some(group.id));
    assert_eq!(record.scratch, "Crypto News");
}

/// **Test: an unknown name in the listing gets a short reply, state kept.**
#[tokio::test]
async fn test_unknown_group_name_in_listing() {
    let bot = bot_with_group("Crypto News").await;

    bot.say(ADMIN, "Ghost").await;

    assert_eq!(
        bot.transport.texts(),
        vec!["You don't have a group named \"Ghost\""]
    );
    assert_eq!(bot.menu(ADMIN).await, MANAGE_GROUPS.as_str());
}

/// **Test: renaming a group through the edit-name flow.**
///
/// **Expected:** Prompt with a Cancel keyboard, then the rename persists, the
/// manage view re-opens under the new name and scratch follows.
#[tokio::test]
async fn test_edit_name_renames_group() {
    let bot = bot_managing_group("Crypto News").await;

    bot.say(ADMIN, "Edit Name").await;
    assert_eq!(
        bot.transport.texts(),
        vec!["Send me the new name for the group \"Crypto News\""]
    );
    assert_eq!(
        bot.transport.last_keyboard(),
        Some(vec![vec!["Cancel".to_string()]])
    );
    assert_eq!(bot.menu(ADMIN).await, EDIT_NAME.as_str());
    bot.transport.clear();

    bot.say(ADMIN, "Crypto Daily").await;

    assert_eq!(
        bot.transport.texts(),
        vec![
            "Name changed from \"Crypto News\" to \"Crypto Daily\"",
            "Manage \"Crypto Daily\":",
        ]
    );
    assert_eq!(bot.menu(ADMIN).await, MANAGE_GROUP.as_str());
    let record = bot.record(ADMIN).await;
    assert_eq!(record.scratch, "Crypto Daily");
    assert!(group_of(&bot, "Crypto Daily").await.id > 0);
    assert!(bot
        .groups
        .find_for_admin(ADMIN, "Crypto News")
        .await
        .expect("Failed to query group")
        .is_none());
}

/// **Test: Cancel inside EDIT_NAME returns to the manage view, no rename.**
///
/// The start action also claims "Cancel" and fires first; the editor's cancel
/// branch runs afterwards and wins the final menu.
#[tokio::test]
async fn test_edit_name_cancel_keeps_name() {
    let bot = bot_managing_group("Crypto News").await;
    bot.say(ADMIN, "Edit Name").await;
    bot.transport.clear();

    bot.say(ADMIN, "Cancel").await;

    let texts = bot.transport.texts();
    assert!(texts.contains(&"Current action was cancelled".to_string()));
    assert_eq!(
        bot.transport.last_reply().text,
        "Manage \"Crypto News\":"
    );
    assert_eq!(bot.menu(ADMIN).await, MANAGE_GROUP.as_str());
    assert!(group_of(&bot, "Crypto News").await.id > 0);
}

/// **Test: an unchanged name in EDIT_NAME is refused, state kept.**
#[tokio::test]
async fn test_edit_name_same_name_rejected() {
    let bot = bot_managing_group("Crypto News").await;
    bot.say(ADMIN, "Edit Name").await;
    bot.transport.clear();

    bot.say(ADMIN, "Crypto News").await;

    assert_eq!(bot.transport.texts(), vec!["The name is the same as before"]);
    assert_eq!(bot.menu(ADMIN).await, EDIT_NAME.as_str());
}

/// **Test: renaming onto another of the admin's groups is refused.**
#[tokio::test]
async fn test_edit_name_duplicate_rejected() {
    let bot = bot_with_group("Promo A").await;
    bot.say(ADMIN, "/new").await;
    bot.say(ADMIN, "Promo B").await;
    bot.say(ADMIN, "Promo A").await;
    bot.say(ADMIN, "Edit Name").await;
    bot.transport.clear();

    bot.say(ADMIN, "Promo B").await;

    assert_eq!(
        bot.transport.texts(),
        vec!["A group with that name already exists"]
    );
    assert_eq!(bot.menu(ADMIN).await, EDIT_NAME.as_str());
    assert!(group_of(&bot, "Promo A").await.id > 0);
}

/// **Test: toggling the active flag twice restores the original value.**
#[tokio::test]
async fn test_toggle_active_twice_restores() {
    let bot = bot_managing_group("Crypto News").await;

    bot.say(ADMIN, "Enable").await;
    assert!(group_of(&bot, "Crypto News").await.active);
    assert_eq!(
        bot.transport.texts(),
        vec!["Group \"Crypto News\" was Enabled", "Manage \"Crypto News\":"]
    );
    // The manage keyboard now offers the opposite toggle.
    let rows = bot.transport.last_keyboard().expect("No keyboard sent");
    assert_eq!(rows[1], vec!["Disable".to_string(), "Delete".to_string()]);
    bot.transport.clear();

    bot.say(ADMIN, "Disable").await;
    assert!(!group_of(&bot, "Crypto News").await.active);
    assert_eq!(bot.menu(ADMIN).await, MANAGE_GROUP.as_str());
}

/// **Test: deleting a group after confirming.**
///
/// **Expected:** Yes/No confirmation first; on Yes the group row is gone, the
/// selection is cleared and the user is handed back to the (now empty)
/// listing.
#[tokio::test]
async fn test_delete_group_confirmed() {
    let bot = bot_managing_group("Crypto News").await;

    bot.say(ADMIN, "Delete").await;
    assert_eq!(bot.transport.texts(), vec!["Are you sure?"]);
    assert_eq!(
        bot.transport.last_keyboard(),
        Some(vec![vec!["Yes".to_string(), "No".to_string()]])
    );
    assert_eq!(bot.menu(ADMIN).await, DELETE_CONFIRM.as_str());
    bot.transport.clear();

    bot.say(ADMIN, "Yes").await;

    assert_eq!(
        bot.transport.texts(),
        vec![
            "Group \"Crypto News\" has been deleted.",
            "Promotion Groups:",
        ]
    );
    assert_eq!(bot.menu(ADMIN).await, MANAGE_GROUPS.as_str());
    assert_eq!(bot.record(ADMIN).await.current_group_id, None);
    assert!(bot
        .groups
        .list_for_admin(ADMIN)
        .await
        .expect("Failed to list groups")
        .is_empty());
}

/// **Test: declining the delete confirmation keeps the group.**
#[tokio::test]
async fn test_delete_group_declined() {
    let bot = bot_managing_group("Crypto News").await;
    bot.say(ADMIN, "Delete").await;
    bot.transport.clear();

    bot.say(ADMIN, "No").await;

    assert_eq!(
        bot.transport.texts(),
        vec!["Cancelled", "Manage \"Crypto News\":"]
    );
    assert_eq!(bot.menu(ADMIN).await, MANAGE_GROUP.as_str());
    assert!(group_of(&bot, "Crypto News").await.id > 0);
}

/// **Test: adding a channel participant by forwarding a post.**
///
/// **Setup:** Manage view open, Add Participant pressed.
/// **Action:** Forward a message from a channel; then do it all again.
/// **Expected:** First pass records the channel and the participation and
/// returns to the manage view; the second pass reports the duplicate without
/// adding another row.
#[tokio::test]
async fn test_add_participant_by_forward() {
    let bot = bot_managing_group("Crypto News").await;
    let group = group_of(&bot, "Crypto News").await;

    bot.say(ADMIN, "Add Participant").await;
    assert_eq!(
        bot.transport.texts(),
        vec!["Forward me a message from the channel you want to add to \"Crypto News\""]
    );
    assert_eq!(bot.menu(ADMIN).await, ADD_PARTICIPANT_WAIT.as_str());
    bot.transport.clear();

    bot.send(forwarded_event(ADMIN, test_channel(-1001, "Crypto Channel")))
        .await;

    assert_eq!(
        bot.transport.texts(),
        vec![
            "Added \"Crypto Channel\" to \"Crypto News\"",
            "Manage \"Crypto News\":",
        ]
    );
    assert_eq!(bot.menu(ADMIN).await, MANAGE_GROUP.as_str());
    let listed = bot
        .participants
        .list_for_group(group.id)
        .await
        .expect("Failed to list participants");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].channel_id, -1001);
    assert!(listed[0].active);
    assert!(bot
        .channels
        .find(-1001)
        .await
        .expect("Failed to query channel")
        .is_some());
    bot.transport.clear();

    bot.say(ADMIN, "Add Participant").await;
    bot.send(forwarded_event(ADMIN, test_channel(-1001, "Crypto Channel")))
        .await;

    let texts = bot.transport.texts();
    assert!(texts
        .contains(&"\"Crypto Channel\" is already a participant of \"Crypto News\"".to_string()));
    let listed = bot
        .participants
        .list_for_group(group.id)
        .await
        .expect("Failed to list participants");
    assert_eq!(listed.len(), 1);
}

/// **Test: non-forwarded input while waiting for a channel is explained.**
#[tokio::test]
async fn test_add_participant_invalid_input() {
    let bot = bot_managing_group("Crypto News").await;
    bot.say(ADMIN, "Add Participant").await;
    bot.transport.clear();

    bot.say(ADMIN, "hello there").await;

    assert_eq!(
        bot.transport.texts(),
        vec![
            "That doesn't look like a channel post. Forward me a message straight from the channel, or press Cancel."
        ]
    );
    assert_eq!(bot.menu(ADMIN).await, ADD_PARTICIPANT_WAIT.as_str());
    let group = group_of(&bot, "Crypto News").await;
    assert!(bot
        .participants
        .list_for_group(group.id)
        .await
        .expect("Failed to list participants")
        .is_empty());
}

/// **Test: Cancel while waiting for a channel returns to the manage view.**
#[tokio::test]
async fn test_add_participant_cancelled() {
    let bot = bot_managing_group("Crypto News").await;
    bot.say(ADMIN, "Add Participant").await;
    bot.transport.clear();

    bot.say(ADMIN, "Cancel").await;

    assert_eq!(
        bot.transport.last_reply().text,
        "Manage \"Crypto News\":"
    );
    assert_eq!(bot.menu(ADMIN).await, MANAGE_GROUP.as_str());
}

/// **Test: Back to list leaves the manage view for the listing.**
#[tokio::test]
async fn test_back_to_list_returns_to_listing() {
    let bot = bot_managing_group("Crypto News").await;

    bot.say(ADMIN, "Back to list").await;

    assert_eq!(bot.transport.texts(), vec!["Promotion Groups:"]);
    assert_eq!(
        bot.transport.last_keyboard(),
        Some(vec![vec!["Crypto News".to_string()]])
    );
    assert_eq!(bot.menu(ADMIN).await, MANAGE_GROUPS.as_str());
    assert_eq!(bot.record(ADMIN).await.scratch, "");
}

/// **Test: pressing a start button inside the name prompt keeps both
/// meanings.**
///
/// The Help button still helps, and the button vocabulary is refused as a
/// group name; the prompt state stays.
#[tokio::test]
async fn test_help_button_inside_name_prompt() {
    let bot = TestBot::new().await;
    bot.say(ADMIN, "/new").await;
    bot.transport.clear();

    bot.say(ADMIN, "Help").await;

    assert_eq!(
        bot.transport.texts(),
        vec![HELP_HTML, "You can't name your group \"Help\""]
    );
    assert_eq!(bot.menu(ADMIN).await, NEW_GROUP_NAME_PROMPT.as_str());
    assert!(bot
        .groups
        .list_for_admin(ADMIN)
        .await
        .expect("Failed to list groups")
        .is_empty());
}

/// **Test: channel posts never reach the private-chat flows.**
#[tokio::test]
async fn test_channel_post_is_dropped() {
    let bot = TestBot::new().await;

    let outcome = bot
        .dispatcher
        .dispatch(channel_post(-500, "cancel"))
        .await
        .expect("Failed to dispatch event");

    assert_eq!(outcome, DispatchOutcome::NoMatch);
    assert!(bot.transport.texts().is_empty());
}
