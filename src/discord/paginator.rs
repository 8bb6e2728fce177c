// Discord side of the paginator: renders the session and feeds it button presses.
//
// One collector per session, filtered on the paginator's own message. The
// collector timeout is recomputed each round from the session, so presses by
// other users do not keep the session alive.

use crate::core::dispatch::{
    Clock, Error, Interaction, NOT_OWNER, NavAction, NavigationResult, PAGE_COUNT,
    PaginationSession, Reply, SystemClock,
};
use crate::discord::embeds::reply_embed;
use crate::discord::interaction::DiscordInteraction;
use poise::serenity_prelude as serenity;
use std::time::Duration;

fn control_row(session: &PaginationSession<serenity::CreateEmbed>) -> Vec<serenity::CreateActionRow> {
    let Some(controls) = session.controls() else {
        return vec![];
    };

    let button = |action: NavAction, label: &str, disabled: bool| {
        serenity::CreateButton::new(action.control_id())
            .label(label)
            .style(serenity::ButtonStyle::Primary)
            .disabled(disabled)
    };

    vec![serenity::CreateActionRow::Buttons(vec![
        button(NavAction::First, "⏮", controls.first_disabled),
        button(NavAction::Prev, "◀", controls.prev_disabled),
        serenity::CreateButton::new(PAGE_COUNT)
            .label(controls.label)
            .style(serenity::ButtonStyle::Secondary)
            .disabled(true),
        button(NavAction::Next, "▶", controls.next_disabled),
        button(NavAction::Last, "⏭", controls.last_disabled),
    ])]
}

/// Show `pages` to the invoker until the session goes idle.
///
/// Uses the initial response if it is still free, otherwise a follow-up.
pub async fn run_paginator(
    interaction: &DiscordInteraction,
    pages: Vec<serenity::CreateEmbed>,
    idle_timeout: Duration,
) -> Result<(), Error> {
    let clock = SystemClock;
    let ctx = interaction.serenity_context();
    let command = interaction.command();

    let mut session =
        PaginationSession::new(pages, interaction.actor_id(), idle_timeout, clock.now_millis())?;

    let as_follow_up = interaction.has_responded();
    let message_id = if as_follow_up {
        let followup = serenity::CreateInteractionResponseFollowup::new()
            .embed(session.current_page().clone())
            .components(control_row(&session));
        command.create_followup(ctx, followup).await?.id
    } else {
        interaction.claim_response()?;
        let message = serenity::CreateInteractionResponseMessage::new()
            .embed(session.current_page().clone())
            .components(control_row(&session));
        command
            .create_response(ctx, serenity::CreateInteractionResponse::Message(message))
            .await?;
        command.get_response(ctx).await?.id
    };

    loop {
        let remaining = session.remaining_idle(clock.now_millis());
        if remaining.is_zero() {
            break;
        }

        let Some(press) = serenity::ComponentInteractionCollector::new(ctx)
            .message_id(message_id)
            .timeout(remaining)
            .await
        else {
            break;
        };

        let Some(action) = NavAction::from_control_id(&press.data.custom_id) else {
            continue;
        };

        match session.navigate(press.user.id.get(), action, clock.now_millis()) {
            NavigationResult::NotOwner => {
                let denial = serenity::CreateInteractionResponseMessage::new()
                    .embed(reply_embed(&Reply::deny(NOT_OWNER), press.user.id.get()))
                    .ephemeral(true);
                if let Err(e) = press
                    .create_response(ctx, serenity::CreateInteractionResponse::Message(denial))
                    .await
                {
                    tracing::warn!("Failed to reject paginator press: {}", e);
                }
            }
            NavigationResult::Destroyed => break,
            NavigationResult::Moved { .. } | NavigationResult::Unchanged { .. } => {
                let update = serenity::CreateInteractionResponseMessage::new()
                    .embed(session.current_page().clone())
                    .components(control_row(&session));
                if let Err(e) = press
                    .create_response(ctx, serenity::CreateInteractionResponse::UpdateMessage(update))
                    .await
                {
                    tracing::warn!("Failed to update paginator page: {}", e);
                }
            }
        }
    }

    session.destroy();
    tracing::debug!(
        actor_id = session.owner_id(),
        page = session.current_index(),
        "Paginator expired"
    );

    // Leave the last viewed page up, without buttons
    let page = session.current_page().clone();
    let cleared = if as_follow_up {
        command
            .edit_followup(
                ctx,
                message_id,
                serenity::CreateInteractionResponseFollowup::new()
                    .embed(page)
                    .components(vec![]),
            )
            .await
            .map(|_| ())
    } else {
        command
            .edit_response(
                ctx,
                serenity::EditInteractionResponse::new()
                    .embed(page)
                    .components(vec![]),
            )
            .await
            .map(|_| ())
    };
    if let Err(e) = cleared {
        tracing::warn!("Failed to remove paginator controls: {}", e);
    }

    Ok(())
}
