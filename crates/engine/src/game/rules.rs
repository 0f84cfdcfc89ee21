//! Rule tree operations and the rules channel mirror.

use std::collections::BTreeSet;

use nomic_domain::{DomainError, MessageId, Rule, RuleTag};

use super::{render, GameGuard};
use crate::error::GameError;
use crate::infrastructure::ports::MessagingError;

impl GameGuard {
    /// Add a rule as the last child of `parent`.
    pub async fn add_rule(
        &mut self,
        parent: &str,
        tag: &str,
        title: Option<String>,
        content: Option<String>,
    ) -> Result<Rule, GameError> {
        self.game.assert_locked()?;
        let rule = self.state.rules.add(parent, tag, title, content)?.clone();
        self.save().await?;
        tracing::info!(
            guild_id = %self.game.guild_id,
            rule = %rule.tag(),
            parent = %parent,
            "Added rule"
        );
        Ok(rule)
    }

    /// Remove a rule with its whole subtree. Their messages are deleted when
    /// a rules channel is bound.
    pub async fn remove_rule(&mut self, tag: &str) -> Result<Vec<Rule>, GameError> {
        self.game.assert_locked()?;
        let removed = self.state.rules.remove(tag)?;
        self.save().await?;
        tracing::info!(
            guild_id = %self.game.guild_id,
            rule = %tag,
            count = removed.len(),
            "Removed rule"
        );

        if let Some(channel) = self.state.channels.rules {
            for id in removed.iter().filter_map(Rule::message) {
                match self.messaging().delete(channel, &[id]).await {
                    Ok(()) | Err(MessagingError::NotFound) => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Ok(removed)
    }

    /// Replace a rule's title and content, then update its message if it
    /// has one.
    pub async fn set_rule_content(
        &mut self,
        tag: &str,
        title: Option<String>,
        content: Option<String>,
    ) -> Result<(), GameError> {
        self.game.assert_locked()?;
        self.state.rules.check(&[tag])?;
        let rule = self
            .state
            .rules
            .get_mut(tag)
            .ok_or_else(|| DomainError::not_found("rule", tag))?;
        rule.title = title;
        rule.content = content;
        let posted = rule.message().is_some();
        self.save().await?;
        tracing::info!(guild_id = %self.game.guild_id, rule = %tag, "Updated rule");

        if posted && self.state.channels.rules.is_some() {
            self.refresh_rule(&[tag]).await?;
        }
        Ok(())
    }

    /// Re-render the messages of the given rules. All tags are validated
    /// first. A rule whose message is gone reports `NotFound`.
    pub async fn refresh_rule(&mut self, tags: &[&str]) -> Result<(), GameError> {
        self.game.assert_locked()?;
        let channel = self.rules_channel()?;
        self.state.rules.check(tags)?;

        for tag in tags.iter().copied().collect::<BTreeSet<_>>() {
            let Some(rule) = self.state.rules.get(tag) else {
                continue;
            };
            let id = rule.message().ok_or(MessagingError::NotFound)?;
            let content = render::rule(rule);
            self.messaging().edit(channel, id, &content).await?;
        }
        Ok(())
    }

    /// Delete every rule message and post all non-root rules again in
    /// preorder. Returns how many rules were posted.
    pub async fn repost_rules(&mut self) -> Result<usize, GameError> {
        self.game.assert_locked()?;
        let channel = self.rules_channel()?;

        let existing: Vec<MessageId> = self.state.rules.iter().filter_map(Rule::message).collect();
        for id in existing {
            match self.messaging().delete(channel, &[id]).await {
                Ok(()) | Err(MessagingError::NotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }

        let order: Vec<RuleTag> = self.state.rules.preorder();
        for tag in &order {
            if let Some(rule) = self.state.rules.get_mut(tag.as_str()) {
                rule.set_message(None);
            }
        }

        let mut posted = 0;
        for tag in order.iter().filter(|tag| !tag.is_root()) {
            let Some(rule) = self.state.rules.get(tag.as_str()) else {
                continue;
            };
            let content = render::rule(rule);
            match self.messaging().send(channel, &content).await {
                Ok(id) => {
                    if let Some(rule) = self.state.rules.get_mut(tag.as_str()) {
                        rule.set_message(Some(id));
                    }
                    posted += 1;
                }
                Err(e) => {
                    self.save().await?;
                    return Err(e.into());
                }
            }
        }
        self.save().await?;
        tracing::info!(guild_id = %self.game.guild_id, count = posted, "Reposted rules");
        Ok(posted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{TestGame, RULES};

    async fn with_rules() -> TestGame {
        let t = TestGame::with_channels().await;
        {
            let mut guard = t.game.lock().await;
            guard
                .add_rule("root", "scoring", Some("Scoring".into()), Some("Points win.".into()))
                .await
                .unwrap();
            guard
                .add_rule("scoring", "bonus", None, Some("Bonus points.".into()))
                .await
                .unwrap();
            guard
                .add_rule("root", "voting", Some("Voting".into()), None)
                .await
                .unwrap();
        }
        t
    }

    #[tokio::test]
    async fn repost_posts_non_root_rules_in_preorder() {
        let t = with_rules().await;
        let mut guard = t.game.lock().await;
        assert_eq!(guard.repost_rules().await.unwrap(), 3);

        let titles: Vec<_> = t
            .messaging
            .messages_in(RULES)
            .into_iter()
            .map(|(_, m)| m.content.title)
            .collect();
        assert_eq!(titles, vec!["Scoring", "bonus", "Voting"]);
        assert!(guard.rules().root().message().is_none());

        let first = guard.get_rule("scoring").unwrap().message().unwrap();
        guard.repost_rules().await.unwrap();
        assert!(t.messaging.message(first).is_none());
        assert_eq!(t.messaging.messages_in(RULES).len(), 3);
    }

    #[tokio::test]
    async fn set_content_updates_posted_message() {
        let t = with_rules().await;
        let mut guard = t.game.lock().await;
        guard.repost_rules().await.unwrap();
        guard
            .set_rule_content("bonus", Some("Bonus".into()), Some("Double points.".into()))
            .await
            .unwrap();
        let id = guard.get_rule("bonus").unwrap().message().unwrap();
        let message = t.messaging.message(id).unwrap();
        assert_eq!(message.content.title, "Bonus");
        assert_eq!(message.content.description, "Double points.");
    }

    #[tokio::test]
    async fn refresh_validates_tags_and_reports_missing_messages() {
        let t = with_rules().await;
        let mut guard = t.game.lock().await;
        assert!(matches!(
            guard.refresh_rule(&["scoring", "nope"]).await,
            Err(GameError::Domain(DomainError::NotFound { .. }))
        ));
        assert!(matches!(
            guard.refresh_rule(&["Bad Tag"]).await,
            Err(GameError::Domain(DomainError::Validation(_)))
        ));

        guard.repost_rules().await.unwrap();
        let id = guard.get_rule("voting").unwrap().message().unwrap();
        t.messaging.vanish(id);
        assert!(guard.refresh_rule(&["scoring"]).await.is_ok());
        assert!(matches!(
            guard.refresh_rule(&["voting"]).await,
            Err(GameError::Messaging(MessagingError::NotFound))
        ));
    }

    #[tokio::test]
    async fn removing_a_rule_drops_its_subtree_and_messages() {
        let t = with_rules().await;
        let mut guard = t.game.lock().await;
        guard.repost_rules().await.unwrap();
        let removed = guard.remove_rule("scoring").await.unwrap();
        let tags: Vec<_> = removed.iter().map(|r| r.tag().as_str()).collect();
        assert_eq!(tags, vec!["scoring", "bonus"]);
        assert_eq!(t.messaging.messages_in(RULES).len(), 1);
        assert!(guard.remove_rule("root").await.is_err());

        drop(guard);
        let reloaded = t.reload().await;
        assert!(reloaded.rule_issues().is_empty());
        assert_eq!(reloaded.lock().await.rules().len(), 2);
    }

    #[tokio::test]
    async fn forbidden_repost_keeps_existing_messages() {
        let t = with_rules().await;
        let mut guard = t.game.lock().await;
        guard.repost_rules().await.unwrap();
        let before = guard.export();

        t.messaging.revoke_permissions();
        assert!(matches!(
            guard.repost_rules().await,
            Err(GameError::Messaging(MessagingError::Forbidden(_)))
        ));
        assert_eq!(guard.export(), before);
        assert_eq!(t.messaging.messages_in(RULES).len(), 3);
    }

    #[tokio::test]
    async fn rules_channel_required() {
        let t = TestGame::new().await;
        let mut guard = t.game.lock().await;
        assert!(matches!(
            guard.repost_rules().await,
            Err(GameError::ChannelNotSet("rules"))
        ));
    }
}
