//! Command registration synchronizer.
//!
//! Reconciles the loaded command set with what the platform stores, once per
//! process, in one of two modes:
//!
//! - **Application**: one bulk replace of the application-wide set.
//! - **Per guild**: bulk replace on every known guild and, concurrently,
//!   clear the application-wide set so stale global commands disappear.

use {
    futures::future::join_all,
    serde_json::Value,
    tracing::{info, warn},
};

use crate::{
    error::{RegistrationError, Scope},
    ids::GuildId,
    transport::CommandUploader,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationMode {
    Application,
    PerGuild,
}

impl RegistrationMode {
    pub fn from_per_guild_flag(per_guild: bool) -> Self {
        if per_guild {
            Self::PerGuild
        } else {
            Self::Application
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RegistrationSynchronizer {
    mode: RegistrationMode,
}

impl RegistrationSynchronizer {
    pub fn new(mode: RegistrationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> RegistrationMode {
        self.mode
    }

    /// Upload `payloads`. Nothing is retried.
    pub async fn sync(
        &self,
        payloads: &[Value],
        guilds: &[GuildId],
        uploader: &dyn CommandUploader,
    ) -> Result<(), RegistrationError> {
        match self.mode {
            RegistrationMode::Application => {
                uploader
                    .set_application_commands(payloads)
                    .await
                    .map_err(RegistrationError::Application)?;
                info!(count = payloads.len(), "registered application commands");
                Ok(())
            },
            RegistrationMode::PerGuild => self.sync_per_guild(payloads, guilds, uploader).await,
        }
    }

    async fn sync_per_guild(
        &self,
        payloads: &[Value],
        guilds: &[GuildId],
        uploader: &dyn CommandUploader,
    ) -> Result<(), RegistrationError> {
        let uploads = join_all(guilds.iter().map(|&guild| async move {
            let result = uploader.set_guild_commands(guild, payloads).await;
            (Scope::Guild(guild), result)
        }));
        let clear = async { (Scope::Application, uploader.set_application_commands(&[]).await) };

        let (mut results, cleared) = futures::join!(uploads, clear);
        results.push(cleared);

        let mut failed = Vec::new();
        for (scope, result) in results {
            match result {
                Ok(()) => info!(%scope, count = payloads.len(), "registered commands"),
                Err(e) => {
                    warn!(%scope, error = %e, "command registration failed");
                    failed.push(scope);
                },
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(RegistrationError::Partial { failed })
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::testing::RecordingUploader,
        anyhow::Result,
        async_trait::async_trait,
        serde_json::json,
        std::time::Duration,
        tokio::sync::Barrier,
    };

    /// Every upload blocks until all of them have started.
    struct BarrierUploader {
        barrier: Barrier,
    }

    impl BarrierUploader {
        fn new(uploads: usize) -> Self {
            Self {
                barrier: Barrier::new(uploads),
            }
        }
    }

    #[async_trait]
    impl CommandUploader for BarrierUploader {
        async fn set_application_commands(&self, _commands: &[Value]) -> Result<()> {
            self.barrier.wait().await;
            Ok(())
        }

        async fn set_guild_commands(&self, _guild: GuildId, _commands: &[Value]) -> Result<()> {
            self.barrier.wait().await;
            Ok(())
        }
    }

    fn payloads() -> Vec<Value> {
        vec![json!({ "name": "ping" }), json!({ "name": "play" })]
    }

    #[tokio::test]
    async fn application_mode_uploads_once() {
        let uploader = RecordingUploader::default();
        RegistrationSynchronizer::new(RegistrationMode::Application)
            .sync(&payloads(), &[GuildId(1), GuildId(2)], &uploader)
            .await
            .unwrap();

        assert_eq!(uploader.uploads(), vec![(Scope::Application, payloads())]);
    }

    #[tokio::test]
    async fn application_mode_failure() {
        let uploader = RecordingUploader::default().failing_on(Scope::Application);
        let err = RegistrationSynchronizer::new(RegistrationMode::Application)
            .sync(&payloads(), &[], &uploader)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Application(_)));
    }

    #[tokio::test]
    async fn per_guild_uploads_everywhere_and_clears_application() {
        let uploader = RecordingUploader::default();
        RegistrationSynchronizer::new(RegistrationMode::PerGuild)
            .sync(&payloads(), &[GuildId(1), GuildId(2)], &uploader)
            .await
            .unwrap();

        assert_eq!(uploader.upload_for(Scope::Guild(GuildId(1))), Some(payloads()));
        assert_eq!(uploader.upload_for(Scope::Guild(GuildId(2))), Some(payloads()));
        assert_eq!(uploader.upload_for(Scope::Application), Some(Vec::new()));
        assert_eq!(uploader.uploads().len(), 3);
    }

    #[tokio::test]
    async fn per_guild_partial_failure_lists_failed_scopes() {
        let uploader = RecordingUploader::default().failing_on(Scope::Guild(GuildId(2)));
        let err = RegistrationSynchronizer::new(RegistrationMode::PerGuild)
            .sync(&payloads(), &[GuildId(1), GuildId(2)], &uploader)
            .await
            .unwrap_err();

        match err {
            RegistrationError::Partial { failed } => {
                assert_eq!(failed, vec![Scope::Guild(GuildId(2))]);
            },
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(uploader.upload_for(Scope::Guild(GuildId(1))), Some(payloads()));
        assert_eq!(uploader.upload_for(Scope::Application), Some(Vec::new()));
    }

    #[tokio::test]
    async fn per_guild_reports_failed_clear() {
        let uploader = RecordingUploader::default().failing_on(Scope::Application);
        let err = RegistrationSynchronizer::new(RegistrationMode::PerGuild)
            .sync(&payloads(), &[GuildId(1)], &uploader)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RegistrationError::Partial { ref failed } if failed == &[Scope::Application]
        ));
    }

    #[tokio::test]
    async fn per_guild_uploads_run_concurrently() {
        let guilds = [GuildId(1), GuildId(2), GuildId(3)];
        // One slot per guild plus the application clear.
        let uploader = BarrierUploader::new(guilds.len() + 1);

        let synced = tokio::time::timeout(
            Duration::from_secs(5),
            RegistrationSynchronizer::new(RegistrationMode::PerGuild)
                .sync(&payloads(), &guilds, &uploader),
        )
        .await
        .expect("uploads did not run concurrently");
        synced.unwrap();
    }

    #[tokio::test]
    async fn per_guild_collects_every_failure() {
        let uploader = RecordingUploader::default()
            .failing_on(Scope::Guild(GuildId(1)))
            .failing_on(Scope::Guild(GuildId(3)))
            .failing_on(Scope::Application);
        let err = RegistrationSynchronizer::new(RegistrationMode::PerGuild)
            .sync(&payloads(), &[GuildId(1), GuildId(2), GuildId(3)], &uploader)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "command registration failed for guild 1, guild 3, application"
        );
        match err {
            RegistrationError::Partial { failed } => assert_eq!(failed, vec![
                Scope::Guild(GuildId(1)),
                Scope::Guild(GuildId(3)),
                Scope::Application,
            ]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(uploader.upload_for(Scope::Guild(GuildId(2))), Some(payloads()));
    }

    #[test]
    fn mode_from_flag() {
        assert_eq!(
            RegistrationMode::from_per_guild_flag(true),
            RegistrationMode::PerGuild
        );
        assert_eq!(
            RegistrationMode::from_per_guild_flag(false),
            RegistrationMode::Application
        );
    }
}
