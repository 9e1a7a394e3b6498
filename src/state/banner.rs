//! Transient message banner.

use std::time::Duration;
use web_time::Instant;

/// How long a message stays visible.
pub const BANNER_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Error,
    Success,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
struct BannerMessage {
    kind: BannerKind,
    text: String,
    shown_at: Instant,
}

/// Single-slot banner: a new message replaces the current one and restarts
/// the timeout.
#[derive(Debug, Default)]
pub struct MessageBanner {
    message: Option<BannerMessage>,
}

impl MessageBanner {
    pub fn show(&mut self, kind: BannerKind, text: impl Into<String>, now: Instant) {
        let text = text.into();
        match kind {
            BannerKind::Error => log::warn!("{}", text),
            _ => log::info!("{}", text),
        }
        self.message = Some(BannerMessage {
            kind,
            text,
            shown_at: now,
        });
    }

    pub fn error(&mut self, text: impl Into<String>, now: Instant) {
        self.show(BannerKind::Error, text, now);
    }

    pub fn success(&mut self, text: impl Into<String>, now: Instant) {
        self.show(BannerKind::Success, text, now);
    }

    /// The message to display at `now`, if any.
    pub fn visible(&self, now: Instant) -> Option<(BannerKind, &str)> {
        self.message
            .as_ref()
            .filter(|m| now.duration_since(m.shown_at) < BANNER_TIMEOUT)
            .map(|m| (m.kind, m.text.as_str()))
    }

    /// Time left before the current message hides.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let message = self.message.as_ref()?;
        BANNER_TIMEOUT
            .checked_sub(now.duration_since(message.shown_at))
            .filter(|d| !d.is_zero())
    }

    /// Drops the message once its timeout has passed.
    pub fn expire(&mut self, now: Instant) {
        if self.visible(now).is_none() {
            self.message = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_hides_after_timeout() {
        let t0 = Instant::now();
        let mut banner = MessageBanner::default();
        banner.error("Failed to load configuration", t0);

        assert_eq!(
            banner.visible(t0 + ms(4999)),
            Some((BannerKind::Error, "Failed to load configuration"))
        );
        assert_eq!(banner.visible(t0 + ms(5000)), None);
        assert_eq!(banner.remaining(t0 + ms(1000)), Some(ms(4000)));
        assert_eq!(banner.remaining(t0 + ms(5000)), None);
    }

    #[test]
    fn test_new_message_restarts_timeout() {
        let t0 = Instant::now();
        let mut banner = MessageBanner::default();
        banner.error("first", t0);
        banner.success("second", t0 + ms(2000));

        assert_eq!(
            banner.visible(t0 + ms(6000)),
            Some((BannerKind::Success, "second"))
        );
        assert_eq!(
            banner.visible(t0 + ms(6999)),
            Some((BannerKind::Success, "second"))
        );
        assert_eq!(banner.visible(t0 + ms(7000)), None);
    }

    #[test]
    fn test_expire_clears_message() {
        let t0 = Instant::now();
        let mut banner = MessageBanner::default();
        banner.show(BannerKind::Info, "hello", t0);

        banner.expire(t0 + ms(100));
        assert!(banner.visible(t0 + ms(100)).is_some());

        banner.expire(t0 + ms(5000));
        assert!(banner.remaining(t0).is_none());
    }
}
