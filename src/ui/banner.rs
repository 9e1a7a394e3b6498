//! Message banner at the top of the window.

use super::colors;
use crate::state::{BannerKind, MessageBanner};
use eframe::egui::{self, Align2, RichText, Vec2};
use web_time::Instant;

pub fn render_banner(ctx: &egui::Context, banner: &mut MessageBanner, now: Instant) {
    banner.expire(now);
    let Some((kind, text)) = banner.visible(now) else {
        return;
    };

    let fill = match kind {
        BannerKind::Error => colors::banner::ERROR,
        BannerKind::Success => colors::banner::SUCCESS,
        BannerKind::Info => colors::banner::INFO,
    };

    egui::Area::new(egui::Id::new("message_banner"))
        .anchor(Align2::CENTER_TOP, Vec2::new(0.0, 15.0))
        .order(egui::Order::Tooltip)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::NONE
                .fill(fill)
                .corner_radius(4.0)
                .inner_margin(egui::Margin::symmetric(12, 8))
                .show(ui, |ui| {
                    ui.label(RichText::new(text).color(colors::banner::TEXT));
                });
        });

    // Wake up again when the message should disappear.
    if let Some(remaining) = banner.remaining(now) {
        ctx.request_repaint_after(remaining);
    }
}
